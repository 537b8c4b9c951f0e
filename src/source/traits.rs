use async_trait::async_trait;

use crate::domain::{MatchPage, PlayerIdentity, RankSnapshot};
use crate::error::Result;

/// Paginated, most-recent-first match history of one player.
///
/// Implementations report unreachable upstreams and unusable responses as
/// `StatsError::SourceUnavailable`. Individual entries that fail to decode
/// belong in the page as `MalformedRecord`s, not as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Fetch one page. `page` is 1-based; an empty page means no more history.
    async fn fetch_page(
        &self,
        player: &PlayerIdentity,
        page: u32,
        page_size: u32,
    ) -> Result<MatchPage>;
}

/// Current rank lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankSource: Send + Sync {
    async fn fetch_rank(&self, player: &PlayerIdentity) -> Result<RankSnapshot>;
}

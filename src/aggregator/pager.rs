use tracing::{debug, warn};

use crate::domain::{MatchPage, PlayerIdentity};
use crate::error::Result;
use crate::source::MatchSource;

/// Lazy, finite, non-restartable walk over a player's match history.
///
/// Pages are requested one at a time: whether page N+1 exists is only known
/// once page N has been seen. The walk ends on an empty page, after the first
/// short page (which is still yielded), or at the optional page cap.
pub struct MatchPager<'a> {
    source: &'a dyn MatchSource,
    player: &'a PlayerIdentity,
    page_size: u32,
    max_pages: Option<u32>,
    next_page: u32,
    finished: bool,
}

impl<'a> MatchPager<'a> {
    pub fn new(
        source: &'a dyn MatchSource,
        player: &'a PlayerIdentity,
        page_size: u32,
        max_pages: Option<u32>,
    ) -> Self {
        Self {
            source,
            player,
            page_size,
            max_pages,
            next_page: 1,
            finished: false,
        }
    }

    /// Number of pages requested so far
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pull the next page, or `None` once the history is exhausted.
    ///
    /// A fetch error also ends the walk; it is returned once and the pager
    /// yields `None` afterwards.
    pub async fn next_page(&mut self) -> Result<Option<MatchPage>> {
        if self.finished {
            return Ok(None);
        }

        if let Some(cap) = self.max_pages {
            if self.next_page > cap {
                warn!(
                    "Max pages ({}) reached for {}, stopping early",
                    cap, self.player
                );
                self.finished = true;
                return Ok(None);
            }
        }

        let number = self.next_page;
        debug!("Fetching matches page {} for {}", number, self.player);
        let mut page = match self
            .source
            .fetch_page(self.player, number, self.page_size)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };
        self.next_page += 1;
        page.number = number;

        if page.is_empty() {
            debug!("No more matches for {} after page {}", self.player, number - 1);
            self.finished = true;
            return Ok(None);
        }

        if page.len() < self.page_size as usize {
            debug!(
                "Short page {} ({} < {}) for {}, last page",
                number,
                page.len(),
                self.page_size,
                self.player
            );
            self.finished = true;
        }

        Ok(Some(page))
    }
}

//! Upstream data seams: match history and rank lookups.

mod traits;

pub use traits::{MatchSource, RankSource};

#[cfg(test)]
pub use traits::{MockMatchSource, MockRankSource};

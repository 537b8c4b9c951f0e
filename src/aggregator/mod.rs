//! Weekly per-agent aggregation of a player's match history.

mod engine;
mod pager;
mod policy;
mod window;

pub use engine::{AgentAggregator, AggregatorSettings};
pub use pager::MatchPager;
pub use policy::{ZeroDeathsPolicy, ZeroRoundsPolicy};
pub use window::{is_custom_game_day, window_cutoff, WindowZone};

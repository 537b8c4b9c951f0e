pub mod matches;
pub mod player;
pub mod report;
pub mod stats;

pub use matches::*;
pub use player::*;
pub use report::*;
pub use stats::*;

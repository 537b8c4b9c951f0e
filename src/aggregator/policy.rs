//! Named policies for the two per-match ratios that can divide by zero.

use serde::{Deserialize, Serialize};

/// What a match with `rounds_played == 0` contributes to combat score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroRoundsPolicy {
    /// Count the game but add 0 to the ACS sum
    #[default]
    #[serde(rename = "zero", alias = "count_as_zero")]
    CountAsZero,
    /// Treat the match as malformed and skip it entirely
    Reject,
}

impl ZeroRoundsPolicy {
    /// Per-match combat score rate, `score / rounds`.
    ///
    /// `None` means the match must be skipped.
    pub fn combat_score_rate(self, score: i64, rounds: u32) -> Option<f64> {
        if rounds > 0 {
            return Some(score as f64 / f64::from(rounds));
        }
        match self {
            ZeroRoundsPolicy::CountAsZero => Some(0.0),
            ZeroRoundsPolicy::Reject => None,
        }
    }
}

/// What a deathless match contributes to kill/death ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDeathsPolicy {
    /// Ratio equals the kill count (10 kills, 0 deaths -> 10.0)
    #[default]
    #[serde(rename = "kills", alias = "kill_count")]
    KillCount,
    /// Ratio is 0
    Zero,
}

impl ZeroDeathsPolicy {
    pub fn kill_death_ratio(self, kills: u32, deaths: u32) -> f64 {
        if deaths > 0 {
            return f64::from(kills) / f64::from(deaths);
        }
        match self {
            ZeroDeathsPolicy::KillCount => f64::from(kills),
            ZeroDeathsPolicy::Zero => 0.0,
        }
    }
}

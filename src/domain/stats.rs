use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Finalized per-agent averages over the included matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub games: u32,
    #[serde(rename = "avgACS")]
    pub avg_acs: f64,
    #[serde(rename = "avgKD")]
    pub avg_kd: f64,
    /// Percentage, 0-100
    #[serde(rename = "winRate")]
    pub win_rate: f64,
}

/// Agent name -> finalized stats. Agents without included games are absent.
pub type AggregationResult = BTreeMap<String, AgentStats>;

/// Running sums for one agent while a player's matches are being scanned
#[derive(Debug, Clone, Default)]
pub struct AgentTally {
    games: u32,
    total_acs: f64,
    total_kd: f64,
    wins: u32,
}

impl AgentTally {
    /// Add one included match
    pub fn record(&mut self, acs: f64, kd: f64, won: bool) {
        self.games += 1;
        self.total_acs += acs;
        self.total_kd += kd;
        if won {
            self.wins += 1;
        }
    }

    pub fn games(&self) -> u32 {
        self.games
    }

    /// Consume the running sums. `None` when no game was recorded.
    pub fn finalize(self) -> Option<AgentStats> {
        if self.games == 0 {
            return None;
        }
        let games = f64::from(self.games);
        Some(AgentStats {
            games: self.games,
            avg_acs: self.total_acs / games,
            avg_kd: self.total_kd / games,
            win_rate: 100.0 * f64::from(self.wins) / games,
        })
    }
}

use serde::{Deserialize, Serialize};

use super::{AggregationResult, PlayerIdentity};

/// Current competitive rank of a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSnapshot {
    /// Tier label, e.g. "Gold 2"
    #[serde(rename = "currenttier")]
    pub tier: String,
    #[serde(rename = "rankImage")]
    pub image: Option<String>,
    /// Rank rating within the tier
    pub rr: Option<i64>,
}

impl RankSnapshot {
    pub const UNRANKED: &'static str = "Unranked";

    pub fn unranked() -> Self {
        Self {
            tier: Self::UNRANKED.to_string(),
            image: None,
            rr: None,
        }
    }
}

impl Default for RankSnapshot {
    fn default() -> Self {
        Self::unranked()
    }
}

/// One roster entry of the weekly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    /// `name#tag`
    pub player: String,
    pub rank: Option<RankSnapshot>,
    #[serde(default)]
    pub agents: AggregationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlayerReport {
    pub fn success(player: &PlayerIdentity, rank: RankSnapshot, agents: AggregationResult) -> Self {
        Self {
            player: player.to_string(),
            rank: Some(rank),
            agents,
            error: None,
        }
    }

    pub fn failure(player: &PlayerIdentity, message: impl Into<String>) -> Self {
        Self {
            player: player.to_string(),
            rank: None,
            agents: AggregationResult::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

//! Match history records as the aggregator sees them.
//!
//! These are decoded from upstream payloads by the adapters; nothing in here
//! knows about the wire format.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// Queue / game mode of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMode {
    Competitive,
    Custom,
    Other(String),
}

impl GameMode {
    /// Case-insensitive parse. Unknown modes are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("competitive") {
            GameMode::Competitive
        } else if trimmed.eq_ignore_ascii_case("custom") {
            GameMode::Custom
        } else {
            GameMode::Other(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GameMode::Competitive => "competitive",
            GameMode::Custom => "custom",
            GameMode::Other(mode) => mode,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One player's line in a match scoreboard
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMatchStats {
    pub name: String,
    pub tag: String,
    /// Character played
    pub agent: String,
    pub score: i64,
    pub kills: u32,
    pub deaths: u32,
    pub team_side: String,
}

/// Outcome for one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamResult {
    pub has_won: bool,
}

/// One played game
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Epoch seconds
    pub start_timestamp: i64,
    pub mode: GameMode,
    pub rounds_played: u32,
    pub players: Vec<PlayerMatchStats>,
    /// Keyed by lowercase team side
    pub team_results: HashMap<String, TeamResult>,
}

impl MatchRecord {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_timestamp, 0)
    }

    /// Whether the given team side (case-insensitive) won this match.
    /// A side missing from the results counts as a loss.
    pub fn side_won(&self, side: &str) -> bool {
        self.team_results
            .get(&side.trim().to_lowercase())
            .map(|t| t.has_won)
            .unwrap_or(false)
    }
}

/// An entry of a page that could not be turned into a `MatchRecord`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// Position within its page
    pub index: usize,
    pub reason: String,
}

pub type MatchEntry = std::result::Result<MatchRecord, MalformedRecord>;

/// One page of match history, most recent first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchPage {
    /// 1-based page number
    pub number: u32,
    pub entries: Vec<MatchEntry>,
}

impl MatchPage {
    pub fn new(number: u32, entries: Vec<MatchEntry>) -> Self {
        Self { number, entries }
    }

    /// Build a page where every entry decoded cleanly
    pub fn from_records(number: u32, records: Vec<MatchRecord>) -> Self {
        Self {
            number,
            entries: records.into_iter().map(Ok).collect(),
        }
    }

    /// Number of entries, malformed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

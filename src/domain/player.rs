use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// A roster entry: in-game name plus tagline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub name: String,
    pub tag: String,
}

impl PlayerIdentity {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Case-insensitive exact match on both name and tag.
    ///
    /// Names can be non-ASCII, so this lowercases with full Unicode rules
    /// rather than `eq_ignore_ascii_case`.
    pub fn matches(&self, name: &str, tag: &str) -> bool {
        fold(&self.name) == fold(name) && fold(&self.tag) == fold(tag)
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

impl FromStr for PlayerIdentity {
    type Err = StatsError;

    /// Parse `name#tag`. Names may contain `#`, so the split is on the last one.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, tag) = raw.rsplit_once('#').ok_or_else(|| {
            StatsError::Validation(format!("expected NAME#TAG, got '{}'", raw))
        })?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(StatsError::Validation(format!(
                "player name and tag must be non-empty: '{}'",
                raw
            )));
        }
        Ok(Self::new(name, tag))
    }
}

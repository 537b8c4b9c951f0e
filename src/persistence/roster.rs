//! Roster file: a JSON object mapping player name to tag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::PlayerIdentity;
use crate::error::{Result, StatsError};

/// Players to report on, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: BTreeMap<String, String>,
}

impl Roster {
    pub fn from_players<I: IntoIterator<Item = PlayerIdentity>>(players: I) -> Self {
        Self {
            entries: players.into_iter().map(|p| (p.name, p.tag)).collect(),
        }
    }

    /// Add a player, replacing the tag of an existing entry with the same name
    pub fn insert(&mut self, player: PlayerIdentity) -> Result<Option<String>> {
        let (name, tag) = (player.name.trim(), player.tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(StatsError::Validation(
                "player name and tag must be non-empty".to_string(),
            ));
        }
        Ok(self.entries.insert(name.to_string(), tag.to_string()))
    }

    pub fn players(&self) -> Vec<PlayerIdentity> {
        self.entries
            .iter()
            .map(|(name, tag)| PlayerIdentity::new(name.clone(), tag.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Roster persisted as a JSON file.
///
/// Clones share one write lock, so updates made through any clone are
/// serialized. Saves replace the file atomically.
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl RosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the roster. A missing file is an empty roster.
    pub async fn load(&self) -> Result<Roster> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Roster file {} not found, using an empty roster", self.path.display());
                Ok(Roster::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, roster: &Roster) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(roster).await
    }

    async fn write(&self, roster: &Roster) -> Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        super::write_atomic(&self.path, &json).await
    }

    /// Load, insert, save under the write lock
    pub async fn add_player(&self, player: PlayerIdentity) -> Result<Roster> {
        let _guard = self.write_lock.lock().await;
        let mut roster = self.load().await?;
        let label = player.to_string();
        if let Some(previous) = roster.insert(player)? {
            info!("Updated roster entry {} (was tag {})", label, previous);
        } else {
            info!("Added {} to roster", label);
        }
        self.write(&roster).await?;
        Ok(roster)
    }
}

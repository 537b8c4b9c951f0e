//! Local report snapshot
//!
//! The last pass's report array, pretty-printed, for replay and debugging.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::PlayerReport;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the snapshot with `reports`
    pub async fn write(&self, reports: &[PlayerReport]) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(reports)?;
        json.push(b'\n');
        super::write_atomic(&self.path, &json).await?;
        info!("Wrote {} report(s) to {}", reports.len(), self.path.display());
        Ok(())
    }

    /// Read a previously written snapshot
    pub async fn load(&self) -> Result<Vec<PlayerReport>> {
        let raw = tokio::fs::read(&self.path).await?;
        let reports: Vec<PlayerReport> = serde_json::from_slice(&raw)?;
        debug!("Loaded {} report(s) from {}", reports.len(), self.path.display());
        Ok(reports)
    }
}

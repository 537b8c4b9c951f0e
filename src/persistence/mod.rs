//! Flat-file persistence: the roster and the last report snapshot.

pub mod roster;
pub mod snapshot;

pub use roster::{Roster, RosterFile};
pub use snapshot::SnapshotStore;

use std::path::Path;

use crate::error::Result;

/// Write through a sibling temp file and rename it into place, so readers see
/// either the old file or the new one.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

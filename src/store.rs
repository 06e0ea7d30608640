//! Durable cursor storage.
//!
//! Persists the last processed event sequence ID to a local file so that
//! polling resumes from the correct position across restarts.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Error surfaced when cursor persistence fails.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem write or rename failed.
    #[error("cursor persistence failed: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed storage for a single cursor value.
///
/// Writes go to a temporary sibling file first and are renamed into place,
/// so a torn write never leaves an unparseable state file. Reads are
/// lenient: a missing, corrupt, or unparseable file yields `None` (cold
/// start) rather than an error.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored sequence ID.
    ///
    /// Returns `None` when no usable state exists, which the poller treats
    /// as a cold start. A present-but-unreadable file is logged and treated
    /// the same way; this method never fails.
    pub async fn load(&self) -> Option<u64> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read state file");
                return None;
            }
        };

        match data.trim().parse::<u64>() {
            Ok(sequence_id) => Some(sequence_id),
            Err(_) => {
                warn!(
                    path = %self.path.display(),
                    "State file holds no valid sequence ID, starting cold"
                );
                None
            }
        }
    }

    /// Durably stores the given sequence ID, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary write or the rename fails.
    pub async fn save(&self, sequence_id: u64) -> Result<(), StoreError> {
        // Atomic write: tmp file + rename
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, sequence_id.to_string()).await?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(e));
        }

        Ok(())
    }
}

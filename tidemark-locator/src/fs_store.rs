//! Filesystem-backed locator store.
//!
//! Each checkpoint is one file: `{base_path}/checkpoint-{id:016x}.loc`.
//! Writes go to a temp file that is renamed over the target, so readers see
//! either the previous or the new locator, never a torn one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tidemark_core::CheckpointId;

use crate::error::{LocatorError, LocatorResult};
use crate::store::LocatorStore;

const FILE_PREFIX: &str = "checkpoint-";
const FILE_EXTENSION: &str = "loc";

// -----------------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------------

/// Where and how durably [`FilesystemLocatorStore`] writes checkpoints.
#[derive(Debug, Clone)]
pub struct FilesystemConfig {
    /// Directory holding one `.loc` file per checkpoint.
    pub base_path: PathBuf,
    /// Fsync each checkpoint file before the rename, and the directory on `sync`.
    pub sync_on_write: bool,
    /// Create `base_path` on open when it is missing.
    pub create_if_missing: bool,
}

impl FilesystemConfig {
    /// Durable configuration rooted at `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            sync_on_write: true,
            create_if_missing: true,
        }
    }

    /// Same as [`FilesystemConfig::new`] without any fsync.
    #[must_use]
    pub fn for_testing(base_path: impl Into<PathBuf>) -> Self {
        Self {
            sync_on_write: false,
            ..Self::new(base_path)
        }
    }
}

// -----------------------------------------------------------------------------
// FilesystemLocatorStore
// -----------------------------------------------------------------------------

/// Locator store keeping one file per checkpoint.
#[derive(Debug, Clone)]
pub struct FilesystemLocatorStore {
    config: FilesystemConfig,
}

impl FilesystemLocatorStore {
    /// Creates a filesystem store with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `create_if_missing` is true and directory creation fails.
    ///
    /// # Panics
    ///
    /// Panics if `base_path` is empty.
    pub async fn new(config: FilesystemConfig) -> LocatorResult<Self> {
        assert!(
            !config.base_path.as_os_str().is_empty(),
            "base_path must not be empty"
        );

        if config.create_if_missing {
            tokio::fs::create_dir_all(&config.base_path)
                .await
                .map_err(|e| LocatorError::Io {
                    operation: "create_base_dir",
                    message: format!(
                        "failed to create base directory '{}': {e}",
                        config.base_path.display()
                    ),
                })?;
        }

        Ok(Self { config })
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    fn checkpoint_path(&self, checkpoint_id: CheckpointId) -> PathBuf {
        self.config.base_path.join(format!(
            "{FILE_PREFIX}{:016x}.{FILE_EXTENSION}",
            checkpoint_id.get()
        ))
    }

    /// Parses a checkpoint id back out of a file name.
    fn parse_file_name(name: &str) -> Option<CheckpointId> {
        let hex = name
            .strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_EXTENSION)?
            .strip_suffix('.')?;
        u64::from_str_radix(hex, 16).ok().map(CheckpointId::new)
    }
}

#[async_trait]
impl LocatorStore for FilesystemLocatorStore {
    async fn load(&self, checkpoint_id: CheckpointId) -> LocatorResult<Option<Bytes>> {
        let path = self.checkpoint_path(checkpoint_id);

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocatorError::Io {
                operation: "load",
                message: format!("failed to read '{}': {e}", path.display()),
            }),
        }
    }

    async fn store(&self, checkpoint_id: CheckpointId, data: Bytes) -> LocatorResult<()> {
        assert!(!data.is_empty(), "encoded locator must not be empty");

        let path = self.checkpoint_path(checkpoint_id);
        let temp_path = path.with_extension("tmp");

        let write_result = async {
            let mut file = tokio::fs::File::create(&temp_path)
                .await
                .map_err(|e| LocatorError::Io {
                    operation: "store",
                    message: format!("failed to create temp file: {e}"),
                })?;

            tokio::io::AsyncWriteExt::write_all(&mut file, &data)
                .await
                .map_err(|e| LocatorError::Io {
                    operation: "store",
                    message: format!("failed to write data: {e}"),
                })?;

            if self.config.sync_on_write {
                file.sync_all().await.map_err(|e| LocatorError::Io {
                    operation: "store",
                    message: format!("failed to sync file: {e}"),
                })?;
            }

            Ok::<(), LocatorError>(())
        }
        .await;

        // Clean up temp file on error.
        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        // Atomic rename.
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| LocatorError::Io {
                operation: "store",
                message: format!("failed to rename temp file: {e}"),
            })?;

        Ok(())
    }

    async fn remove(&self, checkpoint_id: CheckpointId) -> LocatorResult<()> {
        let path = self.checkpoint_path(checkpoint_id);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Idempotent: removing a missing checkpoint succeeds.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LocatorError::Io {
                operation: "remove",
                message: format!("failed to delete '{}': {e}", path.display()),
            }),
        }
    }

    async fn list(&self) -> LocatorResult<Vec<CheckpointId>> {
        let mut entries = match tokio::fs::read_dir(&self.config.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LocatorError::Io {
                    operation: "list",
                    message: format!(
                        "failed to read directory '{}': {e}",
                        self.config.base_path.display()
                    ),
                })
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| LocatorError::Io {
            operation: "list",
            message: format!("failed to read directory entry: {e}"),
        })? {
            // Temp files and foreign files are skipped.
            if let Some(id) = entry.file_name().to_str().and_then(Self::parse_file_name) {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn sync(&self) -> LocatorResult<()> {
        if !self.config.sync_on_write {
            return Ok(());
        }
        let dir = tokio::fs::File::open(&self.config.base_path)
            .await
            .map_err(|e| LocatorError::Io {
                operation: "sync",
                message: format!(
                    "failed to open '{}': {e}",
                    self.config.base_path.display()
                ),
            })?;
        dir.sync_all().await.map_err(|e| LocatorError::Io {
            operation: "sync",
            message: format!("failed to sync directory: {e}"),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

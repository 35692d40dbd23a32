//! Versioned JSON snapshot files
//!
//! A snapshot is the last complete catalog (or user directory) written to
//! disk. Anything unreadable is reported as an error the caller turns into
//! a cold start.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Format version - bump to make older snapshots load as absent
pub const SNAPSHOT_VERSION: u32 = 1;

const CHANNELS_FILE: &str = "channels.json";
const USERS_FILE: &str = "users.json";

type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: &'a [T],
}

#[derive(Deserialize)]
struct EnvelopeIn<T> {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: Vec<T>,
}

/// Header-level facts about a snapshot file.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub entry_count: usize,
    pub saved_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// One snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Channel catalog snapshot inside `cache_dir`.
    pub fn channels(cache_dir: &Path) -> Self {
        Self::at(cache_dir.join(CHANNELS_FILE))
    }

    /// User directory snapshot inside `cache_dir`.
    pub fn users(cache_dir: &Path) -> Self {
        Self::at(cache_dir.join(USERS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read all entries from the snapshot.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let envelope: EnvelopeIn<T> = self.read_envelope()?;
        debug!(
            "Loaded {} entries from {} (saved {})",
            envelope.entries.len(),
            self.path.display(),
            envelope.saved_at
        );
        Ok(envelope.entries)
    }

    /// Replace the snapshot with `entries`.
    ///
    /// Writes to a sibling temp file and renames it into place so a crash
    /// never leaves a half-written snapshot behind.
    pub fn save<T: Serialize>(&self, entries: &[T]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| CatalogError::Io("snapshot path has no parent".to_string()))?;
        fs::create_dir_all(dir)
            .map_err(|e| CatalogError::Io(format!("Failed to create cache dir: {}", e)))?;

        let envelope = EnvelopeOut {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries,
        };
        let json = serde_json::to_vec(&envelope)
            .map_err(|e| CatalogError::Io(format!("Failed to encode snapshot: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)
                .map_err(|e| CatalogError::Io(format!("Failed to create {}: {}", tmp.display(), e)))?;
            file.write_all(&json)
                .and_then(|_| file.sync_all())
                .map_err(|e| CatalogError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
        }
        fs::rename(&tmp, &self.path)
            .map_err(|e| CatalogError::Io(format!("Failed to replace snapshot: {}", e)))?;

        info!("Saved {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Summary of the snapshot without keeping its entries.
    pub fn info(&self) -> Result<SnapshotInfo> {
        let size_bytes = fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|_| CatalogError::NotFound(self.path.display().to_string()))?;
        let envelope: EnvelopeIn<serde_json::Value> = self.read_envelope()?;

        Ok(SnapshotInfo {
            path: self.path.clone(),
            entry_count: envelope.entries.len(),
            saved_at: envelope.saved_at,
            size_bytes,
        })
    }

    /// Delete the snapshot. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CatalogError::Io(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn read_envelope<T: DeserializeOwned>(&self) -> Result<EnvelopeIn<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(CatalogError::Io(e.to_string())),
        };

        // Check the version before committing to the entry type
        let header: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        let found = header
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| CatalogError::Corrupt("missing version".to_string()))?;
        if found != u64::from(SNAPSHOT_VERSION) {
            return Err(CatalogError::VersionMismatch {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: SNAPSHOT_VERSION,
            });
        }

        let envelope: EnvelopeIn<T> =
            serde_json::from_value(header).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        debug_assert_eq!(envelope.version, SNAPSHOT_VERSION);
        Ok(envelope)
    }
}

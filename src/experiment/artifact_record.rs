//! Artifact Record - file stored under a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Artifact Record represents one file logged against a run.
///
/// `path` is relative to the run's artifact root (e.g. `model/MLmodel`).
///
/// ## Hash Format
///
/// The `cas_hash` follows the format `sha256:hex_digest`, e.g.
/// `sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855`
/// for empty content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    run_id: String,
    path: String,
    cas_hash: String,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Describe `content` stored at `path` under `run_id`.
    #[must_use]
    pub fn from_content(
        run_id: impl Into<String>,
        path: impl Into<String>,
        content: &[u8],
    ) -> Self {
        Self {
            run_id: run_id.into(),
            path: path.into(),
            cas_hash: format!("sha256:{:x}", Sha256::digest(content)),
            size_bytes: content.len() as u64,
            created_at: Utc::now(),
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the artifact path relative to the run's artifact root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the content hash.
    #[must_use]
    pub fn cas_hash(&self) -> &str {
        &self.cas_hash
    }

    /// Get the artifact size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

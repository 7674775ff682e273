//! Token-addressed ephemeral artifact store.
//!
//! Written packages are registered under an unguessable token and served back
//! by that token alone; the filesystem path never leaves the process. Entries
//! expire after a fixed TTL and a background sweeper reclaims both the map
//! entry and the file on disk.

use crate::common::error::{Error, Result};
use parking_lot::Mutex;
use rand::RngExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default artifact lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default sweep cadence.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// A stored artifact, as handed back by [`ArtifactStore::retrieve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the package on disk
    pub path: PathBuf,
    /// Filename to present on download
    pub filename: String,
}

#[derive(Debug)]
struct Entry {
    artifact: Artifact,
    expires_at: Instant,
}

/// Concurrent map from download token to artifact.
///
/// Cheap to clone; all clones share the same map. Tokens are 32 random bytes,
/// hex encoded, so collisions do not occur in practice and one is treated as
/// a fatal fault rather than an error to recover from.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl ArtifactStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Register an artifact and return its download token.
    ///
    /// # Panics
    ///
    /// Panics if the generated token is already present, which indicates a
    /// broken random source rather than a recoverable condition.
    pub fn register(&self, path: PathBuf, filename: String) -> String {
        let token = new_token();
        let entry = Entry {
            artifact: Artifact { path, filename },
            expires_at: Instant::now() + self.ttl,
        };
        let previous = self.entries.lock().insert(token.clone(), entry);
        assert!(previous.is_none(), "artifact token collision");
        debug!(%token, "artifact registered");
        token
    }

    /// Look up an artifact by token.
    ///
    /// Lookups do not consume the entry, so a deck can be downloaded more
    /// than once within its lifetime. Unknown and expired tokens are
    /// indistinguishable to the caller; both return [`Error::NotFound`].
    pub fn retrieve(&self, token: &str) -> Result<Artifact> {
        let entries = self.entries.lock();
        match entries.get(token) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.artifact.clone()),
            _ => Err(Error::NotFound(token.to_string())),
        }
    }

    /// Remove all expired entries and delete their files.
    ///
    /// Returns the number of entries reclaimed. File deletion happens after
    /// the lock is released; a file that fails to delete is logged and left
    /// for the next sweep of the output directory, the map entry is gone
    /// either way.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<Artifact> = {
            let mut entries = self.entries.lock();
            let tokens: Vec<String> = entries
                .iter()
                .filter(|(_, e)| e.expires_at <= now)
                .map(|(t, _)| t.clone())
                .collect();
            tokens
                .iter()
                .filter_map(|t| entries.remove(t))
                .map(|e| e.artifact)
                .collect()
        };

        for artifact in &expired {
            if let Err(e) = std::fs::remove_file(&artifact.path) {
                warn!(path = %artifact.path.display(), error = %e, "failed to delete expired artifact");
            }
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "swept expired artifacts");
        }
        expired.len()
    }

    /// Run [`sweep`](Self::sweep) on a fixed cadence until the task is
    /// aborted or every clone of the store is dropped.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick fires immediately; skip it so a fresh store is not
            // swept before anything can expire.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.sweep();
            }
        })
    }

    /// Drop every entry and delete every file, regardless of expiry.
    pub fn clear(&self) {
        let drained: Vec<Entry> = {
            let mut entries = self.entries.lock();
            entries.drain().map(|(_, e)| e).collect()
        };
        for entry in &drained {
            let _ = std::fs::remove_file(&entry.artifact.path);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// 32 random bytes, hex encoded: 64 URL-safe characters.
fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

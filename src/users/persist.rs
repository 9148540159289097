use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, warn};

use super::dto::User;

/// Reads the backing file once at startup. A missing file is an empty store.
pub async fn load_users(path: &Path) -> anyhow::Result<Vec<User>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "users file not found; starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
}

/// Rewrites the whole backing file with a store snapshot.
///
/// Writes are serialized so two snapshots never interleave on disk, but no
/// ordering between snapshots is enforced: whichever lands last wins.
/// There is no temp-file-and-rename step.
pub struct SnapshotWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, users: &[User]) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(users).context("serialize users")?;
        let _guard = self.lock.lock().await;
        tokio::fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("write {}", self.path.display()))
    }
}

/// Fire-and-forget rewrite; failures are logged and dropped.
pub fn spawn_write(writer: std::sync::Arc<SnapshotWriter>, users: Vec<User>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match writer.write(&users).await {
            Ok(()) => debug!(path = %writer.path().display(), records = users.len(), "users file rewritten"),
            Err(e) => error!(error = ?e, "users file rewrite failed"),
        }
    })
}

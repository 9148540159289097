use std::{path::PathBuf, sync::Arc};

use serde_json::{Map, Value};
use tokio::{
    sync::{RwLock, RwLockReadGuard},
    task::JoinHandle,
};

use super::{
    dto::User,
    persist::{self, SnapshotWriter},
};

/// Result of an append.
///
/// `stored_id` is what the new record carries, computed from the length
/// before the push. `reported_id` is computed again after the push and is
/// therefore one higher; clients rely on the reported value as-is.
#[derive(Debug)]
pub struct Appended {
    pub stored_id: usize,
    pub reported_id: usize,
    pub snapshot: Vec<User>,
}

/// Ordered in-memory users, loaded once and only ever appended to.
pub struct UserStore {
    users: RwLock<Vec<User>>,
    writer: Arc<SnapshotWriter>,
}

impl UserStore {
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let users = persist::load_users(&path).await?;
        Ok(Self::from_parts(users, path))
    }

    pub fn from_parts(users: Vec<User>, path: impl Into<PathBuf>) -> Self {
        Self {
            users: RwLock::new(users),
            writer: Arc::new(SnapshotWriter::new(path)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Vec<User>> {
        self.users.read().await
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// First record whose numeric `id` equals `id`.
    pub async fn find(&self, id: f64) -> Option<User> {
        self.users.read().await.iter().find(|u| u.has_id(id)).cloned()
    }

    pub async fn append(&self, fields: Map<String, Value>) -> Appended {
        let mut users = self.users.write().await;
        let stored_id = users.len() + 1;
        users.push(User::with_id(fields, stored_id));
        Appended {
            stored_id,
            reported_id: users.len() + 1,
            snapshot: users.clone(),
        }
    }

    /// Schedules a full rewrite of the backing file; the caller need not wait.
    pub fn persist(&self, snapshot: Vec<User>) -> JoinHandle<()> {
        persist::spawn_write(self.writer.clone(), snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed() -> Vec<User> {
        vec![
            serde_json::from_value(json!({ "id": 1, "first_name": "Ada" })).unwrap(),
            serde_json::from_value(json!({ "id": 2, "first_name": "Grace" })).unwrap(),
        ]
    }

    fn fields(name: &str) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("first_name".into(), json!(name));
        m
    }

    #[tokio::test]
    async fn append_reports_id_one_past_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::from_parts(seed(), dir.path().join("users.json"));

        let appended = store.append(fields("Test")).await;
        assert_eq!(appended.stored_id, 3);
        assert_eq!(appended.reported_id, 4);
        assert_eq!(store.len().await, 3);

        let stored = store.find(3.0).await.expect("stored under pre-append id");
        assert_eq!(stored.field("first_name"), Some(&json!("Test")));
        assert!(store.find(4.0).await.is_none());
    }

    #[tokio::test]
    async fn find_returns_first_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut users = seed();
        users.push(serde_json::from_value(json!({ "id": 2, "first_name": "Dup" })).unwrap());
        let store = UserStore::from_parts(users, dir.path().join("users.json"));

        let found = store.find(2.0).await.unwrap();
        assert_eq!(found.field("first_name"), Some(&json!("Grace")));
        assert!(store.find(42.0).await.is_none());
    }

    #[tokio::test]
    async fn load_then_persist_roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, serde_json::to_vec(&seed()).unwrap()).unwrap();

        let store = UserStore::load(&path).await.unwrap();
        let appended = store.append(fields("Test")).await;
        store.persist(appended.snapshot).await.unwrap();

        let reloaded = UserStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len().await, 3);
        assert_eq!(*reloaded.read().await, *store.read().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_may_lose_records_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = Arc::new(UserStore::from_parts(seed(), &path));

        let mut tasks = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let appended = store.append(fields(&format!("c{i}"))).await;
                store.persist(appended.snapshot)
            }));
        }
        for task in tasks {
            task.await.unwrap().await.unwrap();
        }

        assert_eq!(store.len().await, 12);
        // Snapshots land in any order, so the file holds between one and all
        // ten new records, but it always parses.
        let on_disk = persist::load_users(&path).await.unwrap();
        assert!(on_disk.len() > 2 && on_disk.len() <= 12, "got {}", on_disk.len());
    }
}

//! crates/vdr_core/src/store.rs
//!
//! The in-memory session collection and every operation that mutates it.
//!
//! The store owns all sessions. Each successful mutation is followed by a
//! full snapshot write through the injected [`SnapshotService`]; a failed
//! write is logged and memory stays authoritative until the next one.

use crate::domain::{Session, SessionData};
use crate::ports::SnapshotService;
use crate::schema::{self, FieldError, ValidationError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct SessionStore {
    sessions: Vec<Session>,
    snapshot: Arc<dyn SnapshotService>,
    /// Largest id ever held, so ids are not handed out twice after a reset.
    high_water: i64,
}

impl SessionStore {
    /// Creates an empty store backed by `snapshot`, without reading it.
    pub fn new(snapshot: Arc<dyn SnapshotService>) -> Self {
        Self {
            sessions: Vec::new(),
            snapshot,
            high_water: 0,
        }
    }

    /// Creates a store populated from whatever `snapshot` currently holds.
    pub async fn open(snapshot: Arc<dyn SnapshotService>) -> Self {
        let sessions = snapshot.load().await;
        let high_water = max_id(&sessions);
        info!(count = sessions.len(), "Session store opened");
        Self {
            sessions,
            snapshot,
            high_water,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Validates `document` and appends it under a freshly assigned id.
    ///
    /// Any `session_data.id` in the document is discarded. Nothing changes
    /// when validation fails or no id is left to assign.
    pub async fn submit(&mut self, document: Value) -> Result<i64, ValidationError> {
        let mut session = schema::validate(document)?;

        let Some(new_id) = max_id(&self.sessions).max(self.high_water).checked_add(1) else {
            warn!("Session id space exhausted");
            return Err(ValidationError {
                errors: vec![FieldError::new("/data/session_data/id", "id space exhausted")],
            });
        };
        session.data.session_data.id = new_id;
        self.high_water = new_id;
        self.sessions.push(session);
        info!(id = new_id, "Session stored");

        self.persist().await;
        Ok(new_id)
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Looks up a session by an id that has not been parsed yet.
    /// Anything that is not a plain integer finds nothing.
    pub fn find_by_raw_id(&self, raw: &str) -> Option<&Session> {
        match raw.trim().parse::<i64>() {
            Ok(id) => self.find_by_id(id),
            Err(_) => {
                debug!(raw, "Ignoring non-numeric session id");
                None
            }
        }
    }

    /// The `session_data` of every session, in insertion order.
    pub fn list_summaries(&self) -> Vec<&SessionData> {
        self.sessions.iter().map(|s| &s.data.session_data).collect()
    }

    pub fn list_raw(&self) -> &[Session] {
        &self.sessions
    }

    /// Drops every session and removes the snapshot.
    pub async fn reset_all(&mut self) {
        self.sessions.clear();
        if let Err(e) = self.snapshot.remove().await {
            error!("Failed to remove session snapshot: {}", e);
        }
        info!("All sessions deleted");
    }

    /// Removes every alarm whose id is `alert_id`, from every session.
    ///
    /// Alarm ids are treated as unique across the whole store, so the search
    /// is not limited to one session. Returns whether anything was removed.
    pub async fn delete_alarm(&mut self, alert_id: i64) -> bool {
        let mut removed = 0;
        for session in &mut self.sessions {
            let alarms = &mut session.data.session_alarm;
            let before = alarms.len();
            alarms.retain(|a| a.id != alert_id);
            removed += before - alarms.len();
        }

        if removed == 0 {
            debug!(alert_id, "No alarm matched");
            return false;
        }

        info!(alert_id, removed, "Alarm deleted");
        self.persist().await;
        true
    }

    async fn persist(&self) {
        if let Err(e) = self.snapshot.save(&self.sessions).await {
            error!("Failed to write session snapshot: {}", e);
        }
    }
}

fn max_id(sessions: &[Session]) -> i64 {
    sessions.iter().map(Session::id).max().unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_session;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Keeps the last saved collection in memory.
    #[derive(Default)]
    struct MemorySnapshot {
        saved: Mutex<Option<Vec<Session>>>,
        saves: Mutex<usize>,
    }

    impl MemorySnapshot {
        fn saved(&self) -> Option<Vec<Session>> {
            self.saved.lock().unwrap().clone()
        }

        fn saves(&self) -> usize {
            *self.saves.lock().unwrap()
        }
    }

    #[async_trait]
    impl SnapshotService for MemorySnapshot {
        async fn load(&self) -> Vec<Session> {
            self.saved().unwrap_or_default()
        }

        async fn save(&self, sessions: &[Session]) -> PortResult<()> {
            *self.saved.lock().unwrap() = Some(sessions.to_vec());
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }

        async fn remove(&self) -> PortResult<()> {
            *self.saved.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Fails every write.
    struct BrokenSnapshot;

    #[async_trait]
    impl SnapshotService for BrokenSnapshot {
        async fn load(&self) -> Vec<Session> {
            Vec::new()
        }

        async fn save(&self, _sessions: &[Session]) -> PortResult<()> {
            Err(PortError::Unexpected("disk full".to_string()))
        }

        async fn remove(&self) -> PortResult<()> {
            Err(PortError::Unexpected("read-only filesystem".to_string()))
        }
    }

    fn store() -> (SessionStore, Arc<MemorySnapshot>) {
        let snapshot = Arc::new(MemorySnapshot::default());
        (SessionStore::new(snapshot.clone()), snapshot)
    }

    #[tokio::test]
    async fn assigns_increasing_ids_starting_at_one() {
        let (mut store, _) = store();
        assert_eq!(store.submit(sample_session(&[])).await.unwrap(), 1);
        assert_eq!(store.submit(sample_session(&[])).await.unwrap(), 2);
        assert_eq!(store.submit(sample_session(&[])).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn client_supplied_id_is_overwritten() {
        let (mut store, _) = store();
        let mut doc = sample_session(&[]);
        doc["data"]["session_data"]["id"] = json!(500);

        let id = store.submit(doc).await.unwrap();
        assert_eq!(id, 1);
        assert!(store.find_by_id(500).is_none());
        assert_eq!(store.find_by_id(1).unwrap().id(), 1);
    }

    #[tokio::test]
    async fn next_id_follows_the_largest_loaded_id() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let mut seeded = schema::validate(sample_session(&[])).unwrap();
        seeded.data.session_data.id = 41;
        snapshot.save(&[seeded]).await.unwrap();

        let mut store = SessionStore::open(snapshot).await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.submit(sample_session(&[])).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn exhausted_id_space_rejects_the_submission() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let mut seeded = schema::validate(sample_session(&[])).unwrap();
        seeded.data.session_data.id = i64::MAX;
        snapshot.save(&[seeded]).await.unwrap();
        let saves = snapshot.saves();

        let mut store = SessionStore::open(snapshot.clone()).await;
        let err = store.submit(sample_session(&[])).await.unwrap_err();

        assert!(err.mentions("/data/session_data/id"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(i64::MAX).map(Session::id), Some(i64::MAX));
        assert_eq!(snapshot.saves(), saves);
    }

    #[tokio::test]
    async fn invalid_submission_is_rejected_without_mutation() {
        let (mut store, snapshot) = store();
        store.submit(sample_session(&[])).await.unwrap();

        let mut doc = sample_session(&[]);
        doc["data"]["session_data"]
            .as_object_mut()
            .unwrap()
            .remove("name");
        let err = store.submit(doc).await.unwrap_err();

        assert!(err.mentions("/data/session_data/name"));
        assert_eq!(store.len(), 1);
        assert_eq!(snapshot.saves(), 1);
    }

    #[tokio::test]
    async fn submit_persists_the_whole_collection() {
        let (mut store, snapshot) = store();
        store.submit(sample_session(&[])).await.unwrap();
        store.submit(sample_session(&[])).await.unwrap();

        let saved = snapshot.saved().unwrap();
        assert_eq!(saved, store.list_raw());
        assert_eq!(saved.iter().map(Session::id).collect::<Vec<_>>(), [1, 2]);
    }

    #[tokio::test]
    async fn found_session_keeps_every_sub_collection() {
        let (mut store, _) = store();
        let expected = {
            let mut s = schema::validate(sample_session(&[7, 9])).unwrap();
            s.data.session_data.id = 1;
            s
        };

        let id = store.submit(sample_session(&[7, 9])).await.unwrap();
        assert_eq!(store.find_by_id(id), Some(&expected));
        assert!(store.find_by_id(2).is_none());
    }

    #[tokio::test]
    async fn raw_id_lookup_requires_a_clean_integer() {
        let (mut store, _) = store();
        store.submit(sample_session(&[])).await.unwrap();

        assert!(store.find_by_raw_id("1").is_some());
        assert!(store.find_by_raw_id(" 1 ").is_some());
        assert!(store.find_by_raw_id("1abc").is_none());
        assert!(store.find_by_raw_id("abc").is_none());
        assert!(store.find_by_raw_id("1.0").is_none());
    }

    #[tokio::test]
    async fn summaries_follow_insertion_order() {
        let (mut store, _) = store();
        for name in ["first", "second", "third"] {
            let mut doc = sample_session(&[]);
            doc["data"]["session_data"]["name"] = json!(name);
            store.submit(doc).await.unwrap();
        }

        let names: Vec<_> = store
            .list_summaries()
            .into_iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn reset_clears_memory_and_snapshot_without_reusing_ids() {
        let (mut store, snapshot) = store();
        store.submit(sample_session(&[])).await.unwrap();
        store.submit(sample_session(&[])).await.unwrap();

        store.reset_all().await;
        assert!(store.list_summaries().is_empty());
        assert!(snapshot.saved().is_none());

        assert_eq!(store.submit(sample_session(&[])).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_alarm_scans_every_session() {
        let (mut store, snapshot) = store();
        store.submit(sample_session(&[1, 2])).await.unwrap();
        store.submit(sample_session(&[7, 9])).await.unwrap();
        let saves = snapshot.saves();

        // The alarm lives in the second session; no session id is given.
        assert!(store.delete_alarm(7).await);
        assert_eq!(snapshot.saves(), saves + 1);

        let remaining: Vec<_> = store
            .find_by_id(2)
            .unwrap()
            .data
            .session_alarm
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(remaining, [9]);
        assert_eq!(store.find_by_id(1).unwrap().data.session_alarm.len(), 2);
    }

    #[tokio::test]
    async fn delete_alarm_is_idempotent_and_skips_persistence_on_miss() {
        let (mut store, snapshot) = store();
        store.submit(sample_session(&[7, 9])).await.unwrap();

        assert!(store.delete_alarm(7).await);
        let saves = snapshot.saves();
        assert!(!store.delete_alarm(7).await);
        assert!(!store.delete_alarm(12345).await);
        assert_eq!(snapshot.saves(), saves);
    }

    #[tokio::test]
    async fn delete_alarm_removes_duplicates_across_sessions() {
        let (mut store, _) = store();
        store.submit(sample_session(&[7])).await.unwrap();
        store.submit(sample_session(&[7, 8])).await.unwrap();

        assert!(store.delete_alarm(7).await);
        assert!(store.find_by_id(1).unwrap().data.session_alarm.is_empty());
        assert_eq!(store.find_by_id(2).unwrap().data.session_alarm.len(), 1);
    }

    #[tokio::test]
    async fn failed_writes_do_not_roll_back_memory() {
        let mut store = SessionStore::new(Arc::new(BrokenSnapshot));

        let id = store.submit(sample_session(&[7])).await.unwrap();
        assert_eq!(id, 1);
        assert!(store.delete_alarm(7).await);
        assert!(store.find_by_id(1).unwrap().data.session_alarm.is_empty());

        store.reset_all().await;
        assert!(store.is_empty());
    }
}

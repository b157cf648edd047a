//! Session store: one record per session with change subscriptions.

use crate::error::{RemoteError, Result};
use crate::types::{SessionId, SessionRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

/// Keyed store of session records
///
/// Upserts overwrite. Subscribers see the current record immediately and
/// every later overwrite.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replace the record of `session`
    async fn upsert(&self, session: &SessionId, record: SessionRecord) -> Result<()>;

    /// Current record of `session`, if any
    async fn get(&self, session: &SessionId) -> Result<Option<SessionRecord>>;

    /// Follow the record of `session`; `None` until the first upsert
    fn subscribe(&self, session: &SessionId) -> Result<watch::Receiver<Option<SessionRecord>>>;
}

/// In-memory session store backed by one watch channel per session
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, watch::Sender<Option<SessionRecord>>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that have a record or a subscriber
    pub fn len(&self) -> usize {
        self.lock().map(|sessions| sessions.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, watch::Sender<Option<SessionRecord>>>>>
    {
        self.sessions
            .lock()
            .map_err(|_| RemoteError::Store("session map lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn upsert(&self, session: &SessionId, record: SessionRecord) -> Result<()> {
        let mut sessions = self.lock()?;
        match sessions.get(session) {
            Some(sender) => {
                sender.send_replace(Some(record));
            }
            None => {
                let (sender, _) = watch::channel(Some(record));
                sessions.insert(session.clone(), sender);
            }
        }
        tracing::debug!("Session {} set to mode {}", session, record.mode);
        Ok(())
    }

    async fn get(&self, session: &SessionId) -> Result<Option<SessionRecord>> {
        Ok(self
            .lock()?
            .get(session)
            .and_then(|sender| *sender.borrow()))
    }

    fn subscribe(&self, session: &SessionId) -> Result<watch::Receiver<Option<SessionRecord>>> {
        let mut sessions = self.lock()?;
        let sender = sessions
            .entry(session.clone())
            .or_insert_with(|| watch::channel(None).0);
        Ok(sender.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duaelmix_core::SubIndex;

    fn session() -> SessionId {
        SessionId::parse("abcdefghij").unwrap()
    }

    #[tokio::test]
    async fn upsert_overwrites() {
        let store = MemorySessionStore::new();
        store
            .upsert(&session(), SessionRecord::new(1, SubIndex::Driven))
            .await
            .unwrap();
        store
            .upsert(&session(), SessionRecord::new(2, SubIndex::Driving))
            .await
            .unwrap();

        let record = store.get(&session()).await.unwrap().unwrap();
        assert_eq!(record, SessionRecord::new(2, SubIndex::Driving));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_session_has_no_record() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get(&session()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscriber_sees_later_upserts() {
        let store = MemorySessionStore::new();
        let mut rx = store.subscribe(&session()).unwrap();
        assert_eq!(*rx.borrow_and_update(), None);

        store
            .upsert(&session(), SessionRecord::new(7, SubIndex::Driven))
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(SessionRecord::new(7, SubIndex::Driven)));
    }
}

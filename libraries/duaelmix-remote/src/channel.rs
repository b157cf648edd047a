//! Mode channels: publish a mode, follow the mode of a session.
//!
//! A subscription is a `tokio::sync::mpsc` receiver of `SubIndex` values fed
//! by a background task. The first value is the current mode (`Driving`
//! when the session has no record yet); every later value is a change. The
//! task stops once the receiver is dropped.

use crate::error::Result;
use crate::store::SessionStore;
use crate::types::{mode_of, SessionId, SessionRecord};
use async_trait::async_trait;
use duaelmix_core::SubIndex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Buffered modes per subscription
pub(crate) const SUBSCRIPTION_BUFFER: usize = 16;

/// Two-way link between a player and its remote control
#[async_trait]
pub trait ModeChannel: Send + Sync {
    /// The session this channel is bound to
    fn session(&self) -> &SessionId;

    /// Ask for `mode` to become audible
    async fn publish(&self, mode: SubIndex) -> Result<()>;

    /// Follow the session's mode
    async fn subscribe(&self) -> Result<mpsc::Receiver<SubIndex>>;
}

/// Mode channel over an in-process `SessionStore`
pub struct LocalModeChannel {
    store: Arc<dyn SessionStore>,
    session: SessionId,
}

impl LocalModeChannel {
    pub fn new(store: Arc<dyn SessionStore>, session: SessionId) -> Self {
        Self { store, session }
    }
}

#[async_trait]
impl ModeChannel for LocalModeChannel {
    fn session(&self) -> &SessionId {
        &self.session
    }

    async fn publish(&self, mode: SubIndex) -> Result<()> {
        self.store
            .upsert(&self.session, SessionRecord::now(mode))
            .await
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<SubIndex>> {
        let mut records = self.store.subscribe(&self.session)?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let session = self.session.clone();

        tokio::spawn(async move {
            loop {
                let mode = mode_of(records.borrow_and_update().as_ref());
                if tx.send(mode).await.is_err() {
                    break;
                }
                if records.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("Mode subscription for {} ended", session);
        });

        Ok(rx)
    }
}

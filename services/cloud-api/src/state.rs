use std::sync::Arc;

use hmac_auth::{RequestValidator, SignatureLayer};
use persistence::{HistoryError, SnapshotHistoryStore};

use crate::config::CloudApiConfig;
use crate::notify::BroadcastNotifier;
use crate::store::SnapshotStore;

/// Shared service state, constructed once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub history: Arc<SnapshotHistoryStore>,
    pub notifier: Arc<BroadcastNotifier>,
    pub signature: SignatureLayer,
}

impl AppState {
    pub fn new(
        store: Arc<SnapshotStore>,
        history: Arc<SnapshotHistoryStore>,
        notifier: Arc<BroadcastNotifier>,
        signature: SignatureLayer,
    ) -> Self {
        Self {
            store,
            history,
            notifier,
            signature,
        }
    }

    /// Build every component from configuration (opens the history backend).
    pub async fn from_config(config: &CloudApiConfig) -> Result<Self, HistoryError> {
        let history = SnapshotHistoryStore::from_config(config.persistence.clone()).await?;
        let validator = RequestValidator::from_config(&config.security.hmac);

        Ok(Self::new(
            Arc::new(SnapshotStore::new()),
            Arc::new(history),
            Arc::new(BroadcastNotifier::new(config.notifications.channel_capacity)),
            SignatureLayer::new(Arc::new(validator), config.server.max_body_bytes),
        ))
    }
}

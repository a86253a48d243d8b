use insights_core::config::AppConfig;
use insights_core::source::ConversationSource;
use insights_core::store::{ConversationStore, LoadOutcome};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<RwLock<ConversationStore>>,
    pub source: Arc<dyn ConversationSource>,
}

impl AppState {
    pub fn new(config: AppConfig, source: Arc<dyn ConversationSource>) -> Self {
        Self {
            config,
            store: Arc::new(RwLock::new(ConversationStore::new())),
            source,
        }
    }

    /// Reload the store from the source.
    ///
    /// The write lock is held only to issue and settle the ticket, never
    /// across the fetch, so readers keep seeing the last-known records.
    pub async fn reload(&self) -> LoadOutcome {
        let ticket = self.store.write().await.begin_load();
        tracing::debug!("Reload #{} from {}", ticket.seq(), self.source.describe());
        let result = self.source.fetch().await;
        self.store.write().await.finish_load(ticket, result)
    }
}

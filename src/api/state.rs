use std::sync::Arc;

use crate::storage::StorageConfig;
use crate::tracker::Tracker;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageConfig>,
    pub tracker: Arc<tokio::sync::RwLock<Tracker>>,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(storage: StorageConfig, tracker: Tracker) -> Self {
        Self {
            storage: Arc::new(storage),
            tracker: Arc::new(tokio::sync::RwLock::new(tracker)),
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}

//! Global config service

use std::sync::Arc;
use std::time::Duration;

use super::with_deadline;
use crate::model::GlobalConfig;
use crate::storage::{ConfigStore, DocumentStore};
use crate::Result;

#[derive(Clone)]
pub struct ConfigService {
    store: ConfigStore,
    timeout: Duration,
}

impl ConfigService {
    pub fn new(docs: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self {
            store: ConfigStore::new(docs),
            timeout,
        }
    }

    pub async fn get(&self) -> Result<GlobalConfig> {
        with_deadline(self.timeout, self.store.get()).await
    }

    /// Save the config and return it as stored
    pub async fn save(&self, mut config: GlobalConfig) -> Result<GlobalConfig> {
        with_deadline(self.timeout, self.store.upsert(&mut config)).await?;
        tracing::info!("Saved global config (default diagram: {})", config.default_diagram_id);
        Ok(config)
    }
}

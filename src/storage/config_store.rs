//! Global config persistence: one record under a fixed id

use std::sync::Arc;

use super::document::{Document, DocumentStore, Filter, UpdateSpec};
use super::id::DocumentId;
use super::schema::Collection;
use crate::model::{GlobalConfig, GLOBAL_CONFIG_ID};
use crate::Result;

#[derive(Clone)]
pub struct ConfigStore {
    docs: Arc<dyn DocumentStore>,
}

impl ConfigStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    fn selector() -> Filter {
        Filter::Id(DocumentId::Opaque(GLOBAL_CONFIG_ID.to_string()))
    }

    /// The stored config, or the default when nothing was saved yet
    pub async fn get(&self) -> Result<GlobalConfig> {
        match self.docs.find_one(Collection::Config, Self::selector()).await? {
            Some(doc) => doc.decode("id"),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Write the config. Any id on the input is ignored.
    pub async fn upsert(&self, config: &mut GlobalConfig) -> Result<()> {
        config.id = GLOBAL_CONFIG_ID.to_string();
        let update = UpdateSpec {
            set: Document::encode(&*config, &["id"])?.body,
            ..Default::default()
        };
        self.docs.update_one(Collection::Config, Self::selector(), update, true).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, SqliteDocumentStore};

    fn store() -> ConfigStore {
        ConfigStore::new(Arc::new(SqliteDocumentStore::new(Database::open_in_memory().unwrap())))
    }

    #[tokio::test]
    async fn test_get_default_when_empty() {
        let config = store().get().await.unwrap();
        assert_eq!(config, GlobalConfig::default());
        assert_eq!(config.id, "global");
    }

    #[tokio::test]
    async fn test_upsert_forces_global_id() {
        let store = store();
        let mut config = GlobalConfig { id: "other".into(), default_diagram_id: "d1".into() };
        store.upsert(&mut config).await.unwrap();
        assert_eq!(config.id, "global");

        let mut again = GlobalConfig { id: "global".into(), default_diagram_id: "d2".into() };
        store.upsert(&mut again).await.unwrap();

        let loaded = store.get().await.unwrap();
        assert_eq!(loaded.default_diagram_id, "d2");
        assert_eq!(store.docs.count(Collection::Config, Filter::All).await.unwrap(), 1);
    }
}

//! Diagram filter persistence (at most one per diagram)

use std::sync::Arc;

use chrono::Utc;

use super::document::{Document, DocumentStore, Filter};
use super::schema::{Collection, DIAGRAM_ID_FIELD};
use crate::model::{DiagramFilter, STORE_ID_KEY};
use crate::Result;

#[derive(Clone)]
pub struct DiagramFilterStore {
    docs: Arc<dyn DocumentStore>,
}

impl DiagramFilterStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Upsert keyed by diagram id. Replacing keeps the stored identity and
    /// creation time.
    pub async fn store(&self, filter: &mut DiagramFilter) -> Result<()> {
        let now = Utc::now();
        filter.updated_at = Some(now);

        let existing = self
            .docs
            .find_one(Collection::DiagramFilters, Filter::field(DIAGRAM_ID_FIELD, filter.diagram_id.clone()))
            .await?;

        match existing {
            Some(doc) => {
                let id = doc.id.clone();
                let stored: DiagramFilter = doc.decode(STORE_ID_KEY)?;
                filter.created_at = stored.created_at.or(Some(now));
                filter.store_id = stored.store_id;

                let body = Document::encode(&*filter, &[STORE_ID_KEY])?.body;
                let selector = match id {
                    Some(id) => Filter::Id(id),
                    None => Filter::field(DIAGRAM_ID_FIELD, filter.diagram_id.clone()),
                };
                self.docs.replace_one(Collection::DiagramFilters, selector, body).await?;
            }
            None => {
                filter.created_at = Some(now);
                let doc = Document::encode(&*filter, &[STORE_ID_KEY])?;
                let id = self.docs.insert_one(Collection::DiagramFilters, doc).await?;
                filter.store_id = id.as_key();
            }
        }
        Ok(())
    }

    pub async fn get_by_diagram_id(&self, diagram_id: &str) -> Result<Option<DiagramFilter>> {
        self.docs
            .find_one(Collection::DiagramFilters, Filter::field(DIAGRAM_ID_FIELD, diagram_id))
            .await?
            .map(|doc| doc.decode(STORE_ID_KEY))
            .transpose()
    }

    pub async fn delete_by_diagram_id(&self, diagram_id: &str) -> Result<u64> {
        self.docs
            .delete_many(Collection::DiagramFilters, Filter::field(DIAGRAM_ID_FIELD, diagram_id))
            .await
    }
}

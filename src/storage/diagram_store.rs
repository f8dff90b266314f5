//! Diagram row persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::document::{Document, DocumentStore, Filter, UpdateSpec};
use super::id::DocumentId;
use super::schema::Collection;
use crate::model::Diagram;
use crate::{Error, Result};

const ID_KEY: &str = "id";
const CONTENT_KEY: &str = "content";

#[derive(Clone)]
pub struct DiagramStore {
    docs: Arc<dyn DocumentStore>,
}

impl DiagramStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Every diagram, without its content
    pub async fn fetch_all(&self) -> Result<Vec<Diagram>> {
        self.docs
            .find(Collection::Diagrams, Filter::All, &[CONTENT_KEY])
            .await?
            .into_iter()
            .map(|doc| doc.decode(ID_KEY))
            .collect()
    }

    /// Look a diagram up by its raw id, trying each identity form in turn
    pub async fn get_by_id(&self, id: &str) -> Result<Diagram> {
        match self.find_document(id).await? {
            Some(doc) => doc.decode(ID_KEY),
            None => Err(Error::NotFound(format!("diagram {}", id))),
        }
    }

    /// Insert a new diagram, or write through to `update` when it already has an id.
    pub async fn store(&self, diagram: &mut Diagram) -> Result<()> {
        let now = Utc::now();
        diagram.created_at.get_or_insert(now);
        diagram.updated_at = Some(now);

        if diagram.has_identity() {
            return self.write(diagram).await;
        }

        let doc = Document::encode(&*diagram, &[ID_KEY])?;
        let id = self.docs.insert_one(Collection::Diagrams, doc).await?;
        diagram.id = id.as_key();
        Ok(())
    }

    /// Write name, content and timestamps under the diagram's id, inserting
    /// when nothing is stored there yet.
    pub async fn update(&self, diagram: &mut Diagram) -> Result<()> {
        if !diagram.has_identity() {
            return Err(Error::Validation("diagram update requires an id".to_string()));
        }
        diagram.updated_at = Some(Utc::now());
        self.write(diagram).await
    }

    /// Remove the diagram row only. Missing ids are not an error.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        for candidate in DocumentId::candidates(id) {
            if self.docs.delete_one(Collection::Diagrams, Filter::Id(candidate)).await? > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Stored key for a raw id, if the diagram exists
    pub async fn resolve_key(&self, id: &str) -> Result<Option<String>> {
        Ok(self.find_document(id).await?.and_then(|doc| doc.id).map(|id| id.as_key()))
    }

    async fn find_document(&self, id: &str) -> Result<Option<Document>> {
        for candidate in DocumentId::candidates(id) {
            if let Some(doc) = self.docs.find_one(Collection::Diagrams, Filter::Id(candidate)).await? {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    async fn write(&self, diagram: &mut Diagram) -> Result<()> {
        // Update whichever identity form already exists; new rows take the preferred one.
        let target = match self.find_document(&diagram.id).await? {
            Some(Document { id: Some(id), .. }) => id,
            _ => DocumentId::preferred(&diagram.id),
        };
        // Children are keyed by the stored form, e.g. lowercase hex.
        diagram.id = target.as_key();

        let mut update = UpdateSpec::default();
        update.set.insert("name".to_string(), Value::String(diagram.name.clone()));
        update.set.insert(
            CONTENT_KEY.to_string(),
            diagram.content.clone().map(Value::Object).unwrap_or(Value::Null),
        );
        update.set.insert("updated_at".to_string(), serde_json::to_value(diagram.updated_at)?);
        match diagram.created_at {
            Some(created) => {
                update.set.insert("created_at".to_string(), serde_json::to_value(created)?);
            }
            None => {
                update
                    .set_on_insert
                    .insert("created_at".to_string(), serde_json::to_value(Utc::now())?);
            }
        }

        let outcome = self.docs.update_one(Collection::Diagrams, Filter::Id(target), update, true).await?;
        if diagram.created_at.is_none() {
            diagram.created_at = outcome.document.as_ref().and_then(|doc| stored_timestamp(&doc.body, "created_at"));
        }
        Ok(())
    }
}

fn stored_timestamp(body: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    body.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

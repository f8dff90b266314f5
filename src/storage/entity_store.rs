//! Per-kind child record store
//!
//! One instance per entity kind, all sharing the same document store.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;

use super::document::{Document, DocumentStore, Filter};
use super::id::DocumentId;
use super::schema::DIAGRAM_ID_FIELD;
use crate::model::{EntityKind, Record, STORE_ID_KEY};
use crate::Result;

pub struct EntityStore<T: EntityKind> {
    docs: Arc<dyn DocumentStore>,
    _kind: PhantomData<T>,
}

impl<T: EntityKind> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.docs))
    }
}

impl<T: EntityKind> EntityStore<T> {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs, _kind: PhantomData }
    }

    /// Persist one record. `created_at` is kept when already set,
    /// `updated_at` is always refreshed.
    pub async fn store(&self, record: &mut Record<T>) -> Result<DocumentId> {
        let now = Utc::now();
        if record.created_at.is_none() {
            record.created_at = Some(now);
        }
        record.updated_at = Some(now);

        let doc = Document::encode(&*record, &[STORE_ID_KEY])?;
        let id = self.docs.insert_one(T::COLLECTION, doc).await?;
        record.store_id = id.as_key();
        Ok(id)
    }

    /// Bulk insert with one shared timestamp for the whole batch.
    ///
    /// A failure part-way can leave the batch partially written; nothing
    /// here rolls that back.
    pub async fn store_multiple(&self, records: &mut [Record<T>]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut docs = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            record.created_at = Some(now);
            record.updated_at = Some(now);
            docs.push(Document::encode(&*record, &[STORE_ID_KEY])?);
        }

        let ids = self.docs.insert_many(T::COLLECTION, docs).await?;
        for (record, id) in records.iter_mut().zip(ids) {
            record.store_id = id.as_key();
        }
        Ok(())
    }

    /// All records owned by `diagram_id`, in insertion order. Empty when none.
    pub async fn get_by_diagram_id(&self, diagram_id: &str) -> Result<Vec<Record<T>>> {
        self.docs
            .find(T::COLLECTION, Filter::field(DIAGRAM_ID_FIELD, diagram_id), &[])
            .await?
            .into_iter()
            .map(|doc| doc.decode(STORE_ID_KEY))
            .collect()
    }

    /// Insert `records` as the children of `diagram_id`.
    ///
    /// This does not remove existing children; callers delete first. An empty
    /// slice is a no-op, so it can never clear a diagram's records.
    pub async fn update_by_diagram_id(&self, diagram_id: &str, records: &mut [Record<T>]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        for record in records.iter_mut() {
            record.diagram_id = diagram_id.to_string();
        }
        self.store_multiple(records).await
    }

    /// Remove every record owned by `diagram_id`. Returns how many were removed.
    pub async fn delete_by_diagram_id(&self, diagram_id: &str) -> Result<u64> {
        self.docs
            .delete_many(T::COLLECTION, Filter::field(DIAGRAM_ID_FIELD, diagram_id))
            .await
    }
}

//! Generic document store contract
//!
//! The stores above this layer only need insert/find/update/delete by filter
//! over JSON documents grouped into collections.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::id::DocumentId;
use super::schema::Collection;
use crate::{Error, Result};

/// A stored JSON document. The identity lives outside the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Option<DocumentId>,
    pub body: Map<String, Value>,
}

impl Document {
    pub fn new(body: Map<String, Value>) -> Self {
        Self { id: None, body }
    }

    pub fn with_id(id: DocumentId, body: Map<String, Value>) -> Self {
        Self { id: Some(id), body }
    }

    /// Serialize `value` into a new document, leaving out the `skip` keys
    pub fn encode<T: Serialize>(value: &T, skip: &[&str]) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(mut body) => {
                for key in skip {
                    body.remove(*key);
                }
                Ok(Self::new(body))
            }
            other => Err(Error::Backend(format!("document body must be a JSON object, got {}", other))),
        }
    }

    /// Deserialize into `T`, exposing the identity's string form under `id_key`
    pub fn decode<T: DeserializeOwned>(mut self, id_key: &str) -> Result<T> {
        if let Some(id) = &self.id {
            self.body.insert(id_key.to_string(), Value::String(id.as_key()));
        }
        Ok(serde_json::from_value(Value::Object(self.body))?)
    }
}

/// Document selection
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection
    All,
    /// Exactly the document with this identity
    Id(DocumentId),
    /// Documents whose top-level string field equals `value`
    FieldEq { field: &'static str, value: String },
}

impl Filter {
    pub fn field(field: &'static str, value: impl Into<String>) -> Self {
        Filter::FieldEq { field, value: value.into() }
    }
}

/// Field-level update: `set` is applied to matching documents,
/// `set_on_insert` only when the update upserts a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub set: Map<String, Value>,
    pub set_on_insert: Map<String, Value>,
}

/// Outcome of an `update_one`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub matched: bool,
    pub upserted: bool,
    /// The document as stored after the update, if one exists
    pub document: Option<Document>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document, generating an identity when absent
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<DocumentId>;

    /// Insert many documents in order
    async fn insert_many(&self, collection: Collection, docs: Vec<Document>) -> Result<Vec<DocumentId>>;

    /// Find matching documents in insertion order, dropping `exclude`d body fields
    async fn find(&self, collection: Collection, filter: Filter, exclude: &[&str]) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: Filter) -> Result<Option<Document>>;

    /// Apply a field-level update to the first match, optionally upserting
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        update: UpdateSpec,
        upsert: bool,
    ) -> Result<UpdateOutcome>;

    /// Replace the body of the first match. Returns the number replaced.
    async fn replace_one(&self, collection: Collection, filter: Filter, body: Map<String, Value>) -> Result<u64>;

    async fn delete_one(&self, collection: Collection, filter: Filter) -> Result<u64>;

    async fn delete_many(&self, collection: Collection, filter: Filter) -> Result<u64>;

    async fn count(&self, collection: Collection, filter: Filter) -> Result<u64>;
}

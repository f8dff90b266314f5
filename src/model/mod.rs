//! Domain model
//!
//! A [`Diagram`] owns six kinds of child records plus at most one
//! [`DiagramFilter`]. Child records share one envelope, [`Record`], which
//! carries the store identity, the owning diagram, the editor's logical id
//! and timestamps around the kind-specific attributes.

pub mod area;
pub mod custom_type;
pub mod dependency;
pub mod diagram;
pub mod filter;
pub mod global_config;
pub mod lenient;
pub mod note;
pub mod relationship;
pub mod table;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::Collection;

pub use area::{Area, AreaAttrs};
pub use custom_type::{CustomType, CustomTypeAttrs};
pub use dependency::{Dependency, DependencyAttrs};
pub use diagram::{Diagram, ENTITY_KEYS, FILTER_KEY, UNTITLED_DIAGRAM};
pub use filter::DiagramFilter;
pub use global_config::{GlobalConfig, GLOBAL_CONFIG_ID};
pub use note::{Note, NoteAttrs};
pub use relationship::{Relationship, RelationshipAttrs};
pub use table::{Table, TableAttrs};

/// Wire key exposing a record's store identity
pub const STORE_ID_KEY: &str = "storeId";

/// Kind-specific attributes of a child record.
pub trait EntityKind:
    Serialize + DeserializeOwned + Clone + Default + PartialEq + Send + Sync + 'static
{
    /// Collection the records are stored in
    const COLLECTION: Collection;
    /// Key of the record array inside a diagram's content envelope
    const CONTENT_KEY: &'static str;
}

/// A child record owned by a diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    /// Identity assigned by the store; empty until persisted
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient::string")]
    pub store_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub diagram_id: String,
    /// Editor-assigned id, stable across saves so cross references survive
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(flatten)]
    pub attrs: T,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T: EntityKind> Record<T> {
    pub fn new(diagram_id: impl Into<String>, id: impl Into<String>, attrs: T) -> Self {
        Self {
            store_id: String::new(),
            diagram_id: diagram_id.into(),
            id: id.into(),
            attrs,
            created_at: None,
            updated_at: None,
        }
    }

    /// Build a record from one entry of a content array.
    ///
    /// Returns `None` for entries that are not JSON objects. Store identity
    /// and timestamps sent by the client are discarded; the owning diagram is
    /// always `diagram_id`.
    pub fn from_content(entry: Value, diagram_id: &str) -> Option<Self> {
        if !entry.is_object() {
            return None;
        }
        match serde_json::from_value::<Self>(entry) {
            Ok(mut record) => {
                record.store_id.clear();
                record.diagram_id = diagram_id.to_string();
                record.created_at = None;
                record.updated_at = None;
                Some(record)
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable {} entry: {}", T::CONTENT_KEY, e);
                None
            }
        }
    }
}

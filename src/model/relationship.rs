//! Relationship records - foreign-key style links between table fields

use serde::{Deserialize, Serialize};

use super::{lenient, EntityKind, Record};
use crate::storage::Collection;

pub type Relationship = Record<RelationshipAttrs>;

/// Endpoints refer to the editor's logical table and field ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttrs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_table_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub target_table_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_field_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub target_field_id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_cardinality: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub target_cardinality: String,
}

impl EntityKind for RelationshipAttrs {
    const COLLECTION: Collection = Collection::Relationships;
    const CONTENT_KEY: &'static str = "relationships";
}

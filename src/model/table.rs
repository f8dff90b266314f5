//! Table records - one database table drawn on the canvas

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient, EntityKind, Record};
use crate::storage::Collection;

pub type Table = Record<TableAttrs>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAttrs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub schema: String,
    /// Column definitions, kept as the editor sent them
    #[serde(default, deserialize_with = "lenient::object_list")]
    pub fields: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient::object_list")]
    pub indexes: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub x: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub y: i64,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_view: bool,
    #[serde(default, deserialize_with = "lenient::int")]
    pub order: i64,
}

impl EntityKind for TableAttrs {
    const COLLECTION: Collection = Collection::Tables;
    const CONTENT_KEY: &'static str = "tables";
}

//! Diagram filter - which tables and schemas the editor hides

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// At most one per diagram. Order of ids is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramFilter {
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient::string")]
    pub store_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub diagram_id: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub table_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub schema_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DiagramFilter {
    pub fn new(diagram_id: impl Into<String>, table_ids: Vec<String>, schema_ids: Vec<String>) -> Self {
        Self {
            diagram_id: diagram_id.into(),
            table_ids,
            schema_ids,
            ..Default::default()
        }
    }

    /// Read the filter object from a content envelope. Non-string ids are dropped.
    pub fn from_content(map: &Map<String, Value>, diagram_id: &str) -> Self {
        let ids = |key: &str| -> Vec<String> {
            map.get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default()
        };
        Self::new(diagram_id, ids("tableIds"), ids("schemaIds"))
    }

    /// A filter with no ids in either set is never stored
    pub fn is_empty(&self) -> bool {
        self.table_ids.is_empty() && self.schema_ids.is_empty()
    }
}

//! Diagram - the top-level saved document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Name given to diagrams created without one
pub const UNTITLED_DIAGRAM: &str = "Untitled Diagram";

/// Content key holding the diagram filter object
pub const FILTER_KEY: &str = "diagramFilter";

/// Content keys managed by the engine. They only exist in a diagram's
/// content while a request is in flight; the stored row never has them.
pub const ENTITY_KEYS: [&str; 7] = [
    "tables",
    "relationships",
    "dependencies",
    "areas",
    "customTypes",
    "notes",
    FILTER_KEY,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Empty for diagrams that have never been saved
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Free-form editor payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Diagram {
    pub fn new(name: impl Into<String>, content: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            content: Some(content),
            ..Default::default()
        }
    }

    pub fn has_identity(&self) -> bool {
        !self.id.is_empty()
    }

    /// Content envelope, created empty when absent
    pub fn content_mut(&mut self) -> &mut Map<String, Value> {
        self.content.get_or_insert_with(Map::new)
    }

    /// Drop every engine-managed key from the content envelope
    pub fn strip_entity_keys(&mut self) {
        if let Some(content) = self.content.as_mut() {
            for key in ENTITY_KEYS {
                content.remove(key);
            }
        }
    }
}

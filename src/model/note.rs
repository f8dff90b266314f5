//! Note records - free text annotations on the canvas

use serde::{Deserialize, Serialize};

use super::{lenient, EntityKind, Record};
use crate::storage::Collection;

pub type Note = Record<NoteAttrs>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteAttrs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub x: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub y: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub width: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub height: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub color: String,
}

impl EntityKind for NoteAttrs {
    const COLLECTION: Collection = Collection::Notes;
    const CONTENT_KEY: &'static str = "notes";
}

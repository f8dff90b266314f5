//! Area records - colored regions grouping tables on the canvas

use serde::{Deserialize, Serialize};

use super::{lenient, EntityKind, Record};
use crate::storage::Collection;

pub type Area = Record<AreaAttrs>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaAttrs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
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

impl EntityKind for AreaAttrs {
    const COLLECTION: Collection = Collection::Areas;
    const CONTENT_KEY: &'static str = "areas";
}

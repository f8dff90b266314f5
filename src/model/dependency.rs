//! Dependency records - view/table dependencies between tables

use serde::{Deserialize, Serialize};

use super::{lenient, EntityKind, Record};
use crate::storage::Collection;

pub type Dependency = Record<DependencyAttrs>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAttrs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub schema: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub table_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dependent_schema: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dependent_table_id: String,
}

impl EntityKind for DependencyAttrs {
    const COLLECTION: Collection = Collection::Dependencies;
    const CONTENT_KEY: &'static str = "dependencies";
}

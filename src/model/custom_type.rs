//! Custom type records - enum and composite type definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient, EntityKind, Record};
use crate::storage::Collection;

pub type CustomType = Record<CustomTypeAttrs>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTypeAttrs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub schema: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub type_name: String,
    /// `enum`, `composite`, ...
    #[serde(default, deserialize_with = "lenient::string")]
    pub kind: String,
    /// Enum labels; stored untouched
    #[serde(default)]
    pub values: Value,
    /// Composite members; stored untouched
    #[serde(default)]
    pub fields: Value,
}

impl EntityKind for CustomTypeAttrs {
    const COLLECTION: Collection = Collection::CustomTypes;
    const CONTENT_KEY: &'static str = "customTypes";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_type_passes_values_through() {
        let ct = CustomType::from_content(
            json!({
                "id": "c1",
                "schema": "public",
                "name": "mood",
                "kind": "enum",
                "values": ["sad", "ok", "happy"]
            }),
            "d1",
        )
        .unwrap();
        assert_eq!(ct.attrs.kind, "enum");
        assert_eq!(ct.attrs.values, json!(["sad", "ok", "happy"]));
        assert_eq!(ct.attrs.fields, Value::Null);
    }
}

//! Global editor configuration - a single record shared by every client

use serde::{Deserialize, Serialize};

/// The only identity the config record ever has
pub const GLOBAL_CONFIG_ID: &str = "global";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default = "global_id")]
    pub id: String,
    /// Diagram the editor opens on start
    #[serde(default)]
    pub default_diagram_id: String,
}

fn global_id() -> String {
    GLOBAL_CONFIG_ID.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            id: global_id(),
            default_diagram_id: String::new(),
        }
    }
}

//! # Vertex - Diagram Persistence Backend
//!
//! Stores database-schema diagrams and serves them over HTTP.
//!
//! Vertex provides:
//! - A document store abstraction with a SQLite-backed implementation
//! - Typed per-kind stores for tables, relationships, dependencies, areas,
//!   custom types, notes and diagram filters
//! - The decomposition engine that splits a nested diagram document into
//!   those stores on save and reassembles it on read
//! - An axum HTTP surface for diagrams and the global config singleton

pub mod config;
pub mod engine;
pub mod model;
pub mod server;
pub mod storage;

use std::time::Duration;

// Re-exports for convenient access
pub use engine::{ConfigService, DiagramEngine};
pub use model::{Diagram, DiagramFilter, GlobalConfig};
pub use storage::{Database, DocumentId, SqliteDocumentStore};

/// Result type alias for Vertex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Vertex operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// True for every failure that originates in the storage layer,
    /// including deadline expiry.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Storage(_) | Error::Backend(_) | Error::Serialization(_) | Error::Timeout(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

//! Storage Layer - SQLite-backed document persistence
//!
//! System of record is SQLite with one table per collection:
//! - diagrams(seq, id, id_kind, body)
//! - tables, relationships, dependencies, areas, custom_types, notes
//!   (child records, indexed on `body.diagramId`)
//! - diagram_filters (unique on `body.diagramId`)
//! - config (the global singleton)
//!
//! The typed stores only talk to the [`DocumentStore`] trait, so another
//! backend can be dropped in without touching the engine.

pub mod config_store;
pub mod database;
pub mod diagram_store;
pub mod document;
pub mod entity_store;
pub mod filter_store;
pub mod id;
pub mod schema;
pub mod sqlite;

pub use config_store::ConfigStore;
pub use database::Database;
pub use diagram_store::DiagramStore;
pub use document::{Document, DocumentStore, Filter, UpdateOutcome, UpdateSpec};
pub use entity_store::EntityStore;
pub use filter_store::DiagramFilterStore;
pub use id::{DocumentId, ObjectId};
pub use schema::{Collection, DIAGRAM_ID_FIELD};
pub use sqlite::{DbStats, SqliteDocumentStore};

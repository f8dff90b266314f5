//! Decomposition / recomposition engine
//!
//! A diagram arrives as one nested document: scalar fields plus a content
//! envelope holding arrays of tables, relationships, dependencies, areas,
//! custom types and notes, and an optional filter object. On save the engine
//! moves each array into its own store and persists a slimmed diagram row;
//! on read it reassembles the document.
//!
//! Neither direction is transactional. Save replaces one kind at a time
//! (delete, then insert) and a failure part-way leaves earlier kinds replaced.
//! Delete cascades in the same fixed order with the same behaviour.

pub mod config;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::model::{
    AreaAttrs, CustomTypeAttrs, DependencyAttrs, Diagram, DiagramFilter, EntityKind, NoteAttrs, Record,
    RelationshipAttrs, TableAttrs, FILTER_KEY, UNTITLED_DIAGRAM,
};
use crate::storage::{DiagramFilterStore, DiagramStore, DocumentStore, EntityStore};
use crate::{Error, Result};

pub use config::ConfigService;

/// Default deadline for one engine operation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut` under `limit`, mapping expiry to [`Error::Timeout`].
pub(crate) async fn with_deadline<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Storage operation exceeded {:?}", limit);
            Err(Error::Timeout(limit))
        }
    }
}

#[derive(Clone)]
pub struct DiagramEngine {
    diagrams: DiagramStore,
    tables: EntityStore<TableAttrs>,
    relationships: EntityStore<RelationshipAttrs>,
    dependencies: EntityStore<DependencyAttrs>,
    areas: EntityStore<AreaAttrs>,
    custom_types: EntityStore<CustomTypeAttrs>,
    notes: EntityStore<NoteAttrs>,
    filters: DiagramFilterStore,
    timeout: Duration,
}

impl DiagramEngine {
    pub fn new(docs: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self {
            diagrams: DiagramStore::new(Arc::clone(&docs)),
            tables: EntityStore::new(Arc::clone(&docs)),
            relationships: EntityStore::new(Arc::clone(&docs)),
            dependencies: EntityStore::new(Arc::clone(&docs)),
            areas: EntityStore::new(Arc::clone(&docs)),
            custom_types: EntityStore::new(Arc::clone(&docs)),
            notes: EntityStore::new(Arc::clone(&docs)),
            filters: DiagramFilterStore::new(docs),
            timeout,
        }
    }

    /// Diagram summaries, content omitted
    pub async fn get_all(&self) -> Result<Vec<Diagram>> {
        with_deadline(self.timeout, self.diagrams.fetch_all()).await
    }

    /// Load one diagram with every child collection injected into its content.
    pub async fn get_one(&self, id: &str) -> Result<Diagram> {
        with_deadline(self.timeout, self.assemble(id)).await
    }

    /// Persist a diagram and its children. Returns the diagram with its
    /// assigned id and the cleaned content that was stored.
    pub async fn save(&self, diagram: Option<Diagram>) -> Result<Diagram> {
        let diagram = diagram.ok_or_else(|| Error::Validation("diagram body is required".to_string()))?;
        with_deadline(self.timeout, self.decompose(diagram)).await
    }

    /// Cascade-delete a diagram and everything it owns.
    pub async fn delete(&self, id: &str) -> Result<()> {
        with_deadline(self.timeout, self.cascade_delete(id)).await
    }

    // ========== Read Path ==========

    async fn assemble(&self, id: &str) -> Result<Diagram> {
        let mut diagram = self.diagrams.get_by_id(id).await?;
        let key = diagram.id.clone();

        let tables = self.tables.get_by_diagram_id(&key).await?;
        let relationships = self.relationships.get_by_diagram_id(&key).await?;
        let dependencies = self.dependencies.get_by_diagram_id(&key).await?;
        let areas = self.areas.get_by_diagram_id(&key).await?;
        let custom_types = self.custom_types.get_by_diagram_id(&key).await?;
        let notes = self.notes.get_by_diagram_id(&key).await?;
        let filter = self.filters.get_by_diagram_id(&key).await?;

        let content = diagram.content_mut();
        inject(content, tables)?;
        inject(content, relationships)?;
        inject(content, dependencies)?;
        inject(content, areas)?;
        inject(content, custom_types)?;
        inject(content, notes)?;
        if let Some(filter) = filter {
            content.insert(FILTER_KEY.to_string(), serde_json::to_value(filter)?);
        }

        tracing::debug!("Assembled diagram {}", key);
        Ok(diagram)
    }

    // ========== Write Path ==========

    async fn decompose(&self, mut diagram: Diagram) -> Result<Diagram> {
        if diagram.has_identity() {
            self.diagrams.update(&mut diagram).await?;
        } else {
            if diagram.name.is_empty() {
                diagram.name = UNTITLED_DIAGRAM.to_string();
            }
            self.diagrams.store(&mut diagram).await?;
        }
        let id = diagram.id.clone();
        tracing::debug!("Saved diagram row {}", id);

        let content = diagram.content.as_ref();
        replace_children(&self.tables, &id, content).await?;
        replace_children(&self.relationships, &id, content).await?;
        replace_children(&self.dependencies, &id, content).await?;
        replace_children(&self.areas, &id, content).await?;
        replace_children(&self.custom_types, &id, content).await?;
        replace_children(&self.notes, &id, content).await?;
        self.sync_filter(&id, content).await?;

        diagram.strip_entity_keys();
        self.diagrams.update(&mut diagram).await?;

        tracing::info!("Saved diagram {} ({})", id, diagram.name);
        Ok(diagram)
    }

    async fn sync_filter(&self, diagram_id: &str, content: Option<&Map<String, Value>>) -> Result<()> {
        let Some(content) = content else {
            return Ok(());
        };

        match content.get(FILTER_KEY).and_then(Value::as_object) {
            Some(map) => {
                let mut filter = DiagramFilter::from_content(map, diagram_id);
                if filter.is_empty() {
                    self.filters.delete_by_diagram_id(diagram_id).await?;
                } else {
                    self.filters.store(&mut filter).await?;
                }
            }
            None => {
                self.filters.delete_by_diagram_id(diagram_id).await?;
            }
        }
        Ok(())
    }

    // ========== Delete Path ==========

    async fn cascade_delete(&self, raw_id: &str) -> Result<()> {
        let key = self.diagrams.resolve_key(raw_id).await?;
        let id = key.as_deref().unwrap_or(raw_id);

        let mut removed = 0;
        removed += self.tables.delete_by_diagram_id(id).await?;
        removed += self.relationships.delete_by_diagram_id(id).await?;
        removed += self.dependencies.delete_by_diagram_id(id).await?;
        removed += self.areas.delete_by_diagram_id(id).await?;
        removed += self.custom_types.delete_by_diagram_id(id).await?;
        removed += self.notes.delete_by_diagram_id(id).await?;
        removed += self.filters.delete_by_diagram_id(id).await?;

        if self.diagrams.delete(id).await? {
            tracing::info!("Deleted diagram {} and {} child records", id, removed);
        } else {
            tracing::debug!("Delete of unknown diagram {} removed {} child records", id, removed);
        }
        Ok(())
    }
}

fn inject<T: EntityKind>(content: &mut Map<String, Value>, records: Vec<Record<T>>) -> Result<()> {
    content.insert(T::CONTENT_KEY.to_string(), serde_json::to_value(records)?);
    Ok(())
}

/// Delete-then-insert one kind under `diagram_id`. A missing or non-array
/// content key leaves stored records untouched; non-object entries are skipped.
async fn replace_children<T: EntityKind>(
    store: &EntityStore<T>,
    diagram_id: &str,
    content: Option<&Map<String, Value>>,
) -> Result<()> {
    let Some(entries) = content.and_then(|c| c.get(T::CONTENT_KEY)).and_then(Value::as_array) else {
        return Ok(());
    };

    let removed = store.delete_by_diagram_id(diagram_id).await?;
    let mut records: Vec<Record<T>> = entries
        .iter()
        .cloned()
        .filter_map(|entry| Record::from_content(entry, diagram_id))
        .collect();

    tracing::debug!(
        "Replacing {} for {}: removed {}, inserting {} of {}",
        T::CONTENT_KEY,
        diagram_id,
        removed,
        records.len(),
        entries.len()
    );
    store.update_by_diagram_id(diagram_id, &mut records).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, ENTITY_KEYS};
    use crate::storage::{
        Collection, Database, Document, DocumentId, Filter, SqliteDocumentStore, UpdateOutcome, UpdateSpec,
    };
    use async_trait::async_trait;
    use serde_json::json;

    fn docs() -> Arc<SqliteDocumentStore> {
        Arc::new(SqliteDocumentStore::new(Database::open_in_memory().unwrap()))
    }

    fn engine() -> DiagramEngine {
        DiagramEngine::new(docs(), DEFAULT_TIMEOUT)
    }

    fn diagram(id: &str, name: &str, content: Value) -> Diagram {
        let mut diagram = Diagram::new(name, content.as_object().cloned().unwrap());
        diagram.id = id.to_string();
        diagram
    }

    fn full_content() -> Value {
        json!({
            "databaseType": "postgresql",
            "tables": [
                {"id": "t1", "name": "users", "schema": "public", "x": 10.7, "y": 20,
                 "fields": [{"id": "f1", "name": "id", "primaryKey": true}], "isView": false, "order": 0},
                {"id": "t2", "name": "orders", "schema": "public", "x": 300, "y": 20, "color": "#ff0000"}
            ],
            "relationships": [
                {"id": "r1", "name": "orders_user", "sourceTableId": "t2", "targetTableId": "t1",
                 "sourceFieldId": "f9", "targetFieldId": "f1", "type": "many_to_one",
                 "sourceCardinality": "many", "targetCardinality": "one"}
            ],
            "dependencies": [
                {"id": "dep1", "schema": "public", "tableId": "v1", "dependentSchema": "public", "dependentTableId": "t1"}
            ],
            "areas": [{"id": "a1", "name": "core", "x": 0, "y": 0, "width": 800, "height": 600, "color": "#eee"}],
            "customTypes": [{"id": "c1", "schema": "public", "name": "mood", "kind": "enum", "values": ["sad", "ok"]}],
            "notes": [{"id": "n1", "content": "remember", "x": 5, "y": 5, "width": 100, "height": 50}],
            "diagramFilter": {"tableIds": ["t1"], "schemaIds": []}
        })
    }

    /// Logical id and attributes of one kind, store identity and timestamps dropped
    fn children<T: EntityKind>(diagram: &Diagram) -> Vec<(String, T)> {
        diagram.content.as_ref().unwrap()[T::CONTENT_KEY]
            .as_array()
            .unwrap()
            .iter()
            .cloned()
            .filter_map(|entry| Record::<T>::from_content(entry, ""))
            .map(|record| (record.id, record.attrs))
            .collect()
    }

    fn assert_same_children<T: EntityKind + std::fmt::Debug>(left: &Diagram, right: &Diagram) {
        let left = children::<T>(left);
        assert!(!left.is_empty(), "{}", T::CONTENT_KEY);
        assert_eq!(left, children::<T>(right), "{}", T::CONTENT_KEY);
    }

    fn tables_of(diagram: &Diagram) -> Vec<Table> {
        serde_json::from_value(diagram.content.as_ref().unwrap()["tables"].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();
        assert!(saved.has_identity());

        let loaded = engine.get_one(&saved.id).await.unwrap();
        let content = loaded.content.as_ref().unwrap();

        assert_eq!(content["databaseType"], "postgresql");
        for key in ["tables", "relationships", "dependencies", "areas", "customTypes", "notes"] {
            assert_eq!(
                content[key].as_array().unwrap().len(),
                full_content()[key].as_array().unwrap().len(),
                "{}",
                key
            );
        }

        let tables = tables_of(&loaded);
        assert_eq!(tables[0].id, "t1");
        assert_eq!(tables[0].diagram_id, saved.id);
        assert_eq!(tables[0].attrs.x, 10);
        assert_eq!(tables[0].attrs.fields[0]["name"], "id");
        assert_eq!(tables[1].attrs.color, "#ff0000");
        assert!(!tables[0].store_id.is_empty());

        let rel = &content["relationships"][0];
        assert_eq!(rel["type"], "many_to_one");
        assert_eq!(rel["sourceCardinality"], "many");
        assert_eq!(content["customTypes"][0]["values"], json!(["sad", "ok"]));
        assert_eq!(content["diagramFilter"]["tableIds"], json!(["t1"]));
    }

    #[tokio::test]
    async fn test_saved_children_reload_unchanged() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();
        let first = engine.get_one(&saved.id).await.unwrap();

        // resave exactly what was loaded
        let resaved = engine.save(Some(first.clone())).await.unwrap();
        let second = engine.get_one(&resaved.id).await.unwrap();

        assert_same_children::<TableAttrs>(&first, &second);
        assert_same_children::<RelationshipAttrs>(&first, &second);
        assert_same_children::<DependencyAttrs>(&first, &second);
        assert_same_children::<AreaAttrs>(&first, &second);
        assert_same_children::<CustomTypeAttrs>(&first, &second);
        assert_same_children::<NoteAttrs>(&first, &second);

        // and both match what was sent in the first place
        let sent = diagram("", "shop", full_content());
        assert_same_children::<TableAttrs>(&sent, &first);
        assert_same_children::<RelationshipAttrs>(&sent, &first);
        assert_same_children::<DependencyAttrs>(&sent, &first);
        assert_same_children::<AreaAttrs>(&sent, &first);
        assert_same_children::<CustomTypeAttrs>(&sent, &first);
        assert_same_children::<NoteAttrs>(&sent, &first);
    }

    #[tokio::test]
    async fn test_save_twice_does_not_duplicate() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();
        engine.save(Some(diagram(&saved.id, "shop", full_content()))).await.unwrap();

        let loaded = engine.get_one(&saved.id).await.unwrap();
        let content = loaded.content.unwrap();
        assert_eq!(content["tables"].as_array().unwrap().len(), 2);
        assert_eq!(content["notes"].as_array().unwrap().len(), 1);
        assert_eq!(engine.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_kind_is_left_untouched() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();

        let partial = json!({"tables": [{"id": "t9", "name": "only"}], "areas": "not-an-array"});
        engine.save(Some(diagram(&saved.id, "shop", partial))).await.unwrap();

        let content = engine.get_one(&saved.id).await.unwrap().content.unwrap();
        assert_eq!(content["tables"].as_array().unwrap().len(), 1);
        assert_eq!(content["notes"].as_array().unwrap().len(), 1);
        assert_eq!(content["areas"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_array_clears_kind() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();
        engine.save(Some(diagram(&saved.id, "shop", json!({"tables": []})))).await.unwrap();

        let content = engine.get_one(&saved.id).await.unwrap().content.unwrap();
        assert_eq!(content["tables"], json!([]));
    }

    #[tokio::test]
    async fn test_empty_filter_deletes_stored_filter() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();

        let cleared = json!({"diagramFilter": {"tableIds": [], "schemaIds": []}});
        engine.save(Some(diagram(&saved.id, "shop", cleared))).await.unwrap();

        let content = engine.get_one(&saved.id).await.unwrap().content.unwrap();
        assert!(!content.contains_key(FILTER_KEY));
    }

    #[tokio::test]
    async fn test_absent_filter_key_deletes_stored_filter() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();
        engine.save(Some(diagram(&saved.id, "shop", json!({"zoom": 1})))).await.unwrap();

        let content = engine.get_one(&saved.id).await.unwrap().content.unwrap();
        assert!(!content.contains_key(FILTER_KEY));
        assert_eq!(content["zoom"], 1);
    }

    #[tokio::test]
    async fn test_no_content_leaves_filter() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();

        let bare = Diagram { id: saved.id.clone(), name: "renamed".into(), ..Default::default() };
        engine.save(Some(bare)).await.unwrap();

        let loaded = engine.get_one(&saved.id).await.unwrap();
        assert_eq!(loaded.name, "renamed");
        assert!(loaded.content.unwrap().contains_key(FILTER_KEY));
    }

    #[tokio::test]
    async fn test_cascade_delete() {
        let docs = docs();
        let engine = DiagramEngine::new(docs.clone(), DEFAULT_TIMEOUT);
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();
        let keep = engine.save(Some(diagram("", "other", full_content()))).await.unwrap();

        engine.delete(&saved.id).await.unwrap();

        assert!(engine.get_one(&saved.id).await.unwrap_err().is_not_found());
        assert!(engine.tables.get_by_diagram_id(&saved.id).await.unwrap().is_empty());
        assert!(engine.relationships.get_by_diagram_id(&saved.id).await.unwrap().is_empty());
        assert!(engine.dependencies.get_by_diagram_id(&saved.id).await.unwrap().is_empty());
        assert!(engine.areas.get_by_diagram_id(&saved.id).await.unwrap().is_empty());
        assert!(engine.custom_types.get_by_diagram_id(&saved.id).await.unwrap().is_empty());
        assert!(engine.notes.get_by_diagram_id(&saved.id).await.unwrap().is_empty());
        assert!(engine.filters.get_by_diagram_id(&saved.id).await.unwrap().is_none());

        let stats = docs.stats().await.unwrap();
        assert_eq!(stats.get(Collection::Diagrams), 1);
        assert_eq!(stats.get(Collection::Tables), 2);
        assert!(engine.get_one(&keep.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_uppercase_hex_id_keeps_children() {
        let engine = engine();
        let upper = "65A1B2C3D4E5F60718293A4B";
        let content = json!({"tables": [{"id": "t1", "name": "users"}], "notes": [{"id": "n1"}]});
        let saved = engine.save(Some(diagram(upper, "shop", content))).await.unwrap();

        let canonical = "65a1b2c3d4e5f60718293a4b";
        assert_eq!(saved.id, canonical);
        assert_eq!(engine.get_all().await.unwrap()[0].id, canonical);

        for id in [upper, canonical] {
            let loaded = engine.get_one(id).await.unwrap();
            assert_eq!(loaded.id, canonical);
            let tables = tables_of(&loaded);
            assert_eq!(tables.len(), 1);
            assert_eq!(tables[0].diagram_id, canonical);
        }

        engine.delete(upper).await.unwrap();
        assert!(engine.tables.get_by_diagram_id(canonical).await.unwrap().is_empty());
        assert!(engine.notes.get_by_diagram_id(canonical).await.unwrap().is_empty());
        assert!(engine.get_one(canonical).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_unknown_diagram_succeeds() {
        engine().delete("never-saved").await.unwrap();
    }

    #[tokio::test]
    async fn test_untitled_default() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "", json!({})))).await.unwrap();
        assert_eq!(saved.name, UNTITLED_DIAGRAM);
        assert_eq!(engine.get_one(&saved.id).await.unwrap().name, UNTITLED_DIAGRAM);
    }

    #[tokio::test]
    async fn test_named_update_keeps_empty_name() {
        let engine = engine();
        let saved = engine.save(Some(diagram("my-id", "", json!({})))).await.unwrap();
        assert_eq!(saved.id, "my-id");
        assert_eq!(saved.name, "");
    }

    #[tokio::test]
    async fn test_malformed_children_skipped() {
        let engine = engine();
        let content = json!({"tables": ["users", 42, {"id": "t1", "name": "orders", "x": "left"}, null]});
        let saved = engine.save(Some(diagram("", "shop", content))).await.unwrap();

        let tables = tables_of(&engine.get_one(&saved.id).await.unwrap());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].attrs.name, "orders");
        assert_eq!(tables[0].attrs.x, 0);
    }

    #[tokio::test]
    async fn test_content_is_clean_after_save() {
        let engine = engine();
        let saved = engine.save(Some(diagram("", "shop", full_content()))).await.unwrap();

        let returned = saved.content.as_ref().unwrap();
        let row = engine.diagrams.get_by_id(&saved.id).await.unwrap();
        let stored = row.content.unwrap();
        for key in ENTITY_KEYS {
            assert!(!returned.contains_key(key), "{}", key);
            assert!(!stored.contains_key(key), "{}", key);
        }
        assert_eq!(stored["databaseType"], "postgresql");
    }

    #[tokio::test]
    async fn test_nil_diagram_rejected() {
        let err = engine().save(None).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_missing_not_found() {
        assert!(engine().get_one("nope").await.unwrap_err().is_not_found());
    }

    // ========== Fault Injection ==========

    /// Delegates to SQLite, failing inserts into one collection and
    /// optionally stalling every call.
    struct FaultyStore {
        inner: SqliteDocumentStore,
        fail_inserts_into: Option<Collection>,
        delay: Option<Duration>,
    }

    impl FaultyStore {
        async fn gate(&self, collection: Collection) -> Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_inserts_into == Some(collection) {
                return Err(Error::Backend(format!("injected failure on {}", collection)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentStore for FaultyStore {
        async fn insert_one(&self, collection: Collection, doc: Document) -> Result<DocumentId> {
            self.gate(collection).await?;
            self.inner.insert_one(collection, doc).await
        }

        async fn insert_many(&self, collection: Collection, docs: Vec<Document>) -> Result<Vec<DocumentId>> {
            self.gate(collection).await?;
            self.inner.insert_many(collection, docs).await
        }

        async fn find(&self, collection: Collection, filter: Filter, exclude: &[&str]) -> Result<Vec<Document>> {
            self.inner.find(collection, filter, exclude).await
        }

        async fn find_one(&self, collection: Collection, filter: Filter) -> Result<Option<Document>> {
            self.inner.find_one(collection, filter).await
        }

        async fn update_one(
            &self,
            collection: Collection,
            filter: Filter,
            update: UpdateSpec,
            upsert: bool,
        ) -> Result<UpdateOutcome> {
            self.inner.update_one(collection, filter, update, upsert).await
        }

        async fn replace_one(&self, collection: Collection, filter: Filter, body: Map<String, Value>) -> Result<u64> {
            self.inner.replace_one(collection, filter, body).await
        }

        async fn delete_one(&self, collection: Collection, filter: Filter) -> Result<u64> {
            self.inner.delete_one(collection, filter).await
        }

        async fn delete_many(&self, collection: Collection, filter: Filter) -> Result<u64> {
            self.inner.delete_many(collection, filter).await
        }

        async fn count(&self, collection: Collection, filter: Filter) -> Result<u64> {
            self.inner.count(collection, filter).await
        }
    }

    #[tokio::test]
    async fn test_failed_save_keeps_earlier_kinds() {
        let db = Database::open_in_memory().unwrap();
        let healthy = DiagramEngine::new(Arc::new(SqliteDocumentStore::new(db.clone())), DEFAULT_TIMEOUT);
        let saved = healthy.save(Some(diagram("", "shop", full_content()))).await.unwrap();

        let faulty = DiagramEngine::new(
            Arc::new(FaultyStore {
                inner: SqliteDocumentStore::new(db),
                fail_inserts_into: Some(Collection::Relationships),
                delay: None,
            }),
            DEFAULT_TIMEOUT,
        );
        let next = json!({
            "tables": [{"id": "t7", "name": "replaced"}],
            "relationships": [{"id": "r7"}],
            "notes": []
        });
        let err = faulty.save(Some(diagram(&saved.id, "shop", next))).await.unwrap_err();
        assert!(err.is_storage());

        let content = healthy.get_one(&saved.id).await.unwrap().content.unwrap();
        // tables were replaced before the failure; relationships were deleted
        // but not reinserted; notes were never reached
        assert_eq!(content["tables"][0]["name"], "replaced");
        assert_eq!(content["relationships"], json!([]));
        assert_eq!(content["notes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let engine = DiagramEngine::new(
            Arc::new(FaultyStore {
                inner: SqliteDocumentStore::new(Database::open_in_memory().unwrap()),
                fail_inserts_into: None,
                delay: Some(Duration::from_millis(500)),
            }),
            Duration::from_millis(50),
        );

        let err = engine.save(Some(diagram("", "slow", json!({})))).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.is_storage());
    }
}

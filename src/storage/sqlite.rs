//! SQLite storage implementation

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{Map, Value};

use super::database::Database;
use super::document::{Document, DocumentStore, Filter, UpdateOutcome, UpdateSpec};
use super::id::DocumentId;
use super::schema::Collection;
use crate::{Error, Result};

/// SQLite-backed document store
#[derive(Clone)]
pub struct SqliteDocumentStore {
    db: Database,
}

impl SqliteDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Document counts per collection
    pub async fn stats(&self) -> Result<DbStats> {
        let mut counts = Vec::with_capacity(Collection::all().len());
        for collection in Collection::all() {
            counts.push((*collection, self.count(*collection, Filter::All).await?));
        }
        Ok(DbStats { counts })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub counts: Vec<(Collection, u64)>,
}

impl DbStats {
    pub fn get(&self, collection: Collection) -> u64 {
        self.counts
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (collection, count) in &self.counts {
            writeln!(f, "  {}: {}", collection, count)?;
        }
        Ok(())
    }
}

/// A raw row: `(seq, id, id_kind, body)`
type RawRow = (i64, String, String, String);

// ========== Query Helpers ==========

/// Build the WHERE clause and its bound parameters for a filter
fn where_clause(filter: &Filter) -> Result<(String, Vec<String>)> {
    match filter {
        Filter::All => Ok(("1 = 1".to_string(), Vec::new())),
        Filter::Id(id) => Ok((
            "id_kind = ?1 AND id = ?2".to_string(),
            vec![id.kind_str().to_string(), id.as_key()],
        )),
        Filter::FieldEq { field, value } => {
            if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(Error::Validation(format!("invalid filter field: {}", field)));
            }
            Ok((format!("json_extract(body, '$.{}') = ?1", field), vec![value.clone()]))
        }
    }
}

fn select_rows(conn: &Connection, collection: Collection, filter: &Filter, limit: Option<usize>) -> Result<Vec<RawRow>> {
    let (clause, args) = where_clause(filter)?;
    let mut sql = format!(
        "SELECT seq, id, id_kind, body FROM {} WHERE {} ORDER BY seq",
        collection.as_str(),
        clause
    );
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<Vec<RawRow>>>()?;
    Ok(rows)
}

fn first_row(conn: &Connection, collection: Collection, filter: &Filter) -> Result<Option<RawRow>> {
    Ok(select_rows(conn, collection, filter, Some(1))?.into_iter().next())
}

fn row_to_document(row: RawRow, exclude: &[String]) -> Result<Document> {
    let (_, key, kind, body) = row;
    let mut body: Map<String, Value> = serde_json::from_str(&body)?;
    for field in exclude {
        body.remove(field);
    }
    Ok(Document::with_id(DocumentId::from_parts(&kind, &key)?, body))
}

fn insert_document(conn: &Connection, collection: Collection, doc: Document) -> Result<DocumentId> {
    let id = doc.id.unwrap_or_else(DocumentId::generate);
    let body = serde_json::to_string(&doc.body)?;
    conn.execute(
        &format!("INSERT INTO {} (id, id_kind, body) VALUES (?1, ?2, ?3)", collection.as_str()),
        params![id.as_key(), id.kind_str(), body],
    )?;
    Ok(id)
}

fn write_body(conn: &Connection, collection: Collection, seq: i64, body: &Map<String, Value>) -> Result<()> {
    conn.execute(
        &format!("UPDATE {} SET body = ?1 WHERE seq = ?2", collection.as_str()),
        params![serde_json::to_string(body)?, seq],
    )?;
    Ok(())
}

fn update_document(
    conn: &mut Connection,
    collection: Collection,
    filter: &Filter,
    update: UpdateSpec,
    upsert: bool,
) -> Result<UpdateOutcome> {
    let tx = conn.transaction()?;

    let outcome = match first_row(&tx, collection, filter)? {
        Some(row) => {
            let seq = row.0;
            let mut doc = row_to_document(row, &[])?;
            for (key, value) in update.set {
                doc.body.insert(key, value);
            }
            write_body(&tx, collection, seq, &doc.body)?;
            UpdateOutcome { matched: true, upserted: false, document: Some(doc) }
        }
        None if upsert => {
            let mut body = update.set_on_insert;
            if let Filter::FieldEq { field, value } = filter {
                body.insert(field.to_string(), Value::String(value.clone()));
            }
            for (key, value) in update.set {
                body.insert(key, value);
            }
            let id = match filter {
                Filter::Id(id) => id.clone(),
                _ => DocumentId::generate(),
            };
            let id = insert_document(&tx, collection, Document::with_id(id, body.clone()))?;
            UpdateOutcome {
                matched: false,
                upserted: true,
                document: Some(Document::with_id(id, body)),
            }
        }
        None => UpdateOutcome { matched: false, upserted: false, document: None },
    };

    tx.commit()?;
    Ok(outcome)
}

// ========== DocumentStore ==========

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<DocumentId> {
        self.db.call(move |conn| insert_document(conn, collection, doc)).await
    }

    async fn insert_many(&self, collection: Collection, docs: Vec<Document>) -> Result<Vec<DocumentId>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut ids = Vec::with_capacity(docs.len());
                for doc in docs {
                    ids.push(insert_document(&tx, collection, doc)?);
                }
                tx.commit()?;
                Ok(ids)
            })
            .await
    }

    async fn find(&self, collection: Collection, filter: Filter, exclude: &[&str]) -> Result<Vec<Document>> {
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        self.db
            .call(move |conn| {
                select_rows(conn, collection, &filter, None)?
                    .into_iter()
                    .map(|row| row_to_document(row, &exclude))
                    .collect()
            })
            .await
    }

    async fn find_one(&self, collection: Collection, filter: Filter) -> Result<Option<Document>> {
        self.db
            .call(move |conn| {
                first_row(conn, collection, &filter)?
                    .map(|row| row_to_document(row, &[]))
                    .transpose()
            })
            .await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        update: UpdateSpec,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        self.db
            .call(move |conn| update_document(conn, collection, &filter, update, upsert))
            .await
    }

    async fn replace_one(&self, collection: Collection, filter: Filter, body: Map<String, Value>) -> Result<u64> {
        self.db
            .call(move |conn| match first_row(conn, collection, &filter)? {
                Some((seq, ..)) => {
                    write_body(conn, collection, seq, &body)?;
                    Ok(1)
                }
                None => Ok(0),
            })
            .await
    }

    async fn delete_one(&self, collection: Collection, filter: Filter) -> Result<u64> {
        self.db
            .call(move |conn| match first_row(conn, collection, &filter)? {
                Some((seq, ..)) => {
                    let removed = conn.execute(
                        &format!("DELETE FROM {} WHERE seq = ?1", collection.as_str()),
                        [seq],
                    )?;
                    Ok(removed as u64)
                }
                None => Ok(0),
            })
            .await
    }

    async fn delete_many(&self, collection: Collection, filter: Filter) -> Result<u64> {
        self.db
            .call(move |conn| {
                let (clause, args) = where_clause(&filter)?;
                let removed = conn.execute(
                    &format!("DELETE FROM {} WHERE {}", collection.as_str(), clause),
                    params_from_iter(args.iter()),
                )?;
                Ok(removed as u64)
            })
            .await
    }

    async fn count(&self, collection: Collection, filter: Filter) -> Result<u64> {
        self.db
            .call(move |conn| {
                let (clause, args) = where_clause(&filter)?;
                let count: Option<i64> = conn
                    .query_row(
                        &format!("SELECT COUNT(*) FROM {} WHERE {}", collection.as_str(), clause),
                        params_from_iter(args.iter()),
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(count.unwrap_or(0) as u64)
            })
            .await
    }
}

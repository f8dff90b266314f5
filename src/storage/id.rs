//! Document identity
//!
//! Historical diagrams were written with two identity styles: arbitrary
//! caller-chosen strings and store-generated 12-byte object ids. Both are
//! kept distinct at the storage layer, so a string `"65a1..."` and the object
//! id with the same hex are different documents.
//!
//! Resolution from a raw request string goes through [`DocumentId::candidates`]
//! (reads) and [`DocumentId::preferred`] (writes).

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{Error, Result};

static OBJECT_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// 12-byte structured identifier: seconds, 5 random bytes, 3-byte counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let random: [u8; 5] = rand::random();
        let counter = OBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&random);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse a 24-character hex string
    pub fn parse_str(s: &str) -> Result<Self> {
        if s.len() != 24 {
            return Err(Error::Validation(format!("object id must be 24 hex characters: {}", s)));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::Validation(format!("invalid object id {}: {}", s, e)))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Identity of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    /// Caller-chosen string key, stored verbatim
    Opaque(String),
    /// Store-generated object id
    Structured(ObjectId),
}

impl DocumentId {
    /// Generate a new structured identity
    pub fn generate() -> Self {
        DocumentId::Structured(ObjectId::new())
    }

    /// Discriminator persisted next to the key
    pub fn kind_str(&self) -> &'static str {
        match self {
            DocumentId::Opaque(_) => "string",
            DocumentId::Structured(_) => "oid",
        }
    }

    /// String form of the key. Object ids render as hex.
    pub fn as_key(&self) -> String {
        match self {
            DocumentId::Opaque(s) => s.clone(),
            DocumentId::Structured(oid) => oid.to_hex(),
        }
    }

    /// Rebuild an identity from its persisted `(kind, key)` pair
    pub fn from_parts(kind: &str, key: &str) -> Result<Self> {
        match kind {
            "string" => Ok(DocumentId::Opaque(key.to_string())),
            "oid" => Ok(DocumentId::Structured(ObjectId::parse_str(key)?)),
            other => Err(Error::Backend(format!("unknown id kind: {}", other))),
        }
    }

    /// Lookup order for a raw id: opaque first, then structured if the
    /// string parses as an object id.
    pub fn candidates(raw: &str) -> Vec<DocumentId> {
        let mut ids = vec![DocumentId::Opaque(raw.to_string())];
        if let Ok(oid) = ObjectId::parse_str(raw) {
            ids.push(DocumentId::Structured(oid));
        }
        ids
    }

    /// Identity used when writing under a raw id: structured when it parses,
    /// so server-generated ids keep their object id encoding.
    pub fn preferred(raw: &str) -> DocumentId {
        match ObjectId::parse_str(raw) {
            Ok(oid) => DocumentId::Structured(oid),
            Err(_) => DocumentId::Opaque(raw.to_string()),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

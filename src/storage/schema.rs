//! Database schema definitions

/// Named document collections. Each maps to one SQLite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Diagrams,
    Tables,
    Relationships,
    Dependencies,
    Areas,
    CustomTypes,
    Notes,
    DiagramFilters,
    Config,
}

impl Collection {
    /// Get the table name backing this collection
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Diagrams => "diagrams",
            Collection::Tables => "tables",
            Collection::Relationships => "relationships",
            Collection::Dependencies => "dependencies",
            Collection::Areas => "areas",
            Collection::CustomTypes => "custom_types",
            Collection::Notes => "notes",
            Collection::DiagramFilters => "diagram_filters",
            Collection::Config => "config",
        }
    }

    /// Get all collections
    pub fn all() -> &'static [Collection] {
        &[
            Collection::Diagrams,
            Collection::Tables,
            Collection::Relationships,
            Collection::Dependencies,
            Collection::Areas,
            Collection::CustomTypes,
            Collection::Notes,
            Collection::DiagramFilters,
            Collection::Config,
        ]
    }

    /// Collections whose documents carry a `diagramId` foreign key
    pub fn diagram_children() -> &'static [Collection] {
        &[
            Collection::Tables,
            Collection::Relationships,
            Collection::Dependencies,
            Collection::Areas,
            Collection::CustomTypes,
            Collection::Notes,
            Collection::DiagramFilters,
        ]
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON key holding the owning diagram's identity inside child documents
pub const DIAGRAM_ID_FIELD: &str = "diagramId";

/// SQL to create a collection table.
///
/// `seq` keeps natural insertion order; `(id_kind, id)` is the document identity.
pub fn create_collection_table(collection: Collection) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {name} (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL,
    id_kind TEXT NOT NULL,
    body TEXT NOT NULL,
    UNIQUE(id_kind, id)
)
"#,
        name = collection.as_str()
    )
}

/// SQL to create the `diagramId` index on a child collection
pub fn create_diagram_index(collection: Collection) -> String {
    let unique = if collection == Collection::DiagramFilters { "UNIQUE " } else { "" };
    format!(
        "CREATE {unique}INDEX IF NOT EXISTS idx_{name}_diagram_id ON {name}(json_extract(body, '$.{field}'))",
        name = collection.as_str(),
        field = DIAGRAM_ID_FIELD,
    )
}

/// All schema creation statements
pub fn all_schema_statements() -> Vec<String> {
    let mut stmts: Vec<String> = Collection::all()
        .iter()
        .map(|c| create_collection_table(*c))
        .collect();
    stmts.extend(Collection::diagram_children().iter().map(|c| create_diagram_index(*c)));
    stmts
}

//! Database schema definitions
//!
//! Table and column names are the contract downstream queries rely on,
//! including the primary key compositions.

/// SQL to create the objects table
pub const CREATE_OBJECTS_TABLE: &str = r#"
CREATE TABLE GenObjects (
    id INTEGER PRIMARY KEY,
    objType INTEGER NOT NULL,
    objMnemonic TEXT NOT NULL,
    name TEXT
)
"#;

/// SQL to create the properties table
pub const CREATE_PROPERTIES_TABLE: &str = r#"
CREATE TABLE GenProperties (
    objid INTEGER,
    prpType INTEGER NOT NULL,
    mnemonic TEXT NOT NULL,
    format TEXT NOT NULL,
    value TEXT,
    PRIMARY KEY (objid, prpType)
)
"#;

/// SQL to create the associations table
pub const CREATE_ASSOCIATIONS_TABLE: &str = r#"
CREATE TABLE GenAssociations (
    fromObjid INTEGER,
    ascType INTEGER NOT NULL,
    toObjid INTEGER NOT NULL,
    inverseAscType INTEGER NOT NULL,
    ascMnemonic TEXT NOT NULL,
    card TEXT NOT NULL,
    direction TEXT,
    seqno INTEGER NOT NULL,
    PRIMARY KEY (fromObjid, ascType, seqno)
)
"#;

/// SQL to create the model key/value table
pub const CREATE_MODEL_TABLE: &str = r#"
CREATE TABLE GenModel (
    key TEXT NOT NULL PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

/// SQL to create the object type catalog
pub const CREATE_META_OBJECTS_TABLE: &str = r#"
CREATE TABLE GenMetaObjects (
    objType INTEGER PRIMARY KEY,
    objMnemonic TEXT NOT NULL
)
"#;

/// SQL to create the property type catalog
pub const CREATE_META_PROPERTIES_TABLE: &str = r#"
CREATE TABLE GenMetaProperties (
    objType INTEGER NOT NULL,
    prpType INTEGER NOT NULL,
    prpMnemonic TEXT NOT NULL,
    format TEXT NOT NULL,
    length INTEGER NOT NULL,
    defaultInt INTEGER NOT NULL,
    defaultText TEXT NOT NULL,
    defaultChar TEXT NOT NULL,
    PRIMARY KEY (objType, prpType)
)
"#;

/// SQL to create the association type catalog
pub const CREATE_META_ASSOCIATIONS_TABLE: &str = r#"
CREATE TABLE GenMetaAssociations (
    fromObjType INTEGER NOT NULL,
    ascType INTEGER NOT NULL,
    ascMnemonic TEXT NOT NULL,
    direction TEXT NOT NULL,
    inverseAscType INTEGER NOT NULL,
    optionality TEXT NOT NULL,
    card TEXT NOT NULL,
    ordered TEXT NOT NULL,
    PRIMARY KEY (fromObjType, ascType)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX idx_GenObjects_type ON GenObjects(objType)",
    "CREATE INDEX idx_GenAssociations_to ON GenAssociations(toObjid)",
];

/// Every table this exporter owns, dropped before each load
pub const MANAGED_TABLES: &[&str] = &[
    "GenObjects",
    "GenProperties",
    "GenAssociations",
    "GenModel",
    "GenMetaObjects",
    "GenMetaProperties",
    "GenMetaAssociations",
];

/// Drop statements for every managed table (indexes go with their tables)
pub fn drop_statements() -> Vec<String> {
    MANAGED_TABLES
        .iter()
        .map(|table| format!("DROP TABLE IF EXISTS {}", table))
        .collect()
}

/// Creation statements for the exported model
pub fn model_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_OBJECTS_TABLE,
        CREATE_PROPERTIES_TABLE,
        CREATE_ASSOCIATIONS_TABLE,
        CREATE_MODEL_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Creation statements for the schema catalog
pub fn catalog_schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_META_OBJECTS_TABLE,
        CREATE_META_PROPERTIES_TABLE,
        CREATE_META_ASSOCIATIONS_TABLE,
    ]
}

//! SQLite storage implementation

use super::schema;
use crate::extract::Extraction;
use crate::record::{AssociationEdge, ModelMetadata, ObjectRecord, PropertyRecord};
use crate::schema::{PrpFormat, TypeSchema};
use crate::session::ObjId;
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite-backed relational export of one model
pub struct ModelStore {
    conn: Connection,
}

impl ModelStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    // ========== Load ==========

    /// Replace the stored model with one traversal result.
    ///
    /// Dropping and recreating the tables, every insert, and the optional
    /// schema catalog run in a single transaction: on any error nothing of
    /// this load is visible.
    pub fn load(
        &mut self,
        extraction: &Extraction,
        metadata: &ModelMetadata,
        catalog: Option<&dyn TypeSchema>,
    ) -> Result<Option<CatalogCounts>> {
        let tx = self.conn.transaction()?;

        for stmt in schema::drop_statements() {
            tx.execute(&stmt, [])?;
        }
        for stmt in schema::model_schema_statements() {
            tx.execute(stmt, [])?;
        }
        tracing::debug!("Tables created");

        insert_objects(&tx, &extraction.objects)?;
        insert_associations(&tx, &extraction.associations)?;
        insert_metadata(&tx, metadata)?;

        let catalog_counts = match catalog {
            Some(schema) => {
                for stmt in schema::catalog_schema_statements() {
                    tx.execute(stmt, [])?;
                }
                Some(insert_catalog(&tx, schema)?)
            }
            None => None,
        };

        tx.commit()?;
        tracing::debug!("Committed model {}", metadata.name);
        Ok(catalog_counts)
    }

    // ========== Read-back ==========

    /// Get an object with its properties
    pub fn get_object(&self, id: ObjId) -> Result<Option<ObjectRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, objType, objMnemonic, name FROM GenObjects WHERE id = ?1",
                [id.value()],
                |row| {
                    Ok(ObjectRecord {
                        id: ObjId(row.get(0)?),
                        type_code: row.get(1)?,
                        type_mnemonic: row.get(2)?,
                        name: row.get(3)?,
                        properties: Vec::new(),
                    })
                },
            )
            .optional()?;

        match row {
            Some(mut record) => {
                record.properties = self.properties_of(id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Get the `name` column of an object (`None` for unnamed or missing objects)
    pub fn object_name(&self, id: ObjId) -> Result<Option<String>> {
        let name: Option<Option<String>> = self
            .conn
            .query_row("SELECT name FROM GenObjects WHERE id = ?1", [id.value()], |row| row.get(0))
            .optional()?;
        Ok(name.flatten())
    }

    /// Get the properties of an object, in export order
    pub fn properties_of(&self, id: ObjId) -> Result<Vec<PropertyRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT prpType, format, mnemonic, value FROM GenProperties WHERE objid = ?1 ORDER BY rowid",
        )?;

        let properties = stmt
            .query_map([id.value()], |row| {
                let format_str: String = row.get(1)?;
                let format: PrpFormat = format_str.parse().map_err(|e: Error| {
                    rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
                })?;
                Ok(PropertyRecord {
                    type_code: row.get(0)?,
                    format,
                    mnemonic: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(properties)
    }

    /// Get edges leaving an object, in export order
    pub fn associations_from(&self, id: ObjId) -> Result<Vec<AssociationEdge>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT fromObjid, card, ascMnemonic, ascType, inverseAscType, toObjid, seqno, direction
            FROM GenAssociations WHERE fromObjid = ?1 ORDER BY rowid
            "#,
        )?;

        let edges = stmt
            .query_map([id.value()], |row| self.row_to_edge(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(edges)
    }

    /// Helper to convert a row to an AssociationEdge
    fn row_to_edge(&self, row: &rusqlite::Row) -> rusqlite::Result<AssociationEdge> {
        let card_str: String = row.get(1)?;
        let direction_str: String = row.get(7)?;

        let cardinality = card_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let direction = direction_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(AssociationEdge {
            from: ObjId(row.get(0)?),
            cardinality,
            mnemonic: row.get(2)?,
            asc_type_code: row.get(3)?,
            inverse_type_code: row.get(4)?,
            to: ObjId(row.get(5)?),
            seqno: row.get(6)?,
            direction,
        })
    }

    /// Get a `GenModel` value
    pub fn model_value(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM GenModel WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            objects: self.count("GenObjects")?,
            properties: self.count("GenProperties")?,
            associations: self.count("GenAssociations")?,
        })
    }
}

fn insert_objects(conn: &Connection, objects: &[ObjectRecord]) -> Result<()> {
    let mut insert_object = conn.prepare_cached(
        "INSERT INTO GenObjects (id, objType, objMnemonic, name) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut insert_property = conn.prepare_cached(
        "INSERT INTO GenProperties (objid, prpType, mnemonic, format, value) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for object in objects {
        insert_object.execute(params![
            object.id.value(),
            object.type_code,
            object.type_mnemonic,
            object.name,
        ])?;
        for property in &object.properties {
            insert_property.execute(params![
                object.id.value(),
                property.type_code,
                property.mnemonic,
                property.format.as_str(),
                property.value,
            ])?;
        }
    }
    tracing::debug!("Inserted {} objects", objects.len());
    Ok(())
}

fn insert_associations(conn: &Connection, edges: &[AssociationEdge]) -> Result<()> {
    let mut insert = conn.prepare_cached(
        r#"
        INSERT INTO GenAssociations (fromObjid, ascType, toObjid, inverseAscType, ascMnemonic, card, direction, seqno)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )?;

    for edge in edges {
        insert.execute(params![
            edge.from.value(),
            edge.asc_type_code,
            edge.to.value(),
            edge.inverse_type_code,
            edge.mnemonic,
            edge.cardinality.as_str(),
            edge.direction.as_str(),
            edge.seqno,
        ])?;
    }
    tracing::debug!("Inserted {} associations", edges.len());
    Ok(())
}

fn insert_metadata(conn: &Connection, metadata: &ModelMetadata) -> Result<()> {
    let mut insert = conn.prepare_cached("INSERT INTO GenModel (key, value) VALUES (?1, ?2)")?;
    for (key, value) in metadata.entries() {
        insert.execute(params![key, value])?;
    }
    Ok(())
}

fn insert_catalog(conn: &Connection, schema: &dyn TypeSchema) -> Result<CatalogCounts> {
    let mut insert_type = conn.prepare_cached("INSERT INTO GenMetaObjects (objType, objMnemonic) VALUES (?1, ?2)")?;
    let mut insert_property = conn.prepare_cached(
        r#"
        INSERT INTO GenMetaProperties (objType, prpType, prpMnemonic, format, length, defaultInt, defaultText, defaultChar)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )?;
    let mut insert_association = conn.prepare_cached(
        r#"
        INSERT INTO GenMetaAssociations (fromObjType, ascType, ascMnemonic, direction, inverseAscType, optionality, card, ordered)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )?;

    let mut counts = CatalogCounts::default();
    for type_def in schema.object_types() {
        insert_type.execute(params![type_def.code, type_def.mnemonic])?;
        counts.object_types += 1;

        for property in &type_def.properties {
            // Only the default matching the format family is meaningful
            let (default_int, default_text, default_char) = match property.prp_format() {
                Some(f) if f.is_text() && property.length > 0 => (0, property.default_text.clone(), String::new()),
                Some(f) if f.is_integer() => (property.default_int, String::new(), String::new()),
                Some(PrpFormat::Char) => (0, String::new(), property.default_char.to_string()),
                _ => (0, String::new(), String::new()),
            };
            insert_property.execute(params![
                type_def.code,
                property.code,
                property.mnemonic,
                property.format,
                property.length,
                default_int,
                default_text,
                default_char,
            ])?;
            counts.properties += 1;
        }

        for association in &type_def.associations {
            insert_association.execute(params![
                type_def.code,
                association.code,
                association.mnemonic,
                association.direction.as_str(),
                association.inverse,
                yes_no(association.optional),
                association.cardinality.as_str(),
                yes_no(association.ordered),
            ])?;
            counts.associations += 1;
        }
    }
    tracing::debug!(
        "Inserted catalog: {} object types, {} properties, {} associations",
        counts.object_types,
        counts.properties,
        counts.associations
    );
    Ok(counts)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Y" } else { "N" }
}

/// Rows written to the schema catalog tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub object_types: usize,
    pub properties: usize,
    pub associations: usize,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub objects: usize,
    pub properties: usize,
    pub associations: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Objects: {}", self.objects)?;
        writeln!(f, "  Properties: {}", self.properties)?;
        write!(f, "  Associations: {}", self.associations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;
    use crate::local::fixtures::sample_repository;
    use crate::local::LocalRepository;

    fn sample_store(catalog: bool) -> (ModelStore, Extraction, Option<CatalogCounts>) {
        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        let extraction = Extractor::new(&model, repository.schema()).run().unwrap();
        let metadata = ModelMetadata::new("SAMPLE", repository.schema().version());

        let mut store = ModelStore::open_in_memory().unwrap();
        let schema: &dyn TypeSchema = repository.schema();
        let counts = store
            .load(&extraction, &metadata, catalog.then_some(schema))
            .unwrap();
        (store, extraction, counts)
    }

    #[test]
    fn test_load_counts() {
        let (store, extraction, catalog) = sample_store(false);
        let stats = store.stats().unwrap();
        assert_eq!(stats.objects, extraction.counts.objects);
        assert_eq!(stats.properties, extraction.counts.properties);
        assert_eq!(stats.associations, extraction.counts.associations);
        assert!(catalog.is_none());
    }

    #[test]
    fn test_objects_roundtrip() {
        let (store, extraction, _) = sample_store(false);
        for object in &extraction.objects {
            let stored = store.get_object(object.id).unwrap().unwrap();
            assert_eq!(&stored, object);
        }
        assert!(store.get_object(ObjId(999)).unwrap().is_none());
    }

    #[test]
    fn test_name_column() {
        let (store, _, _) = sample_store(false);
        let customer = store.get_object(ObjId(100)).unwrap().unwrap();
        assert_eq!(customer.name.as_deref(), Some("Customer"));
        assert_eq!(customer.type_mnemonic, "CUSTOMER_OBJ");
        assert_eq!(store.object_name(ObjId(200)).unwrap().as_deref(), Some("Head Office"));
        assert!(store.object_name(ObjId(999)).unwrap().is_none());
    }

    #[test]
    fn test_unnamed_object_has_null_name() {
        let mut extraction = Extraction::default();
        extraction.objects.push(ObjectRecord::new(ObjId(1), 7, "CUSTOMER_OBJ"));
        let mut store = ModelStore::open_in_memory().unwrap();
        store
            .load(&extraction, &ModelMetadata::new("M", "1"), None)
            .unwrap();
        assert!(store.object_name(ObjId(1)).unwrap().is_none());
        assert!(store.get_object(ObjId(1)).unwrap().unwrap().name.is_none());
    }

    #[test]
    fn test_associations_roundtrip() {
        let (store, extraction, _) = sample_store(false);
        let stored = store.associations_from(ObjId(100)).unwrap();
        let expected: Vec<AssociationEdge> = extraction.edges_from(ObjId(100)).into_iter().cloned().collect();
        assert_eq!(stored, expected);
        assert_eq!(stored.iter().map(|e| e.seqno).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_model_metadata() {
        let (store, _, _) = sample_store(false);
        assert_eq!(store.model_value("name").unwrap().as_deref(), Some("SAMPLE"));
        assert_eq!(store.model_value("version").unwrap().as_deref(), Some(crate::VERSION));
        assert_eq!(store.model_value("schema").unwrap().as_deref(), Some("9.2.A6"));
        assert!(store.model_value("missing").unwrap().is_none());
    }

    #[test]
    fn test_reload_replaces_tables() {
        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        let extraction = Extractor::new(&model, repository.schema()).run().unwrap();
        let metadata = ModelMetadata::new("SAMPLE", "9.2.A6");

        let mut store = ModelStore::open_in_memory().unwrap();
        store.load(&extraction, &metadata, None).unwrap();
        // Second load hits no duplicate keys from the first
        store.load(&extraction, &metadata, None).unwrap();
        assert_eq!(store.stats().unwrap().objects, 5);
    }

    #[test]
    fn test_failed_load_keeps_previous_tables() {
        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        let extraction = Extractor::new(&model, repository.schema()).run().unwrap();
        let metadata = ModelMetadata::new("SAMPLE", "9.2.A6");

        let mut store = ModelStore::open_in_memory().unwrap();
        store.load(&extraction, &metadata, None).unwrap();

        // Duplicate object ids violate the GenObjects key
        let mut broken = Extraction::default();
        broken.objects.push(ObjectRecord::new(ObjId(1), 7, "CUSTOMER_OBJ"));
        broken.objects.push(ObjectRecord::new(ObjId(1), 7, "CUSTOMER_OBJ"));
        assert!(matches!(store.load(&broken, &metadata, None), Err(Error::Storage(_))));

        assert_eq!(store.stats().unwrap().objects, 5);
        assert!(store.get_object(ObjId(100)).unwrap().is_some());
    }

    #[test]
    fn test_catalog_tables() {
        let (store, _, catalog) = sample_store(true);
        let catalog = catalog.unwrap();
        assert_eq!(catalog.object_types, 3);
        assert_eq!(catalog.properties, 9);
        assert_eq!(catalog.associations, 4);

        let (format, default_char): (String, String) = store
            .conn
            .query_row(
                "SELECT format, defaultChar FROM GenMetaProperties WHERE objType = 7 AND prpType = 3",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(format, "CHAR");
        assert_eq!(default_char, "N");

        let (default_int, default_text): (i64, String) = store
            .conn
            .query_row(
                "SELECT defaultInt, defaultText FROM GenMetaProperties WHERE objType = 9 AND prpType = 8",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(default_int, 5);
        assert_eq!(default_text, "");

        let (optionality, ordered, card): (String, String, String) = store
            .conn
            .query_row(
                "SELECT optionality, ordered, card FROM GenMetaAssociations WHERE fromObjType = 7 AND ascType = 10",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!((optionality.as_str(), ordered.as_str(), card.as_str()), ("Y", "Y", "M"));
    }

    #[test]
    fn test_catalog_tables_absent_without_flag() {
        let (store, _, _) = sample_store(false);
        let tables: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'GenMeta%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn test_empty_model() {
        let repository = LocalRepository::from_json_str(
            r#"{"schema": {"version": "1"}, "models": [{"name": "EMPTY"}]}"#,
        )
        .unwrap();
        let model = repository.open_first().unwrap();
        let extraction = Extractor::new(&model, repository.schema()).run().unwrap();

        let mut store = ModelStore::open_in_memory().unwrap();
        store
            .load(&extraction, &ModelMetadata::new("EMPTY", "1"), None)
            .unwrap();
        let stats = store.stats().unwrap();
        assert_eq!((stats.objects, stats.properties, stats.associations), (0, 0, 0));
    }
}

//! Relational export - `<model>.db`
//!
//! The database is built in a staging file next to its final name and
//! renamed into place after the load committed. A run that fails, or never
//! reaches `export`, leaves no database behind.

use super::{persist, staging_file, Backend, ExportContext, ExportReport, Exporter};
use crate::storage::ModelStore;
use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Suffix of in-progress database files
pub const STAGING_SUFFIX: &str = ".db.tmp";

/// Loads the traversal result into one SQLite database file.
pub struct SqliteExporter {
    path: PathBuf,
    store: ModelStore,
    staging: NamedTempFile,
    catalog: bool,
}

impl SqliteExporter {
    /// Open a staging database for `path`; `catalog` also writes the schema catalog tables
    pub fn create(path: &Path, catalog: bool) -> Result<Self> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let staging = staging_file(dir, STAGING_SUFFIX)?;
        let store = ModelStore::open(staging.path())?;
        Ok(Self {
            path: path.to_path_buf(),
            store,
            staging,
            catalog,
        })
    }
}

impl Exporter for SqliteExporter {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn export(self: Box<Self>, context: &ExportContext<'_>) -> Result<ExportReport> {
        let SqliteExporter {
            path,
            mut store,
            staging,
            catalog,
        } = *self;

        let loaded = store.load(
            context.extraction,
            context.metadata,
            catalog.then_some(context.schema),
        );
        // Close the connection before the file is renamed or deleted
        drop(store);
        let catalog_counts = loaded?;

        let path = persist(staging, path)?;
        tracing::debug!("Wrote {}", path.display());

        Ok(ExportReport {
            backend: Backend::Sqlite,
            paths: vec![path],
            catalog: catalog_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Extraction, Extractor};
    use crate::local::fixtures::sample_repository;
    use crate::record::{ModelMetadata, ObjectRecord};
    use crate::schema::TypeSchema;
    use crate::session::ObjId;

    #[test]
    fn test_export_writes_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("SAMPLE.db");

        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        let extraction = Extractor::new(&model, repository.schema()).run().unwrap();
        let metadata = ModelMetadata::new("SAMPLE", repository.schema().version());
        let context = ExportContext {
            extraction: &extraction,
            metadata: &metadata,
            schema: repository.schema(),
        };

        let exporter = SqliteExporter::create(&path, true).unwrap();
        assert_eq!(exporter.backend(), Backend::Sqlite);
        let report = Box::new(exporter).export(&context).unwrap();
        assert_eq!(report.paths, vec![path.clone()]);
        assert_eq!(report.catalog.map(|c| c.object_types), Some(3));

        let store = ModelStore::open(&path).unwrap();
        assert_eq!(store.stats().unwrap().objects, 5);
        assert_eq!(store.object_name(ObjId(101)).unwrap().as_deref(), Some("Order A"));
    }

    #[test]
    fn test_unwritable_destination_fails_on_create() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = SqliteExporter::create(&dir.path().join("missing").join("M.db"), false);
        assert!(matches!(result, Err(crate::Error::Destination { .. })));
    }

    #[test]
    fn test_abandoned_export_leaves_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let exporter = SqliteExporter::create(&dir.path().join("SAMPLE.db"), false).unwrap();
        drop(exporter);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_load_leaves_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("BAD.db");

        // Duplicate object ids violate the GenObjects key
        let mut extraction = Extraction::default();
        extraction.objects.push(ObjectRecord::new(ObjId(1), 7, "CUSTOMER_OBJ"));
        extraction.objects.push(ObjectRecord::new(ObjId(1), 7, "CUSTOMER_OBJ"));
        let metadata = ModelMetadata::new("BAD", "1");
        let repository = sample_repository();
        let context = ExportContext {
            extraction: &extraction,
            metadata: &metadata,
            schema: repository.schema(),
        };

        let result = Box::new(SqliteExporter::create(&path, false).unwrap()).export(&context);
        assert!(matches!(result, Err(crate::Error::Storage(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_database_follows_umask() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("EMPTY.db");
        let extraction = Extraction::default();
        let metadata = ModelMetadata::new("EMPTY", "1");
        let repository = sample_repository();
        let context = ExportContext {
            extraction: &extraction,
            metadata: &metadata,
            schema: repository.schema(),
        };
        Box::new(SqliteExporter::create(&path, false).unwrap()).export(&context).unwrap();

        let plain = dir.path().join("plain.txt");
        std::fs::File::create(&plain).unwrap();
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }
}

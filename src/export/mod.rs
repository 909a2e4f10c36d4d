//! Export back ends
//!
//! One traversal feeds any number of exporters. Each exporter opens its
//! destination when created, before the traversal starts, and writes
//! everything in `export` once the traversal succeeded.

pub mod json;
pub mod sqlite;

use crate::extract::Extraction;
use crate::record::ModelMetadata;
use crate::schema::TypeSchema;
use crate::storage::CatalogCounts;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

pub use json::JsonExporter;
pub use sqlite::SqliteExporter;

/// File name prefix of in-progress outputs
pub const STAGING_PREFIX: &str = ".beegen-";

/// Create an in-progress output file in `dir`, renamed into place on success.
///
/// On unix the file gets mode 0666 minus the umask, like `File::create`.
pub(crate) fn staging_file(dir: &Path, suffix: &str) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX).suffix(suffix);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir).map_err(|source| Error::Destination {
        path: dir.to_path_buf(),
        source,
    })
}

/// Rename a finished staging file onto its final name
pub(crate) fn persist(file: NamedTempFile, path: PathBuf) -> Result<PathBuf> {
    file.persist(&path).map_err(|e| Error::Destination {
        path: path.clone(),
        source: e.error,
    })?;
    Ok(path)
}

/// Output representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `objects.json` and `associations.json`
    Json,
    /// `<model>.db`
    Sqlite,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Json => "json",
            Backend::Sqlite => "sqlite",
        }
    }

    pub fn all() -> &'static [Backend] {
        &[Backend::Json, Backend::Sqlite]
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" | "document" | "documents" => Ok(Backend::Json),
            "sqlite" | "db" | "relational" => Ok(Backend::Sqlite),
            _ => Err(Error::Parse(format!("Unknown backend: {}", s))),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs shared by every exporter of one run.
pub struct ExportContext<'a> {
    pub extraction: &'a Extraction,
    pub metadata: &'a ModelMetadata,
    pub schema: &'a dyn TypeSchema,
}

/// What an exporter wrote.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub backend: Backend,
    pub paths: Vec<PathBuf>,
    /// Schema catalog rows, when the back end wrote them
    pub catalog: Option<CatalogCounts>,
}

/// A serializer back end.
pub trait Exporter {
    fn backend(&self) -> Backend;

    /// Write the traversal result, consuming the open destination
    fn export(self: Box<Self>, context: &ExportContext<'_>) -> Result<ExportReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_roundtrip() {
        for backend in Backend::all() {
            let parsed: Backend = backend.as_str().parse().unwrap();
            assert_eq!(*backend, parsed);
        }
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!(Backend::from_str("relational").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_str("Documents").unwrap(), Backend::Json);
        assert!(Backend::from_str("xml").is_err());
    }
}

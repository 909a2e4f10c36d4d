//! # Beegen - Model Extractor
//!
//! Walks every object of a typed modeling repository and exports the object
//! graph in two equivalent shapes.
//!
//! Beegen provides:
//! - A single traversal engine with default-value suppression and
//!   cardinality-aware, ordered association edges
//! - A document export (`objects.json`, `associations.json`)
//! - A relational export (SQLite `GenObjects`, `GenProperties`,
//!   `GenAssociations`, `GenModel`, optional schema catalog)
//! - Idempotent destination preparation next to the source model

pub mod schema;
pub mod session;
pub mod local;
pub mod record;
pub mod extract;
pub mod export;
pub mod storage;
pub mod destination;
pub mod pipeline;
pub mod config;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use schema::{AssociationDef, Cardinality, Direction, ObjectTypeDef, PropertyDef, PrpFormat, SchemaCatalog, TypeSchema};
pub use session::{ModelSession, ObjId, ObjectHandle};
pub use record::{AssociationEdge, ExportCounts, ModelMetadata, ObjectRecord, PropertyRecord};
pub use extract::{Extraction, Extractor};
pub use export::{Backend, Exporter};
pub use storage::ModelStore;
pub use destination::Destination;

/// Exporter version recorded in the `GenModel` table
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for Beegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Beegen operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot connect to the model repository at {path}: {reason}")]
    Connection { path: PathBuf, reason: String },

    #[error("Model not found in repository: {0}")]
    ModelNotFound(String),

    #[error("Specified model path is not a correct folder: {0}")]
    InvalidModelPath(PathBuf),

    #[error("Cannot create output {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unknown object type code: {0}")]
    UnknownType(i16),

    #[error("Invalid model data: {0}")]
    Model(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// One-line description of the stage that failed, for the CLI diagnostic
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Connection { .. } => "Problem with connecting to the model repository.",
            Error::ModelNotFound(_) => "Cannot find model in the repository.",
            Error::InvalidModelPath(_) => "Specified model path is not a correct folder.",
            Error::Destination { .. } => "Problem with creating output stream.",
            Error::Unsupported(_) | Error::UnknownType(_) | Error::Model(_) => "Problem with extracting the model.",
            Error::Storage(_) => "Problem with creating SQLite database.",
            Error::Json(_) | Error::Io(_) => "Problem with writing output files.",
            Error::Parse(_) => "Invalid argument.",
        }
    }
}

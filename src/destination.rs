//! Destination Manager
//!
//! Output goes into a folder next to the source model. Preparing a
//! destination removes stale artifacts of the same kind only, so a
//! document export never touches an existing database and vice versa.

use crate::export::json::{self, ASSOCIATIONS_JSON, OBJECTS_JSON};
use crate::export::{sqlite, STAGING_PREFIX};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Output folder created inside the model directory by default
pub const DEFAULT_OUTPUT_DIR: &str = "bee";

/// The output folder of one model export.
#[derive(Debug, Clone)]
pub struct Destination {
    root: PathBuf,
}

impl Destination {
    /// Resolve `<model_dir>/<folder>`; the model directory must exist
    pub fn for_model(model_dir: &Path, folder: &str) -> Result<Self> {
        if !model_dir.is_dir() {
            return Err(Error::InvalidModelPath(model_dir.to_path_buf()));
        }
        Ok(Self {
            root: model_dir.join(folder),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the folder exists and remove previous `objects.json` / `associations.json`
    pub fn prepare_documents(&self) -> Result<PathBuf> {
        self.ensure_root()?;
        for name in [OBJECTS_JSON, ASSOCIATIONS_JSON] {
            self.remove_stale(&self.root.join(name))?;
        }
        self.sweep_staging(&[json::STAGING_SUFFIX])?;
        Ok(self.root.clone())
    }

    /// Ensure the folder exists and remove a previous `<model>.db`, returning its path
    pub fn prepare_database(&self, model_name: &str) -> Result<PathBuf> {
        self.ensure_root()?;
        let file_name = database_file_name(model_name);
        let path = self.root.join(&file_name);
        self.remove_stale(&path)?;
        self.remove_stale(&self.root.join(format!("{}-journal", file_name)))?;
        let journal_suffix = format!("{}-journal", sqlite::STAGING_SUFFIX);
        self.sweep_staging(&[sqlite::STAGING_SUFFIX, &journal_suffix])?;
        Ok(path)
    }

    fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| Error::Destination {
            path: self.root.clone(),
            source,
        })
    }

    /// Remove staging files an interrupted run left behind
    fn sweep_staging(&self, suffixes: &[&str]) -> Result<()> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| Error::Destination {
            path: self.root.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(STAGING_PREFIX) && suffixes.iter().any(|s| name.ends_with(s)) {
                self.remove_stale(&entry.path())?;
            }
        }
        Ok(())
    }

    fn remove_stale(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Destination {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Database file name for a model: `<name>.db` with path-unsafe characters replaced
pub fn database_file_name(model_name: &str) -> String {
    let stem: String = model_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "model.db".to_string()
    } else {
        format!("{}.db", stem)
    }
}

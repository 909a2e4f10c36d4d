//! Document export - `objects.json` and `associations.json`
//!
//! Both arrays are written to temp files inside the destination directory,
//! which are created up front, and renamed onto their final names only
//! after both were written completely.

use super::{persist, staging_file, Backend, ExportContext, ExportReport, Exporter};
use crate::record::{AssociationEdge, ObjectRecord};
use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const OBJECTS_JSON: &str = "objects.json";
pub const ASSOCIATIONS_JSON: &str = "associations.json";
/// Suffix of in-progress document files
pub const STAGING_SUFFIX: &str = ".json.tmp";

/// Writes the two document arrays into one directory.
pub struct JsonExporter {
    dir: PathBuf,
    objects: NamedTempFile,
    associations: NamedTempFile,
    pretty: bool,
}

impl JsonExporter {
    /// Open both outputs in `dir`; fails if the directory is not writable
    pub fn create(dir: &Path, pretty: bool) -> Result<Self> {
        Ok(Self {
            dir: dir.to_path_buf(),
            objects: staging_file(dir, STAGING_SUFFIX)?,
            associations: staging_file(dir, STAGING_SUFFIX)?,
            pretty,
        })
    }
}

impl Exporter for JsonExporter {
    fn backend(&self) -> Backend {
        Backend::Json
    }

    fn export(self: Box<Self>, context: &ExportContext<'_>) -> Result<ExportReport> {
        let JsonExporter {
            dir,
            mut objects,
            mut associations,
            pretty,
        } = *self;

        write_array(&mut objects, &context.extraction.objects, pretty)?;
        write_array(&mut associations, &context.extraction.associations, pretty)?;

        // Both documents or neither
        let objects_path = persist(objects, dir.join(OBJECTS_JSON))?;
        let associations_path = match persist(associations, dir.join(ASSOCIATIONS_JSON)) {
            Ok(path) => path,
            Err(e) => {
                if let Err(remove) = std::fs::remove_file(&objects_path) {
                    tracing::warn!("Cannot remove {}: {}", objects_path.display(), remove);
                }
                return Err(e);
            }
        };
        tracing::debug!("Wrote {} and {}", objects_path.display(), associations_path.display());

        Ok(ExportReport {
            backend: Backend::Json,
            paths: vec![objects_path, associations_path],
            catalog: None,
        })
    }
}

fn write_array<T: Serialize>(file: &mut NamedTempFile, items: &[T], pretty: bool) -> Result<()> {
    let mut writer = BufWriter::new(file.as_file_mut());
    if pretty {
        serde_json::to_writer_pretty(&mut writer, items)?;
    } else {
        serde_json::to_writer(&mut writer, items)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Read back an `objects.json` document
pub fn read_objects(path: &Path) -> Result<Vec<ObjectRecord>> {
    read_array(path)
}

/// Read back an `associations.json` document
pub fn read_associations(path: &Path) -> Result<Vec<AssociationEdge>> {
    read_array(path)
}

//! Exported records - the projection both serializers consume
//!
//! Field order of the serde derives is the key order of the document export:
//! - objects: `id, type, mnemonic, properties[type, format, mnemonic, value]`
//! - associations: `from, card, mnemonic, type, inverseType, to, seqno, direction`

use crate::schema::{Cardinality, Direction, PrpFormat};
use crate::session::ObjId;
use serde::{Deserialize, Serialize};

/// One exported model object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: ObjId,
    #[serde(rename = "type")]
    pub type_code: i16,
    #[serde(rename = "mnemonic")]
    pub type_mnemonic: String,
    /// Value of the NAME-format property, if set. Relational export only.
    #[serde(skip)]
    pub name: Option<String>,
    pub properties: Vec<PropertyRecord>,
}

impl ObjectRecord {
    pub fn new(id: ObjId, type_code: i16, type_mnemonic: impl Into<String>) -> Self {
        Self {
            id,
            type_code,
            type_mnemonic: type_mnemonic.into(),
            name: None,
            properties: Vec::new(),
        }
    }

    /// Find an exported property by mnemonic
    pub fn property(&self, mnemonic: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.mnemonic == mnemonic)
    }
}

/// One non-default property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "type")]
    pub type_code: i16,
    pub format: PrpFormat,
    pub mnemonic: String,
    pub value: String,
}

/// One directed association instance.
///
/// `seqno` is the zero-based position among the edges sharing
/// `(from, asc_type_code)`; always `0` for single-valued associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationEdge {
    pub from: ObjId,
    #[serde(rename = "card")]
    pub cardinality: Cardinality,
    pub mnemonic: String,
    #[serde(rename = "type")]
    pub asc_type_code: i16,
    #[serde(rename = "inverseType")]
    pub inverse_type_code: i16,
    pub to: ObjId,
    pub seqno: u32,
    pub direction: Direction,
}

/// Model-level facts persisted once per relational export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    pub name: String,
    pub exporter_version: String,
    pub schema_version: String,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, schema_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exporter_version: crate::VERSION.to_string(),
            schema_version: schema_version.into(),
        }
    }

    /// Key/value rows of the `GenModel` table
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("version", self.exporter_version.as_str()),
            ("schema", self.schema_version.as_str()),
        ]
    }
}

/// Running totals of one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportCounts {
    pub objects: usize,
    pub properties: usize,
    pub associations: usize,
}

impl std::fmt::Display for ExportCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of exported objects is {}", self.objects)?;
        writeln!(f, "Number of exported properties is {}", self.properties)?;
        write!(f, "Number of exported associations is {}", self.associations)
    }
}

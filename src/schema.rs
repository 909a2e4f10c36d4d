//! Type schema - closed type sets and the schema lookup capability
//!
//! The schema answers, for an object type code:
//! - which properties it declares, their storage format and default value
//! - which associations it declares, with cardinality, direction and inverse
//!
//! Formats, cardinalities and directions are closed enums so the traversal
//! engine matches on them exhaustively.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Exportable property storage formats.
///
/// The schema may declare other formats (floating point, blobs, ...);
/// those never parse into this set and are not exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrpFormat {
    /// Free text
    Text,
    /// Load module name
    LoadName,
    /// Display name of the owning object
    Name,
    /// Single character flag
    Char,
    /// Integer
    Int,
    /// Short integer
    Sint,
}

impl PrpFormat {
    /// Get the string representation of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            PrpFormat::Text => "TEXT",
            PrpFormat::LoadName => "LOADNAME",
            PrpFormat::Name => "NAME",
            PrpFormat::Char => "CHAR",
            PrpFormat::Int => "INT",
            PrpFormat::Sint => "SINT",
        }
    }

    /// Get all exportable formats
    pub fn all() -> &'static [PrpFormat] {
        &[
            PrpFormat::Text,
            PrpFormat::LoadName,
            PrpFormat::Name,
            PrpFormat::Char,
            PrpFormat::Int,
            PrpFormat::Sint,
        ]
    }

    /// Map a raw schema format code into the closed set, `None` if not exportable
    pub fn from_code(code: &str) -> Option<PrpFormat> {
        code.parse().ok()
    }

    /// Text-like formats share the text reader and the empty-value rule
    pub fn is_text(&self) -> bool {
        matches!(self, PrpFormat::Text | PrpFormat::LoadName | PrpFormat::Name)
    }

    /// Integer formats share the integer reader
    pub fn is_integer(&self) -> bool {
        matches!(self, PrpFormat::Int | PrpFormat::Sint)
    }
}

impl FromStr for PrpFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TEXT" => Ok(PrpFormat::Text),
            "LOADNAME" => Ok(PrpFormat::LoadName),
            "NAME" => Ok(PrpFormat::Name),
            "CHAR" => Ok(PrpFormat::Char),
            "INT" => Ok(PrpFormat::Int),
            "SINT" => Ok(PrpFormat::Sint),
            _ => Err(Error::Parse(format!("Unknown property format: {}", s))),
        }
    }
}

impl std::fmt::Display for PrpFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Association cardinality: single-valued (`1`) or multi-valued (`M`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "M")]
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::One => "1",
            Cardinality::Many => "M",
        }
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" => Ok(Cardinality::One),
            "M" | "m" => Ok(Cardinality::Many),
            _ => Err(Error::Parse(format!("Unknown cardinality: {}", s))),
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Association direction as declared by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "B")]
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "F",
            Direction::Backward => "B",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "F" | "f" => Ok(Direction::Forward),
            "B" | "b" => Ok(Direction::Backward),
            _ => Err(Error::Parse(format!("Unknown direction: {}", s))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_char() -> char {
    ' '
}

/// A property declared by an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    /// Property type code
    pub code: i16,
    /// Schema mnemonic (e.g. `NAME`, `DESC`)
    pub mnemonic: String,
    /// Raw storage format as reported by the schema
    pub format: String,
    /// Declared storage length (text formats)
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub default_text: String,
    #[serde(default = "default_char")]
    pub default_char: char,
    #[serde(default)]
    pub default_int: i32,
}

impl PropertyDef {
    /// Create a property definition with type defaults (`""`, `' '`, `0`)
    pub fn new(code: i16, mnemonic: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            code,
            mnemonic: mnemonic.into(),
            format: format.into(),
            length: 0,
            default_text: String::new(),
            default_char: default_char(),
            default_int: 0,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn with_default_text(mut self, default: impl Into<String>) -> Self {
        self.default_text = default.into();
        self
    }

    pub fn with_default_char(mut self, default: char) -> Self {
        self.default_char = default;
        self
    }

    pub fn with_default_int(mut self, default: i32) -> Self {
        self.default_int = default;
        self
    }

    /// The format in the exportable set, `None` when the property is not exported
    pub fn prp_format(&self) -> Option<PrpFormat> {
        PrpFormat::from_code(&self.format)
    }
}

/// An association declared by an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDef {
    /// Association type code
    pub code: i16,
    /// Schema mnemonic (e.g. `HASORDERS`)
    pub mnemonic: String,
    /// Type code of the reverse association
    pub inverse: i16,
    pub cardinality: Cardinality,
    pub direction: Direction,
    /// The association may be left unset
    #[serde(default)]
    pub optional: bool,
    /// The follower returns targets in a user-defined order
    #[serde(default)]
    pub ordered: bool,
}

impl AssociationDef {
    pub fn new(
        code: i16,
        mnemonic: impl Into<String>,
        inverse: i16,
        cardinality: Cardinality,
        direction: Direction,
    ) -> Self {
        Self {
            code,
            mnemonic: mnemonic.into(),
            inverse,
            cardinality,
            direction,
            optional: false,
            ordered: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn is_many(&self) -> bool {
        self.cardinality == Cardinality::Many
    }
}

/// An object type with its declared properties and associations, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeDef {
    pub code: i16,
    pub mnemonic: String,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub associations: Vec<AssociationDef>,
}

impl ObjectTypeDef {
    pub fn new(code: i16, mnemonic: impl Into<String>) -> Self {
        Self {
            code,
            mnemonic: mnemonic.into(),
            properties: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_association(mut self, association: AssociationDef) -> Self {
        self.associations.push(association);
        self
    }

    /// Find a declared property by mnemonic
    pub fn property(&self, mnemonic: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.mnemonic == mnemonic)
    }

    /// Find a declared association by mnemonic
    pub fn association(&self, mnemonic: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.mnemonic == mnemonic)
    }
}

/// Schema lookup capability consumed by the traversal engine.
pub trait TypeSchema {
    /// Schema version recorded with each export
    fn version(&self) -> &str;

    /// Look up an object type by code
    fn object_type(&self, code: i16) -> Result<&ObjectTypeDef>;

    /// All declared object types in catalog order
    fn object_types(&self) -> &[ObjectTypeDef];
}

/// In-memory schema catalog indexed by object type code.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    version: String,
    types: Vec<ObjectTypeDef>,
    by_code: HashMap<i16, usize>,
}

impl SchemaCatalog {
    /// Build a catalog, rejecting duplicate object type codes
    pub fn new(version: impl Into<String>, types: Vec<ObjectTypeDef>) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(types.len());
        for (idx, def) in types.iter().enumerate() {
            if by_code.insert(def.code, idx).is_some() {
                return Err(Error::Model(format!(
                    "Duplicate object type code {} ({})",
                    def.code, def.mnemonic
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            types,
            by_code,
        })
    }
}

impl TypeSchema for SchemaCatalog {
    fn version(&self) -> &str {
        &self.version
    }

    fn object_type(&self, code: i16) -> Result<&ObjectTypeDef> {
        self.by_code
            .get(&code)
            .map(|&idx| &self.types[idx])
            .ok_or(Error::UnknownType(code))
    }

    fn object_types(&self) -> &[ObjectTypeDef] {
        &self.types
    }
}

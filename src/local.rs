//! Local repository - a JSON-backed model repository
//!
//! A model directory holds `repository.json`: the schema catalog plus one or
//! more models. Each model lists its objects in model order, with property
//! values keyed by property mnemonic and association targets keyed by
//! association mnemonic:
//!
//! ```json
//! {
//!   "schema": { "version": "9.2.A6", "objectTypes": [ ... ] },
//!   "models": [
//!     { "name": "SAMPLE", "objects": [
//!       { "id": 100, "type": 7,
//!         "properties": { "NAME": "Customer" },
//!         "associations": { "HASORDERS": [101, 102] } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Properties without a stored value read as their schema default.

use crate::schema::{AssociationDef, ObjectTypeDef, PropertyDef, PrpFormat, SchemaCatalog, TypeSchema};
use crate::session::{ModelSession, ObjId, ObjectHandle};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// File name of the repository inside a model directory
pub const REPOSITORY_FILE: &str = "repository.json";

#[derive(Debug, Deserialize)]
struct RepositoryFile {
    schema: SchemaData,
    #[serde(default)]
    models: Vec<ModelData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaData {
    version: String,
    #[serde(default)]
    object_types: Vec<ObjectTypeDef>,
}

/// One stored model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelData {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<ObjectData>,
}

/// One stored object with its live values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectData {
    pub id: ObjId,
    #[serde(rename = "type")]
    pub type_code: i16,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub associations: BTreeMap<String, Vec<ObjId>>,
}

/// A stored property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Text(String),
}

/// A connected repository: schema catalog plus stored models.
#[derive(Debug)]
pub struct LocalRepository {
    path: PathBuf,
    schema: SchemaCatalog,
    models: Vec<ModelData>,
}

impl LocalRepository {
    /// Connect to the repository file inside a model directory
    pub fn connect(model_dir: &Path) -> Result<Self> {
        let path = model_dir.join(REPOSITORY_FILE);
        let contents = std::fs::read_to_string(&path).map_err(|e| Error::Connection {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let repository = Self::parse(&contents, path)?;
        tracing::debug!(
            "Connected to {} ({} models, schema {})",
            repository.path.display(),
            repository.models.len(),
            repository.schema.version()
        );
        Ok(repository)
    }

    /// Build a repository from JSON text (for testing)
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Self::parse(contents, PathBuf::from("<memory>"))
    }

    fn parse(contents: &str, path: PathBuf) -> Result<Self> {
        let file: RepositoryFile = serde_json::from_str(contents).map_err(|e| Error::Connection {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let schema = SchemaCatalog::new(file.schema.version, file.schema.object_types).map_err(|e| {
            Error::Connection {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            path,
            schema,
            models: file.models,
        })
    }

    /// Location of the repository file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The schema catalog shared by every model of the repository
    pub fn schema(&self) -> &SchemaCatalog {
        &self.schema
    }

    /// Names of the stored models
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// Open the first stored model
    pub fn open_first(&self) -> Result<LocalModel<'_>> {
        let data = self
            .models
            .first()
            .ok_or_else(|| Error::ModelNotFound(self.path.display().to_string()))?;
        LocalModel::new(data)
    }

    /// Open a stored model by name
    pub fn open(&self, name: &str) -> Result<LocalModel<'_>> {
        let data = self
            .models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))?;
        LocalModel::new(data)
    }
}

/// An open model of a local repository.
#[derive(Debug)]
pub struct LocalModel<'a> {
    data: &'a ModelData,
    index: HashMap<ObjId, usize>,
}

impl<'a> LocalModel<'a> {
    fn new(data: &'a ModelData) -> Result<Self> {
        let mut index = HashMap::with_capacity(data.objects.len());
        for (idx, object) in data.objects.iter().enumerate() {
            if index.insert(object.id, idx).is_some() {
                return Err(Error::Model(format!(
                    "Duplicate object id {} in model {}",
                    object.id, data.name
                )));
            }
        }
        Ok(Self { data, index })
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.data.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.objects.is_empty()
    }
}

impl ModelSession for LocalModel<'_> {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn object_ids(&self) -> Result<Vec<ObjId>> {
        Ok(self.data.objects.iter().map(|o| o.id).collect())
    }

    fn object(&self, id: ObjId) -> Result<Box<dyn ObjectHandle + '_>> {
        let idx = self
            .index
            .get(&id)
            .ok_or_else(|| Error::Model(format!("Object {} not found in model {}", id, self.data.name)))?;
        Ok(Box::new(LocalObject {
            data: &self.data.objects[*idx],
            index: &self.index,
        }))
    }
}

struct LocalObject<'m> {
    data: &'m ObjectData,
    index: &'m HashMap<ObjId, usize>,
}

impl LocalObject<'_> {
    fn unsupported(&self, what: &str, mnemonic: &str) -> Error {
        Error::Unsupported(format!("{} {} on object {}", what, mnemonic, self.data.id))
    }

    fn targets(&self, association: &AssociationDef) -> Result<Vec<ObjId>> {
        let targets = self
            .data
            .associations
            .get(&association.mnemonic)
            .cloned()
            .unwrap_or_default();

        if let Some(dangling) = targets.iter().find(|t| !self.index.contains_key(*t)) {
            return Err(Error::Model(format!(
                "Association {} on object {} points to missing object {}",
                association.mnemonic, self.data.id, dangling
            )));
        }
        Ok(targets)
    }
}

impl ObjectHandle for LocalObject<'_> {
    fn id(&self) -> ObjId {
        self.data.id
    }

    fn type_code(&self) -> i16 {
        self.data.type_code
    }

    fn text_property(&self, property: &PropertyDef) -> Result<String> {
        if !property.prp_format().is_some_and(|f| f.is_text()) {
            return Err(self.unsupported("Text read of non-text property", &property.mnemonic));
        }
        match self.data.properties.get(&property.mnemonic) {
            None => Ok(property.default_text.clone()),
            Some(PropertyValue::Text(value)) => Ok(value.clone()),
            Some(PropertyValue::Int(_)) => Err(self.unsupported("Integer value stored in text property", &property.mnemonic)),
        }
    }

    fn char_property(&self, property: &PropertyDef) -> Result<char> {
        if property.prp_format() != Some(PrpFormat::Char) {
            return Err(self.unsupported("Character read of non-character property", &property.mnemonic));
        }
        match self.data.properties.get(&property.mnemonic) {
            None => Ok(property.default_char),
            Some(PropertyValue::Text(value)) => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(self.unsupported("Multi-character value stored in character property", &property.mnemonic)),
                }
            }
            Some(PropertyValue::Int(_)) => Err(self.unsupported("Integer value stored in character property", &property.mnemonic)),
        }
    }

    fn int_property(&self, property: &PropertyDef) -> Result<i32> {
        if !property.prp_format().is_some_and(|f| f.is_integer()) {
            return Err(self.unsupported("Integer read of non-integer property", &property.mnemonic));
        }
        match self.data.properties.get(&property.mnemonic) {
            None => Ok(property.default_int),
            Some(PropertyValue::Int(value)) => i32::try_from(*value)
                .map_err(|_| self.unsupported("Out of range value stored in integer property", &property.mnemonic)),
            Some(PropertyValue::Text(_)) => Err(self.unsupported("Text value stored in integer property", &property.mnemonic)),
        }
    }

    fn follow_one(&self, association: &AssociationDef) -> Result<Option<ObjId>> {
        if association.is_many() {
            return Err(self.unsupported("Single-valued follow of multi-valued association", &association.mnemonic));
        }
        let targets = self.targets(association)?;
        match targets.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(*one)),
            _ => Err(Error::Model(format!(
                "Single-valued association {} on object {} holds {} targets",
                association.mnemonic,
                self.data.id,
                targets.len()
            ))),
        }
    }

    fn follow_many(&self, association: &AssociationDef) -> Result<Vec<ObjId>> {
        if !association.is_many() {
            return Err(self.unsupported("Multi-valued follow of single-valued association", &association.mnemonic));
        }
        self.targets(association)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::LocalRepository;

    /// Five objects, nine non-default properties, six association edges.
    pub const SAMPLE_REPOSITORY: &str = r#"{
      "schema": {
        "version": "9.2.A6",
        "objectTypes": [
          {
            "code": 7, "mnemonic": "CUSTOMER_OBJ",
            "properties": [
              { "code": 1, "mnemonic": "NAME", "format": "NAME", "length": 32 },
              { "code": 2, "mnemonic": "DESC", "format": "TEXT", "length": 2048 },
              { "code": 3, "mnemonic": "OPTION", "format": "CHAR", "length": 1, "defaultChar": "N" },
              { "code": 4, "mnemonic": "SEQ", "format": "INT", "length": 4 },
              { "code": 5, "mnemonic": "WEIGHT", "format": "DOUBLE", "length": 8 },
              { "code": 6, "mnemonic": "MEMBER", "format": "LOADNAME", "length": 8, "defaultText": "DEFAULT" }
            ],
            "associations": [
              { "code": 10, "mnemonic": "HASORDERS", "inverse": 11, "cardinality": "M", "direction": "F", "optional": true, "ordered": true },
              { "code": 12, "mnemonic": "OWNEDBY", "inverse": 13, "cardinality": "1", "direction": "B", "optional": true }
            ]
          },
          {
            "code": 9, "mnemonic": "ORDER_OBJ",
            "properties": [
              { "code": 1, "mnemonic": "NAME", "format": "NAME", "length": 32 },
              { "code": 8, "mnemonic": "PRIORITY", "format": "SINT", "length": 2, "defaultInt": 5 }
            ],
            "associations": [
              { "code": 11, "mnemonic": "ORDEREDBY", "inverse": 10, "cardinality": "1", "direction": "B" }
            ]
          },
          {
            "code": 3, "mnemonic": "OWNER_OBJ",
            "properties": [
              { "code": 1, "mnemonic": "NAME", "format": "NAME", "length": 32 }
            ],
            "associations": [
              { "code": 13, "mnemonic": "OWNS", "inverse": 12, "cardinality": "M", "direction": "F", "optional": true }
            ]
          }
        ]
      },
      "models": [
        {
          "name": "SAMPLE",
          "objects": [
            { "id": 100, "type": 7,
              "properties": { "NAME": "Customer", "DESC": "", "OPTION": "Y", "SEQ": 0, "MEMBER": "DEFAULT" },
              "associations": { "HASORDERS": [101, 102], "OWNEDBY": [] } },
            { "id": 101, "type": 9,
              "properties": { "NAME": "Order A", "PRIORITY": 5 },
              "associations": { "ORDEREDBY": [100] } },
            { "id": 102, "type": 9,
              "properties": { "NAME": "Order B", "PRIORITY": 1 },
              "associations": { "ORDEREDBY": [100] } },
            { "id": 103, "type": 7,
              "properties": { "NAME": "Prospect", "SEQ": 12, "MEMBER": "CUSTLOAD" },
              "associations": { "OWNEDBY": [200] } },
            { "id": 200, "type": 3,
              "properties": { "NAME": "Head Office" },
              "associations": { "OWNS": [103] } }
          ]
        },
        { "name": "EMPTY", "objects": [] }
      ]
    }"#;

    pub fn sample_repository() -> LocalRepository {
        LocalRepository::from_json_str(SAMPLE_REPOSITORY).unwrap()
    }
}

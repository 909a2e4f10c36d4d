//! Model session - object enumeration and typed object access
//!
//! A session exposes one open model: the ordered object identifiers and,
//! per identifier, a handle that reads property values and follows
//! associations. Reading with the wrong reader for a format, or following
//! with the wrong follower for a cardinality, is an unsupported operation.

use crate::Result;
use crate::schema::{AssociationDef, PropertyDef};
use serde::{Deserialize, Serialize};

/// Object identifier, stable for the lifetime of the source model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjId(pub i64);

impl ObjId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ObjId {
    fn from(value: i64) -> Self {
        ObjId(value)
    }
}

impl std::fmt::Display for ObjId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed access to one object of an open model.
pub trait ObjectHandle {
    /// Identifier of this object
    fn id(&self) -> ObjId;

    /// Object type code, resolvable through the type schema
    fn type_code(&self) -> i16;

    /// Read a TEXT, LOADNAME or NAME property
    fn text_property(&self, property: &PropertyDef) -> Result<String>;

    /// Read a CHAR property
    fn char_property(&self, property: &PropertyDef) -> Result<char>;

    /// Read an INT or SINT property
    fn int_property(&self, property: &PropertyDef) -> Result<i32>;

    /// Follow a single-valued association, `None` when unset
    fn follow_one(&self, association: &AssociationDef) -> Result<Option<ObjId>>;

    /// Follow a multi-valued association, in the order the model keeps
    fn follow_many(&self, association: &AssociationDef) -> Result<Vec<ObjId>>;
}

/// An open model.
pub trait ModelSession {
    /// Model name
    fn name(&self) -> &str;

    /// All object identifiers, in model order
    fn object_ids(&self) -> Result<Vec<ObjId>>;

    /// Resolve an identifier to a typed handle
    fn object(&self, id: ObjId) -> Result<Box<dyn ObjectHandle + '_>>;
}

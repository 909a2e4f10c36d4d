//! Storage Layer - SQLite relational export
//!
//! One database per model with tables:
//! - GenObjects(id, objType, objMnemonic, name)
//! - GenProperties(objid, prpType, mnemonic, format, value)
//! - GenAssociations(fromObjid, ascType, toObjid, inverseAscType, ascMnemonic, card, direction, seqno)
//! - GenModel(key, value)
//! - GenMetaObjects / GenMetaProperties / GenMetaAssociations (schema catalog, optional)

pub mod schema;
pub mod sqlite;

pub use sqlite::{CatalogCounts, ModelStore, StoreStats};

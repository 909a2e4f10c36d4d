//! Extraction traversal engine
//!
//! Walks every object of an open model once and produces:
//! - one `ObjectRecord` per object, in session order, carrying only the
//!   properties whose live value differs from the schema default
//! - the association edges of every object, in schema declaration order,
//!   with contiguous `seqno`s for multi-valued associations
//!
//! Any read or follow failure aborts the whole traversal.

use crate::record::{AssociationEdge, ExportCounts, ObjectRecord, PropertyRecord};
use crate::schema::{Cardinality, ObjectTypeDef, PropertyDef, PrpFormat, TypeSchema};
use crate::session::{ModelSession, ObjectHandle};
use crate::Result;

/// Everything one traversal produced.
#[derive(Debug, Default)]
pub struct Extraction {
    pub objects: Vec<ObjectRecord>,
    pub associations: Vec<AssociationEdge>,
    pub counts: ExportCounts,
}

impl Extraction {
    /// Find an exported object by id
    pub fn object(&self, id: crate::ObjId) -> Option<&ObjectRecord> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Edges leaving an object, in export order
    pub fn edges_from(&self, id: crate::ObjId) -> Vec<&AssociationEdge> {
        self.associations.iter().filter(|e| e.from == id).collect()
    }
}

/// Traversal engine over one session and its type schema.
pub struct Extractor<'a> {
    session: &'a dyn ModelSession,
    schema: &'a dyn TypeSchema,
}

impl<'a> Extractor<'a> {
    pub fn new(session: &'a dyn ModelSession, schema: &'a dyn TypeSchema) -> Self {
        Self { session, schema }
    }

    /// Traverse the whole model
    pub fn run(&self) -> Result<Extraction> {
        self.run_with_progress(|_, _| {})
    }

    /// Traverse the whole model, reporting `(done, total)` after each object
    pub fn run_with_progress(&self, mut progress: impl FnMut(usize, usize)) -> Result<Extraction> {
        let ids = self.session.object_ids()?;
        let total = ids.len();
        tracing::info!("Extracting {} objects from model {}", total, self.session.name());

        let mut extraction = Extraction {
            objects: Vec::with_capacity(total),
            ..Default::default()
        };

        for (done, id) in ids.into_iter().enumerate() {
            let handle = self.session.object(id)?;
            let type_def = self.schema.object_type(handle.type_code())?;

            let record = extract_object(handle.as_ref(), type_def)?;
            let edges = extract_associations(handle.as_ref(), type_def, &mut extraction.associations)?;
            tracing::trace!(
                "Object {} ({}): {} properties, {} edges",
                id,
                type_def.mnemonic,
                record.properties.len(),
                edges
            );

            extraction.counts.objects += 1;
            extraction.counts.properties += record.properties.len();
            extraction.counts.associations += edges;
            extraction.objects.push(record);

            progress(done + 1, total);
        }

        tracing::info!(
            "Extracted {} objects, {} properties, {} associations",
            extraction.counts.objects,
            extraction.counts.properties,
            extraction.counts.associations
        );
        Ok(extraction)
    }
}

/// Build the record of one object with its non-default properties
pub fn extract_object(handle: &dyn ObjectHandle, type_def: &ObjectTypeDef) -> Result<ObjectRecord> {
    let mut record = ObjectRecord::new(handle.id(), type_def.code, type_def.mnemonic.clone());

    for property in &type_def.properties {
        if let Some(prp) = extract_property(handle, property)? {
            if prp.format == PrpFormat::Name {
                record.name = Some(prp.value.clone());
            }
            record.properties.push(prp);
        }
    }

    Ok(record)
}

/// Read one property, `None` when it is at its default, empty, or not exportable
pub fn extract_property(handle: &dyn ObjectHandle, property: &PropertyDef) -> Result<Option<PropertyRecord>> {
    let Some(format) = property.prp_format() else {
        return Ok(None);
    };

    let value = match format {
        PrpFormat::Text | PrpFormat::LoadName | PrpFormat::Name => {
            let text = handle.text_property(property)?;
            (!text.is_empty() && text != property.default_text).then_some(text)
        }
        PrpFormat::Char => {
            let c = handle.char_property(property)?;
            (c != property.default_char).then(|| c.to_string())
        }
        PrpFormat::Int | PrpFormat::Sint => {
            let n = handle.int_property(property)?;
            (n != property.default_int).then(|| n.to_string())
        }
    };

    Ok(value.map(|value| PropertyRecord {
        type_code: property.code,
        format,
        mnemonic: property.mnemonic.clone(),
        value,
    }))
}

/// Append the edges of one object and return how many were added
pub fn extract_associations(
    handle: &dyn ObjectHandle,
    type_def: &ObjectTypeDef,
    edges: &mut Vec<AssociationEdge>,
) -> Result<usize> {
    let before = edges.len();

    for association in &type_def.associations {
        let edge = |to, seqno| AssociationEdge {
            from: handle.id(),
            cardinality: association.cardinality,
            mnemonic: association.mnemonic.clone(),
            asc_type_code: association.code,
            inverse_type_code: association.inverse,
            to,
            seqno,
            direction: association.direction,
        };

        match association.cardinality {
            Cardinality::Many => {
                let targets = handle.follow_many(association)?;
                edges.extend((0u32..).zip(targets).map(|(seqno, to)| edge(to, seqno)));
            }
            Cardinality::One => {
                if let Some(to) = handle.follow_one(association)? {
                    edges.push(edge(to, 0));
                }
            }
        }
    }

    Ok(edges.len() - before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::fixtures::sample_repository;
    use crate::local::LocalRepository;
    use crate::schema::{AssociationDef, Direction};
    use crate::session::ObjId;
    use crate::Error;

    fn sample_extraction() -> Extraction {
        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        Extractor::new(&model, repository.schema()).run().unwrap()
    }

    #[test]
    fn test_counts() {
        let extraction = sample_extraction();
        assert_eq!(extraction.counts.objects, 5);
        assert_eq!(extraction.counts.properties, 9);
        assert_eq!(extraction.counts.associations, 6);
        assert_eq!(extraction.objects.len(), extraction.counts.objects);
        assert_eq!(extraction.associations.len(), extraction.counts.associations);
        let props: usize = extraction.objects.iter().map(|o| o.properties.len()).sum();
        assert_eq!(props, extraction.counts.properties);
    }

    #[test]
    fn test_session_order_preserved() {
        let extraction = sample_extraction();
        let ids: Vec<i64> = extraction.objects.iter().map(|o| o.id.value()).collect();
        assert_eq!(ids, vec![100, 101, 102, 103, 200]);
    }

    #[test]
    fn test_customer_example() {
        let extraction = sample_extraction();
        let customer = extraction.object(ObjId(100)).unwrap();

        assert_eq!(customer.type_code, 7);
        assert_eq!(customer.type_mnemonic, "CUSTOMER_OBJ");
        assert_eq!(customer.name.as_deref(), Some("Customer"));

        let mnemonics: Vec<&str> = customer.properties.iter().map(|p| p.mnemonic.as_str()).collect();
        // DESC is empty, SEQ and MEMBER sit at their defaults, WEIGHT is not exportable
        assert_eq!(mnemonics, vec!["NAME", "OPTION"]);
        assert_eq!(customer.property("OPTION").unwrap().value, "Y");
        assert_eq!(customer.property("OPTION").unwrap().format, PrpFormat::Char);

        let edges = extraction.edges_from(ObjId(100));
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].to, edges[0].seqno), (ObjId(101), 0));
        assert_eq!((edges[1].to, edges[1].seqno), (ObjId(102), 1));
        assert!(edges.iter().all(|e| e.cardinality == Cardinality::Many));
        assert!(edges.iter().all(|e| e.direction == Direction::Forward && e.inverse_type_code == 11));
    }

    #[test]
    fn test_integer_default_suppressed() {
        let extraction = sample_extraction();
        assert!(extraction.object(ObjId(101)).unwrap().property("PRIORITY").is_none());

        let priority = extraction.object(ObjId(102)).unwrap().property("PRIORITY").unwrap();
        assert_eq!(priority.value, "1");
        assert_eq!(priority.format, PrpFormat::Sint);

        let prospect = extraction.object(ObjId(103)).unwrap();
        assert_eq!(prospect.property("SEQ").unwrap().value, "12");
        assert_eq!(prospect.property("MEMBER").unwrap().value, "CUSTLOAD");
    }

    #[test]
    fn test_single_valued_edges() {
        let extraction = sample_extraction();

        // OWNEDBY is unset on 100: no edge at all
        assert!(extraction
            .edges_from(ObjId(100))
            .iter()
            .all(|e| e.mnemonic != "OWNEDBY"));

        let owned_by = extraction.edges_from(ObjId(103));
        assert_eq!(owned_by.len(), 1);
        assert_eq!(owned_by[0].to, ObjId(200));
        assert_eq!(owned_by[0].seqno, 0);
        assert_eq!(owned_by[0].cardinality, Cardinality::One);
        assert_eq!(owned_by[0].direction, Direction::Backward);
    }

    #[test]
    fn test_seqno_contiguous_per_association() {
        let repository = LocalRepository::from_json_str(
            r#"{"schema": {"version": "1", "objectTypes": [{"code": 1, "mnemonic": "NODE",
                "associations": [
                  {"code": 2, "mnemonic": "LEFT", "inverse": 3, "cardinality": "M", "direction": "F", "ordered": true},
                  {"code": 4, "mnemonic": "RIGHT", "inverse": 5, "cardinality": "M", "direction": "B"}
                ]}]},
               "models": [{"name": "M", "objects": [
                 {"id": 1, "type": 1, "associations": {"LEFT": [4, 2, 3], "RIGHT": [2, 3]}},
                 {"id": 2, "type": 1}, {"id": 3, "type": 1}, {"id": 4, "type": 1}
               ]}]}"#,
        )
        .unwrap();
        let model = repository.open_first().unwrap();
        let extraction = Extractor::new(&model, repository.schema()).run().unwrap();

        let left: Vec<(i64, u32)> = extraction
            .associations
            .iter()
            .filter(|e| e.asc_type_code == 2)
            .map(|e| (e.to.value(), e.seqno))
            .collect();
        assert_eq!(left, vec![(4, 0), (2, 1), (3, 2)]);

        let right: Vec<u32> = extraction
            .associations
            .iter()
            .filter(|e| e.asc_type_code == 4)
            .map(|e| e.seqno)
            .collect();
        assert_eq!(right, vec![0, 1]);
    }

    #[test]
    fn test_read_failure_aborts_run() {
        let repository = LocalRepository::from_json_str(
            r#"{"schema": {"version": "1", "objectTypes": [{"code": 1, "mnemonic": "A",
                "properties": [{"code": 1, "mnemonic": "SEQ", "format": "INT"}]}]},
               "models": [{"name": "M", "objects": [
                 {"id": 1, "type": 1, "properties": {"SEQ": 3}},
                 {"id": 2, "type": 1, "properties": {"SEQ": "three"}}
               ]}]}"#,
        )
        .unwrap();
        let model = repository.open_first().unwrap();
        let result = Extractor::new(&model, repository.schema()).run();
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_unknown_type_aborts_run() {
        let repository = LocalRepository::from_json_str(
            r#"{"schema": {"version": "1"}, "models": [{"name": "M", "objects": [{"id": 1, "type": 42}]}]}"#,
        )
        .unwrap();
        let model = repository.open_first().unwrap();
        let result = Extractor::new(&model, repository.schema()).run();
        assert!(matches!(result, Err(Error::UnknownType(42))));
    }

    #[test]
    fn test_text_default_compared_by_value() {
        let type_def = ObjectTypeDef::new(1, "A")
            .with_property(PropertyDef::new(1, "MEMBER", "LOADNAME").with_default_text("DEFAULT"));
        let repository = LocalRepository::from_json_str(
            r#"{"schema": {"version": "1"}, "models": [{"name": "M", "objects": [
                 {"id": 1, "type": 1, "properties": {"MEMBER": "DEFAULT"}}]}]}"#,
        )
        .unwrap();
        let model = repository.open_first().unwrap();
        let handle = model.object(ObjId(1)).unwrap();

        let record = extract_object(handle.as_ref(), &type_def).unwrap();
        assert!(record.properties.is_empty());
        assert_eq!(record.name, None);
    }

    #[test]
    fn test_progress_reports_every_object() {
        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        let mut seen = Vec::new();
        Extractor::new(&model, repository.schema())
            .run_with_progress(|done, total| seen.push((done, total)))
            .unwrap();
        assert_eq!(seen.first(), Some(&(1, 5)));
        assert_eq!(seen.last(), Some(&(5, 5)));
    }

    #[test]
    fn test_edge_carries_schema_identity() {
        let association = AssociationDef::new(10, "HASORDERS", 11, Cardinality::Many, Direction::Forward);
        let type_def = ObjectTypeDef::new(7, "CUSTOMER_OBJ").with_association(association);
        let repository = sample_repository();
        let model = repository.open_first().unwrap();
        let handle = model.object(ObjId(100)).unwrap();

        let mut edges = Vec::new();
        let added = extract_associations(handle.as_ref(), &type_def, &mut edges).unwrap();
        assert_eq!(added, 2);
        assert!(edges.iter().all(|e| e.from == ObjId(100) && e.asc_type_code == 10 && e.mnemonic == "HASORDERS"));
    }
}

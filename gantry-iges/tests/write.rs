//! Write-out sequencing, transform composition, and reference-tracking
//! invariants over the author path.

use gantry_base::assert_near;
use gantry_base::cgmath64::*;
use gantry_iges::entity::{CompositeCurve, LineEntity, TransformMatrix};
use gantry_iges::{Dependency, Entity, Error, Model, Param, RawEntity, RefStatus, StatusFlags};
use proptest::prelude::*;
use std::collections::HashSet;
use std::f64::consts::FRAC_PI_2;

/// every pointer must name an already-written DE
fn assert_children_first(records: &[RawEntity]) {
    let mut seen = HashSet::new();
    for record in records {
        for param in &record.pd.params {
            if let Param::Pointer(seq) = param {
                if *seq != 0 {
                    assert!(
                        seen.contains(seq),
                        "DE {} points forward at DE {seq}",
                        record.de.sequence,
                    );
                }
            }
        }
        if record.de.transform != 0 {
            assert!(seen.contains(&record.de.transform));
        }
        seen.insert(record.de.sequence);
    }
}

fn boxed_line(x: f64) -> Box<LineEntity> {
    let mut line = LineEntity::new();
    line.end = Point3::new(x, 0.0, 0.0);
    Box::new(line)
}

#[test]
fn sequences_children_before_parents() {
    let mut model = Model::new();
    let child_a = model.add_entity(boxed_line(1.0));
    let child_b = model.add_entity(boxed_line(2.0));
    let composite = model.add_entity(Box::new(CompositeCurve::from_members(vec![
        child_a, child_b,
    ])));
    model.add_child(composite, child_a, Dependency::Physical).unwrap();
    model.add_child(composite, child_b, Dependency::Physical).unwrap();

    let mut records: Vec<RawEntity> = Vec::new();
    model.write_to_records(&mut records).unwrap();
    assert_eq!(records.len(), 3);
    assert_children_first(&records);
    // DE sequences advance two lines per entity
    let sequences: Vec<usize> = records.iter().map(|r| r.de.sequence).collect();
    assert_eq!(sequences, [1, 3, 5]);
    // PD pointers are contiguous
    let mut cursor = 1;
    for record in &records {
        assert_eq!(record.de.param_data, cursor);
        assert!(record.de.param_line_count >= 1);
        cursor += record.de.param_line_count;
    }
}

#[test]
fn edge_symmetry_and_removal() {
    let mut model = Model::new();
    let child = model.add_entity(boxed_line(1.0));
    let parent = model.create_entity(102).unwrap();
    assert_eq!(
        model.add_child(parent, child, Dependency::Logical).unwrap(),
        RefStatus::Added,
    );
    assert!(model.get(parent).unwrap().core().children().contains(&child));
    assert!(model
        .get(child)
        .unwrap()
        .core()
        .parents()
        .any(|(id, dep)| id == parent && dep == Dependency::Logical));

    model.del_child(parent, child).unwrap();
    assert!(model.get(parent).unwrap().core().children().is_empty());
    assert_eq!(model.get(child).unwrap().core().parents().count(), 0);
    // not physically dependent, so the orphan survives
    assert!(model.get(child).is_ok());
}

#[test]
fn physical_orphan_is_destroyed() {
    use gantry_iges::record::Subordinate;
    let mut model = Model::new();
    let child = model.add_entity(boxed_line(1.0));
    model.get_mut(child).unwrap().core_mut().de.status.subordinate =
        Subordinate::PhysicallyDependent;
    let keeper = model.create_entity(102).unwrap();
    let other = model.create_entity(102).unwrap();
    model.add_child(keeper, child, Dependency::Physical).unwrap();
    model.add_child(other, child, Dependency::Physical).unwrap();

    model.delete_entity(keeper).unwrap();
    // one parent left: the child lives
    assert!(model.get(child).is_ok());
    model.delete_entity(other).unwrap();
    // the last parent is gone: the cascade consumed the child
    assert!(model.get(child).is_err());
}

#[test]
fn dependency_cycles_are_rejected() {
    let mut model = Model::new();
    let a = model.create_entity(102).unwrap();
    let b = model.create_entity(102).unwrap();
    let c = model.create_entity(102).unwrap();
    model.add_child(a, b, Dependency::Physical).unwrap();
    model.add_child(b, c, Dependency::Physical).unwrap();
    assert!(matches!(
        model.add_child(c, a, Dependency::Physical),
        Err(Error::CyclicDependency),
    ));
    assert!(matches!(
        model.add_child(a, a, Dependency::Physical),
        Err(Error::CyclicDependency),
    ));
}

#[test]
fn transform_chain_composes_parent_first() {
    let mut model = Model::new();
    let lift = model.add_entity(Box::new(TransformMatrix::from_parts(
        Matrix3::identity(),
        Vector3::new(0.0, 0.0, 5.0),
    )));
    let spin = model.add_entity(Box::new(TransformMatrix::from_parts(
        Matrix3::from_angle_z(Rad(FRAC_PI_2)),
        Vector3::zero(),
    )));
    // chain: spin sits under lift
    model.set_transform(spin, lift).unwrap();
    let line = model.add_entity(boxed_line(1.0));
    model.set_transform(line, spin).unwrap();

    let placed = model.transform_point(line, Point3::new(1.0, 0.0, 0.0)).unwrap();
    assert_near!(placed, Point3::new(0.0, 1.0, 5.0));

    // the DE transform fields re-encode as assigned sequences
    let mut records: Vec<RawEntity> = Vec::new();
    model.write_to_records(&mut records).unwrap();
    assert_children_first(&records);
    let line_record = records.iter().find(|r| r.de.entity_type == 110).unwrap();
    let spin_record = records
        .iter()
        .find(|r| r.de.entity_type == 124 && r.de.transform != 0)
        .unwrap();
    assert_eq!(line_record.de.transform, spin_record.de.sequence);
}

#[test]
fn records_survive_serialization() {
    let mut model = Model::new();
    let child = model.add_entity(boxed_line(3.5));
    let composite = model.add_entity(Box::new(CompositeCurve::from_members(vec![child])));
    model.add_child(composite, child, Dependency::Physical).unwrap();
    let mut records: Vec<RawEntity> = Vec::new();
    model.write_to_records(&mut records).unwrap();

    let json = serde_json::to_string(&records).unwrap();
    let back: Vec<RawEntity> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, records);
}

proptest! {
    #[test]
    fn status_codes_roundtrip(
        blank in 0u32..=1,
        subordinate in 0u32..=3,
        use_flag in 0u32..=6,
        hierarchy in 0u32..=2,
    ) {
        let code = blank * 1_000_000 + subordinate * 10_000 + use_flag * 100 + hierarchy;
        let status = StatusFlags::from_code(code).unwrap();
        prop_assert_eq!(status.to_code(), code);
    }

    #[test]
    fn de_refs_roundtrip(raw in -10_000i64..=10_000) {
        use gantry_iges::DeRef;
        prop_assert_eq!(DeRef::from_raw(raw).to_raw(), raw);
    }
}

#[test]
fn transform_cycles_are_rejected() {
    let mut model = Model::new();
    let t1 = model.add_entity(Box::new(TransformMatrix::new()));
    let t2 = model.add_entity(Box::new(TransformMatrix::new()));
    model.set_transform(t1, t2).unwrap();
    assert!(matches!(
        model.set_transform(t2, t1),
        Err(Error::CyclicDependency),
    ));
    assert!(matches!(model.set_transform(t1, t1), Err(Error::CyclicDependency)));
}

//! Two-phase load scenarios: association ordering, reference symmetry,
//! failure aggregation, and the rescale suppression rule.

use gantry_base::cgmath64::*;
use gantry_iges::entity::{CompositeCurve, CurveOnSurface, NurbsCurve, NurbsSurface};
use gantry_iges::{Dependency, DirEntry, Entity, Error, Model, Param, ParamRecord, RawEntity};

fn de(sequence: usize, entity_type: u32) -> DirEntry {
    let mut de = DirEntry::new(entity_type);
    de.sequence = sequence;
    de
}

fn pd(type_code: u32, params: Vec<Param>) -> ParamRecord {
    ParamRecord { type_code, params }
}

fn reals(values: &[f64]) -> impl Iterator<Item = Param> + '_ {
    values.iter().map(|&v| Param::Real(v))
}

/// a planar degree-1 curve between two points
fn line_curve_params(a: Point3, b: Point3) -> Vec<Param> {
    let mut params = vec![
        Param::Int(1), // K
        Param::Int(1), // M
        Param::Int(1), // planar
        Param::Int(0), // open
        Param::Int(1), // polynomial
        Param::Int(0), // non-periodic
    ];
    params.extend(reals(&[0.0, 0.0, 1.0, 1.0])); // knots
    params.extend(reals(&[1.0, 1.0])); // weights
    params.extend(reals(&[a.x, a.y, a.z, b.x, b.y, b.z]));
    params.extend(reals(&[0.0, 1.0, 0.0, 0.0, 1.0])); // range + normal
    params
}

/// a bilinear patch over the unit square at z = 0
fn plane_surface_params() -> Vec<Param> {
    let mut params = vec![
        Param::Int(1),
        Param::Int(1), // K1, K2
        Param::Int(1),
        Param::Int(1), // M1, M2
        Param::Int(0),
        Param::Int(0), // open in u, v
        Param::Int(1), // polynomial
        Param::Int(0),
        Param::Int(0), // non-periodic
    ];
    params.extend(reals(&[0.0, 0.0, 1.0, 1.0])); // knots u
    params.extend(reals(&[0.0, 0.0, 1.0, 1.0])); // knots v
    params.extend(reals(&[1.0, 1.0, 1.0, 1.0])); // weights
    params.extend(reals(&[
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0,
    ]));
    params.extend(reals(&[0.0, 1.0, 0.0, 1.0])); // ranges
    params
}

/// The associate-ordering scenario: a composite whose member is a
/// curve-on-surface appearing later in the file, which itself points even
/// further ahead.
fn forward_reference_records() -> Vec<RawEntity> {
    vec![
        RawEntity {
            de: de(1, 102),
            pd: pd(102, vec![Param::Int(1), Param::Pointer(3)]),
        },
        RawEntity {
            de: de(3, 142),
            pd: pd(
                142,
                vec![
                    Param::Int(1),
                    Param::Pointer(5),
                    Param::Pointer(7),
                    Param::Pointer(9),
                    Param::Int(3),
                ],
            ),
        },
        RawEntity {
            de: de(5, 128),
            pd: pd(128, plane_surface_params()),
        },
        RawEntity {
            de: de(7, 126),
            pd: pd(
                126,
                line_curve_params(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            ),
        },
        RawEntity {
            de: de(9, 126),
            pd: pd(
                126,
                line_curve_params(Point3::new(0.0, 0.0, 0.0), Point3::new(25.0, 0.0, 0.0)),
            ),
        },
    ]
}

#[test]
fn forward_references_associate() {
    let mut model = Model::new();
    model
        .load_from_records(forward_reference_records())
        .unwrap();

    let composites = model.entities_by_type(102);
    let on_surfaces = model.entities_by_type(142);
    assert_eq!((composites.len(), on_surfaces.len()), (1, 1));
    let composite = composites[0];
    let on_surface = on_surfaces[0];

    for id in model.ids() {
        assert!(model.get(id).unwrap().core().associated(), "{id} left behind");
    }
    // the chain holds the curve-on-surface as a physically dependent child
    assert_eq!(model.get(composite).unwrap().core().children(), [on_surface]);
    let (parent, dep) = model
        .get(on_surface)
        .unwrap()
        .core()
        .parents()
        .next()
        .unwrap();
    assert_eq!((parent, dep), (composite, Dependency::Physical));
    // the curve-on-surface resolved its three forward references
    assert_eq!(model.get(on_surface).unwrap().core().children().len(), 3);
}

#[test]
fn associate_is_idempotent() {
    let mut model = Model::new();
    model
        .load_from_records(forward_reference_records())
        .unwrap();
    let composite = model.entities_by_type(102)[0];
    let before = model.get(composite).unwrap().core().children().to_vec();
    model.associate().unwrap();
    model.associate().unwrap();
    assert_eq!(model.get(composite).unwrap().core().children(), before);
}

#[test]
fn rescale_spares_the_parameter_curve() {
    let mut model = Model::new();
    model
        .load_from_records(forward_reference_records())
        .unwrap();
    model.rescale(25.4).unwrap();

    let on_surface = model.entities_by_type(142)[0];
    let cos = model.get_as::<CurveOnSurface>(on_surface).unwrap();
    let bcurve = model
        .get_as::<NurbsCurve>(model.get(on_surface).unwrap().b_pointer().unwrap())
        .unwrap();
    let ccurve = model.get_as::<NurbsCurve>(cos.model_curve().unwrap()).unwrap();
    // parameter space does not scale; model space does
    assert_eq!(bcurve.ctrl[1].x, 1.0);
    assert_eq!(ccurve.ctrl[1].x, 25.0 * 25.4);
    let plane = model.get_as::<NurbsSurface>(cos.surface().unwrap()).unwrap();
    assert_eq!(plane.ctrl[3].x, 25.4);
}

#[test]
fn unsupported_type_fails_unless_lenient() {
    let records = vec![RawEntity {
        de: de(1, 999),
        pd: pd(999, vec![]),
    }];
    let mut model = Model::new();
    assert!(matches!(
        model.load_from_records(records.clone()),
        Err(Error::UnsupportedEntity(999)),
    ));

    let mut lenient = Model::new();
    lenient.set_lenient(true);
    lenient.load_from_records(records).unwrap();
    assert!(lenient.ids().is_empty());
}

#[test]
fn dangling_pointer_is_aggregated() {
    let records = vec![
        RawEntity {
            de: de(1, 102),
            pd: pd(102, vec![Param::Int(1), Param::Pointer(99)]),
        },
        RawEntity {
            de: de(3, 110),
            pd: pd(110, reals(&[0.0, 0.0, 0.0, 1.0, 1.0, 0.0]).collect()),
        },
    ];
    let mut model = Model::new();
    let err = model.load_from_records(records).unwrap_err();
    let Error::AssociateFailures(failures) = err else {
        panic!("expected an aggregate failure");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 1);
    assert!(matches!(failures[0].1, Error::UnresolvedReference(99)));
    // the healthy entity still associated
    let line = model.entities_by_type(110)[0];
    assert!(model.get(line).unwrap().core().associated());
}

#[test]
fn type_mismatch_is_rejected() {
    let records = vec![RawEntity {
        de: de(1, 110),
        pd: pd(100, vec![]),
    }];
    let mut model = Model::new();
    assert!(matches!(
        model.load_from_records(records),
        Err(Error::TypeMismatch {
            sequence: 1,
            declared: 110,
            found: 100,
        }),
    ));
}

#[test]
fn existing_edge_is_noop() {
    use gantry_iges::RefStatus;
    let mut model = Model::new();
    model
        .load_from_records(forward_reference_records())
        .unwrap();
    let composite = model.entities_by_type(102)[0];
    let on_surface = model.entities_by_type(142)[0];
    assert_eq!(
        model.get_as::<CompositeCurve>(composite).unwrap().members(),
        [on_surface],
    );
    // pushing the same edge again reports the existing membership and
    // leaves the child list untouched
    let status = model
        .add_child(composite, on_surface, Dependency::Physical)
        .unwrap();
    assert_eq!(status, RefStatus::AlreadyPresent);
    assert_eq!(model.get(composite).unwrap().core().children().len(), 1);
}

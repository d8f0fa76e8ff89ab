use gantry_base::cgmath64::*;
use gantry_geometry::Segment;
use gantry_outline::{Error, Orientation, Outline};
use proptest::prelude::*;

fn pt(x: f64, y: f64) -> Point3 { Point3::new(x, y, 0.0) }

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Outline {
    Outline::from_segments([
        Segment::line(pt(x0, y0), pt(x1, y0)).unwrap(),
        Segment::line(pt(x1, y0), pt(x1, y1)).unwrap(),
        Segment::line(pt(x1, y1), pt(x0, y1)).unwrap(),
        Segment::line(pt(x0, y1), pt(x0, y0)).unwrap(),
    ])
    .unwrap()
}

/// the upward-bulging semicircle outline used by the drill-slot scenarios:
/// an arc over the chord connecting `(x0, y)` and `(x1, y)`
fn bump(x0: f64, x1: f64, y: f64) -> Outline {
    let center = pt((x0 + x1) / 2.0, y);
    let arc = Segment::arc(center, pt(x0, y), pt(x1, y), true).unwrap();
    let chord = Segment::line(pt(x1, y), pt(x0, y)).unwrap();
    Outline::from_segments([arc, chord]).unwrap()
}

#[test]
fn rect_minus_circular_hole() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let drilled = board.subtract_circle(pt(50.0, 25.0), 10.0).unwrap();
    assert_eq!(drilled.holes().len(), 1);
    assert_eq!(drilled.segments().len(), board.segments().len());
    assert_eq!(drilled.orientation(), Some(Orientation::Ccw));
    // the outer chain is untouched by an interior hole
    assert!(drilled.is_point_inside(pt(1.0, 1.0)));
}

#[test]
fn hole_outside_is_callers_error() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    assert!(matches!(
        board.subtract_circle(pt(200.0, 25.0), 10.0),
        Err(Error::InvalidIntersection(_)),
    ));
}

#[test]
fn disjoint_add_is_noop() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let far = Outline::circle(pt(500.0, 500.0), 10.0).unwrap();
    assert_eq!(board.add(&far).unwrap(), board);
}

#[test]
fn contained_add_is_rejected() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    assert!(matches!(
        board.add_circle(pt(50.0, 25.0), 10.0),
        Err(Error::InvalidIntersection(_)),
    ));
}

#[test]
fn overlapping_edge_subtract_is_rejected() {
    // the semicircle's chord lies along the board's top edge
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let slot = bump(40.0, 60.0, 50.0);
    assert!(matches!(
        board.subtract(&slot),
        Err(Error::InvalidIntersection(_)),
    ));
}

#[test]
fn two_point_subtract_carves_a_slot() {
    // the same semicircle dropped so its arc pierces the top edge twice
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let slot = bump(40.0, 60.0, 45.0);
    let carved = board.subtract(&slot).unwrap();
    // four rect edges with the top one in two pieces, plus the three-piece
    // chain of the slot that dips below the top edge
    assert_eq!(carved.segments().len(), 8);
    assert_eq!(carved.orientation(), Some(Orientation::Ccw));
    assert!(carved.is_point_inside(pt(10.0, 25.0)));
    assert!(carved.is_point_inside(pt(50.0, 40.0)));
    // under the slot apex the material is gone
    assert!(!carved.is_point_inside(pt(50.0, 49.0)));
    assert!(!carved.is_point_inside(pt(45.0, 46.0)));
}

#[test]
fn two_point_add_grows_a_lobe() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let lobe = bump(40.0, 60.0, 45.0);
    let grown = board.add(&lobe).unwrap();
    assert_eq!(grown.orientation(), Some(Orientation::Ccw));
    assert!(grown.is_point_inside(pt(50.0, 52.0)));
    assert!(grown.is_point_inside(pt(10.0, 25.0)));
    assert!(!grown.is_point_inside(pt(30.0, 52.0)));
}

#[test]
fn lobe_union_then_subtract_roundtrips() {
    // after the union, the grown boundary carries a sub-arc of the lobe;
    // subtracting the same lobe must line that sub-arc up against the
    // original unsplit arc and carve cleanly instead of failing
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let lobe = bump(40.0, 60.0, 45.0);
    let grown = board.add(&lobe).unwrap();
    let back = grown.subtract(&lobe).unwrap();
    assert_eq!(back, board.subtract(&lobe).unwrap());
    assert_eq!(back.orientation(), Some(Orientation::Ccw));
    assert!(back.is_point_inside(pt(10.0, 25.0)));
    // everything the lobe covered is gone, above and below the old edge
    assert!(!back.is_point_inside(pt(50.0, 52.0)));
    assert!(!back.is_point_inside(pt(50.0, 49.0)));
    assert!(!back.is_point_inside(pt(45.0, 46.0)));
}

#[test]
fn one_intersection_is_rejected() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    // circle tangent to the left edge from outside
    let tangent = Outline::circle(pt(-10.0, 25.0), 10.0).unwrap();
    assert!(matches!(
        board.subtract(&tangent),
        Err(Error::InvalidIntersection(_)),
    ));
}

#[test]
fn four_intersections_are_rejected() {
    let tall = rect(40.0, -10.0, 60.0, 60.0);
    let wide = rect(0.0, 0.0, 100.0, 50.0);
    assert!(matches!(
        wide.subtract(&tall),
        Err(Error::InvalidIntersection(_)),
    ));
    assert!(matches!(wide.add(&tall), Err(Error::InvalidIntersection(_))));
}

#[test]
fn adjacent_union_roundtrip() {
    // two rects sharing their full vertical edge: union, then carve the
    // second back out
    let a = rect(0.0, 0.0, 100.0, 50.0);
    let b = rect(100.0, 0.0, 200.0, 50.0);
    let union = a.add(&b).unwrap();
    assert_eq!(union.segments().len(), 6);
    assert!(union.is_point_inside(pt(150.0, 25.0)));
    assert!(union.is_point_inside(pt(50.0, 25.0)));

    let back = union.subtract(&b).unwrap();
    assert!(back.is_point_inside(pt(50.0, 25.0)));
    assert!(!back.is_point_inside(pt(150.0, 25.0)));
    assert_eq!(back.segments().len(), 4);
    assert_eq!(back.orientation(), Some(Orientation::Ccw));
}

#[test]
fn boolean_requires_closed_outlines() {
    let mut open = Outline::new();
    open.add_segment(Segment::line(pt(0.0, 0.0), pt(1.0, 0.0)).unwrap())
        .unwrap();
    let board = rect(0.0, 0.0, 100.0, 50.0);
    assert_eq!(board.add(&open), Err(Error::NotClosed));
}

#[test]
fn finalized_outline_still_composes() {
    let mut board = rect(0.0, 0.0, 100.0, 50.0);
    board.finalize().unwrap();
    let drilled = board.subtract_circle(pt(50.0, 25.0), 10.0).unwrap();
    assert_eq!(drilled.holes().len(), 1);
}

proptest! {
    #[test]
    fn interior_drill_holes_always_register(
        cx in 20.0f64..80.0,
        cy in 15.0f64..35.0,
        r in 2.0f64..8.0,
    ) {
        let board = rect(0.0, 0.0, 100.0, 50.0);
        let drilled = board.subtract_circle(pt(cx, cy), r).unwrap();
        prop_assert_eq!(drilled.holes().len(), 1);
        prop_assert!(drilled.holes()[0].is_point_inside(pt(cx, cy)));
        // the outer chain is untouched
        prop_assert_eq!(drilled.segments().len(), 4);
    }

    #[test]
    fn containment_agrees_with_interior_sample(
        w in 10.0f64..100.0,
        h in 10.0f64..100.0,
    ) {
        let outline = rect(0.0, 0.0, w, h);
        let sample = outline.interior_sample().unwrap();
        prop_assert!(outline.is_point_inside(sample));
        prop_assert!(!outline.is_point_inside(pt(w + 1.0, h / 2.0)));
        prop_assert!(!outline.is_point_inside(pt(w / 2.0, -1.0)));
    }
}

#[test]
fn subtraction_respects_containment_samples() {
    let board = rect(0.0, 0.0, 100.0, 50.0);
    let slot = bump(40.0, 60.0, 45.0);
    let carved = board.subtract(&slot).unwrap();
    for x in [5, 25, 45, 65, 85] {
        for y in [5, 15, 25, 35, 46, 48] {
            let p = pt(x as f64, y as f64);
            let expect = board.is_point_inside(p) && !slot.is_point_inside(p);
            assert_eq!(carved.is_point_inside(p), expect, "at {p:?}");
        }
    }
}

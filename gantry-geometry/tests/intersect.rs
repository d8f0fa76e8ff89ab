use gantry_base::cgmath64::*;
use gantry_base::{assert_near, prop_assert_near};
use gantry_geometry::{IntersectFlag, Segment};
use proptest::prelude::*;

fn pt(x: f64, y: f64) -> Point3 { Point3::new(x, y, 0.0) }

#[test]
fn orthogonal_line_cross() {
    let l1 = Segment::line(pt(0.0, 0.0), pt(10.0, 0.0)).unwrap();
    let l2 = Segment::line(pt(5.0, -5.0), pt(5.0, 5.0)).unwrap();
    let (pts, flag) = l1.intersect(&l2);
    assert_eq!(flag, IntersectFlag::None);
    assert_eq!(pts.len(), 1);
    assert_near!(pts[0], pt(5.0, 0.0));
}

#[test]
fn tangent_circles() {
    let c1 = Segment::circle(pt(0.0, 0.0), 5.0).unwrap();
    let c2 = Segment::circle(pt(10.0, 0.0), 5.0).unwrap();
    let (pts, flag) = c1.intersect(&c2);
    assert_eq!(flag, IntersectFlag::Tangent);
    assert!(pts.is_empty());
}

#[test]
fn concentric_circles() {
    let inner = Segment::circle(pt(0.0, 0.0), 2.0).unwrap();
    let outer = Segment::circle(pt(0.0, 0.0), 5.0).unwrap();
    let (pts, flag) = inner.intersect(&outer);
    assert_eq!(flag, IntersectFlag::SegmentInsideOther);
    assert!(pts.is_empty());
    let (_, flag) = outer.intersect(&inner);
    assert_eq!(flag, IntersectFlag::OtherInsideSegment);
}

#[test]
fn parallel_lines_never_meet() {
    let l1 = Segment::line(pt(0.0, 0.0), pt(10.0, 0.0)).unwrap();
    let l2 = Segment::line(pt(0.0, 1.0), pt(10.0, 1.0)).unwrap();
    assert_eq!(l1.intersect(&l2), (vec![], IntersectFlag::None));
}

fn flag_mirror(flag: IntersectFlag) -> IntersectFlag {
    match flag {
        IntersectFlag::SegmentInsideOther => IntersectFlag::OtherInsideSegment,
        IntersectFlag::OtherInsideSegment => IntersectFlag::SegmentInsideOther,
        other => other,
    }
}

fn same_point_set(a: &[Point3], b: &[Point3]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|p| b.iter().any(|q| (p - q).magnitude() < 1.0e-6))
}

proptest! {
    #[test]
    fn circle_intersection_is_symmetric(
        x0 in -5.0f64..5.0, y0 in -5.0f64..5.0, r0 in 0.5f64..4.0,
        x1 in -5.0f64..5.0, y1 in -5.0f64..5.0, r1 in 0.5f64..4.0,
    ) {
        let a = Segment::circle(pt(x0, y0), r0).unwrap();
        let b = Segment::circle(pt(x1, y1), r1).unwrap();
        let (pts_ab, flag_ab) = a.intersect(&b);
        let (pts_ba, flag_ba) = b.intersect(&a);
        prop_assert_eq!(flag_ba, flag_mirror(flag_ab));
        prop_assert!(same_point_set(&pts_ab, &pts_ba));
    }

    #[test]
    fn line_circle_intersection_is_symmetric(
        x0 in -5.0f64..5.0, y0 in -5.0f64..5.0,
        x1 in 5.5f64..10.0, y1 in 5.5f64..10.0,
        cx in -5.0f64..5.0, cy in -5.0f64..5.0, r in 0.5f64..4.0,
    ) {
        let line = Segment::line(pt(x0, y0), pt(x1, y1)).unwrap();
        let circle = Segment::circle(pt(cx, cy), r).unwrap();
        let (pts_ab, flag_ab) = line.intersect(&circle);
        let (pts_ba, flag_ba) = circle.intersect(&line);
        prop_assert_eq!(flag_ba, flag_mirror(flag_ab));
        prop_assert!(same_point_set(&pts_ab, &pts_ba));
    }

    #[test]
    fn self_intersection_of_circles_is_coincident(
        cx in -5.0f64..5.0, cy in -5.0f64..5.0, r in 0.5f64..4.0,
    ) {
        let circle = Segment::circle(pt(cx, cy), r).unwrap();
        let (pts, flag) = circle.intersect(&circle);
        prop_assert_eq!(flag, IntersectFlag::Coincident);
        prop_assert!(pts.is_empty());
    }

    #[test]
    fn intersection_points_lie_on_both(
        x0 in -5.0f64..5.0, y0 in -5.0f64..5.0, r0 in 0.5f64..4.0,
        x1 in -5.0f64..5.0, y1 in -5.0f64..5.0, r1 in 0.5f64..4.0,
    ) {
        let a = Segment::circle(pt(x0, y0), r0).unwrap();
        let b = Segment::circle(pt(x1, y1), r1).unwrap();
        let (pts, _) = a.intersect(&b);
        for p in pts {
            prop_assert_near!((p - pt(x0, y0)).magnitude(), r0);
            prop_assert_near!((p - pt(x1, y1)).magnitude(), r1);
        }
    }
}

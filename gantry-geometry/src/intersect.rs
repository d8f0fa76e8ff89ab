use crate::segment::*;
use crate::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Classifies the relation between two segments, beyond the transverse
/// intersection points themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectFlag {
    /// plain configuration: the returned points are transverse crossings
    None,
    /// the segments touch without crossing
    Tangent,
    /// the segments describe the same point set
    Coincident,
    /// `self` lies entirely inside `other`
    SegmentInsideOther,
    /// `other` lies entirely inside `self`
    OtherInsideSegment,
    /// the segments share a sub-curve; the returned points bound the overlap
    EdgeOverlap,
}

type Hits = (Vec<Point3>, IntersectFlag);

impl Segment {
    /// Intersects two segments.
    ///
    /// Returns the intersection points together with an [`IntersectFlag`]
    /// reporting tangent, coincident, containment, and edge-overlap
    /// configurations. Never fails; degeneracy is expressed in the flag.
    ///
    /// Transverse points are ordered along `self`'s traversal, except for
    /// circle × circle pairs, whose pair is ordered in CW traversal
    /// direction on `self`.
    pub fn intersect(&self, other: &Segment) -> (Vec<Point3>, IntersectFlag) {
        match (self, other) {
            (Segment::Line(a), Segment::Line(b)) => line_line(a, b),
            (Segment::Line(_), _) => {
                let (c, r) = other.circle_data().expect("non-line segment");
                let (pts, flag) = line_circle(self, c, r);
                restrict(pts, flag, self, other)
            }
            (_, Segment::Line(_)) => {
                let (c, r) = self.circle_data().expect("non-line segment");
                let (pts, flag) = line_circle(other, c, r);
                restrict(pts, flag, self, other)
            }
            _ => {
                let (c0, r0) = self.circle_data().expect("non-line segment");
                let (c1, r1) = other.circle_data().expect("non-line segment");
                if (c1 - c0).magnitude() < RADIAL_TOLERANCE
                    && f64::abs(r1 - r0) < RADIAL_TOLERANCE
                {
                    same_circle(self, other)
                } else {
                    let (pts, flag) = circle_circle(c0, r0, c1, r1);
                    let keep_order = self.kind() == SegmentKind::Circle
                        && other.kind() == SegmentKind::Circle;
                    match keep_order {
                        true => (pts, flag),
                        false => restrict(pts, flag, self, other),
                    }
                }
            }
        }
    }
}

/// keeps only candidates lying on both participants and orders them along
/// `fst`'s traversal
fn restrict(pts: Vec<Point3>, flag: IntersectFlag, fst: &Segment, snd: &Segment) -> Hits {
    let mut pts: Vec<Point3> = pts
        .into_iter()
        .filter(|p| fst.contains_point(*p) && snd.contains_point(*p))
        .collect();
    pts.sort_by(|a, b| {
        fst.traversal_param(*a)
            .partial_cmp(&fst.traversal_param(*b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    match (pts.is_empty(), flag) {
        (true, IntersectFlag::Tangent) => (pts, IntersectFlag::None),
        (_, flag) => (pts, flag),
    }
}

fn line_line(a: &Line, b: &Line) -> Hits {
    let (s1, e1) = (a.start, a.end);
    let (s2, e2) = (b.start, b.end);
    let d1 = e1 - s1;
    let d2 = e2 - s2;
    let denom = cross_z(d1, d2);
    if f64::abs(denom) < TOLERANCE * d1.magnitude() * d2.magnitude() {
        // parallel lines: empty unless collinear with overlapping ranges
        let dist = f64::abs(cross_z(d1, s2 - s1)) / d1.magnitude();
        if dist > RES_MIN {
            return (vec![], IntersectFlag::None);
        }
        let t_of = |p: Point3| (p - s1).dot(d1) / d1.magnitude2();
        let (mut t2s, mut t2e) = (t_of(s2), t_of(e2));
        if t2s > t2e {
            std::mem::swap(&mut t2s, &mut t2e);
        }
        let lo = f64::max(0.0, t2s);
        let hi = f64::min(1.0, t2e);
        if hi < lo - TOLERANCE {
            return (vec![], IntersectFlag::None);
        }
        if (hi - lo) * d1.magnitude() < RES_MIN {
            // collinear chains touching at a single shared endpoint
            return (vec![s1 + lo * d1], IntersectFlag::None);
        }
        let identical = (s1.near(&s2) && e1.near(&e2)) || (s1.near(&e2) && e1.near(&s2));
        if identical {
            return (vec![], IntersectFlag::Coincident);
        }
        (vec![s1 + lo * d1, s1 + hi * d1], IntersectFlag::EdgeOverlap)
    } else {
        let t = cross_z(s2 - s1, d2) / denom;
        let u = cross_z(s2 - s1, d1) / denom;
        let in01 = |v: f64| (-TOLERANCE..=1.0 + TOLERANCE).contains(&v);
        match in01(t) && in01(u) {
            true => (vec![s1 + t * d1], IntersectFlag::None),
            false => (vec![], IntersectFlag::None),
        }
    }
}

/// quadratic intersection of the supporting line of `line` with the circle
/// `(c, r)`; candidates are clipped to the line's parameter range but not to
/// any angular range
fn line_circle(line: &Segment, c: Point3, r: f64) -> Hits {
    let (s, e) = (line.start(), line.end());
    let d = e - s;
    let f = s - c;
    let qa = d.dot(d);
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - r * r;
    let disc = qb * qb - 4.0 * qa * qc;
    if f64::abs(disc) < RADIAL_TOLERANCE {
        let t = -qb / (2.0 * qa);
        match (-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
            true => (vec![s + t * d], IntersectFlag::Tangent),
            false => (vec![], IntersectFlag::None),
        }
    } else if disc < 0.0 {
        (vec![], IntersectFlag::None)
    } else {
        let sq = disc.sqrt();
        let pts = [(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)]
            .into_iter()
            .filter(|t| (-TOLERANCE..=1.0 + TOLERANCE).contains(t))
            .map(|t| s + t * d)
            .collect();
        (pts, IntersectFlag::None)
    }
}

/// radical-line intersection of two distinct circles; the transverse pair is
/// ordered in CW traversal direction on the first circle
fn circle_circle(c0: Point3, r0: f64, c1: Point3, r1: f64) -> Hits {
    let d = (c1 - c0).magnitude();
    if f64::abs(d - (r0 + r1)) < RADIAL_TOLERANCE {
        return (vec![], IntersectFlag::Tangent);
    }
    if d > r0 + r1 {
        return (vec![], IntersectFlag::None);
    }
    if d <= r0 - r1 {
        return (vec![], IntersectFlag::OtherInsideSegment);
    }
    if d <= r1 - r0 {
        return (vec![], IntersectFlag::SegmentInsideOther);
    }
    let rd = (d * d - r1 * r1 + r0 * r0) / (2.0 * d);
    let h = f64::sqrt(f64::max(r0 * r0 - rd * rd, 0.0));
    let dir = (c1 - c0) / d;
    let perp = Vector3::new(-dir.y, dir.x, 0.0);
    let base = c0 + rd * dir;
    (vec![base - h * perp, base + h * perp], IntersectFlag::None)
}

/// both participants share one supporting circle: coincidence and overlap
/// classification
fn same_circle(fst: &Segment, snd: &Segment) -> Hits {
    match (fst, snd) {
        (Segment::Circle(_), Segment::Circle(_)) => (vec![], IntersectFlag::Coincident),
        (Segment::Arc(a), Segment::Circle(_)) => {
            (vec![a.start, a.end], IntersectFlag::EdgeOverlap)
        }
        (Segment::Circle(_), Segment::Arc(b)) => {
            (vec![b.start, b.end], IntersectFlag::EdgeOverlap)
        }
        (Segment::Arc(a), Segment::Arc(b)) => arc_arc_overlap(a, b),
        _ => unreachable!("line segments have no supporting circle"),
    }
}

fn arc_arc_overlap(a: &Arc, b: &Arc) -> Hits {
    let near_angle = |x: f64, y: f64| f64::abs(x - y) < ANGLE_TOLERANCE * 10.0;
    if near_angle(a.start_angle, b.start_angle) && near_angle(a.end_angle, b.end_angle) {
        return (vec![], IntersectFlag::Coincident);
    }
    // shift b's sweep by whole turns to align with a's
    for k in [-1.0, 0.0, 1.0] {
        let b0 = b.start_angle + k * 2.0 * PI;
        let b1 = b.end_angle + k * 2.0 * PI;
        if b0 >= a.start_angle - ANGLE_TOLERANCE && b1 <= a.end_angle + ANGLE_TOLERANCE {
            // b enveloped by a
            return (vec![b.start, b.end], IntersectFlag::EdgeOverlap);
        }
        if a.start_angle >= b0 - ANGLE_TOLERANCE && a.end_angle <= b1 + ANGLE_TOLERANCE {
            return (vec![a.start, a.end], IntersectFlag::EdgeOverlap);
        }
        let lo = f64::max(a.start_angle, b0);
        let hi = f64::min(a.end_angle, b1);
        if hi - lo > ANGLE_TOLERANCE {
            let at = |theta: f64| {
                a.center + a.radius * Vector3::new(theta.cos(), theta.sin(), 0.0)
            };
            return (vec![at(lo), at(hi)], IntersectFlag::EdgeOverlap);
        }
    }
    (vec![], IntersectFlag::None)
}

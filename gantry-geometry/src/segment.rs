use crate::*;
use gantry_base::bounding_box::BoundingBox;
use gantry_base::geom_traits::Curve;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Straight segment between two distinct planar points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) start: Point3,
    pub(crate) end: Point3,
}

/// Circular arc. The angular pair `(start_angle, end_angle)` always describes
/// the CCW sweep of the point set with `end_angle > start_angle`; `cw` records
/// whether the outline traverses the arc clockwise from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub(crate) center: Point3,
    pub(crate) radius: f64,
    pub(crate) start: Point3,
    pub(crate) end: Point3,
    pub(crate) cw: bool,
    pub(crate) start_angle: f64,
    pub(crate) end_angle: f64,
}

/// Full circle with canonical start point `center + (radius, 0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) center: Point3,
    pub(crate) radius: f64,
}

/// A planar outline primitive. The kind is fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// straight segment
    Line(Line),
    /// circular arc
    Arc(Arc),
    /// full circle
    Circle(Circle),
}

/// Discriminant of [`Segment`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// straight segment
    Line,
    /// circular arc
    Arc,
    /// full circle
    Circle,
}

/// angular slack when testing membership in an arc's sweep
pub(crate) const ANGLE_TOLERANCE: f64 = 1.0e-7;

fn check_planar(pts: &[Point3]) -> Result<()> {
    if !pts.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
        return Err(Error::DegenerateGeometry("non-finite coordinate"));
    }
    match pts.iter().all(|p| p.z.so_small()) {
        true => Ok(()),
        false => Err(Error::NonPlanar),
    }
}

impl Arc {
    /// whether the CCW angle `theta` lies within the arc's sweep,
    /// normalizing by adding 2π while the angle is less than the start angle
    pub(crate) fn in_angular_range(&self, mut theta: f64) -> bool {
        while theta < self.start_angle - ANGLE_TOLERANCE {
            theta += 2.0 * PI;
        }
        theta <= self.end_angle + ANGLE_TOLERANCE
    }

    /// sweep angle of the point set
    #[inline(always)]
    pub(crate) fn sweep(&self) -> f64 { self.end_angle - self.start_angle }
}

impl Segment {
    /// Creates a straight segment.
    ///
    /// Fails with [`Error::DegenerateGeometry`] if the endpoints coincide
    /// within tolerance and with [`Error::NonPlanar`] if either has z ≠ 0.
    pub fn line(start: Point3, end: Point3) -> Result<Segment> {
        check_planar(&[start, end])?;
        if start.near(&end) {
            return Err(Error::DegenerateGeometry("zero-length line"));
        }
        Ok(Segment::Line(Line { start, end }))
    }

    /// Creates a circular arc traversed from `start` to `end`, clockwise when
    /// `cw` is set.
    ///
    /// Fails if the two endpoint radii differ by more than the radial
    /// tolerance. When `start` and `end` coincide the result is a full
    /// [`Circle`] with the canonical start point.
    pub fn arc(center: Point3, start: Point3, end: Point3, cw: bool) -> Result<Segment> {
        check_planar(&[center, start, end])?;
        let r0 = (start - center).magnitude();
        let r1 = (end - center).magnitude();
        if f64::abs(r0 - r1) > RADIAL_TOLERANCE {
            return Err(Error::DegenerateGeometry("arc endpoint radii disagree"));
        }
        if start.near(&end) {
            return Self::circle(center, r0);
        }
        if r0 <= TOLERANCE {
            return Err(Error::DegenerateGeometry("zero-radius arc"));
        }
        let (a0, a1) = match cw {
            false => (angle_of(center, start), angle_of(center, end)),
            true => (angle_of(center, end), angle_of(center, start)),
        };
        let mut end_angle = a1;
        while end_angle <= a0 + ANGLE_TOLERANCE {
            end_angle += 2.0 * PI;
        }
        Ok(Segment::Arc(Arc {
            center,
            radius: (r0 + r1) / 2.0,
            start,
            end,
            cw,
            start_angle: a0,
            end_angle,
        }))
    }

    /// Creates a full circle.
    pub fn circle(center: Point3, radius: f64) -> Result<Segment> {
        check_planar(&[center])?;
        if !(radius > TOLERANCE && radius.is_finite()) {
            return Err(Error::DegenerateGeometry("zero-radius circle"));
        }
        Ok(Segment::Circle(Circle { center, radius }))
    }

    /// Returns the discriminant of the segment.
    #[inline(always)]
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Line(_) => SegmentKind::Line,
            Segment::Arc(_) => SegmentKind::Arc,
            Segment::Circle(_) => SegmentKind::Circle,
        }
    }

    /// The traversal start point. For circles, `center + (radius, 0, 0)`.
    pub fn start(&self) -> Point3 {
        match self {
            Segment::Line(l) => l.start,
            Segment::Arc(a) => a.start,
            Segment::Circle(c) => c.center + Vector3::new(c.radius, 0.0, 0.0),
        }
    }

    /// The traversal end point. For circles, coincides with [`Self::start`].
    pub fn end(&self) -> Point3 {
        match self {
            Segment::Line(l) => l.end,
            Segment::Arc(a) => a.end,
            Segment::Circle(c) => c.center + Vector3::new(c.radius, 0.0, 0.0),
        }
    }

    /// The center of an arc or circle.
    pub fn center(&self) -> Option<Point3> {
        match self {
            Segment::Line(_) => None,
            Segment::Arc(a) => Some(a.center),
            Segment::Circle(c) => Some(c.center),
        }
    }

    /// The radius of an arc or circle.
    pub fn radius(&self) -> Option<f64> {
        match self {
            Segment::Line(_) => None,
            Segment::Arc(a) => Some(a.radius),
            Segment::Circle(c) => Some(c.radius),
        }
    }

    /// underlying circle of an arc or circle segment
    pub(crate) fn circle_data(&self) -> Option<(Point3, f64)> {
        match self {
            Segment::Line(_) => None,
            Segment::Arc(a) => Some((a.center, a.radius)),
            Segment::Circle(c) => Some((c.center, c.radius)),
        }
    }

    /// Returns the segment traversed in the opposite direction.
    /// The point set is unchanged; arcs flip their `cw` flag.
    pub fn reverse(&self) -> Segment {
        match self {
            Segment::Line(l) => Segment::Line(Line {
                start: l.end,
                end: l.start,
            }),
            Segment::Arc(a) => Segment::Arc(Arc {
                start: a.end,
                end: a.start,
                cw: !a.cw,
                ..*a
            }),
            Segment::Circle(c) => Segment::Circle(*c),
        }
    }

    /// The point halfway along the traversal.
    pub fn midpoint(&self) -> Point3 {
        let (t0, t1) = self.parameter_range();
        self.subs((t0 + t1) / 2.0)
    }

    /// Whether `p` lies on the segment, within the minimum resolution for
    /// lines and the radial tolerance for arcs and circles.
    pub fn contains_point(&self, p: Point3) -> bool {
        match self {
            Segment::Line(l) => {
                let d = l.end - l.start;
                let len2 = d.magnitude2();
                let f = p - l.start;
                let t = f.dot(d) / len2;
                if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
                    return false;
                }
                let dist = f64::abs(cross_z(d, f)) / len2.sqrt();
                dist < RES_MIN
            }
            Segment::Arc(a) => {
                let radial = (p - a.center).magnitude() - a.radius;
                f64::abs(radial) < RADIAL_TOLERANCE && a.in_angular_range(angle_of(a.center, p))
            }
            Segment::Circle(c) => {
                f64::abs((p - c.center).magnitude() - c.radius) < RADIAL_TOLERANCE
            }
        }
    }

    /// CCW angle of `p` about an arc's or circle's center, in `[0, 2π)`;
    /// `None` for lines.
    pub fn point_angle(&self, p: Point3) -> Option<f64> {
        self.center().map(|c| angle_of(c, p))
    }

    /// The traversal sense of an arc; `None` for lines and circles.
    pub fn cw(&self) -> Option<bool> {
        match self {
            Segment::Arc(a) => Some(a.cw),
            _ => None,
        }
    }

    /// The stored CCW angular pair `(start_angle, end_angle)` of an arc,
    /// with `end_angle > start_angle`.
    pub fn angles(&self) -> Option<(f64, f64)> {
        match self {
            Segment::Arc(a) => Some((a.start_angle, a.end_angle)),
            _ => None,
        }
    }

    /// Traversal parameter of an on-segment point, in the parameter range.
    /// The result is meaningful only for points on the segment.
    pub fn traversal_param(&self, p: Point3) -> f64 {
        match self {
            Segment::Line(l) => {
                let d = l.end - l.start;
                (p - l.start).dot(d) / d.magnitude2()
            }
            Segment::Arc(a) => {
                let mut theta = angle_of(a.center, p);
                while theta < a.start_angle - ANGLE_TOLERANCE {
                    theta += 2.0 * PI;
                }
                let t = (theta - a.start_angle) / a.sweep();
                match a.cw {
                    false => t,
                    true => 1.0 - t,
                }
            }
            Segment::Circle(c) => angle_of(c.center, p),
        }
    }

    /// Partitions the segment at the given on-segment points, preserving the
    /// traversal order. Points off the segment or coinciding with its
    /// endpoints are ignored. A circle is split only when at least two
    /// distinct points are given; arcs produced from a circle are CCW.
    pub fn split(&self, points: &[Point3]) -> Result<Vec<Segment>> {
        let mut cuts: Vec<Point3> = points
            .iter()
            .copied()
            .filter(|p| self.contains_point(*p) && !p.near(&self.start()) && !p.near(&self.end()))
            .collect();
        cuts.sort_by(|a, b| {
            self.traversal_param(*a)
                .partial_cmp(&self.traversal_param(*b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        cuts.dedup_by(|a, b| (*a).near(&*b));
        if cuts.is_empty() {
            return Ok(vec![*self]);
        }
        match self {
            Segment::Line(l) => {
                let mut res = Vec::with_capacity(cuts.len() + 1);
                let mut prev = l.start;
                for p in cuts {
                    res.push(Segment::line(prev, p)?);
                    prev = p;
                }
                res.push(Segment::line(prev, l.end)?);
                Ok(res)
            }
            Segment::Arc(a) => {
                let mut res = Vec::with_capacity(cuts.len() + 1);
                let mut prev = a.start;
                for p in cuts {
                    res.push(Segment::arc(a.center, prev, p, a.cw)?);
                    prev = p;
                }
                res.push(Segment::arc(a.center, prev, a.end, a.cw)?);
                Ok(res)
            }
            Segment::Circle(c) => {
                if cuts.len() < 2 {
                    return Ok(vec![*self]);
                }
                let mut res = Vec::with_capacity(cuts.len());
                for w in cuts.windows(2) {
                    res.push(Segment::arc(c.center, w[0], w[1], false)?);
                }
                res.push(Segment::arc(c.center, cuts[cuts.len() - 1], cuts[0], false)?);
                Ok(res)
            }
        }
    }

    /// Axis-aligned bounds. Arc bounds include the endpoints plus the
    /// axis-aligned extrema that lie within the angular sweep.
    pub fn bounds(&self) -> BoundingBox<Point3> {
        let mut bdd_box = BoundingBox::new();
        match self {
            Segment::Line(l) => {
                bdd_box.push(l.start);
                bdd_box.push(l.end);
            }
            Segment::Arc(a) => {
                bdd_box.push(a.start);
                bdd_box.push(a.end);
                for k in 0..4 {
                    let theta = k as f64 * PI / 2.0;
                    if a.in_angular_range(theta) {
                        let v = Vector3::new(theta.cos(), theta.sin(), 0.0);
                        bdd_box.push(a.center + a.radius * v);
                    }
                }
            }
            Segment::Circle(c) => {
                bdd_box.push(c.center + Vector3::new(-c.radius, -c.radius, 0.0));
                bdd_box.push(c.center + Vector3::new(c.radius, c.radius, 0.0));
            }
        }
        bdd_box
    }

    /// Translates the segment by `v` (planar translations only).
    pub fn translate(&self, v: Vector3) -> Segment {
        let mv = |p: Point3| p + v;
        match self {
            Segment::Line(l) => Segment::Line(Line {
                start: mv(l.start),
                end: mv(l.end),
            }),
            Segment::Arc(a) => Segment::Arc(Arc {
                center: mv(a.center),
                start: mv(a.start),
                end: mv(a.end),
                ..*a
            }),
            Segment::Circle(c) => Segment::Circle(Circle {
                center: mv(c.center),
                radius: c.radius,
            }),
        }
    }

    /// Scales the segment about the origin by `sf > 0`.
    pub fn scale(&self, sf: f64) -> Segment {
        let mv = |p: Point3| Point3::new(p.x * sf, p.y * sf, p.z * sf);
        match self {
            Segment::Line(l) => Segment::Line(Line {
                start: mv(l.start),
                end: mv(l.end),
            }),
            Segment::Arc(a) => Segment::Arc(Arc {
                center: mv(a.center),
                start: mv(a.start),
                end: mv(a.end),
                radius: a.radius * sf,
                ..*a
            }),
            Segment::Circle(c) => Segment::Circle(Circle {
                center: mv(c.center),
                radius: c.radius * sf,
            }),
        }
    }
}

impl Curve for Segment {
    type Point = Point3;
    type Vector = Vector3;
    fn subs(&self, t: f64) -> Point3 {
        match self {
            Segment::Line(l) => l.start + t * (l.end - l.start),
            Segment::Arc(a) => {
                let theta = match a.cw {
                    false => a.start_angle + t * a.sweep(),
                    true => a.end_angle - t * a.sweep(),
                };
                a.center + a.radius * Vector3::new(theta.cos(), theta.sin(), 0.0)
            }
            Segment::Circle(c) => c.center + c.radius * Vector3::new(t.cos(), t.sin(), 0.0),
        }
    }
    fn der(&self, t: f64) -> Vector3 {
        match self {
            Segment::Line(l) => l.end - l.start,
            Segment::Arc(a) => {
                let (theta, sign) = match a.cw {
                    false => (a.start_angle + t * a.sweep(), a.sweep()),
                    true => (a.end_angle - t * a.sweep(), -a.sweep()),
                };
                a.radius * sign * Vector3::new(-theta.sin(), theta.cos(), 0.0)
            }
            Segment::Circle(c) => c.radius * Vector3::new(-t.sin(), t.cos(), 0.0),
        }
    }
    fn parameter_range(&self) -> (f64, f64) {
        match self {
            Segment::Circle(_) => (0.0, 2.0 * PI),
            _ => (0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_base::assert_near;

    #[test]
    fn line_construction() {
        let p = Point3::new(1.0, 1.0, 0.0);
        let q = Point3::new(4.0, 5.0, 0.0);
        let seg = Segment::line(p, q).unwrap();
        assert_eq!(seg.kind(), SegmentKind::Line);
        assert_near!(seg.start(), p);
        assert_near!(seg.end(), q);
        assert_eq!(Segment::line(p, p), Err(Error::DegenerateGeometry("zero-length line")));
        assert_eq!(
            Segment::line(p, Point3::new(4.0, 5.0, 1.0)),
            Err(Error::NonPlanar),
        );
    }

    #[test]
    fn arc_closes_into_circle() {
        let c = Point3::new(2.0, 0.0, 0.0);
        let p = Point3::new(5.0, 0.0, 0.0);
        let seg = Segment::arc(c, p, p, false).unwrap();
        assert_eq!(seg.kind(), SegmentKind::Circle);
        assert_near!(seg.radius().unwrap(), 3.0);
        assert_near!(seg.start(), p);
    }

    #[test]
    fn arc_radius_mismatch() {
        let c = Point3::new(0.0, 0.0, 0.0);
        let res = Segment::arc(
            c,
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.5, 0.0),
            false,
        );
        assert_eq!(res, Err(Error::DegenerateGeometry("arc endpoint radii disagree")));
    }

    #[test]
    fn cw_arc_angles_stay_ccw() {
        let c = Point3::new(0.0, 0.0, 0.0);
        let start = Point3::new(0.0, 1.0, 0.0);
        let end = Point3::new(1.0, 0.0, 0.0);
        // traversed clockwise from the top to the right
        let seg = Segment::arc(c, start, end, true).unwrap();
        let Segment::Arc(a) = &seg else { panic!() };
        assert!(a.end_angle > a.start_angle);
        assert_near!(a.start_angle, 0.0);
        assert_near!(a.end_angle, PI / 2.0);
        // traversal still runs from `start` to `end`
        assert_near!(seg.subs(0.0), start);
        assert_near!(seg.subs(1.0), end);
    }

    #[test]
    fn arc_bounds_take_extrema() {
        let c = Point3::new(0.0, 0.0, 0.0);
        // CCW half circle through the top
        let seg = Segment::arc(
            c,
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(-2.0, 0.0, 0.0),
            false,
        )
        .unwrap();
        let bdd_box = seg.bounds();
        assert_near!(bdd_box.min(), Point3::new(-2.0, 0.0, 0.0));
        assert_near!(bdd_box.max(), Point3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn split_line() {
        let seg = Segment::line(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)).unwrap();
        let parts = seg
            .split(&[Point3::new(7.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)])
            .unwrap();
        assert_eq!(parts.len(), 3);
        assert_near!(parts[0].end(), Point3::new(3.0, 0.0, 0.0));
        assert_near!(parts[1].end(), Point3::new(7.0, 0.0, 0.0));
        assert_near!(parts[2].end(), Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn split_circle() {
        let seg = Segment::circle(Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
        let parts = seg
            .split(&[Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, -1.0, 0.0)])
            .unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|s| s.kind() == SegmentKind::Arc));
        // off-circle cut points are ignored
        let whole = seg.split(&[Point3::new(5.0, 5.0, 0.0)]).unwrap();
        assert_eq!(whole, vec![seg]);
    }

    #[test]
    fn reverse_keeps_point_set() {
        let seg = Segment::arc(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            false,
        )
        .unwrap();
        let rev = seg.reverse();
        assert_near!(rev.start(), seg.end());
        assert_near!(rev.end(), seg.start());
        assert_near!(rev.midpoint(), seg.midpoint());
    }
}

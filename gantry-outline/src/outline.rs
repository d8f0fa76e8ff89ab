use crate::errors::{Error, Result};
use gantry_base::bounding_box::BoundingBox;
use gantry_base::cgmath64::*;
use gantry_base::geom_traits::Curve;
use gantry_base::tolerance::*;
use serde::{Deserialize, Serialize};

use gantry_geometry::{Segment, SegmentKind};

/// Traversal sense of a closed outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// counter-clockwise
    Ccw,
    /// clockwise
    Cw,
}

impl Orientation {
    /// Returns the opposite sense.
    #[inline(always)]
    pub fn reverse(self) -> Orientation {
        match self {
            Orientation::Ccw => Orientation::Cw,
            Orientation::Cw => Orientation::Ccw,
        }
    }
}

/// Lifecycle state of an [`Outline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineState {
    /// accepting segments
    Open,
    /// cyclic, oriented, and composable
    Closed,
    /// terminal: read-only
    Finalized,
}

/// A closed, oriented cyclic chain of segments with cached bounds and the
/// inner holes produced by zero-intersection subtraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub(crate) segments: Vec<Segment>,
    state: OutlineState,
    orientation: Option<Orientation>,
    bounds: BoundingBox<Point3>,
    pub(crate) holes: Vec<Outline>,
}

impl Default for Outline {
    #[inline(always)]
    fn default() -> Self { Self::new() }
}

/// chain-stitching tolerance: looser than point equality so that points
/// recovered from intersection arithmetic still register as chain vertices
pub(crate) fn near_pt(a: Point3, b: Point3) -> bool { (a - b).magnitude() < RES_MIN }

impl Outline {
    /// Creates the empty open outline.
    #[inline(always)]
    pub fn new() -> Outline {
        Outline {
            segments: Vec::new(),
            state: OutlineState::Open,
            orientation: None,
            bounds: BoundingBox::new(),
            holes: Vec::new(),
        }
    }

    /// Builds a closed outline from a segment chain.
    pub fn from_segments<I: IntoIterator<Item = Segment>>(iter: I) -> Result<Outline> {
        let mut outline = Outline::new();
        for seg in iter {
            outline.add_segment(seg)?;
        }
        outline.close()?;
        Ok(outline)
    }

    /// Builds the closed outline of a full circle.
    pub fn circle(center: Point3, radius: f64) -> Result<Outline> {
        Outline::from_segments([Segment::circle(center, radius)?])
    }

    /// Appends `seg` to the open end of the chain.
    ///
    /// Fails with [`Error::Discontinuous`] unless the segment starts where
    /// the previous one ends, and with [`Error::AlreadyClosed`] once the
    /// outline has left the `Open` state.
    pub fn add_segment(&mut self, seg: Segment) -> Result<()> {
        if self.state != OutlineState::Open {
            return Err(Error::AlreadyClosed);
        }
        if let Some(last) = self.segments.last() {
            if !near_pt(last.end(), seg.start()) {
                return Err(Error::Discontinuous);
            }
        }
        self.bounds += seg.bounds();
        self.segments.push(seg);
        Ok(())
    }

    /// Closes the chain: verifies it is cyclic, validates segment coherence,
    /// and computes the orientation.
    pub fn close(&mut self) -> Result<()> {
        if self.state != OutlineState::Open {
            return Err(Error::AlreadyClosed);
        }
        let (first, last) = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::Empty),
        };
        if !near_pt(last.end(), first.start()) {
            return Err(Error::NotClosed);
        }
        self.orientation = Some(orientation_of(&self.segments));
        self.state = OutlineState::Closed;
        Ok(())
    }

    /// Moves the outline to its terminal, read-only state.
    pub fn finalize(&mut self) -> Result<()> {
        match self.state {
            OutlineState::Open => Err(Error::NotClosed),
            _ => {
                self.state = OutlineState::Finalized;
                Ok(())
            }
        }
    }

    /// Current lifecycle state.
    #[inline(always)]
    pub fn state(&self) -> OutlineState { self.state }

    /// Orientation, available once closed.
    #[inline(always)]
    pub fn orientation(&self) -> Option<Orientation> { self.orientation }

    /// The cached bounding rectangle (z = 0 plane).
    #[inline(always)]
    pub fn bounds(&self) -> BoundingBox<Point3> { self.bounds }

    /// The segment chain.
    #[inline(always)]
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// Inner holes registered by zero-intersection subtraction.
    #[inline(always)]
    pub fn holes(&self) -> &[Outline] { &self.holes }

    /// Returns the same point set traversed in the opposite sense.
    /// Holes are carried over unchanged.
    pub fn reversed(&self) -> Outline {
        let segments: Vec<_> = self.segments.iter().rev().map(Segment::reverse).collect();
        Outline {
            segments,
            state: self.state,
            orientation: self.orientation.map(Orientation::reverse),
            bounds: self.bounds,
            holes: self.holes.clone(),
        }
    }

    /// Ray-casting containment test against the outer chain. Holes are not
    /// consulted. Requires a closed outline; an open outline answers `false`.
    pub fn is_point_inside(&self, p: Point3) -> bool {
        if self.state == OutlineState::Open || !self.bounds.contains(Point3::new(p.x, p.y, 0.0)) {
            return false;
        }
        let hits: usize = self.segments.iter().map(|seg| ray_hits(seg, p)).sum();
        hits % 2 == 1
    }

    /// A point strictly inside the outer chain, or `None` for outlines too
    /// degenerate to probe.
    pub fn interior_sample(&self) -> Option<Point3> {
        if self.state == OutlineState::Open {
            return None;
        }
        if let [seg] = self.segments.as_slice() {
            if seg.kind() == SegmentKind::Circle {
                return seg.center();
            }
        }
        let diag = (self.bounds.max() - self.bounds.min()).magnitude();
        let seg = &self.segments[0];
        let mid = seg.midpoint();
        let der = seg.der(0.5);
        let normal = Vector3::new(-der.y, der.x, 0.0).normalize();
        for delta in [diag * 1.0e-3, diag * 1.0e-2] {
            for dir in [1.0, -1.0] {
                let candidate = mid + dir * delta * normal;
                if self.is_point_inside(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

/// Shoelace orientation over the chain's sampled vertices. Each arc and
/// circle contributes its quarter points in traversal order, which keeps the
/// signed area faithful even when an arc bulges past the chord connecting
/// its endpoints.
fn orientation_of(segments: &[Segment]) -> Orientation {
    let mut pts = Vec::with_capacity(segments.len() * 2);
    for seg in segments {
        pts.push(seg.start());
        if seg.kind() != SegmentKind::Line {
            let (t0, t1) = seg.parameter_range();
            for k in [0.25, 0.5, 0.75] {
                pts.push(seg.subs(t0 + (t1 - t0) * k));
            }
        }
    }
    let mut doubled_area = 0.0;
    for (i, a) in pts.iter().enumerate() {
        let b = &pts[(i + 1) % pts.len()];
        doubled_area += a.x * b.y - b.x * a.y;
    }
    match doubled_area >= 0.0 {
        true => Orientation::Ccw,
        false => Orientation::Cw,
    }
}

/// Crossings of the horizontal ray from `p` toward +x with one segment.
/// Of a segment's two endpoints only the traversal start is counted, and
/// grazing tangencies are skipped, so that a vertex or a touch is never
/// double-counted.
fn ray_hits(seg: &Segment, p: Point3) -> usize {
    match seg.kind() {
        SegmentKind::Line => {
            let (s, e) = (seg.start(), seg.end());
            let dy = e.y - s.y;
            if f64::abs(dy) < TOLERANCE {
                return 0;
            }
            let t = (p.y - s.y) / dy;
            if !(0.0..1.0).contains(&t) {
                return 0;
            }
            let x = s.x + t * (e.x - s.x);
            (x > p.x) as usize
        }
        SegmentKind::Arc | SegmentKind::Circle => {
            let center = seg.center().expect("arc-like segment");
            let r = seg.radius().expect("arc-like segment");
            let dyc = p.y - center.y;
            if r - f64::abs(dyc) < RES_MIN {
                // miss, or a grazing touch at the top or bottom extremum
                return 0;
            }
            let dx = f64::sqrt(r * r - dyc * dyc);
            [center.x + dx, center.x - dx]
                .into_iter()
                .filter(|&x| x > p.x)
                .filter(|&x| on_arc_half_open(seg, Point3::new(x, p.y, 0.0)))
                .count()
        }
    }
}

/// membership in the segment's sweep, counting the traversal start but not
/// the traversal end
fn on_arc_half_open(seg: &Segment, p: Point3) -> bool {
    match seg.kind() {
        SegmentKind::Circle => true,
        _ => {
            let (t0, t1) = seg.parameter_range();
            let t = (seg.traversal_param(p) - t0) / (t1 - t0);
            (0.0..1.0 - 1.0e-9).contains(&t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_base::assert_near;

    fn pt(x: f64, y: f64) -> Point3 { Point3::new(x, y, 0.0) }

    pub(crate) fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Outline {
        Outline::from_segments([
            Segment::line(pt(x0, y0), pt(x1, y0)).unwrap(),
            Segment::line(pt(x1, y0), pt(x1, y1)).unwrap(),
            Segment::line(pt(x1, y1), pt(x0, y1)).unwrap(),
            Segment::line(pt(x0, y1), pt(x0, y0)).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn state_machine() {
        let mut outline = Outline::new();
        assert_eq!(outline.close(), Err(Error::Empty));
        outline
            .add_segment(Segment::line(pt(0.0, 0.0), pt(1.0, 0.0)).unwrap())
            .unwrap();
        assert_eq!(
            outline.add_segment(Segment::line(pt(5.0, 5.0), pt(6.0, 5.0)).unwrap()),
            Err(Error::Discontinuous),
        );
        assert_eq!(outline.close(), Err(Error::NotClosed));
        outline
            .add_segment(Segment::line(pt(1.0, 0.0), pt(0.0, 1.0)).unwrap())
            .unwrap();
        outline
            .add_segment(Segment::line(pt(0.0, 1.0), pt(0.0, 0.0)).unwrap())
            .unwrap();
        outline.close().unwrap();
        assert_eq!(outline.state(), OutlineState::Closed);
        assert_eq!(
            outline.add_segment(Segment::line(pt(0.0, 0.0), pt(1.0, 0.0)).unwrap()),
            Err(Error::AlreadyClosed),
        );
        outline.finalize().unwrap();
        assert_eq!(outline.state(), OutlineState::Finalized);
    }

    #[test]
    fn rect_orientation() {
        assert_eq!(rect(0.0, 0.0, 4.0, 2.0).orientation(), Some(Orientation::Ccw));
        assert_eq!(
            rect(0.0, 0.0, 4.0, 2.0).reversed().orientation(),
            Some(Orientation::Cw),
        );
    }

    #[test]
    fn arc_heavy_orientation() {
        // a thin sliver whose CCW sense is carried by the bulging arc, not
        // by the chord polygon
        let arc = Segment::arc(pt(0.0, 0.0), pt(5.0, 0.0), pt(-5.0, 0.0), false).unwrap();
        let chord = Segment::line(pt(-5.0, 0.0), pt(5.0, 0.0)).unwrap();
        let outline = Outline::from_segments([arc, chord]).unwrap();
        assert_eq!(outline.orientation(), Some(Orientation::Ccw));
        let outline = Outline::from_segments([chord.reverse(), arc.reverse()]).unwrap();
        assert_eq!(outline.orientation(), Some(Orientation::Cw));
    }

    #[test]
    fn point_containment() {
        let outline = rect(0.0, 0.0, 100.0, 50.0);
        assert!(outline.is_point_inside(pt(50.0, 25.0)));
        assert!(outline.is_point_inside(pt(1.0, 49.0)));
        assert!(!outline.is_point_inside(pt(-1.0, 25.0)));
        assert!(!outline.is_point_inside(pt(50.0, 51.0)));

        let circle = Outline::circle(pt(0.0, 0.0), 5.0).unwrap();
        assert!(circle.is_point_inside(pt(3.0, 3.0)));
        assert!(!circle.is_point_inside(pt(4.0, 4.0)));
    }

    #[test]
    fn interior_sample_is_inside() {
        let outline = rect(0.0, 0.0, 10.0, 10.0);
        let sample = outline.interior_sample().unwrap();
        assert!(outline.is_point_inside(sample));
        let circle = Outline::circle(pt(7.0, 7.0), 2.0).unwrap();
        assert_near!(circle.interior_sample().unwrap(), pt(7.0, 7.0));
    }
}

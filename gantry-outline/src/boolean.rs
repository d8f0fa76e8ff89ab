use crate::errors::{Error, Result};
use crate::outline::{near_pt, Outline, OutlineState};
use gantry_base::cgmath64::*;
use gantry_geometry::{IntersectFlag, Segment};

#[derive(Clone, Copy, Debug, PartialEq)]
enum BoolOp {
    Add,
    Subtract,
}

impl Outline {
    /// Subtracts `other` from the outline, returning the carved outline.
    ///
    /// The operands must intersect at exactly zero or exactly two unique
    /// points. With zero intersections `other` must lie entirely inside and
    /// becomes a nested hole; with two, the boundary is restitched from the
    /// portion of the outline outside `other` and the portion of `other`
    /// inside the outline, traversed in reverse. A boundary run shared with
    /// `other` (whole segments, or the sub-curves an earlier boolean left
    /// behind) is realigned segment-for-segment and replaced by the
    /// complementary chain of `other`, so carving a previously added tool
    /// back out is accepted.
    pub fn subtract(&self, other: &Outline) -> Result<Outline> {
        self.boolean(other, BoolOp::Subtract)
    }

    /// Unions `other` into the outline.
    ///
    /// The same intersection policy as [`Outline::subtract`] applies: with
    /// zero intersections `other` must lie entirely outside (the operation
    /// is a no-op); with two, the result joins the portions of both
    /// boundaries outside the opposite outline. Shared boundary runs are
    /// realigned and replaced the same way as in subtraction.
    pub fn add(&self, other: &Outline) -> Result<Outline> { self.boolean(other, BoolOp::Add) }

    /// Subtracts a full circle, the common drill-hole form.
    pub fn subtract_circle(&self, center: Point3, radius: f64) -> Result<Outline> {
        self.subtract(&Outline::circle(center, radius)?)
    }

    /// Unions a full circle into the outline.
    pub fn add_circle(&self, center: Point3, radius: f64) -> Result<Outline> {
        self.add(&Outline::circle(center, radius)?)
    }

    fn boolean(&self, other: &Outline, op: BoolOp) -> Result<Outline> {
        if self.state() == OutlineState::Open || other.state() == OutlineState::Open {
            return Err(Error::NotClosed);
        }
        // split each boundary at the points where it overlaps a sub-curve
        // of the opposite one, so that shared material (including a sub-arc
        // an earlier boolean cut out of a tool segment) meets its
        // counterpart segment-for-segment
        let self_segs = refine_against(&self.segments, &other.segments)?;
        let other_segs = refine_against(&other.segments, &self.segments)?;
        let mut hits: Vec<Point3> = Vec::new();
        let mut shared_self = vec![false; self_segs.len()];
        let mut shared_other = vec![false; other_segs.len()];
        for (i, seg) in self_segs.iter().enumerate() {
            for (j, tool) in other_segs.iter().enumerate() {
                let (pts, flag) = seg.intersect(tool);
                match flag {
                    IntersectFlag::Coincident => {
                        shared_self[i] = true;
                        shared_other[j] = true;
                    }
                    IntersectFlag::EdgeOverlap => {
                        // refinement aligns every resolvable overlap; one
                        // surviving here has no consistent split
                        return Err(Error::InvalidIntersection("ambiguous edge overlap"));
                    }
                    IntersectFlag::None | IntersectFlag::Tangent => {
                        hits.extend(pts);
                    }
                    IntersectFlag::SegmentInsideOther | IntersectFlag::OtherInsideSegment => {}
                }
            }
        }
        if shared_self.iter().any(|&s| s) {
            return self.shared_chain_boolean(other, &self_segs, &other_segs, &shared_self, &shared_other, op);
        }
        let hits = dedupe(hits);
        match hits.len() {
            0 => self.disjoint_boolean(other, op),
            2 => self.stitched_boolean(other, &self_segs, &other_segs, hits[0], hits[1], op),
            _ => Err(Error::InvalidIntersection(
                "expected exactly zero or two unique intersection points",
            )),
        }
    }

    /// zero unique intersection points: pure containment cases
    fn disjoint_boolean(&self, other: &Outline, op: BoolOp) -> Result<Outline> {
        let other_inside = self.is_point_inside(other.segments[0].midpoint());
        match (op, other_inside) {
            (BoolOp::Subtract, true) => {
                let mut result = self.clone();
                let mut hole = other.clone();
                hole.holes.clear();
                result.holes.push(hole);
                Ok(result)
            }
            (BoolOp::Subtract, false) => Err(Error::InvalidIntersection(
                "subtrahend lies entirely outside the outline",
            )),
            (BoolOp::Add, true) => Err(Error::InvalidIntersection(
                "addend lies entirely inside the outline",
            )),
            (BoolOp::Add, false) => {
                match other.is_point_inside(self.segments[0].midpoint()) {
                    // swallowed by the addend: the union would discard this outline
                    true => Err(Error::InvalidIntersection(
                        "outline lies entirely inside the addend",
                    )),
                    false => Ok(self.clone()),
                }
            }
        }
    }

    /// two unique intersection points: split both boundaries and restitch
    fn stitched_boolean(
        &self,
        other: &Outline,
        self_segs: &[Segment],
        other_segs: &[Segment],
        p1: Point3,
        p2: Point3,
        op: BoolOp,
    ) -> Result<Outline> {
        let (sa, sb) = split_chain(self_segs, p1, p2)?;
        let sa_in = other.is_point_inside(chain_probe(&sa));
        let sb_in = other.is_point_inside(chain_probe(&sb));
        if sa_in == sb_in {
            return Err(Error::InvalidIntersection(
                "intersection points do not separate the outline",
            ));
        }
        let keep_self = if sa_in { sb } else { sa };
        let (oa, ob) = split_chain(other_segs, p1, p2)?;
        let oa_in = self.is_point_inside(chain_probe(&oa));
        let ob_in = self.is_point_inside(chain_probe(&ob));
        if oa_in == ob_in {
            return Err(Error::InvalidIntersection(
                "intersection points do not separate the subtrahend",
            ));
        }
        let want_inside = op == BoolOp::Subtract;
        let keep_other = if oa_in == want_inside { oa } else { ob };
        let mut result = stitch(keep_self, keep_other)?;
        result.holes = self.holes.clone();
        Ok(result)
    }

    /// the refined boundaries share a segment run: replace it by the
    /// complementary chain of `other`
    fn shared_chain_boolean(
        &self,
        other: &Outline,
        self_segs: &[Segment],
        other_segs: &[Segment],
        shared_self: &[bool],
        shared_other: &[bool],
        op: BoolOp,
    ) -> Result<Outline> {
        let keep_self = cyclic_complement(self_segs, shared_self)?;
        let keep_other = cyclic_complement(other_segs, shared_other)?;
        if other.is_point_inside(chain_probe(&keep_self)) {
            return Err(Error::InvalidIntersection(
                "kept chain crosses into the other outline",
            ));
        }
        let want_inside = op == BoolOp::Subtract;
        if self.is_point_inside(chain_probe(&keep_other)) != want_inside {
            return Err(Error::InvalidIntersection(
                "shared chain does not bound the operation",
            ));
        }
        let mut result = stitch(keep_self, keep_other)?;
        result.holes = self.holes.clone();
        Ok(result)
    }
}

/// Splits each segment at the points where it overlaps a sub-curve of the
/// tool chain. After both chains pass through this, any shared material
/// appears as whole coincident segments on both sides.
fn refine_against(segments: &[Segment], tools: &[Segment]) -> Result<Vec<Segment>> {
    let mut refined = Vec::with_capacity(segments.len());
    for seg in segments {
        let mut cuts = Vec::new();
        for tool in tools {
            let (pts, flag) = seg.intersect(tool);
            if flag == IntersectFlag::EdgeOverlap {
                cuts.extend(pts);
            }
        }
        refined.extend(seg.split(&cuts)?);
    }
    Ok(refined)
}

fn dedupe(pts: Vec<Point3>) -> Vec<Point3> {
    let mut unique: Vec<Point3> = Vec::new();
    for p in pts {
        if !unique.iter().any(|q| near_pt(*q, p)) {
            unique.push(p);
        }
    }
    unique
}

/// a probe point that lies on the chain but on none of its endpoints
fn chain_probe(chain: &[Segment]) -> Point3 { chain[0].midpoint() }

/// Splits a cyclic chain at two of its points into the two sub-chains
/// `p1 → p2` and `p2 → p1`, cutting segments where the points fall in a
/// segment's interior.
fn split_chain(segments: &[Segment], p1: Point3, p2: Point3) -> Result<(Vec<Segment>, Vec<Segment>)> {
    let mut segs: Vec<Segment> = Vec::with_capacity(segments.len() + 2);
    for seg in segments {
        segs.extend(seg.split(&[p1, p2])?);
    }
    let position_of = |segs: &[Segment], p: Point3| segs.iter().position(|s| near_pt(s.start(), p));
    let i1 = position_of(&segs, p1).ok_or(Error::InvalidIntersection(
        "intersection point is not on the outline",
    ))?;
    segs.rotate_left(i1);
    let j = position_of(&segs, p2).filter(|&j| j != 0).ok_or(
        Error::InvalidIntersection("intersection points coincide on the outline"),
    )?;
    let chain2 = segs.split_off(j);
    Ok((segs, chain2))
}

/// Returns the non-shared segments of a cyclic chain as one contiguous run
/// starting just after the shared run.
fn cyclic_complement(segments: &[Segment], shared: &[bool]) -> Result<Vec<Segment>> {
    let n = segments.len();
    if shared.iter().all(|&s| s) {
        return Err(Error::InvalidIntersection("outlines coincide"));
    }
    let transitions = (0..n).filter(|&i| shared[i] && !shared[(i + 1) % n]).count();
    if transitions != 1 {
        return Err(Error::InvalidIntersection("shared edges are not contiguous"));
    }
    let start = (0..n)
        .find(|&i| shared[i] && !shared[(i + 1) % n])
        .map(|i| (i + 1) % n)
        .expect("a transition exists");
    let run = (0..n)
        .map(|k| (start + k) % n)
        .take_while(|&i| !shared[i])
        .map(|i| segments[i])
        .collect();
    Ok(run)
}

/// Concatenates two chains sharing their endpoints into a closed outline,
/// reversing the second chain when its sense opposes the first.
fn stitch(first: Vec<Segment>, second: Vec<Segment>) -> Result<Outline> {
    let first_end = first.last().ok_or(Error::Empty)?.end();
    let second = match near_pt(second[0].start(), first_end) {
        true => second,
        false => second.into_iter().rev().map(|s| s.reverse()).collect(),
    };
    Outline::from_segments(first.into_iter().chain(second))
}

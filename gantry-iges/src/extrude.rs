//! Extrusion of a closed outline into IGES trimmed-surface solids: one
//! vertical patch per boundary segment, plus trimmed planar top and bottom
//! faces whose boundaries are curve-on-surface stacks over rational
//! B-spline curves.

use crate::entity::{
    CompositeCurve, CurveOnSurface, Dependency, Entity, EntityId, NurbsCurve, NurbsSurface,
    TrimmedSurface,
};
use crate::errors::Result;
use crate::model::Model;
use crate::record::{EntityUse, Subordinate};
use gantry_base::cgmath64::*;
use gantry_base::tolerance::RES_MIN;
use gantry_geometry::{Segment, SegmentKind};
use gantry_outline::{Orientation, Outline, OutlineState};
use std::f64::consts::{FRAC_PI_2, PI};

/// Handles of the surfaces emitted for one extruded outline.
#[derive(Clone, Debug)]
pub struct ExtrudedSolid {
    /// the trimmed top face
    pub top: EntityId,
    /// the trimmed bottom face
    pub bottom: EntityId,
    /// the vertical side patches, outer chain first, then each hole
    pub sides: Vec<EntityId>,
}

/// Extrudes `outline` between two z planes into the model.
///
/// Side walls are bilinear patches for lines and rational-quadratic
/// cylindrical patches for arcs, split so no patch sweeps more than 90°
/// (a full circle becomes four patches). The top and bottom are trimmed
/// planar surfaces; the bottom boundary runs reversed so both face normals
/// point out of the solid.
pub fn extrude(
    model: &mut Model,
    outline: &Outline,
    top_z: f64,
    bot_z: f64,
) -> Result<ExtrudedSolid> {
    if outline.state() == OutlineState::Open {
        return Err(gantry_outline::Error::NotClosed.into());
    }
    let (bot_z, top_z) = match top_z > bot_z {
        true => (bot_z, top_z),
        false => (top_z, bot_z),
    };
    if top_z - bot_z < RES_MIN {
        return Err(gantry_geometry::Error::DegenerateGeometry("zero extrusion height").into());
    }
    let mut sides = Vec::new();
    let boundary_segments = outline
        .segments()
        .iter()
        .chain(outline.holes().iter().flat_map(|hole| hole.segments()));
    for seg in boundary_segments {
        side_patches(model, seg, bot_z, top_z, &mut sides)?;
    }
    let top = trimmed_face(model, outline, top_z, false)?;
    let bottom = trimmed_face(model, outline, bot_z, true)?;
    Ok(ExtrudedSolid { top, bottom, sides })
}

/// Traversal angles of an arc-like segment, end relative to start signed by
/// the traversal sense. A full circle carries no direction of its own and
/// takes the chain's `sense` instead.
fn traversal_angles(seg: &Segment, sense: Orientation) -> (f64, f64) {
    match seg.kind() {
        SegmentKind::Circle => match sense {
            Orientation::Ccw => (0.0, 2.0 * PI),
            Orientation::Cw => (2.0 * PI, 0.0),
        },
        _ => {
            let (a0, a1) = seg.angles().expect("arc segment");
            match seg.cw() {
                Some(true) => (a1, a0),
                _ => (a0, a1),
            }
        }
    }
}

/// control triple and midpoint weight of one rational-quadratic span
fn quad_span(center: Point3, r: f64, a0: f64, a1: f64, z: f64) -> (f64, [Point3; 3]) {
    let at = |angle: f64, radius: f64| {
        Point3::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
            z,
        )
    };
    let w = ((a1 - a0) / 2.0).cos();
    let mid = (a0 + a1) / 2.0;
    (w, [at(a0, r), at(mid, r / w), at(a1, r)])
}

/// spline data of one boundary segment at height `z`
fn segment_spline(
    seg: &Segment,
    z: f64,
    sense: Orientation,
) -> (usize, Vec<f64>, Vec<f64>, Vec<Point3>) {
    let lift = |p: Point3| Point3::new(p.x, p.y, z);
    match seg.kind() {
        SegmentKind::Line => (
            1,
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0],
            vec![lift(seg.start()), lift(seg.end())],
        ),
        _ => {
            let center = seg.center().expect("arc segment");
            let r = seg.radius().expect("arc segment");
            let (a_start, a_end) = traversal_angles(seg, sense);
            let spans = ((a_end - a_start).abs() / FRAC_PI_2).ceil().max(1.0) as usize;
            let delta = (a_end - a_start) / spans as f64;
            let mut knots = vec![0.0; 3];
            let mut weights = vec![1.0];
            let mut ctrl = vec![lift(seg.start())];
            for i in 0..spans {
                let (b0, b1) = (a_start + i as f64 * delta, a_start + (i + 1) as f64 * delta);
                let (w, pts) = quad_span(center, r, b0, b1, z);
                weights.extend([w, 1.0]);
                ctrl.extend([pts[1], pts[2]]);
                if i + 1 < spans {
                    let t = (i + 1) as f64 / spans as f64;
                    knots.extend([t, t]);
                }
            }
            knots.extend([1.0, 1.0, 1.0]);
            (2, knots, weights, ctrl)
        }
    }
}

fn mark_dependent(model: &mut Model, id: EntityId) {
    if let Ok(entity) = model.get_mut(id) {
        entity.core_mut().de.status.subordinate = Subordinate::PhysicallyDependent;
    }
}

fn mark_parametric(model: &mut Model, id: EntityId) {
    if let Ok(entity) = model.get_mut(id) {
        entity.core_mut().de.status.use_flag = EntityUse::Parametric2d;
    }
}

/// vertical wall patches for one boundary segment
fn side_patches(
    model: &mut Model,
    seg: &Segment,
    bot_z: f64,
    top_z: f64,
    out: &mut Vec<EntityId>,
) -> Result<()> {
    let linear = vec![0.0, 0.0, 1.0, 1.0];
    match seg.kind() {
        SegmentKind::Line => {
            let at = |p: Point3, z: f64| Point3::new(p.x, p.y, z);
            let (s, e) = (seg.start(), seg.end());
            let patch = NurbsSurface::from_data(
                (1, 1),
                linear.clone(),
                linear,
                vec![1.0; 4],
                vec![at(s, bot_z), at(e, bot_z), at(s, top_z), at(e, top_z)],
                2,
                2,
            )?;
            out.push(model.add_entity(Box::new(patch)));
        }
        _ => {
            let center = seg.center().expect("arc segment");
            let r = seg.radius().expect("arc segment");
            let (a_start, a_end) = traversal_angles(seg, Orientation::Ccw);
            let spans = ((a_end - a_start).abs() / FRAC_PI_2).ceil().max(1.0) as usize;
            let delta = (a_end - a_start) / spans as f64;
            for i in 0..spans {
                let (b0, b1) = (a_start + i as f64 * delta, a_start + (i + 1) as f64 * delta);
                let (w, bottom) = quad_span(center, r, b0, b1, bot_z);
                let (_, top) = quad_span(center, r, b0, b1, top_z);
                let patch = NurbsSurface::from_data(
                    (2, 1),
                    vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
                    linear.clone(),
                    vec![1.0, w, 1.0, 1.0, w, 1.0],
                    bottom.into_iter().chain(top).collect(),
                    3,
                    2,
                )?;
                out.push(model.add_entity(Box::new(patch)));
            }
        }
    }
    Ok(())
}

/// the outline traversed with the wanted sense
fn oriented(outline: &Outline, want: Orientation) -> Outline {
    match outline.orientation() == Some(want) {
        true => outline.clone(),
        false => outline.reversed(),
    }
}

/// one boundary: model-space and parameter-space composites under a
/// curve-on-surface entity
fn boundary_on_plane(
    model: &mut Model,
    plane: EntityId,
    chain: &Outline,
    z: f64,
    lo: Point3,
    hi: Point3,
) -> Result<EntityId> {
    let sense = chain.orientation().unwrap_or(Orientation::Ccw);
    let mut model_curves = Vec::new();
    let mut param_curves = Vec::new();
    for seg in chain.segments() {
        let (degree, knots, weights, ctrl) = segment_spline(seg, z, sense);
        let param_ctrl = ctrl
            .iter()
            .map(|p| {
                Point3::new(
                    (p.x - lo.x) / (hi.x - lo.x),
                    (p.y - lo.y) / (hi.y - lo.y),
                    0.0,
                )
            })
            .collect();
        let mcurve = NurbsCurve::from_data(degree, knots.clone(), weights.clone(), ctrl)?;
        let pcurve = NurbsCurve::from_data(degree, knots, weights, param_ctrl)?;
        let mid = model.add_entity(Box::new(mcurve));
        let pid = model.add_entity(Box::new(pcurve));
        mark_dependent(model, mid);
        mark_dependent(model, pid);
        mark_parametric(model, pid);
        model_curves.push(mid);
        param_curves.push(pid);
    }
    let mcomp = model.add_entity(Box::new(CompositeCurve::from_members(model_curves.clone())));
    let pcomp = model.add_entity(Box::new(CompositeCurve::from_members(param_curves.clone())));
    for &curve in &model_curves {
        model.add_child(mcomp, curve, Dependency::Physical)?;
    }
    for &curve in &param_curves {
        model.add_child(pcomp, curve, Dependency::Physical)?;
    }
    mark_dependent(model, mcomp);
    mark_dependent(model, pcomp);
    mark_parametric(model, pcomp);
    let on_surface = model.add_entity(Box::new(CurveOnSurface::from_members(plane, pcomp, mcomp)));
    model.add_child(on_surface, plane, Dependency::Physical)?;
    model.add_child(on_surface, pcomp, Dependency::Physical)?;
    model.add_child(on_surface, mcomp, Dependency::Physical)?;
    mark_dependent(model, on_surface);
    Ok(on_surface)
}

/// a trimmed planar face at height `z`; `flip` reverses the boundary sense
/// for the bottom of the solid
fn trimmed_face(model: &mut Model, outline: &Outline, z: f64, flip: bool) -> Result<EntityId> {
    let bounds = outline.bounds();
    let (lo, hi) = (bounds.min(), bounds.max());
    let linear = vec![0.0, 0.0, 1.0, 1.0];
    let plane = NurbsSurface::from_data(
        (1, 1),
        linear.clone(),
        linear,
        vec![1.0; 4],
        vec![
            Point3::new(lo.x, lo.y, z),
            Point3::new(hi.x, lo.y, z),
            Point3::new(lo.x, hi.y, z),
            Point3::new(hi.x, hi.y, z),
        ],
        2,
        2,
    )?;
    let plane_id = model.add_entity(Box::new(plane));
    mark_dependent(model, plane_id);
    let want = match flip {
        false => Orientation::Ccw,
        true => Orientation::Cw,
    };
    let outer_chain = oriented(outline, want);
    let outer = boundary_on_plane(model, plane_id, &outer_chain, z, lo, hi)?;
    let mut inner = Vec::new();
    for hole in outline.holes() {
        let hole_chain = oriented(hole, want.reverse());
        inner.push(boundary_on_plane(model, plane_id, &hole_chain, z, lo, hi)?);
    }
    let face = model.add_entity(Box::new(TrimmedSurface::from_members(
        plane_id,
        outer,
        inner.clone(),
    )));
    model.add_child(face, plane_id, Dependency::Physical)?;
    model.add_child(face, outer, Dependency::Physical)?;
    for boundary in inner {
        model.add_child(face, boundary, Dependency::Physical)?;
    }
    Ok(face)
}

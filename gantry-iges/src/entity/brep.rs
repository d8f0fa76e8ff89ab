//! B-rep solid model entities: manifold solid (186), vertex list (502),
//! edge list (504), loop (508), face (510), and shell (514).
//!
//! These are carried at a structural tier: payloads are parsed, pointer
//! parameters resolve into graph edges, and records re-emit faithfully.
//! No geometry is evaluated on them.

use super::{Dependency, Entity, EntityCore, EntityId, SeqMap};
use crate::errors::{Error, Result};
use crate::model::Associate;
use crate::record::{Param, ParamRecord};
use gantry_base::cgmath64::*;
use std::any::Any;

fn bad(entity: u32, index: usize) -> Error { Error::MalformedParameter { entity, index } }

fn require(seq: usize, ctx: &mut Associate<'_>) -> Result<EntityId> {
    let id = ctx.resolve(seq)?;
    ctx.link(id, Dependency::Physical);
    Ok(id)
}

fn seq_of(xref: &SeqMap, id: Option<EntityId>) -> Param {
    Param::Pointer(id.map(|id| xref.seq(id)).unwrap_or(0))
}

/// Entity 186: a manifold solid bounded by one outer shell and any number
/// of void shells, each with an orientation flag.
#[derive(Debug, Default)]
pub struct ManifoldSolid {
    core: EntityCore,
    raw_shell: usize,
    raw_voids: Vec<(usize, bool)>,
    /// the outer shell orientation flag
    pub shell_orientation: bool,
    shell: Option<EntityId>,
    voids: Vec<(EntityId, bool)>,
}

impl ManifoldSolid {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 186;

    /// Creates an empty solid.
    pub fn new() -> ManifoldSolid {
        ManifoldSolid {
            core: EntityCore::new(Self::TYPE_CODE),
            ..ManifoldSolid::default()
        }
    }

    /// The outer shell.
    pub fn shell(&self) -> Option<EntityId> { self.shell }

    /// The void shells with their orientation flags.
    pub fn voids(&self) -> &[(EntityId, bool)] { &self.voids }
}

impl Entity for ManifoldSolid {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        self.raw_shell = pd.pointer(0)?.ok_or_else(|| bad(Self::TYPE_CODE, 0))?;
        self.shell_orientation = pd.logical(1)?;
        let n = pd.int(2)? as usize;
        self.raw_voids = (0..n)
            .map(|i| {
                let seq = pd
                    .pointer(3 + 2 * i)?
                    .ok_or_else(|| bad(Self::TYPE_CODE, 3 + 2 * i))?;
                Ok((seq, pd.logical(4 + 2 * i)?))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        self.shell = Some(require(self.raw_shell, ctx)?);
        self.voids = self
            .raw_voids
            .clone()
            .into_iter()
            .map(|(seq, orient)| Ok((require(seq, ctx)?, orient)))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = vec![
            seq_of(xref, self.shell),
            Param::Logical(self.shell_orientation),
            Param::Int(self.voids.len() as i64),
        ];
        for (id, orient) in &self.voids {
            pd.params.push(seq_of(xref, Some(*id)));
            pd.params.push(Param::Logical(*orient));
        }
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 502: the vertex coordinates of a B-rep, indexed 1-based by edge
/// list entries.
#[derive(Debug, Default)]
pub struct VertexList {
    core: EntityCore,
    /// the vertices
    pub vertices: Vec<Point3>,
}

impl VertexList {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 502;

    /// Creates an empty vertex list.
    pub fn new() -> VertexList {
        VertexList {
            core: EntityCore::new(Self::TYPE_CODE),
            vertices: Vec::new(),
        }
    }
}

impl Entity for VertexList {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let n = pd.int(0)? as usize;
        self.vertices = (0..n)
            .map(|i| {
                Ok(Point3::new(
                    pd.real(1 + 3 * i)?,
                    pd.real(2 + 3 * i)?,
                    pd.real(3 + 3 * i)?,
                ))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params.push(Param::Int(self.vertices.len() as i64));
        pd.params.extend(
            self.vertices
                .iter()
                .flat_map(|p| [Param::Real(p.x), Param::Real(p.y), Param::Real(p.z)]),
        );
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) { self.vertices.iter_mut().for_each(|p| *p *= sf); }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// One entry of an edge list: the underlying curve and the start and end
/// vertices, each addressed as a vertex list plus a 1-based index.
#[derive(Clone, Debug)]
pub struct EdgeEntry {
    pub(crate) raw_curve: usize,
    pub(crate) raw_start_list: usize,
    pub(crate) raw_end_list: usize,
    /// the curve entity of the edge
    pub curve: Option<EntityId>,
    /// the vertex list holding the start vertex
    pub start_list: Option<EntityId>,
    /// 1-based index of the start vertex
    pub start_index: i64,
    /// the vertex list holding the end vertex
    pub end_list: Option<EntityId>,
    /// 1-based index of the end vertex
    pub end_index: i64,
}

/// Entity 504: the edges of a B-rep.
#[derive(Debug, Default)]
pub struct EdgeList {
    core: EntityCore,
    /// the edge entries
    pub edges: Vec<EdgeEntry>,
}

impl EdgeList {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 504;

    /// Creates an empty edge list.
    pub fn new() -> EdgeList {
        EdgeList {
            core: EntityCore::new(Self::TYPE_CODE),
            edges: Vec::new(),
        }
    }
}

impl Entity for EdgeList {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let n = pd.int(0)? as usize;
        self.edges = (0..n)
            .map(|i| {
                let at = 1 + 5 * i;
                Ok(EdgeEntry {
                    raw_curve: pd.pointer(at)?.ok_or_else(|| bad(Self::TYPE_CODE, at))?,
                    raw_start_list: pd
                        .pointer(at + 1)?
                        .ok_or_else(|| bad(Self::TYPE_CODE, at + 1))?,
                    start_index: pd.int(at + 2)?,
                    raw_end_list: pd
                        .pointer(at + 3)?
                        .ok_or_else(|| bad(Self::TYPE_CODE, at + 3))?,
                    end_index: pd.int(at + 4)?,
                    curve: None,
                    start_list: None,
                    end_list: None,
                })
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        for edge in &mut self.edges {
            let curve = ctx.resolve(edge.raw_curve)?;
            ctx.link(curve, Dependency::Physical);
            edge.curve = Some(curve);
            let start = ctx.resolve(edge.raw_start_list)?;
            ctx.link(start, Dependency::Physical);
            edge.start_list = Some(start);
            let end = ctx.resolve(edge.raw_end_list)?;
            ctx.link(end, Dependency::Physical);
            edge.end_list = Some(end);
        }
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params.push(Param::Int(self.edges.len() as i64));
        for edge in &self.edges {
            pd.params.extend([
                seq_of(xref, edge.curve),
                seq_of(xref, edge.start_list),
                Param::Int(edge.start_index),
                seq_of(xref, edge.end_list),
                Param::Int(edge.end_index),
            ]);
        }
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// One oriented use of an edge (or vertex) inside a loop, with its optional
/// parameter-space curves.
#[derive(Clone, Debug)]
pub struct LoopEdge {
    /// 0 for an edge use, 1 for a vertex use
    pub edge_type: i64,
    pub(crate) raw_list: usize,
    /// the edge or vertex list being used
    pub list: Option<EntityId>,
    /// 1-based index into the list
    pub index: i64,
    /// orientation of the use
    pub orientation: bool,
    /// isoparametric flags and parameter-space curves
    pub pcurves: Vec<(bool, Option<EntityId>)>,
    pub(crate) raw_pcurves: Vec<(bool, usize)>,
}

/// Entity 508: a loop of oriented edge uses bounding a face.
#[derive(Debug, Default)]
pub struct LoopEntity {
    core: EntityCore,
    /// the edge uses
    pub edges: Vec<LoopEdge>,
}

impl LoopEntity {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 508;

    /// Creates an empty loop.
    pub fn new() -> LoopEntity {
        LoopEntity {
            core: EntityCore::new(Self::TYPE_CODE),
            edges: Vec::new(),
        }
    }
}

impl Entity for LoopEntity {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let n = pd.int(0)? as usize;
        let mut at = 1;
        self.edges = (0..n)
            .map(|_| {
                let edge_type = pd.int(at)?;
                let raw_list = pd.pointer(at + 1)?.ok_or_else(|| bad(Self::TYPE_CODE, at + 1))?;
                let index = pd.int(at + 2)?;
                let orientation = pd.logical(at + 3)?;
                let k = pd.int(at + 4)? as usize;
                at += 5;
                let raw_pcurves = (0..k)
                    .map(|_| {
                        let isop = pd.logical(at)?;
                        let seq = pd.pointer(at + 1)?.ok_or_else(|| bad(Self::TYPE_CODE, at + 1))?;
                        at += 2;
                        Ok((isop, seq))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(LoopEdge {
                    edge_type,
                    raw_list,
                    list: None,
                    index,
                    orientation,
                    pcurves: Vec::new(),
                    raw_pcurves,
                })
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        for edge in &mut self.edges {
            let list = ctx.resolve(edge.raw_list)?;
            ctx.link(list, Dependency::Physical);
            edge.list = Some(list);
            edge.pcurves = edge
                .raw_pcurves
                .clone()
                .into_iter()
                .map(|(isop, seq)| {
                    let id = ctx.resolve(seq)?;
                    ctx.link(id, Dependency::Physical);
                    Ok((isop, Some(id)))
                })
                .collect::<Result<_>>()?;
        }
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params.push(Param::Int(self.edges.len() as i64));
        for edge in &self.edges {
            pd.params.extend([
                Param::Int(edge.edge_type),
                seq_of(xref, edge.list),
                Param::Int(edge.index),
                Param::Logical(edge.orientation),
                Param::Int(edge.pcurves.len() as i64),
            ]);
            for (isop, id) in &edge.pcurves {
                pd.params.push(Param::Logical(*isop));
                pd.params.push(seq_of(xref, *id));
            }
        }
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 510: a face of a B-rep, bounded by loops on a surface.
#[derive(Debug, Default)]
pub struct FaceEntity {
    core: EntityCore,
    raw_surface: usize,
    raw_loops: Vec<usize>,
    /// whether the first loop is the outer boundary
    pub has_outer: bool,
    surface: Option<EntityId>,
    loops: Vec<EntityId>,
}

impl FaceEntity {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 510;

    /// Creates an empty face.
    pub fn new() -> FaceEntity {
        FaceEntity {
            core: EntityCore::new(Self::TYPE_CODE),
            ..FaceEntity::default()
        }
    }

    /// The underlying surface.
    pub fn surface(&self) -> Option<EntityId> { self.surface }

    /// The bounding loops.
    pub fn loops(&self) -> &[EntityId] { &self.loops }
}

impl Entity for FaceEntity {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        self.raw_surface = pd.pointer(0)?.ok_or_else(|| bad(Self::TYPE_CODE, 0))?;
        let n = pd.int(1)? as usize;
        self.has_outer = pd.logical(2)?;
        self.raw_loops = (0..n)
            .map(|i| pd.pointer(3 + i)?.ok_or_else(|| bad(Self::TYPE_CODE, 3 + i)))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        self.surface = Some(require(self.raw_surface, ctx)?);
        self.loops = self
            .raw_loops
            .clone()
            .into_iter()
            .map(|seq| require(seq, ctx))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = vec![
            seq_of(xref, self.surface),
            Param::Int(self.loops.len() as i64),
            Param::Logical(self.has_outer),
        ];
        pd.params
            .extend(self.loops.iter().map(|&id| seq_of(xref, Some(id))));
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 514: a shell of oriented faces.
#[derive(Debug, Default)]
pub struct ShellEntity {
    core: EntityCore,
    raw_faces: Vec<(usize, bool)>,
    faces: Vec<(EntityId, bool)>,
}

impl ShellEntity {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 514;

    /// Creates an empty shell.
    pub fn new() -> ShellEntity {
        ShellEntity {
            core: EntityCore::new(Self::TYPE_CODE),
            ..ShellEntity::default()
        }
    }

    /// The faces with their orientation flags.
    pub fn faces(&self) -> &[(EntityId, bool)] { &self.faces }
}

impl Entity for ShellEntity {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let n = pd.int(0)? as usize;
        self.raw_faces = (0..n)
            .map(|i| {
                let seq = pd
                    .pointer(1 + 2 * i)?
                    .ok_or_else(|| bad(Self::TYPE_CODE, 1 + 2 * i))?;
                Ok((seq, pd.logical(2 + 2 * i)?))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        self.faces = self
            .raw_faces
            .clone()
            .into_iter()
            .map(|(seq, orient)| Ok((require(seq, ctx)?, orient)))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params.push(Param::Int(self.faces.len() as i64));
        for (id, orient) in &self.faces {
            pd.params.push(seq_of(xref, Some(*id)));
            pd.params.push(Param::Logical(*orient));
        }
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

//! Structural curve and surface entities: composite curve (102), curve on a
//! parametric surface (142), and trimmed parametric surface (144).

use super::{Dependency, Entity, EntityCore, EntityId, SeqMap};
use crate::errors::{Error, Result};
use crate::model::Associate;
use crate::record::{Param, ParamRecord};
use std::any::Any;

fn encode_ref(xref: &SeqMap, id: Option<EntityId>) -> Param {
    Param::Pointer(id.map(|id| xref.seq(id)).unwrap_or(0))
}

/// Entity 102: an ordered chain of curve entities. Every member is
/// physically dependent on the chain.
#[derive(Debug, Default)]
pub struct CompositeCurve {
    core: EntityCore,
    raw: Vec<usize>,
    curves: Vec<EntityId>,
}

impl CompositeCurve {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 102;

    /// Creates an empty chain.
    pub fn new() -> CompositeCurve {
        CompositeCurve {
            core: EntityCore::new(Self::TYPE_CODE),
            raw: Vec::new(),
            curves: Vec::new(),
        }
    }

    /// Creates a chain over already-resolved member handles (author path).
    pub fn from_members(curves: Vec<EntityId>) -> CompositeCurve {
        let mut entity = CompositeCurve::new();
        entity.curves = curves;
        entity.core.associated = true;
        entity
    }

    /// The resolved member handles, in chain order.
    pub fn members(&self) -> &[EntityId] { &self.curves }
}

impl Entity for CompositeCurve {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let n = pd.int(0)?;
        if n < 0 {
            return Err(Error::MalformedParameter {
                entity: Self::TYPE_CODE,
                index: 0,
            });
        }
        self.raw = (0..n as usize)
            .map(|i| {
                pd.pointer(1 + i)?.ok_or(Error::MalformedParameter {
                    entity: Self::TYPE_CODE,
                    index: 1 + i,
                })
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        self.curves = self
            .raw
            .iter()
            .map(|&seq| ctx.resolve(seq))
            .collect::<Result<_>>()?;
        for &id in &self.curves {
            ctx.link(id, Dependency::Physical);
        }
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params.push(Param::Int(self.curves.len() as i64));
        pd.params
            .extend(self.curves.iter().map(|&id| encode_ref(xref, Some(id))));
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 142: a curve lying on a parametric surface, carried both as a
/// parameter-space curve (the B pointer) and a model-space curve (the C
/// pointer).
#[derive(Debug, Default)]
pub struct CurveOnSurface {
    core: EntityCore,
    /// how the curve was created: 0 unspecified, 1 projection,
    /// 2 intersection, 3 isoparametric
    pub creation: i64,
    /// preferred representation: 0 unspecified, 1 S ∘ B, 2 C, 3 both
    pub preference: i64,
    raw_surface: usize,
    raw_bcurve: usize,
    raw_ccurve: usize,
    surface: Option<EntityId>,
    bcurve: Option<EntityId>,
    ccurve: Option<EntityId>,
}

impl CurveOnSurface {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 142;

    /// Creates an empty curve-on-surface.
    pub fn new() -> CurveOnSurface { CurveOnSurface::default().with_type() }

    fn with_type(mut self) -> Self {
        self.core = EntityCore::new(Self::TYPE_CODE);
        self
    }

    /// Creates a resolved curve-on-surface (author path).
    pub fn from_members(
        surface: EntityId,
        bcurve: EntityId,
        ccurve: EntityId,
    ) -> CurveOnSurface {
        let mut entity = CurveOnSurface::new();
        entity.creation = 1;
        entity.preference = 3;
        entity.surface = Some(surface);
        entity.bcurve = Some(bcurve);
        entity.ccurve = Some(ccurve);
        entity.core.associated = true;
        entity
    }

    /// The surface the curve lies on.
    pub fn surface(&self) -> Option<EntityId> { self.surface }

    /// The model-space curve.
    pub fn model_curve(&self) -> Option<EntityId> { self.ccurve }
}

impl Entity for CurveOnSurface {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        self.creation = pd.int(0)?;
        self.raw_surface = pd.pointer(1)?.unwrap_or(0);
        self.raw_bcurve = pd.pointer(2)?.unwrap_or(0);
        self.raw_ccurve = pd.pointer(3)?.unwrap_or(0);
        self.preference = pd.int(4).unwrap_or(0);
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        let mut resolve = |raw: usize| -> Result<Option<EntityId>> {
            match raw {
                0 => Ok(None),
                seq => {
                    let id = ctx.resolve(seq)?;
                    ctx.link(id, Dependency::Physical);
                    Ok(Some(id))
                }
            }
        };
        self.surface = resolve(self.raw_surface)?;
        self.bcurve = resolve(self.raw_bcurve)?;
        self.ccurve = resolve(self.raw_ccurve)?;
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = vec![
            Param::Int(self.creation),
            encode_ref(xref, self.surface),
            encode_ref(xref, self.bcurve),
            encode_ref(xref, self.ccurve),
            Param::Int(self.preference),
        ];
        Ok(pd)
    }

    fn b_pointer(&self) -> Option<EntityId> { self.bcurve }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 144: a surface trimmed by an outer boundary and any number of
/// inner boundaries, all curve-on-surface entities.
#[derive(Debug, Default)]
pub struct TrimmedSurface {
    core: EntityCore,
    /// whether the outer boundary differs from the surface's natural
    /// boundary
    pub has_outer: bool,
    raw_surface: usize,
    raw_outer: usize,
    raw_inner: Vec<usize>,
    surface: Option<EntityId>,
    outer: Option<EntityId>,
    inner: Vec<EntityId>,
}

impl TrimmedSurface {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 144;

    /// Creates an empty trimmed surface.
    pub fn new() -> TrimmedSurface {
        TrimmedSurface {
            core: EntityCore::new(Self::TYPE_CODE),
            ..TrimmedSurface::default()
        }
    }

    /// Creates a resolved trimmed surface (author path).
    pub fn from_members(
        surface: EntityId,
        outer: EntityId,
        inner: Vec<EntityId>,
    ) -> TrimmedSurface {
        let mut entity = TrimmedSurface::new();
        entity.has_outer = true;
        entity.surface = Some(surface);
        entity.outer = Some(outer);
        entity.inner = inner;
        entity.core.associated = true;
        entity
    }

    /// The trimmed base surface.
    pub fn surface(&self) -> Option<EntityId> { self.surface }

    /// The outer boundary.
    pub fn outer(&self) -> Option<EntityId> { self.outer }

    /// The inner boundaries.
    pub fn inner(&self) -> &[EntityId] { &self.inner }
}

impl Entity for TrimmedSurface {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        self.raw_surface = pd.pointer(0)?.unwrap_or(0);
        self.has_outer = pd.int(1)? == 1;
        let n2 = pd.int(2)?;
        if n2 < 0 {
            return Err(Error::MalformedParameter {
                entity: Self::TYPE_CODE,
                index: 2,
            });
        }
        self.raw_outer = pd.pointer(3)?.unwrap_or(0);
        self.raw_inner = (0..n2 as usize)
            .map(|i| {
                pd.pointer(4 + i)?.ok_or(Error::MalformedParameter {
                    entity: Self::TYPE_CODE,
                    index: 4 + i,
                })
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        let mut resolve = |raw: usize| -> Result<Option<EntityId>> {
            match raw {
                0 => Ok(None),
                seq => {
                    let id = ctx.resolve(seq)?;
                    ctx.link(id, Dependency::Physical);
                    Ok(Some(id))
                }
            }
        };
        self.surface = resolve(self.raw_surface)?;
        self.outer = resolve(self.raw_outer)?;
        self.inner = self
            .raw_inner
            .clone()
            .into_iter()
            .map(|seq| {
                resolve(seq)?.ok_or(Error::MalformedParameter {
                    entity: Self::TYPE_CODE,
                    index: 4,
                })
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn format(&self, xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = vec![
            encode_ref(xref, self.surface),
            Param::Int(self.has_outer as i64),
            Param::Int(self.inner.len() as i64),
            encode_ref(xref, self.outer),
        ];
        pd.params
            .extend(self.inner.iter().map(|&id| encode_ref(xref, Some(id))));
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

//! Simple geometric entities: circular arc (100), conic arc (104), and
//! line (110).

use super::{Entity, EntityCore, SeqMap};
use crate::errors::Result;
use crate::record::{Param, ParamRecord};
use gantry_base::cgmath64::*;
use std::any::Any;

/// Entity 100: a circular arc in the `z = zt` plane, CCW from `start` to
/// `end` about `center`.
#[derive(Debug)]
pub struct CircularArc {
    core: EntityCore,
    /// displacement of the arc plane along z
    pub zt: f64,
    /// arc center in the arc plane
    pub center: Point2,
    /// traversal start in the arc plane
    pub start: Point2,
    /// traversal end in the arc plane
    pub end: Point2,
}

impl Default for CircularArc {
    fn default() -> Self { CircularArc::new() }
}

impl CircularArc {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 100;

    /// Creates a blank arc.
    pub fn new() -> CircularArc {
        let origin = Point2::new(0.0, 0.0);
        CircularArc {
            core: EntityCore::new(Self::TYPE_CODE),
            zt: 0.0,
            center: origin,
            start: origin,
            end: origin,
        }
    }
}

impl Entity for CircularArc {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        self.zt = pd.real(0)?;
        self.center = Point2::new(pd.real(1)?, pd.real(2)?);
        self.start = Point2::new(pd.real(3)?, pd.real(4)?);
        self.end = Point2::new(pd.real(5)?, pd.real(6)?);
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = vec![
            Param::Real(self.zt),
            Param::Real(self.center.x),
            Param::Real(self.center.y),
            Param::Real(self.start.x),
            Param::Real(self.start.y),
            Param::Real(self.end.x),
            Param::Real(self.end.y),
        ];
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) {
        self.zt *= sf;
        self.center *= sf;
        self.start *= sf;
        self.end *= sf;
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 104: a conic arc `A x² + B xy + C y² + D x + E y + F = 0` clipped
/// between `start` and `end` in the `z = zt` plane. The form number
/// distinguishes ellipse, hyperbola, and parabola.
#[derive(Debug)]
pub struct ConicArc {
    core: EntityCore,
    /// the six conic coefficients `A, B, C, D, E, F`
    pub coefficients: [f64; 6],
    /// displacement of the conic plane along z
    pub zt: f64,
    /// traversal start in the conic plane
    pub start: Point2,
    /// traversal end in the conic plane
    pub end: Point2,
}

impl Default for ConicArc {
    fn default() -> Self { ConicArc::new() }
}

impl ConicArc {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 104;

    /// Creates a blank conic arc.
    pub fn new() -> ConicArc {
        let origin = Point2::new(0.0, 0.0);
        ConicArc {
            core: EntityCore::new(Self::TYPE_CODE),
            coefficients: [0.0; 6],
            zt: 0.0,
            start: origin,
            end: origin,
        }
    }
}

impl Entity for ConicArc {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        for (i, c) in self.coefficients.iter_mut().enumerate() {
            *c = pd.real(i)?;
        }
        self.zt = pd.real(6)?;
        self.start = Point2::new(pd.real(7)?, pd.real(8)?);
        self.end = Point2::new(pd.real(9)?, pd.real(10)?);
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = self.coefficients.iter().map(|&c| Param::Real(c)).collect();
        pd.params.extend([
            Param::Real(self.zt),
            Param::Real(self.start.x),
            Param::Real(self.start.y),
            Param::Real(self.end.x),
            Param::Real(self.end.y),
        ]);
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) {
        // substituting x → x/sf and clearing denominators keeps the
        // quadratic coefficients and scales D, E by sf and F by sf²
        self.coefficients[3] *= sf;
        self.coefficients[4] *= sf;
        self.coefficients[5] *= sf * sf;
        self.zt *= sf;
        self.start *= sf;
        self.end *= sf;
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 110: a line between two model-space points.
#[derive(Debug)]
pub struct LineEntity {
    core: EntityCore,
    /// start point
    pub start: Point3,
    /// end point
    pub end: Point3,
}

impl Default for LineEntity {
    fn default() -> Self { LineEntity::new() }
}

impl LineEntity {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 110;

    /// Creates a degenerate line at the origin; populate via `read_pd` or
    /// the fields.
    pub fn new() -> LineEntity {
        LineEntity {
            core: EntityCore::new(Self::TYPE_CODE),
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Entity for LineEntity {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        self.start = Point3::new(pd.real(0)?, pd.real(1)?, pd.real(2)?);
        self.end = Point3::new(pd.real(3)?, pd.real(4)?, pd.real(5)?);
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = [self.start, self.end]
            .iter()
            .flat_map(|p| [Param::Real(p.x), Param::Real(p.y), Param::Real(p.z)])
            .collect();
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) {
        self.start *= sf;
        self.end *= sf;
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

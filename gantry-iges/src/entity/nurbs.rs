//! Rational B-spline entities: curve (126) and surface (128).

use super::{Entity, EntityCore, SeqMap};
use crate::errors::{Error, Result};
use crate::record::{Param, ParamRecord};
use gantry_base::cgmath64::*;
use std::any::Any;

/// Entity 126: a rational B-spline curve.
///
/// The payload follows the standard's layout: upper control-point index
/// `K`, degree `M`, the four property flags, `K + M + 2` knots, `K + 1`
/// weights and control points, the parameter range, and the unit normal of
/// the containing plane for planar curves.
#[derive(Debug)]
pub struct NurbsCurve {
    core: EntityCore,
    /// polynomial degree
    pub degree: usize,
    /// the curve lies in a single plane
    pub planar: bool,
    /// start and end points coincide
    pub closed: bool,
    /// all weights equal: the curve is polynomial
    pub polynomial: bool,
    /// the curve is periodic
    pub periodic: bool,
    /// knot vector, non-decreasing, length `ctrl.len() + degree + 1`
    pub knots: Vec<f64>,
    /// one weight per control point
    pub weights: Vec<f64>,
    /// control points
    pub ctrl: Vec<Point3>,
    /// parameter range
    pub range: (f64, f64),
    /// unit normal of the containing plane, meaningful when `planar`
    pub normal: Vector3,
}

impl Default for NurbsCurve {
    fn default() -> Self { NurbsCurve::new() }
}

impl NurbsCurve {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 126;

    /// Creates an empty curve.
    pub fn new() -> NurbsCurve {
        NurbsCurve {
            core: EntityCore::new(Self::TYPE_CODE),
            degree: 1,
            planar: true,
            closed: false,
            polynomial: true,
            periodic: false,
            knots: Vec::new(),
            weights: Vec::new(),
            ctrl: Vec::new(),
            range: (0.0, 1.0),
            normal: Vector3::new(0.0, 0.0, 1.0),
        }
    }

    /// Creates a planar curve from spline data. The weight list decides
    /// the polynomial flag; the closed flag comes from the end points.
    pub fn from_data(
        degree: usize,
        knots: Vec<f64>,
        weights: Vec<f64>,
        ctrl: Vec<Point3>,
    ) -> Result<NurbsCurve> {
        if ctrl.is_empty() || weights.len() != ctrl.len() || knots.len() != ctrl.len() + degree + 1
        {
            return Err(Error::MalformedParameter {
                entity: Self::TYPE_CODE,
                index: 0,
            });
        }
        let closed = {
            use gantry_base::tolerance::Tolerance;
            ctrl.first().unwrap().near(ctrl.last().unwrap())
        };
        let polynomial = weights.windows(2).all(|w| w[0] == w[1]);
        let range = (knots[degree], knots[knots.len() - degree - 1]);
        Ok(NurbsCurve {
            core: EntityCore::new(Self::TYPE_CODE),
            degree,
            planar: true,
            closed,
            polynomial,
            periodic: false,
            knots,
            weights,
            ctrl,
            range,
            normal: Vector3::new(0.0, 0.0, 1.0),
        })
    }
}

impl Entity for NurbsCurve {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let k = pd.int(0)? as usize;
        let m = pd.int(1)? as usize;
        self.degree = m;
        self.planar = pd.int(2)? == 1;
        self.closed = pd.int(3)? == 1;
        self.polynomial = pd.int(4)? == 1;
        self.periodic = pd.int(5)? == 1;
        let n_knots = k + m + 2;
        let mut at = 6;
        self.knots = (0..n_knots)
            .map(|i| pd.real(at + i))
            .collect::<Result<_>>()?;
        at += n_knots;
        self.weights = (0..=k).map(|i| pd.real(at + i)).collect::<Result<_>>()?;
        at += k + 1;
        self.ctrl = (0..=k)
            .map(|i| {
                Ok(Point3::new(
                    pd.real(at + 3 * i)?,
                    pd.real(at + 3 * i + 1)?,
                    pd.real(at + 3 * i + 2)?,
                ))
            })
            .collect::<Result<_>>()?;
        at += 3 * (k + 1);
        self.range = (pd.real(at)?, pd.real(at + 1)?);
        // the plane normal trails only planar curves and may be omitted
        self.normal = match (self.planar, pd.real(at + 2)) {
            (true, Ok(nx)) => Vector3::new(nx, pd.real(at + 3)?, pd.real(at + 4)?),
            _ => Vector3::new(0.0, 0.0, 1.0),
        };
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        let k = self.ctrl.len() - 1;
        pd.params = vec![
            Param::Int(k as i64),
            Param::Int(self.degree as i64),
            Param::Int(self.planar as i64),
            Param::Int(self.closed as i64),
            Param::Int(self.polynomial as i64),
            Param::Int(self.periodic as i64),
        ];
        pd.params.extend(self.knots.iter().map(|&t| Param::Real(t)));
        pd.params
            .extend(self.weights.iter().map(|&w| Param::Real(w)));
        pd.params.extend(
            self.ctrl
                .iter()
                .flat_map(|p| [Param::Real(p.x), Param::Real(p.y), Param::Real(p.z)]),
        );
        pd.params.push(Param::Real(self.range.0));
        pd.params.push(Param::Real(self.range.1));
        pd.params.extend([
            Param::Real(self.normal.x),
            Param::Real(self.normal.y),
            Param::Real(self.normal.z),
        ]);
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) {
        // knots and weights live in parameter space and stay untouched
        self.ctrl.iter_mut().for_each(|p| *p *= sf);
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Entity 128: a rational B-spline surface. Control points run with the
/// first (u) index fastest.
#[derive(Debug)]
pub struct NurbsSurface {
    core: EntityCore,
    /// degrees along u and v
    pub degrees: (usize, usize),
    /// closure flags along u and v
    pub closed: (bool, bool),
    /// all weights equal: the surface is polynomial
    pub polynomial: bool,
    /// periodicity flags along u and v
    pub periodic: (bool, bool),
    /// knot vector along u
    pub knots_u: Vec<f64>,
    /// knot vector along v
    pub knots_v: Vec<f64>,
    /// weights, u-fastest, `nu × nv` entries
    pub weights: Vec<f64>,
    /// control net, u-fastest, `nu × nv` entries
    pub ctrl: Vec<Point3>,
    /// number of control points along u
    pub nu: usize,
    /// number of control points along v
    pub nv: usize,
    /// parameter range along u
    pub range_u: (f64, f64),
    /// parameter range along v
    pub range_v: (f64, f64),
}

impl Default for NurbsSurface {
    fn default() -> Self { NurbsSurface::new() }
}

impl NurbsSurface {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 128;

    /// Creates an empty surface.
    pub fn new() -> NurbsSurface {
        NurbsSurface {
            core: EntityCore::new(Self::TYPE_CODE),
            degrees: (1, 1),
            closed: (false, false),
            polynomial: true,
            periodic: (false, false),
            knots_u: Vec::new(),
            knots_v: Vec::new(),
            weights: Vec::new(),
            ctrl: Vec::new(),
            nu: 0,
            nv: 0,
            range_u: (0.0, 1.0),
            range_v: (0.0, 1.0),
        }
    }

    /// Creates a surface from spline data, u-fastest control net.
    pub fn from_data(
        degrees: (usize, usize),
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        weights: Vec<f64>,
        ctrl: Vec<Point3>,
        nu: usize,
        nv: usize,
    ) -> Result<NurbsSurface> {
        let coherent = nu * nv == ctrl.len()
            && weights.len() == ctrl.len()
            && knots_u.len() == nu + degrees.0 + 1
            && knots_v.len() == nv + degrees.1 + 1;
        if !coherent {
            return Err(Error::MalformedParameter {
                entity: Self::TYPE_CODE,
                index: 0,
            });
        }
        let polynomial = weights.windows(2).all(|w| w[0] == w[1]);
        let range_u = (knots_u[degrees.0], knots_u[knots_u.len() - degrees.0 - 1]);
        let range_v = (knots_v[degrees.1], knots_v[knots_v.len() - degrees.1 - 1]);
        Ok(NurbsSurface {
            core: EntityCore::new(Self::TYPE_CODE),
            degrees,
            closed: (false, false),
            polynomial,
            periodic: (false, false),
            knots_u,
            knots_v,
            weights,
            ctrl,
            nu,
            nv,
            range_u,
            range_v,
        })
    }
}

impl Entity for NurbsSurface {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        let k1 = pd.int(0)? as usize;
        let k2 = pd.int(1)? as usize;
        let m1 = pd.int(2)? as usize;
        let m2 = pd.int(3)? as usize;
        self.degrees = (m1, m2);
        self.closed = (pd.int(4)? == 1, pd.int(5)? == 1);
        self.polynomial = pd.int(6)? == 1;
        self.periodic = (pd.int(7)? == 1, pd.int(8)? == 1);
        self.nu = k1 + 1;
        self.nv = k2 + 1;
        let (nk_u, nk_v) = (k1 + m1 + 2, k2 + m2 + 2);
        let mut at = 9;
        self.knots_u = (0..nk_u).map(|i| pd.real(at + i)).collect::<Result<_>>()?;
        at += nk_u;
        self.knots_v = (0..nk_v).map(|i| pd.real(at + i)).collect::<Result<_>>()?;
        at += nk_v;
        let n = self.nu * self.nv;
        self.weights = (0..n).map(|i| pd.real(at + i)).collect::<Result<_>>()?;
        at += n;
        self.ctrl = (0..n)
            .map(|i| {
                Ok(Point3::new(
                    pd.real(at + 3 * i)?,
                    pd.real(at + 3 * i + 1)?,
                    pd.real(at + 3 * i + 2)?,
                ))
            })
            .collect::<Result<_>>()?;
        at += 3 * n;
        self.range_u = (pd.real(at)?, pd.real(at + 1)?);
        self.range_v = (pd.real(at + 2)?, pd.real(at + 3)?);
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = vec![
            Param::Int((self.nu - 1) as i64),
            Param::Int((self.nv - 1) as i64),
            Param::Int(self.degrees.0 as i64),
            Param::Int(self.degrees.1 as i64),
            Param::Int(self.closed.0 as i64),
            Param::Int(self.closed.1 as i64),
            Param::Int(self.polynomial as i64),
            Param::Int(self.periodic.0 as i64),
            Param::Int(self.periodic.1 as i64),
        ];
        pd.params
            .extend(self.knots_u.iter().map(|&t| Param::Real(t)));
        pd.params
            .extend(self.knots_v.iter().map(|&t| Param::Real(t)));
        pd.params
            .extend(self.weights.iter().map(|&w| Param::Real(w)));
        pd.params.extend(
            self.ctrl
                .iter()
                .flat_map(|p| [Param::Real(p.x), Param::Real(p.y), Param::Real(p.z)]),
        );
        pd.params.extend([
            Param::Real(self.range_u.0),
            Param::Real(self.range_u.1),
            Param::Real(self.range_v.0),
            Param::Real(self.range_v.1),
        ]);
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) { self.ctrl.iter_mut().for_each(|p| *p *= sf); }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_base::assert_near;

    #[test]
    fn curve_pd_roundtrip() {
        let original = NurbsCurve::from_data(
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.5, 1.0],
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
        .unwrap();
        let pd = original.format(&SeqMap::default()).unwrap();
        let mut read_back = NurbsCurve::new();
        read_back.read_pd(&pd).unwrap();
        assert_eq!(read_back.degree, 2);
        assert!(!read_back.polynomial);
        assert_eq!(read_back.knots, original.knots);
        assert_eq!(read_back.weights, original.weights);
        assert_near!(read_back.ctrl[1], original.ctrl[1]);
        assert_near!(read_back.range.1, 1.0);
    }

    #[test]
    fn surface_pd_roundtrip() {
        let original = NurbsSurface::from_data(
            (1, 1),
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0; 4],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 3.0, 0.0),
                Point3::new(2.0, 3.0, 0.0),
            ],
            2,
            2,
        )
        .unwrap();
        let pd = original.format(&SeqMap::default()).unwrap();
        let mut read_back = NurbsSurface::new();
        read_back.read_pd(&pd).unwrap();
        assert_eq!(read_back.nu, 2);
        assert_eq!(read_back.nv, 2);
        assert!(read_back.polynomial);
        assert_near!(read_back.ctrl[3], original.ctrl[3]);
    }

    #[test]
    fn incoherent_data_is_rejected() {
        let res = NurbsCurve::from_data(
            2,
            vec![0.0, 1.0],
            vec![1.0],
            vec![Point3::new(0.0, 0.0, 0.0)],
        );
        assert!(matches!(res, Err(Error::MalformedParameter { entity: 126, .. })));
    }
}

//! Type 124: transformation matrix.

use super::{Entity, EntityCore, SeqMap};
use crate::errors::Result;
use crate::record::{Param, ParamRecord};
use gantry_base::cgmath64::*;
use std::any::Any;

/// A rigid-body placement: the upper 3×4 of a homogeneous matrix. The last
/// row is the implicit `(0, 0, 0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Xform {
    /// the rotation block
    pub rot: Matrix3,
    /// the translation column
    pub trans: Vector3,
}

impl Default for Xform {
    fn default() -> Self { Xform::identity() }
}

impl Xform {
    /// The identity placement.
    pub fn identity() -> Xform {
        Xform {
            rot: Matrix3::identity(),
            trans: Vector3::zero(),
        }
    }

    /// Composes `self ∘ inner`: apply `inner` first, then `self`.
    pub fn compose(&self, inner: &Xform) -> Xform {
        Xform {
            rot: self.rot * inner.rot,
            trans: self.rot * inner.trans + self.trans,
        }
    }

    /// Applies the placement to a point.
    pub fn apply(&self, p: Point3) -> Point3 {
        Point3::from_vec(self.rot * p.to_vec() + self.trans)
    }
}

/// Entity 124: a rotation and translation, possibly chained onto a parent
/// transform through its own directory-entry transform field.
#[derive(Debug)]
pub struct TransformMatrix {
    core: EntityCore,
    xform: Xform,
}

impl Default for TransformMatrix {
    fn default() -> Self { TransformMatrix::new() }
}

impl TransformMatrix {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 124;

    /// Creates the identity transform.
    pub fn new() -> TransformMatrix {
        TransformMatrix {
            core: EntityCore::new(Self::TYPE_CODE),
            xform: Xform::identity(),
        }
    }

    /// Creates a transform from a rotation and translation.
    pub fn from_parts(rot: Matrix3, trans: Vector3) -> TransformMatrix {
        TransformMatrix {
            core: EntityCore::new(Self::TYPE_CODE),
            xform: Xform { rot, trans },
        }
    }

    /// The local placement, before parent-chain composition.
    pub fn xform(&self) -> Xform { self.xform }
}

impl Entity for TransformMatrix {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        // R11 R12 R13 T1 R21 R22 R23 T2 R31 R32 R33 T3, row major
        let mut rows = [[0.0; 4]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = pd.real(r * 4 + c)?;
            }
        }
        self.xform = Xform {
            rot: Matrix3::from_cols(
                Vector3::new(rows[0][0], rows[1][0], rows[2][0]),
                Vector3::new(rows[0][1], rows[1][1], rows[2][1]),
                Vector3::new(rows[0][2], rows[1][2], rows[2][2]),
            ),
            trans: Vector3::new(rows[0][3], rows[1][3], rows[2][3]),
        };
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        let rot = self.xform.rot;
        let trans = self.xform.trans;
        for r in 0..3 {
            for c in 0..3 {
                pd.params.push(Param::Real(rot[c][r]));
            }
            pd.params.push(Param::Real(trans[r]));
        }
        Ok(pd)
    }

    fn rescale(&mut self, sf: f64) { self.xform.trans *= sf; }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

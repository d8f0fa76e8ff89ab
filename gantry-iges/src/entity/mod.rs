//! The abstract entity node: directory-entry bookkeeping, parent/child
//! reference tracking, and the capability trait every concrete entity type
//! implements.

use crate::errors::Result;
use crate::model::Associate;
use crate::record::{DirEntry, ParamRecord};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::{self, Debug, Display, Formatter};

mod attributes;
mod brep;
mod geometry;
mod nurbs;
mod structure;
mod transform;

pub use attributes::ColorDefinition;
pub use brep::{EdgeList, FaceEntity, LoopEntity, ManifoldSolid, ShellEntity, VertexList};
pub use geometry::{CircularArc, ConicArc, LineEntity};
pub use nurbs::{NurbsCurve, NurbsSurface};
pub use structure::{CompositeCurve, CurveOnSurface, TrimmedSurface};
pub use transform::{TransformMatrix, Xform};

/// Stable handle of an entity inside its model's table. Handles are
/// non-owning; the model owns every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub(crate) usize);

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// Classification of a parent → child edge per IGES 2.2.4.5.2, fixed when
/// the edge is inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dependency {
    /// plain reference
    #[default]
    None,
    /// the child cannot exist without the parent
    Physical,
    /// the parent groups the child without owning its existence
    Logical,
}

/// Outcome of [`EntityCore::add_reference`]. `AlreadyPresent` is
/// success-with-noop: the caller must not push the child a second time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefStatus {
    /// the edge is new
    Added,
    /// the edge already existed; reference counting is by set membership
    AlreadyPresent,
}

/// Graph bookkeeping shared by every entity: the directory entry, the
/// ordered child list, the parent set with per-edge dependency tags, and
/// the resolved directory-entry references.
#[derive(Clone, Debug, Default)]
pub struct EntityCore {
    /// the raw directory entry as read or as authored
    pub de: DirEntry,
    pub(crate) children: Vec<EntityId>,
    pub(crate) parents: FxHashMap<EntityId, Dependency>,
    pub(crate) associated: bool,
    pub(crate) transform: Option<EntityId>,
    pub(crate) structure: Option<EntityId>,
    pub(crate) line_font: Option<EntityId>,
    pub(crate) level: Option<EntityId>,
    pub(crate) view: Option<EntityId>,
    pub(crate) label_display: Option<EntityId>,
    pub(crate) color: Option<EntityId>,
}

impl EntityCore {
    /// Creates the core of a bare entity of the given type.
    pub fn new(entity_type: u32) -> EntityCore {
        EntityCore {
            de: DirEntry::new(entity_type),
            ..EntityCore::default()
        }
    }

    /// The ordered child list: entities this node depends on.
    pub fn children(&self) -> &[EntityId] { &self.children }

    /// The parent set with each edge's dependency classification.
    pub fn parents(&self) -> impl Iterator<Item = (EntityId, Dependency)> + '_ {
        self.parents.iter().map(|(id, dep)| (*id, *dep))
    }

    /// Whether the associate pass has run for this entity.
    pub fn associated(&self) -> bool { self.associated }

    /// The resolved transform reference, if any.
    pub fn transform(&self) -> Option<EntityId> { self.transform }

    /// The resolved color-definition reference, if any.
    pub fn color(&self) -> Option<EntityId> { self.color }

    /// Registers `parent` in the parent set. Adding a parent that is
    /// already present is a no-op and reported as such; the caller uses the
    /// status to keep the parent's child list free of duplicates.
    pub fn add_reference(&mut self, parent: EntityId, dep: Dependency) -> RefStatus {
        match self.parents.insert(parent, dep) {
            None => RefStatus::Added,
            Some(prev) => {
                // keep the original classification
                self.parents.insert(parent, prev);
                RefStatus::AlreadyPresent
            }
        }
    }

    /// Removes `parent` from the parent set. Returns whether the set is now
    /// empty, which obliges the model to destroy a physically dependent
    /// entity.
    pub fn del_reference(&mut self, parent: EntityId) -> bool {
        self.parents.remove(&parent);
        self.parents.is_empty()
    }

    /// Drops `child` from the child list; invoked when the child dies.
    pub fn unlink_child(&mut self, child: EntityId) { self.children.retain(|&c| c != child) }

    /// Whether the status flags mark this entity physically dependent on
    /// its parents.
    pub fn is_physically_dependent(&self) -> bool { self.de.status.subordinate.is_physical() }
}

/// Resolved-reference table handed to [`Entity::format`]: maps entity
/// handles to the DE sequence numbers assigned for this write-out.
#[derive(Clone, Debug, Default)]
pub struct SeqMap(pub(crate) FxHashMap<EntityId, usize>);

impl SeqMap {
    /// The assigned DE sequence for `id`; `0` if the entity is not written.
    pub fn seq(&self, id: EntityId) -> usize { self.0.get(&id).copied().unwrap_or(0) }
}

/// The capability set of an IGES entity node.
///
/// Concrete types supply payload handling; all graph bookkeeping lives in
/// the [`EntityCore`] and is driven by the model so that the symmetric
/// parent/child invariant has a single home. Entities are `Send` so that
/// independent models can live on different threads; a single model is
/// still single-owner.
pub trait Entity: Debug + Send {
    /// The shared graph bookkeeping.
    fn core(&self) -> &EntityCore;
    /// Mutable access to the shared graph bookkeeping.
    fn core_mut(&mut self) -> &mut EntityCore;
    /// The IGES type code of this entity.
    fn type_code(&self) -> u32;
    /// Populates the directory-entry fields from a structured DE record.
    fn read_de(&mut self, de: &DirEntry) -> Result<()> {
        self.core_mut().de = de.clone();
        Ok(())
    }
    /// Populates the payload from a parameter record. Pointer parameters
    /// are retained as raw DE sequence integers until [`Entity::associate`].
    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()>;
    /// Resolves retained pointer integers into entity handles and declares
    /// the resulting child edges on `ctx`. Safe to skip for entities whose
    /// payload holds no pointers.
    fn associate(&mut self, ctx: &mut Associate<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
    /// Emits the parameter record for write-out, encoding entity handles
    /// through the sequence map.
    fn format(&self, xref: &SeqMap) -> Result<ParamRecord>;
    /// Applies a length scale factor to every embedded length.
    fn rescale(&mut self, sf: f64) { let _ = sf; }
    /// The parameter-space curve handle of a curve-on-surface entity; the
    /// rescale pass suppresses scaling for that child.
    fn b_pointer(&self) -> Option<EntityId> { None }
    /// Upcast for concrete-type access.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for concrete-type access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

//! The model container: exclusive owner of every entity, the type-indexed
//! factory registry, two-phase load, reference tracking, transform
//! composition, model-wide rescaling, and write-out sequencing.

use crate::entity::{
    CircularArc, ColorDefinition, CompositeCurve, ConicArc, CurveOnSurface, Dependency, EdgeList,
    Entity, EntityId, FaceEntity, LineEntity, LoopEntity, ManifoldSolid, NurbsCurve, NurbsSurface,
    RefStatus, SeqMap, ShellEntity, TransformMatrix, TrimmedSurface, VertexList, Xform,
};
use crate::errors::{Error, Result};
use crate::globals::GlobalParams;
use crate::record::{DeRef, RawEntity, RecordSink};
use gantry_base::cgmath64::*;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

/// Constructor registered for one entity type code.
pub type EntityFactory = fn() -> Box<dyn Entity>;

fn default_registry() -> FxHashMap<u32, EntityFactory> {
    let mut registry: FxHashMap<u32, EntityFactory> = FxHashMap::default();
    macro_rules! register {
        ($($entity: ty),* $(,)?) => {
            $(registry.insert(
                <$entity>::TYPE_CODE,
                (|| Box::new(<$entity>::new()) as Box<dyn Entity>) as EntityFactory,
            );)*
        };
    }
    register!(
        CircularArc,
        CompositeCurve,
        ConicArc,
        LineEntity,
        TransformMatrix,
        NurbsCurve,
        NurbsSurface,
        CurveOnSurface,
        TrimmedSurface,
        ManifoldSolid,
        ColorDefinition,
        VertexList,
        EdgeList,
        LoopEntity,
        FaceEntity,
        ShellEntity,
    );
    registry
}

/// The root container of an IGES model.
///
/// All entities live in the model's slot table and are addressed by
/// [`EntityId`]; cross-entity references never own. A model is
/// single-owner: it is `Send` but carries no internal synchronization.
#[derive(Debug)]
pub struct Model {
    slots: Vec<Option<Box<dyn Entity>>>,
    free: Vec<usize>,
    registry: FxHashMap<u32, EntityFactory>,
    globals: GlobalParams,
    lenient: bool,
    seq_index: FxHashMap<usize, EntityId>,
}

impl Default for Model {
    fn default() -> Self { Model::new() }
}

/// Association context handed to [`Entity::associate`]: resolves retained
/// DE sequence integers into entity handles and records the child edges to
/// install once the entity returns.
#[derive(Debug)]
pub struct Associate<'a> {
    model: &'a mut Model,
    links: Vec<(EntityId, Dependency)>,
}

impl Associate<'_> {
    /// Resolves a DE sequence number into a handle, associating the target
    /// first so that dependent fix-ups (a composite under a
    /// curve-on-surface, say) observe a fully resolved child.
    pub fn resolve(&mut self, seq: usize) -> Result<EntityId> {
        let id = self
            .model
            .seq_index
            .get(&seq)
            .copied()
            .ok_or(Error::UnresolvedReference(seq))?;
        self.model.associate_entity(id)?;
        Ok(id)
    }

    /// Declares a child edge with its dependency classification.
    pub fn link(&mut self, child: EntityId, dep: Dependency) { self.links.push((child, dep)) }
}

impl Model {
    /// Creates an empty model with the default entity factories.
    pub fn new() -> Model {
        Model {
            slots: Vec::new(),
            free: Vec::new(),
            registry: default_registry(),
            globals: GlobalParams::default(),
            lenient: false,
            seq_index: FxHashMap::default(),
        }
    }

    /// The Global-section parameters.
    pub fn globals(&self) -> &GlobalParams { &self.globals }

    /// Mutable access to the Global-section parameters.
    pub fn globals_mut(&mut self) -> &mut GlobalParams { &mut self.globals }

    /// Replaces the Global-section parameters wholesale.
    pub fn set_globals(&mut self, globals: GlobalParams) { self.globals = globals }

    /// When set, load skips unsupported entity types with a warning
    /// instead of failing.
    pub fn set_lenient(&mut self, lenient: bool) { self.lenient = lenient }

    /// Registers (or replaces) the factory for one entity type.
    pub fn register_factory(&mut self, type_code: u32, factory: EntityFactory) {
        self.registry.insert(type_code, factory);
    }

    fn insert(&mut self, entity: Box<dyn Entity>) -> EntityId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(entity);
                EntityId(index)
            }
            None => {
                self.slots.push(Some(entity));
                EntityId(self.slots.len() - 1)
            }
        }
    }

    /// Creates a bare entity through the factory registry (author path).
    pub fn create_entity(&mut self, type_code: u32) -> Result<EntityId> {
        let factory = *self
            .registry
            .get(&type_code)
            .ok_or(Error::UnsupportedEntity(type_code))?;
        let mut entity = factory();
        entity.core_mut().associated = true;
        Ok(self.insert(entity))
    }

    /// Inserts an already-built entity (author path); its handles are taken
    /// as resolved.
    pub fn add_entity(&mut self, mut entity: Box<dyn Entity>) -> EntityId {
        entity.core_mut().associated = true;
        self.insert(entity)
    }

    /// The entity behind `id`.
    pub fn get(&self, id: EntityId) -> Result<&dyn Entity> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_deref())
            .ok_or(Error::UnresolvedReference(id.0))
    }

    /// Mutable access to the entity behind `id`.
    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut dyn Entity> {
        match self.slots.get_mut(id.0) {
            Some(Some(entity)) => Ok(entity.as_mut()),
            _ => Err(Error::UnresolvedReference(id.0)),
        }
    }

    /// Concrete-type access to the entity behind `id`.
    pub fn get_as<T: Entity + 'static>(&self, id: EntityId) -> Option<&T> {
        self.get(id).ok()?.as_any().downcast_ref::<T>()
    }

    /// The handles of all live entities, in table order.
    pub fn ids(&self) -> Vec<EntityId> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].is_some())
            .map(EntityId)
            .collect()
    }

    /// The handles of all live entities of one type.
    pub fn entities_by_type(&self, type_code: u32) -> Vec<EntityId> {
        self.ids()
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .map(|e| e.type_code() == type_code)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Installs the edge `parent → child` after checking that it cannot
    /// close a cycle. Returns whether the edge was new; an existing edge is
    /// success-with-noop and leaves the child list untouched.
    pub fn add_child(
        &mut self,
        parent: EntityId,
        child: EntityId,
        dep: Dependency,
    ) -> Result<RefStatus> {
        if parent == child {
            return Err(Error::CyclicDependency);
        }
        // walk from the prospective parent to the roots
        let mut stack = vec![parent];
        let mut seen = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if current == child {
                return Err(Error::CyclicDependency);
            }
            if seen.insert(current) {
                if let Ok(entity) = self.get(current) {
                    stack.extend(entity.core().parents().map(|(id, _)| id));
                }
            }
        }
        let status = self.get_mut(child)?.core_mut().add_reference(parent, dep);
        if status == RefStatus::Added {
            self.get_mut(parent)?.core_mut().children.push(child);
        }
        Ok(status)
    }

    /// Removes the edge `parent → child`. A physically dependent child
    /// whose parent set empties is destroyed.
    pub fn del_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        self.get_mut(parent)?.core_mut().unlink_child(child);
        let child_entity = self.get_mut(child)?;
        let orphaned = child_entity.core_mut().del_reference(parent);
        if orphaned && child_entity.core().is_physically_dependent() {
            self.delete_entity(child)?;
        }
        Ok(())
    }

    /// Destroys an entity: unlinks it from every parent's child list and
    /// every child's parent set, then cascades over physically dependent
    /// children left without parents.
    pub fn delete_entity(&mut self, id: EntityId) -> Result<()> {
        let entity = self
            .slots
            .get_mut(id.0)
            .and_then(|slot| slot.take())
            .ok_or(Error::UnresolvedReference(id.0))?;
        let parents: Vec<EntityId> = entity.core().parents().map(|(id, _)| id).collect();
        let children = entity.core().children().to_vec();
        for parent in parents {
            if let Ok(parent_entity) = self.get_mut(parent) {
                parent_entity.core_mut().unlink_child(id);
            }
        }
        let mut orphans = Vec::new();
        for child in children {
            if let Ok(child_entity) = self.get_mut(child) {
                let orphaned = child_entity.core_mut().del_reference(id);
                if orphaned && child_entity.core().is_physically_dependent() {
                    orphans.push(child);
                }
            }
        }
        self.free.push(id.0);
        self.seq_index.retain(|_, v| *v != id);
        for orphan in orphans {
            // an earlier cascade may already have consumed the slot
            let _ = self.delete_entity(orphan);
        }
        Ok(())
    }

    /// Two-phase load: creates an entity per record through the factory
    /// registry, then runs the associate pass.
    pub fn load_from_records<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = RawEntity>,
    {
        debug!("load: reading directory and parameter records");
        for RawEntity { de, pd } in records {
            if de.entity_type != pd.type_code {
                return Err(Error::TypeMismatch {
                    sequence: de.sequence,
                    declared: de.entity_type,
                    found: pd.type_code,
                });
            }
            let factory = match self.registry.get(&de.entity_type) {
                Some(factory) => *factory,
                None if self.lenient => {
                    warn!(
                        "skipping unsupported entity type {} at DE {}",
                        de.entity_type, de.sequence,
                    );
                    continue;
                }
                None => return Err(Error::UnsupportedEntity(de.entity_type)),
            };
            let mut entity = factory();
            entity.read_de(&de)?;
            entity.read_pd(&pd)?;
            let id = self.insert(entity);
            self.seq_index.insert(de.sequence, id);
        }
        self.associate()
    }

    /// The associate pass: resolves every retained pointer integer into an
    /// entity handle and installs the reference edges. Idempotent; failures
    /// are collected per entity rather than aborting on the first.
    pub fn associate(&mut self) -> Result<()> {
        debug!("associate: resolving pointer references");
        let mut failures = Vec::new();
        for id in self.ids() {
            let seq = self
                .get(id)
                .map(|e| e.core().de.sequence)
                .unwrap_or_default();
            if let Err(err) = self.associate_entity(id) {
                failures.push((seq, err));
            }
        }
        match failures.is_empty() {
            true => Ok(()),
            false => Err(Error::AssociateFailures(failures)),
        }
    }

    /// Associates one entity, recursing into its dependencies first. An
    /// entity whose slot is vacant mid-pass is being associated further up
    /// the call stack, which means the file's reference graph has a cycle.
    pub(crate) fn associate_entity(&mut self, id: EntityId) -> Result<()> {
        match self.slots.get(id.0).ok_or(Error::UnresolvedReference(id.0))? {
            Some(entity) if entity.core().associated => return Ok(()),
            Some(_) => {}
            None => return Err(Error::CyclicDependency),
        }
        let mut entity = self.slots[id.0].take().expect("slot checked above");
        let outcome = self.run_associate(&mut entity);
        self.slots[id.0] = Some(entity);
        for (child, dep) in outcome? {
            self.add_child(id, child, dep)?;
        }
        if let Some(entity) = &mut self.slots[id.0] {
            entity.core_mut().associated = true;
        }
        Ok(())
    }

    fn run_associate(
        &mut self,
        entity: &mut Box<dyn Entity>,
    ) -> Result<Vec<(EntityId, Dependency)>> {
        let de = entity.core().de.clone();
        let mut ctx = Associate {
            model: self,
            links: Vec::new(),
        };
        // directory-entry pointer fields resolve at the core level
        if de.transform != 0 {
            let transform = ctx.resolve(de.transform)?;
            ctx.link(transform, Dependency::None);
            entity.core_mut().transform = Some(transform);
        }
        let fields = [
            de.structure,
            de.line_font,
            de.level,
            de.view,
            de.label_display,
            de.color,
        ];
        let mut resolved = [None; 6];
        for (slot, field) in resolved.iter_mut().zip(fields) {
            if let Some(seq) = field.pointer() {
                let id = ctx.resolve(seq)?;
                ctx.link(id, Dependency::None);
                *slot = Some(id);
            }
        }
        let core = entity.core_mut();
        [
            &mut core.structure,
            &mut core.line_font,
            &mut core.level,
            &mut core.view,
            &mut core.label_display,
            &mut core.color,
        ]
        .into_iter()
        .zip(resolved)
        .for_each(|(slot, id)| {
            if id.is_some() {
                *slot = id;
            }
        });
        entity.associate(&mut ctx)?;
        Ok(ctx.links)
    }

    /// Assigns `transform` as the entity's placement after verifying the
    /// chain cannot reach back to the entity.
    pub fn set_transform(&mut self, id: EntityId, transform: EntityId) -> Result<()> {
        let code = self.get(transform)?.type_code();
        if code != TransformMatrix::TYPE_CODE {
            return Err(Error::UnsupportedEntity(code));
        }
        let mut current = Some(transform);
        let mut depth = 0;
        while let Some(t) = current {
            if t == id {
                return Err(Error::CyclicDependency);
            }
            current = self.get(t)?.core().transform();
            depth += 1;
            if depth > self.slots.len() {
                return Err(Error::CyclicDependency);
            }
        }
        self.add_child(id, transform, Dependency::None)?;
        self.get_mut(id)?.core_mut().transform = Some(transform);
        Ok(())
    }

    /// The effective placement of an entity: the composition of its
    /// transform chain from the root down.
    pub fn effective_transform(&self, id: EntityId) -> Result<Xform> {
        let mut chain = Vec::new();
        let mut current = self.get(id)?.core().transform();
        while let Some(t) = current {
            chain.push(t);
            current = self.get(t)?.core().transform();
            if chain.len() > self.slots.len() {
                return Err(Error::CyclicDependency);
            }
        }
        let mut xform = Xform::identity();
        for &t in chain.iter().rev() {
            let matrix = self
                .get_as::<TransformMatrix>(t)
                .ok_or(Error::UnresolvedReference(t.0))?;
            xform = xform.compose(&matrix.xform());
        }
        Ok(xform)
    }

    /// Applies the entity's effective placement to a point.
    pub fn transform_point(&self, id: EntityId, p: Point3) -> Result<Point3> {
        Ok(self.effective_transform(id)?.apply(p))
    }

    /// Applies a model-wide length scale.
    ///
    /// Runs strictly after association so that the parameter-space curve
    /// under each curve-on-surface entity (and the members of a composite
    /// standing in that position) can be exempted: parameter space does not
    /// scale with model space.
    pub fn rescale(&mut self, sf: f64) -> Result<()> {
        self.associate()?;
        let mut suppressed = FxHashSet::default();
        let mut stack: Vec<EntityId> = self
            .ids()
            .into_iter()
            .filter_map(|id| self.get(id).ok()?.b_pointer())
            .collect();
        while let Some(id) = stack.pop() {
            if suppressed.insert(id) {
                if let Ok(entity) = self.get(id) {
                    if entity.type_code() == CompositeCurve::TYPE_CODE {
                        stack.extend(entity.core().children().iter().copied());
                    }
                }
            }
        }
        for index in 0..self.slots.len() {
            if suppressed.contains(&EntityId(index)) {
                continue;
            }
            if let Some(entity) = &mut self.slots[index] {
                entity.rescale(sf);
            }
        }
        Ok(())
    }

    fn visit(&self, id: EntityId, visited: &mut [bool], order: &mut Vec<EntityId>) {
        let Some(Some(entity)) = self.slots.get(id.0) else {
            return;
        };
        if visited[id.0] {
            return;
        }
        visited[id.0] = true;
        for &child in entity.core().children() {
            self.visit(child, visited, order);
        }
        order.push(id);
    }

    /// Depth-first postorder over the graph: every child precedes every one
    /// of its referrers, stable with respect to table order.
    fn write_order(&self) -> Vec<EntityId> {
        let mut visited = vec![false; self.slots.len()];
        let mut order = Vec::new();
        for index in 0..self.slots.len() {
            self.visit(EntityId(index), &mut visited, &mut order);
        }
        order
    }

    /// Emits every entity as a DE/PD record pair, children before parents,
    /// with DE sequence numbers (two lines each) and PD line indices
    /// assigned in order.
    pub fn write_to_records<S: RecordSink>(&self, sink: &mut S) -> Result<()> {
        let order = self.write_order();
        debug!("write: sequencing {} entities", order.len());
        let xref = SeqMap(
            order
                .iter()
                .enumerate()
                .map(|(position, &id)| (id, 1 + 2 * position))
                .collect(),
        );
        let mut pd_cursor = 1;
        for &id in &order {
            let entity = self.get(id)?;
            let pd = entity.format(&xref)?;
            let line_count = pd.line_count();
            let core = entity.core();
            let mut de = core.de.clone();
            de.entity_type = entity.type_code();
            de.sequence = xref.seq(id);
            de.param_data = pd_cursor;
            de.param_line_count = line_count;
            de.transform = core.transform().map(|t| xref.seq(t)).unwrap_or(0);
            let encode = |raw: DeRef, resolved: Option<EntityId>| match resolved {
                Some(rid) => DeRef::Pointer(xref.seq(rid)),
                None => raw,
            };
            de.structure = encode(de.structure, core.structure);
            de.line_font = encode(de.line_font, core.line_font);
            de.level = encode(de.level, core.level);
            de.view = encode(de.view, core.view);
            de.label_display = encode(de.label_display, core.label_display);
            de.color = encode(de.color, core.color);
            pd_cursor += line_count;
            sink.put(RawEntity { de, pd })?;
        }
        Ok(())
    }
}

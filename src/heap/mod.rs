mod config;

pub use config::GcConfig;

use crate::{
    object::{Class, Environment, Function, HeapObject, Instance, List, Module, ObjectKind},
    string::IdentName,
    value::Value,
};
use std::collections::HashSet;
use tracing::debug;

/// Handle to an object on the heap. The version guards against reuse of a freed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    index: u32,
    version: u32,
}

impl ObjectRef {
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Young,
    Old,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Minor,
    Major,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub young_objects: usize,
    pub old_objects: usize,
    pub bytes_allocated: usize,
    pub minor_collections: usize,
    pub major_collections: usize,
    pub objects_freed: usize,
    pub objects_promoted: usize,
}

impl std::fmt::Display for HeapStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "young={} old={} bytes={} minor={} major={} freed={} promoted={}",
            self.young_objects,
            self.old_objects,
            self.bytes_allocated,
            self.minor_collections,
            self.major_collections,
            self.objects_freed,
            self.objects_promoted
        )
    }
}

/// Implemented by anything that holds references to heap objects.
pub trait Trace {
    fn trace(&self, tracer: &mut Tracer);
}

/// Collects the outgoing references of an object during marking.
#[derive(Debug, Default)]
pub struct Tracer {
    pending: Vec<ObjectRef>,
}

impl Tracer {
    pub fn mark(&mut self, handle: ObjectRef) {
        self.pending.push(handle);
    }

    pub fn mark_value(&mut self, value: &Value) {
        if let Value::Object(handle) = value {
            self.pending.push(*handle);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ObjectMeta {
    generation: Generation,
    age: u32,
    marked: bool,
    size: usize,
}

#[derive(Debug)]
struct Slot {
    object: Option<HeapObject>,
    version: u32,
    meta: ObjectMeta,
}

/// Generational mark and sweep heap.
///
/// Objects start in the young generation. A minor collection only marks and sweeps young
/// objects, using the remembered set for references held by old objects. Survivors age on
/// every minor collection and move to the old generation once they reach the promotion age.
/// Promotion never moves an object, so handles stay valid and identity is preserved.
///
/// Every mutation that can store a reference goes through the heap so the write barrier
/// can keep the remembered set precise.
#[derive(Debug)]
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    young: Vec<u32>,
    old: Vec<u32>,
    remembered: HashSet<u32>,
    config: GcConfig,
    bytes_allocated: usize,
    minors_since_major: u32,
    minor_collections: usize,
    major_collections: usize,
    objects_freed: usize,
    objects_promoted: usize,
}

impl std::default::Default for Heap {
    fn default() -> Self {
        Self::new(GcConfig::default())
    }
}

impl Heap {
    pub fn new(config: GcConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            young: Vec::new(),
            old: Vec::new(),
            remembered: HashSet::new(),
            config,
            bytes_allocated: 0,
            minors_since_major: 0,
            minor_collections: 0,
            major_collections: 0,
            objects_freed: 0,
            objects_promoted: 0,
        }
    }

    pub fn get_config(&self) -> &GcConfig {
        &self.config
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            young_objects: self.young.len(),
            old_objects: self.old.len(),
            bytes_allocated: self.bytes_allocated,
            minor_collections: self.minor_collections,
            major_collections: self.major_collections,
            objects_freed: self.objects_freed,
            objects_promoted: self.objects_promoted,
        }
    }

    /// Number of live objects across both generations.
    pub fn len(&self) -> usize {
        self.young.len() + self.old.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Places an object in the young generation. Allocation never collects by itself;
    /// callers check [`Heap::should_collect`] first so they can supply their roots.
    pub fn allocate(&mut self, object: HeapObject) -> ObjectRef {
        let size = object.approximate_size();
        let meta = ObjectMeta {
            generation: Generation::Young,
            age: 0,
            marked: false,
            size,
        };
        self.bytes_allocated += size;

        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                slot.meta = meta;
                index
            }
            None => {
                self.slots.push(Slot {
                    object: Some(object),
                    version: 0,
                    meta,
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.young.push(index);

        ObjectRef {
            index,
            version: self.slots[index as usize].version,
        }
    }

    pub fn contains(&self, handle: ObjectRef) -> bool {
        self.live_slot(handle).is_some()
    }

    pub fn get(&self, handle: ObjectRef) -> Option<&HeapObject> {
        self.live_slot(handle)?.object.as_ref()
    }

    pub fn get_kind(&self, handle: ObjectRef) -> Option<ObjectKind> {
        self.get(handle).map(HeapObject::kind)
    }

    pub fn get_generation(&self, handle: ObjectRef) -> Option<Generation> {
        Some(self.live_slot(handle)?.meta.generation)
    }

    pub fn get_age(&self, handle: ObjectRef) -> Option<u32> {
        Some(self.live_slot(handle)?.meta.age)
    }

    pub fn is_remembered(&self, handle: ObjectRef) -> bool {
        self.contains(handle) && self.remembered.contains(&handle.index)
    }

    fn live_slot(&self, handle: ObjectRef) -> Option<&Slot> {
        let slot = self.slots.get(handle.index as usize)?;
        (slot.version == handle.version && slot.object.is_some()).then_some(slot)
    }

    fn live_slot_mut(&mut self, handle: ObjectRef) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        (slot.version == handle.version && slot.object.is_some()).then_some(slot)
    }

    fn get_mut(&mut self, handle: ObjectRef) -> Option<&mut HeapObject> {
        self.live_slot_mut(handle)?.object.as_mut()
    }
}

// Typed accessors
impl Heap {
    pub fn get_function(&self, handle: ObjectRef) -> Option<&Function> {
        match self.get(handle)? {
            HeapObject::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn get_class(&self, handle: ObjectRef) -> Option<&Class> {
        match self.get(handle)? {
            HeapObject::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn get_instance(&self, handle: ObjectRef) -> Option<&Instance> {
        match self.get(handle)? {
            HeapObject::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn get_list(&self, handle: ObjectRef) -> Option<&List> {
        match self.get(handle)? {
            HeapObject::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn get_module(&self, handle: ObjectRef) -> Option<&Module> {
        match self.get(handle)? {
            HeapObject::Module(module) => Some(module),
            _ => None,
        }
    }

    pub fn get_environment(&self, handle: ObjectRef) -> Option<&Environment> {
        match self.get(handle)? {
            HeapObject::Environment(environment) => Some(environment),
            _ => None,
        }
    }

    /// Looks up a method on a class, walking up the superclass chain.
    pub fn find_method(&self, class: ObjectRef, name: &str) -> Option<ObjectRef> {
        let mut current = Some(class);
        while let Some(handle) = current {
            let class = self.get_class(handle)?;
            if let Some(method) = class.methods.get(name) {
                return Some(*method);
            }
            current = class.superclass;
        }
        None
    }
}

// Mutation through the write barrier
impl Heap {
    /// Records `owner` in the remembered set when an old object starts pointing at a young one.
    fn write_barrier(&mut self, owner: ObjectRef, value: &Value) {
        let Value::Object(target) = value else {
            return;
        };
        let owner_is_old = self.get_generation(owner) == Some(Generation::Old);
        if owner_is_old && self.get_generation(*target) == Some(Generation::Young) {
            self.remembered.insert(owner.index);
        }
    }

    /// Defines `name` in the given scope, shadowing any outer binding.
    pub fn define(&mut self, environment: ObjectRef, name: &str, value: Value) -> bool {
        self.write_barrier(environment, &value);
        match self.get_mut(environment) {
            Some(HeapObject::Environment(scope)) => {
                scope.values.insert(IdentName::from(name), value);
                true
            }
            _ => false,
        }
    }

    /// Assigns to the nearest scope that defines `name`. Returns false if none does.
    pub fn assign(&mut self, environment: ObjectRef, name: &str, value: Value) -> bool {
        let mut current = Some(environment);
        while let Some(handle) = current {
            let Some(scope) = self.get_environment(handle) else {
                return false;
            };
            if scope.values.contains_key(name) {
                self.write_barrier(handle, &value);
                if let Some(HeapObject::Environment(scope)) = self.get_mut(handle) {
                    if let Some(slot) = scope.values.get_mut(name) {
                        *slot = value;
                    }
                }
                return true;
            }
            current = scope.parent;
        }
        false
    }

    /// Reads `name` from the nearest scope that defines it.
    pub fn lookup(&self, environment: ObjectRef, name: &str) -> Option<Value> {
        let mut current = Some(environment);
        while let Some(handle) = current {
            let scope = self.get_environment(handle)?;
            if let Some(value) = scope.values.get(name) {
                return Some(value.clone());
            }
            current = scope.parent;
        }
        None
    }

    pub fn set_field(&mut self, instance: ObjectRef, name: &str, value: Value) -> bool {
        self.write_barrier(instance, &value);
        match self.get_mut(instance) {
            Some(HeapObject::Instance(instance)) => {
                instance.fields.insert(IdentName::from(name), value);
                true
            }
            _ => false,
        }
    }

    /// Overwrites an existing list element. Returns false if the index is out of range.
    pub fn set_element(&mut self, list: ObjectRef, index: usize, value: Value) -> bool {
        self.write_barrier(list, &value);
        match self.get_mut(list) {
            Some(HeapObject::List(list)) => match list.elements.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn push_element(&mut self, list: ObjectRef, value: Value) -> bool {
        self.write_barrier(list, &value);
        match self.get_mut(list) {
            Some(HeapObject::List(list)) => {
                list.elements.push(value);
                true
            }
            _ => false,
        }
    }
}

// Collection
impl Heap {
    /// Whether the young generation has reached its threshold.
    pub fn should_collect(&self) -> bool {
        self.young.len() >= self.config.young_threshold
    }

    /// The kind of collection [`Heap::collect`] would run next.
    pub fn next_collection_kind(&self) -> CollectionKind {
        if self.minors_since_major >= self.config.major_every
            || self.old.len() >= self.config.old_threshold
        {
            CollectionKind::Major
        } else {
            CollectionKind::Minor
        }
    }

    /// Runs a minor collection, or a major one when enough minors have happened or the old
    /// generation is over its threshold.
    pub fn collect(&mut self, roots: &[ObjectRef]) -> CollectionKind {
        let kind = self.next_collection_kind();
        match kind {
            CollectionKind::Minor => self.collect_minor(roots),
            CollectionKind::Major => self.collect_major(roots),
        }
        kind
    }

    pub fn collect_minor(&mut self, roots: &[ObjectRef]) {
        debug!(
            young = self.young.len(),
            old = self.old.len(),
            bytes = self.bytes_allocated,
            "minor collection started"
        );
        let before = self.len();

        for &index in self.young.iter() {
            self.slots[index as usize].meta.marked = false;
        }

        let mut tracer = Tracer::default();
        roots.iter().for_each(|&root| tracer.mark(root));
        for &index in self.remembered.iter() {
            if let Some(object) = &self.slots[index as usize].object {
                object.trace(&mut tracer);
            }
        }
        self.drain(tracer, true);

        // Promote survivors before sweeping
        let promotion_age = self.config.promotion_age;
        let mut promoted = Vec::new();
        let mut survivors = Vec::with_capacity(self.young.len());
        let mut dead = Vec::new();
        for &index in self.young.iter() {
            let meta = &mut self.slots[index as usize].meta;
            if !meta.marked {
                dead.push(index);
                continue;
            }
            meta.age += 1;
            if meta.age >= promotion_age {
                meta.generation = Generation::Old;
                meta.age = 0;
                promoted.push(index);
            } else {
                survivors.push(index);
            }
        }
        self.young = survivors;
        self.old.extend(promoted.iter().copied());

        for index in dead.iter().copied() {
            self.free_slot(index);
        }

        // Promoted objects may still point into the young generation
        let candidates: Vec<u32> = self
            .remembered
            .iter()
            .copied()
            .chain(promoted.iter().copied())
            .collect();
        self.remembered = candidates
            .into_iter()
            .filter(|&index| self.has_young_children(index))
            .collect();

        self.minors_since_major += 1;
        self.minor_collections += 1;
        self.objects_promoted += promoted.len();
        debug!(
            freed = before - self.len(),
            promoted = promoted.len(),
            young = self.young.len(),
            old = self.old.len(),
            bytes = self.bytes_allocated,
            "minor collection finished"
        );
    }

    pub fn collect_major(&mut self, roots: &[ObjectRef]) {
        debug!(
            young = self.young.len(),
            old = self.old.len(),
            bytes = self.bytes_allocated,
            "major collection started"
        );
        let before = self.len();

        for slot in self.slots.iter_mut() {
            slot.meta.marked = false;
        }

        let mut tracer = Tracer::default();
        roots.iter().for_each(|&root| tracer.mark(root));
        self.drain(tracer, false);

        let slots = &self.slots;
        let (young, dead_young): (Vec<u32>, Vec<u32>) = self
            .young
            .iter()
            .partition(|&&index| slots[index as usize].meta.marked);
        let (old, dead_old): (Vec<u32>, Vec<u32>) = self
            .old
            .iter()
            .partition(|&&index| slots[index as usize].meta.marked);
        self.young = young;
        self.old = old;
        for index in dead_young.into_iter().chain(dead_old) {
            self.free_slot(index);
        }

        let remembered: HashSet<u32> = self
            .old
            .iter()
            .copied()
            .filter(|&index| self.has_young_children(index))
            .collect();
        self.remembered = remembered;

        self.minors_since_major = 0;
        self.major_collections += 1;
        debug!(
            freed = before - self.len(),
            young = self.young.len(),
            old = self.old.len(),
            bytes = self.bytes_allocated,
            "major collection finished"
        );
    }

    /// Marks everything reachable from the tracer's pending references. A minor collection
    /// never descends into old objects.
    fn drain(&mut self, mut tracer: Tracer, young_only: bool) {
        while let Some(handle) = tracer.pending.pop() {
            let Some(slot) = self.live_slot_mut(handle) else {
                continue;
            };
            if slot.meta.marked || (young_only && slot.meta.generation == Generation::Old) {
                continue;
            }
            slot.meta.marked = true;
            if let Some(object) = &slot.object {
                object.trace(&mut tracer);
            }
        }
    }

    fn has_young_children(&self, index: u32) -> bool {
        let Some(object) = &self.slots[index as usize].object else {
            return false;
        };
        let mut tracer = Tracer::default();
        object.trace(&mut tracer);
        tracer
            .pending
            .iter()
            .any(|&child| self.get_generation(child) == Some(Generation::Young))
    }

    fn free_slot(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        if slot.object.take().is_some() {
            self.bytes_allocated = self.bytes_allocated.saturating_sub(slot.meta.size);
            slot.version = slot.version.wrapping_add(1);
            slot.meta.marked = false;
            self.free.push(index);
            self.remembered.remove(&index);
            self.objects_freed += 1;
        }
    }
}

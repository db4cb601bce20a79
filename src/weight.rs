//! Dense, index-keyed weight storage.
//!
//! The source this crate was distilled from hand-duplicates this container once per primitive
//! width (`u8`/`u16`/.../`bool`/`char`) plus once more for reference types. Rust lets us collapse
//! all of those into one generic [`Weights<T>`]: the storage layout is a flat `Vec<T>` regardless
//! of `T`, and [`funty`]'s marker traits are enough to express "this works especially well for the
//! primitive fast path" in the type signature of callers that want it, without a parallel class
//! hierarchy.
use alloc::{boxed::Box, vec::Vec};
use core::any::Any;

use core::hash::Hash;

use error_stack::report;
use indexmap::IndexMap;

use crate::error::{GraphError, GraphResult};

/// Dense, index-keyed weight storage that grows and shrinks in lockstep with an [`IndexSet`].
///
/// [`IndexSet`]: crate::index_set::IndexSet
#[derive(Debug, Clone)]
pub struct Weights<T> {
    values: Vec<T>,
    default: T,
}

impl<T> Weights<T>
where
    T: Clone,
{
    /// Creates an empty weights container with the given default value.
    ///
    /// `default` is returned by [`Self::get`] for any in-range index never explicitly [`Self::set`]
    /// and is used to fill slots created by [`Self::append`].
    #[must_use]
    pub fn new(default: T) -> Self {
        Self {
            values: Vec::new(),
            default,
        }
    }

    /// Creates an empty weights container with storage reserved for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize, default: T) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            default,
        }
    }

    /// The default value handed out for never-set slots.
    #[must_use]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// The number of entries, tracking the owning index set's size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether this container currently has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds. Backends are expected to validate liveness (returning
    /// `GraphError::NoSuchVertex`/`NoSuchEdge`) before reaching into the weight container.
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        &self.values[index]
    }

    /// Returns a mutable reference to the value at `index`.
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        &mut self.values[index]
    }

    /// Overwrites the value at `index`.
    pub fn set(&mut self, index: usize, value: T) {
        self.values[index] = value;
    }

    /// Extends the container by one slot, filled with the default value.
    pub fn append(&mut self) {
        self.values.push(self.default.clone());
    }

    /// Mirrors an [`IndexSet::swap_remove`] on the owning index set: copies the value at `last`
    /// into `index`, then truncates.
    ///
    /// [`IndexSet::swap_remove`]: crate::index_set::IndexSet::swap_remove
    pub fn swap_remove(&mut self, index: usize, last: usize) {
        if index != last {
            self.values[index] = self.values[last].clone();
        }
        self.values.truncate(last);
    }

    /// Iterates the values in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Blanket-implemented marker for the primitive fast path (`u8..=u128`, `i8..=i128`, `f32`/`f64`,
/// `bool`, `char`).
///
/// `Weights<T>` never needs this bound — it works for any `Clone` `T` — but algorithms that want to
/// assume a cheap, `Copy`, branchless weight type (for SIMD-friendly reductions, for example) can
/// bound their own generics on `PrimitiveWeight` instead of re-deriving a `Fundamental` bound at
/// every call site.
pub trait PrimitiveWeight: funty::Fundamental + Default {}

impl<T> PrimitiveWeight for T where T: funty::Fundamental + Default {}

/// Type-erased storage shared by every entry of a [`WeightRegistry`], regardless of its value
/// type.
///
/// This is the same shape of problem `http::Extensions` or a `bevy` component store solves: a map
/// from a key to a value whose concrete type is only known at the call site, not at the
/// collection's definition site.
trait ErasedWeights: Any {
    fn append_default(&mut self);
    fn swap_remove(&mut self, index: usize, last: usize);
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> ErasedWeights for Weights<T>
where
    T: Clone + 'static,
{
    fn append_default(&mut self) {
        self.append();
    }

    fn swap_remove(&mut self, index: usize, last: usize) {
        Weights::swap_remove(self, index, last);
    }

    fn len(&self) -> usize {
        Weights::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A map of named, dynamically-typed [`Weights`] containers attached to a graph's vertex (or
/// edge) index space.
///
/// This is the backing store for the builder's `addVerticesWeights(key, type, default)` /
/// `addEdgesWeights(key, type, default)` operations and the graph-level `verticesWeights(key)` /
/// `edgesWeights(key)` accessors (§4.6, §6): a graph's *built-in* `VertexWeight`/`EdgeWeight` is a
/// single [`Weights<T>`], but callers may additionally attach any number of further named weight
/// arrays, each with its own element type, looked up dynamically by key and downcast back to `T`
/// at the call site.
#[derive(Default)]
pub struct WeightRegistry<K> {
    entries: IndexMap<K, Box<dyn ErasedWeights>>,
}

impl<K> WeightRegistry<K>
where
    K: Eq + Hash,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Attaches a new, empty `Weights<T>` under `key`, sized to `len` entries (matching the
    /// owning index set's current size) filled with `default`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateWeightsKey`] if `key` is already registered.
    pub fn insert<T>(&mut self, key: K, len: usize, default: T) -> GraphResult<()>
    where
        T: Clone + 'static,
    {
        if self.entries.contains_key(&key) {
            return Err(report!(GraphError::DuplicateWeightsKey));
        }

        let mut weights = Weights::with_capacity(len, default);
        for _ in 0..len {
            weights.append();
        }

        self.entries.insert(key, Box::new(weights));
        Ok(())
    }

    /// Removes the weights container registered under `key`, if any.
    pub fn remove(&mut self, key: &K) {
        self.entries.shift_remove(key);
    }

    /// Whether a weights container is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Borrows the `Weights<T>` registered under `key`, if any and if `T` matches.
    #[must_use]
    pub fn get<T>(&self, key: &K) -> Option<&Weights<T>>
    where
        T: 'static,
    {
        self.entries
            .get(key)
            .and_then(|erased| erased.as_any().downcast_ref())
    }

    /// Mutably borrows the `Weights<T>` registered under `key`, if any and if `T` matches.
    pub fn get_mut<T>(&mut self, key: &K) -> Option<&mut Weights<T>>
    where
        T: 'static,
    {
        self.entries
            .get_mut(key)
            .and_then(|erased| erased.as_any_mut().downcast_mut())
    }

    /// Extends every registered container by one default-valued slot.
    ///
    /// Called once per `add_vertex`/`add_edge` so every container tracks the owning index set's
    /// length (invariant 6, §3).
    pub fn append_all(&mut self) {
        for erased in self.entries.values_mut() {
            erased.append_default();
        }
    }

    /// Mirrors a swap-remove across every registered container.
    pub fn swap_remove_all(&mut self, index: usize, last: usize) {
        for erased in self.entries.values_mut() {
            erased.swap_remove(index, last);
        }
    }

    /// Drops every registered container (used by [`Graph::clear`](crate::graph::Graph::clear)).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn never_set_slots_read_as_the_default() {
        let mut w = Weights::new(42i32);
        w.append();
        w.append();
        assert_eq!(*w.get(0), 42);
        assert_eq!(*w.get(1), 42);
    }

    #[test]
    fn set_overwrites_a_single_slot() {
        let mut w = Weights::new(0u8);
        w.append();
        w.append();
        w.set(1, 9);
        assert_eq!(*w.get(0), 0);
        assert_eq!(*w.get(1), 9);
    }

    /// §3 "on swap-remove of index k and last index L, value at L moves to k".
    #[test]
    fn swap_remove_moves_the_last_value_into_the_removed_slot() {
        let mut w = Weights::new(0i32);
        for v in [10, 20, 30] {
            w.append();
            let last = w.len() - 1;
            w.set(last, v);
        }
        w.swap_remove(0, 2);
        assert_eq!(w.len(), 2);
        assert_eq!(*w.get(0), 30);
        assert_eq!(*w.get(1), 20);
    }

    #[test]
    fn swap_remove_of_the_last_slot_just_truncates() {
        let mut w = Weights::new(0i32);
        w.append();
        w.append();
        w.set(1, 77);
        w.swap_remove(1, 1);
        assert_eq!(w.len(), 1);
        assert_eq!(*w.get(0), 0);
    }

    #[test]
    fn registry_rejects_a_duplicate_key() {
        let mut registry: WeightRegistry<String> = WeightRegistry::new();
        registry.insert(String::from("label"), 0, 0i32).unwrap();
        let err = registry.insert(String::from("label"), 0, 0i32);
        assert!(err.is_err());
    }

    #[test]
    fn registry_downcast_fails_for_the_wrong_type() {
        let mut registry: WeightRegistry<String> = WeightRegistry::new();
        registry.insert(String::from("label"), 0, 0i32).unwrap();
        assert!(registry.get::<u8>(&String::from("label")).is_none());
        assert!(registry.get::<i32>(&String::from("label")).is_some());
    }

    #[test]
    fn append_all_and_swap_remove_all_track_the_owning_index_set() {
        let mut registry: WeightRegistry<String> = WeightRegistry::new();
        registry.insert(String::from("a"), 0, 0i32).unwrap();
        registry.insert(String::from("b"), 0, String::from("x")).unwrap();

        registry.append_all();
        registry.append_all();
        assert_eq!(registry.get::<i32>(&String::from("a")).unwrap().len(), 2);

        registry.swap_remove_all(0, 1);
        assert_eq!(registry.get::<i32>(&String::from("a")).unwrap().len(), 1);
    }
}

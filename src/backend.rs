//! The tagged union over the three mutable backends (§4.4, §9).
//!
//! `TopologyStore` isn't object-safe (its `new`/`with_capacity` return `Self`), so a
//! [`Factory`](crate::factory::Factory) that wants to hand back "one of array/hashmap/linked,
//! chosen at runtime by a hint" can't return `Box<dyn TopologyStore>`. A closed tagged enum with a
//! hand-written delegating `impl TopologyStore` gets the same runtime choice back, at the cost of
//! one match per call instead of a vtable indirection — the same trade `petgraph_graphmap` makes
//! with its `GraphMap<Directed>`/`GraphMap<Undirected>` split, just with three arms instead of two.

use alloc::vec::Vec;

use crate::{
    capability::Capabilities,
    error::GraphResult,
    index::{EdgeIndex, VertexIndex},
    storage::{array::ArrayStore, hashmap::HashMapStore, linked::LinkedStore, TopologyStore},
};

/// Which concrete adjacency layout a [`Backend`] currently wraps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// [`ArrayStore`]: the best all-round default (§4.4.a).
    Array,
    /// [`HashMapStore`]: expected-O(1) `get_edge` at the cost of per-vertex hashing overhead
    /// (§4.4.c).
    HashMap,
    /// [`LinkedStore`]: cheap `move_edge`/`reverse_edge` via intrusive list surgery (§4.4.b).
    Linked,
}

/// A runtime choice of mutable adjacency backend, dispatched by a single tag check per call.
pub enum Backend<V, E> {
    Array(ArrayStore<V, E>),
    HashMap(HashMapStore<V, E>),
    Linked(LinkedStore<V, E>),
}

impl<V, E> Backend<V, E>
where
    V: Clone + Default,
    E: Clone + Default,
{
    /// Builds an empty backend of the requested kind.
    #[must_use]
    pub fn of_kind(kind: BackendKind, capabilities: Capabilities) -> Self {
        match kind {
            BackendKind::Array => Self::Array(ArrayStore::new(capabilities)),
            BackendKind::HashMap => Self::HashMap(HashMapStore::new(capabilities)),
            BackendKind::Linked => Self::Linked(LinkedStore::new(capabilities)),
        }
    }

    /// Builds an empty backend of the requested kind with reserved capacity.
    #[must_use]
    pub fn of_kind_with_capacity(
        kind: BackendKind,
        capabilities: Capabilities,
        vertices: usize,
        edges: usize,
    ) -> Self {
        match kind {
            BackendKind::Array => Self::Array(ArrayStore::with_capacity(capabilities, vertices, edges)),
            BackendKind::HashMap => {
                Self::HashMap(HashMapStore::with_capacity(capabilities, vertices, edges))
            }
            BackendKind::Linked => Self::Linked(LinkedStore::with_capacity(capabilities, vertices, edges)),
        }
    }

    /// The kind of backend currently in use.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Array(_) => BackendKind::Array,
            Self::HashMap(_) => BackendKind::HashMap,
            Self::Linked(_) => BackendKind::Linked,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            Self::Array(store) => store.$method($($arg),*),
            Self::HashMap(store) => store.$method($($arg),*),
            Self::Linked(store) => store.$method($($arg),*),
        }
    };
}

impl<V, E> TopologyStore for Backend<V, E>
where
    V: Clone + Default,
    E: Clone + Default,
{
    type VertexWeight = V;
    type EdgeWeight = E;

    /// Defaults to the array backend. Callers that want a specific backend use
    /// [`Backend::of_kind`] instead — this trait-level constructor only exists so generic code
    /// written against `B: TopologyStore` also compiles when instantiated with `Backend<V, E>`.
    fn new(capabilities: Capabilities) -> Self {
        Self::of_kind(BackendKind::Array, capabilities)
    }

    fn with_capacity(capabilities: Capabilities, vertices: usize, edges: usize) -> Self {
        Self::of_kind_with_capacity(BackendKind::Array, capabilities, vertices, edges)
    }

    fn capabilities(&self) -> Capabilities {
        dispatch!(self, capabilities())
    }

    fn num_vertices(&self) -> usize {
        dispatch!(self, num_vertices())
    }

    fn num_edges(&self) -> usize {
        dispatch!(self, num_edges())
    }

    fn source(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        dispatch!(self, source(edge))
    }

    fn target(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        dispatch!(self, target(edge))
    }

    fn endpoint(&self, edge: EdgeIndex, vertex: VertexIndex) -> GraphResult<VertexIndex> {
        dispatch!(self, endpoint(edge, vertex))
    }

    fn out_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        dispatch!(self, out_edges(vertex))
    }

    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        dispatch!(self, in_edges(vertex))
    }

    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>> {
        dispatch!(self, get_edge(u, v))
    }

    fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        dispatch!(self, get_edges(u, v))
    }

    fn add_vertex(&mut self, weight: Self::VertexWeight) -> GraphResult<VertexIndex> {
        dispatch!(self, add_vertex(weight))
    }

    fn remove_vertex(&mut self, vertex: VertexIndex) -> GraphResult<Self::VertexWeight> {
        dispatch!(self, remove_vertex(vertex))
    }

    fn add_edge(
        &mut self,
        u: VertexIndex,
        v: VertexIndex,
        weight: Self::EdgeWeight,
    ) -> GraphResult<EdgeIndex> {
        dispatch!(self, add_edge(u, v, weight))
    }

    fn remove_edge(&mut self, edge: EdgeIndex) -> GraphResult<Self::EdgeWeight> {
        dispatch!(self, remove_edge(edge))
    }

    fn move_edge(
        &mut self,
        edge: EdgeIndex,
        new_source: VertexIndex,
        new_target: VertexIndex,
    ) -> GraphResult<()> {
        dispatch!(self, move_edge(edge, new_source, new_target))
    }

    fn reverse_edge(&mut self, edge: EdgeIndex) -> GraphResult<()> {
        dispatch!(self, reverse_edge(edge))
    }

    fn clear(&mut self) {
        match self {
            Self::Array(store) => store.clear(),
            Self::HashMap(store) => store.clear(),
            Self::Linked(store) => store.clear(),
        }
    }

    fn clear_edges(&mut self) {
        match self {
            Self::Array(store) => store.clear_edges(),
            Self::HashMap(store) => store.clear_edges(),
            Self::Linked(store) => store.clear_edges(),
        }
    }

    fn vertex_weight(&self, vertex: VertexIndex) -> GraphResult<&Self::VertexWeight> {
        dispatch!(self, vertex_weight(vertex))
    }

    fn vertex_weight_mut(&mut self, vertex: VertexIndex) -> GraphResult<&mut Self::VertexWeight> {
        dispatch!(self, vertex_weight_mut(vertex))
    }

    fn edge_weight(&self, edge: EdgeIndex) -> GraphResult<&Self::EdgeWeight> {
        dispatch!(self, edge_weight(edge))
    }

    fn edge_weight_mut(&mut self, edge: EdgeIndex) -> GraphResult<&mut Self::EdgeWeight> {
        dispatch!(self, edge_weight_mut(edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directed() -> Capabilities {
        Capabilities::new(true, false, false)
    }

    #[test]
    fn of_kind_picks_the_requested_variant() {
        let array: Backend<(), ()> = Backend::of_kind(BackendKind::Array, directed());
        let hashmap: Backend<(), ()> = Backend::of_kind(BackendKind::HashMap, directed());
        let linked: Backend<(), ()> = Backend::of_kind(BackendKind::Linked, directed());
        assert_eq!(array.kind(), BackendKind::Array);
        assert_eq!(hashmap.kind(), BackendKind::HashMap);
        assert_eq!(linked.kind(), BackendKind::Linked);
    }

    /// Every variant must answer identically to the same sequence of topology calls, since
    /// `Backend` is just a dispatch shim over one of the three concrete stores (§9).
    #[test]
    fn every_variant_agrees_on_the_same_topology() {
        for kind in [BackendKind::Array, BackendKind::HashMap, BackendKind::Linked] {
            let mut backend: Backend<(), ()> = Backend::of_kind(kind, directed());
            let v0 = backend.add_vertex(()).unwrap();
            let v1 = backend.add_vertex(()).unwrap();
            let e0 = backend.add_edge(v0, v1, ()).unwrap();

            assert_eq!(backend.num_vertices(), 2);
            assert_eq!(backend.source(e0).unwrap(), v0);
            assert_eq!(backend.target(e0).unwrap(), v1);
            assert_eq!(backend.get_edge(v0, v1).unwrap(), Some(e0));
            assert_eq!(backend.get_edge(v1, v0).unwrap(), None);
        }
    }
}

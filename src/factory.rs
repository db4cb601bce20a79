//! The graph construction entry point (§6: `Factory`).
//!
//! A [`Factory`] fixes a [`Capabilities`] record once, then hands out empty backends, builders,
//! or copies of an existing graph, all sharing that record. Picking *which* mutable backend a
//! bare `new_graph`/`new_builder` call gets is driven by [`Hint`]s rather than spelled out by the
//! caller — the same "advisory, not binding" hint contract [`BackendKind`] documents.

use alloc::vec::Vec;

use crate::{
    backend::{Backend, BackendKind},
    builder::Builder,
    capability::{Capabilities, Hint},
    error::GraphResult,
    index::{EdgeIndex, VertexIndex},
    storage::TopologyStore,
};

/// Builds up a [`Capabilities`] record and a set of [`Hint`]s, then constructs graphs/builders
/// against them (§6).
#[derive(Debug, Clone)]
pub struct Factory {
    directed: bool,
    self_edges: bool,
    parallel_edges: bool,
    hints: Vec<Hint>,
}

impl Factory {
    /// A factory targeting directed graphs.
    #[must_use]
    pub fn directed() -> Self {
        Self::new(true)
    }

    /// A factory targeting undirected graphs.
    #[must_use]
    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// A factory targeting directed or undirected graphs, matching `directed`. Self-edges and
    /// parallel edges are allowed by default until [`Self::allow_self_edges`]/
    /// [`Self::allow_parallel_edges`] say otherwise.
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            self_edges: true,
            parallel_edges: true,
            hints: Vec::new(),
        }
    }

    /// Sets whether self-edges are allowed.
    #[must_use]
    pub fn allow_self_edges(mut self, allow: bool) -> Self {
        self.self_edges = allow;
        self
    }

    /// Sets whether parallel edges are allowed.
    #[must_use]
    pub fn allow_parallel_edges(mut self, allow: bool) -> Self {
        self.parallel_edges = allow;
        self
    }

    /// Adds a non-binding performance hint (§4.4, `Hint`) the factory may use to pick a default
    /// backend. Hints are tried in the order added; the first one that names a concrete backend
    /// wins.
    #[must_use]
    pub fn add_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }

    /// The capability record this factory has accumulated.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(self.directed, self.self_edges, self.parallel_edges)
    }

    fn backend_kind(&self) -> BackendKind {
        for hint in &self.hints {
            match hint {
                Hint::FastEdgeRemoval => return BackendKind::Linked,
                Hint::FastEdgeLookup => return BackendKind::HashMap,
                Hint::DenseGraph => return BackendKind::Array,
            }
        }
        BackendKind::Array
    }

    /// Builds an empty mutable backend, choosing among array/hashmap/linked per the accumulated
    /// hints (§6: `newGraph()`).
    #[must_use]
    pub fn new_graph<V, E>(&self) -> Backend<V, E>
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        Backend::of_kind(self.backend_kind(), self.capabilities())
    }

    /// Builds a fresh mutable backend populated from `source`, optionally carrying over its
    /// built-in vertex/edge weights (§6: `newCopyOf(graph, copyVertexWeights, copyEdgeWeights)`).
    /// Vertices and edges are copied in `source`'s own enumeration order; uncopied weights are
    /// filled with `Default::default()`.
    pub fn new_copy_of<S, V, E>(
        &self,
        source: &S,
        copy_vertex_weights: bool,
        copy_edge_weights: bool,
    ) -> GraphResult<Backend<V, E>>
    where
        S: TopologyStore<VertexWeight = V, EdgeWeight = E>,
        V: Clone + Default,
        E: Clone + Default,
    {
        let mut backend = Backend::of_kind_with_capacity(
            self.backend_kind(),
            self.capabilities(),
            source.num_vertices(),
            source.num_edges(),
        );

        for index in source.vertices() {
            let vertex = VertexIndex::new(index);
            let weight = if copy_vertex_weights {
                source.vertex_weight(vertex)?.clone()
            } else {
                V::default()
            };
            backend.add_vertex(weight)?;
        }

        for index in source.edges() {
            let edge = EdgeIndex::new(index);
            let (u, v) = (source.source(edge)?, source.target(edge)?);
            let weight = if copy_edge_weights {
                source.edge_weight(edge)?.clone()
            } else {
                E::default()
            };
            backend.add_edge(u, v, weight)?;
        }

        Ok(backend)
    }

    /// Starts an empty [`Builder`] against this factory's accumulated capability record (§6:
    /// `newBuilder()`).
    #[must_use]
    pub fn new_builder<V, E>(&self) -> Builder<V, E> {
        Builder::new(self.capabilities())
    }

    /// Starts a [`Builder`] pre-staged with every vertex and edge of `source`, optionally carrying
    /// over its built-in weights (§6: `newBuilderCopyOf(graph, …)`).
    pub fn new_builder_copy_of<S, V, E>(
        &self,
        source: &S,
        copy_vertex_weights: bool,
        copy_edge_weights: bool,
    ) -> GraphResult<Builder<V, E>>
    where
        S: TopologyStore<VertexWeight = V, EdgeWeight = E>,
        V: Clone + Default,
        E: Clone + Default,
    {
        let mut builder = Builder::new(self.capabilities());

        for index in source.vertices() {
            let vertex = VertexIndex::new(index);
            let weight = if copy_vertex_weights {
                source.vertex_weight(vertex)?.clone()
            } else {
                V::default()
            };
            builder.add_vertex(weight);
        }

        for index in source.edges() {
            let edge = EdgeIndex::new(index);
            let (u, v) = (source.source(edge)?, source.target(edge)?);
            let weight = if copy_edge_weights {
                source.edge_weight(edge)?.clone()
            } else {
                E::default()
            };
            builder.add_edge(u, v, weight);
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_select_the_expected_backend() {
        let factory = Factory::directed().add_hint(Hint::FastEdgeLookup);
        let graph: Backend<(), ()> = factory.new_graph();
        assert_eq!(graph.kind(), BackendKind::HashMap);

        let factory = Factory::directed().add_hint(Hint::FastEdgeRemoval);
        let graph: Backend<(), ()> = factory.new_graph();
        assert_eq!(graph.kind(), BackendKind::Linked);

        let factory = Factory::directed();
        let graph: Backend<(), ()> = factory.new_graph();
        assert_eq!(graph.kind(), BackendKind::Array);
    }

    #[test]
    fn new_copy_of_preserves_topology_and_weights() {
        let factory = Factory::undirected();
        let mut original: Backend<i32, i32> = factory.new_graph();
        original.add_vertex(10).unwrap();
        original.add_vertex(20).unwrap();
        original
            .add_edge(VertexIndex::new(0), VertexIndex::new(1), 99)
            .unwrap();

        let copy = factory.new_copy_of(&original, true, true).unwrap();
        assert_eq!(copy.num_vertices(), 2);
        assert_eq!(copy.num_edges(), 1);
        assert_eq!(*copy.vertex_weight(VertexIndex::new(0)).unwrap(), 10);
        assert_eq!(*copy.edge_weight(EdgeIndex::new(0)).unwrap(), 99);

        let blank_copy = factory.new_copy_of(&original, false, false).unwrap();
        assert_eq!(*blank_copy.vertex_weight(VertexIndex::new(0)).unwrap(), 0);
        assert_eq!(*blank_copy.edge_weight(EdgeIndex::new(0)).unwrap(), 0);
    }
}

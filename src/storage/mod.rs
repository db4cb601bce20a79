//! The uniform topology contract every mutable backend implements (§4.4).
//!
//! [`TopologyStore`] is this crate's analogue of `petgraph_core::storage::GraphStorage`: a single
//! trait, implemented directly by each concrete backend (no inheritance chain), that the
//! [`Builder`](crate::builder::Builder) and [`MaskedSubgraphView`](crate::mask::MaskedSubgraphView)
//! are written generically against.

pub mod array;
pub mod hashmap;
pub mod linked;

use alloc::vec::Vec;

use crate::{
    capability::Capabilities,
    error::GraphResult,
    index::{EdgeDirection, EdgeIndex, VertexIndex},
    weight::Weights,
};

/// The core trait every adjacency backend implements.
///
/// A `TopologyStore` owns every array backing a live graph: the vertex and edge index spaces, the
/// endpoints table, the per-vertex adjacency structure, and the built-in vertex/edge weight
/// arrays. It does not own the [`WeightRegistry`](crate::weight::WeightRegistry) side-tables or the
/// [`IdIndexMap`](crate::id::IdIndexMap) bridge — those are composed on top by
/// [`Graph`](crate::graph::Graph), same as `petgraph_core` layers `Graph` on top of
/// `GraphStorage`.
pub trait TopologyStore: Sized {
    /// The weight attached to each vertex.
    type VertexWeight;
    /// The weight attached to each edge.
    type EdgeWeight;

    /// Creates an empty store with the given capability record.
    fn new(capabilities: Capabilities) -> Self;

    /// Creates an empty store with capacity reserved for `vertices` vertices and `edges` edges.
    fn with_capacity(capabilities: Capabilities, vertices: usize, edges: usize) -> Self;

    /// The capability record fixed at construction.
    fn capabilities(&self) -> Capabilities;

    /// Whether this store represents a directed graph.
    fn is_directed(&self) -> bool {
        self.capabilities().is_directed()
    }

    /// The number of live vertices, `n`.
    fn num_vertices(&self) -> usize;

    /// The number of live edges, `m`.
    fn num_edges(&self) -> usize;

    /// The live vertex indices, `0..n`.
    fn vertices(&self) -> core::ops::Range<usize> {
        0..self.num_vertices()
    }

    /// The live edge indices, `0..m`.
    fn edges(&self) -> core::ops::Range<usize> {
        0..self.num_edges()
    }

    /// The source endpoint of `edge`.
    fn source(&self, edge: EdgeIndex) -> GraphResult<VertexIndex>;

    /// The target endpoint of `edge`.
    fn target(&self, edge: EdgeIndex) -> GraphResult<VertexIndex>;

    /// The endpoint of `edge` opposite `vertex`.
    fn endpoint(&self, edge: EdgeIndex, vertex: VertexIndex) -> GraphResult<VertexIndex>;

    /// Edges for which `vertex` is the source (directed) or any incident edge (undirected).
    fn out_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>>;

    /// Edges for which `vertex` is the target (directed) or any incident edge (undirected).
    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>>;

    /// Every edge incident to `vertex`, each appearing exactly once (invariant 5, §3): the union
    /// of [`Self::out_edges`] and [`Self::in_edges`] for directed graphs, or simply
    /// [`Self::out_edges`] for undirected graphs, where the two coincide.
    fn incident_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        if !self.is_directed() {
            return self.out_edges(vertex);
        }

        let mut out = self.out_edges(vertex)?;
        let inn = self.in_edges(vertex)?;
        for edge in inn {
            if !out.contains(&edge) {
                out.push(edge);
            }
        }
        Ok(out)
    }

    /// A single edge between `u` and `v`, or `None`. Tie-break among parallel edges is
    /// unspecified.
    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>>;

    /// Every edge between `u` and `v` (empty, singleton, or multi when parallel edges exist).
    fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>>;

    /// Adds a new vertex, returning its index (`n` before the call).
    ///
    /// # Errors
    ///
    /// [`GraphError::ImmutableGraph`](crate::error::GraphError::ImmutableGraph) on an immutable
    /// backend.
    fn add_vertex(&mut self, weight: Self::VertexWeight) -> GraphResult<VertexIndex>;

    /// Removes `vertex`: first removes every incident edge (swap-remove), then swap-removes the
    /// vertex itself against the current last vertex.
    fn remove_vertex(&mut self, vertex: VertexIndex) -> GraphResult<Self::VertexWeight>;

    /// Adds a new edge `(u, v)`, returning its index (`m` before the call).
    ///
    /// # Errors
    ///
    /// - [`GraphError::NoSuchVertex`](crate::error::GraphError::NoSuchVertex) if either endpoint
    ///   is not live.
    /// - [`GraphError::SelfEdgeViolation`](crate::error::GraphError::SelfEdgeViolation) if
    ///   `u == v` and self-edges are disallowed.
    /// - [`GraphError::ParallelEdgeViolation`](crate::error::GraphError::ParallelEdgeViolation) if
    ///   an edge between `u` and `v` already exists and parallel edges are disallowed.
    fn add_edge(
        &mut self,
        u: VertexIndex,
        v: VertexIndex,
        weight: Self::EdgeWeight,
    ) -> GraphResult<EdgeIndex>;

    /// Removes `edge`, swap-removing it against the current last edge.
    fn remove_edge(&mut self, edge: EdgeIndex) -> GraphResult<Self::EdgeWeight>;

    /// Removes every edge incident to `vertex` (both directions, for directed graphs).
    fn remove_edges_of(&mut self, vertex: VertexIndex) -> GraphResult<()> {
        loop {
            let Some(&edge) = self.incident_edges(vertex)?.first() else {
                return Ok(());
            };
            self.remove_edge(edge)?;
        }
    }

    /// Removes every edge for which `vertex` is the source (directed graphs only).
    fn remove_out_edges_of(&mut self, vertex: VertexIndex) -> GraphResult<()> {
        loop {
            let Some(&edge) = self.out_edges(vertex)?.first() else {
                return Ok(());
            };
            self.remove_edge(edge)?;
        }
    }

    /// Removes every edge for which `vertex` is the target (directed graphs only).
    fn remove_in_edges_of(&mut self, vertex: VertexIndex) -> GraphResult<()> {
        loop {
            let Some(&edge) = self.in_edges(vertex)?.first() else {
                return Ok(());
            };
            self.remove_edge(edge)?;
        }
    }

    /// Re-pegs `edge`'s endpoints to `(new_source, new_target)`, applying the same validity
    /// checks as [`Self::add_edge`].
    fn move_edge(
        &mut self,
        edge: EdgeIndex,
        new_source: VertexIndex,
        new_target: VertexIndex,
    ) -> GraphResult<()>;

    /// Swaps `edge`'s source and target. A no-op if they are equal. Meaningful primarily for
    /// directed graphs (§4.4), though every backend supports it since it is just an endpoint swap.
    fn reverse_edge(&mut self, edge: EdgeIndex) -> GraphResult<()>;

    /// Drops every vertex and edge.
    fn clear(&mut self);

    /// Drops every edge, keeping all vertices.
    fn clear_edges(&mut self);

    /// The weight of `vertex`.
    fn vertex_weight(&self, vertex: VertexIndex) -> GraphResult<&Self::VertexWeight>;

    /// A mutable reference to the weight of `vertex`.
    fn vertex_weight_mut(&mut self, vertex: VertexIndex) -> GraphResult<&mut Self::VertexWeight>;

    /// The weight of `edge`.
    fn edge_weight(&self, edge: EdgeIndex) -> GraphResult<&Self::EdgeWeight>;

    /// A mutable reference to the weight of `edge`.
    fn edge_weight_mut(&mut self, edge: EdgeIndex) -> GraphResult<&mut Self::EdgeWeight>;
}

/// Shared helper: validates a vertex index against an [`TopologyStore::num_vertices`] bound.
pub(crate) fn check_vertex(num_vertices: usize, vertex: VertexIndex) -> GraphResult<()> {
    if vertex.index() < num_vertices {
        Ok(())
    } else {
        Err(error_stack::report!(crate::error::GraphError::NoSuchVertex))
    }
}

/// Shared helper: validates an edge index against a [`TopologyStore::num_edges`] bound.
pub(crate) fn check_edge(num_edges: usize, edge: EdgeIndex) -> GraphResult<()> {
    if edge.index() < num_edges {
        Ok(())
    } else {
        Err(error_stack::report!(crate::error::GraphError::NoSuchEdge))
    }
}

pub(crate) use EdgeDirection as Direction;

//! A non-copying, read-only subgraph projection (§4.8).
//!
//! [`MaskedSubgraphView`] hides a caller-chosen set of vertices (and, transitively, every edge
//! incident to one of them) plus a caller-chosen set of edges, without touching the underlying
//! [`TopologyStore`]. It is this crate's analogue of `petgraph_core`'s `Frozen`/visitor-map
//! adapters: a thin wrapper that filters queries through a [`FixedBitSet`] instead of copying
//! anything.
//!
//! [`IndexGraph`] is the view's dense companion (§4.8's `indexGraph()`): the same live elements,
//! renumbered into `[0, n')`/`[0, m')` so algorithms that assume dense indices can run directly
//! against it.

use alloc::vec::Vec;

use error_stack::report;
use fixedbitset::FixedBitSet;

use crate::{
    capability::Capabilities,
    error::{GraphError, GraphResult},
    index::{EdgeIndex, VertexIndex},
    storage::TopologyStore,
};

/// A subset of an underlying graph's vertices and edges, read-only (§4.8).
///
/// Vertices named in `masked_vertices` are hidden, and so is every edge incident to one of them,
/// in addition to any edge named directly in `masked_edges`.
pub struct MaskedSubgraphView<'g, S> {
    inner: &'g S,
    vertex_masked: FixedBitSet,
    edge_masked: FixedBitSet,
}

impl<'g, S> MaskedSubgraphView<'g, S>
where
    S: TopologyStore,
{
    /// Builds a view over `inner` hiding `masked_vertices` and `masked_edges` (plus every edge
    /// incident to a masked vertex).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchVertex`]/[`GraphError::NoSuchEdge`] if any entry in either
    /// mask names an index that is not live in `inner`.
    pub fn new(
        inner: &'g S,
        masked_vertices: &[VertexIndex],
        masked_edges: &[EdgeIndex],
    ) -> GraphResult<Self> {
        let n = inner.num_vertices();
        let m = inner.num_edges();

        let mut vertex_masked = FixedBitSet::with_capacity(n);
        for &vertex in masked_vertices {
            if vertex.index() >= n {
                return Err(report!(GraphError::NoSuchVertex));
            }
            vertex_masked.insert(vertex.index());
        }

        let mut edge_masked = FixedBitSet::with_capacity(m);
        for &edge in masked_edges {
            if edge.index() >= m {
                return Err(report!(GraphError::NoSuchEdge));
            }
            edge_masked.insert(edge.index());
        }

        for index in 0..m {
            if edge_masked.contains(index) {
                continue;
            }
            let edge = EdgeIndex::new(index);
            let source = inner.source(edge)?;
            let target = inner.target(edge)?;
            if vertex_masked.contains(source.index()) || vertex_masked.contains(target.index()) {
                edge_masked.insert(index);
            }
        }

        Ok(Self {
            inner,
            vertex_masked,
            edge_masked,
        })
    }

    fn check_vertex(&self, vertex: VertexIndex) -> GraphResult<()> {
        if vertex.index() < self.inner.num_vertices() && !self.vertex_masked.contains(vertex.index()) {
            Ok(())
        } else {
            Err(report!(GraphError::NoSuchVertex))
        }
    }

    fn check_edge(&self, edge: EdgeIndex) -> GraphResult<()> {
        if edge.index() < self.inner.num_edges() && !self.edge_masked.contains(edge.index()) {
            Ok(())
        } else {
            Err(report!(GraphError::NoSuchEdge))
        }
    }

    /// Whether the underlying graph is directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.inner.is_directed()
    }

    /// The number of vertices visible through this view.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.inner.num_vertices() - self.vertex_masked.count_ones(..)
    }

    /// The number of edges visible through this view.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.inner.num_edges() - self.edge_masked.count_ones(..)
    }

    /// The visible vertex indices, in the underlying graph's own numbering (sparse: may skip
    /// masked indices). Use [`Self::index_graph`] for a dense renumbering.
    pub fn vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        (0..self.inner.num_vertices())
            .filter(move |&index| !self.vertex_masked.contains(index))
            .map(VertexIndex::new)
    }

    /// The visible edge indices, in the underlying graph's own numbering.
    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        (0..self.inner.num_edges())
            .filter(move |&index| !self.edge_masked.contains(index))
            .map(EdgeIndex::new)
    }

    /// The source endpoint of `edge`.
    pub fn source(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        self.check_edge(edge)?;
        self.inner.source(edge)
    }

    /// The target endpoint of `edge`.
    pub fn target(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        self.check_edge(edge)?;
        self.inner.target(edge)
    }

    /// The endpoint of `edge` opposite `vertex`.
    pub fn endpoint(&self, edge: EdgeIndex, vertex: VertexIndex) -> GraphResult<VertexIndex> {
        self.check_edge(edge)?;
        self.check_vertex(vertex)?;
        self.inner.endpoint(edge, vertex)
    }

    fn filter_edges(&self, edges: Vec<EdgeIndex>) -> Vec<EdgeIndex> {
        edges
            .into_iter()
            .filter(|edge| !self.edge_masked.contains(edge.index()))
            .collect()
    }

    /// Edges for which `vertex` is the source (directed) or any incident edge (undirected),
    /// excluding masked edges.
    pub fn out_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        self.check_vertex(vertex)?;
        Ok(self.filter_edges(self.inner.out_edges(vertex)?))
    }

    /// Edges for which `vertex` is the target (directed) or any incident edge (undirected),
    /// excluding masked edges.
    pub fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        self.check_vertex(vertex)?;
        Ok(self.filter_edges(self.inner.in_edges(vertex)?))
    }

    /// A single visible edge between `u` and `v`, or `None`.
    pub fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        Ok(self
            .inner
            .get_edges(u, v)?
            .into_iter()
            .find(|edge| !self.edge_masked.contains(edge.index())))
    }

    /// Every visible edge between `u` and `v`.
    pub fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        Ok(self.filter_edges(self.inner.get_edges(u, v)?))
    }

    /// The weight of `vertex`.
    pub fn vertex_weight(&self, vertex: VertexIndex) -> GraphResult<&S::VertexWeight> {
        self.check_vertex(vertex)?;
        self.inner.vertex_weight(vertex)
    }

    /// The weight of `edge`.
    pub fn edge_weight(&self, edge: EdgeIndex) -> GraphResult<&S::EdgeWeight> {
        self.check_edge(edge)?;
        self.inner.edge_weight(edge)
    }

    /// Mutation always fails: a view only ever holds a shared reference to `inner` (§7:
    /// "`ImmutableGraph` — mutation attempted on a CSR or masking view").
    pub fn add_vertex(&self) -> GraphResult<VertexIndex> {
        Err(report!(GraphError::ImmutableGraph))
    }

    /// See [`Self::add_vertex`].
    pub fn remove_vertex(&self, _vertex: VertexIndex) -> GraphResult<()> {
        Err(report!(GraphError::ImmutableGraph))
    }

    /// See [`Self::add_vertex`].
    pub fn add_edge(&self, _u: VertexIndex, _v: VertexIndex) -> GraphResult<EdgeIndex> {
        Err(report!(GraphError::ImmutableGraph))
    }

    /// See [`Self::add_vertex`].
    pub fn remove_edge(&self, _edge: EdgeIndex) -> GraphResult<()> {
        Err(report!(GraphError::ImmutableGraph))
    }

    /// See [`Self::add_vertex`].
    pub fn move_edge(
        &self,
        _edge: EdgeIndex,
        _new_source: VertexIndex,
        _new_target: VertexIndex,
    ) -> GraphResult<()> {
        Err(report!(GraphError::ImmutableGraph))
    }

    /// Computes the dense renumbering of the visible vertices and builds an [`IndexGraph`] over
    /// it (§4.8: `indexGraph()`).
    #[must_use]
    pub fn index_graph(&self) -> IndexGraph<'_, 'g, S> {
        IndexGraph {
            view: self,
            vertices: Reindexing::compute(self.inner.num_vertices(), &self.vertex_masked),
            edges: Reindexing::compute(self.inner.num_edges(), &self.edge_masked),
        }
    }

    /// The vertex renumbering `indexGraph()` uses, exposed on its own (§6: `indexGraphVerticesMap()`).
    #[must_use]
    pub fn vertices_reindexing(&self) -> Reindexing {
        Reindexing::compute(self.inner.num_vertices(), &self.vertex_masked)
    }

    /// The edge renumbering `indexGraph()` uses, exposed on its own (§6: `indexGraphEdgesMap()`).
    #[must_use]
    pub fn edges_reindexing(&self) -> Reindexing {
        Reindexing::compute(self.inner.num_edges(), &self.edge_masked)
    }
}

/// A bijection between an original (sparse, masked) index space and a dense `[0, n')` one (§4.8,
/// §6, §9 "Masking renaming computation").
///
/// Computed by scanning the masked bitset from both ends at once: indices below the live count
/// that are already live keep their identity; each hole among them is filled by the next live
/// index from the tail. The `k` highest live indices end up filling the `k` lowest holes, exactly
/// as described for the renumbering — just derived in one linear pass instead of two maps built
/// independently.
#[derive(Debug, Clone)]
pub struct Reindexing {
    forward: Vec<Option<usize>>,
    api_to_orig: Vec<usize>,
}

impl Reindexing {
    fn compute(total: usize, masked: &FixedBitSet) -> Self {
        let live_count = total - masked.count_ones(..);
        let mut forward: Vec<Option<usize>> = alloc::vec![None; total];
        let mut api_to_orig: Vec<usize> = alloc::vec![0; live_count];

        let mut tail = (live_count..total).rev();
        for pos in 0..live_count {
            if masked.contains(pos) {
                let orig = loop {
                    let candidate = tail.next().expect("live_count matches live element count");
                    if !masked.contains(candidate) {
                        break candidate;
                    }
                };
                forward[orig] = Some(pos);
                api_to_orig[pos] = orig;
            } else {
                forward[pos] = Some(pos);
                api_to_orig[pos] = pos;
            }
        }

        Self {
            forward,
            api_to_orig,
        }
    }

    /// The dense index for `orig`, or `None` if `orig` is masked (or out of range).
    #[must_use]
    pub fn map(&self, orig: usize) -> Option<usize> {
        self.forward.get(orig).copied().flatten()
    }

    /// The original index for dense index `api`.
    ///
    /// # Panics
    ///
    /// Panics if `api` is out of the `[0, n')` range this renumbering was computed for.
    #[must_use]
    pub fn inverse(&self, api: usize) -> usize {
        self.api_to_orig[api]
    }

    /// The size of the dense index space, `n'`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.api_to_orig.len()
    }

    /// Whether the dense index space is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_to_orig.is_empty()
    }
}

/// The dense, fully [`TopologyStore`]-conformant companion of a [`MaskedSubgraphView`] (§4.8).
///
/// Only ever constructed via [`MaskedSubgraphView::index_graph`]: it borrows the view and its
/// precomputed renumbering, so its lifetime is tied to both.
pub struct IndexGraph<'a, 'g, S> {
    view: &'a MaskedSubgraphView<'g, S>,
    vertices: Reindexing,
    edges: Reindexing,
}

impl<'a, 'g, S> IndexGraph<'a, 'g, S>
where
    S: TopologyStore,
{
    fn to_api_vertex(&self, orig: VertexIndex) -> VertexIndex {
        VertexIndex::new(
            self.vertices
                .map(orig.index())
                .expect("index_graph only ever yields live original indices"),
        )
    }

    fn to_orig_vertex(&self, api: VertexIndex) -> VertexIndex {
        VertexIndex::new(self.vertices.inverse(api.index()))
    }

    fn to_api_edge(&self, orig: EdgeIndex) -> EdgeIndex {
        EdgeIndex::new(
            self.edges
                .map(orig.index())
                .expect("index_graph only ever yields live original indices"),
        )
    }

    fn to_orig_edge(&self, api: EdgeIndex) -> EdgeIndex {
        EdgeIndex::new(self.edges.inverse(api.index()))
    }
}

impl<'a, 'g, S> TopologyStore for IndexGraph<'a, 'g, S>
where
    S: TopologyStore,
{
    type VertexWeight = S::VertexWeight;
    type EdgeWeight = S::EdgeWeight;

    fn new(_capabilities: Capabilities) -> Self {
        unreachable!("an IndexGraph only ever comes from MaskedSubgraphView::index_graph")
    }

    fn with_capacity(_capabilities: Capabilities, _vertices: usize, _edges: usize) -> Self {
        unreachable!("an IndexGraph only ever comes from MaskedSubgraphView::index_graph")
    }

    fn capabilities(&self) -> Capabilities {
        self.view.inner.capabilities()
    }

    fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn source(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        crate::storage::check_edge(self.num_edges(), edge)?;
        let orig = self.view.source(self.to_orig_edge(edge))?;
        Ok(self.to_api_vertex(orig))
    }

    fn target(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        crate::storage::check_edge(self.num_edges(), edge)?;
        let orig = self.view.target(self.to_orig_edge(edge))?;
        Ok(self.to_api_vertex(orig))
    }

    fn endpoint(&self, edge: EdgeIndex, vertex: VertexIndex) -> GraphResult<VertexIndex> {
        crate::storage::check_edge(self.num_edges(), edge)?;
        crate::storage::check_vertex(self.num_vertices(), vertex)?;
        let orig = self
            .view
            .endpoint(self.to_orig_edge(edge), self.to_orig_vertex(vertex))?;
        Ok(self.to_api_vertex(orig))
    }

    fn out_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        crate::storage::check_vertex(self.num_vertices(), vertex)?;
        Ok(self
            .view
            .out_edges(self.to_orig_vertex(vertex))?
            .into_iter()
            .map(|edge| self.to_api_edge(edge))
            .collect())
    }

    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        crate::storage::check_vertex(self.num_vertices(), vertex)?;
        Ok(self
            .view
            .in_edges(self.to_orig_vertex(vertex))?
            .into_iter()
            .map(|edge| self.to_api_edge(edge))
            .collect())
    }

    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>> {
        crate::storage::check_vertex(self.num_vertices(), u)?;
        crate::storage::check_vertex(self.num_vertices(), v)?;
        Ok(self
            .view
            .get_edge(self.to_orig_vertex(u), self.to_orig_vertex(v))?
            .map(|edge| self.to_api_edge(edge)))
    }

    fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        crate::storage::check_vertex(self.num_vertices(), u)?;
        crate::storage::check_vertex(self.num_vertices(), v)?;
        Ok(self
            .view
            .get_edges(self.to_orig_vertex(u), self.to_orig_vertex(v))?
            .into_iter()
            .map(|edge| self.to_api_edge(edge))
            .collect())
    }

    fn add_vertex(&mut self, _weight: Self::VertexWeight) -> GraphResult<VertexIndex> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn remove_vertex(&mut self, _vertex: VertexIndex) -> GraphResult<Self::VertexWeight> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn add_edge(
        &mut self,
        _u: VertexIndex,
        _v: VertexIndex,
        _weight: Self::EdgeWeight,
    ) -> GraphResult<EdgeIndex> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn remove_edge(&mut self, _edge: EdgeIndex) -> GraphResult<Self::EdgeWeight> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn move_edge(
        &mut self,
        _edge: EdgeIndex,
        _new_source: VertexIndex,
        _new_target: VertexIndex,
    ) -> GraphResult<()> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn reverse_edge(&mut self, _edge: EdgeIndex) -> GraphResult<()> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn clear(&mut self) {}

    fn clear_edges(&mut self) {}

    fn vertex_weight(&self, vertex: VertexIndex) -> GraphResult<&Self::VertexWeight> {
        crate::storage::check_vertex(self.num_vertices(), vertex)?;
        self.view.vertex_weight(self.to_orig_vertex(vertex))
    }

    fn vertex_weight_mut(&mut self, _vertex: VertexIndex) -> GraphResult<&mut Self::VertexWeight> {
        Err(report!(GraphError::ImmutableGraph))
    }

    fn edge_weight(&self, edge: EdgeIndex) -> GraphResult<&Self::EdgeWeight> {
        crate::storage::check_edge(self.num_edges(), edge)?;
        self.view.edge_weight(self.to_orig_edge(edge))
    }

    fn edge_weight_mut(&mut self, _edge: EdgeIndex) -> GraphResult<&mut Self::EdgeWeight> {
        Err(report!(GraphError::ImmutableGraph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{Backend, BackendKind},
        capability::Capabilities,
    };

    fn sample() -> Backend<&'static str, &'static str> {
        let caps = Capabilities::new(true, true, true);
        let mut backend = Backend::of_kind(crate::backend::BackendKind::Array, caps);
        backend.add_vertex("v0").unwrap();
        backend.add_vertex("v1").unwrap();
        backend.add_vertex("v2").unwrap();
        backend.add_vertex("v3").unwrap();
        backend.add_edge(VertexIndex::new(0), VertexIndex::new(1), "e0").unwrap();
        backend.add_edge(VertexIndex::new(1), VertexIndex::new(2), "e1").unwrap();
        backend.add_edge(VertexIndex::new(2), VertexIndex::new(3), "e2").unwrap();
        backend
    }

    #[test]
    fn masking_a_vertex_hides_its_incident_edges() {
        let backend = sample();
        let view = MaskedSubgraphView::new(&backend, &[VertexIndex::new(1)], &[]).unwrap();

        assert_eq!(view.num_vertices(), 3);
        assert_eq!(view.num_edges(), 1);
        assert!(view.vertex_weight(VertexIndex::new(1)).is_err());
        assert!(view.source(EdgeIndex::new(0)).is_err());
        assert!(view.source(EdgeIndex::new(1)).is_err());
        assert_eq!(view.source(EdgeIndex::new(2)).unwrap(), VertexIndex::new(2));
    }

    #[test]
    fn index_graph_is_densely_renumbered() {
        let backend = sample();
        let view = MaskedSubgraphView::new(&backend, &[VertexIndex::new(1)], &[]).unwrap();
        let index_graph = view.index_graph();

        assert_eq!(index_graph.num_vertices(), 3);
        assert_eq!(index_graph.num_edges(), 1);
        assert_eq!(index_graph.source(EdgeIndex::new(0)).unwrap(), VertexIndex::new(1));
        assert_eq!(index_graph.target(EdgeIndex::new(0)).unwrap(), VertexIndex::new(2));
    }

    #[test]
    fn mutation_fails_with_immutable() {
        let backend = sample();
        let view = MaskedSubgraphView::new(&backend, &[], &[]).unwrap();
        assert!(view.add_vertex().is_err());
        assert!(view.remove_edge(EdgeIndex::new(0)).is_err());
    }

    /// §8 Scenario E: 5-vertex undirected graph, mask vertex 2, renumbered view keeps
    /// `{(0,1),(3,4)}` under new indices, leaving the underlying graph untouched.
    #[test]
    fn scenario_e_masking_view() {
        let caps = Capabilities::new(false, true, true);
        let mut backend = Backend::of_kind(BackendKind::Array, caps);
        for _ in 0..5 {
            backend.add_vertex(()).unwrap();
        }
        backend.add_edge(VertexIndex::new(0), VertexIndex::new(1), ()).unwrap();
        backend.add_edge(VertexIndex::new(1), VertexIndex::new(2), ()).unwrap();
        backend.add_edge(VertexIndex::new(2), VertexIndex::new(3), ()).unwrap();
        backend.add_edge(VertexIndex::new(3), VertexIndex::new(4), ()).unwrap();

        let view = MaskedSubgraphView::new(&backend, &[VertexIndex::new(2)], &[]).unwrap();
        assert_eq!(view.num_vertices(), 4);
        assert_eq!(view.num_edges(), 2);
        assert!(view.vertex_weight(VertexIndex::new(2)).is_err());

        let index_graph = view.index_graph();
        assert_eq!(index_graph.num_vertices(), 4);
        assert_eq!(index_graph.num_edges(), 2);

        let mut pairs: Vec<(usize, usize)> = index_graph
            .edges()
            .map(|e| {
                let edge = EdgeIndex::new(e);
                let (s, t) = (
                    index_graph.source(edge).unwrap().index(),
                    index_graph.target(edge).unwrap().index(),
                );
                (s.min(t), s.max(t))
            })
            .collect();
        pairs.sort_unstable();
        assert_eq!(pairs, alloc::vec![(0, 1), (2, 3)]);

        // The underlying graph is untouched.
        assert_eq!(backend.num_vertices(), 5);
        assert_eq!(backend.num_edges(), 4);
    }
}

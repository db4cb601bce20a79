//! The staging builder (§4.6).
//!
//! A [`Builder`] accumulates vertices and edges in plain `Vec`s — no capability checks, no
//! adjacency structure, no swap-remove bookkeeping — and only validates the whole batch at
//! `build()` time. This mirrors `petgraph_csr::Csr::from_sorted_edges`'s "collect first, check and
//! compress second" shape, generalized to also hand the same validated batch to any of the three
//! mutable backends via [`Builder::build_mutable`].

use alloc::vec::Vec;

use error_stack::report;
use indexmap::IndexSet as HashIndexSet;

use crate::{
    backend::{Backend, BackendKind},
    capability::Capabilities,
    csr::{stable_reindex_by_source_then_target, CsrTopology},
    error::{GraphError, GraphResult},
    index::{EdgeIndex, VertexIndex},
    storage::TopologyStore,
};

/// The outcome of a re-indexing build (§4.6): the built graph plus, for each index space that was
/// actually reordered, the permutation applied.
///
/// `vertices_reindexing[old] == new` and `edges_reindexing[old] == new` — this is `π` from §8
/// Scenario C: reading entry `old` tells you where that pre-reindex index now lives. `None` when
/// that index space was left alone (today, vertex re-indexing is always `None` — see
/// [`Builder::reindex_and_build`]).
pub struct ReindexReport<G> {
    pub graph: G,
    pub vertices_reindexing: Option<Vec<usize>>,
    pub edges_reindexing: Option<Vec<usize>>,
}

/// Accumulates vertices and edges, then validates and freezes them into a graph backend.
pub struct Builder<V, E> {
    capabilities: Capabilities,
    vertex_weights: Vec<V>,
    edges: Vec<(VertexIndex, VertexIndex, E)>,
}

impl<V, E> Builder<V, E> {
    /// Starts an empty builder targeting the given capability record.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            vertex_weights: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// A capacity hint: reserves room for `count` more vertices. Purely an allocation hint, not
    /// observable in the built graph (§4.6: "addVertex", "expectedVerticesNum").
    pub fn expected_vertices_num(&mut self, count: usize) {
        self.vertex_weights.reserve(count);
    }

    /// A capacity hint: reserves room for `count` more edges.
    pub fn expected_edges_num(&mut self, count: usize) {
        self.edges.reserve(count);
    }

    /// Stages a vertex, returning the index it will have in the built graph (assuming no vertex
    /// is ever removed from a builder — the staging area has no swap-remove, only append).
    pub fn add_vertex(&mut self, weight: V) -> VertexIndex {
        let index = VertexIndex::new(self.vertex_weights.len());
        self.vertex_weights.push(weight);
        index
    }

    /// Stages `count` vertices built by repeatedly calling `weight`, returning the contiguous
    /// range of indices assigned.
    pub fn add_vertices(&mut self, count: usize, mut weight: impl FnMut() -> V) -> core::ops::Range<usize> {
        let start = self.vertex_weights.len();
        for _ in 0..count {
            self.vertex_weights.push(weight());
        }
        start..self.vertex_weights.len()
    }

    /// Stages an edge. Endpoint and capability validation is deferred to [`Self::build`]/
    /// [`Self::build_mutable`] — a builder never rejects `add_edge` itself.
    pub fn add_edge(&mut self, source: VertexIndex, target: VertexIndex, weight: E) -> EdgeIndex {
        let index = EdgeIndex::new(self.edges.len());
        self.edges.push((source, target, weight));
        index
    }

    /// Stages every `(source, target, weight)` triple from `edges`, ignoring any caller-side
    /// identifiers and assigning fresh, contiguous ids in staging order (§9 open question: "keep
    /// `addEdgesReassignIds`'s id-discarding behavior — a builder's edge ids are always dense and
    /// assigned by position"). Returns the contiguous range of edge indices assigned.
    pub fn add_edges_reassign_ids(
        &mut self,
        edges: impl IntoIterator<Item = (VertexIndex, VertexIndex, E)>,
    ) -> core::ops::Range<usize> {
        let start = self.edges.len();
        self.edges.extend(edges);
        start..self.edges.len()
    }

    /// The number of vertices staged so far.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertex_weights.len()
    }

    /// The number of edges staged so far.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Validates every staged edge against `self.capabilities` and the staged vertex count.
    ///
    /// Checks endpoints are in range, then (only if the respective capability forbids it)
    /// self-edges and parallel edges, in that order (§4.6: "Validation at build time"). Since
    /// staging never mutates anything outside this `Builder`, a failing check here simply returns
    /// before any backend or `CsrTopology` is constructed — there is nothing to roll back.
    fn validate(&self) -> GraphResult<()> {
        let n = self.vertex_weights.len();
        let mut seen: HashIndexSet<(usize, usize)> = HashIndexSet::with_capacity(self.edges.len());

        for &(source, target, _) in &self.edges {
            if source.index() >= n || target.index() >= n {
                return Err(report!(GraphError::OutOfRange));
            }
            if source == target && !self.capabilities.allows_self_edges() {
                return Err(report!(GraphError::SelfEdgeViolation));
            }
            if !self.capabilities.allows_parallel_edges() {
                let key = canonical_pair(self.capabilities.is_directed(), source, target);
                if !seen.insert(key) {
                    return Err(report!(GraphError::ParallelEdgeViolation));
                }
            }
        }

        Ok(())
    }

    /// Validates, then compresses the staged batch into an immutable [`CsrTopology`] in staging
    /// order (no re-indexing). Use [`Self::reindex_and_build`] for the re-indexed form.
    pub fn build(self) -> GraphResult<CsrTopology<V, E>>
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        self.validate()?;
        Ok(CsrTopology::build(self.capabilities, self.vertex_weights, self.edges))
    }

    /// Validates, then inserts the staged batch (in staging order) into a fresh mutable backend
    /// of the given kind.
    pub fn build_mutable(self, kind: BackendKind) -> GraphResult<Backend<V, E>>
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        self.validate()?;
        let mut backend = Backend::of_kind_with_capacity(
            kind,
            self.capabilities,
            self.vertex_weights.len(),
            self.edges.len(),
        );
        for weight in self.vertex_weights {
            backend
                .add_vertex(weight)
                .expect("freshly created mutable backend is never immutable");
        }
        for (source, target, weight) in self.edges {
            backend
                .add_edge(source, target, weight)
                .expect("validated batch must insert cleanly");
        }
        Ok(backend)
    }

    /// Validates, optionally re-indexes edges for locality (§4.5's "group by source, then by
    /// target" layout), then compresses into a [`CsrTopology`].
    ///
    /// `reindex_vertices` is accepted for API symmetry with the distilled specification but is
    /// currently always reported back as `None`: the specification gives a concrete algorithm for
    /// edge re-indexing but not for vertex re-indexing, and guessing at one (e.g. reordering by
    /// degree) risks inventing semantics no caller asked for. Vertices keep their staging order
    /// until a concrete vertex re-indexing scheme is specified.
    pub fn reindex_and_build(
        self,
        reindex_vertices: bool,
        reindex_edges: bool,
    ) -> GraphResult<ReindexReport<CsrTopology<V, E>>>
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        let _ = reindex_vertices;
        self.validate()?;

        let (edges, edges_reindexing) = if reindex_edges {
            reorder_edges(self.vertex_weights.len(), self.edges)
        } else {
            (self.edges, None)
        };

        Ok(ReindexReport {
            graph: CsrTopology::build(self.capabilities, self.vertex_weights, edges),
            vertices_reindexing: None,
            edges_reindexing,
        })
    }

    /// The mutable-backend counterpart of [`Self::reindex_and_build`]: re-indexes edges (if
    /// requested) before inserting the staged batch into a fresh backend, so insertion order
    /// matches the locality layout even though the backend itself has no notion of CSR rows.
    pub fn reindex_and_build_mutable(
        self,
        kind: BackendKind,
        reindex_vertices: bool,
        reindex_edges: bool,
    ) -> GraphResult<ReindexReport<Backend<V, E>>>
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        let _ = reindex_vertices;
        self.validate()?;

        let num_vertices = self.vertex_weights.len();
        let (edges, edges_reindexing) = if reindex_edges {
            reorder_edges(num_vertices, self.edges)
        } else {
            (self.edges, None)
        };

        let mut backend =
            Backend::of_kind_with_capacity(kind, self.capabilities, num_vertices, edges.len());
        for weight in self.vertex_weights {
            backend
                .add_vertex(weight)
                .expect("freshly created mutable backend is never immutable");
        }
        for (source, target, weight) in edges {
            backend
                .add_edge(source, target, weight)
                .expect("validated batch must insert cleanly");
        }

        Ok(ReindexReport {
            graph: backend,
            vertices_reindexing: None,
            edges_reindexing,
        })
    }
}

/// Canonicalizes an (ordered, if directed) vertex pair for parallel-edge detection: directed
/// graphs key on `(source, target)` as given, undirected graphs key on the pair sorted so `(u,
/// v)` and `(v, u)` collide.
fn canonical_pair(directed: bool, source: VertexIndex, target: VertexIndex) -> (usize, usize) {
    let (s, t) = (source.index(), target.index());
    if directed || s <= t {
        (s, t)
    } else {
        (t, s)
    }
}

/// Applies [`stable_reindex_by_source_then_target`] to `edges`, returning the reordered batch and
/// `π` (`forward[old] == new`, matching §8 Scenario C).
fn reorder_edges<E>(
    num_vertices: usize,
    edges: Vec<(VertexIndex, VertexIndex, E)>,
) -> (Vec<(VertexIndex, VertexIndex, E)>, Option<Vec<usize>>) {
    let endpoints: Vec<(VertexIndex, VertexIndex)> = edges.iter().map(|&(s, t, _)| (s, t)).collect();
    let (new_order, forward) = stable_reindex_by_source_then_target(num_vertices, &endpoints);

    let mut slots: Vec<Option<(VertexIndex, VertexIndex, E)>> = edges.into_iter().map(Some).collect();
    let reordered = new_order
        .iter()
        .map(|&old| slots[old].take().expect("permutation is a bijection"))
        .collect();

    (reordered, Some(forward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendKind;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn build_rejects_out_of_range_endpoint() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertex(());
        b.add_edge(v(0), v(5), ());
        assert!(b.build().is_err());
    }

    #[test]
    fn build_rejects_self_edge_when_disallowed() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertex(());
        b.add_edge(v(0), v(0), ());
        assert!(b.build().is_err());
    }

    #[test]
    fn build_rejects_parallel_edge_when_disallowed() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertex(());
        b.add_vertex(());
        b.add_edge(v(0), v(1), ());
        b.add_edge(v(0), v(1), ());
        assert!(b.build().is_err());
    }

    #[test]
    fn undirected_parallel_check_is_order_insensitive() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(false, false, false));
        b.add_vertex(());
        b.add_vertex(());
        b.add_edge(v(0), v(1), ());
        b.add_edge(v(1), v(0), ());
        assert!(b.build().is_err());
    }

    #[test]
    fn build_succeeds_in_staging_order() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertices(3, || ());
        b.add_edge(v(1), v(2), ());
        b.add_edge(v(0), v(2), ());
        b.add_edge(v(0), v(1), ());

        let csr = b.build().unwrap();
        assert_eq!(csr.source(EdgeIndex::new(0)).unwrap(), v(1));
        assert_eq!(csr.target(EdgeIndex::new(0)).unwrap(), v(2));
    }

    #[test]
    fn build_mutable_inserts_into_requested_backend_kind() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertices(2, || ());
        b.add_edge(v(0), v(1), ());

        let backend = b.build_mutable(BackendKind::HashMap).unwrap();
        assert_eq!(backend.kind(), BackendKind::HashMap);
        assert_eq!(backend.num_edges(), 1);
    }

    /// §8 Scenario C, from the builder side: `edges_reindexing` matches
    /// [`stable_reindex_by_source_then_target`] directly.
    #[test]
    fn reindex_and_build_reports_the_edge_permutation() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertices(3, || ());
        b.add_edge(v(1), v(2), ()); // e0
        b.add_edge(v(0), v(2), ()); // e1
        b.add_edge(v(0), v(1), ()); // e2

        let report = b.reindex_and_build(false, true).unwrap();
        assert_eq!(report.vertices_reindexing, None);
        assert_eq!(report.edges_reindexing, Some(vec![2, 1, 0]));
        assert_eq!(report.graph.out_edges(v(0)).unwrap().len(), 2);
    }

    #[test]
    fn reindex_and_build_without_reindexing_edges_keeps_staging_order() {
        let mut b: Builder<(), ()> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertices(2, || ());
        b.add_edge(v(0), v(1), ());

        let report = b.reindex_and_build(false, false).unwrap();
        assert_eq!(report.edges_reindexing, None);
    }

    #[test]
    fn add_edges_reassign_ids_ignores_input_order_gaps() {
        let mut b: Builder<(), i32> = Builder::new(Capabilities::new(true, false, false));
        b.add_vertices(2, || ());
        let range = b.add_edges_reassign_ids([(v(0), v(1), 1), (v(1), v(0), 2)]);
        assert_eq!(range, 0..2);
        assert_eq!(b.num_edges(), 2);
    }
}

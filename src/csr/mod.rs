//! The immutable CSR (compressed sparse row) backend (§4.5).
//!
//! Unlike [`crate::storage`]'s three mutable backends, a [`CsrTopology`] is assembled once, in
//! full, from a batch of `(source, target, weight)` triples handed over by
//! [`Builder::build`](crate::builder::Builder::build) — the same "accumulate, then compress" shape
//! `petgraph_csr::Csr` is built around. The triples are expected to already be in the graph's final
//! public edge order: any edge re-indexing (§4.6) is decided and applied by the builder *before*
//! calling [`CsrTopology::build`], so this module only ever does the O(n + m) bucket layout, never
//! permutation bookkeeping.
use alloc::{vec, vec::Vec};

use error_stack::report;

use crate::{
    capability::Capabilities,
    endpoints::Endpoints,
    error::{GraphError, GraphResult},
    index::{EdgeIndex, VertexIndex},
    storage::{check_edge, check_vertex, TopologyStore},
};

/// The CSR-backed immutable topology store.
///
/// Every mutating [`TopologyStore`] method returns
/// [`GraphError::ImmutableGraph`](crate::error::GraphError::ImmutableGraph); the only way to
/// populate one is [`CsrTopology::build`], called by the builder.
pub struct CsrTopology<V, E> {
    capabilities: Capabilities,
    /// `out_row[v]..out_row[v + 1]` indexes into `out_col` for edges incident to `v` in the
    /// "out" role (directed: source; undirected: either endpoint).
    out_row: Vec<usize>,
    /// Flattened incident edge indices, grouped by `out_row`'s buckets. For directed graphs this
    /// has exactly `m` entries (one per edge, under its source); for undirected graphs it has
    /// `2m - s` entries (`s` = self-edge count), since every non-self edge is bucketed under both
    /// endpoints (§4.5).
    out_col: Vec<EdgeIndex>,
    /// `in_row[v]..in_row[v + 1]` indexes into `in_col` for edges targeting `v`. Empty for
    /// undirected graphs, where in-adjacency coincides with out-adjacency.
    in_row: Vec<usize>,
    in_col: Vec<EdgeIndex>,
    endpoints: Endpoints,
    vertex_weights: Vec<V>,
    edge_weights: Vec<E>,
}

impl<V, E> CsrTopology<V, E> {
    /// Compresses `edges` (given in the graph's final, public edge order — see module docs) into
    /// CSR form.
    #[must_use]
    pub(crate) fn build(
        capabilities: Capabilities,
        vertex_weights: Vec<V>,
        edges: Vec<(VertexIndex, VertexIndex, E)>,
    ) -> Self {
        let num_vertices = vertex_weights.len();
        let m = edges.len();
        let directed = capabilities.is_directed();

        let mut endpoints = Endpoints::new();
        let mut edge_weights = Vec::with_capacity(m);
        for (s, t, w) in edges {
            endpoints.push(s, t);
            edge_weights.push(w);
        }

        let mut out_counts = vec![0usize; num_vertices + 1];
        for phys in 0..m {
            out_counts[endpoints.source(phys).index() + 1] += 1;
            if !directed {
                let (s, t) = (endpoints.source(phys), endpoints.target(phys));
                if s != t {
                    out_counts[t.index() + 1] += 1;
                }
            }
        }
        for i in 0..num_vertices {
            out_counts[i + 1] += out_counts[i];
        }

        let mut cursor = out_counts.clone();
        let out_len = out_counts[num_vertices];
        let mut out_col = vec![EdgeIndex::new(0); out_len];
        for phys in 0..m {
            let edge = EdgeIndex::new(phys);
            let (s, t) = (endpoints.source(phys), endpoints.target(phys));
            out_col[cursor[s.index()]] = edge;
            cursor[s.index()] += 1;
            if !directed && s != t {
                out_col[cursor[t.index()]] = edge;
                cursor[t.index()] += 1;
            }
        }

        let (in_row, in_col) = if directed {
            let mut counts = vec![0usize; num_vertices + 1];
            for phys in 0..m {
                counts[endpoints.target(phys).index() + 1] += 1;
            }
            for i in 0..num_vertices {
                counts[i + 1] += counts[i];
            }
            let mut cursor = counts.clone();
            let mut col = vec![EdgeIndex::new(0); m];
            for phys in 0..m {
                let t = endpoints.target(phys).index();
                col[cursor[t]] = EdgeIndex::new(phys);
                cursor[t] += 1;
            }
            (counts, col)
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            capabilities,
            out_row: out_counts,
            out_col,
            in_row,
            in_col,
            endpoints,
            vertex_weights,
            edge_weights,
        }
    }

    fn num_vertices(&self) -> usize {
        self.vertex_weights.len()
    }

    fn num_edges(&self) -> usize {
        self.edge_weights.len()
    }

    fn out_range(&self, vertex: VertexIndex) -> core::ops::Range<usize> {
        self.out_row[vertex.index()]..self.out_row[vertex.index() + 1]
    }
}

impl<V, E> TopologyStore for CsrTopology<V, E>
where
    V: Clone + Default,
    E: Clone + Default,
{
    type VertexWeight = V;
    type EdgeWeight = E;

    fn new(capabilities: Capabilities) -> Self {
        Self::build(capabilities, Vec::new(), Vec::new())
    }

    fn with_capacity(capabilities: Capabilities, _vertices: usize, _edges: usize) -> Self {
        Self::new(capabilities)
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn num_vertices(&self) -> usize {
        self.num_vertices()
    }

    fn num_edges(&self) -> usize {
        self.num_edges()
    }

    fn source(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        check_edge(self.num_edges(), edge)?;
        Ok(self.endpoints.source(edge.index()))
    }

    fn target(&self, edge: EdgeIndex) -> GraphResult<VertexIndex> {
        check_edge(self.num_edges(), edge)?;
        Ok(self.endpoints.target(edge.index()))
    }

    fn endpoint(&self, edge: EdgeIndex, vertex: VertexIndex) -> GraphResult<VertexIndex> {
        check_edge(self.num_edges(), edge)?;
        self.endpoints
            .opposite(edge.index(), vertex)
            .ok_or_else(|| report!(GraphError::NoSuchVertex))
    }

    fn out_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), vertex)?;
        Ok(self.out_col[self.out_range(vertex)].to_vec())
    }

    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), vertex)?;
        if self.capabilities.is_directed() {
            let range = self.in_row[vertex.index()]..self.in_row[vertex.index() + 1];
            Ok(self.in_col[range].to_vec())
        } else {
            self.out_edges(vertex)
        }
    }

    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>> {
        Ok(self.get_edges(u, v)?.first().copied())
    }

    fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), u)?;
        check_vertex(self.num_vertices(), v)?;

        let directed = self.capabilities.is_directed();
        let mut found = Vec::new();
        for &edge in &self.out_col[self.out_range(u)] {
            let (source, target) = (self.endpoints.source(edge.index()), self.endpoints.target(edge.index()));
            let matches = if directed {
                source == u && target == v
            } else {
                (source == u && target == v) || (source == v && target == u)
            };
            if matches {
                found.push(edge);
            }
        }
        Ok(found)
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

    fn clear(&mut self) {
        self.out_row = vec![0];
        self.out_col.clear();
        self.in_row.clear();
        self.in_col.clear();
        self.endpoints.clear();
        self.vertex_weights.clear();
        self.edge_weights.clear();
    }

    fn clear_edges(&mut self) {
        let num_vertices = self.num_vertices();
        self.out_row = vec![0; num_vertices + 1];
        self.out_col.clear();
        self.in_row.clear();
        self.in_col.clear();
        self.endpoints.clear();
        self.edge_weights.clear();
    }

    fn vertex_weight(&self, vertex: VertexIndex) -> GraphResult<&Self::VertexWeight> {
        check_vertex(self.num_vertices(), vertex)?;
        Ok(&self.vertex_weights[vertex.index()])
    }

    fn vertex_weight_mut(&mut self, vertex: VertexIndex) -> GraphResult<&mut Self::VertexWeight> {
        check_vertex(self.num_vertices(), vertex)?;
        Ok(&mut self.vertex_weights[vertex.index()])
    }

    fn edge_weight(&self, edge: EdgeIndex) -> GraphResult<&Self::EdgeWeight> {
        check_edge(self.num_edges(), edge)?;
        Ok(&self.edge_weights[edge.index()])
    }

    fn edge_weight_mut(&mut self, edge: EdgeIndex) -> GraphResult<&mut Self::EdgeWeight> {
        check_edge(self.num_edges(), edge)?;
        Ok(&mut self.edge_weights[edge.index()])
    }
}

/// Computes the edge re-indexing permutation described in §4.5: a stable two-phase bucket sort,
/// first by target, then by source, so the result is grouped by source and, within a source
/// bucket, ordered by target.
///
/// Returns `(new_order, forward)` where `new_order[new] == original` and `forward[original] ==
/// new`; `new_order` is the permutation callers apply to their edge/weight arrays before calling
/// [`CsrTopology::build`].
#[must_use]
pub(crate) fn stable_reindex_by_source_then_target(
    num_vertices: usize,
    endpoints: &[(VertexIndex, VertexIndex)],
) -> (Vec<usize>, Vec<usize>) {
    let m = endpoints.len();
    let initial: Vec<usize> = (0..m).collect();
    let by_target = bucket_stable_sort(num_vertices, &initial, |i| endpoints[i].1.index());
    let by_source = bucket_stable_sort(num_vertices, &by_target, |i| endpoints[i].0.index());

    let mut forward = vec![0usize; m];
    for (new_pos, &original) in by_source.iter().enumerate() {
        forward[original] = new_pos;
    }
    (by_source, forward)
}

fn bucket_stable_sort(num_buckets: usize, order: &[usize], key: impl Fn(usize) -> usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_buckets + 1];
    for &i in order {
        counts[key(i) + 1] += 1;
    }
    for b in 0..num_buckets {
        counts[b + 1] += counts[b];
    }

    let mut cursor = counts;
    let mut result = vec![0usize; order.len()];
    for &i in order {
        let k = key(i);
        result[cursor[k]] = i;
        cursor[k] += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn build_from_triples_directed() {
        let caps = Capabilities::new(true, false, false);
        let edges = vec![(v(0), v(1), ()), (v(0), v(2), ()), (v(2), v(3), ()), (v(1), v(3), ())];
        let csr = CsrTopology::<(), ()>::build(caps, vec![(); 4], edges);

        assert_eq!(csr.num_vertices(), 4);
        assert_eq!(csr.num_edges(), 4);
        assert_eq!(csr.out_edges(v(0)).unwrap(), vec![EdgeIndex::new(0), EdgeIndex::new(1)]);
        assert_eq!(csr.in_edges(v(3)).unwrap(), vec![EdgeIndex::new(2), EdgeIndex::new(3)]);
        assert_eq!(csr.get_edge(v(0), v(1)).unwrap(), Some(EdgeIndex::new(0)));
        assert_eq!(csr.get_edge(v(1), v(0)).unwrap(), None);
    }

    #[test]
    fn build_from_triples_undirected_shares_in_and_out() {
        let caps = Capabilities::new(false, true, false);
        let edges = vec![(v(0), v(0), ()), (v(0), v(1), ())];
        let csr = CsrTopology::<(), ()>::build(caps, vec![(); 2], edges);

        assert_eq!(csr.out_edges(v(0)).unwrap(), csr.in_edges(v(0)).unwrap());
        assert_eq!(csr.out_edges(v(0)).unwrap(), vec![EdgeIndex::new(0), EdgeIndex::new(1)]);
        assert_eq!(csr.out_edges(v(1)).unwrap(), vec![EdgeIndex::new(1)]);
    }

    /// §8 Scenario C: stable two-phase bucket sort groups edges by source, then by target.
    #[test]
    fn stable_reindex_groups_by_source_then_target() {
        let endpoints = [(v(1), v(2)), (v(0), v(2)), (v(0), v(1))];
        let (new_order, forward) = stable_reindex_by_source_then_target(3, &endpoints);

        assert_eq!(new_order, vec![2, 1, 0]);
        assert_eq!(forward, vec![2, 1, 0]);

        let reordered: Vec<(VertexIndex, VertexIndex, ())> =
            new_order.iter().map(|&i| (endpoints[i].0, endpoints[i].1, ())).collect();
        let csr = CsrTopology::<(), ()>::build(Capabilities::new(true, false, false), vec![(); 3], reordered);
        assert_eq!(csr.out_row, vec![0, 2, 3, 3]);
    }

    #[test]
    fn mutation_fails_with_immutable() {
        let mut csr = CsrTopology::<(), ()>::new(Capabilities::new(true, false, false));
        assert!(csr.add_vertex(()).is_err());
        assert!(csr.add_edge(v(0), v(1), ()).is_err());
        assert!(csr.remove_edge(EdgeIndex::new(0)).is_err());
        assert!(csr.remove_vertex(v(0)).is_err());
    }
}

//! The array adjacency backend (§4.4.a).
//!
//! Adjacency is a per-vertex `Vec<EdgeIndex>`: one array for undirected incidence, or two arrays
//! (out/in) for directed graphs. Every edge remembers *where* it sits in each of its lists (the
//! `slots` table) so both insertion and removal are `Vec::swap_remove`-backed O(1) amortized
//! operations rather than a linear scan — the same trick the distilled spec's §4.4 "common
//! contract" describes and that a `Vec<Vec<EdgeIndex>>` + reverse-position-index pairing realizes
//! directly in safe Rust, without resorting to the intrusive linked lists of
//! [`super::linked`].

use alloc::vec::Vec;

use error_stack::report;

use crate::{
    capability::Capabilities,
    endpoints::Endpoints,
    error::{GraphError, GraphResult},
    index::{EdgeIndex, VertexIndex, NONE},
    storage::{check_edge, check_vertex, TopologyStore},
    weight::Weights,
};

/// The array-backed mutable topology store.
pub struct ArrayStore<V, E> {
    capabilities: Capabilities,
    endpoints: Endpoints,
    vertex_weights: Weights<V>,
    edge_weights: Weights<E>,
    /// Out-adjacency (directed) or incidence (undirected), keyed by vertex.
    out_adj: Vec<Vec<EdgeIndex>>,
    /// In-adjacency, keyed by vertex. Left empty (never populated) for undirected graphs.
    in_adj: Vec<Vec<EdgeIndex>>,
    /// Per-edge `[position in source's list, position in target's list]`; `NONE` for the second
    /// slot of an undirected self-edge, which only ever occupies one list.
    slots: Vec<[usize; 2]>,
}

impl<V, E> ArrayStore<V, E>
where
    V: Clone + Default,
    E: Clone + Default,
{
    fn num_vertices(&self) -> usize {
        self.out_adj.len()
    }

    fn num_edges(&self) -> usize {
        self.endpoints.len()
    }

    fn list_for(&mut self, vertex: VertexIndex, is_source_list: bool) -> &mut Vec<EdgeIndex> {
        if self.capabilities.is_directed() {
            if is_source_list {
                &mut self.out_adj[vertex.index()]
            } else {
                &mut self.in_adj[vertex.index()]
            }
        } else {
            &mut self.out_adj[vertex.index()]
        }
    }

    /// Removes the occurrence of `edge` at `pos` within `vertex`'s list, fixing up whichever edge
    /// got swapped into `pos` (if any).
    fn unlink(&mut self, vertex: VertexIndex, is_source_list: bool, pos: usize) {
        if pos == NONE {
            return;
        }

        let list = self.list_for(vertex, is_source_list);
        let was_last = pos == list.len() - 1;
        list.swap_remove(pos);

        if !was_last {
            let moved = list[pos];
            let moved_source = self.endpoints.source(moved.index());
            if moved_source == vertex {
                self.slots[moved.index()][0] = pos;
            } else {
                self.slots[moved.index()][1] = pos;
            }
        }
    }

    /// Appends `edge` to `vertex`'s list, recording its slot.
    fn link(&mut self, vertex: VertexIndex, is_source_list: bool, edge: EdgeIndex) {
        let list = self.list_for(vertex, is_source_list);
        let pos = list.len();
        list.push(edge);

        if is_source_list {
            self.slots[edge.index()][0] = pos;
        } else {
            self.slots[edge.index()][1] = pos;
        }
    }

    fn rewrite_reference(&mut self, vertex: VertexIndex, is_source_list: bool, pos: usize, new_edge: EdgeIndex) {
        if pos == NONE {
            return;
        }
        self.list_for(vertex, is_source_list)[pos] = new_edge;
    }

    /// Links `edge` into its current (source, target) adjacency lists, recording fresh slots.
    ///
    /// Used by both `add_edge` (fresh edge) and `move_edge`/`reverse_edge` (same edge, new
    /// endpoints), so an edge's [`EdgeIndex`] survives a move or a reversal instead of being
    /// renumbered the way a naive remove-then-add would.
    fn link_edge_pair(&mut self, edge: EdgeIndex) {
        let source = self.endpoints.source(edge.index());
        let target = self.endpoints.target(edge.index());

        if self.capabilities.is_directed() {
            self.link(source, true, edge);
            self.link(target, false, edge);
        } else if source == target {
            self.link(source, true, edge);
        } else {
            self.link(source, true, edge);
            let source_pos = self.slots[edge.index()][0];
            self.link(target, true, edge);
            let target_pos = self.slots[edge.index()][0];
            self.slots[edge.index()] = [source_pos, target_pos];
        }
    }

    /// The inverse of [`Self::link_edge_pair`]: removes `edge` from its current adjacency lists,
    /// leaving its endpoints and weight untouched.
    fn unlink_edge_pair(&mut self, edge: EdgeIndex) {
        let source = self.endpoints.source(edge.index());
        let target = self.endpoints.target(edge.index());
        let [source_pos, target_pos] = self.slots[edge.index()];

        if self.capabilities.is_directed() {
            self.unlink(source, true, source_pos);
            self.unlink(target, false, target_pos);
        } else if source == target {
            self.unlink(source, true, source_pos);
        } else {
            self.unlink(source, true, source_pos);
            self.unlink(target, true, target_pos);
        }

        self.slots[edge.index()] = [NONE, NONE];
    }
}

impl<V, E> TopologyStore for ArrayStore<V, E>
where
    V: Clone + Default,
    E: Clone + Default,
{
    type VertexWeight = V;
    type EdgeWeight = E;

    fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            endpoints: Endpoints::new(),
            vertex_weights: Weights::new(V::default()),
            edge_weights: Weights::new(E::default()),
            out_adj: Vec::new(),
            in_adj: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn with_capacity(capabilities: Capabilities, vertices: usize, edges: usize) -> Self {
        Self {
            capabilities,
            endpoints: Endpoints::new(),
            vertex_weights: Weights::with_capacity(vertices, V::default()),
            edge_weights: Weights::with_capacity(edges, E::default()),
            out_adj: Vec::with_capacity(vertices),
            in_adj: Vec::with_capacity(vertices),
            slots: Vec::with_capacity(edges),
        }
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
        Ok(self.out_adj[vertex.index()].clone())
    }

    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), vertex)?;
        if self.capabilities.is_directed() {
            Ok(self.in_adj[vertex.index()].clone())
        } else {
            Ok(self.out_adj[vertex.index()].clone())
        }
    }

    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>> {
        Ok(self.get_edges(u, v)?.first().copied())
    }

    fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), u)?;
        check_vertex(self.num_vertices(), v)?;

        let mut found = Vec::new();
        for &edge in &self.out_adj[u.index()] {
            let (source, target) = (
                self.endpoints.source(edge.index()),
                self.endpoints.target(edge.index()),
            );
            let matches = if self.capabilities.is_directed() {
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

    fn add_vertex(&mut self, weight: Self::VertexWeight) -> GraphResult<VertexIndex> {
        let index = VertexIndex::new(self.num_vertices());
        self.out_adj.push(Vec::new());
        self.in_adj.push(Vec::new());
        self.vertex_weights.append();
        self.vertex_weights.set(index.index(), weight);
        debug_assert_eq!(self.out_adj.len(), self.vertex_weights.len());
        Ok(index)
    }

    fn remove_vertex(&mut self, vertex: VertexIndex) -> GraphResult<Self::VertexWeight> {
        check_vertex(self.num_vertices(), vertex)?;
        self.remove_edges_of(vertex)?;

        let n = self.num_vertices();
        let last = n - 1;
        let removed_weight = self.vertex_weights.get(vertex.index()).clone();

        if vertex.index() != last {
            let last_index = VertexIndex::new(last);
            self.out_adj.swap(vertex.index(), last);
            self.in_adj.swap(vertex.index(), last);

            // Every edge now living in vertex's slot used to reference `last`; re-peg it.
            let out_edges = self.out_adj[vertex.index()].clone();
            let in_edges = self.in_adj[vertex.index()].clone();
            for edge in out_edges.into_iter().chain(in_edges) {
                self.endpoints
                    .replace_endpoint(edge.index(), last_index, vertex);
            }
        }
        self.vertex_weights.swap_remove(vertex.index(), last);

        self.out_adj.truncate(last);
        self.in_adj.truncate(last);
        debug_assert_eq!(self.out_adj.len(), self.vertex_weights.len());
        Ok(removed_weight)
    }

    fn add_edge(
        &mut self,
        u: VertexIndex,
        v: VertexIndex,
        weight: Self::EdgeWeight,
    ) -> GraphResult<EdgeIndex> {
        check_vertex(self.num_vertices(), u)?;
        check_vertex(self.num_vertices(), v)?;

        if u == v && !self.capabilities.allows_self_edges() {
            return Err(report!(GraphError::SelfEdgeViolation));
        }
        if !self.capabilities.allows_parallel_edges() && self.get_edge(u, v)?.is_some() {
            return Err(report!(GraphError::ParallelEdgeViolation));
        }

        let edge = EdgeIndex::new(self.num_edges());
        self.endpoints.push(u, v);
        self.edge_weights.append();
        self.edge_weights.set(edge.index(), weight);
        self.slots.push([NONE, NONE]);
        self.link_edge_pair(edge);

        debug_assert_eq!(self.endpoints.len(), self.edge_weights.len());
        debug_assert_eq!(self.source(edge).unwrap(), u);
        debug_assert_eq!(self.target(edge).unwrap(), v);
        Ok(edge)
    }

    fn remove_edge(&mut self, edge: EdgeIndex) -> GraphResult<Self::EdgeWeight> {
        check_edge(self.num_edges(), edge)?;

        let directed = self.capabilities.is_directed();
        self.unlink_edge_pair(edge);

        let removed_weight = self.edge_weights.get(edge.index()).clone();
        let last = self.num_edges() - 1;

        if edge.index() != last {
            let last_source = self.endpoints.source(last);
            let last_target = self.endpoints.target(last);
            let [last_source_pos, last_target_pos] = self.slots[last];

            self.rewrite_reference(last_source, true, last_source_pos, edge);
            if directed {
                self.rewrite_reference(last_target, false, last_target_pos, edge);
            } else if last_target != last_source {
                self.rewrite_reference(last_target, true, last_target_pos, edge);
            }

            self.endpoints.swap_remove(edge.index(), last);
            self.edge_weights.swap_remove(edge.index(), last);
            self.slots[edge.index()] = self.slots[last];
        } else {
            self.endpoints.swap_remove(edge.index(), last);
            self.edge_weights.swap_remove(edge.index(), last);
        }
        self.slots.truncate(last);

        debug_assert_eq!(self.endpoints.len(), self.edge_weights.len());
        Ok(removed_weight)
    }

    fn move_edge(
        &mut self,
        edge: EdgeIndex,
        new_source: VertexIndex,
        new_target: VertexIndex,
    ) -> GraphResult<()> {
        check_edge(self.num_edges(), edge)?;
        check_vertex(self.num_vertices(), new_source)?;
        check_vertex(self.num_vertices(), new_target)?;

        if new_source == new_target && !self.capabilities.allows_self_edges() {
            return Err(report!(GraphError::SelfEdgeViolation));
        }
        if !self.capabilities.allows_parallel_edges() {
            if let Some(existing) = self.get_edge(new_source, new_target)? {
                if existing != edge {
                    return Err(report!(GraphError::ParallelEdgeViolation));
                }
            }
        }

        self.unlink_edge_pair(edge);
        self.endpoints.set(edge.index(), new_source, new_target);
        self.link_edge_pair(edge);
        debug_assert_eq!(self.source(edge).unwrap(), new_source);
        debug_assert_eq!(self.target(edge).unwrap(), new_target);
        Ok(())
    }

    fn reverse_edge(&mut self, edge: EdgeIndex) -> GraphResult<()> {
        check_edge(self.num_edges(), edge)?;
        if self.endpoints.source(edge.index()) == self.endpoints.target(edge.index()) {
            return Ok(());
        }

        self.unlink_edge_pair(edge);
        self.endpoints.reverse(edge.index());
        self.link_edge_pair(edge);
        Ok(())
    }

    fn clear(&mut self) {
        self.out_adj.clear();
        self.in_adj.clear();
        self.endpoints.clear();
        self.vertex_weights.clear();
        self.edge_weights.clear();
        self.slots.clear();
    }

    fn clear_edges(&mut self) {
        for list in self.out_adj.iter_mut().chain(self.in_adj.iter_mut()) {
            list.clear();
        }
        self.endpoints.clear();
        self.edge_weights.clear();
        self.slots.clear();
    }

    fn vertex_weight(&self, vertex: VertexIndex) -> GraphResult<&Self::VertexWeight> {
        check_vertex(self.num_vertices(), vertex)?;
        Ok(self.vertex_weights.get(vertex.index()))
    }

    fn vertex_weight_mut(&mut self, vertex: VertexIndex) -> GraphResult<&mut Self::VertexWeight> {
        check_vertex(self.num_vertices(), vertex)?;
        Ok(self.vertex_weights.get_mut(vertex.index()))
    }

    fn edge_weight(&self, edge: EdgeIndex) -> GraphResult<&Self::EdgeWeight> {
        check_edge(self.num_edges(), edge)?;
        Ok(self.edge_weights.get(edge.index()))
    }

    fn edge_weight_mut(&mut self, edge: EdgeIndex) -> GraphResult<&mut Self::EdgeWeight> {
        check_edge(self.num_edges(), edge)?;
        Ok(self.edge_weights.get_mut(edge.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directed() -> ArrayStore<(), ()> {
        ArrayStore::new(Capabilities::new(true, false, false))
    }

    fn undirected_with_self_edges() -> ArrayStore<(), ()> {
        ArrayStore::new(Capabilities::new(false, true, false))
    }

    /// §8 Scenario A: directed, no parallel, no self.
    #[test]
    fn scenario_a_directed_no_parallel_no_self() {
        let mut g = directed();
        for _ in 0..4 {
            g.add_vertex(()).unwrap();
        }
        let v = |i: usize| VertexIndex::new(i);

        let e0 = g.add_edge(v(0), v(1), ()).unwrap();
        let e1 = g.add_edge(v(0), v(2), ()).unwrap();
        let e2 = g.add_edge(v(2), v(3), ()).unwrap();
        let e3 = g.add_edge(v(1), v(3), ()).unwrap();

        assert_eq!(g.out_edges(v(0)).unwrap(), alloc::vec![e0, e1]);
        assert_eq!(g.in_edges(v(3)).unwrap(), alloc::vec![e2, e3]);
        assert_eq!(g.get_edge(v(0), v(1)).unwrap(), Some(e0));
        assert_eq!(g.get_edge(v(1), v(0)).unwrap(), None);
    }

    /// §8 Scenario B: undirected with self-edges, array backend.
    #[test]
    fn scenario_b_undirected_self_edges() {
        let mut g = undirected_with_self_edges();
        for _ in 0..3 {
            g.add_vertex(()).unwrap();
        }
        let v = |i: usize| VertexIndex::new(i);

        let e0 = g.add_edge(v(0), v(0), ()).unwrap();
        let e1 = g.add_edge(v(0), v(1), ()).unwrap();
        let e2 = g.add_edge(v(1), v(2), ()).unwrap();

        assert_eq!(g.incident_edges(v(0)).unwrap(), alloc::vec![e0, e1]);
        assert_eq!(g.incident_edges(v(1)).unwrap(), alloc::vec![e1, e2]);
        assert_eq!(g.incident_edges(v(2)).unwrap(), alloc::vec![e2]);
        assert_eq!(g.num_edges(), 3);
    }

    /// §8 Scenario D: vertex removal swaps the last vertex in and re-pegs its edges.
    #[test]
    fn scenario_d_vertex_removal() {
        let mut g = ArrayStore::<(), ()>::new(Capabilities::new(false, false, false));
        for _ in 0..4 {
            g.add_vertex(()).unwrap();
        }
        let v = |i: usize| VertexIndex::new(i);
        g.add_edge(v(0), v(1), ()).unwrap();
        g.add_edge(v(2), v(3), ()).unwrap();
        g.add_edge(v(1), v(2), ()).unwrap();

        g.remove_vertex(v(1)).unwrap();

        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 1);
        // Edges (0,1) and (1,2) were incident to the removed vertex and are gone; only (2,3)
        // survives. Old vertex 3 is swapped into slot 1, so the surviving edge now reads (2, 1).
        let remaining = EdgeIndex::new(0);
        let (s, t) = (g.source(remaining).unwrap(), g.target(remaining).unwrap());
        assert!((s == v(2) && t == v(1)) || (s == v(1) && t == v(2)));
    }

    #[test]
    fn self_edge_violation_rejected_and_graph_unchanged() {
        let mut g = directed();
        g.add_vertex(()).unwrap();
        let before = g.num_edges();
        assert!(g.add_edge(VertexIndex::new(0), VertexIndex::new(0), ()).is_err());
        assert_eq!(g.num_edges(), before);
    }

    #[test]
    fn parallel_edge_violation_rejected_and_graph_unchanged() {
        let mut g = directed();
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();
        g.add_edge(VertexIndex::new(0), VertexIndex::new(1), ()).unwrap();
        let before = g.num_edges();
        assert!(g.add_edge(VertexIndex::new(0), VertexIndex::new(1), ()).is_err());
        assert_eq!(g.num_edges(), before);
    }

    /// §8 invariant 13: a graph with vertices but no edges has empty adjacency and no `getEdge`.
    #[test]
    fn edgeless_graph_has_no_edges_or_adjacency() {
        let mut g = directed();
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();
        assert!(g.out_edges(VertexIndex::new(0)).unwrap().is_empty());
        assert_eq!(g.get_edge(VertexIndex::new(0), VertexIndex::new(1)).unwrap(), None);
    }

    #[test]
    fn reverse_edge_is_involutive() {
        let mut g = directed();
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();
        let e = g.add_edge(VertexIndex::new(0), VertexIndex::new(1), ()).unwrap();

        g.reverse_edge(e).unwrap();
        assert_eq!(g.source(e).unwrap(), VertexIndex::new(1));
        assert_eq!(g.target(e).unwrap(), VertexIndex::new(0));

        g.reverse_edge(e).unwrap();
        assert_eq!(g.source(e).unwrap(), VertexIndex::new(0));
        assert_eq!(g.target(e).unwrap(), VertexIndex::new(1));
    }

    #[test]
    fn remove_edge_then_readd_restores_prior_edge_count() {
        let mut g = directed();
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();
        g.add_edge(VertexIndex::new(0), VertexIndex::new(1), ()).unwrap();
        let before = g.num_edges();

        let e = g.add_edge(VertexIndex::new(1), VertexIndex::new(0), ()).unwrap();
        g.remove_edge(e).unwrap();

        assert_eq!(g.num_edges(), before);
    }
}

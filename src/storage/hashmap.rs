//! The hashmap adjacency backend (§4.4.c).
//!
//! Each vertex's adjacency is an [`IndexMap<VertexIndex, Vec<EdgeIndex>>`]: neighbor vertex to the
//! (usually single-element) bucket of parallel edges running to it. This gives expected O(1)
//! `get_edge`/`get_edges` lookups — the array and linked backends must walk an entire adjacency
//! list to answer "is there an edge between u and v" — at the cost of a small linear scan within a
//! neighbor's bucket on insert/remove, and of a key-rename pass across affected neighbors'
//! maps when a vertex is swap-removed (§4.4, §8 invariant 4): unlike the other two backends,
//! adjacency here is keyed by vertex identity, not just by edge identity, so removing vertex `v`
//! by swapping in the last vertex also means renaming that vertex in every neighbor's map.
use alloc::vec::Vec;

use error_stack::report;
use indexmap::IndexMap;

use crate::{
    capability::Capabilities,
    endpoints::Endpoints,
    error::{GraphError, GraphResult},
    index::{EdgeIndex, VertexIndex},
    storage::{check_edge, check_vertex, TopologyStore},
    weight::Weights,
};

type NeighborMap = IndexMap<VertexIndex, Vec<EdgeIndex>>;

/// The hashmap-backed mutable topology store.
pub struct HashMapStore<V, E> {
    capabilities: Capabilities,
    endpoints: Endpoints,
    vertex_weights: Weights<V>,
    edge_weights: Weights<E>,
    /// Out-adjacency (directed) or incidence (undirected), keyed by vertex then by neighbor.
    out_adj: Vec<NeighborMap>,
    /// In-adjacency, keyed by vertex then by neighbor. Left empty for undirected graphs.
    in_adj: Vec<NeighborMap>,
}

impl<V, E> HashMapStore<V, E>
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

    fn map_for(&mut self, vertex: VertexIndex, is_source_list: bool) -> &mut NeighborMap {
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

    fn push_into(&mut self, vertex: VertexIndex, neighbor: VertexIndex, is_source_list: bool, edge: EdgeIndex) {
        self.map_for(vertex, is_source_list)
            .entry(neighbor)
            .or_default()
            .push(edge);
    }

    fn remove_from(&mut self, vertex: VertexIndex, neighbor: VertexIndex, is_source_list: bool, edge: EdgeIndex) {
        let map = self.map_for(vertex, is_source_list);
        let Some(bucket) = map.get_mut(&neighbor) else {
            return;
        };
        if let Some(pos) = bucket.iter().position(|&e| e == edge) {
            bucket.swap_remove(pos);
        }
        if bucket.is_empty() {
            map.shift_remove(&neighbor);
        }
    }

    fn rewrite_in(
        &mut self,
        vertex: VertexIndex,
        neighbor: VertexIndex,
        is_source_list: bool,
        old_edge: EdgeIndex,
        new_edge: EdgeIndex,
    ) {
        let map = self.map_for(vertex, is_source_list);
        if let Some(bucket) = map.get_mut(&neighbor) {
            if let Some(pos) = bucket.iter().position(|&e| e == old_edge) {
                bucket[pos] = new_edge;
            }
        }
    }

    fn rename_vertex_key(&mut self, holder: VertexIndex, is_source_list: bool, old: VertexIndex, new: VertexIndex) {
        let map = self.map_for(holder, is_source_list);
        if let Some(bucket) = map.shift_remove(&old) {
            map.insert(new, bucket);
        }
    }

    fn link_edge_pair(&mut self, edge: EdgeIndex) {
        let source = self.endpoints.source(edge.index());
        let target = self.endpoints.target(edge.index());

        if self.capabilities.is_directed() {
            self.push_into(source, target, true, edge);
            self.push_into(target, source, false, edge);
        } else if source == target {
            self.push_into(source, target, true, edge);
        } else {
            self.push_into(source, target, true, edge);
            self.push_into(target, source, true, edge);
        }
    }

    fn unlink_edge_pair(&mut self, edge: EdgeIndex) {
        let source = self.endpoints.source(edge.index());
        let target = self.endpoints.target(edge.index());

        if self.capabilities.is_directed() {
            self.remove_from(source, target, true, edge);
            self.remove_from(target, source, false, edge);
        } else if source == target {
            self.remove_from(source, target, true, edge);
        } else {
            self.remove_from(source, target, true, edge);
            self.remove_from(target, source, true, edge);
        }
    }

    fn rewrite_edge_pair(&mut self, old_edge: EdgeIndex, new_edge: EdgeIndex) {
        let source = self.endpoints.source(old_edge.index());
        let target = self.endpoints.target(old_edge.index());

        if self.capabilities.is_directed() {
            self.rewrite_in(source, target, true, old_edge, new_edge);
            self.rewrite_in(target, source, false, old_edge, new_edge);
        } else if source == target {
            self.rewrite_in(source, target, true, old_edge, new_edge);
        } else {
            self.rewrite_in(source, target, true, old_edge, new_edge);
            self.rewrite_in(target, source, true, old_edge, new_edge);
        }
    }
}

impl<V, E> TopologyStore for HashMapStore<V, E>
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
        Ok(self.out_adj[vertex.index()]
            .values()
            .flatten()
            .copied()
            .collect())
    }

    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), vertex)?;
        let map = if self.capabilities.is_directed() {
            &self.in_adj[vertex.index()]
        } else {
            &self.out_adj[vertex.index()]
        };
        Ok(map.values().flatten().copied().collect())
    }

    fn get_edge(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Option<EdgeIndex>> {
        check_vertex(self.num_vertices(), u)?;
        check_vertex(self.num_vertices(), v)?;
        Ok(self.out_adj[u.index()].get(&v).and_then(|bucket| bucket.first()).copied())
    }

    fn get_edges(&self, u: VertexIndex, v: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), u)?;
        check_vertex(self.num_vertices(), v)?;
        Ok(self
            .out_adj[u.index()]
            .get(&v)
            .cloned()
            .unwrap_or_default())
    }

    fn add_vertex(&mut self, weight: Self::VertexWeight) -> GraphResult<VertexIndex> {
        let index = VertexIndex::new(self.num_vertices());
        self.out_adj.push(NeighborMap::new());
        self.in_adj.push(NeighborMap::new());
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

            if self.capabilities.is_directed() {
                let out_neighbors: Vec<VertexIndex> =
                    self.out_adj[vertex.index()].keys().copied().collect();
                for n in out_neighbors {
                    let holder = if n == last_index { vertex } else { n };
                    self.rename_vertex_key(holder, false, last_index, vertex);
                }
                let in_neighbors: Vec<VertexIndex> =
                    self.in_adj[vertex.index()].keys().copied().collect();
                for n in in_neighbors {
                    let holder = if n == last_index { vertex } else { n };
                    self.rename_vertex_key(holder, true, last_index, vertex);
                }
            } else {
                let neighbors: Vec<VertexIndex> =
                    self.out_adj[vertex.index()].keys().copied().collect();
                for n in neighbors {
                    let holder = if n == last_index { vertex } else { n };
                    self.rename_vertex_key(holder, true, last_index, vertex);
                }
            }

            let edges: Vec<EdgeIndex> = self.out_adj[vertex.index()]
                .values()
                .chain(self.in_adj[vertex.index()].values())
                .flatten()
                .copied()
                .collect();
            for edge in edges {
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
        self.link_edge_pair(edge);

        debug_assert_eq!(self.endpoints.len(), self.edge_weights.len());
        debug_assert_eq!(self.source(edge).unwrap(), u);
        debug_assert_eq!(self.target(edge).unwrap(), v);
        Ok(edge)
    }

    fn remove_edge(&mut self, edge: EdgeIndex) -> GraphResult<Self::EdgeWeight> {
        check_edge(self.num_edges(), edge)?;

        self.unlink_edge_pair(edge);

        let removed_weight = self.edge_weights.get(edge.index()).clone();
        let last = self.num_edges() - 1;

        if edge.index() != last {
            let last_edge = EdgeIndex::new(last);
            self.rewrite_edge_pair(last_edge, edge);
            self.endpoints.swap_remove(edge.index(), last);
            self.edge_weights.swap_remove(edge.index(), last);
        } else {
            self.endpoints.swap_remove(edge.index(), last);
            self.edge_weights.swap_remove(edge.index(), last);
        }

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
    }

    fn clear_edges(&mut self) {
        for map in self.out_adj.iter_mut().chain(self.in_adj.iter_mut()) {
            map.clear();
        }
        self.endpoints.clear();
        self.edge_weights.clear();
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

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    /// §8 Scenario F: directed hashmap backend with parallel edges allowed.
    #[test]
    fn scenario_f_parallel_edges() {
        let mut g: HashMapStore<(), ()> = HashMapStore::new(Capabilities::new(true, false, true));
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();

        let e0 = g.add_edge(v(0), v(1), ()).unwrap();
        let e1 = g.add_edge(v(0), v(1), ()).unwrap();

        let mut edges = g.get_edges(v(0), v(1)).unwrap();
        edges.sort();
        let mut expected = alloc::vec![e0, e1];
        expected.sort();
        assert_eq!(edges, expected);

        let one = g.get_edge(v(0), v(1)).unwrap();
        assert!(one == Some(e0) || one == Some(e1));

        g.remove_edge(e0).unwrap();
        assert_eq!(g.get_edges(v(0), v(1)).unwrap().len(), 1);
    }

    #[test]
    fn self_edge_violation_rejected() {
        let mut g: HashMapStore<(), ()> = HashMapStore::new(Capabilities::new(true, false, false));
        g.add_vertex(()).unwrap();
        assert!(g.add_edge(v(0), v(0), ()).is_err());
    }

    #[test]
    fn parallel_edge_violation_rejected() {
        let mut g: HashMapStore<(), ()> = HashMapStore::new(Capabilities::new(true, false, false));
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();
        g.add_edge(v(0), v(1), ()).unwrap();
        assert!(g.add_edge(v(0), v(1), ()).is_err());
    }

    #[test]
    fn vertex_removal_renames_neighbor_keys() {
        let mut g: HashMapStore<(), ()> = HashMapStore::new(Capabilities::new(false, false, false));
        for _ in 0..4 {
            g.add_vertex(()).unwrap();
        }
        g.add_edge(v(0), v(1), ()).unwrap();
        g.add_edge(v(2), v(3), ()).unwrap();
        g.add_edge(v(1), v(2), ()).unwrap();

        g.remove_vertex(v(1)).unwrap();

        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 1);
        // The survivor used to be (2, 3); vertex 3 was swapped into slot 1.
        assert!(g.get_edge(v(2), v(1)).unwrap().is_some());
    }

    #[test]
    fn reverse_edge_is_involutive() {
        let mut g: HashMapStore<(), ()> = HashMapStore::new(Capabilities::new(true, false, false));
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();
        let e = g.add_edge(v(0), v(1), ()).unwrap();

        g.reverse_edge(e).unwrap();
        assert_eq!(g.source(e).unwrap(), v(1));
        assert_eq!(g.target(e).unwrap(), v(0));
        assert!(g.get_edge(v(0), v(1)).unwrap().is_none());
        assert_eq!(g.get_edge(v(1), v(0)).unwrap(), Some(e));
    }
}

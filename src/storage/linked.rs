//! The linked adjacency backend (§4.4.b).
//!
//! Each vertex's adjacency is an intrusive doubly-linked list threaded through two flat arrays,
//! `next`/`prev`, indexed not by edge but by *link id* — `edge_index * 2 + role`, where role `0` is
//! the node an edge occupies in its source vertex's list and role `1` is the node it occupies in
//! its target vertex's list (for an undirected pair) or in the target's dedicated in-list (for a
//! directed graph). New edges are inserted at the head of a vertex's list, so `add_edge`/
//! `remove_edge` touch a constant number of pointers regardless of degree — no scan, unlike
//! [`super::array`]'s `Vec`-backed lists.

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

const fn link_id(edge: EdgeIndex, role: usize) -> usize {
    edge.index() * 2 + role
}

const fn edge_of_link(link: usize) -> EdgeIndex {
    EdgeIndex::new(link / 2)
}

/// The linked-list-backed mutable topology store.
pub struct LinkedStore<V, E> {
    capabilities: Capabilities,
    endpoints: Endpoints,
    vertex_weights: Weights<V>,
    edge_weights: Weights<E>,
    /// Head link id of each vertex's out-adjacency (directed) or incidence (undirected) list.
    heads_out: Vec<usize>,
    /// Head link id of each vertex's in-adjacency list. Unused for undirected graphs.
    heads_in: Vec<usize>,
    next: Vec<usize>,
    prev: Vec<usize>,
}

impl<V, E> LinkedStore<V, E>
where
    V: Clone + Default,
    E: Clone + Default,
{
    fn num_vertices(&self) -> usize {
        self.heads_out.len()
    }

    fn num_edges(&self) -> usize {
        self.endpoints.len()
    }

    fn head_mut(&mut self, vertex: VertexIndex, role: usize) -> &mut usize {
        if self.capabilities.is_directed() && role == 1 {
            &mut self.heads_in[vertex.index()]
        } else {
            &mut self.heads_out[vertex.index()]
        }
    }

    fn head(&self, vertex: VertexIndex, role: usize) -> usize {
        if self.capabilities.is_directed() && role == 1 {
            self.heads_in[vertex.index()]
        } else {
            self.heads_out[vertex.index()]
        }
    }

    fn collect_chain(&self, mut link: usize) -> Vec<EdgeIndex> {
        let mut out = Vec::new();
        while link != NONE {
            out.push(edge_of_link(link));
            link = self.next[link];
        }
        out
    }

    fn link(&mut self, vertex: VertexIndex, role: usize, edge: EdgeIndex) {
        let lid = link_id(edge, role);
        let old_head = self.head(vertex, role);
        self.next[lid] = old_head;
        self.prev[lid] = NONE;
        if old_head != NONE {
            self.prev[old_head] = lid;
        }
        *self.head_mut(vertex, role) = lid;
    }

    fn unlink(&mut self, vertex: VertexIndex, role: usize, edge: EdgeIndex) {
        let lid = link_id(edge, role);
        let p = self.prev[lid];
        let n = self.next[lid];

        if p == NONE {
            *self.head_mut(vertex, role) = n;
        } else {
            self.next[p] = n;
        }
        if n != NONE {
            self.prev[n] = p;
        }

        self.next[lid] = NONE;
        self.prev[lid] = NONE;
    }

    /// Links `edge` into its current (source, target) adjacency lists.
    fn link_edge_pair(&mut self, edge: EdgeIndex) {
        let source = self.endpoints.source(edge.index());
        let target = self.endpoints.target(edge.index());

        if self.capabilities.is_directed() {
            self.link(source, 0, edge);
            self.link(target, 1, edge);
        } else if source == target {
            self.link(source, 0, edge);
        } else {
            self.link(source, 0, edge);
            self.link(target, 1, edge);
        }
    }

    /// The inverse of [`Self::link_edge_pair`].
    fn unlink_edge_pair(&mut self, edge: EdgeIndex) {
        let source = self.endpoints.source(edge.index());
        let target = self.endpoints.target(edge.index());

        if self.capabilities.is_directed() {
            self.unlink(source, 0, edge);
            self.unlink(target, 1, edge);
        } else if source == target {
            self.unlink(source, 0, edge);
        } else {
            self.unlink(source, 0, edge);
            self.unlink(target, 1, edge);
        }
    }

    /// Re-points every pointer that referenced `from_edge`'s link nodes at `to_edge`'s link nodes
    /// instead, moving the underlying `next`/`prev` data along with it. Used when the edge index
    /// set swap-removes `from_edge == last` into the slot vacated by `to_edge`.
    fn migrate_links(&mut self, from_edge: EdgeIndex, to_edge: EdgeIndex) {
        let source = self.endpoints.source(from_edge.index());
        let target = self.endpoints.target(from_edge.index());
        let directed = self.capabilities.is_directed();

        self.migrate_one(source, 0, from_edge, to_edge);
        if directed || target != source {
            let role = if directed { 1 } else { 0 };
            self.migrate_one(target, role, from_edge, to_edge);
        }
    }

    fn migrate_one(&mut self, vertex: VertexIndex, role: usize, from_edge: EdgeIndex, to_edge: EdgeIndex) {
        let old_lid = link_id(from_edge, role);
        let new_lid = link_id(to_edge, role);
        let p = self.prev[old_lid];
        let n = self.next[old_lid];

        if p == NONE {
            *self.head_mut(vertex, role) = new_lid;
        } else {
            self.next[p] = new_lid;
        }
        if n != NONE {
            self.prev[n] = new_lid;
        }

        self.next[new_lid] = n;
        self.prev[new_lid] = p;
    }
}

impl<V, E> TopologyStore for LinkedStore<V, E>
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
            heads_out: Vec::new(),
            heads_in: Vec::new(),
            next: Vec::new(),
            prev: Vec::new(),
        }
    }

    fn with_capacity(capabilities: Capabilities, vertices: usize, edges: usize) -> Self {
        Self {
            capabilities,
            endpoints: Endpoints::new(),
            vertex_weights: Weights::with_capacity(vertices, V::default()),
            edge_weights: Weights::with_capacity(edges, E::default()),
            heads_out: Vec::with_capacity(vertices),
            heads_in: Vec::with_capacity(vertices),
            next: Vec::with_capacity(edges * 2),
            prev: Vec::with_capacity(edges * 2),
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
        Ok(self.collect_chain(self.heads_out[vertex.index()]))
    }

    fn in_edges(&self, vertex: VertexIndex) -> GraphResult<Vec<EdgeIndex>> {
        check_vertex(self.num_vertices(), vertex)?;
        if self.capabilities.is_directed() {
            Ok(self.collect_chain(self.heads_in[vertex.index()]))
        } else {
            Ok(self.collect_chain(self.heads_out[vertex.index()]))
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
        let mut link = self.heads_out[u.index()];
        while link != NONE {
            let edge = edge_of_link(link);
            let (source, target) = (
                self.endpoints.source(edge.index()),
                self.endpoints.target(edge.index()),
            );
            let matches = if directed {
                source == u && target == v
            } else {
                (source == u && target == v) || (source == v && target == u)
            };
            if matches {
                found.push(edge);
            }
            link = self.next[link];
        }
        Ok(found)
    }

    fn add_vertex(&mut self, weight: Self::VertexWeight) -> GraphResult<VertexIndex> {
        let index = VertexIndex::new(self.num_vertices());
        self.heads_out.push(NONE);
        self.heads_in.push(NONE);
        self.vertex_weights.append();
        self.vertex_weights.set(index.index(), weight);
        debug_assert_eq!(self.heads_out.len(), self.vertex_weights.len());
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
            self.heads_out.swap(vertex.index(), last);
            self.heads_in.swap(vertex.index(), last);

            let out_edges = self.collect_chain(self.heads_out[vertex.index()]);
            let in_edges = self.collect_chain(self.heads_in[vertex.index()]);
            for edge in out_edges.into_iter().chain(in_edges) {
                self.endpoints
                    .replace_endpoint(edge.index(), last_index, vertex);
            }
        }
        self.vertex_weights.swap_remove(vertex.index(), last);

        self.heads_out.truncate(last);
        self.heads_in.truncate(last);
        debug_assert_eq!(self.heads_out.len(), self.vertex_weights.len());
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
        self.next.push(NONE);
        self.next.push(NONE);
        self.prev.push(NONE);
        self.prev.push(NONE);
        self.link_edge_pair(edge);

        debug_assert_eq!(self.endpoints.len(), self.edge_weights.len());
        debug_assert_eq!(self.next.len(), self.num_edges() * 2);
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
            self.migrate_links(last_edge, edge);
            self.endpoints.swap_remove(edge.index(), last);
            self.edge_weights.swap_remove(edge.index(), last);
        } else {
            self.endpoints.swap_remove(edge.index(), last);
            self.edge_weights.swap_remove(edge.index(), last);
        }

        self.next.truncate(last * 2);
        self.prev.truncate(last * 2);

        debug_assert_eq!(self.endpoints.len(), self.edge_weights.len());
        debug_assert_eq!(self.next.len(), self.num_edges() * 2);
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
        self.heads_out.clear();
        self.heads_in.clear();
        self.endpoints.clear();
        self.vertex_weights.clear();
        self.edge_weights.clear();
        self.next.clear();
        self.prev.clear();
    }

    fn clear_edges(&mut self) {
        for head in self.heads_out.iter_mut().chain(self.heads_in.iter_mut()) {
            *head = NONE;
        }
        self.endpoints.clear();
        self.edge_weights.clear();
        self.next.clear();
        self.prev.clear();
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

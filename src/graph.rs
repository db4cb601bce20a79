//! The typed, id-bridging facade over a [`TopologyStore`] (§4.7, §6).
//!
//! [`Graph`] is this crate's counterpart to `petgraph_core::graph::Graph<S>`: a thin wrapper
//! generic over its storage backend `S`. Where `petgraph_core::graph::Graph` layers node/edge
//! *index* management on top of `GraphStorage`, this `Graph` layers an opaque-identifier bridge
//! ([`IdIndexMap`]) and a registry of additional named weight arrays ([`WeightRegistry`]) on top
//! of [`TopologyStore`] — the two concerns §4.7 and §4.2 describe as living "external" to a
//! backend's own arrays.
//!
//! The integer fast path (`Id = VertexIndex`/`EdgeIndex` via [`IdIndexMap::Identity`]) costs
//! nothing beyond the backend itself; the typed path ([`IdIndexMap::Mapped`]) adds one dense array
//! and one hash map per id space.

use alloc::string::String;
use core::hash::Hash;

use crate::{
    error::GraphResult,
    id::{BoxedMinter, IdIndexMap},
    index::{EdgeIndex, VertexIndex},
    storage::TopologyStore,
    weight::{Weights, WeightRegistry},
};

/// A [`TopologyStore`] plus the id/index bridge and named weight registries composed on top of it
/// (§4.7, §6).
///
/// `Id` defaults to `usize` for callers happy with the integer fast path; anything `Copy + Eq +
/// Hash + TryFrom<usize> + Into<usize>` works as an opaque identifier for the typed path (a thin
/// newtype over an integer is the common case — see §9's note on `addVertex`/`addEdge`'s pluggable
/// minting contract).
pub struct Graph<S, Id = usize> {
    storage: S,
    vertex_ids: IdIndexMap<Id>,
    edge_ids: IdIndexMap<Id>,
    vertex_minter: Option<BoxedMinter<Id>>,
    edge_minter: Option<BoxedMinter<Id>>,
    vertex_weights_registry: WeightRegistry<String>,
    edge_weights_registry: WeightRegistry<String>,
}

impl<S, Id> Graph<S, Id>
where
    S: TopologyStore,
    Id: Copy + Eq + Hash,
{
    /// Wraps `storage` with the integer fast path: identifiers are indices (§4.7, "Identity").
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            vertex_ids: IdIndexMap::Identity,
            edge_ids: IdIndexMap::Identity,
            vertex_minter: None,
            edge_minter: None,
            vertex_weights_registry: WeightRegistry::new(),
            edge_weights_registry: WeightRegistry::new(),
        }
    }

    /// Wraps `storage` with a real id bijection (§4.7, "Mapped"), minting fresh ids with
    /// `vertex_minter`/`edge_minter` whenever a caller adds a vertex/edge without supplying one
    /// explicitly.
    #[must_use]
    pub fn with_id_map(
        storage: S,
        vertex_minter: BoxedMinter<Id>,
        edge_minter: BoxedMinter<Id>,
    ) -> Self {
        Self {
            storage,
            vertex_ids: IdIndexMap::Mapped(crate::id::MappedIds::new()),
            edge_ids: IdIndexMap::Mapped(crate::id::MappedIds::new()),
            vertex_minter: Some(vertex_minter),
            edge_minter: Some(edge_minter),
            vertex_weights_registry: WeightRegistry::new(),
            edge_weights_registry: WeightRegistry::new(),
        }
    }

    /// Borrows the underlying backend directly, bypassing the id bridge — this *is* the
    /// `indexGraph()` of §6 for a `Graph`, since a `Graph`'s own storage is already dense and
    /// index-keyed; no renumbering is ever needed (compare [`MaskedSubgraphView::index_graph`],
    /// whose wrapped vertex/edge sets are sparse until compacted).
    ///
    /// [`MaskedSubgraphView::index_graph`]: crate::mask::MaskedSubgraphView::index_graph
    #[must_use]
    pub fn index_graph(&self) -> &S {
        &self.storage
    }

    /// Whether this graph is directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.storage.is_directed()
    }

    /// The live vertex indices.
    pub fn vertices(&self) -> core::ops::Range<usize> {
        self.storage.vertices()
    }

    /// The live edge indices.
    pub fn edges(&self) -> core::ops::Range<usize> {
        self.storage.edges()
    }

    /// The vertex id for `index`, if `index` is live. Always `Some` for the integer fast path.
    #[must_use]
    pub fn index_to_vertex_id(&self, index: VertexIndex) -> Option<Id>
    where
        Id: TryFrom<usize>,
    {
        if index.index() < self.storage.num_vertices() {
            self.vertex_ids.index_to_id(index.index())
        } else {
            None
        }
    }

    /// The vertex index for `id`, if registered.
    #[must_use]
    pub fn vertex_id_to_index(&self, id: Id) -> Option<VertexIndex>
    where
        Id: Into<usize>,
    {
        self.vertex_ids.id_to_index(id).map(VertexIndex::new)
    }

    /// The edge id for `index`, if `index` is live.
    #[must_use]
    pub fn index_to_edge_id(&self, index: EdgeIndex) -> Option<Id>
    where
        Id: TryFrom<usize>,
    {
        if index.index() < self.storage.num_edges() {
            self.edge_ids.index_to_id(index.index())
        } else {
            None
        }
    }

    /// The edge index for `id`, if registered.
    #[must_use]
    pub fn edge_id_to_index(&self, id: Id) -> Option<EdgeIndex>
    where
        Id: Into<usize>,
    {
        self.edge_ids.id_to_index(id).map(EdgeIndex::new)
    }

    fn mint_vertex_id(&mut self) -> Id
    where
        Id: TryFrom<usize>,
    {
        match &mut self.vertex_minter {
            Some(minter) => minter.mint(self.storage.num_vertices()),
            None => Id::try_from(self.storage.num_vertices())
                .unwrap_or_else(|_| panic!("integer fast path requires Id::try_from to succeed")),
        }
    }

    fn mint_edge_id(&mut self) -> Id
    where
        Id: TryFrom<usize>,
    {
        match &mut self.edge_minter {
            Some(minter) => minter.mint(self.storage.num_edges()),
            None => Id::try_from(self.storage.num_edges())
                .unwrap_or_else(|_| panic!("integer fast path requires Id::try_from to succeed")),
        }
    }

    /// Adds a vertex, minting a fresh id for it (§4.7's pluggable minting contract) and returning
    /// both.
    ///
    /// # Errors
    ///
    /// [`GraphError::ImmutableGraph`](crate::error::GraphError::ImmutableGraph) if `S` is an
    /// immutable backend.
    pub fn add_vertex(&mut self, weight: S::VertexWeight) -> GraphResult<(VertexIndex, Id)>
    where
        Id: TryFrom<usize>,
    {
        let id = self.mint_vertex_id();
        let index = self.storage.add_vertex(weight)?;
        self.vertex_ids.insert(id);
        self.vertex_weights_registry.append_all();
        Ok((index, id))
    }

    /// Removes `vertex`, keeping the id bridge and every registered named weight container in
    /// sync with the backend's swap-remove.
    pub fn remove_vertex(&mut self, vertex: VertexIndex) -> GraphResult<S::VertexWeight> {
        let n = self.storage.num_vertices();
        let last = n.saturating_sub(1);
        let weight = self.storage.remove_vertex(vertex)?;
        self.vertex_ids.apply_swap_remove(vertex.index(), last);
        self.vertex_weights_registry
            .swap_remove_all(vertex.index(), last);
        Ok(weight)
    }

    /// Adds an edge `(u, v)`, minting a fresh id for it.
    pub fn add_edge(
        &mut self,
        u: VertexIndex,
        v: VertexIndex,
        weight: S::EdgeWeight,
    ) -> GraphResult<(EdgeIndex, Id)>
    where
        Id: TryFrom<usize>,
    {
        let id = self.mint_edge_id();
        let index = self.storage.add_edge(u, v, weight)?;
        self.edge_ids.insert(id);
        self.edge_weights_registry.append_all();
        Ok((index, id))
    }

    /// Removes `edge`, keeping the id bridge and every registered named weight container in sync.
    pub fn remove_edge(&mut self, edge: EdgeIndex) -> GraphResult<S::EdgeWeight> {
        let m = self.storage.num_edges();
        let last = m.saturating_sub(1);
        let weight = self.storage.remove_edge(edge)?;
        self.edge_ids.apply_swap_remove(edge.index(), last);
        self.edge_weights_registry.swap_remove_all(edge.index(), last);
        Ok(weight)
    }

    /// Removes every edge incident to `vertex`.
    pub fn remove_edges_of(&mut self, vertex: VertexIndex) -> GraphResult<()> {
        loop {
            let Some(&edge) = self.storage.incident_edges(vertex)?.first() else {
                return Ok(());
            };
            self.remove_edge(edge)?;
        }
    }

    /// Removes every edge for which `vertex` is the source (directed graphs only).
    pub fn remove_out_edges_of(&mut self, vertex: VertexIndex) -> GraphResult<()> {
        loop {
            let Some(&edge) = self.storage.out_edges(vertex)?.first() else {
                return Ok(());
            };
            self.remove_edge(edge)?;
        }
    }

    /// Removes every edge for which `vertex` is the target (directed graphs only).
    pub fn remove_in_edges_of(&mut self, vertex: VertexIndex) -> GraphResult<()> {
        loop {
            let Some(&edge) = self.storage.in_edges(vertex)?.first() else {
                return Ok(());
            };
            self.remove_edge(edge)?;
        }
    }

    /// Re-pegs `edge`'s endpoints.
    pub fn move_edge(
        &mut self,
        edge: EdgeIndex,
        new_source: VertexIndex,
        new_target: VertexIndex,
    ) -> GraphResult<()> {
        self.storage.move_edge(edge, new_source, new_target)
    }

    /// Swaps `edge`'s source and target.
    pub fn reverse_edge(&mut self, edge: EdgeIndex) -> GraphResult<()> {
        self.storage.reverse_edge(edge)
    }

    /// Drops every vertex and edge, including the id bridge and every named weight container.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.vertex_ids.clear();
        self.edge_ids.clear();
        self.vertex_weights_registry.clear();
        self.edge_weights_registry.clear();
    }

    /// Drops every edge, keeping vertices (and the vertex id bridge/weights) intact.
    pub fn clear_edges(&mut self) {
        self.storage.clear_edges();
        self.edge_ids.clear();
        self.edge_weights_registry.clear();
    }

    /// Attaches a new named weight container over the vertex index space.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateWeightsKey`] if `key` is already registered.
    pub fn add_vertex_weights<T>(&mut self, key: String, default: T) -> GraphResult<()>
    where
        T: Clone + 'static,
    {
        self.vertex_weights_registry
            .insert(key, self.storage.num_vertices(), default)
    }

    /// Attaches a new named weight container over the edge index space.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateWeightsKey`] if `key` is already registered.
    pub fn add_edge_weights<T>(&mut self, key: String, default: T) -> GraphResult<()>
    where
        T: Clone + 'static,
    {
        self.edge_weights_registry
            .insert(key, self.storage.num_edges(), default)
    }

    /// Removes the named vertex-weight container registered under `key`, if any.
    pub fn remove_vertex_weights(&mut self, key: &String) {
        self.vertex_weights_registry.remove(key);
    }

    /// Removes the named edge-weight container registered under `key`, if any.
    pub fn remove_edge_weights(&mut self, key: &String) {
        self.edge_weights_registry.remove(key);
    }

    /// Borrows the named vertex-weight container registered under `key`, if any and if `T`
    /// matches.
    #[must_use]
    pub fn vertices_weights<T>(&self, key: &String) -> Option<&Weights<T>>
    where
        T: 'static,
    {
        self.vertex_weights_registry.get(key)
    }

    /// Borrows the named edge-weight container registered under `key`, if any and if `T` matches.
    #[must_use]
    pub fn edges_weights<T>(&self, key: &String) -> Option<&Weights<T>>
    where
        T: 'static,
    {
        self.edge_weights_registry.get(key)
    }

    /// Mutably borrows the named vertex-weight container registered under `key`.
    pub fn vertices_weights_mut<T>(&mut self, key: &String) -> Option<&mut Weights<T>>
    where
        T: 'static,
    {
        self.vertex_weights_registry.get_mut(key)
    }

    /// Mutably borrows the named edge-weight container registered under `key`.
    pub fn edges_weights_mut<T>(&mut self, key: &String) -> Option<&mut Weights<T>>
    where
        T: 'static,
    {
        self.edge_weights_registry.get_mut(key)
    }
}

impl<S, Id> core::ops::Deref for Graph<S, Id>
where
    S: TopologyStore,
{
    type Target = S;

    /// Exposes the full read-only [`TopologyStore`] query surface (`source`, `out_edges`,
    /// `get_edge`, weight accessors, …) directly, the same way `petgraph_core::graph::Graph<S>`
    /// forwards reads to its storage without re-declaring every query method twice.
    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::{capability::Capabilities, storage::array::ArrayStore};

    fn directed_store() -> ArrayStore<(), ()> {
        ArrayStore::new(Capabilities::new(true, false, false))
    }

    #[test]
    fn integer_fast_path_ids_are_indices() {
        let mut g: Graph<ArrayStore<(), ()>> = Graph::new(directed_store());
        let (v0, id0) = g.add_vertex(()).unwrap();
        let (v1, _) = g.add_vertex(()).unwrap();
        assert_eq!(id0, v0.index());
        assert_eq!(g.vertex_id_to_index(v1.index()), Some(v1));
        assert_eq!(g.index_to_vertex_id(v0), Some(v0.index()));
    }

    #[test]
    fn typed_ids_mint_sequentially_and_roundtrip() {
        let mut g: Graph<ArrayStore<(), ()>, usize> = Graph::with_id_map(
            directed_store(),
            alloc::boxed::Box::new(|n: usize| n + 1000),
            alloc::boxed::Box::new(|n: usize| n + 1000),
        );
        let (v0, id0) = g.add_vertex(()).unwrap();
        let (v1, id1) = g.add_vertex(()).unwrap();
        assert_eq!((id0, id1), (1000, 1001));
        assert_eq!(g.vertex_id_to_index(id1), Some(v1));
        assert_eq!(g.index_to_vertex_id(v0), Some(id0));
    }

    /// §8 invariant 9 counterpart for the typed bridge: the id/index mapping survives a
    /// swap-remove.
    #[test]
    fn typed_ids_follow_a_vertex_through_swap_remove() {
        let mut g: Graph<ArrayStore<(), ()>, usize> = Graph::with_id_map(
            directed_store(),
            alloc::boxed::Box::new(|n: usize| n + 1000),
            alloc::boxed::Box::new(|n: usize| n + 1000),
        );
        let (v0, id0) = g.add_vertex(()).unwrap();
        let (_v1, id1) = g.add_vertex(()).unwrap();
        let (v2, id2) = g.add_vertex(()).unwrap();

        g.remove_vertex(v0).unwrap();

        // v2 (last) swapped into v0's old slot; its id must follow it.
        assert_eq!(g.vertex_id_to_index(id2), Some(v0));
        assert_eq!(g.vertex_id_to_index(id0), None);
        assert_eq!(g.vertex_id_to_index(id1), Some(VertexIndex::new(1)));
    }

    #[test]
    fn named_weight_registry_rejects_duplicate_keys_and_tracks_size() {
        let mut g: Graph<ArrayStore<(), ()>> = Graph::new(directed_store());
        g.add_vertex(()).unwrap();
        g.add_vertex(()).unwrap();

        g.add_vertex_weights(String::from("color"), 0u8).unwrap();
        assert!(g
            .add_vertex_weights(String::from("color"), 0u8)
            .is_err());
        assert_eq!(
            g.vertices_weights::<u8>(&String::from("color"))
                .unwrap()
                .len(),
            2
        );

        g.add_vertex(()).unwrap();
        assert_eq!(
            g.vertices_weights::<u8>(&String::from("color"))
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn clear_drops_ids_and_named_weights_too() {
        let mut g: Graph<ArrayStore<(), ()>, usize> = Graph::with_id_map(
            directed_store(),
            alloc::boxed::Box::new(|n: usize| n + 1000),
            alloc::boxed::Box::new(|n: usize| n + 1000),
        );
        let (_v0, id0) = g.add_vertex(()).unwrap();
        g.add_vertex_weights(String::from("color"), 0u8).unwrap();

        g.clear();

        assert_eq!(g.vertices().len(), 0);
        assert_eq!(g.vertex_id_to_index(id0), None);
        assert_eq!(g.vertices_weights::<u8>(&String::from("color")), None);
    }
}


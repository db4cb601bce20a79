//! The id/index bridge (§4.7).
//!
//! Backends only ever know about dense `usize`-backed [`VertexIndex`]/[`EdgeIndex`]. Callers who
//! want an opaque, caller-chosen identifier (a string, a UUID, a domain type) instead of a raw
//! index go through an [`IdIndexMap`], which is a [`SwapRemoveListener`] registered on the
//! backend's [`IndexSet`] so it can keep its bijection in sync for free whenever the backend
//! swap-removes an element.

use alloc::{boxed::Box, vec::Vec};
use core::hash::Hash;

use indexmap::IndexMap;

use crate::index_set::SwapRemoveListener;

/// A boxed [`IdMinter`], stored by [`Graph`](crate::graph::Graph) so the minting strategy can be
/// swapped without making the graph generic over a minter type.
pub type BoxedMinter<Id> = Box<dyn IdMinter<Id>>;

/// A pluggable strategy for minting a fresh identifier when a caller adds a vertex/edge without
/// supplying one explicitly.
///
/// The default behavior described by the spec ("next unused integer" for integer id types, "new
/// instance via no-arg constructor" otherwise) is intentionally *not* hard-coded here: minting is a
/// pluggable contract, supplied as a boxed closure at map-construction time, same as
/// `petgraph_core` leaves default-id generation to the caller's `Attributes` conversion rather than
/// to the storage trait.
pub trait IdMinter<Id> {
    /// Produces the next id, given the number of ids already minted.
    fn mint(&mut self, minted_so_far: usize) -> Id;
}

impl<Id, F> IdMinter<Id> for F
where
    F: FnMut(usize) -> Id,
{
    fn mint(&mut self, minted_so_far: usize) -> Id {
        self(minted_so_far)
    }
}

/// A bijection between opaque identifiers and dense backend indices.
///
/// The [`Identity`](IdIndexMap::Identity) case is the integer fast path: identifiers *are*
/// indices, so the bridge is a zero-cost marker. The [`Mapped`](IdIndexMap::Mapped) case backs a
/// typed API with arbitrary caller identifiers.
pub enum IdIndexMap<Id> {
    /// `id == index` for every element; used by the integer fast path.
    Identity,
    /// A real bijection: a dense `index -> id` array plus a hash map `id -> index`.
    Mapped(MappedIds<Id>),
}

impl<Id> IdIndexMap<Id>
where
    Id: Copy + Eq + Hash + TryFrom<usize>,
{
    /// Builds the identity mapping.
    #[must_use]
    pub fn identity() -> Self {
        Self::Identity
    }

    /// Builds an empty mapped bijection.
    #[must_use]
    pub fn mapped() -> Self {
        Self::Mapped(MappedIds::new())
    }

    /// Looks up the id for `index`, if present.
    #[must_use]
    pub fn index_to_id(&self, index: usize) -> Option<Id>
    where
        Id: TryFrom<usize>,
    {
        match self {
            Self::Identity => Id::try_from(index).ok(),
            Self::Mapped(mapped) => mapped.index_to_id(index),
        }
    }

    /// Looks up the index for `id`, if present.
    #[must_use]
    pub fn id_to_index(&self, id: Id) -> Option<usize>
    where
        Id: Into<usize>,
    {
        match self {
            Self::Identity => Some(id.into()),
            Self::Mapped(mapped) => mapped.id_to_index(id),
        }
    }

    /// Registers `id` for the index that is about to be appended (i.e. the current length).
    ///
    /// A no-op for [`Self::Identity`], where no bookkeeping is needed.
    pub fn insert(&mut self, id: Id) {
        if let Self::Mapped(mapped) = self {
            mapped.insert(id);
        }
    }

    /// Mirrors a backend swap-remove into the bijection.
    ///
    /// The owning [`Graph`](crate::graph::Graph) calls this directly after every
    /// `remove_vertex`/`remove_edge` that succeeds, rather than registering this map as a
    /// [`SwapRemoveListener`] on some shared, interior-mutable index set: `Graph` is already the
    /// sole synchronous caller of the mutating backend method and already knows `removed` (the
    /// index passed in) and `swapped` (the backend's post-removal length, which equals the
    /// pre-removal last index) without needing an observer callback. A no-op for
    /// [`Self::Identity`].
    pub fn apply_swap_remove(&mut self, removed: usize, swapped: usize) {
        if let Self::Mapped(mapped) = self {
            mapped.on_swap_remove(removed, swapped);
        }
    }

    /// Whether this is the zero-cost identity mapping.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Drops every id, leaving the bijection empty. A no-op for [`Self::Identity`].
    pub fn clear(&mut self) {
        if let Self::Mapped(mapped) = self {
            mapped.index_to_id.clear();
            mapped.id_to_index.clear();
        }
    }
}

/// The backing store for [`IdIndexMap::Mapped`]: a dense `index -> id` array and its inverse.
pub struct MappedIds<Id> {
    index_to_id: Vec<Id>,
    id_to_index: IndexMap<Id, usize>,
}

impl<Id> MappedIds<Id>
where
    Id: Copy + Eq + Hash,
{
    /// Creates an empty bijection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index_to_id: Vec::new(),
            id_to_index: IndexMap::new(),
        }
    }

    fn index_to_id(&self, index: usize) -> Option<Id> {
        self.index_to_id.get(index).copied()
    }

    fn id_to_index(&self, id: Id) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    fn insert(&mut self, id: Id) {
        let index = self.index_to_id.len();
        self.index_to_id.push(id);
        self.id_to_index.insert(id, index);
    }
}

impl<Id> SwapRemoveListener for MappedIds<Id>
where
    Id: Copy + Eq + Hash,
{
    fn on_swap_remove(&mut self, removed: usize, swapped: usize) {
        let removed_id = self.index_to_id[removed];
        self.id_to_index.shift_remove(&removed_id);

        if removed != swapped {
            let swapped_id = self.index_to_id[swapped];
            self.index_to_id[removed] = swapped_id;
            self.id_to_index.insert(swapped_id, removed);
        }

        self.index_to_id.truncate(swapped);
    }
}

//! A storage core for mutable and immutable graphs: a uniform [`storage::TopologyStore`] contract
//! implemented by three mutable adjacency backends (array, linked-list, hashmap) and one
//! immutable [`csr::CsrTopology`], plus the supporting cast every one of them is built from —
//! dense index spaces, an endpoints table, generic weight storage, a validating [`builder`], an
//! opaque id/index bridge ([`id`]), a masking subgraph view ([`mask`]), and a [`factory::Factory`]
//! that ties capability selection and hints together at construction time.
//!
//! `no_std` (plus `alloc`) by default; enable the `std` feature for `std::error::Error` on
//! [`error::GraphError`] and `std`-backed `fixedbitset`/`indexmap`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod backend;
pub mod builder;
pub mod capability;
pub mod csr;
pub mod endpoints;
pub mod error;
pub mod factory;
pub mod graph;
pub mod id;
pub mod index;
pub mod index_set;
pub mod mask;
pub mod storage;
pub mod weight;

pub use backend::{Backend, BackendKind};
pub use capability::{Capabilities, Hint};
pub use csr::CsrTopology;
pub use error::{GraphError, GraphResult};
pub use factory::Factory;
pub use graph::Graph;
pub use index::{EdgeDirection, EdgeIndex, VertexIndex};
pub use mask::{IndexGraph, MaskedSubgraphView, Reindexing};
pub use storage::TopologyStore;

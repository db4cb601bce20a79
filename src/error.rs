//! Error taxonomy shared by every component of the storage core.
//!
//! Every fallible operation in this crate returns `error_stack::Result<T, GraphError>`, so call
//! sites can layer context (`.attach_printable(...)`) on top of a small, closed set of error
//! *kinds* instead of inventing a new error type per operation.

use core::fmt::{self, Display, Formatter};

/// The closed set of ways a storage-core operation can fail.
///
/// This mirrors `petgraph_core::error::Error` in spirit (a single `Context` type used as the
/// `error_stack` root), but carries enough structure to distinguish the cases the spec calls out
/// by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A vertex index/id was used that is not currently live.
    NoSuchVertex,
    /// An edge index/id was used that is not currently live.
    NoSuchEdge,
    /// An endpoint (or other index) exceeded the current size of its index set.
    OutOfRange,
    /// The capability record disallows self-edges, but the operation would create or keep one.
    SelfEdgeViolation,
    /// The capability record disallows parallel edges, but the operation would create one.
    ParallelEdgeViolation,
    /// A mutation was attempted on a CSR backend or a masking view.
    ImmutableGraph,
    /// A weights container was added under a key that already exists.
    DuplicateWeightsKey,
    /// The builder operation is not supported in the current configuration.
    UnsupportedBuilderOperation,
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::NoSuchVertex => "no such vertex",
            Self::NoSuchEdge => "no such edge",
            Self::OutOfRange => "index out of range",
            Self::SelfEdgeViolation => "self-edges are not allowed on this graph",
            Self::ParallelEdgeViolation => "parallel edges are not allowed on this graph",
            Self::ImmutableGraph => "graph is immutable",
            Self::DuplicateWeightsKey => "weights key already exists",
            Self::UnsupportedBuilderOperation => "unsupported builder operation",
        };

        f.write_str(message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

#[cfg(not(feature = "std"))]
impl error_stack::Context for GraphError {}

/// Crate-wide result alias.
pub type GraphResult<T> = error_stack::Result<T, GraphError>;

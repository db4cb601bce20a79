//! The capability record fixed at graph construction time.

/// `{directed?, self-edges?, parallel-edges?}`, fixed for the lifetime of a backend.
///
/// Every mutable backend stores one of these and consults it on every `add_edge`/`move_edge`;
/// the builder consults a copy of it once, at `build()` time (§4.6).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    directed: bool,
    self_edges: bool,
    parallel_edges: bool,
}

impl Capabilities {
    /// Constructs a capability record directly.
    #[must_use]
    pub const fn new(directed: bool, self_edges: bool, parallel_edges: bool) -> Self {
        Self {
            directed,
            self_edges,
            parallel_edges,
        }
    }

    /// Whether this capability record describes a directed graph.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Whether an edge with `source == target` is permitted.
    #[must_use]
    pub const fn allows_self_edges(&self) -> bool {
        self.self_edges
    }

    /// Whether more than one edge between the same (ordered, if directed) pair is permitted.
    #[must_use]
    pub const fn allows_parallel_edges(&self) -> bool {
        self.parallel_edges
    }
}

/// Non-binding performance hints a [`Factory`](crate::factory::Factory) may use to pick a default
/// backend when the caller does not name one explicitly.
///
/// Hints are advisory: a backend that satisfies the capability record is always correct, a hint
/// only influences *which* correct backend the factory reaches for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hint {
    /// The workload removes edges often; prefer a backend with O(1) unlink (linked).
    FastEdgeRemoval,
    /// The workload repeatedly asks "is there an edge between u and v"; prefer a backend with
    /// expected O(1) lookup (hashmap).
    FastEdgeLookup,
    /// The graph is expected to be dense; prefer a backend that enumerates quickly (array).
    DenseGraph,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_reflect_the_constructed_record() {
        let caps = Capabilities::new(true, false, true);
        assert!(caps.is_directed());
        assert!(!caps.allows_self_edges());
        assert!(caps.allows_parallel_edges());
    }

    #[test]
    fn equal_records_compare_equal() {
        assert_eq!(
            Capabilities::new(false, true, false),
            Capabilities::new(false, true, false)
        );
        assert_ne!(
            Capabilities::new(false, true, false),
            Capabilities::new(true, true, false)
        );
    }
}

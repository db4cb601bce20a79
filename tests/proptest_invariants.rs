//! # Reasoning
//!
//! `add_vertex`/`remove_vertex`/`add_edge`/`remove_edge`/`move_edge`/`reverse_edge` all juggle
//! swap-remove bookkeeping across several backing arrays at once. Unit tests pin down one mutation
//! at a time; this file throws randomized *sequences* of mutations at each of the three mutable
//! backends and checks, after every single step, that the structural invariants of §8 still hold.
//! These complement the hand-written unit tests rather than replace them.

use std::collections::BTreeSet;

use graph_topology::{
    storage::{array::ArrayStore, hashmap::HashMapStore, linked::LinkedStore, TopologyStore},
    Capabilities, EdgeIndex, VertexIndex,
};
use proptest::prelude::*;

/// A mutation to apply to a backend under test.
///
/// Vertex/edge arguments are small integers taken modulo the *current* count at apply time, rather
/// than absolute indices chosen up front: the whole point is to land on the index a prior swap-
/// remove in the same sequence just vacated.
#[derive(Debug, Clone)]
enum Op {
    AddVertex,
    AddEdge(usize, usize),
    RemoveVertex(usize),
    RemoveEdge(usize),
    MoveEdge(usize, usize, usize),
    ReverseEdge(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AddVertex),
        5 => (any::<usize>(), any::<usize>()).prop_map(|(u, v)| Op::AddEdge(u, v)),
        2 => any::<usize>().prop_map(Op::RemoveVertex),
        2 => any::<usize>().prop_map(Op::RemoveEdge),
        1 => (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(e, u, v)| Op::MoveEdge(e, u, v)),
        1 => any::<usize>().prop_map(Op::ReverseEdge),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..80)
}

/// Checks every quantified invariant of §8 against the current state of `store`.
///
/// # Panics
///
/// Panics (via `assert!`/`assert_eq!`) if any invariant does not hold.
fn assert_invariants<S>(store: &S)
where
    S: TopologyStore,
{
    let n = store.num_vertices();
    let m = store.num_edges();

    // Invariant 1: vertex/edge index spaces are dense ranges starting at zero.
    assert_eq!(store.vertices(), 0..n);
    assert_eq!(store.edges(), 0..m);

    let mut seen_out = vec![BTreeSet::new(); n];
    let mut seen_in = vec![BTreeSet::new(); n];

    for e in 0..m {
        let edge = EdgeIndex::new(e);

        // Invariant 2: every edge's endpoints are live vertices.
        let source = store.source(edge).expect("edge has a source");
        let target = store.target(edge).expect("edge has a target");
        assert!(source.index() < n, "source {source} out of range");
        assert!(target.index() < n, "target {target} out of range");

        if store.capabilities().is_directed() {
            seen_out[source.index()].insert(e);
            seen_in[target.index()].insert(e);
        } else {
            // Undirected: the edge is incident to both endpoints (once each), except a self-edge,
            // which only has one endpoint to be incident to.
            seen_out[source.index()].insert(e);
            if target != source {
                seen_out[target.index()].insert(e);
            }
        }

        // `endpoint` must agree with `source`/`target` for both roles.
        assert_eq!(store.endpoint(edge, source).unwrap(), target);
        assert_eq!(store.endpoint(edge, target).unwrap(), source);
    }

    // Invariant 3: out/in/incident adjacency views exactly match the edges touching each vertex.
    for v in 0..n {
        let vertex = VertexIndex::new(v);
        let out: BTreeSet<usize> = store
            .out_edges(vertex)
            .unwrap()
            .into_iter()
            .map(EdgeIndex::index)
            .collect();
        let inn: BTreeSet<usize> = store
            .in_edges(vertex)
            .unwrap()
            .into_iter()
            .map(EdgeIndex::index)
            .collect();
        let incident: BTreeSet<usize> = store
            .incident_edges(vertex)
            .unwrap()
            .into_iter()
            .map(EdgeIndex::index)
            .collect();

        if store.is_directed() {
            assert_eq!(out, seen_out[v], "out_edges mismatch at vertex {v}");
            assert_eq!(inn, seen_in[v], "in_edges mismatch at vertex {v}");
            let union: BTreeSet<usize> = out.union(&inn).copied().collect();
            assert_eq!(incident, union, "incident_edges mismatch at vertex {v}");
        } else {
            assert_eq!(out, seen_out[v], "out_edges mismatch at vertex {v}");
            assert_eq!(incident, seen_out[v], "incident_edges mismatch at vertex {v}");
        }

        // Invariant 4: weight storage is reachable for every live vertex.
        assert!(store.vertex_weight(vertex).is_ok());
    }

    for e in 0..m {
        assert!(store.edge_weight(EdgeIndex::new(e)).is_ok());
    }
}

/// Applies `ops` to a fresh backend of the given capability record, checking invariants after
/// every single mutation, and returns the final vertex/edge counts (so callers can assert the
/// sequence did something besides no-ops).
fn run<S>(capabilities: Capabilities, ops: &[Op]) -> (usize, usize)
where
    S: TopologyStore<VertexWeight = i32, EdgeWeight = i32>,
{
    let mut store = S::new(capabilities);
    assert_invariants(&store);

    for op in ops {
        match *op {
            Op::AddVertex => {
                let _ = store.add_vertex(0);
            }
            Op::AddEdge(u, v) => {
                let n = store.num_vertices();
                if n > 0 {
                    let u = VertexIndex::new(u % n);
                    let v = VertexIndex::new(v % n);
                    // Errors (self/parallel rejection) are expected and must leave the store
                    // untouched; either way the invariants must still hold afterwards.
                    let _ = store.add_edge(u, v, 0);
                }
            }
            Op::RemoveVertex(i) => {
                let n = store.num_vertices();
                if n > 0 {
                    let _ = store.remove_vertex(VertexIndex::new(i % n));
                }
            }
            Op::RemoveEdge(i) => {
                let m = store.num_edges();
                if m > 0 {
                    let _ = store.remove_edge(EdgeIndex::new(i % m));
                }
            }
            Op::MoveEdge(e, u, v) => {
                let (m, n) = (store.num_edges(), store.num_vertices());
                if m > 0 && n > 0 {
                    let edge = EdgeIndex::new(e % m);
                    let u = VertexIndex::new(u % n);
                    let v = VertexIndex::new(v % n);
                    let _ = store.move_edge(edge, u, v);
                }
            }
            Op::ReverseEdge(e) => {
                let m = store.num_edges();
                if m > 0 {
                    let _ = store.reverse_edge(EdgeIndex::new(e % m));
                }
            }
        }
        assert_invariants(&store);
    }

    (store.num_vertices(), store.num_edges())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn array_backend_upholds_invariants_directed(ops in ops_strategy()) {
        run::<ArrayStore<i32, i32>>(Capabilities::new(true, true, true), &ops);
    }

    #[test]
    fn array_backend_upholds_invariants_undirected_no_parallel(ops in ops_strategy()) {
        run::<ArrayStore<i32, i32>>(Capabilities::new(false, false, false), &ops);
    }

    #[test]
    fn hashmap_backend_upholds_invariants_directed(ops in ops_strategy()) {
        run::<HashMapStore<i32, i32>>(Capabilities::new(true, true, true), &ops);
    }

    #[test]
    fn hashmap_backend_upholds_invariants_undirected_no_parallel(ops in ops_strategy()) {
        run::<HashMapStore<i32, i32>>(Capabilities::new(false, false, false), &ops);
    }

    #[test]
    fn linked_backend_upholds_invariants_directed(ops in ops_strategy()) {
        run::<LinkedStore<i32, i32>>(Capabilities::new(true, true, true), &ops);
    }

    #[test]
    fn linked_backend_upholds_invariants_undirected_no_parallel(ops in ops_strategy()) {
        run::<LinkedStore<i32, i32>>(Capabilities::new(false, false, false), &ops);
    }
}

/// Every backend, driven by the same mutation sequence from the same starting capabilities, must
/// end up with the same vertex/edge counts: they are three interchangeable implementations of one
/// contract, not three different behaviors (§9).
proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn all_backends_agree_on_final_counts(ops in ops_strategy()) {
        let capabilities = Capabilities::new(true, true, true);
        let array = run::<ArrayStore<i32, i32>>(capabilities, &ops);
        let hashmap = run::<HashMapStore<i32, i32>>(capabilities, &ops);
        let linked = run::<LinkedStore<i32, i32>>(capabilities, &ops);
        prop_assert_eq!(array, hashmap);
        prop_assert_eq!(hashmap, linked);
    }
}

//! Property-based invariants over generically-shaped enumerated nets:
//! every node is reachable from the root, the persistent/newly-enabled
//! partition holds everywhere, and marking equality collapses states when
//! `checkNewlyEnabled` is off.

use proptest::prelude::*;

use stpn_analyzer::engine::analyzer::Analyzer;
use stpn_analyzer::net::{Marking, PetriNet};
use stpn_analyzer::petri::initial_state;
use stpn_analyzer::PetriComponentsFactory;

/// A ring of `stages` places/transitions with one token circulating.
/// Reachable state space is exactly `stages` markings by construction, so
/// enumeration is guaranteed to terminate and its size is known up front.
fn ring_net(stages: usize) -> (PetriNet, Marking) {
    let mut net = PetriNet::new();
    let places: Vec<_> = (0..stages).map(|i| net.add_place(format!("p{i}"))).collect();
    for i in 0..stages {
        let t = net.add_transition(format!("t{i}"));
        net.add_precondition(places[i], t, 1).unwrap();
        net.add_postcondition(t, places[(i + 1) % stages], 1).unwrap();
    }
    let mut marking = Marking::new();
    marking.set_tokens(places[0], 1);
    (net, marking)
}

/// A diamond fork/join: p0 splits into two independent single-token
/// branches of `depth` places each, rejoining at a final place. Reachable
/// states: every combination of branch-a/branch-b progress, so
/// `(depth + 1)^2` markings.
fn fork_join_net(depth: usize) -> (PetriNet, Marking) {
    let mut net = PetriNet::new();
    let p0 = net.add_place("p0");
    let mut branch_a = vec![p0];
    let mut branch_b = vec![p0];
    for i in 0..depth {
        let a_next = net.add_place(format!("a{i}"));
        let t = net.add_transition(format!("ta{i}"));
        net.add_precondition(*branch_a.last().unwrap(), t, 1).unwrap();
        net.add_postcondition(t, a_next, 1).unwrap();
        branch_a.push(a_next);

        let b_next = net.add_place(format!("b{i}"));
        let t = net.add_transition(format!("tb{i}"));
        net.add_precondition(*branch_b.last().unwrap(), t, 1).unwrap();
        net.add_postcondition(t, b_next, 1).unwrap();
        branch_b.push(b_next);
    }
    let mut marking = Marking::new();
    marking.set_tokens(p0, 1);
    (net, marking)
}

fn analyze(net: PetriNet, marking: Marking) -> stpn_analyzer::SuccessionGraph {
    let initial = initial_state(&net, marking, false).unwrap();
    let factory = PetriComponentsFactory::new();
    let analyzer = Analyzer::new(&factory, net, initial);
    analyzer.analyze().unwrap().into_graph()
}

fn assert_partition_and_reachability(graph: &stpn_analyzer::SuccessionGraph) {
    let root = graph.root().expect("a non-empty analysis always has a root");
    for node in graph.nodes() {
        if node != root {
            assert!(
                !graph.predecessors(node).is_empty(),
                "every non-root node must have at least one predecessor"
            );
        }
        let feature = graph
            .state(node)
            .petri()
            .expect("every node in a Petri-net analysis carries a PetriStateFeature");
        assert!(
            feature.partitions_enabled(),
            "persistent and newly-enabled must partition the enabled set"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ring_net_enumerates_exactly_one_node_per_stage(stages in 2usize..12) {
        let (net, marking) = ring_net(stages);
        let graph = analyze(net, marking);
        prop_assert_eq!(graph.nodes().count(), stages);
        assert_partition_and_reachability(&graph);
    }

    #[test]
    fn fork_join_net_enumerates_the_square_of_branch_progress(depth in 1usize..6) {
        let (net, marking) = fork_join_net(depth);
        let graph = analyze(net, marking);
        prop_assert_eq!(graph.nodes().count(), (depth + 1) * (depth + 1));
        assert_partition_and_reachability(&graph);
    }
}

#[test]
fn equal_markings_collapse_when_not_checking_newly_enabled() {
    // A diamond where both paths from p0 rejoin at the same marking: the
    // two interleavings of firing t_a then t_b, or t_b then t_a, must
    // converge to a single node rather than two.
    let mut net = PetriNet::new();
    let p0 = net.add_place("p0");
    let pa = net.add_place("pa");
    let pb = net.add_place("pb");
    let pc = net.add_place("pc");
    let t_a = net.add_transition("t_a");
    let t_b = net.add_transition("t_b");
    net.add_precondition(p0, t_a, 1).unwrap();
    net.add_postcondition(t_a, pa, 1).unwrap();
    net.add_precondition(p0, t_b, 1).unwrap();
    net.add_postcondition(t_b, pb, 1).unwrap();
    let t_join_a = net.add_transition("t_join_a");
    net.add_precondition(pa, t_join_a, 1).unwrap();
    net.add_postcondition(t_join_a, pc, 1).unwrap();
    let t_join_b = net.add_transition("t_join_b");
    net.add_precondition(pb, t_join_b, 1).unwrap();
    net.add_postcondition(t_join_b, pc, 1).unwrap();

    let mut marking = Marking::new();
    marking.set_tokens(p0, 1);
    let graph = analyze(net, marking);

    // Reachable markings: {p0}, {pa}, {pb}, {pc} -- pc is reached two ways
    // but must be one node.
    assert_eq!(graph.nodes().count(), 4);
}

#[test]
fn analyze_terminates_and_every_node_is_reachable_from_root() {
    let (net, marking) = fork_join_net(4);
    let graph = analyze(net, marking);
    assert_partition_and_reachability(&graph);
    // no orphans: every node appears as some edge's child except the root.
    let root = graph.root().unwrap();
    for node in graph.nodes() {
        if node == root {
            continue;
        }
        assert!(!graph.incoming_successions(node).is_empty());
    }
}

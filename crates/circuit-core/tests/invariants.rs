//! Cross-module properties that aren't tied to one concrete scenario:
//! canonicalization idempotence, KCL/KVL on a solved circuit, and the
//! tree/JSON round-trips.

use circuit_core::facade::canonicalize;
use circuit_core::{
    solve, Amps, Atom, Circuit, Edge, EdgeId, EdgeKind, Expr, Ohms, Vertex, VertexId, Volts,
};

fn vid(n: u64) -> VertexId {
    VertexId(n)
}

#[test]
fn canonicalization_is_idempotent_on_its_own_output() {
    let mut c = Circuit::new();
    for i in 0..4 {
        c.add_vertex(Vertex::new(vid(i)));
    }
    c.add_edge(Edge::new(EdgeId(0), vid(0), vid(1), EdgeKind::VSource { volts: Volts(12.0) }));
    c.add_edge(Edge::new(EdgeId(1), vid(0), vid(2), EdgeKind::Resistor { ohms: Ohms(100.0) }));
    c.add_edge(Edge::new(EdgeId(2), vid(2), vid(1), EdgeKind::Resistor { ohms: Ohms(200.0) }));
    c.add_edge(Edge::new(EdgeId(3), vid(3), vid(1), EdgeKind::Wire));

    let graph1 = canonicalize(&c).unwrap();

    // Re-embed the super-node graph as a fresh circuit (one vertex per
    // super-node) and canonicalize it again - with no wires left to
    // contract, this should reproduce the same partition and element list.
    let mut reembedded = Circuit::new();
    for n in 0..graph1.num_super_nodes {
        reembedded.add_vertex(Vertex::new(vid(n as u64)));
    }
    for edge in &graph1.edges {
        reembedded.add_edge(Edge::new(
            edge.id,
            vid(edge.n1 as u64),
            vid(edge.n2 as u64),
            edge.kind.clone(),
        ));
    }
    reembedded.terminal_plus = Some(vid(graph1.terminal_plus as u64));
    reembedded.terminal_minus = Some(vid(graph1.terminal_minus as u64));

    let graph2 = canonicalize(&reembedded).unwrap();
    assert_eq!(graph2.num_super_nodes, graph1.num_super_nodes);
    assert_eq!(graph2.edges, graph1.edges);
    assert_eq!(graph2.terminal_plus, graph1.terminal_plus);
    assert_eq!(graph2.terminal_minus, graph1.terminal_minus);
}

#[test]
fn kcl_holds_at_every_interior_node() {
    // Wheatstone bridge: nodes 2 and 3 are interior, each with three
    // incident resistors.
    let mut c = Circuit::new();
    for i in 0..4 {
        c.add_vertex(Vertex::new(vid(i)));
    }
    c.terminal_plus = Some(vid(0));
    c.terminal_minus = Some(vid(1));
    c.add_edge(Edge::new(EdgeId(0), vid(0), vid(1), EdgeKind::VSource { volts: Volts(10.0) }));
    c.add_edge(Edge::new(EdgeId(1), vid(0), vid(2), EdgeKind::Resistor { ohms: Ohms(1.0) }));
    c.add_edge(Edge::new(EdgeId(2), vid(2), vid(1), EdgeKind::Resistor { ohms: Ohms(1.0) }));
    c.add_edge(Edge::new(EdgeId(3), vid(0), vid(3), EdgeKind::Resistor { ohms: Ohms(1.0) }));
    c.add_edge(Edge::new(EdgeId(4), vid(3), vid(1), EdgeKind::Resistor { ohms: Ohms(1.0) }));
    c.add_edge(Edge::new(EdgeId(5), vid(2), vid(3), EdgeKind::Resistor { ohms: Ohms(1.0) }));

    let report = solve(&c, None).unwrap();
    let graph = &report.graph;
    let interior = [graph.super_node_of[&vid(2)], graph.super_node_of[&vid(3)]];

    for node in interior {
        let mut net_inflow = 0.0;
        for edge in &graph.edges {
            let EdgeKind::Resistor { ohms } = &edge.kind else { continue };
            let current = report.superposition.branch_voltage(edge.n1, edge.n2).value() * ohms.conductance();
            if edge.n1 == node {
                net_inflow -= current;
            }
            if edge.n2 == node {
                net_inflow += current;
            }
        }
        assert!(net_inflow.abs() < 1e-9, "KCL violated at node {node}: {net_inflow}");
    }
}

#[test]
fn kvl_holds_around_a_triangle_loop() {
    // A resistor triangle 0-1-2 with the source across 0/2: the algebraic
    // sum of voltage drops walking the loop 0 -> 1 -> 2 -> 0 must vanish.
    let mut c = Circuit::new();
    for i in 0..3 {
        c.add_vertex(Vertex::new(vid(i)));
    }
    c.terminal_plus = Some(vid(0));
    c.terminal_minus = Some(vid(2));
    c.add_edge(Edge::new(EdgeId(0), vid(0), vid(2), EdgeKind::VSource { volts: Volts(9.0) }));
    c.add_edge(Edge::new(EdgeId(1), vid(0), vid(1), EdgeKind::Resistor { ohms: Ohms(50.0) }));
    c.add_edge(Edge::new(EdgeId(2), vid(1), vid(2), EdgeKind::Resistor { ohms: Ohms(75.0) }));
    c.add_edge(Edge::new(EdgeId(3), vid(0), vid(2), EdgeKind::Resistor { ohms: Ohms(125.0) }));

    let report = solve(&c, None).unwrap();
    let r01 = report.resistors.iter().find(|r| r.id == EdgeId(1)).unwrap();
    let r12 = report.resistors.iter().find(|r| r.id == EdgeId(2)).unwrap();
    let r02 = report.resistors.iter().find(|r| r.id == EdgeId(3)).unwrap();

    // r01.voltage = V0-V1, r12.voltage = V1-V2, r02.voltage = V0-V2.
    let loop_sum = r01.voltage.value() + r12.voltage.value() - r02.voltage.value();
    assert!(loop_sum.abs() < 1e-9, "KVL violated around the loop: {loop_sum}");
}

#[test]
fn tree_reversal_is_its_own_inverse() {
    let tree = Expr::Series(vec![
        Expr::Atom(Atom::Resistor {
            id: EdgeId(0),
            ohms: Ohms(10.0),
            name: Some("R1".into()),
            generated: false,
        }),
        Expr::Atom(Atom::VSource {
            id: EdgeId(1),
            volts: Volts(5.0),
            name: Some("V1".into()),
        }),
    ]);
    assert_eq!(tree.reversed().reversed(), tree);
}

#[test]
fn json_round_trip_preserves_every_edge_kind() {
    let mut c = Circuit::new();
    for i in 0..5 {
        c.add_vertex(Vertex::new(vid(i)));
    }
    c.terminal_plus = Some(vid(3));
    c.terminal_minus = Some(vid(4));
    c.add_edge(Edge::new(EdgeId(0), vid(0), vid(1), EdgeKind::Wire));
    c.add_edge(Edge::new(EdgeId(1), vid(1), vid(2), EdgeKind::Resistor { ohms: Ohms(10.0) }));
    c.add_edge(Edge::new(EdgeId(2), vid(2), vid(3), EdgeKind::Ammeter));
    c.add_edge(Edge::new(EdgeId(3), vid(3), vid(4), EdgeKind::VSource { volts: Volts(5.0) }));
    c.add_edge(Edge::new(EdgeId(4), vid(4), vid(0), EdgeKind::ISource { amps: Amps(1.0) }));

    let json = serde_json::to_string(&c).unwrap();
    let back: Circuit = serde_json::from_str(&json).unwrap();
    assert_eq!(c, back);
}

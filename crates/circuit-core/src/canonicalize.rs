//! Wire-edge contraction via union-find, producing the canonical graph that
//! [`crate::reduce`] and [`crate::mna`] both consume.

use crate::error::{CircuitError, CircuitResult};
use crate::ids::{EdgeId, VertexId};
use crate::model::{Circuit, EdgeKind};
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// A non-wire edge with endpoints translated to compact super-node indices.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonEdge {
    pub id: EdgeId,
    pub label: Option<String>,
    pub n1: usize,
    pub n2: usize,
    pub kind: EdgeKind,
}

/// The result of canonicalization: a compact super-node graph plus resolved
/// `+`/`−` terminals.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalGraph {
    /// Original vertex id -> compact 0-based super-node index.
    pub super_node_of: HashMap<VertexId, usize>,
    pub num_super_nodes: usize,
    pub edges: Vec<CanonEdge>,
    pub terminal_plus: usize,
    pub terminal_minus: usize,
}

/// Canonicalize `circuit`: contract every wire edge via union-find, assign
/// compact super-node indices by first-seen representative order, translate
/// non-wire edges, and resolve the `+`/`−` terminals.
pub fn canonicalize(circuit: &Circuit) -> CircuitResult<CanonicalGraph> {
    if circuit.vertices.is_empty() {
        return Err(CircuitError::Structural("too few distinct nodes".into()));
    }

    let index_of: HashMap<VertexId, usize> = circuit
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id, i))
        .collect();

    for edge in &circuit.edges {
        if !index_of.contains_key(&edge.a) || !index_of.contains_key(&edge.b) {
            return Err(CircuitError::Structural(
                "edge references a missing node".into(),
            ));
        }
    }

    let mut uf = UnionFind::new(circuit.vertices.len());
    for edge in &circuit.edges {
        if edge.kind.is_wire() {
            uf.union(index_of[&edge.a], index_of[&edge.b]);
        }
    }

    // Assign super-node indices by first-seen representative order.
    let mut super_node_of_rep: HashMap<usize, usize> = HashMap::new();
    let mut super_node_of: HashMap<VertexId, usize> = HashMap::new();
    for vertex in &circuit.vertices {
        let rep = uf.find(index_of[&vertex.id]);
        let next = super_node_of_rep.len();
        let super_idx = *super_node_of_rep.entry(rep).or_insert(next);
        super_node_of.insert(vertex.id, super_idx);
    }
    let num_super_nodes = super_node_of_rep.len();

    if num_super_nodes < 2 {
        return Err(CircuitError::Structural("too few distinct nodes".into()));
    }

    let (terminal_plus_vid, terminal_minus_vid) = resolve_terminal_vertices(circuit)?;
    let terminal_plus = super_node_of[&terminal_plus_vid];
    let terminal_minus = super_node_of[&terminal_minus_vid];
    if terminal_plus == terminal_minus {
        return Err(CircuitError::Structural(
            "terminals are shorted by wire".into(),
        ));
    }

    let mut edges = Vec::new();
    for edge in &circuit.edges {
        if edge.kind.is_wire() {
            continue;
        }
        validate_value(&edge.kind)?;
        let n1 = super_node_of[&edge.a];
        let n2 = super_node_of[&edge.b];
        if n1 == n2 {
            match &edge.kind {
                EdgeKind::VSource { volts } if volts.value() != 0.0 => {
                    return Err(CircuitError::Structural(
                        "voltage source shorted by wire".into(),
                    ));
                }
                _ => continue, // dropped: coincident super-nodes
            }
        }
        edges.push(CanonEdge {
            id: edge.id,
            label: edge.label.clone(),
            n1,
            n2,
            kind: edge.kind.clone(),
        });
    }

    if edges.is_empty() {
        return Err(CircuitError::Structural("no components".into()));
    }

    Ok(CanonicalGraph {
        super_node_of,
        num_super_nodes,
        edges,
        terminal_plus,
        terminal_minus,
    })
}

fn validate_value(kind: &EdgeKind) -> CircuitResult<()> {
    match kind {
        EdgeKind::Resistor { ohms } => {
            if !ohms.is_finite() || ohms.value() <= 0.0 {
                return Err(CircuitError::Numeric(
                    "resistor ohms must be finite and strictly positive".into(),
                ));
            }
        }
        EdgeKind::VSource { volts } => {
            if !volts.is_finite() {
                return Err(CircuitError::Numeric(
                    "voltage source value must be finite".into(),
                ));
            }
        }
        EdgeKind::ISource { amps } => {
            if !amps.is_finite() {
                return Err(CircuitError::Numeric(
                    "current source value must be finite".into(),
                ));
            }
        }
        EdgeKind::Wire | EdgeKind::Ammeter => {}
    }
    Ok(())
}

/// Resolve `circuit`'s `+`/`−` terminals: explicit fields first, else the
/// first voltage source's endpoints, else the circuit's first two vertices.
pub(crate) fn resolve_terminal_vertices(circuit: &Circuit) -> CircuitResult<(VertexId, VertexId)> {
    if let (Some(p), Some(n)) = (circuit.terminal_plus, circuit.terminal_minus) {
        if p != n && circuit.contains_vertex(p) && circuit.contains_vertex(n) {
            return Ok((p, n));
        }
    }
    if let Some(vsource) = circuit.first_voltage_source() {
        return Ok((vsource.a, vsource.b));
    }
    if circuit.vertices.len() >= 2 {
        return Ok((circuit.vertices[0].id, circuit.vertices[1].id));
    }
    Err(CircuitError::Structural("too few distinct nodes".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::EdgeId;
    use crate::model::{Edge, Vertex};
    use crate::units::{Ohms, Volts};

    fn vid(n: u64) -> VertexId {
        VertexId(n)
    }

    fn two_resistor_circuit() -> Circuit {
        let mut c = Circuit::new();
        for i in 0..3 {
            c.add_vertex(Vertex::new(vid(i)));
        }
        c.add_edge(Edge::new(
            EdgeId(0),
            vid(0),
            vid(1),
            EdgeKind::VSource { volts: Volts(12.0) },
        ));
        c.add_edge(Edge::new(
            EdgeId(1),
            vid(0),
            vid(2),
            EdgeKind::Resistor { ohms: Ohms(100.0) },
        ));
        c.add_edge(Edge::new(
            EdgeId(2),
            vid(2),
            vid(1),
            EdgeKind::Resistor { ohms: Ohms(200.0) },
        ));
        c
    }

    #[test]
    fn wire_contraction_merges_endpoints() {
        let mut c = two_resistor_circuit();
        c.add_vertex(Vertex::new(vid(3)));
        c.add_edge(Edge::new(EdgeId(3), vid(3), vid(1), EdgeKind::Wire));
        let graph = canonicalize(&c).unwrap();
        assert_eq!(graph.super_node_of[&vid(1)], graph.super_node_of[&vid(3)]);
    }

    #[test]
    fn terminals_default_to_first_voltage_source() {
        let c = two_resistor_circuit();
        let graph = canonicalize(&c).unwrap();
        assert_ne!(graph.terminal_plus, graph.terminal_minus);
        assert_eq!(graph.terminal_plus, graph.super_node_of[&vid(0)]);
        assert_eq!(graph.terminal_minus, graph.super_node_of[&vid(1)]);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let mut c = Circuit::new();
        c.add_vertex(Vertex::new(vid(0)));
        c.add_edge(Edge::new(
            EdgeId(0),
            vid(0),
            vid(99),
            EdgeKind::Resistor { ohms: Ohms(1.0) },
        ));
        let err = canonicalize(&c).unwrap_err();
        assert!(matches!(err, CircuitError::Structural(_)));
    }

    #[test]
    fn shorted_voltage_source_is_rejected() {
        let mut c = Circuit::new();
        c.add_vertex(Vertex::new(vid(0)));
        c.add_vertex(Vertex::new(vid(1)));
        c.add_edge(Edge::new(
            EdgeId(0),
            vid(0),
            vid(1),
            EdgeKind::VSource { volts: Volts(5.0) },
        ));
        c.add_edge(Edge::new(EdgeId(1), vid(0), vid(1), EdgeKind::Wire));
        let err = canonicalize(&c).unwrap_err();
        assert!(matches!(err, CircuitError::Structural(_)));
    }

    #[test]
    fn non_positive_resistor_is_rejected() {
        let mut c = Circuit::new();
        c.add_vertex(Vertex::new(vid(0)));
        c.add_vertex(Vertex::new(vid(1)));
        c.add_edge(Edge::new(
            EdgeId(0),
            vid(0),
            vid(1),
            EdgeKind::Resistor { ohms: Ohms(0.0) },
        ));
        let err = canonicalize(&c).unwrap_err();
        assert!(matches!(err, CircuitError::Numeric(_)));
    }
}

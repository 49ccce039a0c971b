//! The series/parallel reducer: rewrites the canonicalized edge multigraph
//! until a single `+` → `−` edge remains, or reports that the circuit is not
//! series/parallel with respect to those terminals.
//!
//! Each iteration produces an immutable tree expression per rewrite instead
//! of mutating a live graph in place, checking for a parallel group before a
//! series chain on every pass and breaking ties by first-occurrence order.

use crate::canonicalize::{CanonEdge, CanonicalGraph};
use crate::error::{CircuitError, CircuitResult};
use crate::model::EdgeKind;
use crate::tree::{parallel, series, Atom, Expr};
use std::collections::HashMap;

/// Hard ceiling on rewrite iterations, guarding against livelock.
const REWRITE_ITERATION_CEILING: usize = 10_000;

#[derive(Debug, Clone)]
struct LiveEdge {
    from: usize,
    to: usize,
    expr: Expr,
}

/// Reduce `graph` to a single series/parallel tree expression oriented
/// `+` → `−`.
pub fn reduce(graph: &CanonicalGraph) -> CircuitResult<Expr> {
    let mut edges: Vec<Option<LiveEdge>> = graph
        .edges
        .iter()
        .map(|e| Some(LiveEdge {
            from: e.n1,
            to: e.n2,
            expr: Expr::Atom(atom_from_canon_edge(e)),
        }))
        .collect();

    for _ in 0..REWRITE_ITERATION_CEILING {
        if try_parallel_reduction(&mut edges)? {
            continue;
        }
        if try_series_reduction(&mut edges, graph.terminal_plus, graph.terminal_minus) {
            continue;
        }
        break;
    }

    let live: Vec<&LiveEdge> = edges.iter().flatten().collect();
    if live.len() != 1 {
        return Err(CircuitError::Reducibility(
            "not reducible by series/parallel".into(),
        ));
    }
    let only = live[0];
    let unordered_matches = (only.from == graph.terminal_plus && only.to == graph.terminal_minus)
        || (only.from == graph.terminal_minus && only.to == graph.terminal_plus);
    if !unordered_matches {
        return Err(CircuitError::Reducibility(
            "not reducible by series/parallel".into(),
        ));
    }
    if only.from == graph.terminal_plus {
        Ok(only.expr.clone())
    } else {
        Ok(only.expr.reversed())
    }
}

fn atom_from_canon_edge(edge: &CanonEdge) -> Atom {
    match &edge.kind {
        EdgeKind::Resistor { ohms } => Atom::Resistor {
            id: edge.id,
            ohms: *ohms,
            name: edge.label.clone(),
            generated: false,
        },
        EdgeKind::Ammeter => Atom::Ammeter {
            id: edge.id,
            name: edge.label.clone(),
        },
        EdgeKind::VSource { volts } => Atom::VSource {
            id: edge.id,
            volts: *volts,
            name: edge.label.clone(),
        },
        EdgeKind::ISource { amps } => Atom::ISource {
            id: edge.id,
            amps: *amps,
            name: edge.label.clone(),
        },
        EdgeKind::Wire => unreachable!("wires are contracted before reduction"),
    }
}

/// Find the first (by first-occurrence order) unordered endpoint pair shared
/// by `>= 2` live edges, and collapse them into one `parallel` edge.
fn try_parallel_reduction(edges: &mut [Option<LiveEdge>]) -> CircuitResult<bool> {
    let mut order: Vec<(usize, usize)> = Vec::new();
    let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (idx, slot) in edges.iter().enumerate() {
        let Some(edge) = slot else { continue };
        let key = (edge.from.min(edge.to), edge.from.max(edge.to));
        if !groups.contains_key(&key) {
            order.push(key);
        }
        groups.entry(key).or_default().push(idx);
    }

    let Some(key) = order.into_iter().find(|k| groups[k].len() >= 2) else {
        return Ok(false);
    };
    let indices = groups.remove(&key).unwrap();
    let (u, v) = key;

    for &idx in &indices {
        if matches!(edges[idx].as_ref().unwrap().expr, Expr::Atom(Atom::Ammeter { .. })) {
            return Err(CircuitError::ShortCircuit(
                "ammeter-only parallel branch creates a short".into(),
            ));
        }
    }

    let mut branches = Vec::with_capacity(indices.len());
    for &idx in &indices {
        let live = edges[idx].take().unwrap();
        let oriented = if live.from == u { live.expr } else { live.expr.reversed() };
        branches.push(oriented);
    }

    let replacement = LiveEdge {
        from: u,
        to: v,
        expr: parallel(branches),
    };
    edges.push(Some(replacement));
    Ok(true)
}

/// Find the lowest-index non-terminal super-node of degree exactly 2 whose
/// neighbors are distinct, and collapse its two incident edges into one
/// `series` edge.
fn try_series_reduction(edges: &mut Vec<Option<LiveEdge>>, plus: usize, minus: usize) -> bool {
    let max_node = edges
        .iter()
        .flatten()
        .map(|e| e.from.max(e.to))
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);

    for node in 0..max_node {
        if node == plus || node == minus {
            continue;
        }
        let incident: Vec<usize> = edges
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let e = slot.as_ref()?;
                (e.from == node || e.to == node).then_some(idx)
            })
            .collect();
        if incident.len() != 2 {
            continue;
        }
        let i1 = incident[0];
        let i2 = incident[1];
        let other1 = {
            let e = edges[i1].as_ref().unwrap();
            if e.from == node { e.to } else { e.from }
        };
        let other2 = {
            let e = edges[i2].as_ref().unwrap();
            if e.from == node { e.to } else { e.from }
        };
        if other1 == other2 {
            continue; // left for the parallel rule
        }

        let e1 = edges[i1].take().unwrap();
        let e2 = edges[i2].take().unwrap();
        let oriented1 = if e1.from == other1 { e1.expr } else { e1.expr.reversed() };
        let oriented2 = if e2.from == node { e2.expr } else { e2.expr.reversed() };

        edges.push(Some(LiveEdge {
            from: other1,
            to: other2,
            expr: series(vec![oriented1, oriented2]),
        }));
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::EdgeId;
    use crate::units::Ohms;

    fn edge(id: u64, n1: usize, n2: usize, kind: EdgeKind) -> CanonEdge {
        CanonEdge {
            id: EdgeId(id),
            label: None,
            n1,
            n2,
            kind,
        }
    }

    fn graph(edges: Vec<CanonEdge>, plus: usize, minus: usize) -> CanonicalGraph {
        let num_super_nodes = edges.iter().map(|e| e.n1.max(e.n2)).max().unwrap_or(0) + 1;
        CanonicalGraph {
            super_node_of: Default::default(),
            num_super_nodes,
            edges,
            terminal_plus: plus,
            terminal_minus: minus,
        }
    }

    #[test]
    fn two_series_resistors_reduce_to_a_series_tree() {
        let g = graph(
            vec![
                edge(0, 0, 2, EdgeKind::Resistor { ohms: Ohms(100.0) }),
                edge(1, 2, 1, EdgeKind::Resistor { ohms: Ohms(200.0) }),
            ],
            0,
            1,
        );
        let tree = reduce(&g).unwrap();
        match tree {
            Expr::Series(children) => assert_eq!(children.len(), 2),
            other => panic!("expected series, got {other:?}"),
        }
    }

    #[test]
    fn two_parallel_resistors_reduce_to_a_parallel_tree() {
        let g = graph(
            vec![
                edge(0, 0, 1, EdgeKind::Resistor { ohms: Ohms(100.0) }),
                edge(1, 0, 1, EdgeKind::Resistor { ohms: Ohms(100.0) }),
            ],
            0,
            1,
        );
        let tree = reduce(&g).unwrap();
        match tree {
            Expr::Parallel(branches) => assert_eq!(branches.len(), 2),
            other => panic!("expected parallel, got {other:?}"),
        }
    }

    #[test]
    fn ammeter_only_parallel_branch_is_a_short() {
        let g = graph(
            vec![
                edge(0, 0, 1, EdgeKind::Resistor { ohms: Ohms(100.0) }),
                edge(1, 0, 1, EdgeKind::Ammeter),
            ],
            0,
            1,
        );
        let err = reduce(&g).unwrap_err();
        assert!(matches!(err, CircuitError::ShortCircuit(_)));
    }

    #[test]
    fn wheatstone_bridge_is_not_reducible() {
        // Bridge: + -- R1 -- a -- R2 -- -
        //         + -- R3 -- b -- R4 -- -
        //                a -- R5 -- b
        let g = graph(
            vec![
                edge(0, 0, 2, EdgeKind::Resistor { ohms: Ohms(1.0) }),
                edge(1, 2, 1, EdgeKind::Resistor { ohms: Ohms(1.0) }),
                edge(2, 0, 3, EdgeKind::Resistor { ohms: Ohms(1.0) }),
                edge(3, 3, 1, EdgeKind::Resistor { ohms: Ohms(1.0) }),
                edge(4, 2, 3, EdgeKind::Resistor { ohms: Ohms(1.0) }),
            ],
            0,
            1,
        );
        let err = reduce(&g).unwrap_err();
        assert!(matches!(err, CircuitError::Reducibility(_)));
    }
}

//! Modified Nodal Analysis: assembles the dense linear system for a
//! [`CanonicalGraph`] and solves it by Gauss elimination with partial
//! pivoting.
//!
//! The elimination routine follows the usual dense Gauss-with-partial-pivot
//! shape, reporting a [`CircuitError`] on a singular system and staying
//! inside the pure core (no solver trait object, since this crate only ever
//! needs the one dense backend).

use crate::canonicalize::CanonicalGraph;
use crate::error::{CircuitError, CircuitResult};
use crate::ids::EdgeId;
use crate::model::EdgeKind;
use crate::units::{Amps, Volts};
use std::collections::HashMap;

const PIVOT_EPSILON: f64 = 1e-12;

/// The solution of one MNA solve: every node's potential (ground is `0 V`)
/// and the branch current through every voltage source / ammeter.
#[derive(Debug, Clone, PartialEq)]
pub struct MnaSolution {
    pub node_potentials: HashMap<usize, Volts>,
    pub source_currents: HashMap<EdgeId, Amps>,
}

impl MnaSolution {
    pub fn potential_at(&self, node: usize) -> Volts {
        self.node_potentials.get(&node).copied().unwrap_or(Volts(0.0))
    }

    /// `V[n1] - V[n2]`, the voltage across an edge oriented `n1` → `n2`.
    pub fn branch_voltage(&self, n1: usize, n2: usize) -> Volts {
        self.potential_at(n1) - self.potential_at(n2)
    }
}

/// Solve `graph` for node potentials and source currents. `graph.terminal_minus`
/// is taken as the reference node (`0 V`).
pub fn solve(graph: &CanonicalGraph) -> CircuitResult<MnaSolution> {
    let ground = graph.terminal_minus;

    let mut node_var = vec![None; graph.num_super_nodes];
    let mut n_nodes = 0usize;
    for node in 0..graph.num_super_nodes {
        if node != ground {
            node_var[node] = Some(n_nodes);
            n_nodes += 1;
        }
    }

    let mut source_var: HashMap<EdgeId, usize> = HashMap::new();
    let mut n_sources = 0usize;
    for edge in &graph.edges {
        if matches!(edge.kind, EdgeKind::VSource { .. } | EdgeKind::Ammeter) {
            source_var.insert(edge.id, n_nodes + n_sources);
            n_sources += 1;
        }
    }

    let dim = n_nodes + n_sources;
    let mut a = vec![vec![0.0_f64; dim]; dim];
    let mut rhs = vec![0.0_f64; dim];

    for edge in &graph.edges {
        match &edge.kind {
            EdgeKind::Resistor { ohms } => {
                let g = ohms.conductance();
                stamp_conductance(&mut a, &node_var, edge.n1, edge.n2, g);
            }
            EdgeKind::ISource { amps } => {
                if let Some(p) = node_var[edge.n1] {
                    rhs[p] -= amps.value();
                }
                if let Some(q) = node_var[edge.n2] {
                    rhs[q] += amps.value();
                }
            }
            EdgeKind::VSource { volts } => {
                let k = source_var[&edge.id];
                stamp_source_branch(&mut a, &mut rhs, &node_var, edge.n1, edge.n2, k, volts.value());
            }
            EdgeKind::Ammeter => {
                let k = source_var[&edge.id];
                stamp_source_branch(&mut a, &mut rhs, &node_var, edge.n1, edge.n2, k, 0.0);
            }
            EdgeKind::Wire => unreachable!("wires are contracted before canonicalization"),
        }
    }

    let solution = gauss_eliminate(a, rhs)?;

    let mut node_potentials = HashMap::with_capacity(graph.num_super_nodes);
    node_potentials.insert(ground, Volts(0.0));
    for (node, var) in node_var.iter().enumerate() {
        if let Some(idx) = var {
            node_potentials.insert(node, Volts(solution[*idx]));
        }
    }

    let mut source_currents = HashMap::with_capacity(source_var.len());
    for (id, idx) in source_var {
        source_currents.insert(id, Amps(solution[idx]));
    }

    Ok(MnaSolution {
        node_potentials,
        source_currents,
    })
}

fn stamp_conductance(a: &mut [Vec<f64>], node_var: &[Option<usize>], n1: usize, n2: usize, g: f64) {
    let p = node_var[n1];
    let q = node_var[n2];
    if let Some(p) = p {
        a[p][p] += g;
    }
    if let Some(q) = q {
        a[q][q] += g;
    }
    if let (Some(p), Some(q)) = (p, q) {
        a[p][q] -= g;
        a[q][p] -= g;
    }
}

fn stamp_source_branch(
    a: &mut [Vec<f64>],
    rhs: &mut [f64],
    node_var: &[Option<usize>],
    n1: usize,
    n2: usize,
    branch: usize,
    value: f64,
) {
    if let Some(p) = node_var[n1] {
        a[p][branch] += 1.0;
        a[branch][p] += 1.0;
    }
    if let Some(q) = node_var[n2] {
        a[q][branch] -= 1.0;
        a[branch][q] -= 1.0;
    }
    rhs[branch] = value;
}

/// Gauss elimination with partial pivoting, adapted from `GaussSolver`.
fn gauss_eliminate(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> CircuitResult<Vec<f64>> {
    let n = a.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    for i in 0..n {
        let mut pivot = i;
        for row in i + 1..n {
            if a[row][i].abs() > a[pivot][i].abs() {
                pivot = row;
            }
        }
        if pivot != i {
            a.swap(i, pivot);
            b.swap(i, pivot);
        }

        let diag = a[i][i];
        if !diag.is_finite() || diag.abs() < PIVOT_EPSILON {
            return Err(CircuitError::Numeric(
                "the MNA system is singular; check for floating nodes or source loops".into(),
            ));
        }

        for value in a[i][i..].iter_mut() {
            *value /= diag;
        }
        b[i] /= diag;

        let pivot_segment = a[i][i..].to_vec();
        for row in 0..n {
            if row == i {
                continue;
            }
            let factor = a[row][i];
            if factor == 0.0 {
                continue;
            }
            for (target, &pivot_val) in a[row][i..].iter_mut().zip(pivot_segment.iter()) {
                *target -= factor * pivot_val;
            }
            b[row] -= factor * b[i];
        }
    }

    Ok(b)
}

//! The superposition decomposition driver: solves a circuit once per
//! independent source (every other independent source deactivated) and sums
//! the results, so a caller can see each source's individual contribution as
//! well as the total response.
//!
//! A voltage source is deactivated by zeroing its value (electrically a
//! short); a current source is deactivated by zeroing its value
//! (electrically an open). Both leave the canonical graph's topology
//! untouched, so deactivation never needs to re-run [`crate::canonicalize`].

use crate::canonicalize::CanonicalGraph;
use crate::error::CircuitError;
use crate::ids::EdgeId;
use crate::mna::{self, MnaSolution};
use crate::model::EdgeKind;
use crate::units::{Amps, Volts};
use std::collections::HashMap;

/// One independent source's isolated contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceContribution {
    pub source_id: EdgeId,
    pub source_name: Option<String>,
    pub solution: MnaSolution,
}

/// The summed response of every independent source, plus each one's isolated
/// contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperpositionResult {
    pub node_potentials: HashMap<usize, Volts>,
    pub source_currents: HashMap<EdgeId, Amps>,
    pub contributions: Vec<SourceContribution>,
}

impl SuperpositionResult {
    pub fn potential_at(&self, node: usize) -> Volts {
        self.node_potentials.get(&node).copied().unwrap_or(Volts(0.0))
    }

    pub fn branch_voltage(&self, n1: usize, n2: usize) -> Volts {
        self.potential_at(n1) - self.potential_at(n2)
    }
}

fn is_independent_source(kind: &EdgeKind) -> bool {
    matches!(kind, EdgeKind::VSource { .. } | EdgeKind::ISource { .. })
}

fn deactivated(kind: &EdgeKind) -> EdgeKind {
    match kind {
        EdgeKind::VSource { .. } => EdgeKind::VSource { volts: Volts(0.0) },
        EdgeKind::ISource { .. } => EdgeKind::ISource { amps: Amps(0.0) },
        other => other.clone(),
    }
}

/// Decompose `graph`'s response into one contribution per independent
/// source, and return both the contributions and their sum.
pub fn superpose(graph: &CanonicalGraph) -> Result<SuperpositionResult, CircuitError> {
    let independent: Vec<usize> = graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| is_independent_source(&e.kind))
        .map(|(i, _)| i)
        .collect();

    if independent.is_empty() {
        return Err(CircuitError::Structural(
            "no independent sources to superpose".into(),
        ));
    }

    let mut total_potentials: HashMap<usize, Volts> =
        (0..graph.num_super_nodes).map(|n| (n, Volts(0.0))).collect();
    let mut total_currents: HashMap<EdgeId, Amps> = HashMap::new();
    let mut contributions = Vec::with_capacity(independent.len());

    for &active_idx in &independent {
        let mut variant = graph.clone();
        for (i, edge) in variant.edges.iter_mut().enumerate() {
            if i != active_idx {
                edge.kind = deactivated(&edge.kind);
            }
        }

        let active_edge = &graph.edges[active_idx];
        let source_id = active_edge.id;
        let source_name = active_edge.label.clone();

        let solution = mna::solve(&variant).map_err(|err| annotate(err, &source_name, source_id))?;

        for (node, v) in &solution.node_potentials {
            let acc = total_potentials.entry(*node).or_insert(Volts(0.0));
            *acc = *acc + *v;
        }
        for (id, i) in &solution.source_currents {
            let acc = total_currents.entry(*id).or_insert(Amps(0.0));
            *acc = *acc + *i;
        }

        contributions.push(SourceContribution {
            source_id,
            source_name,
            solution,
        });
    }

    Ok(SuperpositionResult {
        node_potentials: total_potentials,
        source_currents: total_currents,
        contributions,
    })
}

fn annotate(err: CircuitError, name: &Option<String>, id: EdgeId) -> CircuitError {
    let label = name.clone().unwrap_or_else(|| id.to_string());
    match err {
        CircuitError::Numeric(msg) => CircuitError::Numeric(format!("{msg} (active source {label})")),
        CircuitError::Structural(msg) => {
            CircuitError::Structural(format!("{msg} (active source {label})"))
        }
        other => other,
    }
}

//! The three public entry points (`canonicalize`, `reduce`, `solve`) plus the
//! labeling pass that assigns deterministic `R1`, `A1`, … names to
//! unlabeled resistors and ammeters and validates explicit ones. Sources
//! carry no canonical index (only resistors/ammeters get one).

use crate::canonicalize::{self, CanonicalGraph};
use crate::error::{CircuitError, CircuitResult};
use crate::ids::EdgeId;
use crate::model::{Circuit, Edge, EdgeKind};
use crate::reduce;
use crate::superposition::{self, SuperpositionResult};
use crate::tree::Expr;
use crate::units::{Amps, Ohms, Volts};
use std::collections::{HashMap, HashSet};

/// Reserved id for the synthetic external-supply edge `solve` injects across
/// the terminals when `external_supply` is given.
const EXTERNAL_SUPPLY_ID: EdgeId = EdgeId(u64::MAX);

fn prefix_for(kind: &EdgeKind) -> Option<char> {
    match kind {
        EdgeKind::Resistor { .. } => Some('R'),
        EdgeKind::Ammeter => Some('A'),
        EdgeKind::VSource { .. } | EdgeKind::ISource { .. } => None,
        EdgeKind::Wire => None,
    }
}

/// Parse a label of the form `R7`, `R_7`, `R{7}`, or `R_{7}` for the given
/// prefix letter; any other shape is rejected.
fn parse_indexed_label(prefix: char, label: &str) -> Option<u64> {
    let rest = label.strip_prefix(prefix)?;
    let digits = if let Some(d) = rest.strip_prefix("_{").and_then(|d| d.strip_suffix('}')) {
        d
    } else if let Some(d) = rest.strip_prefix('{').and_then(|d| d.strip_suffix('}')) {
        d
    } else if let Some(d) = rest.strip_prefix('_') {
        d
    } else {
        rest
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Assign `R1`, `A1`-style labels to every unlabeled resistor/ammeter,
/// validating explicit labels for format and uniqueness along the way.
/// Sources and wires are never labeled by this pass.
pub fn assign_labels(circuit: &mut Circuit) -> CircuitResult<()> {
    let mut used_numbers: HashMap<char, HashSet<u64>> = HashMap::new();
    let mut seen_labels: HashSet<String> = HashSet::new();

    for edge in &circuit.edges {
        let Some(prefix) = prefix_for(&edge.kind) else { continue };
        let Some(label) = &edge.label else { continue };
        if !seen_labels.insert(label.clone()) {
            return Err(CircuitError::Labeling(format!("duplicate label '{label}'")));
        }
        match parse_indexed_label(prefix, label) {
            Some(n) => {
                used_numbers.entry(prefix).or_default().insert(n);
            }
            None => {
                return Err(CircuitError::Labeling(format!(
                    "label '{label}' does not match the expected pattern for {prefix}<n>"
                )));
            }
        }
    }

    let mut next_numbers: HashMap<char, u64> = HashMap::new();
    for edge in &mut circuit.edges {
        if edge.label.is_some() {
            continue;
        }
        let Some(prefix) = prefix_for(&edge.kind) else { continue };
        let used = used_numbers.entry(prefix).or_default();
        let counter = next_numbers.entry(prefix).or_insert(0);
        loop {
            *counter += 1;
            if !used.contains(counter) {
                used.insert(*counter);
                break;
            }
        }
        edge.label = Some(format!("{prefix}{counter}"));
    }
    Ok(())
}

/// Canonicalize `circuit` into its super-node graph.
pub fn canonicalize(circuit: &Circuit) -> CircuitResult<CanonicalGraph> {
    canonicalize::canonicalize(circuit)
}

/// Canonicalize then series/parallel-reduce `circuit` to a single tree
/// expression oriented `+` → `−`.
pub fn reduce(circuit: &Circuit) -> CircuitResult<Expr> {
    let graph = canonicalize::canonicalize(circuit)?;
    reduce::reduce(&graph)
}

/// One resistor's solved operating point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResistorReport {
    pub id: EdgeId,
    pub name: Option<String>,
    pub ohms: Ohms,
    pub voltage: Volts,
    pub current: Amps,
}

/// The full result of [`solve`]: the canonical graph solved against, the
/// superposition breakdown, and each resistor's derived voltage/current.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub graph: CanonicalGraph,
    pub superposition: SuperpositionResult,
    pub resistors: Vec<ResistorReport>,
}

/// Canonicalize `circuit` and solve it by superposition. When
/// `external_supply` is given, an extra ideal voltage source named `U_s` is
/// injected across the circuit's resolved `+`/`−` terminals before solving -
/// the same resolution `canonicalize` itself falls back to (explicit fields,
/// else the first voltage source's endpoints, else the first two vertices).
pub fn solve(circuit: &Circuit, external_supply: Option<Volts>) -> CircuitResult<SolveReport> {
    let mut working = circuit.clone();
    if let Some(volts) = external_supply {
        let (plus, minus) = canonicalize::resolve_terminal_vertices(&working)?;
        let mut supply = Edge::new(EXTERNAL_SUPPLY_ID, plus, minus, EdgeKind::VSource { volts });
        supply.label = Some("U_s".to_string());
        working.add_edge(supply);
    }

    let graph = canonicalize::canonicalize(&working)?;
    let superposition_result = superposition::superpose(&graph)?;

    let mut resistors = Vec::new();
    for edge in &graph.edges {
        if let EdgeKind::Resistor { ohms } = &edge.kind {
            let voltage = superposition_result.branch_voltage(edge.n1, edge.n2);
            let current = Amps(voltage.value() * ohms.conductance());
            resistors.push(ResistorReport {
                id: edge.id,
                name: edge.label.clone(),
                ohms: *ohms,
                voltage,
                current,
            });
        }
    }

    Ok(SolveReport {
        graph,
        superposition: superposition_result,
        resistors,
    })
}

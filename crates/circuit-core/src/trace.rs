//! The reduction trace orchestrator: replays [`crate::reduce`]'s tree one
//! depth level at a time, turning each deepest series/parallel group of
//! passive atoms into a named equivalent resistor, so a caller can present
//! the reduction as a sequence of human-readable steps.
//!
//! Collapsing is deepest-first by nesting depth from the root: each level
//! finds the maximum depth at which a fully-passive-atom series/parallel
//! node exists and collapses only those, leaving shallower candidates for a
//! later level. A node that mixes in a voltage or current source is left
//! alone — sources don't reduce to an equivalent resistance, so the trace
//! simply stops growing along that branch.

use crate::error::CircuitError;
use crate::ids::{GeneratedName, IdGen};
use crate::tree::{Atom, Expr};
use crate::units::Ohms;

/// Hard ceiling on trace depth, distinct from the reducer's own
/// rewrite-iteration ceiling.
const LEVEL_CEILING: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Series,
    Parallel,
}

/// One equivalent-resistance collapse recorded during the trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionStep {
    pub level: usize,
    pub counter: usize,
    pub kind: StepKind,
    pub operand_names: Vec<String>,
    pub operand_ohms: Vec<Ohms>,
    pub result_name: GeneratedName,
    pub result_ohms: Ohms,
    pub presentation: String,
}

/// The result of tracing a tree to (partial or full) resistive collapse.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceOutcome {
    pub levels: Vec<Vec<ReductionStep>>,
    pub final_tree: Expr,
    pub error: Option<CircuitError>,
}

/// Trace `tree`'s series/parallel collapse, level by level. Each level
/// collapses only the candidates at the current maximum nesting depth
/// (the "deepest-first" depth policy described at module level).
pub fn trace(tree: &Expr) -> TraceOutcome {
    let mut idgen = IdGen::starting_after(0, max_atom_edge_id(tree));
    let mut current = tree.clone();
    let mut levels = Vec::new();

    for level in 0..LEVEL_CEILING {
        let Some(target_depth) = max_candidate_depth(&current, 0) else {
            return TraceOutcome {
                levels,
                final_tree: current,
                error: None,
            };
        };
        let mut steps = Vec::new();
        let mut counter = 0usize;
        match apply_at_depth(&current, 0, target_depth, level, &mut counter, &mut idgen, &mut steps) {
            Ok(next) => {
                levels.push(steps);
                current = next;
            }
            Err(err) => {
                return TraceOutcome {
                    levels,
                    final_tree: current,
                    error: Some(err),
                };
            }
        }
    }

    // The ceiling was reached without the loop's own early return, so some
    // candidate is still left uncollapsed - that's a livelock, not a
    // finished trace.
    let error = max_candidate_depth(&current, 0)
        .map(|_| CircuitError::Reducibility("reduction limit reached".into()));
    TraceOutcome {
        levels,
        final_tree: current,
        error,
    }
}

/// The highest edge id among `tree`'s atoms, so the id generator seeded from
/// it never hands out an id that collides with a real circuit edge.
fn max_atom_edge_id(expr: &Expr) -> u64 {
    match expr {
        Expr::Atom(a) => a.id().value(),
        Expr::Series(children) | Expr::Parallel(children) => {
            children.iter().map(max_atom_edge_id).max().unwrap_or(0)
        }
    }
}

/// The deepest nesting level at which a fully-passive-atom series/parallel
/// node exists, or `None` if there is nothing left to collapse.
fn max_candidate_depth(expr: &Expr, depth: usize) -> Option<usize> {
    match expr {
        Expr::Atom(_) => None,
        Expr::Series(children) | Expr::Parallel(children) => {
            if all_passive_atoms(children).is_some() {
                Some(depth)
            } else {
                children
                    .iter()
                    .filter_map(|c| max_candidate_depth(c, depth + 1))
                    .max()
            }
        }
    }
}

/// Collapse every fully-passive-atom series/parallel node that sits exactly
/// at `target`, leaving shallower candidates untouched for a later level.
fn apply_at_depth(
    expr: &Expr,
    depth: usize,
    target: usize,
    level: usize,
    counter: &mut usize,
    idgen: &mut IdGen,
    steps: &mut Vec<ReductionStep>,
) -> Result<Expr, CircuitError> {
    match expr {
        Expr::Atom(_) => Ok(expr.clone()),
        Expr::Series(children) => {
            if let Some(atoms) = all_passive_atoms(children) {
                if depth != target {
                    return Ok(expr.clone());
                }
                let step = collapse_series(&atoms, level, counter)?;
                let result = Expr::Atom(Atom::generated_resistor(
                    idgen.fresh_edge(),
                    step.result_ohms,
                    step.result_name.clone(),
                ));
                steps.push(step);
                Ok(result)
            } else {
                let rewritten: Result<Vec<Expr>, _> = children
                    .iter()
                    .map(|c| apply_at_depth(c, depth + 1, target, level, counter, idgen, steps))
                    .collect();
                Ok(Expr::Series(rewritten?))
            }
        }
        Expr::Parallel(children) => {
            if let Some(atoms) = all_passive_atoms(children) {
                if depth != target {
                    return Ok(expr.clone());
                }
                let step = collapse_parallel(&atoms, level, counter)?;
                let result = Expr::Atom(Atom::generated_resistor(
                    idgen.fresh_edge(),
                    step.result_ohms,
                    step.result_name.clone(),
                ));
                steps.push(step);
                Ok(result)
            } else {
                let rewritten: Result<Vec<Expr>, _> = children
                    .iter()
                    .map(|c| apply_at_depth(c, depth + 1, target, level, counter, idgen, steps))
                    .collect();
                Ok(Expr::Parallel(rewritten?))
            }
        }
    }
}

fn is_passive(atom: &Atom) -> bool {
    matches!(atom, Atom::Resistor { .. } | Atom::Ammeter { .. })
}

fn ohms_of(atom: &Atom) -> Ohms {
    match atom {
        Atom::Resistor { ohms, .. } => *ohms,
        Atom::Ammeter { .. } => Ohms(0.0),
        _ => unreachable!("ohms_of called on a non-passive atom"),
    }
}

fn name_of(atom: &Atom) -> String {
    atom.name()
        .map(str::to_string)
        .unwrap_or_else(|| atom.id().to_string())
}

fn all_passive_atoms(children: &[Expr]) -> Option<Vec<Atom>> {
    let mut atoms = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Expr::Atom(a) if is_passive(a) => atoms.push(a.clone()),
            _ => return None,
        }
    }
    Some(atoms)
}

fn collapse_series(
    atoms: &[Atom],
    level: usize,
    counter: &mut usize,
) -> Result<ReductionStep, CircuitError> {
    let total: f64 = atoms.iter().map(|a| ohms_of(a).value()).sum();
    if total == 0.0 {
        return Err(CircuitError::ShortCircuit(
            "a zero-ohm series run shorts the circuit".into(),
        ));
    }
    let names: Vec<String> = atoms.iter().map(name_of).collect();
    let ohms_list: Vec<Ohms> = atoms.iter().map(ohms_of).collect();
    let result_name = GeneratedName::new(level, *counter);
    *counter += 1;
    let presentation = format!("{} = {:.6} Ω", names.join(" + "), total);
    Ok(ReductionStep {
        level,
        counter: result_name.counter,
        kind: StepKind::Series,
        operand_names: names,
        operand_ohms: ohms_list,
        result_name,
        result_ohms: Ohms(total),
        presentation,
    })
}

fn collapse_parallel(
    atoms: &[Atom],
    level: usize,
    counter: &mut usize,
) -> Result<ReductionStep, CircuitError> {
    let ohms_list: Vec<Ohms> = atoms.iter().map(ohms_of).collect();
    if atoms.len() > 1 && ohms_list.iter().any(|o| o.value() == 0.0) {
        return Err(CircuitError::ShortCircuit(
            "a zero-resistance branch shorts the rest of this parallel group".into(),
        ));
    }
    let reciprocal_sum: f64 = ohms_list.iter().map(|o| o.conductance()).sum();
    if reciprocal_sum == 0.0 {
        return Err(CircuitError::Reducibility(
            "parallel group has infinite equivalent resistance".into(),
        ));
    }
    let total = 1.0 / reciprocal_sum;
    let names: Vec<String> = atoms.iter().map(name_of).collect();
    let result_name = GeneratedName::new(level, *counter);
    *counter += 1;
    let presentation = format!(
        "(1/{})⁻¹ = {:.6} Ω",
        names
            .iter()
            .map(|n| format!("{n}"))
            .collect::<Vec<_>>()
            .join(" + 1/"),
        total
    );
    Ok(ReductionStep {
        level,
        counter: result_name.counter,
        kind: StepKind::Parallel,
        operand_names: names,
        operand_ohms: ohms_list,
        result_name,
        result_ohms: Ohms(total),
        presentation,
    })
}

//! The series/parallel tree: the canonical form produced by [`crate::reduce`].
//!
//! A tree is oriented `+` → `−`. Wires never appear in it (they are
//! contracted away during canonicalization). Flattening is enforced by the
//! smart constructors [`series`] and [`parallel`]: a series directly inside a
//! series is merged into its parent, and a single-child series or parallel
//! collapses to that child.

use crate::ids::{EdgeId, GeneratedName};
use crate::units::{Amps, Ohms, Volts};
use serde::{Deserialize, Serialize};

/// A leaf component in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Atom {
    Resistor {
        id: EdgeId,
        ohms: Ohms,
        name: Option<String>,
        generated: bool,
    },
    Ammeter {
        id: EdgeId,
        name: Option<String>,
    },
    VSource {
        id: EdgeId,
        volts: Volts,
        name: Option<String>,
    },
    ISource {
        id: EdgeId,
        amps: Amps,
        name: Option<String>,
    },
}

impl Atom {
    pub fn id(&self) -> EdgeId {
        match self {
            Atom::Resistor { id, .. }
            | Atom::Ammeter { id, .. }
            | Atom::VSource { id, .. }
            | Atom::ISource { id, .. } => *id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Atom::Resistor { name, .. }
            | Atom::Ammeter { name, .. }
            | Atom::VSource { name, .. }
            | Atom::ISource { name, .. } => name.as_deref(),
        }
    }

    /// A generated equivalent resistor, named `level.counter` and marked so
    /// labels/values can be hidden by default.
    pub fn generated_resistor(id: EdgeId, ohms: Ohms, name: GeneratedName) -> Self {
        Atom::Resistor {
            id,
            ohms,
            name: Some(name.to_string()),
            generated: true,
        }
    }

    /// Flip orientation: sources negate, resistors/ammeters are unchanged.
    pub fn reversed(&self) -> Self {
        match self {
            Atom::VSource { id, volts, name } => Atom::VSource {
                id: *id,
                volts: -*volts,
                name: name.clone(),
            },
            Atom::ISource { id, amps, name } => Atom::ISource {
                id: *id,
                amps: -*amps,
                name: name.clone(),
            },
            other => other.clone(),
        }
    }
}

/// A series/parallel tree expression, oriented `+` → `−`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Atom(Atom),
    /// Ordered sequence of child expressions.
    Series(Vec<Expr>),
    /// Set of `>= 2` ordered branch expressions.
    Parallel(Vec<Expr>),
}

impl Expr {
    /// Flip orientation: series children reverse in order (each reversed
    /// individually), parallel children are each reversed individually but
    /// keep their relative order.
    pub fn reversed(&self) -> Expr {
        match self {
            Expr::Atom(a) => Expr::Atom(a.reversed()),
            Expr::Series(children) => {
                Expr::Series(children.iter().rev().map(Expr::reversed).collect())
            }
            Expr::Parallel(branches) => {
                Expr::Parallel(branches.iter().map(Expr::reversed).collect())
            }
        }
    }
}

/// Build a series expression, flattening a series-inside-series and
/// collapsing a single-child series to its child.
pub fn series(children: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Expr::Series(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        flat.into_iter().next().unwrap()
    } else {
        Expr::Series(flat)
    }
}

/// Build a parallel expression, collapsing a single-branch parallel to its
/// branch. Branches are not flattened into a parent parallel; only nested
/// series gets flattened.
pub fn parallel(branches: Vec<Expr>) -> Expr {
    if branches.len() == 1 {
        branches.into_iter().next().unwrap()
    } else {
        Expr::Parallel(branches)
    }
}

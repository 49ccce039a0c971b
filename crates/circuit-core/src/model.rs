//! The node/edge circuit data model (the editor form).
//!
//! This is the only mutable state in the system: the canonical form, the MNA
//! element list, and every result structure are pure, immutable values
//! re-derived from a [`Circuit`] by [`crate::canonicalize`], [`crate::reduce`],
//! and [`crate::mna`].

use crate::ids::{EdgeId, VertexId};
use crate::units::{Amps, Ohms, Volts};
use serde::{Deserialize, Serialize};

/// A vertex (node) in the editor-form circuit.
///
/// `position` is carried for the editor's layout only; it has no bearing on
/// analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub label: Option<String>,
    #[serde(default)]
    pub position: (f64, f64),
}

impl Vertex {
    pub fn new(id: VertexId) -> Self {
        Self {
            id,
            label: None,
            position: (0.0, 0.0),
        }
    }
}

/// The tagged set of edge kinds a circuit edge can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EdgeKind {
    /// Undirected; contracts its endpoints during canonicalization.
    Wire,
    /// Undirected; `ohms` must be finite and strictly positive.
    Resistor { ohms: Ohms },
    /// Ideal 0 Ω; direction is `a` → `b`.
    Ammeter,
    /// `a` is `+`, `b` is `−`; `volts` must be finite.
    VSource { volts: Volts },
    /// Injects current from `a` to `b`; `amps` must be finite.
    ISource { amps: Amps },
}

impl EdgeKind {
    pub fn is_wire(&self) -> bool {
        matches!(self, EdgeKind::Wire)
    }

    pub fn is_voltage_source(&self) -> bool {
        matches!(self, EdgeKind::VSource { .. })
    }
}

/// An edge in the editor-form circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub label: Option<String>,
    pub a: VertexId,
    pub b: VertexId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(id: EdgeId, a: VertexId, b: VertexId, kind: EdgeKind) -> Self {
        Self {
            id,
            label: None,
            a,
            b,
            kind,
        }
    }

    /// The edge with endpoints swapped and sources negated/orientation
    /// flipped, matching the reducer's "reversing an edge" rule.
    pub fn reversed(&self) -> Self {
        let kind = match &self.kind {
            EdgeKind::VSource { volts } => EdgeKind::VSource { volts: -*volts },
            EdgeKind::ISource { amps } => EdgeKind::ISource { amps: -*amps },
            other => other.clone(),
        };
        Edge {
            id: self.id,
            label: self.label.clone(),
            a: self.b,
            b: self.a,
            kind,
        }
    }
}

/// The editor-form circuit: a labeled multigraph of vertices and edges plus
/// optional `+`/`−` terminal references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub terminal_plus: Option<VertexId>,
    #[serde(default)]
    pub terminal_minus: Option<VertexId>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.iter().any(|v| v.id == id)
    }

    /// The first voltage source edge in insertion order, if any.
    pub fn first_voltage_source(&self) -> Option<&Edge> {
        self.edges.iter().find(|e| e.kind.is_voltage_source())
    }
}

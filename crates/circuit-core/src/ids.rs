//! Stable identifiers for vertices, edges, and the equivalents the reducer
//! synthesizes while collapsing a circuit.
//!
//! Every identifier is a newtype over `u64` so a [`VertexId`] can never be
//! confused with an [`EdgeId`] at a call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a vertex in the editor-form circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u64);

/// Identifier for an edge in the editor-form circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl VertexId {
    #[inline]
    pub fn new(value: u64) -> Self {
        VertexId(value)
    }
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl EdgeId {
    #[inline]
    pub fn new(value: u64) -> Self {
        EdgeId(value)
    }
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A display name for an equivalent element synthesized by the reducer, of
/// the form `level.counter` (e.g. `2.3`), plus the `generated` marker that
/// lets consumers hide its value/label by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedName {
    pub level: usize,
    pub counter: usize,
}

impl GeneratedName {
    pub fn new(level: usize, counter: usize) -> Self {
        Self { level, counter }
    }
}

impl fmt::Display for GeneratedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.level, self.counter)
    }
}

/// A monotonically increasing source of fresh identifiers, scoped to one
/// analysis run. Not global/shared state — each entry point constructs its
/// own.
#[derive(Debug, Default)]
pub struct IdGen {
    next_vertex: u64,
    next_edge: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// An id generator whose first fresh edge/vertex id is guaranteed past
    /// both `max_existing_edge` and `max_existing_vertex`, so ids it hands
    /// out never collide with ids already in use.
    pub fn starting_after(max_existing_vertex: u64, max_existing_edge: u64) -> Self {
        Self {
            next_vertex: max_existing_vertex.saturating_add(1),
            next_edge: max_existing_edge.saturating_add(1),
        }
    }

    pub fn fresh_vertex(&mut self) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        id
    }

    pub fn fresh_edge(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_displays_level_dot_counter() {
        assert_eq!(GeneratedName::new(2, 3).to_string(), "2.3");
    }

    #[test]
    fn id_gen_yields_distinct_increasing_ids() {
        let mut gen = IdGen::new();
        let a = gen.fresh_edge();
        let b = gen.fresh_edge();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }
}

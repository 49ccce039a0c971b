//! Unified error type for the circuit analysis core.
//!
//! Errors here are values, never unwinding events: every fallible function in
//! this crate returns a [`CircuitResult`] and the core never panics outside of
//! `#[cfg(test)]`. The caller (CLI, editor, exporter) decides whether to
//! render, retry, or prompt.

use thiserror::Error;

/// Unified error type for all circuit-core operations.
///
/// One variant per failure category: structural
/// (malformed topology), numeric (non-finite/non-positive values, singular
/// systems), reducibility (not series/parallel, iteration ceilings),
/// labeling (index claims), and short-circuit (reducer-only zero-ohm paths).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    /// Malformed topology: missing endpoints, coincident terminals, no
    /// surviving components.
    #[error("structural error: {0}")]
    Structural(String),

    /// Non-finite or non-positive component values, or a singular MNA
    /// matrix.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// The circuit (or subgraph) cannot be collapsed by iterated
    /// series/parallel rewrites, or a rewrite/trace loop hit its ceiling.
    #[error("reducibility error: {0}")]
    Reducibility(String),

    /// Resistor/ammeter label claims an invalid or duplicate index.
    #[error("labeling error: {0}")]
    Labeling(String),

    /// The reducer found a zero-ohm path between terminals not mediated by
    /// any source (ammeter-only branch, empty parallel branch, zero-ohm
    /// series run).
    #[error("short circuit: {0}")]
    ShortCircuit(String),
}

/// Convenience alias for results using [`CircuitError`].
pub type CircuitResult<T> = Result<T, CircuitError>;

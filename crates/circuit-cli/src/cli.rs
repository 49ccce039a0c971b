use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log verbosity.
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contract wires and print the super-node graph.
    Canonicalize {
        /// Path to a circuit JSON file.
        file: PathBuf,
    },
    /// Series/parallel-reduce the circuit to a single tree expression.
    Reduce {
        /// Path to a circuit JSON file.
        file: PathBuf,
    },
    /// Solve the circuit by superposition and report every resistor's
    /// operating point.
    Solve {
        /// Path to a circuit JSON file.
        file: PathBuf,
        /// Inject an extra ideal voltage source (in volts) across the
        /// circuit's explicit `+`/`−` terminals before solving.
        #[arg(long)]
        external_supply: Option<f64>,
    },
}

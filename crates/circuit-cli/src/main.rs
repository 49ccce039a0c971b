mod cli;

use anyhow::{Context, Result};
use circuit_core::model::Circuit;
use circuit_core::units::Volts;
use circuit_core::{facade, tree::Expr};
use clap::Parser;
use cli::{Cli, Commands};
use std::fs;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

fn load_circuit(path: &Path) -> Result<Circuit> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading circuit file {}", path.display()))?;
    let mut circuit: Circuit =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    facade::assign_labels(&mut circuit).context("assigning component labels")?;
    Ok(circuit)
}

fn print_tree(expr: &Expr, depth: usize) {
    let pad = "  ".repeat(depth);
    match expr {
        Expr::Atom(a) => println!("{pad}{}", a.name().unwrap_or("?")),
        Expr::Series(children) => {
            println!("{pad}series");
            for child in children {
                print_tree(child, depth + 1);
            }
        }
        Expr::Parallel(branches) => {
            println!("{pad}parallel");
            for branch in branches {
                print_tree(branch, depth + 1);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    match &cli.command {
        Commands::Canonicalize { file } => {
            let circuit = load_circuit(file)?;
            info!("canonicalizing {}", file.display());
            match facade::canonicalize(&circuit) {
                Ok(graph) => {
                    println!("super-nodes: {}", graph.num_super_nodes);
                    println!("terminals: + = n{}, - = n{}", graph.terminal_plus, graph.terminal_minus);
                    for edge in &graph.edges {
                        println!("  n{} -- n{}: {:?}", edge.n1, edge.n2, edge.kind);
                    }
                }
                Err(err) => {
                    error!("canonicalization failed: {err}");
                    return Err(err.into());
                }
            }
        }
        Commands::Reduce { file } => {
            let circuit = load_circuit(file)?;
            info!("reducing {}", file.display());
            match facade::reduce(&circuit) {
                Ok(tree) => print_tree(&tree, 0),
                Err(err) => {
                    error!("circuit is not series/parallel reducible: {err}");
                    return Err(err.into());
                }
            }
        }
        Commands::Solve { file, external_supply } => {
            let circuit = load_circuit(file)?;
            info!("solving {}", file.display());
            let supply = external_supply.map(Volts::new);
            match facade::solve(&circuit, supply) {
                Ok(report) => {
                    for r in &report.resistors {
                        println!(
                            "{}: {} -> V = {}, I = {}",
                            r.name.as_deref().unwrap_or("?"),
                            r.ohms,
                            r.voltage,
                            r.current,
                        );
                    }
                }
                Err(err) => {
                    error!("solve failed: {err}");
                    return Err(err.into());
                }
            }
        }
    }

    Ok(())
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use dagrun::backends::BackendServices;
use dagrun::config::{load_and_build, NodeRegistry};
use dagrun::engine::{RunStatus, WaveExecutor};
use dagrun::gateways::{MemoryCatalog, MemoryStore};
use dagrun::graph;
use dagrun::payload::{DatasetPayload, Table};

/// Default concurrency: available CPU cores, falling back to 4.
fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <config.yaml> [--dot]", args[0]);
        eprintln!("Example: {} demos/classify_cusip.yaml", args[0]);
        eprintln!("         {} demos/classify_cusip.yaml --dot", args[0]);
        process::exit(1);
    }
    let config_path = &args[1];
    let print_dot = args.iter().any(|a| a == "--dot");

    // In-process capability stand-ins; a production embedder wires real
    // session/launcher/transport handles here instead.
    let registry = NodeRegistry::with_default_backends(BackendServices::in_process());
    let (dag, context, options) = load_and_build(config_path, &registry)
        .with_context(|| format!("failed to build run from '{}'", config_path))?;

    if print_dot {
        print!("{}", graph::to_dot(dag.nodes()));
        return Ok(());
    }

    let plan = graph::resolve(&dag)?;

    let catalog = Arc::new(MemoryCatalog::new());
    for dataset in plan.boundary_inputs() {
        catalog.seed(dataset.clone(), DatasetPayload::Table(Table::new()));
    }
    let store = Arc::new(MemoryStore::new());

    let max_concurrency = options.max_concurrency.unwrap_or_else(default_concurrency);
    let executor = WaveExecutor::new(max_concurrency);

    println!(
        "Run '{}' ({}): {} nodes in {} waves, max_concurrency={}",
        context.run_id(),
        context.environment(),
        dag.len(),
        plan.waves().len(),
        max_concurrency
    );
    if !plan.boundary_inputs().is_empty() {
        println!(
            "Boundary inputs seeded from catalog: {:?}",
            plan.boundary_inputs()
        );
    }

    let report = executor
        .run(&dag, catalog, store.clone(), Arc::new(context))
        .await?;

    println!();
    println!("Per-node results:");
    for (name, record) in report.nodes() {
        match &record.error {
            Some(error) => println!(
                "  {:<28} {:<10} {}",
                name,
                record.status.to_string(),
                error
            ),
            None => println!("  {:<28} {}", name, record.status.to_string()),
        }
    }
    println!();
    println!("Committed datasets: {:?}", store.commits());
    println!("Run status: {}", report.status());

    if report.status() != RunStatus::Completed {
        process::exit(1);
    }
    Ok(())
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wave-based DAG executor.
//!
//! Execution proceeds wave by wave: every member of a wave has all of its
//! producers in earlier waves, so wave members run concurrently (bounded by
//! a semaphore) and the executor joins the wave before advancing. For each
//! node the sequence is fetch inputs -> execute -> commit: producer outputs
//! come from the per-run cache, boundary inputs from the catalog gateway.
//!
//! Failures are contained, never propagated as run errors: a failed node is
//! recorded and its transitive downstream closure is skipped, while
//! independent branches keep running. Only resolution-time errors (cycles)
//! abort the run before anything executes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::context::ExecutionContext;
use crate::engine::report::{NodeRecord, NodeStatus, RunReport, RunStatus};
use crate::errors::{ExecutionError, NodeError};
use crate::graph::{resolve, Dag};
use crate::observability::messages::engine::{RunCancelled, RunFinished, RunStarted};
use crate::observability::messages::node::{
    NodeCompleted, NodeExecutionStarted, NodeFailed, NodeSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::payload::DatasetPayload;
use crate::traits::{CatalogGateway, Node, PersistenceGateway, ResolvedInputs};

type ResultCache = Mutex<HashMap<String, DatasetPayload>>;

pub struct WaveExecutor {
    max_concurrency: usize,
}

impl WaveExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }
}

impl Default for WaveExecutor {
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(concurrency)
    }
}

impl WaveExecutor {
    /// Run the DAG to a terminal report.
    pub async fn run(
        &self,
        dag: &Dag,
        catalog: Arc<dyn CatalogGateway>,
        store: Arc<dyn PersistenceGateway>,
        context: Arc<ExecutionContext>,
    ) -> Result<RunReport, ExecutionError> {
        self.run_with_cancellation(dag, catalog, store, context, CancellationToken::new())
            .await
    }

    /// Run with an external cancellation signal. In-flight nodes finish;
    /// no new waves are scheduled after the token fires; the report keeps
    /// every node's last known state.
    pub async fn run_with_cancellation(
        &self,
        dag: &Dag,
        catalog: Arc<dyn CatalogGateway>,
        store: Arc<dyn PersistenceGateway>,
        context: Arc<ExecutionContext>,
        cancel: CancellationToken,
    ) -> Result<RunReport, ExecutionError> {
        let plan = resolve(dag)?;
        let started = Instant::now();

        RunStarted {
            run_id: context.run_id(),
            node_count: dag.len(),
            wave_count: plan.waves().len(),
            max_concurrency: self.max_concurrency,
        }
        .log();

        let mut records: HashMap<String, NodeRecord> = dag
            .nodes()
            .iter()
            .map(|n| (n.name().to_string(), NodeRecord::pending()))
            .collect();
        let cache: Arc<ResultCache> = Arc::new(Mutex::new(HashMap::new()));
        let mut cancelled = false;

        for wave in plan.waves() {
            if cancel.is_cancelled() {
                cancelled = true;
                let pending = records
                    .values()
                    .filter(|r| r.status == NodeStatus::Pending)
                    .count();
                RunCancelled {
                    run_id: context.run_id(),
                    pending,
                }
                .log();
                break;
            }

            // Skipped members (failed upstream in an earlier wave) are left out.
            let runnable: Vec<Arc<dyn Node>> = wave
                .iter()
                .filter(|name| {
                    records
                        .get(*name)
                        .map_or(false, |r| r.status == NodeStatus::Pending)
                })
                .filter_map(|name| dag.get(name).cloned())
                .collect();
            if runnable.is_empty() {
                continue;
            }

            for node in &runnable {
                if let Some(record) = records.get_mut(node.name()) {
                    record.status = NodeStatus::Running;
                }
            }

            let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
            let mut tasks = Vec::with_capacity(runnable.len());
            for node in runnable {
                let catalog = Arc::clone(&catalog);
                let store = Arc::clone(&store);
                let cache = Arc::clone(&cache);
                let context = Arc::clone(&context);
                let semaphore = Arc::clone(&semaphore);

                tasks.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.map_err(|e| {
                        ExecutionError::Internal {
                            message: format!(
                                "failed to acquire permit for node '{}': {}",
                                node.name(),
                                e
                            ),
                        }
                    })?;

                    let start_msg = NodeExecutionStarted {
                        node: node.name(),
                        node_type: node.node_type(),
                        input_count: node.input_datasets().len(),
                    };
                    let span = start_msg.span("node_execution");
                    start_msg.log();

                    let outcome = run_node(
                        node.as_ref(),
                        catalog.as_ref(),
                        store.as_ref(),
                        cache.as_ref(),
                        context.as_ref(),
                    )
                    .instrument(span)
                    .await;
                    Ok::<_, ExecutionError>((node.name().to_string(), outcome))
                }));
            }

            for task in tasks {
                let (name, outcome) = match task.await {
                    Ok(Ok(pair)) => pair,
                    Ok(Err(e)) => return Err(e),
                    Err(join_error) => {
                        return Err(ExecutionError::Internal {
                            message: format!("task join error: {}", join_error),
                        })
                    }
                };
                match outcome {
                    Ok(()) => {
                        if let Some(record) = records.get_mut(&name) {
                            record.status = NodeStatus::Completed;
                        }
                    }
                    Err(error) => {
                        NodeFailed {
                            node: &name,
                            error: &error,
                        }
                        .log();
                        if let Some(record) = records.get_mut(&name) {
                            record.status = NodeStatus::Failed;
                            record.error = Some(error);
                        }
                        for dependent in plan.downstream_of(&name) {
                            if let Some(record) = records.get_mut(&dependent) {
                                if record.status == NodeStatus::Pending {
                                    NodeSkipped {
                                        node: &dependent,
                                        failed_upstream: &name,
                                    }
                                    .log();
                                    record.status = NodeStatus::Skipped;
                                }
                            }
                        }
                    }
                }
            }
        }

        let status = if cancelled {
            RunStatus::Cancelled
        } else if records
            .values()
            .all(|r| r.status == NodeStatus::Completed)
        {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };

        let report = RunReport::new(
            context.run_id().to_string(),
            status,
            records.into_iter().collect(),
        );
        RunFinished {
            run_id: report.run_id(),
            status: &status.to_string(),
            completed: report.count(NodeStatus::Completed),
            failed: report.count(NodeStatus::Failed),
            skipped: report.count(NodeStatus::Skipped),
            duration: started.elapsed(),
        }
        .log();
        Ok(report)
    }
}

/// Drive one node through fetch -> execute -> commit. Producer outputs come
/// from the per-run cache; everything else is a boundary fetch against the
/// catalog. The cache is write-once per dataset key.
async fn run_node(
    node: &dyn Node,
    catalog: &dyn CatalogGateway,
    store: &dyn PersistenceGateway,
    cache: &ResultCache,
    context: &ExecutionContext,
) -> Result<(), NodeError> {
    let started = Instant::now();

    let mut inputs = ResolvedInputs::with_capacity(node.input_datasets().len());
    for dataset in node.input_datasets() {
        let cached = { cache.lock().await.get(dataset).cloned() };
        let payload = match cached {
            Some(payload) => payload,
            None => catalog.fetch(dataset, context).await?,
        };
        inputs.insert(dataset.clone(), payload);
    }

    let result = node.execute(inputs, context).await?;
    store
        .commit(node.output_dataset(), result.clone(), context)
        .await?;

    let mut guard = cache.lock().await;
    guard
        .entry(node.output_dataset().to_string())
        .or_insert(result);
    drop(guard);

    NodeCompleted {
        node: node.name(),
        output_dataset: node.output_dataset(),
        duration: started.elapsed(),
    }
    .log();
    Ok(())
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::errors::BackendExecutionError;
use crate::payload::DatasetPayload;

/// Mapping from each declared input dataset to the payload the executor
/// resolved for it (producer cache hit or catalog fetch).
pub type ResolvedInputs = HashMap<String, DatasetPayload>;

/// The single polymorphic contract every backend variant implements.
///
/// The executor and resolver depend only on this trait: they read the
/// declared dataset identifiers to derive ordering and data flow, and call
/// `execute` without ever inspecting which concrete backend they hold.
/// Implementations are stateless between runs; backend capabilities (a
/// session provider, a process launcher, a transport) are held as immutable
/// shared handles injected at construction, and the run context arrives as
/// an execute-time argument.
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique name within a DAG.
    fn name(&self) -> &str;

    /// Dataset identifiers this node consumes, in declaration order.
    fn input_datasets(&self) -> &[String];

    /// Dataset identifier this node produces.
    fn output_dataset(&self) -> &str;

    /// Fixed backend discriminant, e.g. "dataframe" or "service-call".
    fn node_type(&self) -> &'static str;

    /// Run the backend against the resolved inputs. The returned payload is
    /// handed to the persistence gateway; the core never interprets it.
    async fn execute(
        &self,
        inputs: ResolvedInputs,
        context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError>;
}

impl fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("node_type", &self.node_type())
            .finish()
    }
}

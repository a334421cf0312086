// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stub nodes for tests and wiring experiments.

use async_trait::async_trait;

use crate::config::NodeDefinition;
use crate::context::ExecutionContext;
use crate::errors::BackendExecutionError;
use crate::payload::DatasetPayload;
use crate::traits::{Node, ResolvedInputs};

/// A node that succeeds with a fixed payload.
pub struct StubNode {
    name: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    payload: DatasetPayload,
}

impl StubNode {
    pub fn new(name: impl Into<String>, inputs: &[&str], output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_datasets: inputs.iter().map(|s| s.to_string()).collect(),
            output_dataset: output.into(),
            payload: DatasetPayload::Bytes(b"stub".to_vec()),
        }
    }

    /// A stub with no inputs (source node).
    pub fn source(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self::new(name, &[], output)
    }

    pub fn from_definition(def: &NodeDefinition) -> Self {
        Self {
            name: def.name().to_string(),
            input_datasets: def.input_datasets().to_vec(),
            output_dataset: def.output_dataset().to_string(),
            payload: DatasetPayload::Bytes(b"stub".to_vec()),
        }
    }

    pub fn with_payload(mut self, payload: DatasetPayload) -> Self {
        self.payload = payload;
        self
    }
}

#[async_trait]
impl Node for StubNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_datasets(&self) -> &[String] {
        &self.input_datasets
    }

    fn output_dataset(&self) -> &str {
        &self.output_dataset
    }

    fn node_type(&self) -> &'static str {
        "stub"
    }

    async fn execute(
        &self,
        _inputs: ResolvedInputs,
        _context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError> {
        Ok(self.payload.clone())
    }
}

/// A node that always fails, for exercising failure containment.
pub struct FailingNode {
    name: String,
    input_datasets: Vec<String>,
    output_dataset: String,
}

impl FailingNode {
    pub fn new(name: impl Into<String>, inputs: &[&str], output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_datasets: inputs.iter().map(|s| s.to_string()).collect(),
            output_dataset: output.into(),
        }
    }
}

#[async_trait]
impl Node for FailingNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_datasets(&self) -> &[String] {
        &self.input_datasets
    }

    fn output_dataset(&self) -> &str {
        &self.output_dataset
    }

    fn node_type(&self) -> &'static str {
        "failing"
    }

    async fn execute(
        &self,
        _inputs: ResolvedInputs,
        _context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError> {
        Err(BackendExecutionError::new(
            &self.name,
            self.node_type(),
            "simulated backend failure",
        ))
    }
}

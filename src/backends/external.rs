// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! External-process backend: delegate the node's work to a batch artifact
//! (typically a JAR) run by an injected launcher. The launcher reports the
//! artifact path of the produced dataset.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::backends::required_param;
use crate::config::NodeDefinition;
use crate::context::ExecutionContext;
use crate::errors::{BackendExecutionError, RegistryError};
use crate::payload::DatasetPayload;
use crate::traits::{Node, ResolvedInputs};

const NODE_TYPE: &str = "external-process";

pub type LaunchError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the launcher needs to start one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInvocation {
    pub artifact: String,
    pub args: Vec<String>,
    pub inputs: Vec<String>,
    pub output: String,
}

/// The process-invocation capability. Returns the path of the produced
/// output artifact.
#[async_trait]
pub trait BatchLauncher: Send + Sync {
    async fn launch(
        &self,
        invocation: &BatchInvocation,
        context: &ExecutionContext,
    ) -> Result<String, LaunchError>;
}

pub struct ExternalProcessNode {
    name: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    artifact: String,
    args: Vec<String>,
    launcher: Arc<dyn BatchLauncher>,
}

impl std::fmt::Debug for ExternalProcessNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalProcessNode")
            .field("name", &self.name)
            .field("input_datasets", &self.input_datasets)
            .field("output_dataset", &self.output_dataset)
            .field("artifact", &self.artifact)
            .field("args", &self.args)
            .finish()
    }
}

impl ExternalProcessNode {
    pub fn from_definition(
        def: &NodeDefinition,
        launcher: Arc<dyn BatchLauncher>,
    ) -> Result<Self, RegistryError> {
        let args = match def.param("args") {
            None => Vec::new(),
            Some(value) => value
                .as_sequence()
                .map(|seq| {
                    seq.iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect::<Option<Vec<String>>>()
                })
                .unwrap_or(None)
                .ok_or_else(|| RegistryError::InvalidParams {
                    node: def.name().to_string(),
                    reason: "param 'args' must be a list of strings".to_string(),
                })?,
        };
        Ok(Self {
            name: def.name().to_string(),
            input_datasets: def.input_datasets().to_vec(),
            output_dataset: def.output_dataset().to_string(),
            artifact: required_param(def, "artifact")?,
            args,
            launcher,
        })
    }
}

#[async_trait]
impl Node for ExternalProcessNode {
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
        NODE_TYPE
    }

    async fn execute(
        &self,
        _inputs: ResolvedInputs,
        context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError> {
        let invocation = BatchInvocation {
            artifact: self.artifact.clone(),
            args: self.args.clone(),
            inputs: self.input_datasets.clone(),
            output: self.output_dataset.clone(),
        };
        let path = self
            .launcher
            .launch(&invocation, context)
            .await
            .map_err(|e| BackendExecutionError::new(&self.name, NODE_TYPE, e.to_string()))?;
        Ok(DatasetPayload::Path(path))
    }
}

/// Launcher that never spawns a process: it records the invocation and
/// reports a deterministic output path. Used by tests and the demo binary.
pub struct DryRunLauncher {
    base_dir: String,
    launches: Mutex<Vec<BatchInvocation>>,
}

impl DryRunLauncher {
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            launches: Mutex::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> Vec<BatchInvocation> {
        self.launches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl BatchLauncher for DryRunLauncher {
    async fn launch(
        &self,
        invocation: &BatchInvocation,
        _context: &ExecutionContext,
    ) -> Result<String, LaunchError> {
        self.launches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        Ok(format!("{}/{}.parquet", self.base_dir, invocation.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context() -> ExecutionContext {
        ExecutionContext::new("test", "run-001", BTreeMap::new()).unwrap()
    }

    fn definition() -> NodeDefinition {
        NodeDefinition::builder("final_java_node", "external-process")
            .input("snow_result")
            .output("final_output")
            .params(
                serde_yaml::from_str("artifact: /opt/jobs/classify.jar\nargs: [--mode, strict]\n")
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn launches_and_returns_artifact_path() {
        let launcher = Arc::new(DryRunLauncher::new("/data/out"));
        let node = ExternalProcessNode::from_definition(&definition(), launcher.clone()).unwrap();

        let result = node
            .execute(ResolvedInputs::new(), &context())
            .await
            .unwrap();
        assert_eq!(result.as_path(), Some("/data/out/final_output.parquet"));

        let launches = launcher.launches();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].artifact, "/opt/jobs/classify.jar");
        assert_eq!(launches[0].args, vec!["--mode", "strict"]);
        assert_eq!(launches[0].inputs, vec!["snow_result"]);
        assert_eq!(launches[0].output, "final_output");
    }

    #[test]
    fn artifact_is_required() {
        let def = NodeDefinition::builder("final_java_node", "external-process")
            .input("snow_result")
            .output("final_output")
            .build()
            .unwrap();
        let err =
            ExternalProcessNode::from_definition(&def, Arc::new(DryRunLauncher::new("/tmp")))
                .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidParams { .. }));
    }

    #[test]
    fn args_must_be_strings() {
        let def = NodeDefinition::builder("final_java_node", "external-process")
            .input("snow_result")
            .output("final_output")
            .params(serde_yaml::from_str("artifact: /opt/jobs/a.jar\nargs: [1, 2]\n").unwrap())
            .build()
            .unwrap();
        let err =
            ExternalProcessNode::from_definition(&def, Arc::new(DryRunLauncher::new("/tmp")))
                .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidParams { .. }));
    }
}

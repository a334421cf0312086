// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative run configuration loaded from YAML.
//!
//! A run config names the execution context, optional executor options, and
//! the node set. `load_and_build` performs the full construct-and-validate
//! pipeline: parse, build definitions (eager per-node validation), construct
//! backends through the registry, and assemble the DAG (cross-node
//! validation).
//!
//! ```yaml
//! context:
//!   environment: prod
//!   run_id: run-001
//!   params:
//!     ruleset: R1
//! executor:
//!   max_concurrency: 4
//! nodes:
//!   - name: classify_cusip
//!     type: dataframe
//!     inputs: [cusip_list, product_category]
//!     output: classified_cusip
//!     params:
//!       join_key: cusip
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::{NodeDefinition, NodeRegistry};
use crate::context::{ExecutionContext, ParamValue};
use crate::errors::ConfigError;
use crate::graph::Dag;
use crate::traits::Node;

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub context: ContextConfig,
    #[serde(default)]
    pub executor: ExecutorOptions,
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ContextConfig {
    pub environment: String,
    pub run_id: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

/// Executor tuning knobs. All optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    pub output: String,
    #[serde(default)]
    pub params: serde_yaml::Mapping,
    /// Explicit opt-in for a node with no inputs (ingest-style root).
    #[serde(default)]
    pub source: bool,
}

impl NodeConfig {
    fn definition(&self) -> Result<NodeDefinition, ConfigError> {
        let mut builder = NodeDefinition::builder(&self.name, &self.node_type)
            .inputs(self.inputs.iter().cloned())
            .output(&self.output)
            .params(self.params.clone());
        if self.source {
            builder = builder.allow_source();
        }
        Ok(builder.build()?)
    }
}

impl RunConfig {
    pub fn build_context(&self) -> Result<ExecutionContext, ConfigError> {
        Ok(ExecutionContext::new(
            self.context.environment.clone(),
            self.context.run_id.clone(),
            self.context.params.clone(),
        )?)
    }

    /// Construct every configured node through the registry.
    pub fn build_nodes(&self, registry: &NodeRegistry) -> Result<Vec<Arc<dyn Node>>, ConfigError> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node_config in &self.nodes {
            let definition = node_config.definition()?;
            nodes.push(registry.create(&definition)?);
        }
        Ok(nodes)
    }
}

/// Parse a run config from YAML text.
pub fn parse_config(text: &str) -> Result<RunConfig, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Load a run config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load a config file and run the whole build pipeline: context, nodes, DAG.
pub fn load_and_build<P: AsRef<Path>>(
    path: P,
    registry: &NodeRegistry,
) -> Result<(Dag, ExecutionContext, ExecutorOptions), ConfigError> {
    let config = load_config(path)?;
    let context = config.build_context()?;
    let nodes = config.build_nodes(registry)?;
    let dag = Dag::new(nodes)?;
    Ok((dag, context, config.executor))
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validated node definitions built from declarative configuration.
//!
//! Every concrete backend is constructed from a `NodeDefinition`. The
//! builder runs all structural validation eagerly, so a malformed DAG fails
//! at build time and never reaches execution.

use serde_yaml::Mapping;

use crate::errors::ValidationError;

/// The declarative form of a node: name, backend type tag, declared
/// datasets, and an open map of backend-specific params the core never
/// interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefinition {
    name: String,
    node_type: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    params: Mapping,
}

impl NodeDefinition {
    pub fn builder(
        name: impl Into<String>,
        node_type: impl Into<String>,
    ) -> NodeDefinitionBuilder {
        NodeDefinitionBuilder {
            name: name.into(),
            node_type: node_type.into(),
            input_datasets: Vec::new(),
            output_dataset: String::new(),
            params: Mapping::new(),
            source: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn input_datasets(&self) -> &[String] {
        &self.input_datasets
    }

    pub fn output_dataset(&self) -> &str {
        &self.output_dataset
    }

    pub fn params(&self) -> &Mapping {
        &self.params
    }

    /// Look up a backend param by key.
    pub fn param(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.params
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Look up a backend param expected to be a string.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(|v| v.as_str())
    }
}

/// Construct-and-validate builder for `NodeDefinition`.
///
/// A node with no inputs is rejected unless `allow_source()` is called —
/// the sentinel empty input set is an explicit opt-in for ingest-style
/// roots, never a default.
pub struct NodeDefinitionBuilder {
    name: String,
    node_type: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    params: Mapping,
    source: bool,
}

impl NodeDefinitionBuilder {
    pub fn input(mut self, dataset: impl Into<String>) -> Self {
        self.input_datasets.push(dataset.into());
        self
    }

    pub fn inputs<I, S>(mut self, datasets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_datasets
            .extend(datasets.into_iter().map(Into::into));
        self
    }

    pub fn output(mut self, dataset: impl Into<String>) -> Self {
        self.output_dataset = dataset.into();
        self
    }

    pub fn params(mut self, params: Mapping) -> Self {
        self.params = params;
        self
    }

    /// Permit an empty input set (source node).
    pub fn allow_source(mut self) -> Self {
        self.source = true;
        self
    }

    pub fn build(self) -> Result<NodeDefinition, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.output_dataset.trim().is_empty() {
            return Err(ValidationError::EmptyOutputDataset { node: self.name });
        }
        if self.input_datasets.is_empty() && !self.source {
            return Err(ValidationError::NoInputDatasets { node: self.name });
        }
        for (i, dataset) in self.input_datasets.iter().enumerate() {
            if self.input_datasets[..i].contains(dataset) {
                return Err(ValidationError::DuplicateInputDataset {
                    node: self.name,
                    dataset: dataset.clone(),
                });
            }
        }
        if self.input_datasets.contains(&self.output_dataset) {
            return Err(ValidationError::OutputIsInput {
                node: self.name,
                dataset: self.output_dataset,
            });
        }
        Ok(NodeDefinition {
            name: self.name,
            node_type: self.node_type,
            input_datasets: self.input_datasets,
            output_dataset: self.output_dataset,
            params: self.params,
        })
    }
}

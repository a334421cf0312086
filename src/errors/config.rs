// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while constructing node definitions and loading configs.

use thiserror::Error;

/// A malformed node definition or context. Surfaced at construction time so
/// an invalid DAG never reaches execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Node name is empty or whitespace
    #[error("node name must not be empty or whitespace")]
    EmptyName,

    /// Node declares no input datasets and was not built as a source node
    #[error("node '{node}' declares no input datasets")]
    NoInputDatasets { node: String },

    /// Node declares no output dataset
    #[error("node '{node}' declares an empty output dataset")]
    EmptyOutputDataset { node: String },

    /// Node lists the same input dataset twice
    #[error("node '{node}' declares input dataset '{dataset}' more than once")]
    DuplicateInputDataset { node: String, dataset: String },

    /// Node consumes its own output
    #[error("node '{node}' consumes its own output dataset '{dataset}'")]
    OutputIsInput { node: String, dataset: String },

    /// Two nodes in one DAG share a name
    #[error("duplicate node name '{name}'")]
    DuplicateNodeName { name: String },

    /// Two nodes in one DAG produce the same dataset, making dataset-name
    /// linkage ambiguous
    #[error("nodes '{first}' and '{second}' both produce dataset '{dataset}'")]
    DuplicateOutputDataset {
        first: String,
        second: String,
        dataset: String,
    },

    /// Execution context has an empty environment name
    #[error("execution context environment must not be empty")]
    EmptyEnvironment,

    /// Execution context has an empty run id
    #[error("execution context run_id must not be empty")]
    EmptyRunId,
}

/// Errors raised while loading and building a declarative run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] crate::errors::RegistryError),
}

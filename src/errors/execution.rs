// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while executing a resolved DAG.

use thiserror::Error;

use crate::errors::{CatalogError, PersistenceError, ResolveError};

/// A backend's own execute failed. The core does not retry; the node is
/// marked failed and its downstream closure is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("backend '{backend}' failed in node '{node}': {message}")]
pub struct BackendExecutionError {
    pub node: String,
    pub backend: String,
    pub message: String,
}

impl BackendExecutionError {
    pub fn new(
        node: impl Into<String>,
        backend: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            node: node.into(),
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// The error recorded on a node's terminal record: whichever stage of the
/// fetch -> execute -> commit sequence failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Backend(#[from] BackendExecutionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Run-fatal executor errors. Per-node runtime failures are *not* fatal and
/// surface in the run report instead.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("internal executor error: {message}")]
    Internal { message: String },
}

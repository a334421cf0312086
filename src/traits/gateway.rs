// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::errors::{CatalogError, PersistenceError};
use crate::payload::DatasetPayload;

/// Resolves a dataset identifier to fetchable input data. External service;
/// the core issues at most one fetch per dataset per run.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn fetch(
        &self,
        dataset_id: &str,
        context: &ExecutionContext,
    ) -> Result<DatasetPayload, CatalogError>;
}

/// Commits a node's output under its declared output dataset identifier.
/// External service; called once per dataset per run, and only after the
/// producing node's execute returned successfully.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn commit(
        &self,
        dataset_id: &str,
        payload: DatasetPayload,
        context: &ExecutionContext,
    ) -> Result<(), PersistenceError>;
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory catalog and persistence gateways.
//!
//! Stand-ins for the external metadata service and storage sink, used by
//! tests and the demo binary. `MemoryStore` also enforces the commit-once
//! contract so tests catch an executor that re-issues completed calls.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::errors::{CatalogError, PersistenceError};
use crate::payload::DatasetPayload;
use crate::traits::{CatalogGateway, PersistenceGateway};

pub struct MemoryCatalog {
    datasets: Mutex<HashMap<String, DatasetPayload>>,
    fetches: Mutex<Vec<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            datasets: Mutex::new(HashMap::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Make a dataset fetchable.
    pub fn seed(&self, dataset_id: impl Into<String>, payload: DatasetPayload) {
        self.datasets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dataset_id.into(), payload);
    }

    /// Dataset ids fetched so far, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogGateway for MemoryCatalog {
    async fn fetch(
        &self,
        dataset_id: &str,
        _context: &ExecutionContext,
    ) -> Result<DatasetPayload, CatalogError> {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dataset_id.to_string());
        self.datasets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| CatalogError::DatasetNotFound {
                dataset: dataset_id.to_string(),
            })
    }
}

pub struct MemoryStore {
    committed: Mutex<HashMap<String, DatasetPayload>>,
    commits: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            committed: Mutex::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
        }
    }

    pub fn committed(&self, dataset_id: &str) -> Option<DatasetPayload> {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dataset_id)
            .cloned()
    }

    /// Dataset ids committed so far, in call order.
    pub fn commits(&self) -> Vec<String> {
        self.commits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryStore {
    async fn commit(
        &self,
        dataset_id: &str,
        payload: DatasetPayload,
        _context: &ExecutionContext,
    ) -> Result<(), PersistenceError> {
        let mut committed = self
            .committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if committed.contains_key(dataset_id) {
            return Err(PersistenceError {
                dataset: dataset_id.to_string(),
                reason: "dataset already committed in this run".to_string(),
            });
        }
        committed.insert(dataset_id.to_string(), payload);
        self.commits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dataset_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context() -> ExecutionContext {
        ExecutionContext::new("test", "run-001", BTreeMap::new()).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_seeded_payload() {
        let catalog = MemoryCatalog::new();
        catalog.seed("cusip_list", DatasetPayload::Bytes(b"rows".to_vec()));

        let payload = catalog.fetch("cusip_list", &context()).await.unwrap();
        assert_eq!(payload, DatasetPayload::Bytes(b"rows".to_vec()));
        assert_eq!(catalog.fetched(), vec!["cusip_list"]);
    }

    #[tokio::test]
    async fn fetch_of_unknown_dataset_fails() {
        let catalog = MemoryCatalog::new();
        let err = catalog.fetch("missing", &context()).await.unwrap_err();
        assert_eq!(
            err,
            CatalogError::DatasetNotFound {
                dataset: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn double_commit_is_rejected() {
        let store = MemoryStore::new();
        let payload = DatasetPayload::Bytes(b"out".to_vec());

        store.commit("d1", payload.clone(), &context()).await.unwrap();
        let err = store.commit("d1", payload, &context()).await.unwrap_err();
        assert!(err.reason.contains("already committed"));
        assert_eq!(store.commits(), vec!["d1"]);
    }
}

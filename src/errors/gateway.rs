// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors crossing the catalog and persistence gateway boundaries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("dataset '{dataset}' not found in catalog")]
    DatasetNotFound { dataset: String },

    #[error("catalog unavailable: {reason}")]
    Unavailable { reason: String },
}

/// A computed result could not be durably committed. The producing node is
/// treated as failed; an unpersisted result is not a completed node.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to persist dataset '{dataset}': {reason}")]
pub struct PersistenceError {
    pub dataset: String,
    pub reason: String,
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for node registry lookups and backend construction.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// Configuration references a type tag no constructor was registered for
    #[error("unknown node type '{node_type}' for node '{node}'")]
    UnknownNodeType { node: String, node_type: String },

    /// A constructor rejected the definition's backend params
    #[error("invalid params for node '{node}': {reason}")]
    InvalidParams { node: String, reason: String },
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod gateway;
mod graph;
mod registry;

pub use config::{ConfigError, ValidationError};
pub use execution::{BackendExecutionError, ExecutionError, NodeError};
pub use gateway::{CatalogError, PersistenceError};
pub use graph::ResolveError;
pub use registry::RegistryError;

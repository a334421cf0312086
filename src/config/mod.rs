// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod definition;
mod loader;
mod registry;

pub use definition::{NodeDefinition, NodeDefinitionBuilder};
pub use loader::{
    load_and_build, load_config, parse_config, ContextConfig, ExecutorOptions, NodeConfig,
    RunConfig,
};
pub use registry::{NodeConstructor, NodeRegistry};

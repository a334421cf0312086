// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod gateway;
pub mod node;

pub use gateway::{CatalogGateway, PersistenceGateway};
pub use node::{Node, ResolvedInputs};

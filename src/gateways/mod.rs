// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod memory;

pub use memory::{MemoryCatalog, MemoryStore};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the dependency resolver.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The derived producer->consumer relation contains a cycle. `members`
    /// is the cycle path, closed on the first node, e.g. `[a, b, c, a]`.
    #[error("cyclic dependency between nodes: {}", .members.join(" -> "))]
    CyclicDependency { members: Vec<String> },
}

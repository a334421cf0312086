// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod export;
mod resolver;

pub use export::{edges, to_dot};
pub use resolver::{resolve, Dag, DagPlan};

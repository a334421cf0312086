// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Terminal accounting for one run: per-node records plus overall status.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::NodeError;

/// Per-node state machine: `Pending -> Running -> {Completed, Failed,
/// Skipped}`. `Skipped` is terminal and distinct from `Failed`: the node
/// never executed because an upstream producer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Running => "running",
            NodeStatus::Completed => "completed",
            NodeStatus::Failed => "failed",
            NodeStatus::Skipped => "skipped",
        };
        write!(f, "{}", text)
    }
}

/// One node's terminal record. `error` is set iff the node failed.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub status: NodeStatus,
    pub error: Option<NodeError>,
}

impl NodeRecord {
    pub(crate) fn pending() -> Self {
        Self {
            status: NodeStatus::Pending,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every node completed.
    Completed,
    /// At least one node failed or was skipped.
    Failed,
    /// Cancellation stopped scheduling; records hold last known states.
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug)]
pub struct RunReport {
    run_id: String,
    status: RunStatus,
    nodes: BTreeMap<String, NodeRecord>,
}

impl RunReport {
    pub(crate) fn new(
        run_id: String,
        status: RunStatus,
        nodes: BTreeMap<String, NodeRecord>,
    ) -> Self {
        Self {
            run_id,
            status,
            nodes,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> &BTreeMap<String, NodeRecord> {
        &self.nodes
    }

    pub fn count(&self, status: NodeStatus) -> usize {
        self.nodes.values().filter(|r| r.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_status() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "a".to_string(),
            NodeRecord {
                status: NodeStatus::Completed,
                error: None,
            },
        );
        nodes.insert(
            "b".to_string(),
            NodeRecord {
                status: NodeStatus::Skipped,
                error: None,
            },
        );
        let report = RunReport::new("run-1".to_string(), RunStatus::Failed, nodes);

        assert_eq!(report.count(NodeStatus::Completed), 1);
        assert_eq!(report.count(NodeStatus::Skipped), 1);
        assert_eq!(report.count(NodeStatus::Failed), 0);
        assert!(!report.is_success());
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-node execution events.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Node execution started.
pub struct NodeExecutionStarted<'a> {
    pub node: &'a str,
    pub node_type: &'a str,
    pub input_count: usize,
}

impl Display for NodeExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' ({}) started: {} inputs",
            self.node, self.node_type, self.input_count
        )
    }
}

impl StructuredLog for NodeExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            node_type = self.node_type,
            input_count = self.input_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_execution",
            span_name = name,
            node = self.node,
            node_type = self.node_type,
        )
    }
}

/// Node executed and its output was committed.
pub struct NodeCompleted<'a> {
    pub node: &'a str,
    pub output_dataset: &'a str,
    pub duration: std::time::Duration,
}

impl Display for NodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' completed: committed '{}' in {:?}",
            self.node, self.output_dataset, self.duration
        )
    }
}

impl StructuredLog for NodeCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            output_dataset = self.output_dataset,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_completed",
            span_name = name,
            node = self.node,
        )
    }
}

/// Node failed during fetch, execute, or commit.
pub struct NodeFailed<'a> {
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' failed: {}", self.node, self.error)
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            node = self.node,
        )
    }
}

/// Node skipped because an upstream producer failed.
pub struct NodeSkipped<'a> {
    pub node: &'a str,
    pub failed_upstream: &'a str,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' skipped: upstream '{}' failed",
            self.node, self.failed_upstream
        )
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            node = self.node,
            failed_upstream = self.failed_upstream,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "node_skipped",
            span_name = name,
            node = self.node,
        )
    }
}

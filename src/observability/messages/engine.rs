// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for run lifecycle events.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Run started with a resolved plan.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunStarted<'a> {
    pub run_id: &'a str,
    pub node_count: usize,
    pub wave_count: usize,
    pub max_concurrency: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting run '{}': {} nodes in {} waves, max_concurrency={}",
            self.run_id, self.node_count, self.wave_count, self.max_concurrency
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = self.run_id,
            node_count = self.node_count,
            wave_count = self.wave_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            run_id = self.run_id,
            node_count = self.node_count,
        )
    }
}

/// Run reached a terminal state.
pub struct RunFinished<'a> {
    pub run_id: &'a str,
    pub status: &'a str,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: std::time::Duration,
}

impl Display for RunFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run '{}' {}: {} completed, {} failed, {} skipped in {:?}",
            self.run_id, self.status, self.completed, self.failed, self.skipped, self.duration
        )
    }
}

impl StructuredLog for RunFinished<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = self.run_id,
            status = self.status,
            completed = self.completed,
            failed = self.failed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_finished",
            span_name = name,
            run_id = self.run_id,
            status = self.status,
        )
    }
}

/// Cancellation observed; no further waves will be scheduled.
pub struct RunCancelled<'a> {
    pub run_id: &'a str,
    pub pending: usize,
}

impl Display for RunCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run '{}' cancelled: {} nodes left pending",
            self.run_id, self.pending
        )
    }
}

impl StructuredLog for RunCancelled<'_> {
    fn log(&self) {
        tracing::warn!(
            run_id = self.run_id,
            pending = self.pending,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "run_cancelled",
            span_name = name,
            run_id = self.run_id,
        )
    }
}

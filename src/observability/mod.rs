// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with a `Display`
//! implementation plus the `StructuredLog` trait, keeping log text out of
//! the engine code and the field names consistent across the crate.
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - run lifecycle events
//! * `messages::node` - per-node execution events

pub mod messages;

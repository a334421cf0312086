// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete node backends.
//!
//! Each variant implements the one `Node` contract; nothing outside this
//! module knows which variant it holds. Backend runtimes themselves (a
//! remote compute service, a batch process host, an HTTP service) are
//! external collaborators reached through the capability traits defined
//! alongside each variant.

pub mod dataframe;
pub mod external;
pub mod remote_session;
pub mod service;
pub mod stub;

use std::sync::Arc;

pub use dataframe::DataFrameNode;
pub use external::{BatchInvocation, BatchLauncher, DryRunLauncher, ExternalProcessNode};
pub use remote_session::{
    EchoSessionProvider, RemoteSession, RemoteSessionNode, RemoteSessionProvider,
};
pub use service::{LoopbackTransport, ServiceCallNode, ServiceTransport};
pub use stub::{FailingNode, StubNode};

use crate::config::NodeDefinition;
use crate::errors::RegistryError;

/// Capability handles the built-in backends need. Captured by registry
/// constructors; nodes hold them as immutable shared references and acquire
/// live sessions only inside `execute`.
#[derive(Clone)]
pub struct BackendServices {
    pub sessions: Arc<dyn RemoteSessionProvider>,
    pub launcher: Arc<dyn BatchLauncher>,
    pub transport: Arc<dyn ServiceTransport>,
}

impl BackendServices {
    /// In-process stand-ins for every capability: loopback transport,
    /// dry-run launcher, echo session provider. Used by tests and the demo
    /// binary; production embedders supply their own handles.
    pub fn in_process() -> Self {
        Self {
            sessions: Arc::new(EchoSessionProvider::new()),
            launcher: Arc::new(DryRunLauncher::new("/tmp/dagrun")),
            transport: Arc::new(LoopbackTransport::new()),
        }
    }
}

pub(crate) fn required_param(def: &NodeDefinition, key: &str) -> Result<String, RegistryError> {
    def.param_str(key)
        .map(str::to_string)
        .ok_or_else(|| RegistryError::InvalidParams {
            node: def.name().to_string(),
            reason: format!("missing required param '{}'", key),
        })
}

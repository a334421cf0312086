// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote-session backend: submit a statement to a managed query session.
//!
//! The session itself is an external collaborator. Nodes hold only an
//! immutable provider handle; a live session is acquired inside `execute`
//! and never stored, so nodes stay stateless and reusable across runs.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backends::required_param;
use crate::config::NodeDefinition;
use crate::context::ExecutionContext;
use crate::errors::{BackendExecutionError, RegistryError};
use crate::payload::DatasetPayload;
use crate::traits::{Node, ResolvedInputs};

const NODE_TYPE: &str = "remote-session";

pub type SessionError = Box<dyn std::error::Error + Send + Sync>;

/// A live managed session accepting statements.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    async fn submit(&self, statement: &str) -> Result<Value, SessionError>;
}

/// Acquires sessions for the run environment.
#[async_trait]
pub trait RemoteSessionProvider: Send + Sync {
    async fn acquire(
        &self,
        context: &ExecutionContext,
    ) -> Result<Arc<dyn RemoteSession>, SessionError>;
}

pub struct RemoteSessionNode {
    name: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    statement: String,
    provider: Arc<dyn RemoteSessionProvider>,
}

impl std::fmt::Debug for RemoteSessionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSessionNode")
            .field("name", &self.name)
            .field("input_datasets", &self.input_datasets)
            .field("output_dataset", &self.output_dataset)
            .field("statement", &self.statement)
            .finish()
    }
}

impl RemoteSessionNode {
    pub fn from_definition(
        def: &NodeDefinition,
        provider: Arc<dyn RemoteSessionProvider>,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            name: def.name().to_string(),
            input_datasets: def.input_datasets().to_vec(),
            output_dataset: def.output_dataset().to_string(),
            statement: required_param(def, "statement")?,
            provider,
        })
    }
}

#[async_trait]
impl Node for RemoteSessionNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_datasets(&self) -> &[String] {
        &self.input_datasets
    }

    fn output_dataset(&self) -> &str {
        &self.output_dataset
    }

    fn node_type(&self) -> &'static str {
        NODE_TYPE
    }

    async fn execute(
        &self,
        _inputs: ResolvedInputs,
        context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError> {
        let session = self
            .provider
            .acquire(context)
            .await
            .map_err(|e| BackendExecutionError::new(&self.name, NODE_TYPE, e.to_string()))?;
        let result = session
            .submit(&self.statement)
            .await
            .map_err(|e| BackendExecutionError::new(&self.name, NODE_TYPE, e.to_string()))?;
        Ok(DatasetPayload::Json(result))
    }
}

/// In-process provider handing out a shared session that acknowledges every
/// statement and records it. Used by tests and the demo binary.
pub struct EchoSessionProvider {
    session: Arc<EchoSession>,
}

impl EchoSessionProvider {
    pub fn new() -> Self {
        Self {
            session: Arc::new(EchoSession {
                statements: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn session(&self) -> &Arc<EchoSession> {
        &self.session
    }
}

impl Default for EchoSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteSessionProvider for EchoSessionProvider {
    async fn acquire(
        &self,
        _context: &ExecutionContext,
    ) -> Result<Arc<dyn RemoteSession>, SessionError> {
        Ok(self.session.clone() as Arc<dyn RemoteSession>)
    }
}

pub struct EchoSession {
    statements: Mutex<Vec<String>>,
}

impl EchoSession {
    pub fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RemoteSession for EchoSession {
    async fn submit(&self, statement: &str) -> Result<Value, SessionError> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(statement.to_string());
        Ok(json!({"status": "submitted", "statement": statement}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context() -> ExecutionContext {
        ExecutionContext::new("prod", "run-001", BTreeMap::new()).unwrap()
    }

    fn definition() -> NodeDefinition {
        NodeDefinition::builder("snowpark_processing", "remote-session")
            .inputs(["service_result", "external_table"])
            .output("snow_result")
            .params(
                serde_yaml::from_str(
                    "statement: select cusip, product, classification from service_result\n",
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn submits_statement_through_acquired_session() {
        let provider = Arc::new(EchoSessionProvider::new());
        let node = RemoteSessionNode::from_definition(&definition(), provider.clone()).unwrap();

        let result = node
            .execute(ResolvedInputs::new(), &context())
            .await
            .unwrap();
        let response = result.as_json().unwrap();
        assert_eq!(response["status"], json!("submitted"));
        assert_eq!(
            provider.session().statements(),
            vec!["select cusip, product, classification from service_result"]
        );
    }

    #[test]
    fn statement_is_required() {
        let def = NodeDefinition::builder("snowpark_processing", "remote-session")
            .input("service_result")
            .output("snow_result")
            .build()
            .unwrap();
        let err =
            RemoteSessionNode::from_definition(&def, Arc::new(EchoSessionProvider::new()))
                .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidParams { .. }));
    }

    #[tokio::test]
    async fn provider_failure_becomes_backend_error() {
        struct OfflineProvider;

        #[async_trait]
        impl RemoteSessionProvider for OfflineProvider {
            async fn acquire(
                &self,
                _context: &ExecutionContext,
            ) -> Result<Arc<dyn RemoteSession>, SessionError> {
                Err("warehouse suspended".into())
            }
        }

        let node =
            RemoteSessionNode::from_definition(&definition(), Arc::new(OfflineProvider)).unwrap();
        let err = node
            .execute(ResolvedInputs::new(), &context())
            .await
            .unwrap_err();
        assert!(err.message.contains("warehouse suspended"));
    }
}

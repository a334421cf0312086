// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Service-call backend: hand the node's dataset wiring and params to an
//! external HTTP service through an injected transport.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backends::required_param;
use crate::config::NodeDefinition;
use crate::context::ExecutionContext;
use crate::errors::{BackendExecutionError, RegistryError};
use crate::payload::DatasetPayload;
use crate::traits::{Node, ResolvedInputs};

const NODE_TYPE: &str = "service-call";

pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// The HTTP capability the service backend calls through. The transport is
/// an external collaborator; the core never constructs HTTP clients itself.
#[async_trait]
pub trait ServiceTransport: Send + Sync {
    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

pub struct ServiceCallNode {
    name: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    url: String,
    request_params: Value,
    transport: Arc<dyn ServiceTransport>,
}

impl std::fmt::Debug for ServiceCallNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCallNode")
            .field("name", &self.name)
            .field("input_datasets", &self.input_datasets)
            .field("output_dataset", &self.output_dataset)
            .field("url", &self.url)
            .field("request_params", &self.request_params)
            .finish()
    }
}

impl ServiceCallNode {
    pub fn from_definition(
        def: &NodeDefinition,
        transport: Arc<dyn ServiceTransport>,
    ) -> Result<Self, RegistryError> {
        let request_params =
            serde_json::to_value(def.params()).map_err(|e| RegistryError::InvalidParams {
                node: def.name().to_string(),
                reason: format!("params are not JSON-representable: {}", e),
            })?;
        Ok(Self {
            name: def.name().to_string(),
            input_datasets: def.input_datasets().to_vec(),
            output_dataset: def.output_dataset().to_string(),
            url: required_param(def, "url")?,
            request_params,
            transport,
        })
    }
}

#[async_trait]
impl Node for ServiceCallNode {
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
        _context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError> {
        let body = json!({
            "inputs": self.input_datasets,
            "output": self.output_dataset,
            "params": self.request_params,
        });
        let response = self
            .transport
            .post(&self.url, &body)
            .await
            .map_err(|e| BackendExecutionError::new(&self.name, NODE_TYPE, e.to_string()))?;
        Ok(DatasetPayload::Json(response))
    }
}

/// In-process transport that acknowledges every call and records it for
/// inspection. Used by tests and the demo binary.
pub struct LoopbackTransport {
    calls: Mutex<Vec<(String, Value)>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceTransport for LoopbackTransport {
    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), body.clone()));
        Ok(json!({"status": "processed"}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context() -> ExecutionContext {
        ExecutionContext::new("test", "run-001", BTreeMap::new()).unwrap()
    }

    fn definition() -> NodeDefinition {
        NodeDefinition::builder("call_cusip_service", "service-call")
            .input("classified_cusip")
            .output("service_result")
            .params(
                serde_yaml::from_str("url: https://svc.internal/classify\nruleset: R1\n").unwrap(),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn posts_dataset_wiring_and_params() {
        let transport = Arc::new(LoopbackTransport::new());
        let node = ServiceCallNode::from_definition(&definition(), transport.clone()).unwrap();

        let result = node
            .execute(ResolvedInputs::new(), &context())
            .await
            .unwrap();
        assert_eq!(result.as_json(), Some(&json!({"status": "processed"})));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (url, body) = &calls[0];
        assert_eq!(url, "https://svc.internal/classify");
        assert_eq!(body["inputs"], json!(["classified_cusip"]));
        assert_eq!(body["output"], json!("service_result"));
        assert_eq!(body["params"]["ruleset"], json!("R1"));
    }

    #[test]
    fn url_is_required() {
        let def = NodeDefinition::builder("call_cusip_service", "service-call")
            .input("classified_cusip")
            .output("service_result")
            .build()
            .unwrap();
        let err =
            ServiceCallNode::from_definition(&def, Arc::new(LoopbackTransport::new())).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidParams { .. }));
    }

    #[tokio::test]
    async fn transport_failure_becomes_backend_error() {
        struct DownTransport;

        #[async_trait]
        impl ServiceTransport for DownTransport {
            async fn post(&self, _url: &str, _body: &Value) -> Result<Value, TransportError> {
                Err("connection refused".into())
            }
        }

        let node = ServiceCallNode::from_definition(&definition(), Arc::new(DownTransport)).unwrap();
        let err = node
            .execute(ResolvedInputs::new(), &context())
            .await
            .unwrap_err();
        assert_eq!(err.backend, "service-call");
        assert!(err.message.contains("connection refused"));
    }
}

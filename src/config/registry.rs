// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Explicit registration table mapping node type tags to constructors.
//!
//! The registry is the only place configuration meets concrete backend
//! types: `create` selects a constructor once, at DAG-build time, and from
//! then on the rest of the system holds `Arc<dyn Node>`. New backends are
//! added by registering another tag; the executor and resolver are never
//! touched.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::{
    BackendServices, DataFrameNode, ExternalProcessNode, RemoteSessionNode, ServiceCallNode,
};
use crate::config::NodeDefinition;
use crate::errors::RegistryError;
use crate::traits::Node;

/// Constructor closure for one backend type. Capability handles (session
/// providers, launchers, transports) are captured here at registration, so
/// nodes stay free of mutable service state.
pub type NodeConstructor =
    Arc<dyn Fn(&NodeDefinition) -> Result<Arc<dyn Node>, RegistryError> + Send + Sync>;

pub struct NodeRegistry {
    constructors: HashMap<String, NodeConstructor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry pre-populated with the four built-in backend tags, wired to
    /// the given capability bundle.
    pub fn with_default_backends(services: BackendServices) -> Self {
        let mut registry = Self::new();

        registry.register("dataframe", |def| {
            Ok(Arc::new(DataFrameNode::from_definition(def)?) as Arc<dyn Node>)
        });

        let sessions = services.sessions.clone();
        registry.register("remote-session", move |def| {
            Ok(Arc::new(RemoteSessionNode::from_definition(def, sessions.clone())?)
                as Arc<dyn Node>)
        });

        let launcher = services.launcher.clone();
        registry.register("external-process", move |def| {
            Ok(Arc::new(ExternalProcessNode::from_definition(def, launcher.clone())?)
                as Arc<dyn Node>)
        });

        let transport = services.transport.clone();
        registry.register("service-call", move |def| {
            Ok(Arc::new(ServiceCallNode::from_definition(def, transport.clone())?)
                as Arc<dyn Node>)
        });

        registry
    }

    pub fn register<F>(&mut self, type_tag: impl Into<String>, constructor: F)
    where
        F: Fn(&NodeDefinition) -> Result<Arc<dyn Node>, RegistryError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(type_tag.into(), Arc::new(constructor));
    }

    /// Construct the concrete node for a definition's type tag.
    pub fn create(&self, definition: &NodeDefinition) -> Result<Arc<dyn Node>, RegistryError> {
        let constructor = self.constructors.get(definition.node_type()).ok_or_else(|| {
            RegistryError::UnknownNodeType {
                node: definition.name().to_string(),
                node_type: definition.node_type().to_string(),
            }
        })?;
        constructor(definition)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }

    /// Registered tags, sorted for stable output.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StubNode;

    fn stub_constructor(def: &NodeDefinition) -> Result<Arc<dyn Node>, RegistryError> {
        Ok(Arc::new(StubNode::from_definition(def)) as Arc<dyn Node>)
    }

    #[test]
    fn creates_registered_type() {
        let mut registry = NodeRegistry::new();
        registry.register("stub", stub_constructor);

        let def = NodeDefinition::builder("n1", "stub")
            .input("a")
            .output("b")
            .build()
            .unwrap();
        let node = registry.create(&def).unwrap();
        assert_eq!(node.name(), "n1");
        assert_eq!(node.node_type(), "stub");
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = NodeRegistry::new();
        let def = NodeDefinition::builder("n1", "snowpark")
            .input("a")
            .output("b")
            .build()
            .unwrap();

        let err = registry.create(&def).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownNodeType {
                node: "n1".to_string(),
                node_type: "snowpark".to_string()
            }
        );
    }

    #[test]
    fn default_backends_cover_all_four_tags() {
        let registry = NodeRegistry::with_default_backends(BackendServices::in_process());
        assert_eq!(
            registry.registered_types(),
            vec![
                "dataframe",
                "external-process",
                "remote-session",
                "service-call"
            ]
        );
    }

    #[test]
    fn default_backends_construct_each_variant() {
        let registry = NodeRegistry::with_default_backends(BackendServices::in_process());

        let dataframe = NodeDefinition::builder("df", "dataframe")
            .inputs(["left", "right"])
            .output("joined")
            .params(
                serde_yaml::from_str(
                    "join_key: cusip\nmatch_column: product_category\nmatch_value: Equity\n",
                )
                .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(registry.create(&dataframe).unwrap().node_type(), "dataframe");

        let service = NodeDefinition::builder("svc", "service-call")
            .input("joined")
            .output("service_result")
            .params(serde_yaml::from_str("url: https://svc.internal/classify\n").unwrap())
            .build()
            .unwrap();
        assert_eq!(
            registry.create(&service).unwrap().node_type(),
            "service-call"
        );

        let remote = NodeDefinition::builder("remote", "remote-session")
            .input("service_result")
            .output("remote_result")
            .params(
                serde_yaml::from_str("statement: select * from service_result\n").unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(
            registry.create(&remote).unwrap().node_type(),
            "remote-session"
        );

        let external = NodeDefinition::builder("jar", "external-process")
            .input("remote_result")
            .output("final_output")
            .params(serde_yaml::from_str("artifact: /opt/jobs/classify.jar\n").unwrap())
            .build()
            .unwrap();
        assert_eq!(
            registry.create(&external).unwrap().node_type(),
            "external-process"
        );
    }
}

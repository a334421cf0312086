// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Immutable run environment shared by every node in a run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Scalar run parameter. Untagged so YAML/JSON scalars map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Immutable description of the run environment: environment name, opaque
/// run identifier, and run-scoped scalar parameters.
///
/// Constructed once per run, validated eagerly, and shared read-only (via
/// `Arc`) across all nodes. Nodes receive it as an execute-time argument and
/// never store it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    environment: String,
    run_id: String,
    params: BTreeMap<String, ParamValue>,
}

impl ExecutionContext {
    /// Build a context, rejecting empty/whitespace environment or run id.
    pub fn new(
        environment: impl Into<String>,
        run_id: impl Into<String>,
        params: BTreeMap<String, ParamValue>,
    ) -> Result<Self, ValidationError> {
        let environment = environment.into();
        let run_id = run_id.into();
        if environment.trim().is_empty() {
            return Err(ValidationError::EmptyEnvironment);
        }
        if run_id.trim().is_empty() {
            return Err(ValidationError::EmptyRunId);
        }
        Ok(Self {
            environment,
            run_id,
            params,
        })
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_params() {
        let mut params = BTreeMap::new();
        params.insert("ruleset".to_string(), ParamValue::Str("R1".to_string()));
        params.insert("batch_size".to_string(), ParamValue::Int(500));

        let ctx = ExecutionContext::new("prod", "run-001", params).unwrap();
        assert_eq!(ctx.environment(), "prod");
        assert_eq!(ctx.run_id(), "run-001");
        assert_eq!(ctx.param("batch_size"), Some(&ParamValue::Int(500)));
        assert!(ctx.param("missing").is_none());
    }

    #[test]
    fn rejects_blank_environment() {
        let err = ExecutionContext::new("  ", "run-001", BTreeMap::new()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyEnvironment);
    }

    #[test]
    fn rejects_blank_run_id() {
        let err = ExecutionContext::new("test", "", BTreeMap::new()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyRunId);
    }

    #[test]
    fn param_values_deserialize_from_yaml_scalars() {
        let params: BTreeMap<String, ParamValue> =
            serde_yaml::from_str("ruleset: R1\nthreshold: 0.75\nretries: 3\ndry_run: true\n")
                .unwrap();
        assert_eq!(params["ruleset"], ParamValue::Str("R1".to_string()));
        assert_eq!(params["threshold"], ParamValue::Float(0.75));
        assert_eq!(params["retries"], ParamValue::Int(3));
        assert_eq!(params["dry_run"], ParamValue::Bool(true));
    }
}

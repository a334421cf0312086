// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process dataframe backend: left-join two tables and derive a
//! classification column from a match rule.
//!
//! The join rule comes from backend params: `join_key` names the column to
//! join on, `match_column`/`match_value` drive the classification, and the
//! optional `match_label`/`fallback_label`/`output_column` control the
//! derived column. Both inputs must resolve to table payloads.

use async_trait::async_trait;
use serde_json::Value;

use crate::backends::required_param;
use crate::config::NodeDefinition;
use crate::context::ExecutionContext;
use crate::errors::{BackendExecutionError, RegistryError};
use crate::payload::{DatasetPayload, Row, Table};
use crate::traits::{Node, ResolvedInputs};

const NODE_TYPE: &str = "dataframe";

const DEFAULT_MATCH_LABEL: &str = "High Risk";
const DEFAULT_FALLBACK_LABEL: &str = "Low Risk";
const DEFAULT_OUTPUT_COLUMN: &str = "classification";

#[derive(Debug)]
pub struct DataFrameNode {
    name: String,
    input_datasets: Vec<String>,
    output_dataset: String,
    join_key: String,
    match_column: String,
    match_value: String,
    match_label: String,
    fallback_label: String,
    output_column: String,
}

impl DataFrameNode {
    pub fn from_definition(def: &NodeDefinition) -> Result<Self, RegistryError> {
        if def.input_datasets().len() != 2 {
            return Err(RegistryError::InvalidParams {
                node: def.name().to_string(),
                reason: "requires exactly two input datasets (left, right)".to_string(),
            });
        }
        Ok(Self {
            name: def.name().to_string(),
            input_datasets: def.input_datasets().to_vec(),
            output_dataset: def.output_dataset().to_string(),
            join_key: required_param(def, "join_key")?,
            match_column: required_param(def, "match_column")?,
            match_value: required_param(def, "match_value")?,
            match_label: def
                .param_str("match_label")
                .unwrap_or(DEFAULT_MATCH_LABEL)
                .to_string(),
            fallback_label: def
                .param_str("fallback_label")
                .unwrap_or(DEFAULT_FALLBACK_LABEL)
                .to_string(),
            output_column: def
                .param_str("output_column")
                .unwrap_or(DEFAULT_OUTPUT_COLUMN)
                .to_string(),
        })
    }

    fn table_input<'a>(
        &self,
        inputs: &'a ResolvedInputs,
        dataset: &str,
    ) -> Result<&'a Table, BackendExecutionError> {
        let payload = inputs.get(dataset).ok_or_else(|| {
            BackendExecutionError::new(
                &self.name,
                NODE_TYPE,
                format!("missing resolved input for dataset '{}'", dataset),
            )
        })?;
        payload.as_table().ok_or_else(|| {
            BackendExecutionError::new(
                &self.name,
                NODE_TYPE,
                format!(
                    "dataset '{}' resolved to a {} payload, expected a table",
                    dataset,
                    payload.kind()
                ),
            )
        })
    }

    fn classify(&self, row: &Row) -> Value {
        let matched = row
            .get(&self.match_column)
            .and_then(Value::as_str)
            .map(|v| v == self.match_value)
            .unwrap_or(false);
        if matched {
            Value::String(self.match_label.clone())
        } else {
            Value::String(self.fallback_label.clone())
        }
    }
}

#[async_trait]
impl Node for DataFrameNode {
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
        inputs: ResolvedInputs,
        _context: &ExecutionContext,
    ) -> Result<DatasetPayload, BackendExecutionError> {
        let left = self.table_input(&inputs, &self.input_datasets[0])?;
        let right = self.table_input(&inputs, &self.input_datasets[1])?;

        let mut rows = Vec::with_capacity(left.len());
        for left_row in &left.rows {
            let key = left_row.get(&self.join_key);
            let matches: Vec<&Row> = right
                .rows
                .iter()
                .filter(|r| key.is_some() && r.get(&self.join_key) == key)
                .collect();

            if matches.is_empty() {
                // Left join: unmatched rows survive without right columns.
                let mut row = left_row.clone();
                row.insert(self.output_column.clone(), self.classify(&row));
                rows.push(row);
            } else {
                for right_row in matches {
                    let mut row = left_row.clone();
                    for (column, value) in right_row {
                        row.entry(column.clone()).or_insert_with(|| value.clone());
                    }
                    row.insert(self.output_column.clone(), self.classify(&row));
                    rows.push(row);
                }
            }
        }

        Ok(DatasetPayload::Table(Table::from_rows(rows)))
    }
}

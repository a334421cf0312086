// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Opaque dataset payloads exchanged between nodes and gateways.
//!
//! The core never inspects payload contents: the executor and resolver move
//! `DatasetPayload` values between the catalog, `Node::execute`, and the
//! persistence gateway without interpretation. Only concrete backends
//! pattern-match on the variant they expect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single record in an in-memory table: column name -> scalar value.
pub type Row = serde_json::Map<String, Value>;

/// Minimal in-memory row table used by the in-process dataframe backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The unit of data handed across the gateway boundary.
///
/// Variants cover the shapes the built-in backends exchange: an in-memory
/// table, an artifact path produced by an external batch process, a JSON
/// document (service acknowledgements, remote result handles), or raw bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetPayload {
    Table(Table),
    Path(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl DatasetPayload {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            DatasetPayload::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&str> {
        match self {
            DatasetPayload::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            DatasetPayload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Short variant tag used in diagnostics when a backend receives a
    /// payload shape it cannot accept.
    pub fn kind(&self) -> &'static str {
        match self {
            DatasetPayload::Table(_) => "table",
            DatasetPayload::Path(_) => "path",
            DatasetPayload::Json(_) => "json",
            DatasetPayload::Bytes(_) => "bytes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn accessors_match_variant() {
        let table = DatasetPayload::Table(Table::from_rows(vec![row(&[("a", json!(1))])]));
        assert!(table.as_table().is_some());
        assert!(table.as_path().is_none());
        assert_eq!(table.kind(), "table");

        let path = DatasetPayload::Path("/data/out.parquet".into());
        assert_eq!(path.as_path(), Some("/data/out.parquet"));
        assert_eq!(path.kind(), "path");
    }

    #[test]
    fn table_roundtrips_through_serde() {
        let table = Table::from_rows(vec![row(&[("cusip", json!("037833100"))])]);
        let payload = DatasetPayload::Table(table.clone());
        let text = serde_json::to_string(&payload).unwrap();
        let back: DatasetPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back.as_table(), Some(&table));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! JSON records to tabular rows

use serde_json::{Map, Value};

/// A JSON object from an API response
pub type Record = Map<String, Value>;

/// Pull the record list out of a response body
///
/// Accepts `{"data": [...]}` or a bare array. Non-object entries are
/// dropped. Returns `None` when neither shape is present.
pub fn extract_records(body: &Value) -> Option<Vec<Record>> {
    let list = match body {
        Value::Object(map) => map.get("data")?.as_array()?,
        Value::Array(list) => list,
        _ => return None,
    };

    Some(
        list.iter()
            .filter_map(|v| v.as_object().cloned())
            .collect(),
    )
}

/// Column-ordered table built from records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Columns are the union of record keys in first-seen order
    pub fn from_records(records: &[Record]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Insert a constant column in front of the others
    ///
    /// An existing column of the same name is replaced.
    pub fn prepend_column(&mut self, name: &str, value: &str) {
        if let Some(idx) = self.headers.iter().position(|h| h == name) {
            self.headers.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }

        self.headers.insert(0, name.to_string());
        for row in &mut self.rows {
            row.insert(0, value.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render one JSON value as a CSV cell
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        nested => nested.to_string(),
    }
}

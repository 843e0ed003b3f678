use anyhow::{bail, Context, Result};
use serde_json::{Map, Value as Json};
use std::collections::HashMap;

use crate::relation::{Field, Relation, Row, Value};
use crate::schema::ColumnType;

/// A parsed JSON object, keys in source order
pub struct ParsedRecord {
    pub values: Vec<(String, Value)>,
}

/// Parse one JSONL line into a record
pub fn parse_record(line: &str) -> Result<ParsedRecord> {
    let json: Json = serde_json::from_str(line).context("Failed to parse JSON")?;

    let Json::Object(object) = json else {
        bail!("Expected a JSON object per line");
    };

    Ok(ParsedRecord {
        values: object_values(&object),
    })
}

fn object_values(object: &Map<String, Json>) -> Vec<(String, Value)> {
    object
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(value)))
        .collect()
}

/// Collects schemaless records into a raw relation.
///
/// Fields appear in order of first sight; a record missing a key reads as
/// null there. A field's type is that of its first non-null value, Text
/// when every value is null. Staging does the real type checking.
pub struct RawRelationBuilder {
    name: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Vec<(usize, Value)>>,
}

impl RawRelationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            index: HashMap::new(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ParsedRecord) {
        let cells = record
            .values
            .into_iter()
            .map(|(key, value)| (self.column_index(key), value))
            .collect();
        self.records.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column_index(&mut self, key: String) -> usize {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(key.clone());
        self.index.insert(key, idx);
        idx
    }

    pub fn finish(self) -> Relation {
        let width = self.columns.len();
        let rows: Vec<Row> = self
            .records
            .into_iter()
            .map(|cells| {
                let mut row = vec![Value::Null; width];
                for (idx, value) in cells {
                    row[idx] = value;
                }
                row
            })
            .collect();

        let fields = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let col_type = rows
                    .iter()
                    .find_map(|row| row[idx].column_type())
                    .unwrap_or(ColumnType::Text);
                let nullable = rows.iter().any(|row| row[idx].is_null());
                Field::new(name, col_type, nullable)
            })
            .collect();

        Relation::with_rows(self.name, fields, rows)
    }
}

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;

use super::RawSource;
use crate::parser::{ParsedRecord, RawRelationBuilder};
use crate::relation::{Field, Relation, Value};
use crate::schema::{ColumnType, RelationSchema};

/// Raw relations stored as tables in an existing SQLite database
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection> {
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open source database: {:?}", self.path))
    }
}

impl RawSource for SqliteSource {
    fn read(&self, schema: &RelationSchema) -> Result<Relation> {
        let conn = self.open()?;
        let sql = format!("SELECT * FROM \"{}\"", schema.raw_table);
        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to query table: {}", schema.raw_table))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut builder = RawRelationBuilder::new(schema.raw_table);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                values.push((name.clone(), Value::from(row.get_ref(idx)?)));
            }
            builder.push(ParsedRecord { values });
        }

        // An empty table still declares its columns; keep them so staging can
        // report a missing one
        if builder.is_empty() {
            let fields = columns
                .iter()
                .map(|name| match schema.column(name) {
                    Some(col) => Field::new(name.as_str(), col.col_type, col.nullable),
                    None => Field::new(name.as_str(), ColumnType::Text, true),
                })
                .collect();
            tracing::debug!(table = schema.raw_table, "raw relation has no rows");
            return Ok(Relation::new(schema.raw_table, fields));
        }

        let relation = builder.finish();
        tracing::debug!(
            table = schema.raw_table,
            rows = relation.len(),
            "read raw relation"
        );
        Ok(relation)
    }

    fn describe(&self) -> String {
        format!("SQLite database {:?}", self.path)
    }
}

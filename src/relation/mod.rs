//! In-memory relations: a named field list plus fully materialized rows

mod value;

pub use value::Value;

use crate::error::{PipelineError, Result};
use crate::schema::ColumnType;

/// A named, typed field of a relation
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, col_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable,
        }
    }
}

pub type Row = Vec<Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub name: String,
    pub fields: Vec<Field>,
    pub rows: Vec<Row>,
}

impl Relation {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, fields: Vec<Field>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            fields,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == column)
    }

    /// Index of a column, failing with a schema mismatch when absent
    pub fn require(&self, column: &str) -> Result<usize> {
        self.position(column)
            .ok_or_else(|| PipelineError::schema(&self.name, column, "column not found"))
    }

    /// Index of a column that must carry the given type
    pub fn require_typed(&self, column: &str, col_type: ColumnType) -> Result<usize> {
        let idx = self.require(column)?;
        let field = &self.fields[idx];
        if field.col_type != col_type {
            return Err(PipelineError::schema(
                &self.name,
                column,
                format!("expected {}, found {}", col_type, field.col_type),
            ));
        }
        Ok(idx)
    }

    /// Read the integer key of every row; nulls and non-integers are schema errors
    pub fn keys(&self, column: &str) -> Result<Vec<i64>> {
        let idx = self.require_typed(column, ColumnType::Integer)?;
        self.rows
            .iter()
            .map(|row| {
                row[idx].as_i64().ok_or_else(|| {
                    PipelineError::schema(&self.name, column, "null join key")
                })
            })
            .collect()
    }

    /// Values of one column, in row order
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.require(column)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Sort rows ascending by an integer column, nulls first
    pub fn sort_by_key(&mut self, column: &str) -> Result<()> {
        let idx = self.require_typed(column, ColumnType::Integer)?;
        self.rows.sort_by_key(|row| row[idx].as_i64());
        Ok(())
    }

    /// Same relation under another name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

use serde::Serialize;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Stored as INTEGER 0/1 in SQLite
    Boolean,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "INTEGER",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Real => write!(f, "real"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Column definition for a raw relation, named as the source delivers it
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
        }
    }
}

/// Schema of one raw input relation and the staging projection applied to it
#[derive(Debug, Clone)]
pub struct RelationSchema {
    /// Stage name of the staged relation (e.g. "stg_pokemon_base")
    pub name: &'static str,
    /// Table name in a SQLite source
    pub raw_table: &'static str,
    /// File name in a JSONL source directory
    pub source_file: &'static str,
    pub columns: &'static [Column],
}

impl RelationSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

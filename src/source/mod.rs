//! Readers for the three raw relations

mod jsonl;
mod sqlite;

pub use jsonl::JsonlSource;
pub use sqlite::SqliteSource;

use anyhow::Result;

use crate::relation::Relation;
use crate::schema::RelationSchema;

/// Anything that can hand over a raw relation by schema.
///
/// Sources return the relation as delivered; projection and typing happen in
/// the staging stage.
pub trait RawSource {
    fn read(&self, schema: &RelationSchema) -> Result<Relation>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// A source with fixed, in-memory relations keyed by raw table name
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    relations: Vec<(&'static str, Relation)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, schema: &RelationSchema, relation: Relation) -> Self {
        self.relations.retain(|(table, _)| *table != schema.raw_table);
        self.relations.push((schema.raw_table, relation));
        self
    }
}

impl RawSource for MemorySource {
    fn read(&self, schema: &RelationSchema) -> Result<Relation> {
        self.relations
            .iter()
            .find(|(table, _)| *table == schema.raw_table)
            .map(|(_, relation)| relation.clone())
            .ok_or_else(|| anyhow::anyhow!("No in-memory relation for {}", schema.raw_table))
    }

    fn describe(&self) -> String {
        format!("{} in-memory relations", self.relations.len())
    }
}

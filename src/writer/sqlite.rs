use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_insert, quote_ident};
use crate::relation::{Relation, Row};
use crate::ui::{Phase, Ui};

const BATCH_SIZE: usize = 1000;

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open (or create) the output database. Existing tables are kept.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Ok(Self { conn })
    }

    /// Replace `table` with the relation's rows.
    ///
    /// Drop, create and insert all happen in one transaction: on any error
    /// the previous table is left as it was.
    pub fn replace_table(&mut self, relation: &Relation, table: &str) -> Result<u64> {
        let insert_sql = generate_insert(relation, table);
        let tx = self.conn.transaction()?;

        tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)), [])
            .with_context(|| format!("Failed to drop table: {}", table))?;
        tx.execute(&generate_create_table(relation, table), [])
            .with_context(|| format!("Failed to create table: {}", table))?;

        let mut count: u64 = 0;
        for batch in relation.rows.chunks(BATCH_SIZE) {
            insert_batch(&tx, &insert_sql, batch)
                .with_context(|| format!("Failed to insert into: {}", table))?;
            count += batch.len() as u64;
        }

        tx.commit()?;
        tracing::info!(table, rows = count, "replaced output table");

        Ok(count)
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// Insert a batch of rows with a cached prepared statement
fn insert_batch(tx: &rusqlite::Transaction, sql: &str, batch: &[Row]) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, value) in row.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}

/// Write a relation into an SQLite database, replacing the table
pub fn write_to_sqlite(
    relation: &Relation,
    output_db: &Path,
    table: &str,
    ui: &mut impl Ui,
) -> Result<u64> {
    ui.set_phase(Phase::Writing);
    ui.log(format!("Writing {} rows to {}", relation.len(), table));

    let mut writer = SqliteWriter::open(output_db)?;
    let count = writer.replace_table(relation, table)?;
    writer.finalize()?;

    Ok(count)
}

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use super::RawSource;
use crate::parser::{parse_record, RawRelationBuilder};
use crate::relation::Relation;
use crate::schema::RelationSchema;
use crate::transform::empty_raw;

/// Raw relations stored as one JSONL file each in a directory
pub struct JsonlSource {
    dir: PathBuf,
}

impl JsonlSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RawSource for JsonlSource {
    fn read(&self, schema: &RelationSchema) -> Result<Relation> {
        let file_path = self.dir.join(schema.source_file);
        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open: {:?}", file_path))?;
        let reader = BufReader::new(file);

        let mut builder = RawRelationBuilder::new(schema.raw_table);
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read line")?;
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_record(&line).with_context(|| {
                format!("Failed to parse record at {}:{}", schema.source_file, line_no + 1)
            })?;
            builder.push(record);
        }

        // No record means no column list either; fall back to the schema's
        if builder.is_empty() {
            tracing::debug!(file = %file_path.display(), "raw relation has no rows");
            return Ok(empty_raw(schema));
        }

        let relation = builder.finish();
        tracing::debug!(
            file = %file_path.display(),
            rows = relation.len(),
            columns = relation.fields.len(),
            "read raw relation"
        );
        Ok(relation)
    }

    fn describe(&self) -> String {
        format!("JSONL files in {:?}", self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Value;
    use crate::schema::POKEMON_REPRODUCTION;
    use std::fs;

    #[test]
    fn test_read_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(POKEMON_REPRODUCTION.source_file),
            "{\"ID\": 1, \"EGG_STEPS\": 5120}\n\n{\"ID\": 2, \"EGG_STEPS\": 5120}\n",
        )
        .unwrap();

        let rel = JsonlSource::new(dir.path()).read(&POKEMON_REPRODUCTION).unwrap();
        assert_eq!(rel.len(), 2);
        assert_eq!(rel.name, "RAW_POKEMON_REPRODUCTION");
        assert_eq!(rel.rows[1][0], Value::Integer(2));
    }

    #[test]
    fn test_blank_file_reads_as_empty_relation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(POKEMON_REPRODUCTION.source_file), "\n\n").unwrap();

        let rel = JsonlSource::new(dir.path()).read(&POKEMON_REPRODUCTION).unwrap();
        assert!(rel.is_empty());
        assert_eq!(rel.name, "RAW_POKEMON_REPRODUCTION");
        assert_eq!(rel.fields.len(), POKEMON_REPRODUCTION.columns.len());
        assert_eq!(rel.field_names()[0], "ID");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonlSource::new(dir.path())
            .read(&POKEMON_REPRODUCTION)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_bad_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(POKEMON_REPRODUCTION.source_file),
            "{\"ID\": 1}\n{\"ID\": \n",
        )
        .unwrap();

        let err = JsonlSource::new(dir.path())
            .read(&POKEMON_REPRODUCTION)
            .unwrap_err();
        assert!(err.to_string().contains("raw_pokemon_reproduction.jsonl:2"));
    }
}

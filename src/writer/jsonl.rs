use anyhow::{Context, Result};
use serde_json::{Map, Value as Json};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::relation::Relation;

/// Write one JSON object per row, fields in relation order.
///
/// The file is written next to `path` and renamed over it once complete, so
/// readers never see a partial file.
pub fn write_jsonl(relation: &Relation, path: &Path) -> Result<u64> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;

    let temp = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
    let mut out = BufWriter::new(temp);

    for row in &relation.rows {
        let object: Map<String, Json> = relation
            .fields
            .iter()
            .zip(row)
            .map(|(field, value)| (field.name.clone(), Json::from(value)))
            .collect();
        serde_json::to_writer(&mut out, &object).context("Failed to serialize row")?;
        out.write_all(b"\n")?;
    }

    let temp = out
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush output")?;
    temp.persist(path)
        .with_context(|| format!("Failed to write: {:?}", path))?;

    tracing::info!(path = %path.display(), rows = relation.len(), "wrote JSONL output");
    Ok(relation.len() as u64)
}

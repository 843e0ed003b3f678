use crate::error::{PipelineError, Result};
use crate::relation::{Field, Relation, Row};
use crate::schema::RelationSchema;

/// Project a raw relation onto its schema, coercing each value to the
/// declared column type. Row count is unchanged.
pub fn stage(raw: &Relation, schema: &RelationSchema) -> Result<Relation> {
    let mut sources = Vec::with_capacity(schema.columns.len());
    for col in schema.columns {
        let idx = raw.position(col.name).ok_or_else(|| {
            PipelineError::schema(schema.name, col.name, "column not found in raw relation")
        })?;
        sources.push(idx);
    }

    let fields: Vec<Field> = schema
        .columns
        .iter()
        .map(|col| Field::new(col.name, col.col_type, col.nullable))
        .collect();

    let mut rows: Vec<Row> = Vec::with_capacity(raw.len());
    for (row_no, raw_row) in raw.rows.iter().enumerate() {
        let mut row = Vec::with_capacity(fields.len());
        for (col, &idx) in schema.columns.iter().zip(&sources) {
            let value = raw_row[idx].coerce(col.col_type).ok_or_else(|| {
                PipelineError::schema(
                    schema.name,
                    col.name,
                    format!("row {}: {:?} is not {}", row_no + 1, raw_row[idx], col.col_type),
                )
            })?;
            if value.is_null() && !col.nullable {
                return Err(PipelineError::schema(
                    schema.name,
                    col.name,
                    format!("row {}: null in required column", row_no + 1),
                ));
            }
            row.push(value);
        }
        rows.push(row);
    }

    let dropped = raw.fields.len().saturating_sub(fields.len());
    if dropped > 0 {
        tracing::debug!(relation = schema.name, dropped, "dropped unmapped raw columns");
    }

    Ok(Relation::with_rows(schema.name, fields, rows))
}

/// A raw relation with every schema column and no rows
pub fn empty_raw(schema: &RelationSchema) -> Relation {
    let fields = schema
        .columns
        .iter()
        .map(|col| Field::new(col.name, col.col_type, col.nullable))
        .collect();
    Relation::new(schema.raw_table, fields)
}

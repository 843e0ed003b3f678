use std::collections::HashSet;

use crate::error::{PipelineError, Result};
use crate::relation::Relation;
use crate::schema::canonical::canonical_name;

/// Replace every column name with its canonical snake_case form.
/// Rows pass through untouched.
pub fn rename_columns(relation: Relation, name: &str) -> Result<Relation> {
    let mut seen = HashSet::with_capacity(relation.fields.len());
    let mut fields = relation.fields;

    for field in &mut fields {
        let canonical = canonical_name(&field.name);
        if !seen.insert(canonical.clone()) {
            return Err(PipelineError::schema(
                name,
                &field.name,
                format!("renames to {} which is already taken", canonical),
            ));
        }
        if canonical != field.name {
            tracing::trace!(from = %field.name, to = %canonical, "rename column");
        }
        field.name = canonical;
    }

    Ok(Relation::with_rows(name, fields, relation.rows))
}

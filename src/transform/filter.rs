use crate::error::Result;
use crate::relation::Relation;
use crate::schema::canonical::GENERATION;
use crate::schema::ColumnType;

/// Keep the rows of one generation. An empty result is valid.
pub fn filter_generation(relation: &Relation, generation: i64, name: &str) -> Result<Relation> {
    let idx = relation.require_typed(GENERATION, ColumnType::Integer)?;

    let rows = relation
        .rows
        .iter()
        .filter(|row| row[idx].as_i64() == Some(generation))
        .cloned()
        .collect();

    Ok(Relation::with_rows(name, relation.fields.clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{Field, Value};

    fn generations(gens: &[i64]) -> Relation {
        Relation::with_rows(
            "renamed",
            vec![
                Field::new("id", ColumnType::Integer, false),
                Field::new(GENERATION, ColumnType::Integer, false),
            ],
            gens.iter()
                .enumerate()
                .map(|(i, g)| vec![Value::Integer(i as i64 + 1), Value::Integer(*g)])
                .collect(),
        )
    }

    #[test]
    fn test_keeps_only_requested_generation() {
        let filtered = filter_generation(&generations(&[1, 2, 1, 3]), 1, "filtered").unwrap();
        assert_eq!(filtered.keys("id").unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let filtered = filter_generation(&generations(&[2, 3]), 1, "filtered").unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.fields.len(), 2);
    }

    #[test]
    fn test_missing_generation_column() {
        let rel = Relation::new("renamed", vec![Field::new("id", ColumnType::Integer, false)]);
        assert!(filter_generation(&rel, 1, "filtered").is_err());
    }
}

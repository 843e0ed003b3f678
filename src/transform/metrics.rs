//! Row-wise derived metrics over the filtered relation, each keyed by id

use std::collections::HashMap;

use crate::config::ZeroHeightPolicy;
use crate::error::{PipelineError, Result};
use crate::relation::{Field, Relation, Value};
use crate::schema::canonical::{
    BASE_STATS, BMI, COMBAT_STATS, EGG_HATCH_TIME, EGG_STEPS, HEIGHT_METERS, ID, TYPE_1,
    TYPE_COUNT, WEIGHT_KILOGRAMS,
};
use crate::schema::ColumnType;

/// Steps per unit of egg hatch time
pub const STEPS_PER_HATCH_UNIT: i64 = 100;

fn id_field() -> Field {
    Field::new(ID, ColumnType::Integer, false)
}

/// `weight_kilograms / height_meters^2`.
///
/// A null weight or height gives a null BMI. A zero height is handled by
/// `policy`: null, or a fatal arithmetic error.
pub fn calculate_bmi(
    relation: &Relation,
    policy: ZeroHeightPolicy,
    name: &str,
) -> Result<Relation> {
    let ids = relation.keys(ID)?;
    let height = relation.require_typed(HEIGHT_METERS, ColumnType::Real)?;
    let weight = relation.require_typed(WEIGHT_KILOGRAMS, ColumnType::Real)?;

    let mut rows = Vec::with_capacity(relation.len());
    let mut zero_heights = 0usize;
    for (row, id) in relation.rows.iter().zip(ids) {
        let bmi = match (row[weight].as_f64(), row[height].as_f64()) {
            (Some(_), Some(h)) if h == 0.0 => match policy {
                ZeroHeightPolicy::Null => {
                    zero_heights += 1;
                    Value::Null
                }
                ZeroHeightPolicy::Reject => {
                    return Err(PipelineError::arithmetic(name, id, "height_meters is zero"));
                }
            },
            (Some(w), Some(h)) => Value::Real(w / (h * h)),
            _ => Value::Null,
        };
        rows.push(vec![Value::Integer(id), bmi]);
    }

    if zero_heights > 0 {
        tracing::warn!(relation = name, rows = zero_heights, "zero height, BMI set to null");
    }

    Ok(Relation::with_rows(
        name,
        vec![id_field(), Field::new(BMI, ColumnType::Real, true)],
        rows,
    ))
}

/// `ceil(egg_steps / 100)` by integer ceiling division
pub fn calculate_egg_hatch_time(relation: &Relation, name: &str) -> Result<Relation> {
    let ids = relation.keys(ID)?;
    let steps = relation.require_typed(EGG_STEPS, ColumnType::Integer)?;

    let mut rows = Vec::with_capacity(relation.len());
    for (row, id) in relation.rows.iter().zip(ids) {
        let hatch = match row[steps].as_i64() {
            Some(s) if s < 0 => {
                return Err(PipelineError::arithmetic(
                    name,
                    id,
                    format!("negative egg_steps {}", s),
                ));
            }
            Some(s) => Value::Integer(hatch_time(s)),
            None => Value::Null,
        };
        rows.push(vec![Value::Integer(id), hatch]);
    }

    let nullable = relation.fields[steps].nullable;
    Ok(Relation::with_rows(
        name,
        vec![id_field(), Field::new(EGG_HATCH_TIME, ColumnType::Integer, nullable)],
        rows,
    ))
}

fn hatch_time(steps: i64) -> i64 {
    // steps is non-negative here
    (steps + STEPS_PER_HATCH_UNIT - 1) / STEPS_PER_HATCH_UNIT
}

/// Sum of hp, attack, defense, sp_attack, sp_defense and speed
pub fn calculate_base_stats(relation: &Relation, name: &str) -> Result<Relation> {
    let ids = relation.keys(ID)?;
    let stats = COMBAT_STATS
        .iter()
        .map(|stat| relation.require_typed(stat, ColumnType::Integer))
        .collect::<Result<Vec<_>>>()?;
    let nullable = stats.iter().any(|&idx| relation.fields[idx].nullable);

    let mut rows = Vec::with_capacity(relation.len());
    for (row, id) in relation.rows.iter().zip(ids) {
        let mut total: Option<i64> = Some(0);
        for &idx in &stats {
            total = match (total, row[idx].as_i64()) {
                (Some(acc), Some(v)) => Some(acc.checked_add(v).ok_or_else(|| {
                    PipelineError::arithmetic(name, id, "base stat sum overflows")
                })?),
                _ => None,
            };
        }
        rows.push(vec![
            Value::Integer(id),
            total.map(Value::Integer).unwrap_or(Value::Null),
        ]);
    }

    Ok(Relation::with_rows(
        name,
        vec![id_field(), Field::new(BASE_STATS, ColumnType::Integer, nullable)],
        rows,
    ))
}

/// Number of rows sharing each row's `type_1`. Null types count together.
pub fn count_types(relation: &Relation, name: &str) -> Result<Relation> {
    let ids = relation.keys(ID)?;
    let type_idx = relation.require_typed(TYPE_1, ColumnType::Text)?;

    let mut counts: HashMap<Option<&str>, i64> = HashMap::new();
    for row in &relation.rows {
        *counts.entry(row[type_idx].as_str()).or_default() += 1;
    }

    let rows = relation
        .rows
        .iter()
        .zip(ids)
        .map(|(row, id)| {
            let count = counts.get(&row[type_idx].as_str()).copied().unwrap_or(0);
            vec![Value::Integer(id), Value::Integer(count)]
        })
        .collect();

    Ok(Relation::with_rows(
        name,
        vec![id_field(), Field::new(TYPE_COUNT, ColumnType::Integer, false)],
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physical(rows: &[(i64, Option<f64>, Option<f64>)]) -> Relation {
        Relation::with_rows(
            "filtered",
            vec![
                Field::new(ID, ColumnType::Integer, false),
                Field::new(HEIGHT_METERS, ColumnType::Real, true),
                Field::new(WEIGHT_KILOGRAMS, ColumnType::Real, true),
            ],
            rows.iter()
                .map(|(id, h, w)| {
                    vec![
                        Value::Integer(*id),
                        h.map(Value::Real).unwrap_or(Value::Null),
                        w.map(Value::Real).unwrap_or(Value::Null),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_bmi_for_bulbasaur() {
        let rel = physical(&[(1, Some(0.7), Some(6.9))]);
        let bmi = calculate_bmi(&rel, ZeroHeightPolicy::Null, "bmi").unwrap();
        let value = bmi.rows[0][1].as_f64().unwrap();
        assert!((value - 14.0816).abs() < 1e-3, "got {}", value);
    }

    #[test]
    fn test_zero_height_null_policy() {
        let rel = physical(&[(1, Some(0.0), Some(6.9)), (2, None, Some(1.0))]);
        let bmi = calculate_bmi(&rel, ZeroHeightPolicy::Null, "bmi").unwrap();
        assert_eq!(bmi.rows[0][1], Value::Null);
        assert_eq!(bmi.rows[1][1], Value::Null);
    }

    #[test]
    fn test_zero_height_reject_policy() {
        let rel = physical(&[(7, Some(0.0), Some(6.9))]);
        let err = calculate_bmi(&rel, ZeroHeightPolicy::Reject, "bmi").unwrap_err();
        assert!(matches!(err, PipelineError::ArithmeticEdgeCase { id: 7, .. }));
    }

    #[test]
    fn test_hatch_time_ceiling() {
        assert_eq!(hatch_time(0), 0);
        assert_eq!(hatch_time(1), 1);
        assert_eq!(hatch_time(250), 3);
        assert_eq!(hatch_time(500), 5);
        assert_eq!(hatch_time(5120), 52);
    }

    #[test]
    fn test_negative_egg_steps() {
        let rel = Relation::with_rows(
            "filtered",
            vec![
                Field::new(ID, ColumnType::Integer, false),
                Field::new(EGG_STEPS, ColumnType::Integer, false),
            ],
            vec![vec![Value::Integer(3), Value::Integer(-5)]],
        );
        assert!(calculate_egg_hatch_time(&rel, "hatch").is_err());
    }

    #[test]
    fn test_base_stats_sum() {
        let mut fields = vec![Field::new(ID, ColumnType::Integer, false)];
        fields.extend(
            COMBAT_STATS
                .iter()
                .map(|s| Field::new(*s, ColumnType::Integer, false)),
        );
        let rel = Relation::with_rows(
            "filtered",
            fields,
            vec![[1, 45, 49, 49, 65, 65, 45]
                .iter()
                .map(|v| Value::Integer(*v))
                .collect()],
        );

        let stats = calculate_base_stats(&rel, "stats").unwrap();
        assert_eq!(stats.rows[0], vec![Value::Integer(1), Value::Integer(318)]);
    }

    #[test]
    fn test_type_count() {
        let rel = Relation::with_rows(
            "filtered",
            vec![
                Field::new(ID, ColumnType::Integer, false),
                Field::new(TYPE_1, ColumnType::Text, false),
            ],
            vec![
                vec![Value::Integer(1), Value::Text("Grass".into())],
                vec![Value::Integer(4), Value::Text("Fire".into())],
                vec![Value::Integer(43), Value::Text("Grass".into())],
            ],
        );

        let counts = count_types(&rel, "type_count").unwrap();
        let by_id: Vec<_> = counts.rows.iter().map(|r| r[1].as_i64().unwrap()).collect();
        assert_eq!(by_id, vec![2, 1, 2]);
    }
}

use crate::config::RankMethod;
use crate::error::Result;
use crate::relation::{Field, Relation, Value};
use crate::schema::canonical::{BMI, BMI_RANK, ID};
use crate::schema::ColumnType;

/// Rank every row by BMI, highest first, then emit rows ordered by id.
///
/// The whole relation is materialized and sorted before any rank exists.
/// Rows with a null BMI get a null rank and do not push other ranks down.
pub fn rank_bmi(relation: &Relation, method: RankMethod, name: &str) -> Result<Relation> {
    let ids = relation.keys(ID)?;
    let bmi_idx = relation.require_typed(BMI, ColumnType::Real)?;

    let mut ranked: Vec<(i64, f64, usize)> = relation
        .rows
        .iter()
        .zip(&ids)
        .enumerate()
        .filter_map(|(pos, (row, &id))| row[bmi_idx].as_f64().map(|bmi| (id, bmi, pos)))
        .collect();

    // Descending BMI; ties fall back to ascending id so ordinal ranks are stable
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut ranks: Vec<Option<i64>> = vec![None; relation.len()];
    let mut dense = 0i64;
    let mut competition = 0i64;
    let mut previous: Option<f64> = None;
    for (n, &(_, bmi, pos)) in ranked.iter().enumerate() {
        let ordinal = n as i64 + 1;
        if previous != Some(bmi) {
            dense += 1;
            competition = ordinal;
            previous = Some(bmi);
        }
        ranks[pos] = Some(match method {
            RankMethod::Competition => competition,
            RankMethod::Dense => dense,
            RankMethod::Ordinal => ordinal,
        });
    }

    let mut rows: Vec<_> = relation
        .rows
        .iter()
        .zip(ids)
        .zip(ranks)
        .map(|((row, id), rank)| {
            vec![
                Value::Integer(id),
                row[bmi_idx].clone(),
                rank.map(Value::Integer).unwrap_or(Value::Null),
            ]
        })
        .collect();
    rows.sort_by_key(|row| row[0].as_i64());

    let has_nulls = rows.iter().any(|row| row[2].is_null());
    Ok(Relation::with_rows(
        name,
        vec![
            Field::new(ID, ColumnType::Integer, false),
            relation.fields[bmi_idx].clone(),
            Field::new(BMI_RANK, ColumnType::Integer, has_nulls || relation.fields[bmi_idx].nullable),
        ],
        rows,
    ))
}

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::error::{PipelineError, Result};
use crate::relation::{Relation, Row};

/// Rows dropped at one inner-join boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinLoss {
    pub left: String,
    pub right: String,
    /// Left keys with no match on the right
    pub left_unmatched: usize,
    /// Right keys with no match on the left
    pub right_unmatched: usize,
}

impl JoinLoss {
    pub fn is_lossless(&self) -> bool {
        self.left_unmatched == 0 && self.right_unmatched == 0
    }
}

/// Map each key to its row index, rejecting duplicates
fn key_index(relation: &Relation, key: &str) -> Result<HashMap<i64, usize>> {
    let keys = relation.keys(key)?;
    let mut index = HashMap::with_capacity(keys.len());
    for (row, k) in keys.into_iter().enumerate() {
        if index.insert(k, row).is_some() {
            return Err(PipelineError::DuplicateKey {
                relation: relation.name.clone(),
                key: k,
            });
        }
    }
    Ok(index)
}

/// Inner join on a unique integer key.
///
/// Computed as an explicit key intersection so the rows each side loses are
/// counted instead of vanishing. Output keeps left row order; fields are the
/// left fields followed by the right fields without the key.
pub fn inner_join(
    left: &Relation,
    right: &Relation,
    key: &str,
    name: &str,
) -> Result<(Relation, JoinLoss)> {
    let left_index = key_index(left, key)?;
    let right_index = key_index(right, key)?;
    let right_key = right.require(key)?;

    let left_names: HashSet<&str> = left.fields.iter().map(|f| f.name.as_str()).collect();
    let mut fields = left.fields.clone();
    let mut right_columns = Vec::with_capacity(right.fields.len());
    for (idx, field) in right.fields.iter().enumerate() {
        if idx == right_key {
            continue;
        }
        if left_names.contains(field.name.as_str()) {
            return Err(PipelineError::schema(
                name,
                &field.name,
                format!("column present in both {} and {}", left.name, right.name),
            ));
        }
        fields.push(field.clone());
        right_columns.push(idx);
    }

    let left_keys = left.keys(key)?;
    let mut rows: Vec<Row> = Vec::new();
    for (left_row, k) in left.rows.iter().zip(&left_keys) {
        let Some(&r) = right_index.get(k) else {
            continue;
        };
        let mut row = left_row.clone();
        row.extend(right_columns.iter().map(|&c| right.rows[r][c].clone()));
        rows.push(row);
    }

    let matched = rows.len();
    let loss = JoinLoss {
        left: left.name.clone(),
        right: right.name.clone(),
        left_unmatched: left_index.len() - matched,
        right_unmatched: right_index.len() - matched,
    };

    if loss.is_lossless() {
        tracing::debug!(relation = name, rows = matched, "joined {} with {}", left.name, right.name);
    } else {
        tracing::warn!(
            relation = name,
            left_unmatched = loss.left_unmatched,
            right_unmatched = loss.right_unmatched,
            "inner join of {} and {} dropped unmatched rows",
            left.name,
            right.name
        );
    }

    Ok((Relation::with_rows(name, fields, rows), loss))
}

/// Fold a chain of inner joins over the same key
pub fn inner_join_all(
    relations: &[&Relation],
    key: &str,
    name: &str,
) -> Result<(Relation, Vec<JoinLoss>)> {
    let Some((first, rest)) = relations.split_first() else {
        return Err(PipelineError::schema(name, key, "nothing to join"));
    };

    let mut acc = (*first).clone().renamed(name);
    let mut losses = Vec::with_capacity(rest.len());
    for relation in rest {
        let (joined, loss) = inner_join(&acc, relation, key, name)?;
        acc = joined;
        losses.push(loss);
    }

    Ok((acc, losses))
}

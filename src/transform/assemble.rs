use super::join::{inner_join_all, JoinLoss};
use crate::error::Result;
use crate::relation::Relation;
use crate::schema::canonical::ID;

/// Join the filtered relation with every metric relation on id and order by id.
///
/// Every metric is derived from the same filtered rows, so a single run never
/// loses rows here; the losses are still returned for the report.
pub fn assemble(
    filtered: &Relation,
    metrics: &[&Relation],
    name: &str,
) -> Result<(Relation, Vec<JoinLoss>)> {
    let mut inputs = Vec::with_capacity(metrics.len() + 1);
    inputs.push(filtered);
    inputs.extend_from_slice(metrics);

    let (mut enriched, losses) = inner_join_all(&inputs, ID, name)?;
    enriched.sort_by_key(ID)?;

    Ok((enriched, losses))
}

//! Grouping damage records into per-attacker contributions.

use std::collections::BTreeMap;

use bounty_types::{AttackerContribution, DamageRecord, IdentityId};

/// Group records by attacker identity and sum their amounts.
///
/// Sums accumulate in `f64` so long fights made of many small `f32` hits do
/// not lose precision. Output is ordered by identity.
pub fn group_by_attacker(records: &[DamageRecord]) -> Vec<AttackerContribution> {
    let mut sums: BTreeMap<IdentityId, f64> = BTreeMap::new();
    for record in records {
        let total = sums.entry(record.attacker_identity).or_insert(0.0);
        *total += f64::from(record.amount);
    }

    sums.into_iter()
        .map(|(attacker_identity, cumulative_damage)| AttackerContribution {
            attacker_identity,
            cumulative_damage,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use bounty_types::EntityRef;
    use chrono::Utc;

    use super::*;

    fn hit(attacker: i64, amount: f32) -> DamageRecord {
        DamageRecord {
            attacker_identity: IdentityId::new(attacker),
            victim: EntityRef::new(1),
            amount,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(group_by_attacker(&[]).is_empty());
    }

    #[test]
    fn unknown_identity_is_its_own_group() {
        let grouped = group_by_attacker(&[hit(0, 50.0), hit(3, 50.0), hit(0, 1.0)]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(
            grouped.first().map(|c| (c.attacker_identity, c.cumulative_damage)),
            Some((IdentityId::UNKNOWN, 51.0))
        );
        assert_eq!(grouped.get(1).map(|c| c.cumulative_damage), Some(50.0));
    }

    #[test]
    fn many_small_hits_sum_in_double_precision() {
        let hits: Vec<DamageRecord> = (0..10_000).map(|_| hit(7, 0.1)).collect();
        let grouped = group_by_attacker(&hits);
        let sum = grouped.first().map_or(0.0, |c| c.cumulative_damage);
        assert!((sum - 1000.0).abs() < 0.1, "sum drifted: {sum}");
    }
}

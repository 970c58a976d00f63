//! Proportional share computation.
//!
//! Each hostile contributor receives `floor(damage * pool / total)`, where
//! `total` is the summed damage of the contributors passed in. Arithmetic runs
//! in [`Decimal`] so that a 29% share of 100 is 29, not 28. The flooring
//! remainder is not redistributed: the sum of all shares is at most `pool`
//! and more than `pool - n` for `n` contributors.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use bounty_types::{AttackerContribution, IdentityId};

/// A fault while attributing one kill. Caught per kill by the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributionError {
    /// A contributor's summed damage is NaN or infinite.
    #[error("non-finite damage total {damage} for identity {identity}")]
    NonFiniteDamage {
        /// The contributor.
        identity: IdentityId,
        /// The offending value.
        damage: f64,
    },

    /// Decimal arithmetic overflowed or a share did not fit in `i64`.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },
}

/// One contributor's cut of a reward pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    /// Who receives it.
    pub identity: IdentityId,
    /// Floored amount, within `[0, pool]`.
    pub amount: i64,
}

/// Magnitudes at or above this (2^64) are rescaled before conversion.
const RESCALE_ABOVE: f64 = 18_446_744_073_709_551_616.0;

/// One rescaling step (2^-32). Multiplying by a power of two is exact.
const RESCALE_STEP: f64 = 1.0 / 4_294_967_296.0;

fn finite_damage(contribution: &AttackerContribution) -> Result<f64, AttributionError> {
    let damage = contribution.cumulative_damage;
    if damage.is_finite() {
        Ok(damage)
    } else {
        Err(AttributionError::NonFiniteDamage {
            identity: contribution.attacker_identity,
            damage,
        })
    }
}

/// Power-of-two factor bringing every damage value below [`RESCALE_ABOVE`].
///
/// Shares depend only on ratios, so a common exact factor leaves them
/// unchanged while keeping every value inside `Decimal` range.
fn common_scale(contributions: &[AttackerContribution]) -> Result<f64, AttributionError> {
    let mut peak = 0.0_f64;
    for contribution in contributions {
        peak = peak.max(finite_damage(contribution)?.abs());
    }
    let mut scale = 1.0_f64;
    while peak * scale >= RESCALE_ABOVE {
        scale *= RESCALE_STEP;
    }
    Ok(scale)
}

fn to_decimal(
    contribution: &AttackerContribution,
    scale: f64,
) -> Result<Decimal, AttributionError> {
    let damage = finite_damage(contribution)? * scale;
    Decimal::try_from(damage).map_err(|e| AttributionError::ArithmeticOverflow {
        context: format!("damage {damage} does not fit a decimal: {e}"),
    })
}

fn scaled_total(
    contributions: &[AttackerContribution],
    scale: f64,
) -> Result<Decimal, AttributionError> {
    contributions.iter().try_fold(Decimal::ZERO, |acc, c| {
        acc.checked_add(to_decimal(c, scale)?)
            .ok_or_else(|| AttributionError::ArithmeticOverflow {
                context: String::from("damage total"),
            })
    })
}

/// `floor(damage * pool / total)` clamped to `[0, ceiling]`.
///
/// Multiplies first so exact proportions stay exact. If the product
/// overflows, divides first instead. A share too large for either order is
/// past the pool anyway and clamps to it.
fn share_of(damage: Decimal, total: Decimal, ceiling: i64) -> i64 {
    let pool = Decimal::from(ceiling);
    let raw = damage
        .checked_mul(pool)
        .and_then(|scaled| scaled.checked_div(total))
        .or_else(|| damage.checked_div(total).and_then(|ratio| ratio.checked_mul(pool)));
    match raw.and_then(|r| r.floor().to_i64()) {
        Some(amount) => amount.clamp(0, ceiling),
        None if damage > Decimal::ZERO => ceiling,
        None => 0,
    }
}

/// Split `pool` among `contributions` in proportion to their damage.
///
/// Returns `Ok(None)` when the total is not positive (nothing to divide by).
/// Shares come back in input order, including zero shares; callers skip
/// those. A non-positive pool yields all-zero shares.
///
/// # Errors
///
/// Returns [`AttributionError`] on non-finite damage, or if the summed damage
/// of an absurd number of contributors overflows.
pub fn compute_shares(
    contributions: &[AttackerContribution],
    pool: i64,
) -> Result<Option<Vec<Share>>, AttributionError> {
    let scale = common_scale(contributions)?;
    let total = scaled_total(contributions, scale)?;
    if total <= Decimal::ZERO {
        return Ok(None);
    }

    let ceiling = pool.max(0);
    let mut shares = Vec::with_capacity(contributions.len());
    for contribution in contributions {
        let damage = to_decimal(contribution, scale)?;
        shares.push(Share {
            identity: contribution.attacker_identity,
            amount: share_of(damage, total, ceiling),
        });
    }
    Ok(Some(shares))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn contribution(identity: i64, damage: f64) -> AttackerContribution {
        AttackerContribution {
            attacker_identity: IdentityId::new(identity),
            cumulative_damage: damage,
        }
    }

    fn amounts(shares: &[Share]) -> Vec<i64> {
        shares.iter().map(|s| s.amount).collect()
    }

    #[test]
    fn seventy_thirty_split() {
        let shares = compute_shares(&[contribution(1, 70.0), contribution(2, 30.0)], 100)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![70, 30]);
        assert_eq!(shares.first().map(|s| s.identity), Some(IdentityId::new(1)));
    }

    #[test]
    fn decimal_avoids_float_drift() {
        // 0.29 * 100 in f64 floors to 28.
        let shares = compute_shares(&[contribution(1, 29.0), contribution(2, 71.0)], 100)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![29, 71]);
    }

    #[test]
    fn remainder_is_lost() {
        let shares = compute_shares(
            &[contribution(1, 1.0), contribution(2, 1.0), contribution(3, 1.0)],
            100,
        )
        .unwrap()
        .unwrap();
        assert_eq!(amounts(&shares), vec![33, 33, 33]);
        let sum: i64 = amounts(&shares).iter().sum();
        assert!(sum <= 100 && sum > 100 - 3);
    }

    #[test]
    fn tiny_contributors_get_zero() {
        let shares = compute_shares(&[contribution(1, 999.0), contribution(2, 0.5)], 10)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![9, 0]);
    }

    #[test]
    fn zero_total_is_none() {
        assert_eq!(compute_shares(&[], 100).unwrap(), None);
        assert_eq!(compute_shares(&[contribution(1, 0.0)], 100).unwrap(), None);
        assert_eq!(
            compute_shares(&[contribution(1, 5.0), contribution(2, -5.0)], 100).unwrap(),
            None
        );
    }

    #[test]
    fn negative_contributions_are_clamped() {
        let shares = compute_shares(&[contribution(1, 30.0), contribution(2, -10.0)], 100)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![100, 0]);
    }

    #[test]
    fn non_positive_pool_yields_zero_shares() {
        let shares = compute_shares(&[contribution(1, 10.0)], -50).unwrap().unwrap();
        assert_eq!(amounts(&shares), vec![0]);
    }

    #[test]
    fn non_finite_damage_is_a_fault() {
        let err = compute_shares(&[contribution(4, f64::NAN)], 100).unwrap_err();
        assert!(matches!(
            err,
            AttributionError::NonFiniteDamage { identity, .. } if identity == IdentityId::new(4)
        ));
        assert!(compute_shares(&[contribution(4, f64::INFINITY)], 100).is_err());
    }

    #[test]
    fn total_is_exact() {
        let contributions = [contribution(1, 12.5), contribution(2, 7.25)];
        let total = scaled_total(&contributions, 1.0).unwrap();
        assert_eq!(total, dec!(19.75));
    }

    #[test]
    fn large_pool_does_not_overflow() {
        let shares = compute_shares(&[contribution(1, 1.0), contribution(2, 3.0)], i64::MAX)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares).len(), 2);
        assert!(shares.iter().all(|s| s.amount > 0));
    }

    #[test]
    fn huge_damage_still_splits() {
        let shares = compute_shares(&[contribution(1, 1.0e29)], 100)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![100]);

        let shares = compute_shares(&[contribution(1, 1.0e27), contribution(2, 1.0e27)], 1000)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![500, 500]);
    }

    #[test]
    fn damage_near_f32_max_splits_proportionally() {
        let big = f64::from(f32::MAX);
        let shares = compute_shares(&[contribution(1, big), contribution(2, big * 0.35)], 100)
            .unwrap()
            .unwrap();
        assert_eq!(amounts(&shares), vec![74, 25]);
    }

    #[test]
    fn huge_damage_with_huge_pool_clamps_to_pool() {
        let shares = compute_shares(&[contribution(1, 3.0e38), contribution(2, 1.0e38)], i64::MAX)
            .unwrap()
            .unwrap();
        assert!(shares.iter().all(|s| (0..=i64::MAX).contains(&s.amount)));
        assert!(shares.first().map(|s| s.amount) > shares.get(1).map(|s| s.amount));
    }
}

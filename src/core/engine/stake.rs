//! Stake sizing for a detected arbitrage opportunity.
//!
//! Pure function, ported from the source system's `calculate_stakes`: given
//! a total stake to deploy and the implied probability of each leg, size
//! each leg so that the payout is equal regardless of which outcome
//! resolves true. Leg `i` gets `total_stake * (1/p_i) / sum(1/p_j)`.

/// Size each leg proportional to the inverse of its implied probability, so
/// total payout is equal across outcomes. Returns an empty vector for an
/// empty input; a leg with `implied_prob <= 0.0` is skipped (its weight
/// would be infinite) and assigned a stake of `0.0`.
#[must_use]
pub fn size_stakes(implied_probs: &[f64], total_stake: f64) -> Vec<f64> {
    let weights: Vec<f64> = implied_probs
        .iter()
        .map(|p| if *p > 0.0 { 1.0 / p } else { 0.0 })
        .collect();
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return vec![0.0; implied_probs.len()];
    }
    weights
        .iter()
        .map(|w| total_stake * w / total_weight)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stakes_sum_to_total() {
        let stakes = size_stakes(&[0.47, 0.48], 1000.0);
        let sum: f64 = stakes.iter().sum();
        assert!((sum - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn lower_implied_prob_gets_larger_stake() {
        let stakes = size_stakes(&[0.3, 0.6], 1000.0);
        assert!(stakes[0] > stakes[1]);
    }

    #[test]
    fn equal_implied_probs_split_evenly() {
        let stakes = size_stakes(&[0.5, 0.5], 1000.0);
        assert!((stakes[0] - stakes[1]).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(size_stakes(&[], 1000.0).is_empty());
    }

    #[test]
    fn zero_implied_prob_gets_zero_stake() {
        let stakes = size_stakes(&[0.0, 0.5], 1000.0);
        assert_eq!(stakes[0], 0.0);
        assert!((stakes[1] - 1000.0).abs() < 1e-6);
    }
}

//! Weighted random selection
//!
//! Agents pick which item to trade by score-weighted draw. The cumulative
//! scan is split out as a pure function over (weights, r) so the boundary
//! semantics stay directly testable.

use rand::Rng;

/// Index of the first element whose cumulative weight reaches `r`.
///
/// With weights [3, 1]: r = 0 lands on the first element, r = 3.5 on the
/// second. Falls back to the last index if `r` exceeds the total.
pub fn pick_index(weights: &[f64], r: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative >= r {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

/// Pick an element with probability proportional to its weight.
///
/// Empty input yields `None`. A non-positive total weight degrades to a
/// uniform pick so callers with all-zero scores still make progress.
pub fn weighted_choice<'a, T>(choices: &'a [(T, f64)], rng: &mut impl Rng) -> Option<&'a T> {
    if choices.is_empty() {
        return None;
    }

    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        let idx = rng.gen_range(0..choices.len());
        return Some(&choices[idx].0);
    }

    let r = rng.gen_range(0.0..total);
    let weights: Vec<f64> = choices.iter().map(|(_, w)| *w).collect();
    Some(&choices[pick_index(&weights, r)].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_pick_index_boundaries() {
        let weights = [3.0, 1.0];
        assert_eq!(pick_index(&weights, 0.0), 0);
        assert_eq!(pick_index(&weights, 3.0), 0);
        assert_eq!(pick_index(&weights, 3.5), 1);
        assert_eq!(pick_index(&weights, 4.0), 1);
    }

    #[test]
    fn test_pick_index_overflow_clamps_to_last() {
        let weights = [1.0, 2.0];
        assert_eq!(pick_index(&weights, 100.0), 1);
    }

    #[test]
    fn test_empty_returns_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let choices: Vec<(&str, f64)> = Vec::new();
        assert!(weighted_choice(&choices, &mut rng).is_none());
    }

    #[test]
    fn test_zero_total_uniform_fallback() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let choices = [("a", 0.0), ("b", 0.0), ("c", 0.0)];

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(*weighted_choice(&choices, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3, "uniform fallback should reach every element");
    }

    #[test]
    fn test_heavy_weight_dominates() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let choices = [("heavy", 99.0), ("light", 1.0)];

        let mut heavy = 0;
        for _ in 0..500 {
            if *weighted_choice(&choices, &mut rng).unwrap() == "heavy" {
                heavy += 1;
            }
        }
        assert!(heavy > 450, "expected heavy element to dominate, got {heavy}");
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let choices = [("a", 1.0), ("b", 2.0), ("c", 3.0)];

        let picks = |seed: u64| -> Vec<&str> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..20)
                .map(|_| *weighted_choice(&choices, &mut rng).unwrap())
                .collect()
        };

        assert_eq!(picks(11), picks(11));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_pick_index_is_first_cumulative_crossing(
                weights in proptest::collection::vec(0.0f64..10.0, 1..12),
                fraction in 0.0f64..1.0,
            ) {
                let total: f64 = weights.iter().sum();
                prop_assume!(total > 0.0);

                let r = fraction * total;
                let idx = pick_index(&weights, r);
                prop_assert!(idx < weights.len());

                // Same left-to-right summation as the scan, so exact
                let before: f64 = weights[..idx].iter().sum();
                prop_assert!(before + weights[idx] >= r);
                prop_assert!(idx == 0 || before < r);
            }
        }
    }
}

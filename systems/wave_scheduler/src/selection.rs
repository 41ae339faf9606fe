//! Weighted variant selection.

use rand::Rng;
use typer_drive_core::VariantWeight;

/// Draws one variant from `variants` according to their weights.
///
/// Returns `None` only when `variants` is empty.
pub fn select<'a, R>(variants: &'a [VariantWeight], rng: &mut R) -> Option<&'a VariantWeight>
where
    R: Rng + ?Sized,
{
    if variants.is_empty() {
        return None;
    }
    pick(variants, rng.gen::<f64>())
}

/// Resolves a roll in `[0, 1)` against the normalized weights.
///
/// Weights are accumulated in configured order and the first variant whose
/// cumulative share exceeds `roll` wins. Non-finite or non-positive weights
/// count as zero. When nothing exceeds the roll, the first variant is
/// returned.
#[must_use]
pub fn pick(variants: &[VariantWeight], roll: f64) -> Option<&VariantWeight> {
    let total: f64 = variants.iter().map(effective_weight).sum();
    if total > 0.0 {
        let mut cumulative = 0.0;
        for variant in variants {
            cumulative += effective_weight(variant) / total;
            if cumulative > roll {
                return Some(variant);
            }
        }
    }
    variants.first()
}

fn effective_weight(variant: &VariantWeight) -> f64 {
    if variant.weight.is_finite() && variant.weight > 0.0 {
        variant.weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table(weights: &[(&str, f64)]) -> Vec<VariantWeight> {
        weights
            .iter()
            .map(|(name, weight)| VariantWeight::new(*name, *weight))
            .collect()
    }

    #[test]
    fn weights_need_not_sum_to_one() {
        let variants = table(&[("plain", 3.0), ("tank", 1.0)]);
        assert_eq!(pick(&variants, 0.74).map(|v| v.variant.as_str()), Some("plain"));
        assert_eq!(pick(&variants, 0.76).map(|v| v.variant.as_str()), Some("tank"));
    }

    #[test]
    fn falls_back_to_first_variant() {
        let variants = table(&[("plain", 0.0), ("tank", -2.0)]);
        assert_eq!(pick(&variants, 0.5).map(|v| v.variant.as_str()), Some("plain"));
        assert_eq!(
            pick(&table(&[("plain", 1.0)]), 1.0).map(|v| v.variant.as_str()),
            Some("plain")
        );
        assert!(pick(&[], 0.1).is_none());
    }

    #[test]
    fn empirical_frequencies_track_weights() {
        let variants = table(&[("plain", 0.7), ("tank", 0.3)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let draws = 10_000;
        let plain = (0..draws)
            .filter(|_| select(&variants, &mut rng).map(|v| v.variant.as_str()) == Some("plain"))
            .count();
        let share = plain as f64 / f64::from(draws);
        assert!((share - 0.7).abs() <= 0.03, "plain share {share}");
    }
}

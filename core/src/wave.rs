//! Per-wave configuration values produced by the escalation table.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One-based index of a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Creates a new wave number wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying wave index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the following wave.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Relative likelihood of a named variant being selected for a queue entry.
///
/// Weights need not sum to one; they are normalized at selection time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantWeight {
    /// Name the factory resolves into a constructor.
    pub variant: String,
    /// Unnormalized weight.
    pub weight: f64,
}

impl VariantWeight {
    /// Creates a weighted variant entry.
    #[must_use]
    pub fn new(variant: impl Into<String>, weight: f64) -> Self {
        Self {
            variant: variant.into(),
            weight,
        }
    }
}

/// Immutable description of a single wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveConfig {
    wave: WaveNumber,
    mob_count: u32,
    variants: Vec<VariantWeight>,
    spawn_interval: Duration,
    difficulty: f32,
    boss: bool,
}

impl WaveConfig {
    /// Creates a wave configuration.
    #[must_use]
    pub fn new(
        wave: WaveNumber,
        mob_count: u32,
        variants: Vec<VariantWeight>,
        spawn_interval: Duration,
        difficulty: f32,
        boss: bool,
    ) -> Self {
        Self {
            wave,
            mob_count,
            variants,
            spawn_interval,
            difficulty,
            boss,
        }
    }

    /// Wave described by the configuration.
    #[must_use]
    pub const fn wave(&self) -> WaveNumber {
        self.wave
    }

    /// Number of regular mobs drawn from the variant table.
    #[must_use]
    pub const fn mob_count(&self) -> u32 {
        self.mob_count
    }

    /// Variants allowed in the wave together with their weights.
    #[must_use]
    pub fn variants(&self) -> &[VariantWeight] {
        &self.variants
    }

    /// Delay between two consecutive spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Difficulty scalar in `0.0..=1.0`.
    #[must_use]
    pub const fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Whether a boss closes the wave's queue.
    #[must_use]
    pub const fn has_boss(&self) -> bool {
        self.boss
    }

    /// Total queue entries the wave generates, boss included.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.mob_count as usize + usize::from(self.boss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_wave_adds_one_queue_entry() {
        let config = WaveConfig::new(
            WaveNumber::new(5),
            11,
            vec![VariantWeight::new("plain", 1.0)],
            Duration::from_millis(900),
            0.8,
            true,
        );
        assert_eq!(config.queue_len(), 12);
    }

    #[test]
    fn variant_weight_parses_from_toml() {
        let parsed: VariantWeight =
            toml::from_str("variant = \"tank\"\nweight = 0.3\n").expect("valid toml");
        assert_eq!(parsed, VariantWeight::new("tank", 0.3));
    }
}

//! Serializable tuning for the wave scheduler.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typer_drive_core::{mob::DEFAULT_SHIELD_KEY, ConfigurationError, MobKind};

const DEFAULT_TOTAL_WAVES: u32 = 10;
const DEFAULT_SEED: u64 = 0x7970_6572_6472_6976;
const DEFAULT_INITIAL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_MIN_INTERVAL_MS: u64 = 700;
const DEFAULT_INTERVAL_DECAY: f64 = 0.85;
const DEFAULT_BASE_MOB_COUNT: u32 = 5;
const DEFAULT_MOB_GROWTH: f64 = 1.5;
const DEFAULT_BOSS_EVERY: u32 = 5;
const DEFAULT_AUTO_ADVANCE_MS: u64 = 3_000;
const DEFAULT_WIDTH: f32 = 800.0;
/// Largest accepted per-wave growth of the regular mob count.
pub const MAX_MOB_GROWTH: f64 = 100.0;
const DEFAULT_HEIGHT: f32 = 600.0;

/// Dimensions of the playfield mobs spawn into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    /// Horizontal extent; regular mobs appear 50 units beyond it.
    pub width: f32,
    /// Vertical extent; regular mobs appear at least 50 units from each edge.
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Variant that becomes eligible from a given wave onward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantUnlock {
    /// Name the factory resolves.
    pub variant: String,
    /// First wave the variant may appear in.
    pub from_wave: u32,
    /// Relative selection weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl VariantUnlock {
    /// Creates an unlock entry.
    #[must_use]
    pub fn new(variant: impl Into<String>, from_wave: u32, weight: f64) -> Self {
        Self {
            variant: variant.into(),
            from_wave,
            weight,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Complete scheduler configuration; every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of waves in the run.
    pub total_waves: u32,
    /// Global seed from which every wave's generator is derived.
    pub seed: u64,
    /// Spawn interval of the first wave, in milliseconds.
    pub initial_interval_ms: u64,
    /// Lower bound the spawn interval decays toward, in milliseconds.
    pub min_interval_ms: u64,
    /// Per-wave decay factor applied to the interval above the floor.
    pub interval_decay: f64,
    /// Regular mobs in the first wave.
    pub base_mob_count: u32,
    /// Additional regular mobs per subsequent wave.
    pub mob_growth: f64,
    /// Every n-th wave carries a boss; zero disables the cadence.
    pub boss_every: u32,
    /// Delay before the next wave starts automatically; `None` waits for the host.
    pub auto_advance_ms: Option<u64>,
    /// Spawn area.
    pub playfield: Playfield,
    /// Characters mobs draw their letters from.
    pub letters: Vec<char>,
    /// Shield key assigned to shielded mobs.
    pub shield_key: char,
    /// Variants and the wave each one unlocks at, in selection order.
    pub unlocks: Vec<VariantUnlock>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            total_waves: DEFAULT_TOTAL_WAVES,
            seed: DEFAULT_SEED,
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL_MS,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            interval_decay: DEFAULT_INTERVAL_DECAY,
            base_mob_count: DEFAULT_BASE_MOB_COUNT,
            mob_growth: DEFAULT_MOB_GROWTH,
            boss_every: DEFAULT_BOSS_EVERY,
            auto_advance_ms: Some(DEFAULT_AUTO_ADVANCE_MS),
            playfield: Playfield::default(),
            letters: ('a'..='z').collect(),
            shield_key: DEFAULT_SHIELD_KEY,
            unlocks: default_unlocks(),
        }
    }
}

impl SchedulerConfig {
    /// Delay before auto-advancing, if enabled.
    #[must_use]
    pub fn auto_advance(&self) -> Option<Duration> {
        self.auto_advance_ms.map(Duration::from_millis)
    }

    /// Checks the numeric tuning and that every wave has at least one
    /// positively weighted variant.
    ///
    /// # Errors
    ///
    /// Reports [`ConfigurationError::InvalidTuning`] for a decay outside
    /// `[0, 1]` or a growth that is negative, not finite or above
    /// [`MAX_MOB_GROWTH`]; otherwise the first wave whose table is empty or
    /// carries no positive weight.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.interval_decay) {
            return Err(ConfigurationError::InvalidTuning {
                field: "interval_decay",
            });
        }
        if !(0.0..=MAX_MOB_GROWTH).contains(&self.mob_growth) {
            return Err(ConfigurationError::InvalidTuning {
                field: "mob_growth",
            });
        }
        for wave in 1..=self.total_waves {
            let mut unlocked = self
                .unlocks
                .iter()
                .filter(|unlock| unlock.from_wave <= wave)
                .peekable();
            if unlocked.peek().is_none() {
                return Err(ConfigurationError::EmptyVariantTable { wave });
            }
            if !unlocked.any(|unlock| unlock.weight.is_finite() && unlock.weight > 0.0) {
                return Err(ConfigurationError::NonPositiveWeights { wave });
            }
        }
        Ok(())
    }
}

/// Unlock table of the built-in campaign: one new variant per wave up to
/// wave eight, all equally weighted.
#[must_use]
pub fn default_unlocks() -> Vec<VariantUnlock> {
    [
        (MobKind::Plain, 1),
        (MobKind::Tank, 2),
        (MobKind::Armored, 3),
        (MobKind::Speedster, 4),
        (MobKind::Shielded, 5),
        (MobKind::Stealth, 6),
        (MobKind::Regenerator, 7),
        (MobKind::Split, 8),
    ]
    .into_iter()
    .map(|(kind, from_wave)| VariantUnlock::new(kind.name(), from_wave, default_weight()))
    .collect()
}

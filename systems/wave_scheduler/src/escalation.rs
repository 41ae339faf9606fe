//! Deterministic per-wave escalation table.

use std::time::Duration;

use typer_drive_core::{RangeError, VariantWeight, WaveConfig, WaveNumber};

use crate::{SchedulerConfig, MAX_MOB_GROWTH};

const BASE_DIFFICULTY: f32 = 0.3;
const DIFFICULTY_SPAN: f32 = 0.7;

/// Builds the configuration of `wave`.
///
/// # Errors
///
/// Returns [`RangeError::WaveOutOfRange`] when `wave` is outside
/// `1..=total_waves`.
pub fn wave_config(config: &SchedulerConfig, wave: WaveNumber) -> Result<WaveConfig, RangeError> {
    check_range(config, wave)?;
    Ok(WaveConfig::new(
        wave,
        mob_count(config, wave),
        unlocked_variants(config, wave),
        spawn_interval(config, wave),
        difficulty(config, wave),
        is_boss_wave(config, wave),
    ))
}

pub(crate) fn check_range(config: &SchedulerConfig, wave: WaveNumber) -> Result<(), RangeError> {
    if wave.get() == 0 || wave.get() > config.total_waves {
        return Err(RangeError::WaveOutOfRange {
            requested: wave.get(),
            total: config.total_waves,
        });
    }
    Ok(())
}

fn mob_count(config: &SchedulerConfig, wave: WaveNumber) -> u32 {
    let rate = if config.mob_growth.is_finite() {
        config.mob_growth.clamp(0.0, MAX_MOB_GROWTH)
    } else {
        0.0
    };
    let growth = (f64::from(wave.get() - 1) * rate).floor();
    config.base_mob_count.saturating_add(growth as u32)
}

fn unlocked_variants(config: &SchedulerConfig, wave: WaveNumber) -> Vec<VariantWeight> {
    config
        .unlocks
        .iter()
        .filter(|unlock| unlock.from_wave <= wave.get())
        .map(|unlock| VariantWeight::new(unlock.variant.clone(), unlock.weight))
        .collect()
}

/// Exponential decay from the initial interval toward the floor.
fn spawn_interval(config: &SchedulerConfig, wave: WaveNumber) -> Duration {
    let floor = config.min_interval_ms.min(config.initial_interval_ms) as f64;
    let initial = config.initial_interval_ms as f64;
    let decay = if config.interval_decay.is_finite() {
        config.interval_decay.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let exponent = i32::try_from(wave.get() - 1).unwrap_or(i32::MAX);
    let millis = floor + (initial - floor) * decay.powi(exponent);
    Duration::try_from_secs_f64(millis / 1_000.0)
        .unwrap_or_else(|_| Duration::from_millis(config.min_interval_ms))
}

fn difficulty(config: &SchedulerConfig, wave: WaveNumber) -> f32 {
    let progress = wave.get() as f32 / config.total_waves.max(1) as f32;
    (BASE_DIFFICULTY + progress * DIFFICULTY_SPAN).min(1.0)
}

fn is_boss_wave(config: &SchedulerConfig, wave: WaveNumber) -> bool {
    let cadence = config.boss_every != 0 && wave.get() % config.boss_every == 0;
    cadence || wave.get() == config.total_waves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(total_waves: u32) -> SchedulerConfig {
        SchedulerConfig {
            total_waves,
            ..SchedulerConfig::default()
        }
    }

    #[test]
    fn first_wave_matches_base_values() {
        let wave = wave_config(&config(10), WaveNumber::new(1)).expect("in range");
        assert_eq!(wave.mob_count(), 5);
        assert_eq!(wave.spawn_interval(), Duration::from_millis(2_000));
        assert!((wave.difficulty() - 0.37).abs() < 1e-5);
        assert!(!wave.has_boss());
        let names: Vec<&str> = wave.variants().iter().map(|v| v.variant.as_str()).collect();
        assert_eq!(names, vec!["plain"]);
    }

    #[test]
    fn counts_grow_and_variants_unlock() {
        let wave = wave_config(&config(10), WaveNumber::new(4)).expect("in range");
        assert_eq!(wave.mob_count(), 5 + 4);
        let names: Vec<&str> = wave.variants().iter().map(|v| v.variant.as_str()).collect();
        assert_eq!(names, vec!["plain", "tank", "armored", "speedster"]);
    }

    #[test]
    fn interval_decays_monotonically_toward_floor() {
        let config = config(40);
        let mut previous = Duration::MAX;
        for wave in 1..=40 {
            let interval = wave_config(&config, WaveNumber::new(wave))
                .expect("in range")
                .spawn_interval();
            assert!(interval <= previous);
            assert!(interval >= Duration::from_millis(700));
            previous = interval;
        }
        assert!(previous < Duration::from_millis(705));
    }

    #[test]
    fn boss_on_cadence_and_final_wave() {
        let config = config(7);
        let bosses: Vec<u32> = (1..=7)
            .filter(|wave| {
                wave_config(&config, WaveNumber::new(*wave))
                    .expect("in range")
                    .has_boss()
            })
            .collect();
        assert_eq!(bosses, vec![5, 7]);
    }

    #[test]
    fn difficulty_saturates_at_one() {
        let wave = wave_config(&config(3), WaveNumber::new(3)).expect("in range");
        assert!((wave.difficulty() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unchecked_non_finite_tuning_stays_total() {
        let broken = SchedulerConfig {
            interval_decay: f64::NAN,
            mob_growth: f64::INFINITY,
            ..config(5)
        };
        for wave in 1..=5 {
            let wave = wave_config(&broken, WaveNumber::new(wave)).expect("in range");
            assert_eq!(wave.spawn_interval(), Duration::from_millis(2_000));
            assert_eq!(wave.mob_count(), 5);
        }

        let steep = SchedulerConfig {
            mob_growth: f64::MAX,
            ..config(3)
        };
        let last = wave_config(&steep, WaveNumber::new(3)).expect("in range");
        assert_eq!(last.mob_count(), 5 + 200);
    }

    #[test]
    fn out_of_range_waves_are_rejected() {
        let config = config(3);
        for requested in [0, 4] {
            assert_eq!(
                wave_config(&config, WaveNumber::new(requested)),
                Err(RangeError::WaveOutOfRange {
                    requested,
                    total: 3
                })
            );
        }
    }
}

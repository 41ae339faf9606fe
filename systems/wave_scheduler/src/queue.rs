//! Spawn queue generation for a single wave.

use std::collections::VecDeque;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use typer_drive_core::{ConfigurationError, MobKind, MobSpec, Position, WaveConfig, WaveNumber};

use crate::{selection, SchedulerConfig};

const RNG_STREAM_SPAWN_QUEUE: &str = "spawn-queue";
const BASE_SPEED: f32 = 50.0;
const SPEED_PER_DIFFICULTY: f32 = 30.0;
const BOSS_BASE_SPEED: f32 = 30.0;
const BOSS_SPEED_PER_DIFFICULTY: f32 = 20.0;
const SPAWN_MARGIN: f32 = 50.0;
const BOSS_SPAWN_MARGIN: f32 = 100.0;

/// Builds the queue of pending specs for `wave`.
///
/// Problems that prevent regular entries from being generated are returned
/// alongside the queue so the caller can report them.
pub(crate) fn generate(
    config: &SchedulerConfig,
    wave: &WaveConfig,
) -> (VecDeque<MobSpec>, Option<ConfigurationError>) {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(config.seed, wave.wave()));
    let mut queue = VecDeque::with_capacity(wave.queue_len());
    let mut problem = None;

    if wave.variants().is_empty() {
        problem = Some(ConfigurationError::EmptyVariantTable {
            wave: wave.wave().get(),
        });
    } else {
        for _ in 0..wave.mob_count() {
            let Some(selected) = selection::select(wave.variants(), &mut rng) else {
                break;
            };
            let spec = regular_spec(config, &selected.variant, wave.difficulty(), &mut rng);
            queue.push_back(spec);
        }
    }

    if wave.has_boss() {
        queue.push_back(boss_spec(config, wave.difficulty(), &mut rng));
    }

    (queue, problem)
}

fn regular_spec(
    config: &SchedulerConfig,
    variant: &str,
    difficulty: f32,
    rng: &mut ChaCha8Rng,
) -> MobSpec {
    let kind = MobKind::from_name(variant).unwrap_or(MobKind::Plain);
    let (min_letters, max_letters) = kind.letter_count_range();
    let count = rng.gen_range(min_letters..=max_letters);
    let letters = draw_letters(&config.letters, count, rng);
    let speed = (BASE_SPEED + difficulty * SPEED_PER_DIFFICULTY) * kind.speed_multiplier();
    let position = Position::new(
        config.playfield.width + SPAWN_MARGIN,
        spawn_row(config.playfield.height, rng),
    );

    let spec = MobSpec::new(variant, letters, speed, position);
    if kind == MobKind::Shielded {
        spec.with_shield_key(config.shield_key)
    } else {
        spec
    }
}

fn boss_spec(config: &SchedulerConfig, difficulty: f32, rng: &mut ChaCha8Rng) -> MobSpec {
    let (min_letters, max_letters) = MobKind::Boss.letter_count_range();
    let count = rng.gen_range(min_letters..=max_letters);
    let speed = (BOSS_BASE_SPEED + difficulty * BOSS_SPEED_PER_DIFFICULTY)
        * MobKind::Boss.speed_multiplier();
    MobSpec::new(
        MobKind::Boss.name(),
        draw_letters(&config.letters, count, rng),
        speed,
        Position::new(
            config.playfield.width + BOSS_SPAWN_MARGIN,
            config.playfield.height / 2.0,
        ),
    )
}

fn draw_letters(pool: &[char], count: usize, rng: &mut ChaCha8Rng) -> Vec<char> {
    (0..count)
        .filter_map(|_| pool.choose(rng).copied())
        .collect()
}

fn spawn_row(height: f32, rng: &mut ChaCha8Rng) -> f32 {
    let low = SPAWN_MARGIN;
    let high = height - SPAWN_MARGIN;
    if high > low {
        rng.gen_range(low..high)
    } else {
        height / 2.0
    }
}

fn derive_wave_seed(global_seed: u64, wave: WaveNumber) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.get().to_le_bytes());
    hasher.update(RNG_STREAM_SPAWN_QUEUE.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

//! Scripted typist that plays the game headlessly.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use typer_drive_core::{MobSnapshot, MobView, VariantState};

const FUMBLE_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Types the closest visible mob's next character at a steady rate.
#[derive(Debug)]
pub(crate) struct ScriptedTypist {
    rng: ChaCha8Rng,
    accuracy: f64,
    keystroke_interval: Duration,
    accumulator: Duration,
}

impl ScriptedTypist {
    /// Creates a typist hitting `keys_per_second` keys, each correct with
    /// probability `accuracy`.
    pub(crate) fn new(seed: u64, accuracy: f64, keys_per_second: f64) -> Self {
        let keystroke_interval = if keys_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / keys_per_second)
        } else {
            Duration::MAX
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            keystroke_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Characters typed during the next `dt` against the current field.
    pub(crate) fn keystrokes(&mut self, dt: Duration, mobs: &MobView) -> Vec<char> {
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut typed = Vec::new();
        while self.accumulator >= self.keystroke_interval {
            self.accumulator -= self.keystroke_interval;
            let Some(target) = closest_target(mobs) else {
                continue;
            };
            let Some(intended) = intended_key(target) else {
                continue;
            };
            if self.rng.gen_bool(self.accuracy) {
                typed.push(intended);
            } else {
                typed.push(self.fumble(intended));
            }
        }
        typed
    }

    fn fumble(&mut self, intended: char) -> char {
        loop {
            let index = self.rng.gen_range(0..FUMBLE_LETTERS.len());
            let candidate = char::from(FUMBLE_LETTERS[index]);
            if !candidate.eq_ignore_ascii_case(&intended) {
                return candidate;
            }
        }
    }
}

fn closest_target(mobs: &MobView) -> Option<&MobSnapshot> {
    mobs.iter()
        .filter(|mob| mob.accepting_input)
        .min_by(|left, right| {
            left.position
                .x
                .total_cmp(&right.position.x)
                .then_with(|| left.id.cmp(&right.id))
        })
}

fn intended_key(mob: &MobSnapshot) -> Option<char> {
    match &mob.state {
        VariantState::Shielded {
            shielded: true,
            shield_key,
        } => Some(*shield_key),
        _ => mob.next_letter(),
    }
}

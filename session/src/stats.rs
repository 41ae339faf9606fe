/// Health the player starts with and can never exceed.
pub const MAX_HEALTH: u32 = 100;
/// Health restored whenever a wave is cleared.
pub const WAVE_CLEAR_HEAL: u32 = 10;

/// Running counters for the host's HUD and end-of-run summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    score: u64,
    damage_taken: u32,
    health: u32,
    keystrokes: u32,
    hits: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            score: 0,
            damage_taken: 0,
            health: MAX_HEALTH,
            keystrokes: 0,
            hits: 0,
        }
    }
}

impl Stats {
    /// Cumulative score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Cumulative damage taken from boundary breaches.
    #[must_use]
    pub const fn damage_taken(&self) -> u32 {
        self.damage_taken
    }

    /// Remaining health in `0..=MAX_HEALTH`.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Whether health reached zero.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Keystrokes dispatched so far.
    #[must_use]
    pub const fn keystrokes(&self) -> u32 {
        self.keystrokes
    }

    /// Keystrokes some mob accepted.
    #[must_use]
    pub const fn hits(&self) -> u32 {
        self.hits
    }

    /// Share of accepted keystrokes in `[0, 1]`; `1.0` before any input.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.keystrokes == 0 {
            1.0
        } else {
            f64::from(self.hits) / f64::from(self.keystrokes)
        }
    }

    pub(crate) fn record_keystroke(&mut self, accepted: bool) {
        self.keystrokes = self.keystrokes.saturating_add(1);
        if accepted {
            self.hits = self.hits.saturating_add(1);
        }
    }

    pub(crate) fn add_score(&mut self, delta: u32) -> u64 {
        self.score = self.score.saturating_add(u64::from(delta));
        self.score
    }

    pub(crate) fn add_damage(&mut self, amount: u32) -> u32 {
        self.damage_taken = self.damage_taken.saturating_add(amount);
        self.health = self.health.saturating_sub(amount);
        self.damage_taken
    }

    /// Restores health up to [`MAX_HEALTH`]; a defeated player stays down.
    pub(crate) fn heal(&mut self, amount: u32) {
        if !self.is_defeated() {
            self.health = self.health.saturating_add(amount).min(MAX_HEALTH);
        }
    }
}

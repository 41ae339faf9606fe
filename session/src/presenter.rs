//! Output seam between the session and whatever draws the game.

use typer_drive_core::{ConfigurationError, EffectKind, MobId, MobSnapshot, Position, WaveNumber};

/// Host-facing notifications produced while the session runs.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// Points were awarded.
    ScoreChanged {
        /// Points gained by this event.
        delta: u32,
        /// Cumulative score after the change.
        total: u64,
    },
    /// A mob breached the boundary.
    PlayerDamaged {
        /// Damage dealt by this breach.
        amount: u32,
        /// Cumulative damage taken.
        total: u32,
        /// Health left after the breach.
        health: u32,
    },
    /// Health ran out; spawning has stopped.
    PlayerDefeated,
    /// A split mob was replaced by its children.
    SpawnSplitMobs {
        /// Mob that split.
        parent: MobId,
        /// Number of children requested.
        children: usize,
    },
    /// A boss entered a new phase.
    BossPhaseChanged {
        /// Boss that changed phase.
        mob: MobId,
        /// One-based phase that became active.
        phase: usize,
    },
    /// A wave began.
    WaveStarted {
        /// Wave that started.
        wave: WaveNumber,
        /// Entries in its spawn queue.
        queued: usize,
    },
    /// A wave was cleared.
    WaveComplete {
        /// Wave that was cleared.
        wave: WaveNumber,
    },
    /// The final wave was cleared.
    AllWavesComplete,
    /// A queued spawn could not be built.
    SpawnSkipped {
        /// Why the spawn was skipped.
        error: ConfigurationError,
    },
    /// No mob accepted a keystroke.
    Miss {
        /// Rejected character.
        character: char,
    },
    /// A keystroke was processed.
    Typed {
        /// Typed character.
        character: char,
        /// Whether a mob accepted it.
        success: bool,
    },
}

/// Receives everything the host needs to present the game.
pub trait Presenter {
    /// Draws one live mob; called for every mob after each update.
    fn render(&mut self, mob: &MobSnapshot);

    /// Plays a one-shot cue.
    fn effect(&mut self, kind: EffectKind, position: Position);

    /// Delivers a notification.
    fn notify(&mut self, notification: &Notification);
}

/// Presenter that discards all output.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render(&mut self, _mob: &MobSnapshot) {}

    fn effect(&mut self, _kind: EffectKind, _position: Position) {}

    fn notify(&mut self, _notification: &Notification) {}
}

//! Presenter that reports the headless run through structured logs.

use tracing::{debug, info, warn};
use typer_drive_core::{EffectKind, MobSnapshot, Position, WaveNumber};
use typer_drive_session::{Notification, Presenter};

/// Counts what a graphical front end would have drawn and logs milestones.
#[derive(Debug, Default)]
pub(crate) struct LogPresenter {
    rendered: u64,
    effects: u64,
    highest_wave: Option<WaveNumber>,
    waves_cleared: u32,
    won: bool,
    defeated: bool,
}

impl LogPresenter {
    pub(crate) fn rendered(&self) -> u64 {
        self.rendered
    }

    pub(crate) fn effects(&self) -> u64 {
        self.effects
    }

    pub(crate) fn highest_wave(&self) -> Option<WaveNumber> {
        self.highest_wave
    }

    pub(crate) fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    pub(crate) fn won(&self) -> bool {
        self.won
    }

    pub(crate) fn defeated(&self) -> bool {
        self.defeated
    }
}

impl Presenter for LogPresenter {
    fn render(&mut self, _mob: &MobSnapshot) {
        self.rendered += 1;
    }

    fn effect(&mut self, kind: EffectKind, position: Position) {
        self.effects += 1;
        debug!(?kind, x = position.x, y = position.y, "effect");
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::WaveStarted { wave, queued } => {
                self.highest_wave = self.highest_wave.max(Some(*wave));
                info!(wave = wave.get(), queued, "WAVE {}", wave.get());
            }
            Notification::WaveComplete { wave } => {
                self.waves_cleared += 1;
                info!(wave = wave.get(), "wave cleared");
            }
            Notification::AllWavesComplete => {
                self.won = true;
                info!("every wave cleared");
            }
            Notification::PlayerDamaged {
                amount,
                total,
                health,
            } => {
                info!(amount, total, health, "a mob broke through");
            }
            Notification::PlayerDefeated => {
                self.defeated = true;
                info!("health ran out");
            }
            Notification::SpawnSkipped { error } => warn!(%error, "spawn skipped"),
            Notification::BossPhaseChanged { mob, phase } => {
                info!(mob = mob.get(), phase, "boss phase changed");
            }
            Notification::SpawnSplitMobs { parent, children } => {
                debug!(parent = parent.get(), children, "mob split");
            }
            Notification::ScoreChanged { delta, total } => debug!(delta, total, "score"),
            Notification::Miss { character } => debug!(%character, "miss"),
            Notification::Typed { .. } => {}
        }
    }
}

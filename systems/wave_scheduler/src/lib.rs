#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that turns an escalation table into timed spawn commands.
//!
//! The scheduler owns the spawn queue of the running wave and the injected
//! [`MobFactory`]. It consumes world events to advance its spawn timer,
//! replace split mobs with their children and detect wave completion, and
//! responds with [`Command::SpawnMob`] batches.

mod config;
mod escalation;
mod queue;
mod selection;

use std::{collections::VecDeque, time::Duration};

use tracing::{debug, info, warn};
use typer_drive_core::{
    Command, ConfigurationError, Event, MobSpec, RangeError, WaveConfig, WaveNumber,
};
use typer_drive_factory::MobFactory;

pub use config::{default_unlocks, Playfield, SchedulerConfig, VariantUnlock, MAX_MOB_GROWTH};
pub use escalation::wave_config;
pub use selection::{pick, select};

#[derive(Debug)]
struct ActiveWave {
    config: WaveConfig,
    queue: VecDeque<MobSpec>,
    accumulator: Duration,
    completion_armed: bool,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Spawning(ActiveWave),
    AwaitingAdvance { next: WaveNumber, remaining: Duration },
    Finished,
}

/// Pure system scheduling mob spawns wave by wave.
#[derive(Debug)]
pub struct WaveScheduler {
    config: SchedulerConfig,
    factory: MobFactory,
    current_wave: Option<WaveNumber>,
    phase: Phase,
}

impl WaveScheduler {
    /// Creates an idle scheduler; no wave runs until [`Self::start_wave`].
    #[must_use]
    pub fn new(config: SchedulerConfig, factory: MobFactory) -> Self {
        Self {
            config,
            factory,
            current_wave: None,
            phase: Phase::Idle,
        }
    }

    /// Configuration the scheduler was built with.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Most recently started wave.
    #[must_use]
    pub fn current_wave(&self) -> Option<WaveNumber> {
        self.current_wave
    }

    /// Number of specs still waiting in the spawn queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        match &self.phase {
            Phase::Spawning(active) => active.queue.len(),
            _ => 0,
        }
    }

    /// Reports whether a wave is currently spawning or awaiting completion.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        matches!(self.phase, Phase::Spawning(_))
    }

    /// Reports whether the final wave has been completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Starts `wave`, replacing whatever the scheduler was doing.
    ///
    /// The first queued spec is instantiated immediately; the rest follow one
    /// per spawn interval as time advances through [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::WaveOutOfRange`] for waves outside
    /// `1..=total_waves`; the scheduler is left untouched.
    pub fn start_wave(
        &mut self,
        wave: WaveNumber,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RangeError> {
        let config = wave_config(&self.config, wave).map_err(|error| {
            warn!(%error, "rejected wave start");
            error
        })?;
        let (queue, problem) = queue::generate(&self.config, &config);
        if let Some(error) = problem {
            warn!(%error, wave = wave.get(), "wave generated without regular mobs");
            out_events.push(Event::SpawnSkipped { error });
        }

        info!(
            wave = wave.get(),
            queued = queue.len(),
            interval_ms = config.spawn_interval().as_millis() as u64,
            boss = config.has_boss(),
            "wave started"
        );
        out_events.push(Event::WaveStarted {
            wave,
            queued: queue.len(),
        });

        let mut active = ActiveWave {
            config,
            queue,
            accumulator: Duration::ZERO,
            completion_armed: false,
        };
        self.spawn_next(&mut active, out_commands, out_events);
        active.completion_armed |= active.queue.is_empty();
        self.current_wave = Some(wave);
        self.phase = Phase::Spawning(active);
        Ok(())
    }

    /// Cancels the spawn timer, completion detection and any pending
    /// auto-advance. Live mobs are left alone.
    pub fn stop_spawning(&mut self) {
        if !matches!(self.phase, Phase::Idle | Phase::Finished) {
            info!(wave = ?self.current_wave, "spawning stopped");
            self.phase = Phase::Idle;
        }
    }

    /// Consumes world events and emits spawn commands.
    ///
    /// `active_mobs` is the size of the active registry at the time the
    /// events were produced.
    pub fn handle(
        &mut self,
        events: &[Event],
        active_mobs: usize,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        let commands_before = out_commands.len();
        let mut elapsed = Duration::ZERO;
        let mut removal_seen = false;

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::MobRemoved { .. } => removal_seen = true,
                Event::SplitRequested { parent, children } => {
                    debug!(
                        parent = parent.get(),
                        children = children.len(),
                        "spawning split children"
                    );
                    self.spawn_specs(children, out_commands, out_events);
                }
                _ => {}
            }
        }

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Spawning(mut active) => {
                active.completion_armed |= removal_seen;
                self.advance_spawn_timer(&mut active, elapsed, out_commands, out_events);
                let pending = active_mobs + (out_commands.len() - commands_before);
                if active.completion_armed {
                    active.completion_armed = false;
                    if active.queue.is_empty() && pending == 0 {
                        self.complete_wave(active.config.wave(), out_events);
                        return;
                    }
                }
                self.phase = Phase::Spawning(active);
            }
            Phase::AwaitingAdvance { next, remaining } => {
                if elapsed >= remaining {
                    if self.start_wave(next, out_commands, out_events).is_err() {
                        self.phase = Phase::Idle;
                    }
                } else {
                    self.phase = Phase::AwaitingAdvance {
                        next,
                        remaining: remaining - elapsed,
                    };
                }
            }
            phase @ (Phase::Idle | Phase::Finished) => self.phase = phase,
        }
    }

    fn advance_spawn_timer(
        &self,
        active: &mut ActiveWave,
        elapsed: Duration,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        if elapsed.is_zero() || active.queue.is_empty() {
            return;
        }
        let interval = active.config.spawn_interval();
        active.accumulator = active.accumulator.saturating_add(elapsed);
        while !active.queue.is_empty() && active.accumulator >= interval {
            active.accumulator -= interval;
            self.spawn_next(active, out_commands, out_events);
        }
    }

    fn spawn_next(
        &self,
        active: &mut ActiveWave,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(spec) = active.queue.pop_front() else {
            return;
        };
        self.spawn_specs(std::slice::from_ref(&spec), out_commands, out_events);
        if active.queue.is_empty() {
            debug!(wave = active.config.wave().get(), "spawn queue drained");
            active.completion_armed = true;
        }
    }

    fn spawn_specs(
        &self,
        specs: &[MobSpec],
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        for spec in specs {
            match self.factory.create(spec) {
                Ok(mob) => {
                    debug!(variant = %spec.variant, letters = spec.letters.len(), "spawning mob");
                    out_commands.push(Command::SpawnMob { mob });
                }
                Err(error) => report_skipped(error, out_events),
            }
        }
    }

    fn complete_wave(&mut self, wave: WaveNumber, out_events: &mut Vec<Event>) {
        info!(wave = wave.get(), "wave complete");
        out_events.push(Event::WaveComplete { wave });

        if wave.get() >= self.config.total_waves {
            info!("all waves complete");
            out_events.push(Event::AllWavesComplete);
            self.phase = Phase::Finished;
            return;
        }

        self.phase = match self.config.auto_advance() {
            Some(delay) => Phase::AwaitingAdvance {
                next: wave.next(),
                remaining: delay,
            },
            None => Phase::Idle,
        };
    }
}

fn report_skipped(error: ConfigurationError, out_events: &mut Vec<Event>) {
    warn!(%error, "skipped spawn");
    out_events.push(Event::SpawnSkipped { error });
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing façade that runs one Typer Drive game.
//!
//! A [`Session`] owns the world, the wave scheduler, the typing dispatcher
//! and a [`Presenter`]. Hosts drive it with [`Session::update`] once per
//! frame and [`Session::on_typed`] once per keystroke; everything happens
//! synchronously inside those calls.

mod presenter;
mod stats;

use std::{collections::BTreeSet, time::Duration};

use tracing::{debug, info};
use typer_drive_core::{Command, Event, MobId, MobView, RangeError, WaveNumber};
use typer_drive_factory::MobFactory;
use typer_drive_system_typing::{self as typing, TypingDispatcher};
use typer_drive_system_wave_scheduler::{SchedulerConfig, WaveScheduler};
use typer_drive_world::{self as world, query, World};

pub use presenter::{Notification, NullPresenter, Presenter};
pub use stats::{Stats, MAX_HEALTH, WAVE_CLEAR_HEAL};

/// Upper bound on scheduler/world round trips within one call.
const MAX_SETTLE_ROUNDS: usize = 64;

/// One running game.
#[derive(Debug)]
pub struct Session<P: Presenter> {
    world: World,
    scheduler: WaveScheduler,
    dispatcher: TypingDispatcher,
    presenter: P,
    stats: Stats,
    dirty: BTreeSet<MobId>,
}

impl<P: Presenter> Session<P> {
    /// Assembles a session from its collaborators.
    #[must_use]
    pub fn new(
        world_config: world::Config,
        scheduler_config: SchedulerConfig,
        factory: MobFactory,
        presenter: P,
    ) -> Self {
        Self {
            world: World::with_config(world_config),
            scheduler: WaveScheduler::new(scheduler_config, factory),
            dispatcher: TypingDispatcher::new(typing::Config::new(world_config.boundary_x())),
            presenter,
            stats: Stats::default(),
            dirty: BTreeSet::new(),
        }
    }

    /// Advances the game by `dt`: timers fire, mobs move, the scheduler
    /// reacts, and the presenter receives the results and a fresh render.
    pub fn update(&mut self, dt: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let log = self.settle(events);
        self.route(&log);

        self.dirty.clear();
        for snapshot in query::mob_view(&self.world).iter() {
            self.presenter.render(snapshot);
        }
    }

    /// Dispatches one keystroke and reports whether any mob accepted it.
    pub fn on_typed(&mut self, character: char) -> bool {
        let view = query::mob_view(&self.world);
        let mut world_events = Vec::new();
        let mut typed_events = Vec::new();
        let registry = &mut self.world;
        let accepted = self.dispatcher.handle(
            character,
            &view,
            |mob, character| {
                let emitted = world_events.len();
                world::apply(
                    registry,
                    Command::OfferKeystroke { mob, character },
                    &mut world_events,
                );
                world_events[emitted..]
                    .iter()
                    .any(|event| matches!(event, Event::KeystrokeAccepted { .. }))
            },
            &mut typed_events,
        );

        self.stats.record_keystroke(accepted);
        let log = self.settle(world_events);
        self.route(&log);
        self.route(&typed_events);
        self.render_dirty();
        accepted
    }

    /// Starts `wave`, replacing the running one.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::WaveOutOfRange`] when `wave` is not a configured
    /// wave; nothing changes in that case.
    pub fn start_wave(&mut self, wave: u32) -> Result<(), RangeError> {
        let mut commands = Vec::new();
        let mut events = Vec::new();
        self.scheduler
            .start_wave(WaveNumber::new(wave), &mut commands, &mut events)?;
        let produced = self.apply_commands(commands);
        events.extend(self.settle(produced));
        self.route(&events);
        self.render_dirty();
        Ok(())
    }

    /// Stops spawning; live mobs keep moving.
    pub fn stop_spawning(&mut self) {
        self.scheduler.stop_spawning();
    }

    /// Removes every mob from the field and cancels their timers.
    pub fn clear_field(&mut self) {
        let events = self.apply_commands(vec![Command::ClearMobs]);
        let log = self.settle(events);
        self.route(&log);
        self.render_dirty();
    }

    /// Snapshot of every live mob.
    #[must_use]
    pub fn mob_view(&self) -> MobView {
        query::mob_view(&self.world)
    }

    /// Score, damage and accuracy counters.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Most recently started wave.
    #[must_use]
    pub fn current_wave(&self) -> Option<WaveNumber> {
        self.scheduler.current_wave()
    }

    /// Reports whether the final wave has been cleared.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    /// Reports whether the player's health ran out.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.stats.is_defeated()
    }

    /// Elapsed simulated time.
    #[must_use]
    pub fn clock(&self) -> Duration {
        query::clock(&self.world)
    }

    /// Read access to the presenter.
    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Consumes the session, returning the presenter.
    #[must_use]
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    fn apply_commands(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }

    /// Feeds world events to the scheduler and applies its commands until
    /// neither side has anything left to say.
    fn settle(&mut self, mut pending: Vec<Event>) -> Vec<Event> {
        let mut log = Vec::new();
        for _ in 0..MAX_SETTLE_ROUNDS {
            if pending.is_empty() {
                return log;
            }
            let mut commands = Vec::new();
            let mut scheduler_events = Vec::new();
            self.scheduler.handle(
                &pending,
                query::active_count(&self.world),
                &mut commands,
                &mut scheduler_events,
            );
            log.append(&mut pending);
            log.append(&mut scheduler_events);
            pending = self.apply_commands(commands);
        }
        debug!(remaining = pending.len(), "settle round limit reached");
        log.append(&mut pending);
        log
    }

    /// Renders every mob that spawned or changed since the last render.
    fn render_dirty(&mut self) {
        for id in std::mem::take(&mut self.dirty) {
            if let Some(snapshot) = query::mob(&self.world, id) {
                self.presenter.render(&snapshot);
            }
        }
    }

    fn record_damage(&mut self, amount: u32) -> Notification {
        let was_defeated = self.stats.is_defeated();
        let total = self.stats.add_damage(amount);
        let notification = Notification::PlayerDamaged {
            amount,
            total,
            health: self.stats.health(),
        };
        if self.stats.is_defeated() && !was_defeated {
            info!(damage = total, "player defeated");
            self.scheduler.stop_spawning();
            self.presenter.notify(&notification);
            return Notification::PlayerDefeated;
        }
        notification
    }

    fn route(&mut self, events: &[Event]) {
        for event in events {
            let notification = match event {
                Event::ScoreChanged { delta } => Notification::ScoreChanged {
                    delta: *delta,
                    total: self.stats.add_score(*delta),
                },
                Event::PlayerDamaged { amount } => self.record_damage(*amount),
                Event::SplitRequested { parent, children } => Notification::SpawnSplitMobs {
                    parent: *parent,
                    children: children.len(),
                },
                Event::BossPhaseChanged { mob, phase } => Notification::BossPhaseChanged {
                    mob: *mob,
                    phase: *phase,
                },
                Event::WaveStarted { wave, queued } => Notification::WaveStarted {
                    wave: *wave,
                    queued: *queued,
                },
                Event::WaveComplete { wave } => {
                    self.stats.heal(WAVE_CLEAR_HEAL);
                    Notification::WaveComplete { wave: *wave }
                }
                Event::AllWavesComplete => Notification::AllWavesComplete,
                Event::SpawnSkipped { error } => Notification::SpawnSkipped {
                    error: error.clone(),
                },
                Event::KeystrokeMissed { character } => Notification::Miss {
                    character: *character,
                },
                Event::KeystrokeTyped { character, success } => Notification::Typed {
                    character: *character,
                    success: *success,
                },
                Event::EffectRequested { kind, position } => {
                    self.presenter.effect(*kind, *position);
                    continue;
                }
                Event::MobSpawned { mob, .. } | Event::MobChanged { mob } => {
                    let _ = self.dirty.insert(*mob);
                    continue;
                }
                Event::MobRemoved { mob, .. } => {
                    let _ = self.dirty.remove(mob);
                    continue;
                }
                Event::TimeAdvanced { .. } | Event::KeystrokeAccepted { .. } => continue,
            };
            self.presenter.notify(&notification);
        }
    }
}

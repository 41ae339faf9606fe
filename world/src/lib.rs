#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Typer Drive.
//!
//! The world owns the active registry of mobs, the simulation clock and the
//! per-mob task table. All mutation happens through [`apply`]; systems read
//! state through the [`query`] module.

mod tasks;

use std::{collections::BTreeMap, time::Duration};

use tracing::debug;
use typer_drive_core::{
    mob::{REGENERATION_DELAY, STEALTH_TOGGLE_PERIOD},
    Command, EffectKind, Event, Mob, MobEffect, MobId, MobKind, RemovalCause, TypedOutcome,
    WELCOME_BANNER,
};

pub use tasks::{ScheduledTask, TaskKind};

use tasks::TaskTable;

/// Default horizontal coordinate at which mobs hurt the player.
pub const DEFAULT_BOUNDARY_X: f32 = 100.0;

const BREACH_DAMAGE: u32 = 1;

/// Tuning values for the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    boundary_x: f32,
    regeneration_delay: Duration,
    stealth_period: Duration,
}

impl Config {
    /// Creates a configuration from the boundary coordinate and timer cadences.
    #[must_use]
    pub const fn new(
        boundary_x: f32,
        regeneration_delay: Duration,
        stealth_period: Duration,
    ) -> Self {
        Self {
            boundary_x,
            regeneration_delay,
            stealth_period,
        }
    }

    /// Horizontal coordinate at which mobs breach the defence.
    #[must_use]
    pub const fn boundary_x(&self) -> f32 {
        self.boundary_x
    }

    /// Idle time after which a regenerator restores a letter.
    #[must_use]
    pub const fn regeneration_delay(&self) -> Duration {
        self.regeneration_delay
    }

    /// Period of the stealth visibility toggle.
    #[must_use]
    pub const fn stealth_period(&self) -> Duration {
        self.stealth_period
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDARY_X, REGENERATION_DELAY, STEALTH_TOGGLE_PERIOD)
    }
}

/// Represents the authoritative Typer Drive world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    mobs: BTreeMap<MobId, Mob>,
    next_mob_id: u32,
    clock: Duration,
    tasks: TaskTable,
}

impl World {
    /// Creates an empty world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty world using the provided configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            banner: WELCOME_BANNER,
            config,
            mobs: BTreeMap::new(),
            next_mob_id: 0,
            clock: Duration::ZERO,
            tasks: TaskTable::default(),
        }
    }

    fn insert(&mut self, mob: Mob, out_events: &mut Vec<Event>) -> MobId {
        let id = MobId::new(self.next_mob_id);
        self.next_mob_id = self.next_mob_id.wrapping_add(1);

        if mob.kind() == MobKind::Stealth {
            let period = self.config.stealth_period;
            self.tasks.schedule(
                id,
                TaskKind::ToggleVisibility,
                self.clock.saturating_add(period),
                Some(period),
            );
        }

        out_events.push(Event::MobSpawned {
            mob: id,
            kind: mob.kind(),
            position: mob.position(),
        });
        debug!(mob = id.get(), kind = mob.kind().name(), "mob spawned");
        let _ = self.mobs.insert(id, mob);
        id
    }

    fn remove(&mut self, id: MobId, cause: RemovalCause, out_events: &mut Vec<Event>) {
        self.tasks.sweep(id);
        if self.mobs.remove(&id).is_some() {
            out_events.push(Event::MobRemoved { mob: id, cause });
            debug!(mob = id.get(), ?cause, "mob removed");
        }
    }

    fn fire_due_tasks(&mut self, out_events: &mut Vec<Event>) {
        while let Some(task) = self.tasks.pop_due(self.clock) {
            let Some(mob) = self.mobs.get_mut(&task.owner) else {
                continue;
            };
            match task.kind {
                TaskKind::Regenerate => {
                    if mob.regenerate() {
                        out_events.push(Event::EffectRequested {
                            kind: EffectKind::Regenerate,
                            position: mob.position(),
                        });
                        out_events.push(Event::MobChanged { mob: task.owner });
                    }
                }
                TaskKind::ToggleVisibility => {
                    if mob.toggle_visibility().is_some() {
                        out_events.push(Event::MobChanged { mob: task.owner });
                    }
                }
            }
        }
    }

    fn advance_mobs(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let boundary_x = self.config.boundary_x;
        let mut breached = Vec::new();
        for (id, mob) in &mut self.mobs {
            mob.advance(dt);
            if mob.has_reached(boundary_x) {
                mob.deactivate();
                breached.push(*id);
            }
        }

        for id in breached {
            out_events.push(Event::PlayerDamaged {
                amount: BREACH_DAMAGE,
            });
            self.remove(id, RemovalCause::ReachedBoundary, out_events);
        }
    }

    fn commit_effects(&mut self, id: MobId, effects: Vec<MobEffect>, out_events: &mut Vec<Event>) {
        let position = self.mobs.get(&id).map(Mob::position).unwrap_or_default();
        let mut cause = RemovalCause::Completed;
        let mut destroyed = false;

        for effect in effects {
            match effect {
                MobEffect::Score(delta) => out_events.push(Event::ScoreChanged { delta }),
                MobEffect::Cue(kind) => out_events.push(Event::EffectRequested { kind, position }),
                MobEffect::ArmRegeneration => self.tasks.schedule(
                    id,
                    TaskKind::Regenerate,
                    self.clock.saturating_add(self.config.regeneration_delay),
                    None,
                ),
                MobEffect::PhaseChanged { phase } => {
                    out_events.push(Event::BossPhaseChanged { mob: id, phase });
                }
                MobEffect::SplitInto { children } => {
                    cause = RemovalCause::Split;
                    out_events.push(Event::SplitRequested {
                        parent: id,
                        children,
                    });
                }
                MobEffect::Destroyed => destroyed = true,
            }
        }

        if destroyed {
            self.remove(id, cause, out_events);
        } else {
            out_events.push(Event::MobChanged { mob: id });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Within a tick, due timers fire in due-time order before any mob moves,
/// and boundary breaches are resolved after movement.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.fire_due_tasks(out_events);
            world.advance_mobs(dt, out_events);
        }
        Command::SpawnMob { mob } => {
            let _ = world.insert(mob, out_events);
        }
        Command::OfferKeystroke { mob, character } => {
            let _ = offer(world, mob, character, out_events);
        }
        Command::ClearMobs => {
            let ids: Vec<MobId> = world.mobs.keys().copied().collect();
            for id in ids {
                world.remove(id, RemovalCause::Cleared, out_events);
            }
            world.tasks.clear();
        }
    }
}

/// Offers `character` to the registered mob `id`, reporting acceptance.
///
/// Unregistered ids reject without emitting events. Accepted keystrokes emit
/// [`Event::KeystrokeAccepted`] followed by the events derived from the mob's
/// effects; a finishing keystroke removes the mob before returning.
pub fn offer(world: &mut World, id: MobId, character: char, out_events: &mut Vec<Event>) -> bool {
    let Some(mob) = world.mobs.get_mut(&id) else {
        return false;
    };
    match mob.on_typed(character) {
        TypedOutcome::Rejected => false,
        TypedOutcome::Accepted(effects) => {
            out_events.push(Event::KeystrokeAccepted { mob: id, character });
            world.commit_effects(id, effects, out_events);
            true
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use typer_drive_core::{MobId, MobSnapshot, MobView};

    use super::{Config, ScheduledTask, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> Config {
        world.config
    }

    /// Elapsed simulated time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Captures a read-only view of every live mob.
    #[must_use]
    pub fn mob_view(world: &World) -> MobView {
        MobView::from_snapshots(
            world
                .mobs
                .iter()
                .map(|(id, mob)| MobSnapshot::capture(*id, mob))
                .collect(),
        )
    }

    /// Captures a snapshot of a single mob, if it is still registered.
    #[must_use]
    pub fn mob(world: &World, id: MobId) -> Option<MobSnapshot> {
        world.mobs.get(&id).map(|mob| MobSnapshot::capture(id, mob))
    }

    /// Number of mobs in the active registry.
    #[must_use]
    pub fn active_count(world: &World) -> usize {
        world.mobs.len()
    }

    /// Tasks currently armed for `id`.
    #[must_use]
    pub fn tasks_for(world: &World, id: MobId) -> Vec<ScheduledTask> {
        world.tasks.owned_by(id)
    }

    /// Total number of armed tasks across all mobs.
    #[must_use]
    pub fn pending_task_count(world: &World) -> usize {
        world.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typer_drive_core::{MobSpec, Position};

    fn spawn(world: &mut World, kind: MobKind, letters: &str, x: f32) -> MobId {
        let spec = MobSpec::new(
            kind.name(),
            letters.chars().collect(),
            100.0,
            Position::new(x, 50.0),
        );
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnMob {
                mob: Mob::new(kind, &spec),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::MobSpawned { mob, .. }] => *mob,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    #[test]
    fn new_world_is_empty() {
        let world = World::new();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::active_count(&world), 0);
        assert_eq!(query::clock(&world), Duration::ZERO);
    }

    #[test]
    fn spawned_mobs_receive_sequential_ids() {
        let mut world = World::new();
        let first = spawn(&mut world, MobKind::Plain, "a", 500.0);
        let second = spawn(&mut world, MobKind::Plain, "b", 500.0);
        assert_eq!(first.get() + 1, second.get());
        assert_eq!(query::active_count(&world), 2);
    }

    #[test]
    fn tick_moves_mobs_toward_boundary() {
        let mut world = World::new();
        let id = spawn(&mut world, MobKind::Tank, "abc", 500.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        let snapshot = query::mob(&world, id).expect("mob alive");
        assert!((snapshot.position.x - 475.0).abs() < 1e-3);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(250)
            }]
        );
    }

    #[test]
    fn completed_mob_leaves_registry_with_score() {
        let mut world = World::new();
        let id = spawn(&mut world, MobKind::Plain, "q", 500.0);
        let mut events = Vec::new();
        assert!(offer(&mut world, id, 'q', &mut events));

        assert!(query::mob(&world, id).is_none());
        assert!(events.contains(&Event::ScoreChanged { delta: 10 }));
        assert!(events.contains(&Event::MobRemoved {
            mob: id,
            cause: RemovalCause::Completed
        }));
        assert!(!offer(&mut world, id, 'q', &mut events));
    }

    #[test]
    fn rejected_keystroke_emits_nothing() {
        let mut world = World::new();
        let id = spawn(&mut world, MobKind::Tank, "abc", 500.0);
        let mut events = Vec::new();
        assert!(!offer(&mut world, id, 'x', &mut events));
        assert!(events.is_empty());
        assert_eq!(query::mob(&world, id).expect("alive").typed, 0);
    }

    #[test]
    fn clear_removes_mobs_and_tasks() {
        let mut world = World::new();
        let _ = spawn(&mut world, MobKind::Stealth, "a", 500.0);
        let _ = spawn(&mut world, MobKind::Tank, "abc", 500.0);
        assert_eq!(query::pending_task_count(&world), 1);

        let mut events = Vec::new();
        apply(&mut world, Command::ClearMobs, &mut events);
        assert_eq!(query::active_count(&world), 0);
        assert_eq!(query::pending_task_count(&world), 0);
        assert_eq!(events.len(), 2);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Typer Drive combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! [`MobView`] snapshots, and respond exclusively with new command batches.
//!
//! The mob state machine itself lives in [`mob`] so that every crate shares a
//! single definition of how a keystroke transforms a mob.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod error;
pub mod mob;
mod wave;

pub use error::{ConfigurationError, RangeError};
pub use mob::{Mob, MobEffect, MobKind, MobSpec, TypedOutcome, VariantState};
pub use wave::{VariantWeight, WaveConfig, WaveNumber};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Typer Drive.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Inserts a fully constructed mob into the active registry.
    SpawnMob {
        /// Mob produced by the factory.
        mob: Mob,
    },
    /// Offers a single typed character to one registered mob.
    OfferKeystroke {
        /// Identifier of the mob receiving the character.
        mob: MobId,
        /// Character typed by the player.
        character: char,
    },
    /// Removes every mob from the active registry and cancels their timers.
    ClearMobs,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a mob entered the active registry.
    MobSpawned {
        /// Identifier assigned to the mob by the registry.
        mob: MobId,
        /// Variant of the spawned mob.
        kind: MobKind,
        /// Position the mob occupies after spawning.
        position: Position,
    },
    /// Reports that a live mob changed state and should be redrawn.
    MobChanged {
        /// Identifier of the mob that changed.
        mob: MobId,
    },
    /// Confirms that a mob left the active registry.
    MobRemoved {
        /// Identifier of the removed mob.
        mob: MobId,
        /// Reason the mob was removed.
        cause: RemovalCause,
    },
    /// Reports that a mob accepted an offered character.
    KeystrokeAccepted {
        /// Identifier of the mob that accepted the character.
        mob: MobId,
        /// Character that was accepted.
        character: char,
    },
    /// Awards points to the player.
    ScoreChanged {
        /// Points gained.
        delta: u32,
    },
    /// Reports that a mob reached the boundary and hurt the player.
    PlayerDamaged {
        /// Amount of damage dealt.
        amount: u32,
    },
    /// Requests that the provided child specs replace a split mob.
    SplitRequested {
        /// Identifier of the mob that split.
        parent: MobId,
        /// Specifications of the children that replace the parent.
        children: Vec<MobSpec>,
    },
    /// Announces that a boss advanced to its next phase.
    BossPhaseChanged {
        /// Identifier of the boss.
        mob: MobId,
        /// One-based phase that became active.
        phase: usize,
    },
    /// Requests a one-shot visual or audio cue.
    EffectRequested {
        /// Kind of cue to play.
        kind: EffectKind,
        /// Location the cue is anchored to.
        position: Position,
    },
    /// Reports that no mob accepted a keystroke.
    KeystrokeMissed {
        /// Character that was rejected.
        character: char,
    },
    /// Reports the outcome of a keystroke, fired once per keystroke.
    KeystrokeTyped {
        /// Character that was typed.
        character: char,
        /// Whether any mob accepted the character.
        success: bool,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// Wave that started.
        wave: WaveNumber,
        /// Number of queue entries generated for the wave.
        queued: usize,
    },
    /// Reports that one queued spawn could not be instantiated.
    SpawnSkipped {
        /// Reason the spawn attempt was rejected.
        error: ConfigurationError,
    },
    /// Announces that a wave finished: its queue and the registry are empty.
    WaveComplete {
        /// Wave that completed.
        wave: WaveNumber,
    },
    /// Announces that the final wave finished.
    AllWavesComplete,
}

/// Reasons a mob may leave the active registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// The player typed the mob's full sequence.
    Completed,
    /// The mob reached the boundary before being defeated.
    ReachedBoundary,
    /// The mob was replaced by split children.
    Split,
    /// The host cleared the playfield.
    Cleared,
}

/// One-shot presentation cues requested by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    /// A correct character struck a mob.
    Hit,
    /// A mob was defeated.
    Destroy,
    /// A regenerator restored a letter.
    Regenerate,
    /// A split mob divided into children.
    Split,
    /// A boss entered a new phase.
    PhaseChange,
    /// A keystroke matched nothing.
    Miss,
}

/// Unique identifier assigned to a mob by the active registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MobId(u32);

impl MobId {
    /// Creates a new mob identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location on the playfield expressed in world units.
///
/// Mobs travel toward decreasing `x`; the boundary sits at a small `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate; smaller values are closer to the player.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the position shifted vertically by `dy`.
    #[must_use]
    pub fn offset_y(self, dy: f32) -> Self {
        Self {
            x: self.x,
            y: self.y + dy,
        }
    }
}

/// Immutable representation of a single mob's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct MobSnapshot {
    /// Unique identifier assigned to the mob.
    pub id: MobId,
    /// Variant of the mob.
    pub kind: MobKind,
    /// Full character sequence the player must type.
    pub letters: Vec<char>,
    /// Number of letters already consumed.
    pub typed: usize,
    /// Current location of the mob.
    pub position: Position,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Whether the mob is still live.
    pub active: bool,
    /// Whether the mob currently reacts to keystrokes (stealth visibility).
    pub accepting_input: bool,
    /// Variant-specific state.
    pub state: VariantState,
}

impl MobSnapshot {
    /// Captures a snapshot of `mob` registered under `id`.
    #[must_use]
    pub fn capture(id: MobId, mob: &Mob) -> Self {
        Self {
            id,
            kind: mob.kind(),
            letters: mob.letters().to_vec(),
            typed: mob.current_index(),
            position: mob.position(),
            speed: mob.speed(),
            active: mob.is_active(),
            accepting_input: mob.accepts_input(),
            state: mob.state().clone(),
        }
    }

    /// Next character the mob expects, if any.
    #[must_use]
    pub fn next_letter(&self) -> Option<char> {
        self.letters.get(self.typed).copied()
    }
}

/// Read-only snapshot describing all live mobs.
#[derive(Clone, Debug, Default)]
pub struct MobView {
    snapshots: Vec<MobSnapshot>,
}

impl MobView {
    /// Creates a new mob view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MobSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mob snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &MobSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for `id`.
    #[must_use]
    pub fn get(&self, id: MobId) -> Option<&MobSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of mobs captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no mobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MobSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{Mob, MobId, MobKind, MobSnapshot, MobSpec, MobView, Position};

    fn snapshot(id: u32, x: f32) -> MobSnapshot {
        let spec = MobSpec::new("tank", vec!['a', 'b'], 10.0, Position::new(x, 0.0));
        MobSnapshot::capture(MobId::new(id), &Mob::new(MobKind::Tank, &spec))
    }

    #[test]
    fn view_orders_snapshots_by_id() {
        let view = MobView::from_snapshots(vec![snapshot(7, 1.0), snapshot(2, 5.0)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 7]);
    }

    #[test]
    fn view_lookup_finds_captured_mob() {
        let view = MobView::from_snapshots(vec![snapshot(3, 1.0), snapshot(9, 5.0)]);
        let found = view.get(MobId::new(9)).expect("mob 9 captured");
        assert_eq!(found.position, Position::new(5.0, 0.0));
        assert!(view.get(MobId::new(4)).is_none());
    }

    #[test]
    fn snapshot_reports_next_letter() {
        let captured = snapshot(1, 0.0);
        assert_eq!(captured.next_letter(), Some('a'));
    }

    #[test]
    fn offset_moves_only_vertical_axis() {
        let moved = Position::new(4.0, 10.0).offset_y(-30.0);
        assert_eq!(moved, Position::new(4.0, -20.0));
    }
}

//! Mob state machine.
//!
//! A [`Mob`] couples the shared progress fields (letters, typed index,
//! speed, position) with a tagged [`VariantState`]. Every keystroke is routed
//! through [`Mob::on_typed`], which asks the variant's transition function for
//! the next progress, next state and the effects to publish, and only then
//! commits all three at once. A rejected character therefore never mutates
//! the mob.
//!
//! Timers are not owned by mobs. A regenerator merely reports
//! [`MobEffect::ArmRegeneration`]; the world keeps the delay in its task table
//! and calls [`Mob::regenerate`] when it expires. Stealth visibility is
//! toggled the same way through [`Mob::toggle_visibility`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EffectKind, Position};

/// Points awarded for defeating a plain mob.
pub const PLAIN_SCORE: u32 = 10;
/// Points awarded per letter when a multi-letter mob is completed.
pub const SCORE_PER_LETTER: u32 = 10;
/// Points awarded for stripping an armored mob's armor.
pub const ARMOR_BREAK_SCORE: u32 = 5;
/// Points awarded for finishing an armored mob.
pub const ARMORED_KILL_SCORE: u32 = 15;
/// Points awarded for breaking a shield.
pub const SHIELD_BREAK_SCORE: u32 = 5;
/// Points awarded for defeating a stealth mob.
pub const STEALTH_SCORE: u32 = 15;
/// Bonus added to a boss's completion score.
pub const BOSS_BONUS: u32 = 50;
/// Shield key used when a spec does not provide one.
pub const DEFAULT_SHIELD_KEY: char = '#';
/// Delay after the last correct match before a regenerator restores a letter.
pub const REGENERATION_DELAY: Duration = Duration::from_millis(1_000);
/// Period of a stealth mob's visibility toggle.
pub const STEALTH_TOGGLE_PERIOD: Duration = Duration::from_millis(500);
/// Minimum sequence length of a split mob.
pub const SPLIT_MIN_LETTERS: usize = 6;
/// Speed factor applied to split children.
pub const SPLIT_SPEED_FACTOR: f32 = 1.2;
/// Vertical distance between a split parent and each child.
pub const SPLIT_VERTICAL_OFFSET: f32 = 30.0;
/// Letters covered by one boss phase.
pub const BOSS_LETTERS_PER_PHASE: usize = 3;

const FILLER_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Variants a mob may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MobKind {
    /// Single letter, destroyed on the first match.
    Plain,
    /// Multi-letter word typed in order.
    Tank,
    /// Two letters; the first strips armor.
    Armored,
    /// Word guarded by a shield key.
    Shielded,
    /// Word that restores typed letters after a pause.
    Regenerator,
    /// Word that divides into two tanks halfway through.
    Split,
    /// Single letter that blinks in and out of view.
    Stealth,
    /// Short word travelling at double speed.
    Speedster,
    /// Long word split into health phases.
    Boss,
}

impl MobKind {
    /// Every variant in declaration order.
    pub const ALL: [MobKind; 9] = [
        MobKind::Plain,
        MobKind::Tank,
        MobKind::Armored,
        MobKind::Shielded,
        MobKind::Regenerator,
        MobKind::Split,
        MobKind::Stealth,
        MobKind::Speedster,
        MobKind::Boss,
    ];

    /// Canonical lowercase name used by factories and configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Tank => "tank",
            Self::Armored => "armored",
            Self::Shielded => "shielded",
            Self::Regenerator => "regenerator",
            Self::Split => "split",
            Self::Stealth => "stealth",
            Self::Speedster => "speedster",
            Self::Boss => "boss",
        }
    }

    /// Resolves a canonical name back into a variant.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Factor applied once to the wave's base speed when building a spec.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Plain | Self::Stealth => 1.0,
            Self::Tank | Self::Split => 0.8,
            Self::Armored | Self::Regenerator => 0.9,
            Self::Shielded => 0.85,
            Self::Speedster => 2.0,
            Self::Boss => 0.7,
        }
    }

    /// Inclusive range of letters generated for the variant.
    #[must_use]
    pub const fn letter_count_range(self) -> (usize, usize) {
        match self {
            Self::Plain | Self::Stealth => (1, 1),
            Self::Armored | Self::Speedster => (2, 2),
            Self::Tank | Self::Regenerator => (3, 5),
            Self::Shielded => (4, 6),
            Self::Split => (SPLIT_MIN_LETTERS, SPLIT_MIN_LETTERS),
            Self::Boss => (8, 12),
        }
    }
}

/// Pending description of a mob before the factory instantiates it.
#[derive(Clone, Debug, PartialEq)]
pub struct MobSpec {
    /// Variant name resolved by the factory.
    pub variant: String,
    /// Characters the player must type.
    pub letters: Vec<char>,
    /// Final travel speed in world units per second.
    pub speed: f32,
    /// Spawn location.
    pub position: Position,
    /// Shield key for shielded mobs; [`DEFAULT_SHIELD_KEY`] when absent.
    pub shield_key: Option<char>,
}

impl MobSpec {
    /// Creates a spec for the named variant.
    #[must_use]
    pub fn new(
        variant: impl Into<String>,
        letters: Vec<char>,
        speed: f32,
        position: Position,
    ) -> Self {
        Self {
            variant: variant.into(),
            letters,
            speed,
            position,
            shield_key: None,
        }
    }

    /// Overrides the shield key.
    #[must_use]
    pub fn with_shield_key(mut self, shield_key: char) -> Self {
        self.shield_key = Some(shield_key);
        self
    }
}

/// Variant-specific state carried by a mob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariantState {
    /// No extra state.
    Plain,
    /// No extra state.
    Tank,
    /// Armor flag cleared by the first correct character.
    Armored {
        /// Whether the armor still stands.
        armor_intact: bool,
    },
    /// Shield that only the shield key removes.
    Shielded {
        /// Whether the shield still stands.
        shielded: bool,
        /// Character that breaks the shield.
        shield_key: char,
    },
    /// Letters consumed since the last regeneration, most recent last.
    Regenerator {
        /// Stack of consumed letters eligible for regeneration.
        regen_stack: Vec<char>,
    },
    /// Whether the split already happened.
    Split {
        /// Set once the children were requested.
        has_split: bool,
    },
    /// Current visibility.
    Stealth {
        /// Whether the mob is visible and typeable.
        visible: bool,
    },
    /// No extra state.
    Speedster,
    /// Phase bookkeeping.
    Boss {
        /// One-based active phase.
        phase: usize,
        /// Letters still required in each phase.
        phase_remaining: Vec<u32>,
    },
}

impl VariantState {
    fn initial(kind: MobKind, letter_count: usize, shield_key: char) -> Self {
        match kind {
            MobKind::Plain => Self::Plain,
            MobKind::Tank => Self::Tank,
            MobKind::Armored => Self::Armored { armor_intact: true },
            MobKind::Shielded => Self::Shielded {
                shielded: true,
                shield_key,
            },
            MobKind::Regenerator => Self::Regenerator {
                regen_stack: Vec::new(),
            },
            MobKind::Split => Self::Split { has_split: false },
            MobKind::Stealth => Self::Stealth { visible: true },
            MobKind::Speedster => Self::Speedster,
            MobKind::Boss => Self::Boss {
                phase: 1,
                phase_remaining: boss_phases(letter_count),
            },
        }
    }

    /// Variant the state belongs to.
    #[must_use]
    pub const fn kind(&self) -> MobKind {
        match self {
            Self::Plain => MobKind::Plain,
            Self::Tank => MobKind::Tank,
            Self::Armored { .. } => MobKind::Armored,
            Self::Shielded { .. } => MobKind::Shielded,
            Self::Regenerator { .. } => MobKind::Regenerator,
            Self::Split { .. } => MobKind::Split,
            Self::Stealth { .. } => MobKind::Stealth,
            Self::Speedster => MobKind::Speedster,
            Self::Boss { .. } => MobKind::Boss,
        }
    }
}

/// Side effects produced by an accepted keystroke.
#[derive(Clone, Debug, PartialEq)]
pub enum MobEffect {
    /// Award points.
    Score(u32),
    /// Play a presentation cue at the mob's position.
    Cue(EffectKind),
    /// (Re)arm the regeneration delay.
    ArmRegeneration,
    /// Boss entered the given one-based phase.
    PhaseChanged {
        /// Phase that became active.
        phase: usize,
    },
    /// Replace the mob with the provided children.
    SplitInto {
        /// Child specs partitioning the parent's letters.
        children: Vec<MobSpec>,
    },
    /// The mob is finished and must leave the registry in the same step.
    Destroyed,
}

/// Result of offering one character to a mob.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedOutcome {
    /// The character did not match; nothing changed.
    Rejected,
    /// The character matched; the effects were committed with the new state.
    Accepted(Vec<MobEffect>),
}

impl TypedOutcome {
    /// Whether the character was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Effects produced by the keystroke; empty when rejected.
    #[must_use]
    pub fn effects(&self) -> &[MobEffect] {
        match self {
            Self::Rejected => &[],
            Self::Accepted(effects) => effects,
        }
    }

    /// Whether the keystroke finished the mob.
    #[must_use]
    pub fn destroys(&self) -> bool {
        self.effects()
            .iter()
            .any(|effect| matches!(effect, MobEffect::Destroyed))
    }
}

/// One combat entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Mob {
    letters: Vec<char>,
    current_index: usize,
    speed: f32,
    position: Position,
    active: bool,
    state: VariantState,
}

impl Mob {
    /// Builds a mob of `kind` from `spec`.
    ///
    /// Split mobs shorter than [`SPLIT_MIN_LETTERS`] are padded with filler
    /// letters continuing the alphabet from the sequence length, so the same
    /// spec always yields the same mob.
    #[must_use]
    pub fn new(kind: MobKind, spec: &MobSpec) -> Self {
        let mut letters = spec.letters.clone();
        if kind == MobKind::Split {
            pad_letters(&mut letters, SPLIT_MIN_LETTERS);
        }
        let shield_key = spec.shield_key.unwrap_or(DEFAULT_SHIELD_KEY);
        let state = VariantState::initial(kind, letters.len(), shield_key);
        Self {
            letters,
            current_index: 0,
            speed: spec.speed,
            position: spec.position,
            active: true,
            state,
        }
    }

    /// Variant of the mob.
    #[must_use]
    pub const fn kind(&self) -> MobKind {
        self.state.kind()
    }

    /// Full character sequence.
    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Number of letters already consumed.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Travel speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Current location.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Whether the mob is live.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Variant-specific state.
    #[must_use]
    pub const fn state(&self) -> &VariantState {
        &self.state
    }

    /// Whether keystrokes can currently reach the mob.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        match self.state {
            VariantState::Stealth { visible } => self.active && visible,
            _ => self.active,
        }
    }

    /// Offers one character to the mob.
    ///
    /// On acceptance the new progress, state and effects are committed
    /// together; on rejection the mob is left untouched.
    pub fn on_typed(&mut self, character: char) -> TypedOutcome {
        if !self.active {
            return TypedOutcome::Rejected;
        }
        let Some(transition) = transition(self, character) else {
            return TypedOutcome::Rejected;
        };

        self.current_index = transition.current_index;
        self.state = transition.state;
        if transition
            .effects
            .iter()
            .any(|effect| matches!(effect, MobEffect::Destroyed))
        {
            self.active = false;
        }
        TypedOutcome::Accepted(transition.effects)
    }

    /// Moves the mob toward the boundary for `dt` of simulated time.
    pub fn advance(&mut self, dt: Duration) {
        if !self.active {
            return;
        }
        self.position.x -= self.speed * dt.as_secs_f32();
    }

    /// Whether the mob has arrived at or passed `boundary_x`.
    #[must_use]
    pub fn has_reached(&self, boundary_x: f32) -> bool {
        self.position.x <= boundary_x
    }

    /// Restores the most recently consumed letter of a regenerator.
    ///
    /// Returns `false` without mutating when the mob is not a live
    /// regenerator or has nothing to restore.
    pub fn regenerate(&mut self) -> bool {
        if !self.active || self.current_index == 0 {
            return false;
        }
        let VariantState::Regenerator { regen_stack } = &mut self.state else {
            return false;
        };
        if regen_stack.pop().is_none() {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Flips a stealth mob's visibility, returning the new value.
    pub fn toggle_visibility(&mut self) -> Option<bool> {
        if !self.active {
            return None;
        }
        match &mut self.state {
            VariantState::Stealth { visible } => {
                *visible = !*visible;
                Some(*visible)
            }
            _ => None,
        }
    }

    /// Marks the mob as no longer live.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    fn expects(&self, character: char) -> bool {
        self.letters
            .get(self.current_index)
            .is_some_and(|expected| expected.eq_ignore_ascii_case(&character))
    }

    fn completion_score(&self) -> u32 {
        SCORE_PER_LETTER.saturating_mul(u32::try_from(self.letters.len()).unwrap_or(u32::MAX))
    }
}

struct Transition {
    current_index: usize,
    state: VariantState,
    effects: Vec<MobEffect>,
}

fn transition(mob: &Mob, character: char) -> Option<Transition> {
    match &mob.state {
        VariantState::Plain => single_letter(mob, character, PLAIN_SCORE),
        VariantState::Stealth { visible } => {
            if *visible {
                single_letter(mob, character, STEALTH_SCORE)
            } else {
                None
            }
        }
        VariantState::Tank | VariantState::Speedster => {
            sequence(mob, character, mob.state.clone(), Vec::new())
        }
        VariantState::Armored { armor_intact } => armored(mob, character, *armor_intact),
        VariantState::Shielded {
            shielded,
            shield_key,
        } => shielded_word(mob, character, *shielded, *shield_key),
        VariantState::Regenerator { regen_stack } => regenerator(mob, character, regen_stack),
        VariantState::Split { has_split } => split(mob, character, *has_split),
        VariantState::Boss {
            phase,
            phase_remaining,
        } => boss(mob, character, *phase, phase_remaining),
    }
}

fn destroyed(score: u32) -> Vec<MobEffect> {
    vec![
        MobEffect::Cue(EffectKind::Hit),
        MobEffect::Cue(EffectKind::Destroy),
        MobEffect::Score(score),
        MobEffect::Destroyed,
    ]
}

fn single_letter(mob: &Mob, character: char, score: u32) -> Option<Transition> {
    if !mob.expects(character) {
        return None;
    }
    Some(Transition {
        current_index: mob.current_index + 1,
        state: mob.state.clone(),
        effects: destroyed(score),
    })
}

/// Tank progression: one letter per match, completion pays per letter.
///
/// `extra` is appended to the effects of a non-final match.
fn sequence(
    mob: &Mob,
    character: char,
    state: VariantState,
    extra: Vec<MobEffect>,
) -> Option<Transition> {
    if !mob.expects(character) {
        return None;
    }
    let current_index = mob.current_index + 1;
    let effects = if current_index >= mob.letters.len() {
        destroyed(mob.completion_score())
    } else {
        let mut effects = vec![MobEffect::Cue(EffectKind::Hit)];
        effects.extend(extra);
        effects
    };
    Some(Transition {
        current_index,
        state,
        effects,
    })
}

fn armored(mob: &Mob, character: char, armor_intact: bool) -> Option<Transition> {
    if !mob.expects(character) {
        return None;
    }
    let current_index = mob.current_index + 1;
    if armor_intact && current_index < mob.letters.len() {
        return Some(Transition {
            current_index,
            state: VariantState::Armored {
                armor_intact: false,
            },
            effects: vec![
                MobEffect::Cue(EffectKind::Hit),
                MobEffect::Score(ARMOR_BREAK_SCORE),
            ],
        });
    }
    Some(Transition {
        current_index,
        state: VariantState::Armored {
            armor_intact: false,
        },
        effects: destroyed(ARMORED_KILL_SCORE),
    })
}

fn shielded_word(
    mob: &Mob,
    character: char,
    shielded: bool,
    shield_key: char,
) -> Option<Transition> {
    if !shielded {
        return sequence(mob, character, mob.state.clone(), Vec::new());
    }
    if !character.eq_ignore_ascii_case(&shield_key) {
        return None;
    }
    Some(Transition {
        current_index: mob.current_index,
        state: VariantState::Shielded {
            shielded: false,
            shield_key,
        },
        effects: vec![
            MobEffect::Cue(EffectKind::Hit),
            MobEffect::Score(SHIELD_BREAK_SCORE),
        ],
    })
}

fn regenerator(mob: &Mob, character: char, regen_stack: &[char]) -> Option<Transition> {
    let consumed = *mob.letters.get(mob.current_index)?;
    let mut stack = regen_stack.to_vec();
    stack.push(consumed);
    sequence(
        mob,
        character,
        VariantState::Regenerator { regen_stack: stack },
        vec![MobEffect::ArmRegeneration],
    )
}

fn split(mob: &Mob, character: char, has_split: bool) -> Option<Transition> {
    if !mob.expects(character) {
        return None;
    }
    let current_index = mob.current_index + 1;
    let len = mob.letters.len();

    if !has_split && current_index * 2 >= len {
        let children = split_children(mob);
        let matched = u32::try_from(current_index).unwrap_or(u32::MAX);
        return Some(Transition {
            current_index,
            state: VariantState::Split { has_split: true },
            effects: vec![
                MobEffect::Cue(EffectKind::Hit),
                MobEffect::Cue(EffectKind::Split),
                MobEffect::Score(SCORE_PER_LETTER.saturating_mul(matched)),
                MobEffect::SplitInto { children },
                MobEffect::Destroyed,
            ],
        });
    }

    sequence(mob, character, mob.state.clone(), Vec::new())
}

fn split_children(mob: &Mob) -> Vec<MobSpec> {
    let middle = mob.letters.len() / 2;
    let (first, second) = mob.letters.split_at(middle);
    let speed = mob.speed * SPLIT_SPEED_FACTOR;
    vec![
        MobSpec::new(
            MobKind::Tank.name(),
            first.to_vec(),
            speed,
            mob.position.offset_y(-SPLIT_VERTICAL_OFFSET),
        ),
        MobSpec::new(
            MobKind::Tank.name(),
            second.to_vec(),
            speed,
            mob.position.offset_y(SPLIT_VERTICAL_OFFSET),
        ),
    ]
}

fn boss(mob: &Mob, character: char, phase: usize, phase_remaining: &[u32]) -> Option<Transition> {
    if !mob.expects(character) {
        return None;
    }
    let current_index = mob.current_index + 1;
    let mut remaining = phase_remaining.to_vec();
    let mut next_phase = phase;

    if current_index >= mob.letters.len() {
        if let Some(slot) = remaining.get_mut(phase.saturating_sub(1)) {
            *slot = slot.saturating_sub(1);
        }
        let score = mob.completion_score().saturating_add(BOSS_BONUS);
        return Some(Transition {
            current_index,
            state: VariantState::Boss {
                phase: next_phase,
                phase_remaining: remaining,
            },
            effects: destroyed(score),
        });
    }

    let mut effects = vec![MobEffect::Cue(EffectKind::Hit)];
    if let Some(slot) = remaining.get_mut(phase.saturating_sub(1)) {
        *slot = slot.saturating_sub(1);
        if *slot == 0 && phase < remaining.len() {
            next_phase = phase + 1;
            effects.push(MobEffect::Cue(EffectKind::PhaseChange));
            effects.push(MobEffect::PhaseChanged { phase: next_phase });
        }
    }

    Some(Transition {
        current_index,
        state: VariantState::Boss {
            phase: next_phase,
            phase_remaining: remaining,
        },
        effects,
    })
}

fn boss_phases(letter_count: usize) -> Vec<u32> {
    let phase_count = letter_count.div_ceil(BOSS_LETTERS_PER_PHASE);
    (0..phase_count)
        .map(|index| {
            let start = index * BOSS_LETTERS_PER_PHASE;
            let span = (letter_count - start).min(BOSS_LETTERS_PER_PHASE);
            span as u32
        })
        .collect()
}

fn pad_letters(letters: &mut Vec<char>, minimum: usize) {
    while letters.len() < minimum {
        let filler = FILLER_LETTERS[letters.len() % FILLER_LETTERS.len()];
        letters.push(char::from(filler));
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that routes one keystroke to the closest mob willing to take it.

use tracing::trace;
use typer_drive_core::{EffectKind, Event, MobId, MobView, Position};

/// Configuration parameters required to construct the typing dispatcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    boundary_x: f32,
}

impl Config {
    /// Creates a configuration anchoring miss cues at `boundary_x`.
    #[must_use]
    pub const fn new(boundary_x: f32) -> Self {
        Self { boundary_x }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: MobId,
    position: Position,
}

/// Keystroke dispatcher that reuses its candidate buffer between keystrokes.
#[derive(Debug)]
pub struct TypingDispatcher {
    boundary_x: f32,
    candidates: Vec<Candidate>,
}

impl TypingDispatcher {
    /// Creates a new dispatcher using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            boundary_x: config.boundary_x,
            candidates: Vec::new(),
        }
    }

    /// Offers `character` to live mobs from closest to farthest.
    ///
    /// The character is lowercased first. `offer` is called once per
    /// candidate, in ascending `x` with ties broken by ascending id, until it
    /// reports acceptance. Exactly one [`Event::KeystrokeTyped`] is emitted
    /// per call; when nobody accepts, it is preceded by
    /// [`Event::KeystrokeMissed`] and, if any mob was live, a miss cue at the
    /// boundary on the closest mob's row.
    pub fn handle<F>(
        &mut self,
        character: char,
        mobs: &MobView,
        mut offer: F,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        F: FnMut(MobId, char) -> bool,
    {
        let character = character.to_ascii_lowercase();
        self.prepare_candidates(mobs);

        let accepted = self
            .candidates
            .iter()
            .any(|candidate| offer(candidate.id, character));

        if !accepted {
            trace!(%character, candidates = self.candidates.len(), "keystroke missed");
            out_events.push(Event::KeystrokeMissed { character });
            if let Some(closest) = self.candidates.first() {
                out_events.push(Event::EffectRequested {
                    kind: EffectKind::Miss,
                    position: Position::new(self.boundary_x, closest.position.y),
                });
            }
        }

        out_events.push(Event::KeystrokeTyped {
            character,
            success: accepted,
        });
        accepted
    }

    fn prepare_candidates(&mut self, mobs: &MobView) {
        self.candidates.clear();
        self.candidates.extend(
            mobs.iter()
                .filter(|snapshot| snapshot.active)
                .map(|snapshot| Candidate {
                    id: snapshot.id,
                    position: snapshot.position,
                }),
        );
        self.candidates.sort_by(|left, right| {
            left.position
                .x
                .total_cmp(&right.position.x)
                .then_with(|| left.id.cmp(&right.id))
        });
    }
}

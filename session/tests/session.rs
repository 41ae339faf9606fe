use std::time::Duration;

use typer_drive_core::{
    EffectKind, MobKind, MobSnapshot, Position, RangeError, VariantState, WaveNumber,
};
use typer_drive_factory::MobFactory;
use typer_drive_session::{Notification, Presenter, Session, MAX_HEALTH};
use typer_drive_system_wave_scheduler::{SchedulerConfig, VariantUnlock};
use typer_drive_world as world;

#[derive(Debug, Default)]
struct Recorder {
    rendered: Vec<MobSnapshot>,
    effects: Vec<(EffectKind, Position)>,
    notifications: Vec<Notification>,
}

impl Presenter for Recorder {
    fn render(&mut self, mob: &MobSnapshot) {
        self.rendered.push(mob.clone());
    }

    fn effect(&mut self, kind: EffectKind, position: Position) {
        self.effects.push((kind, position));
    }

    fn notify(&mut self, notification: &Notification) {
        self.notifications.push(notification.clone());
    }
}

impl Recorder {
    fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.notifications
            .iter()
            .filter(|notification| predicate(notification))
            .count()
    }
}

fn config(variant: &str, total_waves: u32, mob_count: u32) -> SchedulerConfig {
    SchedulerConfig {
        total_waves,
        base_mob_count: mob_count,
        mob_growth: 0.0,
        boss_every: 0,
        letters: vec!['f', 'j'],
        unlocks: vec![VariantUnlock::new(variant, 1, 1.0)],
        ..SchedulerConfig::default()
    }
}

fn session(config: SchedulerConfig) -> Session<Recorder> {
    Session::new(
        world::Config::default(),
        config,
        MobFactory::with_default_variants(),
        Recorder::default(),
    )
}

fn only_mob(session: &Session<Recorder>) -> MobSnapshot {
    let view = session.mob_view();
    assert_eq!(view.len(), 1, "expected a single live mob");
    view.into_vec().remove(0)
}

fn next_key(mob: &MobSnapshot) -> char {
    match &mob.state {
        VariantState::Shielded {
            shielded: true,
            shield_key,
        } => *shield_key,
        _ => mob.next_letter().expect("live mob has a letter"),
    }
}

fn clear_field(session: &mut Session<Recorder>) {
    while let Some(mob) = session
        .mob_view()
        .iter()
        .find(|mob| mob.accepting_input)
        .cloned()
    {
        assert!(session.on_typed(next_key(&mob)));
    }
}

#[test]
fn starting_a_wave_notifies_and_spawns() {
    let mut session = session(config("plain", 3, 5));
    session.start_wave(1).expect("wave in range");
    assert_eq!(
        session.presenter().notifications,
        vec![Notification::WaveStarted {
            wave: WaveNumber::new(1),
            queued: 5
        }]
    );

    assert_eq!(session.presenter().rendered.len(), 1);

    session.update(Duration::from_millis(16));
    assert_eq!(session.presenter().rendered.len(), 2);
    assert_eq!(session.current_wave(), Some(WaveNumber::new(1)));
}

#[test]
fn out_of_range_wave_is_reported_without_side_effects() {
    let mut session = session(config("plain", 3, 5));
    assert_eq!(
        session.start_wave(5),
        Err(RangeError::WaveOutOfRange {
            requested: 5,
            total: 3
        })
    );
    assert!(session.presenter().notifications.is_empty());
    assert!(session.mob_view().is_empty());
    assert_eq!(session.current_wave(), None);
}

#[test]
fn correct_keystroke_scores_and_reports_typed_once() {
    let mut session = session(config("plain", 3, 5));
    session.start_wave(1).expect("wave in range");
    let mob = only_mob(&session);

    assert!(session.on_typed(next_key(&mob).to_ascii_uppercase()));
    let recorder = session.presenter();
    assert_eq!(
        recorder.count(|n| matches!(n, Notification::ScoreChanged { delta: 10, total: 10 })),
        1
    );
    assert_eq!(recorder.count(|n| matches!(n, Notification::Typed { success: true, .. })), 1);
    assert_eq!(recorder.count(|n| matches!(n, Notification::Miss { .. })), 0);
    assert!(recorder
        .effects
        .iter()
        .any(|(kind, _)| *kind == EffectKind::Destroy));
    assert_eq!(session.stats().score(), 10);
    assert!(session.mob_view().is_empty());
}

#[test]
fn wrong_keystroke_misses_once_and_changes_nothing() {
    let mut session = session(config("tank", 3, 5));
    session.start_wave(1).expect("wave in range");
    let before = only_mob(&session);

    assert!(!session.on_typed('q'));
    let recorder = session.presenter();
    assert_eq!(recorder.count(|n| *n == Notification::Miss { character: 'q' }), 1);
    assert_eq!(
        recorder.count(|n| *n == Notification::Typed {
            character: 'q',
            success: false
        }),
        1
    );
    assert_eq!(
        recorder.effects,
        vec![(EffectKind::Miss, Position::new(100.0, before.position.y))]
    );
    assert_eq!(only_mob(&session), before);
    assert_eq!(session.stats().accuracy(), 0.0);
}

#[test]
fn regenerator_loses_progress_when_left_idle() {
    let mut session = session(SchedulerConfig {
        letters: vec!['r'],
        ..config("regenerator", 3, 5)
    });
    session.start_wave(1).expect("wave in range");
    for _ in 0..2 {
        assert!(session.on_typed('r'));
    }
    assert_eq!(only_mob(&session).typed, 2);

    session.update(Duration::from_millis(1_100));
    assert_eq!(only_mob(&session).typed, 1);
    assert!(session
        .presenter()
        .effects
        .iter()
        .any(|(kind, _)| *kind == EffectKind::Regenerate));
}

#[test]
fn split_mob_notifies_and_keeps_wave_running() {
    let mut session = session(config("split", 2, 1));
    session.start_wave(1).expect("wave in range");
    for _ in 0..3 {
        let mob = only_mob(&session);
        assert!(session.on_typed(next_key(&mob)));
    }

    let view = session.mob_view();
    assert_eq!(view.len(), 2);
    assert!(view.iter().all(|mob| mob.kind == MobKind::Tank));
    let recorder = session.presenter();
    assert_eq!(
        recorder.count(|n| matches!(n, Notification::SpawnSplitMobs { children: 2, .. })),
        1
    );
    assert_eq!(recorder.count(|n| matches!(n, Notification::WaveComplete { .. })), 0);

    clear_field(&mut session);
    assert_eq!(
        session
            .presenter()
            .count(|n| matches!(n, Notification::WaveComplete { .. })),
        1
    );
}

#[test]
fn stealth_mob_cannot_be_typed_while_hidden() {
    let mut session = session(config("stealth", 3, 5));
    session.start_wave(1).expect("wave in range");
    let mob = only_mob(&session);

    session.update(Duration::from_millis(500));
    assert!(!only_mob(&session).accepting_input);
    assert!(!session.on_typed(next_key(&mob)));

    session.update(Duration::from_millis(500));
    assert!(session.on_typed(next_key(&mob)));
    assert_eq!(session.stats().score(), 15);
}

#[test]
fn breaching_mobs_damage_the_player() {
    let mut session = session(config("plain", 3, 1));
    session.start_wave(1).expect("wave in range");
    for _ in 0..200 {
        session.update(Duration::from_millis(100));
        if session.stats().damage_taken() > 0 {
            break;
        }
    }
    assert_eq!(session.stats().damage_taken(), 1);
    assert_eq!(
        session
            .presenter()
            .count(|n| *n
                == Notification::PlayerDamaged {
                    amount: 1,
                    total: 1,
                    health: MAX_HEALTH - 1
                }),
        1
    );
}

#[test]
fn accepted_keystroke_renders_the_changed_mob() {
    let mut session = session(config("tank", 3, 5));
    session.start_wave(1).expect("wave in range");
    let mob = only_mob(&session);
    let rendered = session.presenter().rendered.len();

    assert!(session.on_typed(next_key(&mob)));
    let recorder = session.presenter();
    assert_eq!(recorder.rendered.len(), rendered + 1);
    let last = recorder.rendered.last().expect("render after keystroke");
    assert_eq!((last.id, last.typed), (mob.id, 1));

    assert!(!session.on_typed('q'));
    assert_eq!(session.presenter().rendered.len(), rendered + 1);
}

#[test]
fn uppercase_shield_key_can_still_be_typed() {
    let mut session = session(SchedulerConfig {
        shield_key: 'Q',
        ..config("shielded", 3, 1)
    });
    session.start_wave(1).expect("wave in range");

    assert!(session.on_typed('Q'));
    assert!(matches!(
        only_mob(&session).state,
        VariantState::Shielded {
            shielded: false,
            ..
        }
    ));
    clear_field(&mut session);
    assert!(session.mob_view().is_empty());
}

#[test]
fn running_out_of_health_ends_the_run() {
    let mut session = session(SchedulerConfig {
        initial_interval_ms: 100,
        min_interval_ms: 100,
        ..config("plain", 2, 300)
    });
    session.start_wave(1).expect("wave in range");
    for _ in 0..600 {
        session.update(Duration::from_millis(100));
        if session.is_defeated() {
            break;
        }
    }
    assert!(session.is_defeated());
    assert_eq!(session.stats().health(), 0);
    assert!(session.stats().damage_taken() >= MAX_HEALTH);
    assert_eq!(
        session
            .presenter()
            .count(|n| *n == Notification::PlayerDefeated),
        1
    );

    for _ in 0..120 {
        session.update(Duration::from_millis(100));
    }
    assert!(session.mob_view().is_empty(), "spawning continued after defeat");
    assert_eq!(
        session
            .presenter()
            .count(|n| *n == Notification::PlayerDefeated),
        1
    );
}

#[test]
fn stopping_keeps_live_mobs_but_spawns_nothing_new() {
    let mut session = session(config("tank", 3, 5));
    session.start_wave(1).expect("wave in range");
    session.stop_spawning();
    session.update(Duration::from_secs(5));
    assert_eq!(session.mob_view().len(), 1);

    session.clear_field();
    assert!(session.mob_view().is_empty());
}

#[test]
fn full_campaign_finishes_and_replays_identically() {
    let first = campaign();
    let second = campaign();
    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(
        first
            .iter()
            .filter(|n| **n == Notification::AllWavesComplete)
            .count(),
        1
    );
}

fn campaign() -> Vec<Notification> {
    let mut session = session(SchedulerConfig {
        total_waves: 3,
        seed: 42,
        ..SchedulerConfig::default()
    });
    session.start_wave(1).expect("wave in range");
    for _ in 0..2_000 {
        session.update(Duration::from_millis(50));
        clear_field(&mut session);
        if session.is_finished() {
            break;
        }
    }
    assert!(session.is_finished(), "campaign should finish");
    assert_eq!(session.stats().damage_taken(), 0);
    session.into_presenter().notifications
}

//! End-to-end match scenarios driven through the controller with a manual clock

use std::f32::consts::PI;

use achilles_arena::authoring::{AuthoredTweak, AuthoringError, TweakAuthor};
use achilles_arena::consts::TICK_MS;
use achilles_arena::platform::ManualClock;
use achilles_arena::sim::{MatchEvent, Outcome};
use achilles_arena::tweaks::NONE_ID;
use achilles_arena::{MatchController, Settings};
use glam::Vec2;

const CENTER: Vec2 = Vec2::new(400.0, 300.0);

fn controller() -> MatchController<ManualClock> {
    let settings = Settings {
        seed: Some(1234),
        ..Settings::default()
    };
    MatchController::new(settings, ManualClock::new(10_000.0)).unwrap()
}

/// Bot 0 parked at the center facing +x (weak spot toward -x), bot 1 far away
fn park_bots(c: &mut MatchController<ManualClock>) {
    let state = c.state_mut().unwrap();
    for bot in state.bots.iter_mut() {
        bot.velocity = Vec2::ZERO;
        bot.rotation_speed = 0.0;
        bot.body_angle = 0.0;
    }
    state.bots[0].position = CENTER;
    state.bots[1].position = CENTER + Vec2::new(150.0, 0.0);
}

/// Line bot 1 up to ram bot 0's weak spot on the next tick
fn line_up_ram(c: &mut MatchController<ManualClock>) {
    park_bots(c);
    let state = c.state_mut().unwrap();
    state.bots[1].position = CENTER - Vec2::new(62.0, 0.0);
    state.bots[1].velocity = Vec2::new(4.0, 0.0);
}

struct CannedAuthor(String);

impl TweakAuthor for CannedAuthor {
    fn author(&self, description: &str) -> Result<AuthoredTweak, AuthoringError> {
        Ok(AuthoredTweak {
            name: "Canned".to_string(),
            description: description.to_string(),
            code: self.0.clone(),
            validation: None,
        })
    }
}

#[test]
fn unknown_tweak_ids_fall_back_to_none() {
    let mut c = controller();
    c.start_match("noSuchTweak", "");
    let state = c.state().unwrap();
    assert_eq!(state.bots[0].tweak().id(), NONE_ID);
    assert_eq!(state.bots[1].tweak().id(), NONE_ID);
    assert_eq!(c.health(0), Some(3));
    assert_eq!(c.health(1), Some(3));
}

#[test]
fn invulnerability_window_absorbs_repeat_hits() {
    let mut c = controller();
    c.start_match("none", "none");

    line_up_ram(&mut c);
    c.tick();
    assert_eq!(c.health(0), Some(2));

    c.clock().advance(500.0);
    line_up_ram(&mut c);
    c.tick();
    assert_eq!(c.health(0), Some(2));
    assert!(c.events().contains(&MatchEvent::HitAbsorbed {
        attacker: 1,
        defender: 0
    }));

    c.clock().advance(500.0);
    line_up_ram(&mut c);
    c.tick();
    assert_eq!(c.health(0), Some(1));
}

#[test]
fn killing_blow_ends_and_freezes_match() {
    let mut c = controller();
    c.start_match("none", "none");
    c.state_mut().unwrap().bots[0].health = 1;

    line_up_ram(&mut c);
    c.clock().advance(250.0);
    c.tick();
    assert_eq!(c.outcome(), Some(Outcome::Winner(1)));
    assert!(c.is_over());
    assert!(!c.is_running());
    let elapsed = c.elapsed_time();
    let ticks = c.state().unwrap().time_ticks;

    c.clock().advance(5_000.0);
    c.tick();
    assert_eq!(c.state().unwrap().time_ticks, ticks);
    assert_eq!(c.elapsed_time(), elapsed);
    assert!(c.events().contains(&MatchEvent::MatchOver {
        outcome: Outcome::Winner(1)
    }));
}

#[test]
fn regeneration_heals_exactly_once_after_a_minute() {
    let mut c = controller();
    c.start_match("regeneration", "none");
    park_bots(&mut c);
    c.state_mut().unwrap().bots[0].health = 2;

    c.clock().advance(59_999.0);
    c.tick();
    assert_eq!(c.health(0), Some(2));

    c.clock().advance(1.0);
    c.tick();
    assert_eq!(c.health(0), Some(3));

    // Full health: no further healing
    c.clock().advance(60_000.0);
    c.tick();
    assert_eq!(c.health(0), Some(3));
    let regens = c
        .events()
        .iter()
        .filter(|e| matches!(e, MatchEvent::Regenerated { bot: 0, .. }))
        .count();
    assert_eq!(regens, 1);
}

#[test]
fn idle_bots_never_take_damage() {
    let mut c = controller();
    c.start_match("none", "none");
    park_bots(&mut c);
    for _ in 0..120 {
        c.clock().advance(TICK_MS);
        c.tick();
    }
    assert_eq!(c.health(0), Some(3));
    assert_eq!(c.health(1), Some(3));
    assert_eq!(c.outcome(), None);
}

#[test]
fn rejected_authored_tweak_leaves_slot_at_none() {
    let mut c = controller();
    c.select_tweak(0, "extraLife");
    let author = CannedAuthor(r#"{ "init": [{ "effect": "scale_radius", "factor": 50.0 }] }"#.into());

    let result = c.author_tweak(&author, None, 0, "enormous bot");
    assert!(matches!(result, Err(AuthoringError::Rejected(_))));
    assert_eq!(c.selection(0), NONE_ID);
    assert!(!c.registry().contains("authored-1"));
}

#[test]
fn authored_tweak_lives_for_one_match() {
    let mut c = controller();
    let author = CannedAuthor(
        r#"{
            "init": [
                { "effect": "set_health", "health": 5 },
                { "effect": "set_arc_width", "width": 0.5 }
            ]
        }"#
        .into(),
    );
    let selection = c.author_tweak(&author, None, 1, "tanky bot").unwrap();
    assert_eq!(c.selection(1), selection.tweak_id);

    c.start_selected();
    assert_eq!(c.health(1), Some(5));
    let arc_width = c.state().unwrap().bots[1].weak_spot_arc_width;
    assert!(arc_width >= PI / 8.0 && arc_width <= 0.5 + 1e-6);

    // No authoring while the match is on
    assert!(matches!(
        c.author_tweak(&author, None, 0, "again"),
        Err(AuthoringError::MatchInProgress)
    ));

    c.reset_to_pre_match();
    assert!(!c.registry().contains(&selection.tweak_id));
    assert_eq!(c.selection(1), NONE_ID);
}

#[test]
fn cancelled_request_reverts_selection_and_drops_late_response() {
    let mut c = controller();
    c.select_tweak(0, "smallerSize");
    let ticket = c.begin_authoring(0, "glass cannon").unwrap();
    c.cancel_authoring();
    assert_eq!(c.selection(0), NONE_ID);

    let late = CannedAuthor(r#"{ "init": [{ "effect": "set_health", "health": 1 }] }"#.into())
        .author("glass cannon");
    assert!(matches!(
        c.complete_authoring(ticket, late, None),
        Err(AuthoringError::Cancelled)
    ));
    assert_eq!(c.selection(0), NONE_ID);
    assert_eq!(c.registry().list().len(), 4);
}

#[test]
fn frame_snapshot_tracks_the_match() {
    let mut c = controller();
    c.start_match("smallerSize", "none");
    let frame = c.frame().unwrap();
    assert_eq!(frame.bots.len(), 2);
    assert!(frame.bots[0].radius < frame.bots[1].radius);
    assert!(!c.vertices().is_empty());

    c.reset_to_pre_match();
    assert!(c.frame().is_none());
    assert!(c.vertices().is_empty());
}

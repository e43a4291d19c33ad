use super::helpers::*;

use std::time::Duration;

use bevy::prelude::*;
use confetti::session::resolve_anchor;
use confetti::{
    ConfettiEffects, ConfettiPosition, EffectSession, LoopState, MemorySettingsStore, NoCursor,
    Settings, StopReason,
};

#[test]
fn session_is_released_after_timing_out() {
    let (mut effects, counters) = counting_effects(None);
    effects.run_effect(&settings_with(5, 100), ConfettiPosition::Center);
    assert_eq!(effects.active_count(), 1);
    assert_eq!(counters.acquired.get(), 1);
    assert_eq!(counters.live(), 1);

    effects.run_until_idle(|_| {});

    assert!(effects.is_idle());
    assert_eq!(counters.released.get(), 1);
    assert_eq!(counters.live(), 0);
}

#[test]
fn first_frame_is_drawn_on_start() {
    let (mut effects, counters) = counting_effects(None);
    effects.run_effect(&settings_with(5, 100), ConfettiPosition::Center);
    assert_eq!(counters.polygons.get(), 5);
    assert_eq!(counters.frames.get(), 1);
    assert_eq!(effects.sessions()[0].frames(), 1);
}

#[test]
fn timed_out_session_draws_one_frame_per_running_tick() {
    let mut provider = CountingSurfaceProvider::new();
    let counters = provider.counters.clone();
    let session = EffectSession::start(
        0,
        &settings_with(5, 100),
        SCREEN / 2.0,
        &mut provider,
        &mut seeded_rng(2),
    )
    .unwrap();

    let mut waits = 0;
    let reason = session.run(|tick| {
        assert_eq!(tick, Duration::from_millis(16));
        waits += 1;
    });

    assert_eq!(reason, StopReason::TimedOut);
    // ticks at 16..80 ms advance, the tick at 96 ms finishes
    assert_eq!(waits, 5);
    // first frame, five advanced ticks, then the final clear
    assert_eq!(counters.frames.get(), 7);
    assert_eq!(counters.released.get(), 1);
}

#[test]
fn session_is_released_after_extinction() {
    let mut provider = CountingSurfaceProvider::new();
    let counters = provider.counters.clone();
    let settings = Settings {
        count: 20,
        duration_ms: 60_000,
        speed: 10.0,
        gravity: 5.0,
        ..Settings::default()
    };
    let session =
        EffectSession::start(0, &settings, SCREEN / 2.0, &mut provider, &mut seeded_rng(9))
            .unwrap();

    assert_eq!(session.run(|_| {}), StopReason::Extinct);
    assert_eq!(counters.live(), 0);
}

#[test]
fn cancel_all_releases_every_surface() {
    let (mut effects, counters) = counting_effects(None);
    for _ in 0..3 {
        effects.trigger(&settings_with(10, 3000));
    }
    assert_eq!(counters.live(), 3);

    effects.cancel_all();

    assert!(effects.is_idle());
    assert_eq!(counters.acquired.get(), 3);
    assert_eq!(counters.live(), 0);
}

#[test]
fn cancelled_session_stops_before_next_tick() {
    let mut provider = CountingSurfaceProvider::new();
    let mut session = EffectSession::start(
        3,
        &settings_with(10, 3000),
        SCREEN / 2.0,
        &mut provider,
        &mut seeded_rng(4),
    )
    .unwrap();
    session.step();
    session.cancel();

    assert_eq!(session.state(), LoopState::Stopped(StopReason::Cancelled));
    assert_eq!(session.animation().ticks(), 1);
    assert_eq!(session.run(|_| panic!("cancelled sessions do not wait")), StopReason::Cancelled);
}

#[test]
fn dropping_effects_releases_running_sessions() {
    let (mut effects, counters) = counting_effects(None);
    effects.trigger(&settings_with(10, 3000));
    effects.trigger(&settings_with(10, 3000));
    drop(effects);
    assert_eq!(counters.acquired.get(), 2);
    assert_eq!(counters.live(), 0);
}

#[test]
fn oldest_session_is_evicted_at_capacity() {
    let (effects, counters) = counting_effects(None);
    let mut effects = effects.with_max_concurrent(2);

    for _ in 0..3 {
        effects.trigger(&settings_with(10, 3000));
    }

    assert_eq!(effects.active_count(), 2);
    assert_eq!(counters.acquired.get(), 3);
    assert_eq!(counters.released.get(), 1);
    let ids: Vec<u64> = effects.sessions().iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn failed_trigger_at_capacity_keeps_running_session() {
    let (effects, counters) = counting_effects(None);
    let mut effects = effects.with_max_concurrent(1);
    effects.trigger(&settings_with(10, 3000));
    assert_eq!(effects.active_count(), 1);

    effects.provider_mut().fail = true;
    effects.trigger(&settings_with(10, 3000));

    assert_eq!(effects.active_count(), 1);
    assert_eq!(effects.sessions()[0].id(), 0);
    assert_eq!(counters.acquired.get(), 1);
    assert_eq!(counters.released.get(), 0);
}

#[test]
fn default_capacity_allows_four_sessions() {
    let (mut effects, counters) = counting_effects(None);
    for _ in 0..4 {
        effects.trigger(&settings_with(10, 3000));
    }
    assert_eq!(effects.max_concurrent(), 4);
    assert_eq!(effects.active_count(), 4);
    assert_eq!(counters.released.get(), 0);
}

#[test]
fn surface_failure_is_swallowed() {
    let provider = CountingSurfaceProvider::failing();
    let counters = provider.counters.clone();
    let mut effects = ConfettiEffects::with_seed(provider, NoCursor, 1);

    effects.trigger(&Settings::default());

    assert!(effects.is_idle());
    assert_eq!(counters.acquired.get(), 0);
    assert_eq!(counters.polygons.get(), 0);
}

#[test]
fn disabled_settings_do_nothing() {
    let (mut effects, counters) = counting_effects(None);
    let settings = Settings {
        enabled: false,
        ..Settings::default()
    };
    effects.trigger(&settings);
    effects.run_effect(&settings, Vec2::new(10.0, 10.0));
    assert!(effects.is_idle());
    assert_eq!(counters.acquired.get(), 0);
}

#[test]
fn out_of_range_settings_are_clamped_before_spawning() {
    let (mut effects, _counters) = counting_effects(None);
    effects.trigger(&settings_with(0, 0));
    let session = &effects.sessions()[0];
    assert_eq!(session.animation().particles().len(), 1);
    assert_eq!(session.animation().timeout(), Duration::from_millis(1));
}

#[test]
fn screen_positions_resolve_to_fixed_anchors() {
    let cases = [
        (ConfettiPosition::Center, Vec2::new(400.0, 300.0)),
        (ConfettiPosition::Top, Vec2::new(400.0, 150.0)),
        (ConfettiPosition::Bottom, Vec2::new(400.0, 450.0)),
    ];
    for (position, expected) in cases {
        let (mut effects, _counters) = counting_effects(Some(Vec2::new(5.0, 5.0)));
        effects.run_effect(&settings_with(4, 1000), position);
        assert_eq!(effects.sessions()[0].anchor(), expected, "{position:?}");
    }
}

#[test]
fn cursor_position_anchors_at_the_cursor() {
    let (mut effects, _counters) = counting_effects(Some(Vec2::new(120.0, 80.0)));
    effects.run_effect(&settings_with(4, 1000), ConfettiPosition::Cursor);
    assert_eq!(effects.sessions()[0].anchor(), Vec2::new(120.0, 80.0));
}

#[test]
fn cursor_outside_the_screen_is_clamped() {
    let cursor = Some(Vec2::new(-50.0, 900.0));
    assert_eq!(
        resolve_anchor(ConfettiPosition::Cursor, SCREEN, &cursor),
        Vec2::new(0.0, 600.0)
    );
}

#[test]
fn unknown_cursor_falls_back_to_center() {
    let (mut effects, _counters) = counting_effects(None);
    effects.run_effect(&settings_with(4, 1000), ConfettiPosition::Cursor);
    assert_eq!(effects.sessions()[0].anchor(), SCREEN / 2.0);
    assert_eq!(resolve_anchor(ConfettiPosition::Cursor, SCREEN, &NoCursor), SCREEN / 2.0);
}

#[test]
fn explicit_point_overrides_configured_position() {
    let (mut effects, _counters) = counting_effects(None);
    let settings = Settings {
        position: ConfettiPosition::Top,
        ..settings_with(4, 1000)
    };
    effects.run_effect(&settings, Vec2::new(42.0, 24.0));
    assert_eq!(effects.sessions()[0].anchor(), Vec2::new(42.0, 24.0));
}

#[test]
fn population_starts_around_the_anchor() {
    let (mut effects, _counters) = counting_effects(None);
    effects.run_effect(&settings_with(50, 1000), ConfettiPosition::Bottom);
    let session = &effects.sessions()[0];
    for particle in session.animation().particles() {
        let offset = particle.position - session.anchor();
        assert!(offset.x.abs() <= 30.0 && offset.y.abs() <= 20.0, "{offset}");
    }
}

#[test]
fn run_from_store_uses_stored_settings() {
    let (mut effects, _counters) = counting_effects(None);
    let store = MemorySettingsStore::new(Settings {
        count: 12,
        position: ConfettiPosition::Bottom,
        ..Settings::default()
    });

    effects.run_from_store(&store);

    let session = &effects.sessions()[0];
    assert_eq!(session.anchor(), Vec2::new(400.0, 450.0));
    assert_eq!(session.animation().particles().len(), 12);
}

#[test]
fn run_from_store_respects_disabled_flag() {
    let (mut effects, counters) = counting_effects(None);
    let store = MemorySettingsStore::new(Settings {
        enabled: false,
        ..Settings::default()
    });
    effects.run_from_store(&store);
    assert!(effects.is_idle());
    assert_eq!(counters.acquired.get(), 0);
}

#[test]
fn run_until_idle_waits_between_ticks() {
    let (mut effects, _counters) = counting_effects(None);
    effects.run_effect(&settings_with(5, 100), ConfettiPosition::Center);

    let mut waited = Duration::ZERO;
    effects.run_until_idle(|tick| waited += tick);

    assert_eq!(waited, Duration::from_millis(16 * 5));
}

#[test]
fn sessions_tick_independently() {
    let (mut effects, counters) = counting_effects(None);
    effects.trigger(&settings_with(5, 100));
    effects.trigger(&settings_with(5, 1000));

    for _ in 0..6 {
        effects.tick();
    }

    assert_eq!(effects.active_count(), 1);
    assert_eq!(effects.sessions()[0].id(), 1);
    assert_eq!(counters.live(), 1);
}

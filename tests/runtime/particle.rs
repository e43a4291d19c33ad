use super::helpers::*;

use bevy::prelude::*;
use confetti::particle::{ALPHA_EPSILON, FADE_START, OFFSCREEN_MARGIN, ranges};
use confetti::{ConfettiShape, Particle, Settings};

const TICK: f32 = 0.016;

fn spawn_one(seed: u64) -> Particle {
    let mut rng = seeded_rng(seed);
    Particle::spawn(SCREEN / 2.0, ConfettiShape::Rectangle, &Settings::default(), &mut rng)
}

fn run_ticks(particle: &mut Particle, ticks: u32) {
    let mut rng = seeded_rng(99);
    for i in 0..ticks {
        particle.update((i + 1) as f32 * TICK, TICK, &mut rng);
    }
}

#[test]
fn spawn_draws_attributes_from_ranges() {
    let mut rng = seeded_rng(1);
    let settings = Settings::default();
    for _ in 0..100 {
        let p = Particle::spawn(Vec2::ZERO, ConfettiShape::Star, &settings, &mut rng);
        assert!(ranges::WIDTH.contains(p.base_size.x));
        assert!(ranges::HEIGHT.contains(p.base_size.y));
        assert!(ranges::MAX_LIFE.contains(p.max_life));
        assert!(ranges::ROTATION_SPEED.contains(p.rotation_speed));
        assert!(ranges::WOBBLE_AMOUNT.contains(p.wobble_amount));
        assert!(ranges::WOBBLE_SPEED.contains(p.wobble_speed));
        assert!(ranges::COLOR_VARIATION.contains(p.color_variation));
        let speed = p.velocity.length();
        assert!((5.0 - 1e-3..10.0 + 1e-3).contains(&speed), "speed {speed}");
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.life, 0.0);
        assert_eq!(p.gravity, settings.gravity);
    }
}

#[test]
fn spawn_scales_size_and_speed_by_settings() {
    let settings = Settings {
        size: 2.0,
        speed: 0.5,
        ..default()
    };
    let mut rng = seeded_rng(2);
    for _ in 0..50 {
        let p = Particle::spawn(Vec2::ZERO, ConfettiShape::Circle, &settings, &mut rng);
        assert!(p.base_size.x >= 12.0 && p.base_size.x < 24.0);
        assert!(p.base_size.y >= 8.0 && p.base_size.y < 16.0);
        let speed = p.velocity.length();
        assert!(speed >= 2.5 - 1e-3 && speed < 5.0 + 1e-3, "speed {speed}");
    }
}

#[test]
fn first_tick_moves_by_initial_velocity() {
    let mut p = spawn_one(3);
    let start = p.position;
    let velocity = p.velocity;
    run_ticks(&mut p, 1);
    assert_eq!(p.position, start + velocity);
    assert!((p.life - TICK).abs() < 1e-6);
}

#[test]
fn gravity_pulls_particles_down_over_time() {
    let mut p = spawn_one(4);
    p.velocity = Vec2::ZERO;
    p.wobble_amount = 0.0;
    p.gravity = 0.5;
    let start = p.position;
    run_ticks(&mut p, 30);
    assert!(p.position.y > start.y + 100.0);
}

#[test]
fn alpha_is_full_until_fade_starts() {
    let mut p = spawn_one(5);
    let fade_ticks = (p.max_life * FADE_START / TICK).floor() as u32 - 1;
    run_ticks(&mut p, fade_ticks);
    assert_eq!(p.alpha, 1.0);
}

#[test]
fn alpha_never_increases_and_stays_in_unit_range() {
    let mut rng = seeded_rng(6);
    let mut p = spawn_one(6);
    let mut previous = p.alpha;
    for i in 0..500 {
        p.update((i + 1) as f32 * TICK, TICK, &mut rng);
        assert!((0.0..=1.0).contains(&p.alpha));
        if p.life > p.max_life * FADE_START {
            assert!(p.alpha <= previous, "alpha rose from {previous} to {}", p.alpha);
        }
        previous = p.alpha;
    }
}

#[test]
fn alpha_reaches_zero_at_max_life() {
    let mut rng = seeded_rng(7);
    let mut p = spawn_one(7);
    let mut ticks = 0;
    while p.life < p.max_life {
        ticks += 1;
        p.update(ticks as f32 * TICK, TICK, &mut rng);
    }
    assert_eq!(p.alpha, 0.0);
    assert!(p.is_expired());
}

#[test]
fn expires_within_max_life() {
    for seed in 0..20 {
        let mut rng = seeded_rng(seed);
        let mut p = spawn_one(seed);
        let budget = (p.max_life / TICK).ceil() as u32 + 1;
        let mut ticks = 0;
        while !p.is_expired() {
            ticks += 1;
            p.update(ticks as f32 * TICK, TICK, &mut rng);
            assert!(ticks <= budget, "particle outlived max_life");
        }
        assert!(p.alpha <= ALPHA_EPSILON);
    }
}

#[test]
fn rotation_advances_by_rotation_speed() {
    let mut p = spawn_one(8);
    p.rotation = 10.0;
    p.rotation_speed = 5.0;
    run_ticks(&mut p, 2);
    assert!((p.rotation - 20.0).abs() < 1e-4);
}

#[test]
fn scale_oscillates_within_twenty_percent() {
    let mut p = spawn_one(9);
    let mut rng = seeded_rng(9);
    for i in 0..400 {
        p.update(i as f32 * TICK, TICK, &mut rng);
        assert!(p.scale >= 0.8 - 1e-5 && p.scale <= 1.2 + 1e-5);
    }
}

#[test]
fn out_of_bounds_below_and_sideways_but_not_above() {
    let mut p = spawn_one(10);

    p.position = Vec2::new(400.0, SCREEN.y + OFFSCREEN_MARGIN + 1.0);
    assert!(p.is_out_of_bounds(SCREEN));

    p.position = Vec2::new(-OFFSCREEN_MARGIN - 1.0, 300.0);
    assert!(p.is_out_of_bounds(SCREEN));

    p.position = Vec2::new(SCREEN.x + OFFSCREEN_MARGIN + 1.0, 300.0);
    assert!(p.is_out_of_bounds(SCREEN));

    p.position = Vec2::new(400.0, -500.0);
    assert!(!p.is_out_of_bounds(SCREEN));

    p.position = Vec2::new(SCREEN.x + OFFSCREEN_MARGIN - 1.0, SCREEN.y + 50.0);
    assert!(!p.should_remove(SCREEN));
}

#[test]
fn color_alpha_follows_fade() {
    let mut p = spawn_one(11);
    assert_eq!(p.current_color(0.0).alpha, 200.0 / 255.0);
    p.alpha = 0.5;
    assert_eq!(p.current_color(0.0).alpha, 100.0 / 255.0);
    p.alpha = 0.0;
    assert_eq!(p.current_color(0.0).alpha, 0.0);
}

#[test]
fn transform_places_local_origin_at_position() {
    let mut p = spawn_one(12);
    p.position = Vec2::new(120.0, 80.0);
    p.rotation = 90.0;
    p.scale = 2.0;
    let t = p.transform();
    assert!(t.transform_point2(Vec2::ZERO).distance(p.position) < 1e-4);
    let moved = t.transform_point2(Vec2::new(1.0, 0.0));
    assert!(moved.distance(Vec2::new(120.0, 82.0)) < 1e-4);
}

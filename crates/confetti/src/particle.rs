use bevy::math::Affine2;
use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::palette::{Palette, shade};
use crate::settings::Settings;

/// Alpha at or below which a particle is considered gone.
pub const ALPHA_EPSILON: f32 = 0.01;
/// Distance past the left, right and bottom screen edges before a particle is culled.
pub const OFFSCREEN_MARGIN: f32 = 100.0;
/// Fraction of `max_life` after which alpha starts fading.
pub const FADE_START: f32 = 0.6;
/// Per-tick velocity retention.
pub const AIR_RESISTANCE: f32 = 0.999;
/// Chance per tick of a random velocity kick.
pub const JITTER_CHANCE: f64 = 0.05;
/// Alpha channel value of a fully opaque particle.
pub const MAX_ALPHA: f32 = 200.0;

/// The outline drawn for a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfettiShape {
    /// Axis-aligned box of `width × height`.
    Rectangle,
    /// Disc with diameter `width`.
    Circle,
    /// Isosceles triangle, apex up.
    Triangle,
    /// Five-pointed star, inner radius half the outer.
    Star,
    /// Bézier heart, scaled by `width`.
    Heart,
}

impl ConfettiShape {
    /// Every shape, in enumeration order.
    pub const ALL: [ConfettiShape; 5] = [
        Self::Rectangle,
        Self::Circle,
        Self::Triangle,
        Self::Star,
        Self::Heart,
    ];
}

/// A uniform `[min, max)` interval sampled at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl ParticleRange {
    /// Creates a new range with the given bounds.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Samples uniformly, returning `min` for an empty range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Returns `true` if `value` lies in `[min, max)`.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }
}

/// Spawn-time randomization ranges.
pub mod ranges {
    use super::ParticleRange;

    /// Unscaled width.
    pub const WIDTH: ParticleRange = ParticleRange::new(6.0, 12.0);
    /// Unscaled height.
    pub const HEIGHT: ParticleRange = ParticleRange::new(4.0, 8.0);
    /// Initial speed in pixels per tick, before the speed multiplier.
    pub const SPEED: ParticleRange = ParticleRange::new(5.0, 10.0);
    /// Launch direction and initial rotation, in degrees.
    pub const ANGLE: ParticleRange = ParticleRange::new(0.0, 360.0);
    /// Degrees per tick.
    pub const ROTATION_SPEED: ParticleRange = ParticleRange::new(-15.0, 15.0);
    /// Brightness multiplier applied on top of the sparkle.
    pub const COLOR_VARIATION: ParticleRange = ParticleRange::new(0.8, 1.2);
    /// Oscillator phase, in radians.
    pub const PHASE: ParticleRange = ParticleRange::new(0.0, std::f32::consts::TAU);
    /// Wobble angular frequency, radians per simulated second.
    pub const WOBBLE_SPEED: ParticleRange = ParticleRange::new(2.0, 5.0);
    /// Wobble force amplitude.
    pub const WOBBLE_AMOUNT: ParticleRange = ParticleRange::new(0.5, 2.0);
    /// Lifetime in seconds.
    pub const MAX_LIFE: ParticleRange = ParticleRange::new(3.0, 6.0);
    /// Scale oscillator frequency.
    pub const SCALE_SPEED: ParticleRange = ParticleRange::new(0.5, 1.5);
    /// Sparkle oscillator frequency.
    pub const SPARKLE_SPEED: ParticleRange = ParticleRange::new(2.0, 4.0);
    /// Horizontal velocity kick applied by the random jitter.
    pub const JITTER_X: ParticleRange = ParticleRange::new(-0.3, 0.3);
    /// Vertical velocity kick applied by the random jitter.
    pub const JITTER_Y: ParticleRange = ParticleRange::new(-0.2, 0.2);
}

/// One piece of confetti.
///
/// Velocities and the rotation speed are expressed per tick; `life` and
/// `max_life` are simulated seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Center, in surface pixels (y down).
    pub position: Vec2,
    /// Pixels per tick.
    pub velocity: Vec2,
    /// Outline drawn for this particle.
    pub shape: ConfettiShape,
    /// Unscaled width and height, already multiplied by the size setting.
    pub base_size: Vec2,
    /// Degrees.
    pub rotation: f32,
    /// Degrees per tick.
    pub rotation_speed: f32,
    /// Added to the vertical velocity every tick.
    pub gravity: f32,
    /// 8-bit sRGB base color.
    pub base_color: [u8; 3],
    /// Constant brightness multiplier.
    pub color_variation: f32,
    /// Wobble oscillator phase, radians.
    pub wobble_phase: f32,
    /// Wobble oscillator frequency.
    pub wobble_speed: f32,
    /// Wobble force amplitude.
    pub wobble_amount: f32,
    /// Elapsed simulated seconds.
    pub life: f32,
    /// Seconds after which the particle is fully transparent.
    pub max_life: f32,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Current uniform scale.
    pub scale: f32,
    /// Scale oscillator frequency.
    pub scale_speed: f32,
    /// Sparkle oscillator frequency.
    pub sparkle_speed: f32,
    /// Sparkle oscillator phase, radians.
    pub sparkle_phase: f32,
}

impl Particle {
    /// Creates a particle at `origin` with every attribute drawn from [`ranges`].
    pub fn spawn<R: Rng + ?Sized>(
        origin: Vec2,
        shape: ConfettiShape,
        settings: &Settings,
        rng: &mut R,
    ) -> Self {
        let width = ranges::WIDTH.sample(rng) * settings.size;
        let height = ranges::HEIGHT.sample(rng) * settings.size;
        let speed = ranges::SPEED.sample(rng) * settings.speed;
        let angle = ranges::ANGLE.sample(rng);
        let rotation_speed = ranges::ROTATION_SPEED.sample(rng);
        let rotation = ranges::ANGLE.sample(rng);
        let base_color = Palette::random_color(rng);
        let color_variation = ranges::COLOR_VARIATION.sample(rng);
        let wobble_phase = ranges::PHASE.sample(rng);
        let wobble_speed = ranges::WOBBLE_SPEED.sample(rng);
        let wobble_amount = ranges::WOBBLE_AMOUNT.sample(rng);
        let max_life = ranges::MAX_LIFE.sample(rng);
        let scale_speed = ranges::SCALE_SPEED.sample(rng);
        let sparkle_speed = ranges::SPARKLE_SPEED.sample(rng);
        let sparkle_phase = ranges::PHASE.sample(rng);

        Self {
            position: origin,
            velocity: Vec2::from_angle(angle.to_radians()) * speed,
            shape,
            base_size: Vec2::new(width, height),
            rotation,
            rotation_speed,
            gravity: settings.gravity,
            base_color,
            color_variation,
            wobble_phase,
            wobble_speed,
            wobble_amount,
            life: 0.0,
            max_life,
            alpha: 1.0,
            scale: 1.0,
            scale_speed,
            sparkle_speed,
            sparkle_phase,
        }
    }

    /// Advances the particle by one tick.
    ///
    /// `time` is the cumulative simulation clock in seconds and only phases
    /// the oscillators; `tick_seconds` is added to `life`.
    pub fn update<R: Rng + ?Sized>(&mut self, time: f32, tick_seconds: f32, rng: &mut R) {
        self.life += tick_seconds;

        self.position += self.velocity;

        self.velocity.y += self.gravity;
        self.velocity *= AIR_RESISTANCE;

        let wobble_x = (time * self.wobble_speed + self.wobble_phase).sin() * self.wobble_amount;
        let wobble_y =
            (time * self.wobble_speed * 0.7 + self.wobble_phase).cos() * self.wobble_amount * 0.5;
        self.velocity.x += wobble_x * 0.1;
        self.velocity.y += wobble_y * 0.05;

        self.rotation = wrap_degrees(self.rotation + self.rotation_speed);

        self.scale = 1.0 + (time * self.scale_speed).sin() * 0.2;

        let fade_start = self.max_life * FADE_START;
        if self.life >= self.max_life {
            self.alpha = 0.0;
        } else if self.life > fade_start {
            let faded = 1.0 - (self.life - fade_start) / (self.max_life - fade_start);
            self.alpha = faded.clamp(0.0, self.alpha);
        }

        if rng.random_bool(JITTER_CHANCE) {
            self.velocity.x += ranges::JITTER_X.sample(rng);
            self.velocity.y += ranges::JITTER_Y.sample(rng);
        }
    }

    /// Returns `true` once the particle has faded out.
    pub fn is_expired(&self) -> bool {
        self.alpha <= ALPHA_EPSILON
    }

    /// Returns `true` if the particle fell below, or drifted left or right of,
    /// a `bounds`-sized screen by more than [`OFFSCREEN_MARGIN`].
    ///
    /// Particles above the top edge are kept: gravity brings them back.
    pub fn is_out_of_bounds(&self, bounds: Vec2) -> bool {
        self.position.y > bounds.y + OFFSCREEN_MARGIN
            || self.position.x < -OFFSCREEN_MARGIN
            || self.position.x > bounds.x + OFFSCREEN_MARGIN
    }

    /// Returns `true` if the particle should be removed from its population.
    pub fn should_remove(&self, bounds: Vec2) -> bool {
        self.is_expired() || self.is_out_of_bounds(bounds)
    }

    /// Translate, rotate and uniform scale mapping local shape space to the surface.
    pub fn transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            Vec2::splat(self.scale),
            self.rotation.to_radians(),
            self.position,
        )
    }

    /// The sparkle oscillator in `[0, 1]` at `time_ms`.
    ///
    /// `time_ms` is simulated time since the burst started, not wall-clock
    /// time, so a frame drawn at a given tick always looks the same.
    pub fn sparkle(&self, time_ms: f64) -> f32 {
        let phase = time_ms * 0.01 * f64::from(self.sparkle_speed) + f64::from(self.sparkle_phase);
        // keep the argument small before narrowing to f32
        let phase = (phase % std::f64::consts::TAU) as f32;
        (phase.sin() + 1.0) * 0.5
    }

    /// Display color at `time_ms`, including sparkle and fade.
    pub fn current_color(&self, time_ms: f64) -> Srgba {
        let brightness = (0.7 + 0.3 * self.sparkle(time_ms)) * self.color_variation;
        let alpha = (self.alpha * MAX_ALPHA).clamp(0.0, 255.0) as u8;
        shade(self.base_color, brightness, alpha)
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn wrap_degrees(degrees: f32) -> f32 {
    degrees.rem_euclid(360.0)
}

use bevy::prelude::*;
use rand::Rng;

use crate::particle::{ConfettiShape, Particle, ParticleRange};
use crate::settings::Settings;

/// Horizontal spread of spawn positions around the anchor.
pub const SPAWN_JITTER_X: ParticleRange = ParticleRange::new(-30.0, 30.0);
/// Vertical spread of spawn positions around the anchor.
pub const SPAWN_JITTER_Y: ParticleRange = ParticleRange::new(-20.0, 20.0);

/// Number of particles each shape receives when `count` is spread over
/// `shapes` shapes. Earlier shapes take the remainder, one each.
pub fn shape_counts(count: u32, shapes: usize) -> Vec<u32> {
    if shapes == 0 {
        return Vec::new();
    }
    let shapes_u32 = shapes as u32;
    let per_shape = count / shapes_u32;
    let remainder = count % shapes_u32;
    (0..shapes_u32)
        .map(|index| per_shape + u32::from(index < remainder))
        .collect()
}

/// Spawns `settings.count` particles around `origin`.
///
/// Particles are spread evenly across `settings.shapes` (every shape when the
/// list is empty), grouped by shape in list order.
pub fn spawn_population<R: Rng + ?Sized>(
    origin: Vec2,
    settings: &Settings,
    rng: &mut R,
) -> Vec<Particle> {
    let shapes: &[ConfettiShape] = if settings.shapes.is_empty() {
        &ConfettiShape::ALL
    } else {
        &settings.shapes
    };

    let mut population = Vec::with_capacity(settings.count as usize);
    for (&shape, amount) in shapes.iter().zip(shape_counts(settings.count, shapes.len())) {
        for _ in 0..amount {
            let offset = Vec2::new(SPAWN_JITTER_X.sample(rng), SPAWN_JITTER_Y.sample(rng));
            population.push(Particle::spawn(origin + offset, shape, settings, rng));
        }
    }

    debug!(
        "spawned {} confetti particles around ({:.0}, {:.0})",
        population.len(),
        origin.x,
        origin.y
    );
    population
}

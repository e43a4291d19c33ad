use bevy::prelude::*;

use crate::mesh::shape_outline;
use crate::particle::{ALPHA_EPSILON, Particle};

/// A transparent 2D drawing target owned by one effect session.
///
/// Coordinates are pixels with the origin in the top-left corner and y
/// pointing down. Dropping the surface releases it.
pub trait Surface {
    /// Size in pixels.
    fn size(&self) -> Vec2;

    /// Resets every pixel to fully transparent.
    fn clear(&mut self);

    /// Fills the closed polygon `points` with `color`, alpha blended over
    /// what is already there.
    fn fill_polygon(&mut self, points: &[Vec2], color: Srgba);

    /// Called once a frame is complete.
    fn present(&mut self) {}
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> Vec2 {
        (**self).size()
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Srgba) {
        (**self).fill_polygon(points, color);
    }

    fn present(&mut self) {
        (**self).present();
    }
}

impl Particle {
    /// Draws this particle at `time_ms`.
    ///
    /// `outline` is scratch space for the transformed shape, reused between calls.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        time_ms: f64,
        outline: &mut Vec<Vec2>,
    ) {
        if self.alpha <= ALPHA_EPSILON {
            return;
        }
        shape_outline(self.shape, self.base_size, outline);
        let transform = self.transform();
        for point in outline.iter_mut() {
            *point = transform.transform_point2(*point);
        }
        surface.fill_polygon(outline, self.current_color(time_ms));
    }
}

/// Draws whole populations onto a [`Surface`].
#[derive(Debug, Default)]
pub struct Renderer {
    outline: Vec<Vec2>,
    frames: u64,
}

impl Renderer {
    /// Creates a renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Clears `surface`, draws every particle in slice order and presents.
    pub fn draw_frame<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        particles: &[Particle],
        time_ms: f64,
    ) {
        surface.clear();
        for particle in particles {
            particle.render(surface, time_ms, &mut self.outline);
        }
        surface.present();
        self.frames += 1;
    }
}

use std::path::Path;

use bevy::prelude::*;
use image::{Rgba, RgbaImage};

use crate::render::Surface;
use crate::session::{SurfaceError, SurfaceProvider, SurfaceRequest};

/// Software [`Surface`] backed by an RGBA8 image.
///
/// Polygons are filled with the even-odd rule, sampling pixel centers, and
/// blended source-over with straight alpha.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    crossings: Vec<f32>,
}

impl RasterSurface {
    /// Creates a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            crossings: Vec::new(),
        }
    }

    /// The pixels drawn so far.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consumes the surface, returning its pixels.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Number of pixels with non-zero alpha.
    pub fn covered_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] > 0).count()
    }

    /// Writes the current frame as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Srgba) {
        if points.len() < 3 || color.alpha <= 0.0 {
            return;
        }
        let width = i64::from(self.image.width());
        let height = i64::from(self.image.height());

        let (min_y, max_y) = points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let first_row = (min_y.floor() as i64).clamp(0, height);
        let last_row = (max_y.ceil() as i64).clamp(0, height);

        for row in first_row..last_row {
            let center_y = row as f32 + 0.5;

            self.crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= center_y) != (b.y <= center_y) {
                    let t = (center_y - a.y) / (b.y - a.y);
                    self.crossings.push(a.x + t * (b.x - a.x));
                }
            }
            self.crossings.sort_by(f32::total_cmp);

            for span in self.crossings.chunks_exact(2) {
                let start = ((span[0] - 0.5).ceil() as i64).clamp(0, width);
                let end = ((span[1] - 0.5).ceil() as i64).clamp(0, width);
                for column in start..end {
                    let pixel = self.image.get_pixel_mut(column as u32, row as u32);
                    *pixel = blend_over(*pixel, color);
                }
            }
        }
    }
}

fn blend_over(dst: Rgba<u8>, src: Srgba) -> Rgba<u8> {
    let src_a = src.alpha.clamp(0.0, 1.0);
    let dst_a = f32::from(dst.0[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mix = |s: f32, d: u8| {
        let d = f32::from(d) / 255.0;
        let c = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src.red, dst.0[0]),
        mix(src.green, dst.0[1]),
        mix(src.blue, dst.0[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Hands out [`RasterSurface`]s sized to a fixed virtual screen.
#[derive(Debug, Clone)]
pub struct RasterSurfaceProvider {
    screen: UVec2,
}

impl RasterSurfaceProvider {
    /// Creates a provider for a `width × height` screen.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen: UVec2::new(width, height),
        }
    }
}

impl SurfaceProvider for RasterSurfaceProvider {
    type Surface = RasterSurface;

    fn screen_size(&self) -> Vec2 {
        self.screen.as_vec2()
    }

    fn acquire(&mut self, request: &SurfaceRequest) -> Result<RasterSurface, SurfaceError> {
        let size = request.size.round().as_uvec2();
        if size.x == 0 || size.y == 0 {
            return Err(SurfaceError::Empty {
                width: size.x,
                height: size.y,
            });
        }
        Ok(RasterSurface::new(size.x, size.y))
    }
}

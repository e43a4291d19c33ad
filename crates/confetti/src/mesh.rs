use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use crate::particle::ConfettiShape;

/// Segments used to approximate a circle.
pub const CIRCLE_SEGMENTS: usize = 24;
/// Segments used to flatten each cubic Bézier of the heart.
pub const BEZIER_SEGMENTS: usize = 8;

const STAR_POINTS: usize = 5;

// heart silhouette in a 20 unit wide design space, y pointing down:
// start point followed by four cubic segments (control, control, end).
const HEART_START: Vec2 = Vec2::new(0.0, 6.0);
const HEART_CURVES: [[Vec2; 3]; 4] = [
    [Vec2::new(-8.0, -2.0), Vec2::new(-12.0, -8.0), Vec2::new(-6.0, -8.0)],
    [Vec2::new(-3.0, -8.0), Vec2::new(0.0, -5.0), Vec2::new(0.0, -2.0)],
    [Vec2::new(0.0, -5.0), Vec2::new(3.0, -8.0), Vec2::new(6.0, -8.0)],
    [Vec2::new(12.0, -8.0), Vec2::new(8.0, -2.0), Vec2::new(0.0, 6.0)],
];
const HEART_DESIGN_WIDTH: f32 = 20.0;

/// Writes the outline of `shape` into `out`, centered at the origin.
///
/// `size` is the unscaled width and height. Coordinates are y-down, so
/// the triangle apex points up on screen. The outline is implicitly closed.
pub fn shape_outline(shape: ConfettiShape, size: Vec2, out: &mut Vec<Vec2>) {
    out.clear();
    let half = size / 2.0;

    match shape {
        ConfettiShape::Rectangle => {
            out.extend([
                Vec2::new(-half.x, -half.y),
                Vec2::new(half.x, -half.y),
                Vec2::new(half.x, half.y),
                Vec2::new(-half.x, half.y),
            ]);
        }
        ConfettiShape::Circle => {
            let radius = half.x;
            out.extend((0..CIRCLE_SEGMENTS).map(|i| {
                let theta = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
                Vec2::from_angle(theta) * radius
            }));
        }
        ConfettiShape::Triangle => {
            out.extend([
                Vec2::new(0.0, -half.y),
                Vec2::new(half.x, half.y),
                Vec2::new(-half.x, half.y),
            ]);
        }
        ConfettiShape::Star => {
            let outer = half.x;
            let inner = outer / 2.0;
            out.extend((0..STAR_POINTS * 2).map(|i| {
                let theta = i as f32 * PI / STAR_POINTS as f32;
                let radius = if i % 2 == 0 { outer } else { inner };
                Vec2::from_angle(theta) * radius
            }));
        }
        ConfettiShape::Heart => {
            let scale = size.x / HEART_DESIGN_WIDTH;
            let mut from = HEART_START;
            out.push(from * scale);
            for [c1, c2, to] in HEART_CURVES {
                for step in 1..=BEZIER_SEGMENTS {
                    let t = step as f32 / BEZIER_SEGMENTS as f32;
                    out.push(cubic_bezier(from, c1, c2, to, t) * scale);
                }
                from = to;
            }
            // last curve ends on the start point
            out.pop();
        }
    }
}

fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Writes a triangle list covering the simple polygon `points` into `out`,
/// as indices into `points`.
///
/// Works for concave outlines such as the star and heart, in either winding.
pub fn triangulate(points: &[Vec2], out: &mut Vec<u32>) {
    out.clear();
    if points.len() < 3 {
        return;
    }
    let winding = signed_area(points).signum();
    if winding == 0.0 {
        return;
    }

    let mut remaining: Vec<u32> = (0..points.len() as u32).collect();
    while remaining.len() > 3 {
        let Some(ear) = find_ear(points, &remaining, winding) else {
            // no clean ear left, which only happens on degenerate input
            for i in 1..remaining.len() - 1 {
                out.extend([remaining[0], remaining[i], remaining[i + 1]]);
            }
            return;
        };
        let len = remaining.len();
        out.extend([
            remaining[(ear + len - 1) % len],
            remaining[ear],
            remaining[(ear + 1) % len],
        ]);
        remaining.remove(ear);
    }
    out.extend([remaining[0], remaining[1], remaining[2]]);
}

fn find_ear(points: &[Vec2], remaining: &[u32], winding: f32) -> Option<usize> {
    let len = remaining.len();
    (0..len).find(|&i| {
        let prev = remaining[(i + len - 1) % len];
        let current = remaining[i];
        let next = remaining[(i + 1) % len];
        let (a, b, c) = (
            points[prev as usize],
            points[current as usize],
            points[next as usize],
        );
        if (b - a).perp_dot(c - b) * winding <= 0.0 {
            return false;
        }
        !remaining.iter().any(|&j| {
            j != prev
                && j != current
                && j != next
                && in_triangle(points[j as usize], a, b, c, winding)
        })
    })
}

fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2, winding: f32) -> bool {
    (b - a).perp_dot(p - a) * winding >= 0.0
        && (c - b).perp_dot(p - b) * winding >= 0.0
        && (a - c).perp_dot(p - c) * winding >= 0.0
}

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

//! Shape generation for 2D primitives
//!
//! Everything is emitted as triangle lists in overlay pixel coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Axis-aligned filled rectangle from its top-left corner
pub fn rect(top_left: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let a = top_left;
    let b = top_left + Vec2::new(size.x, 0.0);
    let c = top_left + size;
    let d = top_left + Vec2::new(0.0, size.y);
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(a.x, a.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

/// Thick line segment as a quad. Degenerate segments become a dot of the same width.
pub fn line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = width.max(0.5) / 2.0;
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return rect(from - Vec2::splat(half), Vec2::splat(half * 2.0), color);
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * half;

    let v1a = from + perp;
    let v1b = from - perp;
    let v2a = to + perp;
    let v2b = to - perp;

    // Two triangles
    vec![
        Vertex::new(v1a.x, v1a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2b.x, v2b.y, color),
    ]
}

/// Dashed vertical line from y = 0 to `height`
pub fn dashed_vertical(x: f32, height: f32, dash: f32, gap: f32, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let step = (dash + gap).max(1.0);
    let mut y = 0.0;
    while y < height {
        let end = (y + dash).min(height);
        vertices.extend(rect(
            Vec2::new(x - width / 2.0, y),
            Vec2::new(width, end - y),
            color,
        ));
        y += step;
    }
    vertices
}

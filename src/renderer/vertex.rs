//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in overlay pixel coordinates with a straight-alpha color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// CSS-style `hsla()` to linear RGBA components in 0..1
///
/// `h` in degrees, `s` and `l` in 0..1.
pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> [f32; 4] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m, a]
}

/// Replace the alpha of a color
#[inline]
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

/// CSS `rgba()` string for DOM text
pub fn css_rgba(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Colors for effect elements
pub mod colors {
    pub const BACKDROP: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// #10b981
    pub const PLAYER_PADDLE: [f32; 4] = [0.063, 0.725, 0.506, 1.0];
    /// #f43f5e
    pub const AI_PADDLE: [f32; 4] = [0.957, 0.247, 0.369, 1.0];
    /// #333
    pub const NET: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
    /// #444
    pub const SCORE: [f32; 4] = [0.267, 0.267, 0.267, 1.0];
    /// #666
    pub const CAPTION: [f32; 4] = [0.4, 0.4, 0.4, 1.0];
    pub const WIN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const LOSE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    /// #aaa
    pub const DEMO: [f32; 4] = [0.667, 0.667, 0.667, 1.0];
    /// Hint text (cyan-400 at half opacity)
    pub const HINT: [f32; 4] = [0.133, 0.827, 0.933, 0.5];
}

//! Per-frame scene description
//!
//! Kernels fill a `Scene` from read-only state; hosts turn it into GPU draws
//! (vertices) and DOM text (HUD).

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors, css_rgba};
use crate::sim::Viewport;

/// How the previous frame is cleared
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearMode {
    /// Replace everything with the backdrop
    Hard,
    /// Paint the backdrop at partial alpha so moving things leave trails
    Trail { alpha: f32 },
}

/// HUD text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// `pos` is the text center
    Center,
    /// `pos.y` is measured up from the bottom edge, centered horizontally
    Bottom,
}

/// A line of overlay text, rendered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct HudText {
    pub text: String,
    pub pos: Vec2,
    pub size_px: f32,
    pub color: [f32; 4],
    pub bold: bool,
    pub anchor: TextAnchor,
}

impl HudText {
    /// Inline style for an absolutely positioned DOM line
    pub fn css(&self) -> String {
        let position = match self.anchor {
            TextAnchor::Center => format!(
                "left:{}px;top:{}px;transform:translate(-50%,-50%);",
                self.pos.x, self.pos.y
            ),
            TextAnchor::Bottom => {
                format!("left:50%;bottom:{}px;transform:translateX(-50%);", self.pos.y)
            }
        };
        format!(
            "position:absolute;{position}font-size:{}px;color:{};font-weight:{};white-space:nowrap;",
            self.size_px,
            css_rgba(self.color),
            if self.bold { "bold" } else { "normal" },
        )
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub viewport: Viewport,
    pub clear: ClearMode,
    pub backdrop: [f32; 4],
    pub vertices: Vec<Vertex>,
    pub hud: Vec<HudText>,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            clear: ClearMode::Hard,
            backdrop: colors::BACKDROP,
            vertices: Vec::new(),
            hud: Vec::new(),
        }
    }

    /// Start a new frame, keeping allocations
    pub fn reset(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clear = ClearMode::Hard;
        self.backdrop = colors::BACKDROP;
        self.vertices.clear();
        self.hud.clear();
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        // Small dots don't need many segments
        let segments = if radius < 4.0 { 6 } else { 24 };
        self.vertices
            .extend(shapes::circle(center, radius, color, segments));
    }

    pub fn rect(&mut self, top_left: Vec2, size: Vec2, color: [f32; 4]) {
        self.vertices.extend(shapes::rect(top_left, size, color));
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        self.vertices.extend(shapes::line(from, to, width, color));
    }

    pub fn dashed_vertical(&mut self, x: f32, dash: f32, gap: f32, color: [f32; 4]) {
        self.vertices.extend(shapes::dashed_vertical(
            x,
            self.viewport.height,
            dash,
            gap,
            1.0,
            color,
        ));
    }

    pub fn text(&mut self, text: impl Into<String>, pos: Vec2, size_px: f32, color: [f32; 4]) -> &mut HudText {
        self.hud.push(HudText {
            text: text.into(),
            pos,
            size_px,
            color,
            bold: false,
            anchor: TextAnchor::Center,
        });
        let last = self.hud.len() - 1;
        &mut self.hud[last]
    }

    /// Full-screen quad of the backdrop at the trail alpha (None on a hard clear)
    pub fn trail_quad(&self) -> Option<Vec<Vertex>> {
        match self.clear {
            ClearMode::Hard => None,
            ClearMode::Trail { alpha } => {
                let mut color = self.backdrop;
                color[3] = alpha;
                Some(shapes::rect(
                    Vec2::ZERO,
                    Vec2::new(self.viewport.width, self.viewport.height),
                    color,
                ))
            }
        }
    }

    pub fn hud_text(&self) -> impl Iterator<Item = &str> {
        self.hud.iter().map(|t| t.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_nothing() {
        let mut scene = Scene::new(Viewport::new(100.0, 100.0));
        scene.circle(Vec2::splat(10.0), 5.0, colors::WHITE);
        scene.text("hi", Vec2::ZERO, 12.0, colors::WHITE);
        scene.clear = ClearMode::Trail { alpha: 0.3 };
        scene.reset(Viewport::new(200.0, 100.0));
        assert!(scene.vertices.is_empty());
        assert!(scene.hud.is_empty());
        assert_eq!(scene.clear, ClearMode::Hard);
        assert_eq!(scene.viewport.width, 200.0);
    }

    #[test]
    fn test_trail_quad_only_for_trails() {
        let mut scene = Scene::new(Viewport::new(100.0, 50.0));
        assert!(scene.trail_quad().is_none());
        scene.clear = ClearMode::Trail { alpha: 0.2 };
        let quad = scene.trail_quad().unwrap();
        assert_eq!(quad.len(), 6);
        assert!(quad.iter().all(|v| v.color[3] == 0.2));
    }

    #[test]
    fn test_text_builder() {
        let mut scene = Scene::new(Viewport::new(100.0, 50.0));
        scene.text("YOU WIN!", Vec2::new(50.0, 25.0), 80.0, colors::WIN).bold = true;
        assert_eq!(scene.hud_text().collect::<Vec<_>>(), vec!["YOU WIN!"]);
        assert!(scene.hud[0].bold);
    }

    #[test]
    fn test_hud_css_anchors() {
        let mut scene = Scene::new(Viewport::new(100.0, 50.0));
        scene.text("3", Vec2::new(25.0, 40.0), 48.0, colors::WHITE);
        let hint = scene.text("hold", Vec2::new(0.0, 20.0), 14.0, colors::HINT);
        hint.anchor = TextAnchor::Bottom;

        let center = scene.hud[0].css();
        assert!(center.contains("left:25px;top:40px;"));
        assert!(center.contains("font-weight:normal"));

        let bottom = scene.hud[1].css();
        assert!(bottom.contains("bottom:20px;"));
        assert!(bottom.contains("color:rgba(34, 211, 238, 0.5)"));
    }
}

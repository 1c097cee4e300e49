//! Collision checks for the pong table
//!
//! Paddles are thin vertical bands; the ball is treated as its bounding box.
//! Response is reposition-then-reflect, no sweep.

use glam::Vec2;

/// A paddle's hit band: `x_min..x_max` horizontally, `top..top+height` vertically
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleBand {
    pub x_min: f32,
    pub x_max: f32,
    pub top: f32,
    pub height: f32,
}

impl PaddleBand {
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// Result of a paddle check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Where along the paddle the ball struck: 0 = center, ±1 = edges
    pub offset: f32,
}

/// Which wall the ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallContact {
    Top,
    Bottom,
}

/// Overlap test between the ball's bounding box and a paddle band
pub fn ball_band_contact(ball_pos: Vec2, ball_radius: f32, band: &PaddleBand) -> Option<Contact> {
    let overlaps_x = ball_pos.x - ball_radius < band.x_max && ball_pos.x + ball_radius > band.x_min;
    let overlaps_y = ball_pos.y + ball_radius > band.top && ball_pos.y - ball_radius < band.bottom();
    if !(overlaps_x && overlaps_y) {
        return None;
    }
    let half = band.height / 2.0;
    Some(Contact {
        offset: (ball_pos.y - band.center_y()) / half,
    })
}

/// Clamp the ball inside `0..height` and point its vertical velocity back in
pub fn bounce_off_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, height: f32) -> Option<WallContact> {
    if pos.y - radius < 0.0 {
        pos.y = radius;
        vel.y = vel.y.abs();
        Some(WallContact::Top)
    } else if pos.y + radius > height {
        pos.y = height - radius;
        vel.y = -vel.y.abs();
        Some(WallContact::Bottom)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> PaddleBand {
        PaddleBand {
            x_min: 20.0,
            x_max: 40.0,
            top: 100.0,
            height: 120.0,
        }
    }

    #[test]
    fn test_center_hit_has_zero_offset() {
        let contact = ball_band_contact(Vec2::new(50.0, 160.0), 15.0, &band()).unwrap();
        assert!(contact.offset.abs() < 0.001);
    }

    #[test]
    fn test_edge_hit_offset_sign() {
        let top = ball_band_contact(Vec2::new(50.0, 100.0), 15.0, &band()).unwrap();
        let bottom = ball_band_contact(Vec2::new(50.0, 220.0), 15.0, &band()).unwrap();
        assert!((top.offset + 1.0).abs() < 0.001);
        assert!((bottom.offset - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_miss_above_paddle() {
        assert!(ball_band_contact(Vec2::new(30.0, 80.0), 15.0, &band()).is_none());
    }

    #[test]
    fn test_miss_beside_paddle() {
        assert!(ball_band_contact(Vec2::new(60.0, 160.0), 15.0, &band()).is_none());
    }

    #[test]
    fn test_wall_bounce_clamps_and_reflects() {
        let mut pos = Vec2::new(100.0, 5.0);
        let mut vel = Vec2::new(3.0, -4.0);
        assert_eq!(
            bounce_off_walls(&mut pos, &mut vel, 15.0, 600.0),
            Some(WallContact::Top)
        );
        assert_eq!(pos.y, 15.0);
        assert_eq!(vel.y, 4.0);

        let mut pos = Vec2::new(100.0, 598.0);
        let mut vel = Vec2::new(3.0, 4.0);
        assert_eq!(
            bounce_off_walls(&mut pos, &mut vel, 15.0, 600.0),
            Some(WallContact::Bottom)
        );
        assert_eq!(pos.y, 585.0);
        assert_eq!(vel.y, -4.0);
    }
}

//! Layout for the 2D scene: where pipes, lips, ground stripes and clouds go

use glam::Vec2;

use crate::sim::{Obstacle, Rect};

/// Pipe gradient stops (lip-end, far-end)
pub const PIPE_LIGHT: &str = "#3ea34f";
pub const PIPE_DARK: &str = "#2b7d3b";
pub const LIP_COLOR: &str = "rgba(0,0,0,0.15)";
pub const GROUND_COLOR: &str = "#6b4f2a";
pub const STRIPE_COLOR: &str = "#8f6a3a";
pub const CLOUD_COLOR: &str = "rgba(255,255,255,0.85)";
pub const AVATAR_FILL: &str = "#ffd166";
pub const FACE_COLOR: &str = "#333";
pub const OVERLAY_DIM: &str = "rgba(0,0,0,0.35)";
pub const SCORE_SHADOW: &str = "rgba(0,0,0,0.15)";

const LIP_HEIGHT: f32 = 10.0;
const LIP_OVERHANG: f32 = 2.0;
const STRIPE_PITCH: f32 = 16.0;
const STRIPE_SIZE: Vec2 = Vec2::new(8.0, 4.0);

/// Baseline of the score text and its shadow offset
pub const SCORE_BASELINE: f32 = 98.0;
pub const SCORE_SHADOW_OFFSET: f32 = 2.0;

/// Clouds loop across the field once per this many ms
const CLOUD_PERIOD_MS: f64 = 4000.0;
/// How far off the left edge a cloud travels before wrapping
const CLOUD_WRAP: f32 = 220.0;
/// Puffs of one cloud: (dx, dy, radius) before scaling
pub const CLOUD_PUFFS: [(f32, f32, f32); 3] = [(0.0, 0.0, 20.0), (18.0, -6.0, 16.0), (36.0, 0.0, 20.0)];

/// Upper and lower pipe bodies; the lower one stops at the ground
pub fn pipe_rects(obstacle: &Obstacle, ground_y: f32) -> (Rect, Rect) {
    let top = Rect::new(obstacle.x, 0.0, obstacle.width, obstacle.top);
    let bottom = Rect::new(
        obstacle.x,
        obstacle.bottom,
        obstacle.width,
        (ground_y - obstacle.bottom).max(0.0),
    );
    (top, bottom)
}

/// Darker bands hugging the gap on both sides
pub fn pipe_lips(obstacle: &Obstacle) -> [Rect; 2] {
    let x = obstacle.x - LIP_OVERHANG;
    let w = obstacle.width + LIP_OVERHANG * 2.0;
    [
        Rect::new(x, obstacle.top - LIP_HEIGHT, w, LIP_HEIGHT),
        Rect::new(x, obstacle.bottom, w, LIP_HEIGHT),
    ]
}

/// Short stripes along the top of the ground band
pub fn ground_stripes(field_width: f32, ground_y: f32) -> impl Iterator<Item = Rect> {
    let count = (field_width / STRIPE_PITCH).ceil().max(0.0) as usize;
    (0..count).map(move |i| Rect::new(i as f32 * STRIPE_PITCH, ground_y, STRIPE_SIZE.x, STRIPE_SIZE.y))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    pub scale: f32,
}

/// Three drifting clouds at `time_ms`
pub fn clouds(time_ms: f64, field_width: f32) -> [Cloud; 3] {
    let phase = (time_ms / CLOUD_PERIOD_MS).rem_euclid(1.0) as f32;
    std::array::from_fn(|i| {
        let i = i as f32;
        let x = (i * 200.0 + phase * field_width).rem_euclid(field_width + CLOUD_WRAP) - CLOUD_WRAP;
        Cloud {
            pos: Vec2::new(x, 80.0 + i * 40.0),
            scale: 1.0 + i * 0.2,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle() -> Obstacle {
        Obstacle::new(1, 200.0, 100.0, 160.0, 70.0)
    }

    #[test]
    fn test_pipe_bodies_leave_the_gap_open() {
        let (top, bottom) = pipe_rects(&obstacle(), 620.0);
        assert_eq!(top, Rect::new(200.0, 0.0, 70.0, 100.0));
        assert_eq!(bottom, Rect::new(200.0, 260.0, 70.0, 360.0));
        assert_eq!(bottom.y - top.bottom(), 160.0);
    }

    #[test]
    fn test_lips_overhang_the_pipe() {
        let [upper, lower] = pipe_lips(&obstacle());
        assert_eq!(upper, Rect::new(198.0, 90.0, 74.0, 10.0));
        assert_eq!(lower, Rect::new(198.0, 260.0, 74.0, 10.0));
    }

    #[test]
    fn test_stripes_cover_field_width() {
        let stripes: Vec<_> = ground_stripes(480.0, 620.0).collect();
        assert_eq!(stripes.len(), 30);
        assert_eq!(stripes[1].x, 16.0);
        assert!(stripes.iter().all(|r| r.y == 620.0 && r.w == 8.0));
    }

    #[test]
    fn test_clouds_wrap_and_stay_in_band() {
        for step in 0..200 {
            let t = step as f64 * 97.0;
            for (i, cloud) in clouds(t, 480.0).iter().enumerate() {
                assert!(cloud.pos.x >= -220.0 && cloud.pos.x < 480.0);
                assert_eq!(cloud.pos.y, 80.0 + i as f32 * 40.0);
            }
        }
        // Period of the drift
        assert_eq!(clouds(1000.0, 480.0), clouds(5000.0, 480.0));
    }
}

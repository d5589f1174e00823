//! Collision detection for the avatar
//!
//! Everything is an axis-aligned rectangle: the avatar's box, and the two
//! solid segments of each obstacle.

use glam::Vec2;

use super::state::{Avatar, Obstacle};
use crate::tuning::Tuning;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of `size` centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let origin = center - size / 2.0;
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap on both axes; shared edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Hit the upper segment of an obstacle
    ObstacleTop { id: u32 },
    /// Hit the lower segment of an obstacle
    ObstacleBottom { id: u32 },
    /// Box crossed above the field's top edge
    Ceiling,
    /// Box crossed below the ground line
    Ground,
}

impl Obstacle {
    /// Upper segment: field top down to the gap
    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.top)
    }

    /// Lower segment: gap bottom down to the ground line
    pub fn bottom_rect(&self, ground_y: f32) -> Rect {
        Rect::new(self.x, self.bottom, self.width, ground_y - self.bottom)
    }
}

impl Avatar {
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.pos, self.size)
    }
}

/// First obstacle segment `avatar_box` overlaps, checked oldest first
pub fn check_obstacles(avatar_box: &Rect, obstacles: &[Obstacle], ground_y: f32) -> Option<CollisionKind> {
    obstacles.iter().find_map(|o| {
        if avatar_box.overlaps(&o.top_rect()) {
            Some(CollisionKind::ObstacleTop { id: o.id })
        } else if avatar_box.overlaps(&o.bottom_rect(ground_y)) {
            Some(CollisionKind::ObstacleBottom { id: o.id })
        } else {
            None
        }
    })
}

/// Ceiling/ground test for the avatar's box
pub fn check_bounds(avatar_box: &Rect, ground_y: f32) -> Option<CollisionKind> {
    if avatar_box.y < 0.0 {
        Some(CollisionKind::Ceiling)
    } else if avatar_box.bottom() > ground_y {
        Some(CollisionKind::Ground)
    } else {
        None
    }
}

/// Full per-tick check: obstacles first (short-circuits), then bounds
pub fn check_collision(avatar: &Avatar, obstacles: &[Obstacle], tuning: &Tuning) -> Option<CollisionKind> {
    let avatar_box = avatar.bounds();
    let ground_y = tuning.ground_y();
    check_obstacles(&avatar_box, obstacles, ground_y).or_else(|| check_bounds(&avatar_box, ground_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GROUND_Y: f32 = 620.0;

    fn obstacle() -> Obstacle {
        Obstacle::new(1, 200.0, 100.0, 160.0, 70.0)
    }

    #[test]
    fn test_gap_bottom_follows_top() {
        assert_eq!(obstacle().bottom, 260.0);
    }

    #[test]
    fn test_box_inside_gap_is_clear() {
        let o = obstacle();
        let avatar_box = Rect::new(o.x + 5.0, 150.0, 10.0, 10.0);
        assert_eq!(check_obstacles(&avatar_box, &[o], GROUND_Y), None);
    }

    #[test]
    fn test_box_in_top_segment_collides() {
        let o = obstacle();
        let avatar_box = Rect::new(o.x + 5.0, 50.0, 10.0, 10.0);
        assert_eq!(
            check_obstacles(&avatar_box, &[o], GROUND_Y),
            Some(CollisionKind::ObstacleTop { id: 1 })
        );
    }

    #[test]
    fn test_box_in_bottom_segment_collides() {
        let o = obstacle();
        let avatar_box = Rect::new(o.x + 5.0, 300.0, 10.0, 10.0);
        assert_eq!(
            check_obstacles(&avatar_box, &[o], GROUND_Y),
            Some(CollisionKind::ObstacleBottom { id: 1 })
        );
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let o = obstacle();
        // Sits exactly on the gap's top edge
        let on_edge = Rect::new(o.x + 5.0, 100.0, 10.0, 10.0);
        assert_eq!(check_obstacles(&on_edge, &[o.clone()], GROUND_Y), None);
        // Ends exactly where the obstacle starts
        let beside = Rect::new(o.x - 10.0, 50.0, 10.0, 10.0);
        assert_eq!(check_obstacles(&beside, &[o], GROUND_Y), None);
    }

    #[test]
    fn test_first_hit_wins() {
        let a = Obstacle::new(1, 200.0, 100.0, 160.0, 70.0);
        let b = Obstacle::new(2, 210.0, 100.0, 160.0, 70.0);
        let avatar_box = Rect::new(215.0, 50.0, 10.0, 10.0);
        assert_eq!(
            check_obstacles(&avatar_box, &[a, b], GROUND_Y),
            Some(CollisionKind::ObstacleTop { id: 1 })
        );
    }

    #[test]
    fn test_bounds() {
        assert_eq!(check_bounds(&Rect::new(0.0, -1.0, 48.0, 48.0), GROUND_Y), Some(CollisionKind::Ceiling));
        assert_eq!(check_bounds(&Rect::new(0.0, 573.0, 48.0, 48.0), GROUND_Y), Some(CollisionKind::Ground));
        assert_eq!(check_bounds(&Rect::new(0.0, 572.0, 48.0, 48.0), GROUND_Y), None);
        assert_eq!(check_bounds(&Rect::new(0.0, 0.0, 48.0, 48.0), GROUND_Y), None);
    }

    #[test]
    fn test_avatar_bounds_are_centered() {
        let avatar = Avatar::new(&Tuning::default());
        assert_eq!(avatar.bounds(), Rect::new(96.0, 296.0, 48.0, 48.0));
    }

    proptest! {
        #[test]
        fn prop_disjoint_on_one_axis_never_collides(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            w in 1.0f32..100.0,
            h in 1.0f32..100.0,
            gap in 0.0f32..100.0,
        ) {
            let a = Rect::new(x, y, w, h);
            let right_of = Rect::new(a.right() + gap, y, w, h);
            let below = Rect::new(x, a.bottom() + gap, w, h);
            prop_assert!(!a.overlaps(&right_of));
            prop_assert!(!a.overlaps(&below));
            prop_assert!(!right_of.overlaps(&a));
        }

        #[test]
        fn prop_shared_interior_point_collides(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            w in 2.0f32..100.0,
            h in 2.0f32..100.0,
        ) {
            let a = Rect::new(x, y, w, h);
            let b = Rect::new(x + w / 2.0, y + h / 2.0, w, h);
            prop_assert!(a.overlaps(&b));
            prop_assert!(b.overlaps(&a));
        }
    }
}

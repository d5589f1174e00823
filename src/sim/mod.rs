//! Simulation module
//!
//! All gameplay logic lives here:
//! - Delta-normalized physics (one tick per rendered frame)
//! - Seeded RNG only, injectable per state
//! - Obstacles kept in spawn order
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod machine;
pub mod state;
pub mod tick;

pub use collision::{CollisionKind, Rect, check_bounds, check_collision, check_obstacles};
pub use machine::{Controls, Effect, ModeEvent, Transition, transition};
pub use state::{Avatar, GameMode, GameState, Obstacle, random_gap_top};
pub use tick::{GameEvent, tick};

//! Game state and core simulation types
//!
//! Everything the frame driver mutates lives in one `GameState` context.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::highscores::Scoreboard;
use crate::persistence::BestScoreStore;
use crate::tuning::Tuning;

/// Current mode of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Waiting for the first start action
    Menu,
    /// Active gameplay
    Running,
    /// Frozen mid-run
    Paused,
    /// Run ended by a collision
    GameOver,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Menu,
        GameMode::Running,
        GameMode::Paused,
        GameMode::GameOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Menu => "menu",
            GameMode::Running => "running",
            GameMode::Paused => "paused",
            GameMode::GameOver => "gameover",
        }
    }
}

/// The player-controlled falling entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Center position; x never changes after creation
    pub pos: Vec2,
    /// Vertical velocity (positive = down)
    pub vel_y: f32,
    pub size: Vec2,
    /// Presentation-only tilt in radians
    pub angle: f32,
}

impl Avatar {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.avatar_x(), tuning.avatar_start_y()),
            vel_y: 0.0,
            size: Vec2::splat(tuning.avatar_size),
            angle: 0.0,
        }
    }

    /// Back to mid-field, at rest
    pub fn reset(&mut self, tuning: &Tuning) {
        self.pos.y = tuning.avatar_start_y();
        self.vel_y = 0.0;
        self.angle = 0.0;
    }

    /// Override (not add to) the current velocity with the flap impulse
    pub fn flap(&mut self, flap_velocity: f32) {
        self.vel_y = flap_velocity;
    }
}

/// A gated barrier: solid above `top`, solid below `bottom`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Leading (left) edge
    pub x: f32,
    /// Bottom of the upper segment
    pub top: f32,
    /// Top of the lower segment; always `top + gap`
    pub bottom: f32,
    pub width: f32,
    /// Set once the avatar has cleared it
    pub passed: bool,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, top: f32, gap: f32, width: f32) -> Self {
        Self {
            id,
            x,
            top,
            bottom: top + gap,
            width,
            passed: false,
        }
    }

    /// Right edge
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    pub fn gap(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Complete game state for one session
pub struct GameState {
    pub tuning: Tuning,
    pub mode: GameMode,
    pub avatar: Avatar,
    /// Spawn order == screen order (newest has the largest x)
    pub obstacles: Vec<Obstacle>,
    pub scoreboard: Scoreboard,
    /// Time accumulated since the last spawn (ms)
    pub spawn_timer: f32,
    /// Obstacle placement randomness; seeded so runs are reproducible in tests
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state in `Menu`, loading the persisted best score
    pub fn new(tuning: Tuning, seed: u64, store: Box<dyn BestScoreStore>) -> Self {
        Self {
            avatar: Avatar::new(&tuning),
            tuning,
            mode: GameMode::Menu,
            obstacles: Vec::new(),
            scoreboard: Scoreboard::new(store),
            spawn_timer: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Swap the placement RNG (tests pin exact gap positions this way)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Allocate a new obstacle ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear the run: avatar, obstacles, score and spawn timer
    pub fn reset_run(&mut self) {
        self.obstacles.clear();
        self.spawn_timer = 0.0;
        self.avatar.reset(&self.tuning);
        self.scoreboard.set_score(0);
    }

    /// Append one obstacle at the right edge with a random gap
    pub fn spawn_obstacle(&mut self) -> &Obstacle {
        let top = random_gap_top(&mut self.rng, &self.tuning);
        let id = self.next_entity_id();
        let x = self.tuning.field_width + crate::consts::SPAWN_X_OFFSET;
        self.obstacles.push(Obstacle::new(
            id,
            x,
            top,
            self.tuning.gap,
            self.tuning.obstacle_width,
        ));
        log::debug!("Spawned obstacle {} with gap top {}", id, top);
        &self.obstacles[self.obstacles.len() - 1]
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn best(&self) -> u32 {
        self.scoreboard.best()
    }
}

/// Uniform whole-pixel gap top in `[spawn_margin, max_gap_top)`
pub fn random_gap_top<R: Rng>(rng: &mut R, tuning: &Tuning) -> f32 {
    // Round the bound up so flooring the sample never lands inside the margin
    let min = tuning.spawn_margin.ceil();
    let max = tuning.max_gap_top();
    if max <= min {
        return min;
    }
    rng.random_range(min..max).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn state() -> GameState {
        GameState::new(Tuning::default(), 42, Box::new(MemoryStore::default()))
    }

    #[test]
    fn test_new_state_is_menu_at_mid_field() {
        let state = state();
        assert_eq!(state.mode, GameMode::Menu);
        assert_eq!(state.avatar.pos, Vec2::new(120.0, 320.0));
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_spawned_obstacle_respects_margins() {
        let mut state = state();
        for _ in 0..200 {
            let tuning = state.tuning.clone();
            let obstacle = state.spawn_obstacle().clone();
            assert!(obstacle.top >= tuning.spawn_margin);
            assert!(obstacle.top < tuning.max_gap_top());
            assert_eq!(obstacle.gap(), tuning.gap);
            assert_eq!(obstacle.x, tuning.field_width + 10.0);
            assert!(!obstacle.passed);
        }
        // IDs are strictly increasing in spawn order
        assert!(state.obstacles.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_fractional_margin_is_respected() {
        let tuning = Tuning {
            spawn_margin: 60.5,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..2000 {
            let top = random_gap_top(&mut rng, &tuning);
            assert!(top >= 60.5, "gap top {top} inside the margin");
            assert!(top < tuning.max_gap_top());
            assert_eq!(top, top.floor());
        }
    }

    #[test]
    fn test_same_seed_same_gaps() {
        let mut a = state();
        let mut b = state();
        for _ in 0..10 {
            assert_eq!(a.spawn_obstacle().top, b.spawn_obstacle().top);
        }
    }

    #[test]
    fn test_reset_run_clears_everything() {
        let mut state = state();
        state.spawn_obstacle();
        state.spawn_timer = 900.0;
        state.avatar.pos.y = 10.0;
        state.avatar.vel_y = 5.0;
        state.avatar.angle = 0.5;
        state.scoreboard.set_score(3);

        state.reset_run();
        assert!(state.obstacles.is_empty());
        assert_eq!(state.spawn_timer, 0.0);
        assert_eq!(state.avatar.pos.y, 320.0);
        assert_eq!(state.avatar.vel_y, 0.0);
        assert_eq!(state.avatar.angle, 0.0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.best(), 3);
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let mut avatar = Avatar::new(&Tuning::default());
        avatar.vel_y = 13.0;
        avatar.flap(-8.8);
        assert_eq!(avatar.vel_y, -8.8);
    }
}

//! Flappy Gates - A side-scrolling gate-dodging arcade game
//!
//! Core modules:
//! - `sim`: Simulation (physics, obstacles, collisions, mode state machine)
//! - `game`: Frame driver and command dispatch over the simulation
//! - `input`: Raw key/pointer events to logical commands
//! - `audio`: Cue scheduling and the audio sink boundary
//! - `renderer`: Render sink boundary and the Canvas 2D renderer
//! - `persistence`: Best score storage
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod audio;
pub mod clock;
pub mod game;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::Scoreboard;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Play field size in pixels
    pub const FIELD_WIDTH: f32 = 480.0;
    pub const FIELD_HEIGHT: f32 = 640.0;

    /// Motion constants are tuned per 60 Hz frame; deltas are normalized to this
    pub const REFERENCE_FRAME_MS: f32 = 16.67;
    /// Upper bound on a single frame delta
    pub const MAX_FRAME_DELTA_MS: f32 = 34.0;

    /// Avatar sits at a quarter of the field width
    pub const AVATAR_X_FRACTION: f32 = 0.25;
    pub const AVATAR_SIZE: f32 = 48.0;

    /// Tilt mapping (presentation only)
    pub const TILT_GAIN: f32 = 0.8;
    pub const TILT_MIN: f32 = -0.45;
    pub const TILT_MAX: f32 = 0.9;

    /// Obstacles spawn just past the right edge
    pub const SPAWN_X_OFFSET: f32 = 10.0;
    /// Obstacles are dropped once their trailing edge is left of this
    pub const DESPAWN_X: f32 = -10.0;

    /// Audio cue timing
    pub const TRANSIENT_CUE_COOLDOWN_MS: f64 = 400.0;
    pub const TRANSIENT_CUE_MAX_MS: f64 = 800.0;
    pub const TERMINAL_CUE_MAX_MS: f64 = 2000.0;
}

/// Clamp `value` into `[min, max]` without panicking on inverted bounds
#[inline]
pub fn clamp_f32(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

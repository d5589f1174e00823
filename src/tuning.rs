//! Data-driven game balance
//!
//! Motion values are per 60 Hz reference frame; the tick scales them by
//! `delta / REFERENCE_FRAME_MS`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a tuning document is rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("gap of {gap} with margin {margin} does not fit a {height}px field")]
    GapDoesNotFit { gap: f32, margin: f32, height: f32 },
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,
    /// Ground strip height at the bottom of the field
    pub ground_height: f32,
    /// Downward acceleration (px per frame²)
    pub gravity: f32,
    /// Velocity set by a flap (negative = up)
    pub flap_velocity: f32,
    pub max_fall_speed: f32,
    pub avatar_size: f32,
    /// Vertical opening between the two obstacle segments
    pub gap: f32,
    pub obstacle_width: f32,
    /// Horizontal scroll speed (px per frame)
    pub obstacle_speed: f32,
    pub spawn_interval_ms: f32,
    /// Minimum distance between the gap and the field edges
    pub spawn_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            ground_height: 20.0,
            gravity: 0.5,
            flap_velocity: -8.8,
            max_fall_speed: 14.0,
            avatar_size: AVATAR_SIZE,
            gap: 160.0,
            obstacle_width: 70.0,
            obstacle_speed: 2.6,
            spawn_interval_ms: 1500.0,
            spawn_margin: 60.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would make spawning or motion meaningless
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("max_fall_speed", self.max_fall_speed),
            ("avatar_size", self.avatar_size),
            ("gap", self.gap),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_speed", self.obstacle_speed),
            ("spawn_interval_ms", self.spawn_interval_ms),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        for (field, value) in [
            ("ground_height", self.ground_height),
            ("spawn_margin", self.spawn_margin),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }

        // Gap tops are whole pixels, so the margin rounds up
        if self.max_gap_top() <= self.spawn_margin.ceil() {
            return Err(TuningError::GapDoesNotFit {
                gap: self.gap,
                margin: self.spawn_margin,
                height: self.field_height,
            });
        }
        Ok(())
    }

    /// Y of the ground line (top of the ground strip)
    pub fn ground_y(&self) -> f32 {
        self.field_height - self.ground_height
    }

    /// Exclusive upper bound for a spawned gap's top edge
    pub fn max_gap_top(&self) -> f32 {
        self.ground_y() - self.spawn_margin - self.gap
    }

    pub fn avatar_x(&self) -> f32 {
        self.field_width * AVATAR_X_FRACTION
    }

    pub fn avatar_start_y(&self) -> f32 {
        self.field_height * 0.5
    }
}

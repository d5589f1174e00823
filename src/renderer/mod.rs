//! Rendering module
//!
//! The game hands a `FrameView` snapshot to a `RenderSink` once per frame.
//! Layout math lives in `shapes` so it can be tested without a browser;
//! `canvas` draws it with the Canvas 2D API.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

use crate::sim::{Avatar, GameMode, Obstacle};
use crate::tuning::Tuning;

/// Everything a renderer may read for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub avatar: &'a Avatar,
    pub obstacles: &'a [Obstacle],
    pub score: u32,
    pub best: u32,
    pub mode: GameMode,
    pub tuning: &'a Tuning,
    /// Host timestamp of the frame (ms), drives background animation
    pub time_ms: f64,
}

impl FrameView<'_> {
    /// Dimmed overlay message for the current mode, if any
    pub fn overlay_text(&self) -> Option<&'static str> {
        overlay_text(self.mode)
    }
}

/// Draws a frame. Must not mutate game state.
pub trait RenderSink {
    fn render(&mut self, view: &FrameView<'_>);
}

/// Renderer that only counts frames (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub last_mode: Option<GameMode>,
}

impl RenderSink for NullRenderer {
    fn render(&mut self, view: &FrameView<'_>) {
        self.frames += 1;
        self.last_mode = Some(view.mode);
    }
}

pub fn overlay_text(mode: GameMode) -> Option<&'static str> {
    match mode {
        GameMode::Menu => Some("Click/Tap to Start"),
        GameMode::Paused => Some("Paused"),
        GameMode::GameOver => Some("Game Over - Click/Tap to Restart"),
        GameMode::Running => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_only_when_not_running() {
        assert_eq!(overlay_text(GameMode::Running), None);
        assert_eq!(overlay_text(GameMode::Menu), Some("Click/Tap to Start"));
        assert_eq!(overlay_text(GameMode::Paused), Some("Paused"));
        assert!(overlay_text(GameMode::GameOver).unwrap().starts_with("Game Over"));
    }

    #[test]
    fn test_null_renderer_counts() {
        let tuning = Tuning::default();
        let avatar = Avatar::new(&tuning);
        let view = FrameView {
            avatar: &avatar,
            obstacles: &[],
            score: 0,
            best: 0,
            mode: GameMode::Paused,
            tuning: &tuning,
            time_ms: 0.0,
        };
        let mut r = NullRenderer::default();
        r.render(&view);
        r.render(&view);
        assert_eq!(r.frames, 2);
        assert_eq!(r.last_mode, Some(GameMode::Paused));
        assert_eq!(view.overlay_text(), Some("Paused"));
    }
}

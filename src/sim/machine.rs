//! Mode state machine
//!
//! One transition table, one dispatch function. Events with no entry for the
//! current mode are ignored.

use super::state::GameMode;

/// Events that can move the game between modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeEvent {
    /// Begin a fresh run (from menu or game over)
    Start,
    /// Continue a paused run in place
    Resume,
    Pause,
    /// Collision or out-of-bounds detected during a tick
    Crash,
    /// Back to the menu from anywhere
    Restart,
}

impl ModeEvent {
    pub const ALL: [ModeEvent; 5] = [
        ModeEvent::Start,
        ModeEvent::Resume,
        ModeEvent::Pause,
        ModeEvent::Crash,
        ModeEvent::Restart,
    ];
}

/// Side effects a transition asks the game to perform, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Reset avatar, obstacles, score and spawn timer
    ResetRun,
    /// Stop the transient cue and cancel its pending stop timer
    StopTransientCue,
    /// Play the terminal cue once
    PlayTerminalCue,
}

/// A legal transition and what it requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: GameMode,
    pub to: GameMode,
    pub effects: &'static [Effect],
}

const RESET: &[Effect] = &[Effect::ResetRun];
const PAUSE: &[Effect] = &[Effect::StopTransientCue];
const CRASH: &[Effect] = &[Effect::StopTransientCue, Effect::PlayTerminalCue];
const RESTART: &[Effect] = &[Effect::StopTransientCue, Effect::ResetRun];

/// Look up the transition for `event` in `mode`, if any
pub fn transition(mode: GameMode, event: ModeEvent) -> Option<Transition> {
    use GameMode::*;
    use ModeEvent::*;

    let (to, effects): (GameMode, &'static [Effect]) = match (mode, event) {
        (Menu, Start) => (Running, RESET),
        (GameOver, Start) => (Running, RESET),
        (Paused, Resume) => (Running, &[]),
        (Running, Pause) => (Paused, PAUSE),
        (Running, Crash) => (GameOver, CRASH),
        (_, Restart) => (Menu, RESTART),
        _ => return None,
    };
    Some(Transition {
        from: mode,
        to,
        effects,
    })
}

/// Which control buttons are usable in a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub restart_enabled: bool,
}

impl Controls {
    pub fn for_mode(mode: GameMode) -> Self {
        let running = mode == GameMode::Running;
        Self {
            start_enabled: !running,
            pause_enabled: running,
            restart_enabled: true,
        }
    }
}

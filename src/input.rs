//! Input routing
//!
//! Maps raw key, pointer and button events to the few logical commands the
//! game understands. Holding a key produces one command per physical press.

use std::collections::HashSet;

/// Where a pointer press landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The play surface (canvas)
    PlaySurface,
    /// An interactive control (button, input, label, link...)
    Control,
    /// Anywhere else on the page
    Elsewhere,
}

/// On-screen control buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    Start,
    Pause,
    Restart,
}

/// A raw event from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// `code` is the physical key (`"Space"`), `key` the produced value (`" "`)
    KeyDown {
        code: String,
        key: String,
        repeat: bool,
    },
    KeyUp {
        code: String,
    },
    /// Mouse-down or touch-start
    PointerDown {
        target: PointerTarget,
    },
    Button(ControlButton),
}

impl RawInput {
    pub fn key_down(code: &str, key: &str) -> Self {
        RawInput::KeyDown {
            code: code.to_string(),
            key: key.to_string(),
            repeat: false,
        }
    }

    pub fn key_repeat(code: &str, key: &str) -> Self {
        RawInput::KeyDown {
            code: code.to_string(),
            key: key.to_string(),
            repeat: true,
        }
    }

    pub fn key_up(code: &str) -> Self {
        RawInput::KeyUp {
            code: code.to_string(),
        }
    }

    /// Counts as a user gesture for audio unlocking
    pub fn is_gesture(&self) -> bool {
        matches!(self, RawInput::KeyDown { .. } | RawInput::PointerDown { .. })
    }
}

/// Logical commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flap while running, otherwise start (or resume)
    Primary,
    /// Running <-> paused
    PauseToggle,
    /// Start (or resume) only if not running; never flaps
    StartIfIdle,
    /// Pause only if running
    Pause,
    Restart,
}

/// Is this a flap/start key?
pub fn is_primary_key(code: &str, key: &str) -> bool {
    matches!(code, "ArrowUp" | "Space" | "Enter" | "KeyW")
        || matches!(key, " " | "Spacebar" | "w" | "W")
}

pub fn is_pause_key(code: &str) -> bool {
    code == "KeyP"
}

/// Raw event to command mapping with key-repeat suppression
#[derive(Debug, Default)]
pub struct InputRouter {
    held: HashSet<String>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one raw event; `None` means ignore it
    pub fn route(&mut self, input: &RawInput) -> Option<Command> {
        match input {
            RawInput::KeyDown { code, key, repeat } => {
                let primary = is_primary_key(code, key);
                let pause = is_pause_key(code);
                if !primary && !pause {
                    return None;
                }
                // Auto-repeat, flagged or not: only the first press counts
                if *repeat || !self.held.insert(code.clone()) {
                    return None;
                }
                if primary {
                    Some(Command::Primary)
                } else {
                    Some(Command::PauseToggle)
                }
            }
            RawInput::KeyUp { code } => {
                self.held.remove(code);
                None
            }
            RawInput::PointerDown { target } => match target {
                PointerTarget::PlaySurface => Some(Command::Primary),
                PointerTarget::Elsewhere => Some(Command::StartIfIdle),
                PointerTarget::Control => None,
            },
            RawInput::Button(button) => Some(match button {
                ControlButton::Start => Command::StartIfIdle,
                ControlButton::Pause => Command::Pause,
                ControlButton::Restart => Command::Restart,
            }),
        }
    }

    /// Forget held keys (window lost focus, so key-ups may never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_keys() {
        for (code, key) in [
            ("Space", " "),
            ("ArrowUp", "ArrowUp"),
            ("Enter", "Enter"),
            ("KeyW", "w"),
            ("", "W"),
            ("", "Spacebar"),
        ] {
            assert!(is_primary_key(code, key), "{code:?}/{key:?}");
        }
        assert!(!is_primary_key("KeyP", "p"));
        assert!(!is_primary_key("ArrowDown", "ArrowDown"));
    }

    #[test]
    fn test_flagged_repeat_is_ignored() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(&RawInput::key_down("Space", " ")), Some(Command::Primary));
        for _ in 0..10 {
            assert_eq!(router.route(&RawInput::key_repeat("Space", " ")), None);
        }
    }

    #[test]
    fn test_unflagged_repeat_is_ignored_until_release() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(&RawInput::key_down("KeyW", "w")), Some(Command::Primary));
        assert_eq!(router.route(&RawInput::key_down("KeyW", "w")), None);
        assert_eq!(router.route(&RawInput::key_up("KeyW")), None);
        assert_eq!(router.route(&RawInput::key_down("KeyW", "w")), Some(Command::Primary));
    }

    #[test]
    fn test_different_keys_are_independent_presses() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(&RawInput::key_down("Space", " ")), Some(Command::Primary));
        assert_eq!(router.route(&RawInput::key_down("ArrowUp", "ArrowUp")), Some(Command::Primary));
    }

    #[test]
    fn test_pause_key() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(&RawInput::key_down("KeyP", "p")), Some(Command::PauseToggle));
        assert_eq!(router.route(&RawInput::key_repeat("KeyP", "p")), None);
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(&RawInput::key_down("KeyQ", "q")), None);
        assert_eq!(router.route(&RawInput::key_down("Escape", "Escape")), None);
    }

    #[test]
    fn test_pointer_targets() {
        let mut router = InputRouter::new();
        let press = |target| RawInput::PointerDown { target };
        assert_eq!(router.route(&press(PointerTarget::PlaySurface)), Some(Command::Primary));
        assert_eq!(router.route(&press(PointerTarget::Elsewhere)), Some(Command::StartIfIdle));
        assert_eq!(router.route(&press(PointerTarget::Control)), None);
    }

    #[test]
    fn test_buttons() {
        let mut router = InputRouter::new();
        assert_eq!(router.route(&RawInput::Button(ControlButton::Start)), Some(Command::StartIfIdle));
        assert_eq!(router.route(&RawInput::Button(ControlButton::Pause)), Some(Command::Pause));
        assert_eq!(router.route(&RawInput::Button(ControlButton::Restart)), Some(Command::Restart));
    }

    #[test]
    fn test_release_all_rearms_keys() {
        let mut router = InputRouter::new();
        router.route(&RawInput::key_down("Space", " "));
        router.release_all();
        assert_eq!(router.route(&RawInput::key_down("Space", " ")), Some(Command::Primary));
    }
}

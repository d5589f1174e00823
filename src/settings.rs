//! Player preferences
//!
//! Persisted separately from the best score in LocalStorage. None of these
//! affect the simulation.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Flap cue volume (0 - 100 %)
    pub flap_volume: f32,
    /// Silence all cues
    pub muted: bool,
    /// Draw drifting clouds behind the obstacles
    pub clouds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flap_volume: 100.0,
            muted: false,
            clouds: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "ff_settings";

    /// Volume clamped into range
    pub fn set_flap_volume(&mut self, percent: f32) {
        self.flap_volume = if percent.is_nan() {
            100.0
        } else {
            percent.clamp(0.0, 100.0)
        };
    }

    /// Label for the volume readout
    pub fn flap_volume_label(&self) -> String {
        format!("{}%", self.flap_volume.round() as i32)
    }

    /// Load settings from LocalStorage (defaults when absent or unreadable)
    pub fn load() -> Self {
        match crate::platform::storage_get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    settings
                }
                Err(e) => {
                    log::warn!("Stored settings are malformed ({}), using defaults", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::debug!("Settings storage unavailable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        let result = serde_json::to_string(self)
            .map_err(crate::persistence::PersistError::from)
            .and_then(|json| crate::platform::storage_set(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::debug!("Settings not saved: {}", e),
        }
    }
}

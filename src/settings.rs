//! Game settings
//!
//! Read from LocalStorage when present; the game never writes them back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::Mixer;
use crate::consts::BALL_COUNT;

/// Upper bound on balls per session
pub const MAX_BALLS: usize = 200;

/// Settings parse failure
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Balls spawned per session
    pub ball_count: usize,

    // === Audio ===
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Visuals ===
    /// Glow around balls (costly on slow devices)
    pub glow: bool,

    /// Fixed RNG seed; random per load when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_count: BALL_COUNT,
            sfx_volume: 1.0,
            music_volume: 0.08,
            muted: false,
            glow: true,
            seed: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "evil_circle_settings";

    /// Parse settings JSON; missing fields take defaults, values are clamped
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Clamp values into their valid ranges
    pub fn sanitized(mut self) -> Self {
        self.ball_count = self.ball_count.clamp(1, MAX_BALLS);
        self.sfx_volume = clamp_volume(self.sfx_volume, 1.0);
        self.music_volume = clamp_volume(self.music_volume, 0.08);
        self
    }

    /// Audio mixer for these settings
    pub fn mixer(&self) -> Mixer {
        Mixer {
            sfx_volume: self.sfx_volume,
            music_volume: self.music_volume,
            muted: self.muted,
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

fn clamp_volume(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"muted": true, "seed": 7}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.ball_count, BALL_COUNT);
        assert_eq!(settings.music_volume, 0.08);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let settings =
            Settings::from_json(r#"{"ball_count": 0, "sfx_volume": 3.5, "music_volume": -1}"#)
                .unwrap();
        assert_eq!(settings.ball_count, 1);
        assert_eq!(settings.sfx_volume, 1.0);
        assert_eq!(settings.music_volume, 0.0);

        let many = Settings::from_json(r#"{"ball_count": 100000}"#).unwrap();
        assert_eq!(many.ball_count, MAX_BALLS);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = Settings::from_json("{ball_count: 3").unwrap_err();
        assert!(err.to_string().starts_with("malformed settings"));
    }

    #[test]
    fn test_mixer_from_settings() {
        let settings = Settings {
            sfx_volume: 0.5,
            muted: true,
            ..Default::default()
        };
        let mixer = settings.mixer();
        assert_eq!(mixer.sfx_volume, 0.5);
        assert!(mixer.muted);
    }

    #[test]
    fn test_native_load_is_default() {
        assert_eq!(Settings::load(), Settings::default());
    }
}

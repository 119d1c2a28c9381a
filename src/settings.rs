//! User preferences
//!
//! Persisted to LocalStorage on the web build; native uses defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_RADIUS, DEFAULT_VELOCITY, SAMPLE_COUNT};

/// Rendering quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    /// No anti-aliasing
    Low,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Multisample count for this preset
    pub fn sample_count(&self) -> u32 {
        match self {
            QualityPreset::Low => 1,
            QualityPreset::High => SAMPLE_COUNT,
        }
    }
}

/// Preferences for spawning and rendering faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Anti-aliasing quality
    pub quality: QualityPreset,
    /// Radius of a newly spawned face in pixels
    pub spawn_radius: f32,
    /// Velocity of a newly spawned face in pixels per second
    pub spawn_velocity: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::default(),
            spawn_radius: DEFAULT_RADIUS,
            spawn_velocity: [DEFAULT_VELOCITY, DEFAULT_VELOCITY],
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "smileys_settings";

    pub fn sample_count(&self) -> u32 {
        self.quality.sample_count()
    }

    pub fn spawn_velocity(&self) -> Vec2 {
        Vec2::from_array(self.spawn_velocity)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.spawn_radius, 100.0);
        assert_eq!(settings.spawn_velocity(), Vec2::new(10.0, 10.0));
        assert_eq!(settings.sample_count(), 4);
    }

    #[test]
    fn test_quality_preset_sample_counts() {
        assert_eq!(QualityPreset::Low.sample_count(), 1);
        assert_eq!(QualityPreset::High.sample_count(), 4);
    }

    #[test]
    fn test_quality_preset_round_trips_through_names() {
        for preset in [QualityPreset::Low, QualityPreset::High] {
            assert_eq!(QualityPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_settings_serialize_round_trip() {
        let settings = Settings {
            quality: QualityPreset::Low,
            spawn_radius: 42.0,
            spawn_velocity: [3.0, -7.0],
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quality, QualityPreset::Low);
        assert_eq!(back.spawn_radius, 42.0);
        assert_eq!(back.spawn_velocity, [3.0, -7.0]);
    }
}

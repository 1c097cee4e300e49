//! Effect settings and preferences
//!
//! Read from LocalStorage on web (the host page owns that entry), defaults
//! everywhere else. The runtime never writes them back.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Fixed size of the warp star pool
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 400,
            QualityPreset::Medium => 800,
            QualityPreset::High => 1200,
        }
    }

    /// Cap on live fireworks particles
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 640,
            QualityPreset::Medium => 1600,
            QualityPreset::High => 3200,
        }
    }
}

/// Catalog filter mode, read from the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContentMode {
    #[default]
    Standard,
    /// Restricted-content source: swaps/removes some catalog entries
    Restricted,
}

/// Effect settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Catalog filter mode
    pub content_mode: ContentMode,
    /// Partial-alpha trail fill instead of a hard clear
    pub trails: bool,
    /// Show hint text (warp)
    pub show_hints: bool,
    /// Reduced motion: random picks skip the simulations
    pub reduced_motion: bool,
    /// Touch-first device (lower interaction limit)
    pub touch_device: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            content_mode: ContentMode::Standard,
            trails: true,
            show_hints: true,
            reduced_motion: false,
            touch_device: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops trails for fill-rate
        if preset == QualityPreset::Low {
            self.trails = false;
        }
    }

    /// Effective trail fill (respects reduced_motion)
    pub fn effective_trails(&self) -> bool {
        self.trails && !self.reduced_motion
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "overlay_fx_settings";

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

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

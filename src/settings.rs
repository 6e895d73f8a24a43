//! Game settings and preferences
//!
//! The simulation core reads exactly one field: `mode`. Everything else is
//! carried for the embedding front end, serialized and handed back
//! untouched.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::tuning::DifficultyMode;

/// Obstacle-density preference forwarded to front ends for preview
/// screens. The core derives real densities from `tuning`, not from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DensityTier {
    Sparse,
    #[default]
    Standard,
    Dense,
}

impl DensityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityTier::Sparse => "Sparse",
            DensityTier::Standard => "Standard",
            DensityTier::Dense => "Dense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sparse" => Some(DensityTier::Sparse),
            "standard" | "std" => Some(DensityTier::Standard),
            "dense" => Some(DensityTier::Dense),
            _ => None,
        }
    }
}

/// Settings/preferences blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Difficulty mode; the only field the core interprets.
    pub mode: DifficultyMode,

    // === Forwarded to the front end, never interpreted here ===
    /// Density preview preference
    pub density_tier: DensityTier,
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Particle effects
    pub particles: bool,
    /// Show FPS counter
    pub show_fps: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: DifficultyMode::Baseline,
            density_tier: DensityTier::Standard,
            screen_shake: true,
            particles: true,
            show_fps: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "pentipede_settings";

    /// Load settings through the store; any failure yields defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY)
            && let Ok(settings) = serde_json::from_str(&json)
        {
            log::info!("loaded settings");
            return settings;
        }
        log::info!("using default settings");
        Self::default()
    }

    /// Persist settings through the store; failures are the store's
    /// problem.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            store.set(Self::STORAGE_KEY, &json);
        }
    }
}

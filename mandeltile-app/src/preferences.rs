use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use mandeltile_core::ViewState;
use mandeltile_render::{ColorScaling, ViewConfig};

/// Settings read from `preferences.json` next to the executable.
///
/// Every field has a default, so older or hand-edited files load as long as
/// they are valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    /// Size of the rayon pool computing tiles. `0` lets rayon decide.
    #[serde(default)]
    pub worker_threads: usize,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,
    #[serde(default)]
    pub color_scaling: ColorScaling,
    #[serde(default)]
    pub home_view: ViewState,
    #[serde(default = "default_true")]
    pub show_hud: bool,
}

fn default_window_width() -> f32 {
    1280.0
}
fn default_window_height() -> f32 {
    720.0
}
fn default_tile_size() -> u32 {
    ViewConfig::default().tile_size
}
fn default_max_iterations() -> u32 {
    ViewConfig::default().max_iterations
}
fn default_palette_size() -> usize {
    ViewConfig::default().palette_size
}
fn default_true() -> bool {
    true
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            worker_threads: 0,
            tile_size: default_tile_size(),
            max_iterations: default_max_iterations(),
            palette_size: default_palette_size(),
            color_scaling: ColorScaling::default(),
            home_view: ViewState::HOME,
            show_hud: true,
        }
    }
}

impl AppPreferences {
    /// Load preferences from next to the executable, falling back to defaults.
    /// A missing file is created with the defaults.
    pub fn load() -> Self {
        let path = crate::app_dir::preferences_path();
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            let prefs = Self::default();
            prefs.save_to(&path);
            return prefs;
        }
        match fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    return prefs;
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Persist preferences to disk.
    pub fn save(&self) {
        self.save_to(&crate::app_dir::preferences_path());
    }

    fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    /// Renderer configuration for a canvas of `width` x `height` pixels.
    pub fn view_config(&self, width: u32, height: u32) -> ViewConfig {
        ViewConfig {
            width,
            height,
            tile_size: self.tile_size,
            max_iterations: self.max_iterations,
            palette_size: self.palette_size,
            color_scaling: self.color_scaling,
            home_view: self.home_view,
        }
    }
}

use serde::{Deserialize, Serialize};

use mandeltile_core::{CoreError, FractalParams, ViewState};

use crate::error::RenderError;
use crate::palette::{ColorScaling, DEFAULT_PALETTE_SIZE};
use crate::tile::DEFAULT_TILE_SIZE;

/// Construction parameters for a [`FractalView`](crate::FractalView).
///
/// Missing fields take their defaults when deserialized, so a partial JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Maximum tile side in pixels.
    pub tile_size: u32,
    pub max_iterations: u32,
    pub palette_size: usize,
    pub color_scaling: ColorScaling,
    /// View shown at startup and restored by a reset.
    pub home_view: ViewState,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            tile_size: DEFAULT_TILE_SIZE,
            max_iterations: FractalParams::DEFAULT_MAX_ITERATIONS,
            palette_size: DEFAULT_PALETTE_SIZE,
            color_scaling: ColorScaling::Global,
            home_view: ViewState::HOME,
        }
    }
}

impl ViewConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.tile_size == 0 {
            return Err(RenderError::InvalidTileSize(self.tile_size));
        }
        if self.max_iterations == 0 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations).into());
        }
        if self.palette_size < 2 {
            return Err(RenderError::InvalidPaletteSize(self.palette_size));
        }
        self.home_view.validate()?;
        Ok(())
    }
}

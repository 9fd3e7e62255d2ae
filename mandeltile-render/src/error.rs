use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("invalid tile size: {0}×{0} (must be > 0)")]
    InvalidTileSize(u32),

    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid palette size: {0} (must be >= 2)")]
    InvalidPaletteSize(usize),

    #[error("iteration count {iterations} outside palette domain [{min}, {max}]")]
    PaletteIndexOutOfRange { iterations: u32, min: u32, max: u32 },

    #[error(transparent)]
    Core(#[from] mandeltile_core::CoreError),
}

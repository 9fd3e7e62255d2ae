use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid scale: {0} (must be positive and finite)")]
    InvalidScale(f64),

    #[error("invalid offset: ({x}, {y}) (must be finite)")]
    InvalidOffset { x: f64, y: f64 },

    #[error("invalid image width: {0} (must be > 0)")]
    InvalidImageWidth(u32),
}

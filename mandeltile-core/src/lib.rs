pub mod camera;
pub mod complex;
pub mod error;
pub mod mandelbrot;
pub mod params;
pub mod transform;
pub mod view;

// Re-export primary types for convenience.
pub use camera::{Camera, GestureEvent, GestureTouch};
pub use complex::Complex;
pub use error::CoreError;
pub use mandelbrot::{iterate, Mandelbrot};
pub use params::FractalParams;
pub use transform::{Similarity, Vector2};
pub use view::ViewState;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

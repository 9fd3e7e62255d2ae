pub mod config;
pub mod error;
pub mod grid;
pub mod palette;
pub mod sink;
pub mod tile;
pub mod view;
pub mod worker;

pub use config::ViewConfig;
pub use error::RenderError;
pub use grid::TileGrid;
pub use palette::{ColorScaling, Palette, PaletteScale, Rgba, DEFAULT_PALETTE_SIZE, INTERIOR_COLOR};
pub use sink::{MemorySink, PixelSink};
pub use tile::{build_tile_grid, TileId, TileRect, DEFAULT_TILE_SIZE};
pub use view::{FractalView, ViewChangedHook};
pub use worker::{IterationGrid, TileJob, TileWorker, WorkerState};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;

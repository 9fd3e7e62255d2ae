use tracing::debug;

use mandeltile_core::ViewState;

use crate::error::RenderError;
use crate::palette::{ColorScaling, Palette};
use crate::sink::PixelSink;
use crate::tile::{build_tile_grid, TileId, TileRect};
use crate::worker::{TileJob, TileWorker};

/// One tile of a grid: its rectangle, its worker, and where it paints.
#[derive(Debug)]
struct TileSlot<S> {
    rect: TileRect,
    worker: TileWorker,
    sink: S,
    pending: bool,
}

/// A full image partitioned into tiles, each computed by its own worker.
///
/// Tiles never overlap and together cover the image exactly. The grid is
/// driven from one thread: it starts runs, polls them, and paints finished
/// tiles into their sinks.
#[derive(Debug)]
pub struct TileGrid<S: PixelSink> {
    width: u32,
    height: u32,
    tile_size: u32,
    slots: Vec<TileSlot<S>>,
}

impl<S: PixelSink> TileGrid<S> {
    /// Partition a `width` x `height` image into tiles of at most
    /// `tile_size` pixels per side. `make_sink` is called once per tile.
    pub fn new<F>(width: u32, height: u32, tile_size: u32, mut make_sink: F) -> crate::Result<Self>
    where
        F: FnMut(TileId, &TileRect) -> S,
    {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if tile_size == 0 {
            return Err(RenderError::InvalidTileSize(tile_size));
        }

        let slots: Vec<_> = build_tile_grid(width, height, tile_size)
            .into_iter()
            .enumerate()
            .map(|(i, rect)| TileSlot {
                sink: make_sink(TileId(i), &rect),
                worker: TileWorker::new(rect),
                rect,
                pending: false,
            })
            .collect();

        debug!(width, height, tile_size, tiles = slots.len(), "Built tile grid");
        Ok(Self {
            width,
            height,
            tile_size,
            slots,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Restart every tile for `view`. Runs still in flight are cancelled
    /// first so the joins below do not wait on full computations.
    pub fn recompute_all(&mut self, view: &ViewState, max_iterations: u32) {
        for slot in &self.slots {
            slot.worker.cancel();
        }

        let pixel_size = view.pixel_size(self.width);
        for slot in &mut self.slots {
            let job = TileJob {
                origin: view.pixel_to_complex(slot.rect.x as f64, slot.rect.y as f64, self.width),
                pixel_size,
                max_iterations,
            };
            slot.worker.start(job);
            slot.pending = true;
        }
    }

    /// Paint every tile whose run finished since the last poll. Returns
    /// `true` when no tile of the current cycle is still outstanding.
    pub fn poll_and_apply_completed(&mut self, palette: &Palette, scaling: ColorScaling) -> bool {
        for slot in self.slots.iter_mut().filter(|s| s.pending) {
            if slot.worker.try_apply(&mut slot.sink, palette, scaling) {
                slot.pending = false;
            }
        }
        self.pending_count() == 0
    }

    /// Signal every worker to stop. Never blocks; outstanding tiles are
    /// dropped from the current cycle.
    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            slot.worker.cancel();
            slot.pending = false;
        }
    }

    /// Cancel and join every worker.
    pub fn stop_all(&mut self) {
        self.cancel_all();
        for slot in &mut self.slots {
            slot.worker.stop_and_join();
        }
    }

    /// `true` when no worker has a run in progress.
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(|s| !s.worker.is_running())
    }

    /// Tiles of the current cycle not yet painted.
    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.pending).count()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &TileRect, &S)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (TileId(i), &s.rect, &s.sink))
    }

    pub fn worker(&self, id: TileId) -> Option<&TileWorker> {
        self.slots.get(id.0).map(|s| &s.worker)
    }

    pub fn sink(&self, id: TileId) -> Option<&S> {
        self.slots.get(id.0).map(|s| &s.sink)
    }

    pub fn sink_mut(&mut self, id: TileId) -> Option<&mut S> {
        self.slots.get_mut(id.0).map(|s| &mut s.sink)
    }
}

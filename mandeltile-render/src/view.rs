use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use mandeltile_core::{Camera, GestureEvent, Similarity, ViewState};

use crate::config::ViewConfig;
use crate::grid::TileGrid;
use crate::palette::{Palette, DEFAULT_PALETTE_SIZE};
use crate::sink::PixelSink;
use crate::tile::{TileId, TileRect};

/// Callback fired after a gesture has been committed to the view.
pub type ViewChangedHook = Box<dyn FnMut(&ViewState)>;

/// A double-buffered, tiled Mandelbrot image driven by gestures.
///
/// Two grids share one partition. The foreground grid is what the host
/// shows; the background grid computes the latest committed view and takes
/// over the foreground role once every tile has been painted. While that is
/// in progress the host keeps drawing the foreground through
/// [`foreground_transform`](Self::foreground_transform), so the stale image
/// follows the user's gesture.
///
/// All methods run on the host's frame thread and never block on tile
/// computation, apart from the short joins of cancelled runs on restart.
pub struct FractalView<S: PixelSink> {
    config: ViewConfig,
    palette: Arc<Palette>,
    grids: [TileGrid<S>; 2],
    /// The view each grid's image was (or is being) computed for.
    image_views: [ViewState; 2],
    logical: ViewState,
    foreground: usize,
    pending_swap: bool,
    swaps: u64,
    camera: Camera,
    on_view_changed: Option<ViewChangedHook>,
}

impl<S: PixelSink> FractalView<S> {
    /// Build both grids and start computing the home view.
    ///
    /// `make_sink` receives the buffer index (0 or 1) and the tile it is
    /// creating a sink for.
    pub fn new<F>(config: ViewConfig, mut make_sink: F) -> crate::Result<Self>
    where
        F: FnMut(usize, TileId, &TileRect) -> S,
    {
        config.validate()?;

        let palette = if config.palette_size == DEFAULT_PALETTE_SIZE {
            Palette::shared()
        } else {
            Arc::new(Palette::grayscale(config.palette_size)?)
        };

        let (w, h, t) = (config.width, config.height, config.tile_size);
        let first = TileGrid::new(w, h, t, |id, rect| make_sink(0, id, rect))?;
        let second = TileGrid::new(w, h, t, |id, rect| make_sink(1, id, rect))?;

        let home = config.home_view;
        let mut view = Self {
            config,
            palette,
            grids: [first, second],
            image_views: [home; 2],
            logical: home,
            foreground: 0,
            pending_swap: false,
            swaps: 0,
            camera: Camera::new(),
            on_view_changed: None,
        };
        info!(
            width = w,
            height = h,
            tiles = view.grids[0].len(),
            "Fractal view created"
        );
        view.set_logical(home);
        Ok(view)
    }

    fn background(&self) -> usize {
        1 - self.foreground
    }

    /// Feed one input event. Returns `true` when the event committed a new
    /// view, after which the `on_view_changed` hook has been fired.
    pub fn handle_input(&mut self, event: &GestureEvent) -> bool {
        if !self.camera.handle_input(event) {
            return false;
        }
        if !self.commit_view_change() {
            return false;
        }
        let logical = self.logical;
        if let Some(hook) = self.on_view_changed.as_mut() {
            hook(&logical);
        }
        true
    }

    /// Fold the camera's accumulated transform into the logical view and
    /// start computing it in the background. Returns `false` if the fold
    /// produced an invalid view, which is discarded.
    pub fn commit_view_change(&mut self) -> bool {
        let folded = self.logical.folded(
            self.camera.scale_factor(),
            self.camera.offset_delta(),
            self.config.width,
        );
        self.camera.reset_accumulator();
        match folded {
            Ok(view) => {
                self.set_logical(view);
                true
            }
            Err(e) => {
                warn!("Discarding gesture: {e}");
                false
            }
        }
    }

    /// Jump to `view` directly.
    pub fn update(&mut self, view: ViewState) -> crate::Result<()> {
        view.validate()?;
        self.camera.reset_accumulator();
        self.set_logical(view);
        Ok(())
    }

    /// Return to the configured home view, dropping any gesture in progress.
    pub fn reset_view(&mut self) {
        self.camera.reset();
        let home = self.config.home_view;
        info!("View reset");
        self.set_logical(home);
    }

    fn set_logical(&mut self, view: ViewState) {
        self.logical = view;
        let bg = self.background();
        self.image_views[bg] = view;
        self.grids[bg].recompute_all(&view, self.config.max_iterations);
        self.pending_swap = true;
        debug!(
            buffer = bg,
            offset_x = view.offset_x,
            offset_y = view.offset_y,
            scale = view.scale,
            "Background recompute started"
        );
    }

    /// Drive the background grid. Call once per frame. Returns `true` on the
    /// frame where the background finished and became the foreground.
    pub fn tick(&mut self) -> bool {
        if !self.pending_swap {
            return false;
        }
        let bg = self.background();
        let done = self.grids[bg].poll_and_apply_completed(&self.palette, self.config.color_scaling);
        if !done {
            return false;
        }
        self.foreground = bg;
        self.pending_swap = false;
        self.swaps += 1;
        debug!(foreground = bg, swaps = self.swaps, "Buffers swapped");
        true
    }

    /// Where the foreground image should be drawn: the live gesture applied
    /// on top of the offset between the image's view and the logical view.
    pub fn foreground_transform(&self) -> Similarity {
        let presentation = self
            .logical
            .presentation_transform(&self.image_views[self.foreground], self.config.width);
        self.camera.transform().compose(&presentation)
    }

    pub fn set_on_view_changed<F>(&mut self, hook: F)
    where
        F: FnMut(&ViewState) + 'static,
    {
        self.on_view_changed = Some(Box::new(hook));
    }

    /// The most recently committed view.
    pub fn current_view(&self) -> ViewState {
        self.logical
    }

    /// The view the foreground image shows.
    pub fn foreground_view(&self) -> ViewState {
        self.image_views[self.foreground]
    }

    pub fn is_pending_swap(&self) -> bool {
        self.pending_swap
    }

    /// Number of completed buffer swaps since creation.
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    /// Index (0 or 1) of the grid currently shown.
    pub fn foreground_index(&self) -> usize {
        self.foreground
    }

    pub fn foreground_tiles(&self) -> impl Iterator<Item = (TileId, &TileRect, &S)> + '_ {
        self.grids[self.foreground].tiles()
    }

    pub fn foreground_grid(&self) -> &TileGrid<S> {
        &self.grids[self.foreground]
    }

    pub fn background_grid(&self) -> &TileGrid<S> {
        &self.grids[self.background()]
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }
}

impl<S: PixelSink> fmt::Debug for FractalView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FractalView")
            .field("config", &self.config)
            .field("logical", &self.logical)
            .field("image_views", &self.image_views)
            .field("foreground", &self.foreground)
            .field("pending_swap", &self.pending_swap)
            .field("swaps", &self.swaps)
            .finish_non_exhaustive()
    }
}

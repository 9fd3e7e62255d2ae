use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use tracing::{trace, warn};

use mandeltile_core::{iterate, Complex};

use crate::palette::{ColorScaling, Palette};
use crate::sink::PixelSink;
use crate::tile::TileRect;

// ---------------------------------------------------------------------------
// Jobs and grids
// ---------------------------------------------------------------------------

/// Immutable snapshot of everything one tile run needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileJob {
    /// Complex coordinate of the tile's top-left pixel.
    pub origin: Complex,
    /// Complex-plane units per pixel.
    pub pixel_size: f64,
    pub max_iterations: u32,
}

/// Per-pixel escape counts of one tile, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationGrid {
    pub counts: Vec<u32>,
    /// Smallest count observed in the last completed run.
    pub min: u32,
    /// Largest count observed in the last completed run.
    pub max: u32,
    /// Iteration cap the counts were computed with.
    pub max_iterations: u32,
}

impl IterationGrid {
    /// Compute a whole tile on the calling thread.
    pub fn compute(width: u32, height: u32, job: &TileJob) -> Self {
        let mut grid = Self::default();
        grid.fill(width, height, job, &AtomicBool::new(false));
        grid
    }

    /// Smallest and largest count among pixels that escaped, or `None` when
    /// the whole tile is interior.
    pub fn escaped_range(&self) -> Option<(u32, u32)> {
        self.counts
            .iter()
            .filter(|&&n| n < self.max_iterations)
            .fold(None, |range, &n| match range {
                None => Some((n, n)),
                Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
            })
    }

    /// Evaluate every pixel, checking `cancel` before each row. Returns
    /// `false` if the run was cut short, leaving the grid partially written.
    fn fill(&mut self, width: u32, height: u32, job: &TileJob, cancel: &AtomicBool) -> bool {
        let w = width as usize;
        self.counts.clear();
        self.counts.resize(w * height as usize, 0);
        self.max_iterations = job.max_iterations;

        let mut min = u32::MAX;
        let mut max = 0;
        for (row, line) in self.counts.chunks_exact_mut(w.max(1)).enumerate() {
            if cancel.load(Ordering::Relaxed) {
                return false;
            }
            let im = job.origin.im + row as f64 * job.pixel_size;
            for (col, slot) in line.iter_mut().enumerate() {
                let c = Complex::new(job.origin.re + col as f64 * job.pixel_size, im);
                let n = iterate(c, job.max_iterations);
                *slot = n;
                min = min.min(n);
                max = max.max(n);
            }
        }
        self.min = min;
        self.max = max;
        true
    }
}

// ---------------------------------------------------------------------------
// State token
// ---------------------------------------------------------------------------

/// Lifecycle of a tile worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Idle = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Idle,
        }
    }
}

/// The only state shared between a worker and its background task.
#[derive(Debug)]
struct Control {
    state: AtomicU8,
    cancel: AtomicBool,
}

impl Control {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(WorkerState::Idle as u8),
            cancel: AtomicBool::new(false),
        }
    }

    fn load(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn store(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// What a background run hands back when it exits.
struct TileRun {
    grid: IterationGrid,
    completed: bool,
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Owns one tile's iteration grid and the background run that fills it.
///
/// The grid buffer is moved into the run and handed back over a one-shot
/// channel, so the run is its only writer while it is in flight and the
/// coordinator only reads it after receiving it. At most one run per tile
/// exists at any time: [`start`](Self::start) joins the previous run first.
#[derive(Debug)]
pub struct TileWorker {
    rect: TileRect,
    control: Arc<Control>,
    in_flight: Option<Receiver<TileRun>>,
    grid: IterationGrid,
    job: Option<TileJob>,
}

impl TileWorker {
    pub fn new(rect: TileRect) -> Self {
        Self {
            rect,
            control: Arc::new(Control::new()),
            in_flight: None,
            grid: IterationGrid::default(),
            job: None,
        }
    }

    pub fn rect(&self) -> &TileRect {
        &self.rect
    }

    /// The job of the most recent run, if any was started.
    pub fn job(&self) -> Option<&TileJob> {
        self.job.as_ref()
    }

    pub fn state(&self) -> WorkerState {
        self.control.load()
    }

    /// Non-blocking snapshot.
    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// The grid of the last run that was handed back, or `None` while a run
    /// is in flight.
    pub fn grid(&self) -> Option<&IterationGrid> {
        if self.in_flight.is_some() {
            None
        } else {
            Some(&self.grid)
        }
    }

    /// `(min, max)` counts of the last completed run.
    pub fn iteration_range(&self) -> Option<(u32, u32)> {
        if self.state() == WorkerState::Completed && self.in_flight.is_none() {
            Some((self.grid.min, self.grid.max))
        } else {
            None
        }
    }

    /// Begin a new run, stopping and joining any run still in flight.
    pub fn start(&mut self, job: TileJob) {
        self.stop_and_join();

        let mut grid = std::mem::take(&mut self.grid);
        let control = Arc::clone(&self.control);
        let (width, height) = (self.rect.width, self.rect.height);
        let (tx, rx) = mpsc::sync_channel(1);

        control.cancel.store(false, Ordering::Relaxed);
        control.store(WorkerState::Running);

        rayon::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                grid.fill(width, height, &job, &control.cancel)
            }));
            // A panicked run drops `tx` unsent; the worker sees a closed channel.
            let Ok(completed) = outcome else {
                return;
            };
            control.store(if completed {
                WorkerState::Completed
            } else {
                WorkerState::Cancelled
            });
            let _ = tx.send(TileRun { grid, completed });
        });

        self.in_flight = Some(rx);
        self.job = Some(job);
    }

    /// Ask the current run to stop at the next row. Never blocks.
    pub fn cancel(&self) {
        self.control.cancel.store(true, Ordering::Relaxed);
    }

    /// Cancel and block until the current run has handed its grid back.
    /// Returns immediately when nothing is in flight.
    pub fn stop_and_join(&mut self) {
        let Some(rx) = self.in_flight.take() else {
            return;
        };
        self.cancel();
        match rx.recv() {
            Ok(run) => {
                trace!(x = self.rect.x, y = self.rect.y, completed = run.completed, "Joined tile run");
                self.grid = run.grid;
            }
            Err(_) => self.recover_lost_run(),
        }
    }

    /// Collect a finished run without blocking. Returns `true` once a run
    /// has completed, after painting its grid into `sink` and committing.
    ///
    /// Returns `false` while running, and for runs that were cancelled or
    /// never started. Calling again after a `true` repaints the same data.
    pub fn try_apply<S: PixelSink>(
        &mut self,
        sink: &mut S,
        palette: &Palette,
        scaling: ColorScaling,
    ) -> bool {
        let received = self.in_flight.as_ref().map(|rx| rx.try_recv());
        match received {
            None => {}
            Some(Ok(run)) => {
                self.in_flight = None;
                self.grid = run.grid;
                if !run.completed {
                    return false;
                }
                trace!(
                    x = self.rect.x,
                    y = self.rect.y,
                    min = self.grid.min,
                    max = self.grid.max,
                    "Tile completed"
                );
            }
            Some(Err(TryRecvError::Empty)) => return false,
            Some(Err(TryRecvError::Disconnected)) => {
                self.in_flight = None;
                self.recover_lost_run();
                return false;
            }
        }

        if self.state() != WorkerState::Completed {
            return false;
        }
        self.paint(sink, palette, scaling);
        true
    }

    fn paint<S: PixelSink>(&self, sink: &mut S, palette: &Palette, scaling: ColorScaling) {
        let grid = &self.grid;
        let scale = match (scaling, grid.escaped_range()) {
            (ColorScaling::PerTile, Some((lo, hi))) => {
                palette.escaped_scale(lo, hi, grid.max_iterations)
            }
            _ => palette.scale(0, grid.max_iterations),
        };
        let w = self.rect.width as usize;
        for (row, line) in grid.counts.chunks_exact(w.max(1)).enumerate() {
            for (col, &n) in line.iter().enumerate() {
                sink.set_pixel(col as u32, row as u32, scale.color(n));
            }
        }
        sink.commit();
    }

    /// The run's task panicked and went away without reporting.
    fn recover_lost_run(&mut self) {
        warn!(
            x = self.rect.x,
            y = self.rect.y,
            "Tile run exited without a result; resetting tile"
        );
        self.grid = IterationGrid::default();
        self.control.store(WorkerState::Idle);
    }
}

impl Drop for TileWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

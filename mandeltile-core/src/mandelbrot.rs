use crate::complex::Complex;
use crate::params::FractalParams;

/// Squared bailout radius. `|z|² >= 4` is the same test as `|z| >= 2`.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Count escape-time iterations of `z ← z² + c` starting from `z = 0`.
///
/// Returns the number of steps taken before `|z|²` reached
/// [`ESCAPE_RADIUS_SQ`], or `max_iterations` if the orbit stayed bounded for
/// the whole budget. Pure and allocation-free, so any number of threads may
/// call it concurrently.
#[inline]
pub fn iterate(c: Complex, max_iterations: u32) -> u32 {
    let mut z = Complex::ZERO;
    let mut n = 0;
    while z.norm_sq() < ESCAPE_RADIUS_SQ && n < max_iterations {
        n += 1;
        z = z.square_add(c);
    }
    n
}

/// The Mandelbrot set with a fixed iteration budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mandelbrot {
    params: FractalParams,
}

impl Mandelbrot {
    pub fn new(params: FractalParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FractalParams {
        &self.params
    }

    #[inline]
    pub fn iterate(&self, c: Complex) -> u32 {
        iterate(c, self.params.max_iterations)
    }
}

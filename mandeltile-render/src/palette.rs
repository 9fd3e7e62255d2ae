use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// An RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// Color of points that never escaped.
pub const INTERIOR_COLOR: Rgba = [0, 0, 0, 255];

/// Number of entries in the shared palette.
pub const DEFAULT_PALETTE_SIZE: usize = 255;

static SHARED: OnceLock<Arc<Palette>> = OnceLock::new();

/// How iteration counts are stretched over the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScaling {
    /// Every tile maps `[0, max_iterations]` onto the table. Seamless.
    #[default]
    Global,
    /// Every tile stretches its own escaped `[min, max]` over the slots
    /// below the interior one. More contrast per tile, visible seams.
    PerTile,
}

/// A lookup table from iteration counts to colors.
///
/// The last slot is reserved for interior points; the rest is a
/// non-decreasing grayscale ramp. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    /// Build a grayscale ramp of `size` entries, the last one [`INTERIOR_COLOR`].
    pub fn grayscale(size: usize) -> crate::Result<Self> {
        if size < 2 {
            return Err(RenderError::InvalidPaletteSize(size));
        }
        Ok(Self::ramp(size))
    }

    fn ramp(size: usize) -> Self {
        let mut colors: Vec<Rgba> = (0..size)
            .map(|i| {
                let v = (i as f32 / size as f32 * 255.0) as u8;
                [v, v, v, 255]
            })
            .collect();
        colors[size - 1] = INTERIOR_COLOR;
        Self { colors }
    }

    /// The process-wide palette of [`DEFAULT_PALETTE_SIZE`] entries, built on first use.
    pub fn shared() -> Arc<Palette> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::ramp(DEFAULT_PALETTE_SIZE))))
    }

    pub fn size(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Prepare a mapping for counts in `[min_iterations, max_iterations]`,
    /// where `max_iterations` is also the interior count.
    pub fn scale(&self, min_iterations: u32, max_iterations: u32) -> PaletteScale<'_> {
        let factor = if max_iterations != min_iterations {
            (self.colors.len() - 1) as f64 / max_iterations as f64
        } else {
            1.0
        };
        PaletteScale {
            palette: self,
            min: min_iterations,
            max: max_iterations,
            interior: max_iterations,
            base: 0,
            factor,
            bias: 0,
        }
    }

    /// Stretch the escaped counts `[min_escaped, max_escaped]` over every
    /// slot below the interior one. Only `interior` itself maps to
    /// [`INTERIOR_COLOR`]. A single escaped count takes the brightest slot.
    pub fn escaped_scale(&self, min_escaped: u32, max_escaped: u32, interior: u32) -> PaletteScale<'_> {
        let top = self.colors.len() - 2;
        let (factor, bias) = if max_escaped > min_escaped {
            (top as f64 / (max_escaped - min_escaped) as f64, 0)
        } else {
            (0.0, top)
        };
        PaletteScale {
            palette: self,
            min: min_escaped,
            max: max_escaped,
            interior,
            base: min_escaped,
            factor,
            bias,
        }
    }

    /// Clamped lookup; see [`PaletteScale::color`].
    pub fn color_for(&self, iterations: u32, min_iterations: u32, max_iterations: u32) -> Rgba {
        self.scale(min_iterations, max_iterations).color(iterations)
    }
}

/// A palette paired with a linear iteration → index mapping.
#[derive(Debug, Clone, Copy)]
pub struct PaletteScale<'a> {
    palette: &'a Palette,
    min: u32,
    max: u32,
    /// Counts at or above this are interior.
    interior: u32,
    base: u32,
    factor: f64,
    bias: usize,
}

impl PaletteScale<'_> {
    #[inline]
    fn index(&self, iterations: u32) -> usize {
        let last = self.palette.colors.len() - 1;
        if iterations >= self.interior {
            return last;
        }
        let scaled = (self.factor * iterations.saturating_sub(self.base) as f64) as usize;
        (scaled + self.bias).min(last - 1)
    }

    /// Map a count to a color. Counts at or above the interior count land
    /// on the interior slot; anything else is clamped below it.
    #[inline]
    pub fn color(&self, iterations: u32) -> Rgba {
        self.palette.colors[self.index(iterations)]
    }

    /// Like [`color`](Self::color) but rejects counts outside `[min, max]`
    /// other than the interior count.
    pub fn checked_color(&self, iterations: u32) -> crate::Result<Rgba> {
        if iterations < self.min || (iterations > self.max && iterations != self.interior) {
            return Err(RenderError::PaletteIndexOutOfRange {
                iterations,
                min: self.min,
                max: self.max,
            });
        }
        Ok(self.color(iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness(c: Rgba) -> u32 {
        c[0] as u32 + c[1] as u32 + c[2] as u32
    }

    #[test]
    fn ramp_is_monotonic_and_interior_is_black() {
        let p = Palette::grayscale(255).unwrap();
        assert_eq!(p.size(), 255);
        for pair in p.colors()[..254].windows(2) {
            assert!(brightness(pair[0]) <= brightness(pair[1]));
        }
        assert_eq!(p.colors()[254], INTERIOR_COLOR);
        assert_eq!(p.colors()[0], [0, 0, 0, 255]);
        assert!(p.colors()[253][0] >= 250);
    }

    #[test]
    fn too_small_palette_rejected() {
        assert_eq!(Palette::grayscale(1), Err(RenderError::InvalidPaletteSize(1)));
        assert!(Palette::grayscale(2).is_ok());
    }

    #[test]
    fn max_iterations_maps_to_interior_slot() {
        let p = Palette::grayscale(255).unwrap();
        for max in [1, 7, 100, 1000, 1024, 4096] {
            assert_eq!(p.color_for(max, 0, max), INTERIOR_COLOR, "max = {max}");
        }
    }

    #[test]
    fn escaped_counts_stay_below_interior_slot() {
        let p = Palette::grayscale(255).unwrap();
        let scale = p.scale(0, 1024);
        assert_eq!(scale.index(0), 0);
        assert_eq!(scale.index(512), 127);
        assert_eq!(scale.index(1023), 253);
    }

    #[test]
    fn out_of_range_counts_are_clamped_not_wrapped() {
        let p = Palette::grayscale(16).unwrap();
        let scale = p.scale(0, 10);
        assert_eq!(scale.color(10_000), INTERIOR_COLOR);
        assert_eq!(scale.color(u32::MAX), INTERIOR_COLOR);
    }

    #[test]
    fn checked_lookup_reports_out_of_range() {
        let p = Palette::grayscale(16).unwrap();
        let scale = p.scale(5, 10);
        assert_eq!(
            scale.checked_color(11),
            Err(RenderError::PaletteIndexOutOfRange {
                iterations: 11,
                min: 5,
                max: 10
            })
        );
        assert!(scale.checked_color(4).is_err());
        assert!(scale.checked_color(7).is_ok());
    }

    #[test]
    fn equal_min_max_uses_unit_factor() {
        let p = Palette::grayscale(16).unwrap();
        // Uniform tile: every count equals the max and lands on the top slot.
        assert_eq!(p.color_for(9, 9, 9), INTERIOR_COLOR);
    }

    #[test]
    fn escaped_scale_keeps_interior_slot_for_interior_only() {
        let p = Palette::grayscale(255).unwrap();
        let scale = p.escaped_scale(4, 27, 1024);
        assert_eq!(scale.index(4), 0);
        assert_eq!(scale.index(27), 253);
        assert!(scale.index(15) > 0 && scale.index(15) < 253);
        assert_eq!(scale.color(1024), INTERIOR_COLOR);
        assert_ne!(scale.color(27), INTERIOR_COLOR);
        assert!(scale.checked_color(1024).is_ok());
        assert!(scale.checked_color(28).is_err());
    }

    #[test]
    fn uniform_escaped_counts_take_brightest_slot() {
        let p = Palette::grayscale(255).unwrap();
        let scale = p.escaped_scale(2, 2, 64);
        assert_eq!(scale.index(2), 253);
        assert_eq!(scale.color(2), p.colors()[253]);
        assert_eq!(scale.color(64), INTERIOR_COLOR);
    }

    #[test]
    fn shared_palette_is_a_singleton() {
        let a = Palette::shared();
        let b = Palette::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.size(), DEFAULT_PALETTE_SIZE);
    }

    #[test]
    fn color_scaling_serializes_snake_case() {
        let json = serde_json::to_string(&ColorScaling::PerTile).unwrap();
        assert_eq!(json, "\"per_tile\"");
    }
}

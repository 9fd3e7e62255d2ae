use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::transform::{Similarity, Vector2};

/// Width of the complex-plane region spanned by the image at `scale = 1`.
pub const BASE_SPAN: f64 = 4.0;

/// Complex coordinate of pixel `(0, 0)` at the home view.
pub const ORIGIN: Complex = Complex { re: -2.5, im: -1.5 };

/// The visible region of the complex plane.
///
/// Pixel `(px, py)` maps to `(px, py) · pixel_size + ORIGIN + offset`, where
/// `pixel_size = BASE_SPAN / (image_width · scale)`. Dragging the image by
/// `(dx, dy)` pixels moves the offset by `-(dx, dy) · pixel_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub offset_x: f64,
    pub offset_y: f64,
    /// Zoom factor relative to the home view. Always positive and finite.
    pub scale: f64,
}

impl ViewState {
    /// The home view: whole set visible, no offset.
    pub const HOME: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };

    pub fn new(offset_x: f64, offset_y: f64, scale: f64) -> crate::Result<Self> {
        let view = Self {
            offset_x,
            offset_y,
            scale,
        };
        view.validate()?;
        Ok(view)
    }

    /// Check the invariants. Used after deserialization, where `new` is bypassed.
    pub fn validate(&self) -> crate::Result<()> {
        if self.scale <= 0.0 || !self.scale.is_finite() {
            return Err(CoreError::InvalidScale(self.scale));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(CoreError::InvalidOffset {
                x: self.offset_x,
                y: self.offset_y,
            });
        }
        Ok(())
    }

    /// Complex-plane units per pixel for an image `image_width` pixels wide.
    #[inline]
    pub fn pixel_size(&self, image_width: u32) -> f64 {
        BASE_SPAN / (image_width as f64 * self.scale)
    }

    /// Map (possibly fractional) image pixel coordinates to the complex plane.
    #[inline]
    pub fn pixel_to_complex(&self, px: f64, py: f64, image_width: u32) -> Complex {
        let ps = self.pixel_size(image_width);
        Complex::new(
            px * ps + ORIGIN.re + self.offset_x,
            py * ps + ORIGIN.im + self.offset_y,
        )
    }

    /// Apply a finished gesture: zoom by `scale_factor`, then shift by
    /// `offset_delta` screen pixels measured at the new zoom.
    pub fn folded(
        &self,
        scale_factor: f64,
        offset_delta: Vector2,
        image_width: u32,
    ) -> crate::Result<Self> {
        if image_width == 0 {
            return Err(CoreError::InvalidImageWidth(image_width));
        }
        if scale_factor <= 0.0 || !scale_factor.is_finite() {
            return Err(CoreError::InvalidScale(scale_factor));
        }
        let scale = self.scale * scale_factor;
        let ps = BASE_SPAN / (image_width as f64 * scale);
        Self::new(
            self.offset_x - offset_delta.x * ps,
            self.offset_y - offset_delta.y * ps,
            scale,
        )
    }

    /// Where pixels of an image computed at `image` land on screen under `self`.
    ///
    /// Identity when both views are equal. The host draws a stale image
    /// through this transform while its replacement is being computed.
    pub fn presentation_transform(&self, image: &ViewState, image_width: u32) -> Similarity {
        let ps = self.pixel_size(image_width);
        Similarity::new(
            self.scale / image.scale,
            Vector2::new(
                (image.offset_x - self.offset_x) / ps,
                (image.offset_y - self.offset_y) / ps,
            ),
        )
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::HOME
    }
}

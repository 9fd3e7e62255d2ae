use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A 2D vector in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) / 2.0
    }
}

impl Add for Vector2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A 2D similarity without rotation: `p ↦ scale · p + translation`.
///
/// The `then_*` builders apply a new operation *after* the current one, in
/// screen space, which is how gesture deltas accumulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub scale: f64,
    pub translation: Vector2,
}

impl Similarity {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translation: Vector2::ZERO,
    };

    pub fn new(scale: f64, translation: Vector2) -> Self {
        Self { scale, translation }
    }

    #[inline]
    pub fn apply(&self, p: Vector2) -> Vector2 {
        p * self.scale + self.translation
    }

    pub fn then_translate(&mut self, delta: Vector2) {
        self.translation += delta;
    }

    /// Scale by `factor` about `pivot`: translate `-pivot`, scale, translate `+pivot`.
    pub fn then_scale_about(&mut self, pivot: Vector2, factor: f64) {
        self.scale *= factor;
        self.translation = (self.translation - pivot) * factor + pivot;
    }

    /// `self ∘ inner`: apply `inner` first, then `self`.
    pub fn compose(&self, inner: &Similarity) -> Similarity {
        Similarity {
            scale: self.scale * inner.scale,
            translation: inner.translation * self.scale + self.translation,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Self::IDENTITY
    }
}

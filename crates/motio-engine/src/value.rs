//! Tweenable values and interpolation.
//!
//! A tween carries either a scalar or an RGBA color; both interpolate
//! linearly per component through the [`Interpolate`] trait.

use serde::{Deserialize, Serialize};

/// Trait for values that can be interpolated between two endpoints.
///
/// `t = 0.0` returns self, `t = 1.0` returns `to`.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

#[inline]
fn lerp_f64(from: f64, to: f64, t: f32) -> f64 {
    from + (to - from) * t as f64
}

#[inline]
fn lerp_f32(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        lerp_f64(*self, *to, t)
    }
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        lerp_f32(*self, *to, t)
    }
}

/// RGBA color with 0-255 component channels and a 0-1 alpha, matching the
/// CSS `rgba()` value space the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= f32::EPSILON
    }

    /// Same color with a replaced alpha channel.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Render as `rgb(r, g, b)` with rounded integer channels.
    pub fn to_css_rgb(&self) -> String {
        format!(
            "rgb({}, {}, {})",
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8
        )
    }

    /// Render as `rgba(r, g, b, a)`; alpha keeps up to three decimals.
    pub fn to_css_rgba(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8,
            trim_alpha(self.a)
        )
    }
}

fn trim_alpha(a: f32) -> String {
    let s = format!("{:.3}", a.clamp(0.0, 1.0));
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

impl Interpolate for Rgba {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        Self {
            r: lerp_f32(self.r, to.r, t),
            g: lerp_f32(self.g, to.g, t),
            b: lerp_f32(self.b, to.b, t),
            a: lerp_f32(self.a, to.a, t),
        }
    }
}

/// The value a tween interpolates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TweenValue {
    Number { value: f64 },
    Color { rgba: Rgba },
}

impl TweenValue {
    pub fn number(value: f64) -> Self {
        Self::Number { value }
    }

    pub fn color(rgba: Rgba) -> Self {
        Self::Color { rgba }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color { rgba } => Some(*rgba),
            _ => None,
        }
    }
}

impl From<f64> for TweenValue {
    fn from(value: f64) -> Self {
        Self::Number { value }
    }
}

impl From<Rgba> for TweenValue {
    fn from(rgba: Rgba) -> Self {
        Self::Color { rgba }
    }
}

impl Interpolate for TweenValue {
    /// Interpolate like-typed values; on a variant mismatch the from value is
    /// returned unchanged.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        match (self, to) {
            (Self::Number { value: a }, Self::Number { value: b }) => Self::Number {
                value: a.interpolate(b, t),
            },
            (Self::Color { rgba: a }, Self::Color { rgba: b }) => Self::Color {
                rgba: a.interpolate(b, t),
            },
            _ => *self,
        }
    }
}

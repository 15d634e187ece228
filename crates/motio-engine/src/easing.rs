//! Easing functions: pure maps from normalized progress to normalized
//! progress.
//!
//! The engine ships the polynomial families frontend code reaches for by
//! name, plus a custom cubic-bezier escape hatch for callers that need an
//! arbitrary curve. Inputs are clamped to [0, 1]; bezier outputs may
//! overshoot that range, which is intentional.

use serde::{Deserialize, Serialize};

/// A named or custom easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Easing {
    /// No easing.
    Linear,
    /// Accelerating from zero velocity (t²).
    InQuad,
    /// Decelerating to zero velocity.
    OutQuad,
    /// Acceleration until halfway, then deceleration.
    InOutQuad,
    /// Accelerating from zero velocity (t³).
    InCubic,
    /// Decelerating to zero velocity.
    OutCubic,
    /// Acceleration until halfway, then deceleration.
    InOutCubic,
    /// Custom cubic bezier with control points (x1, y1), (x2, y2).
    /// x values must lie in [0, 1].
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Default for Easing {
    fn default() -> Self {
        Self::Linear
    }
}

impl Easing {
    /// Look up an easing by its conventional camel-case name
    /// (`"easeOutQuad"`, `"linear"`, ...). Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::Linear),
            "easeInQuad" => Some(Self::InQuad),
            "easeOutQuad" => Some(Self::OutQuad),
            "easeInOutQuad" => Some(Self::InOutQuad),
            "easeInCubic" => Some(Self::InCubic),
            "easeOutCubic" => Some(Self::OutCubic),
            "easeInOutCubic" => Some(Self::InOutCubic),
            _ => None,
        }
    }

    /// Create a custom cubic bezier curve.
    ///
    /// # Panics
    /// Panics if x1 or x2 lie outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "bezier x control points must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// Evaluate the curve at progress `t` (clamped to [0, 1]).
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            Self::CubicBezier { x1, y1, x2, y2 } => bezier(x1, y1, x2, y2, t),
        }
    }
}

/// Evaluate a CSS-style cubic bezier timing curve at progress `t`.
fn bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let s = solve_curve_x(x1, x2, t);
    sample(y1, y2, s)
}

/// One-dimensional cubic bezier with implicit endpoints 0 and 1.
#[inline]
fn sample(p1: f32, p2: f32, t: f32) -> f32 {
    let omt = 1.0 - t;
    3.0 * omt * omt * t * p1 + 3.0 * omt * t * t * p2 + t * t * t
}

#[inline]
fn sample_derivative(p1: f32, p2: f32, t: f32) -> f32 {
    let omt = 1.0 - t;
    3.0 * omt * omt * p1 + 6.0 * omt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Newton-Raphson solve for the curve parameter whose x equals `target_x`.
fn solve_curve_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    let mut s = target_x;
    for _ in 0..8 {
        let x = sample(x1, x2, s) - target_x;
        if x.abs() < 1e-6 {
            return s;
        }
        let dx = sample_derivative(x1, x2, s);
        if dx.abs() < 1e-6 {
            break;
        }
        s = (s - x / dx).clamp(0.0, 1.0);
    }
    s
}

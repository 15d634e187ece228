//! Element handle trait and geometry types.
//!
//! An [`Element`] is a cheap, cloneable handle to a node owned by the host
//! document. The animation engine identifies elements through [`ElementKey`]
//! (for its side table) and never stores state on the element itself.

use serde::{Deserialize, Serialize};

/// Stable identity of an element within its document.
///
/// Used by the animator as the key of its per-element side table, so animation
/// state lives in an explicit map instead of hidden fields on host objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementKey(pub u64);

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Intersection with another rectangle, or a zero-area rect if disjoint.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        Rect {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0.0),
            height: (y1 - y0).max(0.0),
        }
    }
}

/// Cloneable handle to a host element.
///
/// Every method degrades instead of failing: style writes the host rejects
/// return `false`, reads of unknown properties return `None`. The engine maps
/// these into its silent-fallback error model.
pub trait Element: Clone {
    /// Stable identity of this element.
    fn key(&self) -> ElementKey;

    /// Whether the element is attached to a document and has a writable style
    /// surface. The animator treats a detached element as a silent no-op.
    fn is_connected(&self) -> bool;

    /// Read the currently rendered value of a style property.
    fn computed_style(&self, property: &str) -> Option<String>;

    /// Write an inline style property. Returns `false` when the host rejects
    /// the write; callers ignore the failure and continue.
    fn set_style(&self, property: &str, value: &str) -> bool;

    /// Set an attribute on the element.
    fn set_attribute(&self, name: &str, value: &str);

    /// Read an attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Toggle a class, returning whether it is present afterwards.
    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    /// Whether this element matches a simple selector (`tag`, `#id`, `.class`).
    fn matches(&self, selector: &str) -> bool;

    /// Nearest ancestor-or-self matching the selector.
    fn closest(&self, selector: &str) -> Option<Self>;

    /// Toggle the `display` style on this element's designated container
    /// sibling (the parent's child carrying the `container` class). Used by
    /// the animator's `value` completion sentinel for its `flex`/`none`
    /// side effect. Returns `false` when no such sibling exists.
    fn toggle_container_display(&self, value: &str) -> bool;
}

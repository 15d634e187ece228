//! Motio - a per-element tween engine with a DOM-like host abstraction.
//!
//! This crate re-exports the two workspace members:
//! - [`dom`]: the host surface (elements, events, in-memory document)
//! - [`engine`]: the animation engine (tweens, easing, transform composition,
//!   the property animator, and interaction triggers)

pub use motio_dom as dom;
pub use motio_engine as engine;

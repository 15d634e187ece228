//! DOM-like host abstraction for the motio animation engine.
//!
//! The engine never talks to a real browser. Instead it consumes the seams
//! defined here:
//! - [`Element`]: a cloneable element handle exposing computed-style reads,
//!   inline-style writes, attributes, classes, and ancestor matching
//! - [`Document`]: listener registration with bubbling dispatch and an
//!   intersection-observation primitive with disconnect support
//! - [`MemoryDocument`] / [`MemoryElement`]: a complete in-memory
//!   implementation used by tests and the demo binary
//!
//! # Architecture
//!
//! ```text
//! motio-engine (Animator, triggers)
//!   └── Element / Document traits   <- this crate
//!         └── MemoryDocument        <- deterministic fake host
//! ```

pub mod element;
pub mod events;
pub mod memory;

pub use element::{Element, ElementKey, Rect};
pub use events::{
    Document, EventKind, IntersectionHandler, ListenerId, ObserverId, ObserverOptions,
    PointerEvent, PointerHandler,
};
pub use memory::{MemoryDocument, MemoryElement};

//! Event and observer primitives consumed by the trigger helpers.
//!
//! Dispatch is synchronous and single-threaded: the document walks the
//! ancestor chain from the event target to the root and invokes every
//! listener installed on a node in that chain, passing the original target.
//! Delegation (selector matching) is layered on top by the engine's trigger
//! helpers, which call [`Element::closest`] inside their handlers.
//!
//! [`Element::closest`]: crate::element::Element::closest

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Identifier of an installed event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Identifier of one observed element within an intersection registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Kinds of pointer events the host can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    PointerEnter,
    PointerLeave,
}

/// A dispatched pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: EventKind,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(kind: EventKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }
}

/// Handler invoked with the original event target and the event.
pub type PointerHandler<E> = Rc<dyn Fn(&E, &PointerEvent)>;

/// Handler invoked with an element on a qualifying intersection.
pub type IntersectionHandler<E> = Rc<dyn Fn(&E)>;

/// Options for intersection observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Minimum visible-area ratio that counts as intersecting.
    pub threshold: f64,
    /// Margin added around the viewport before testing intersection.
    pub root_margin: f64,
    /// Stop observing an element after its first qualifying intersection.
    pub once: bool,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0.0,
            once: true,
        }
    }
}

impl ObserverOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: f64) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}

/// Listener registration and intersection observation surface of a host
/// document.
///
/// Listeners installed on the root fire for every dispatch (events bubble to
/// the root); listeners installed on an element fire when the event target is
/// that element or one of its descendants.
pub trait Document {
    type Elem: Element;

    /// The document root.
    fn root(&self) -> Self::Elem;

    /// All elements matching a simple selector, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Elem>;

    /// Install a listener on an element (or the root) for an event kind.
    fn add_listener(
        &self,
        target: &Self::Elem,
        kind: EventKind,
        handler: PointerHandler<Self::Elem>,
    ) -> ListenerId;

    /// Remove a previously installed listener.
    fn remove_listener(&self, id: ListenerId);

    /// Begin observing an element for viewport intersection.
    ///
    /// The callback fires whenever the element transitions into a qualifying
    /// intersection (including at registration time if it already qualifies).
    /// With `once` set, the registration retires itself after the first fire.
    fn observe_intersection(
        &self,
        element: &Self::Elem,
        options: ObserverOptions,
        handler: IntersectionHandler<Self::Elem>,
    ) -> ObserverId;

    /// Stop observing; the handler never fires again for this registration.
    fn unobserve(&self, id: ObserverId);
}

//! Declarative interaction triggers: click, double-click, hover,
//! viewport-entry, and a leading-edge throttle.
//!
//! Triggers target either a single element or a selector. The selector form
//! installs one delegated listener on the document root and resolves the
//! nearest matching ancestor of the event target via `closest`, so elements
//! added after registration still trigger. Registrations are fire-and-forget;
//! viewport registrations additionally return a disposer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use motio_dom::{
    Document, Element, ElementKey, EventKind, IntersectionHandler, ListenerId, ObserverId,
    ObserverOptions,
};

use crate::clock::Clock;

/// Default double-click window.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 300.0;

/// Default throttle interval.
pub const THROTTLE_WAIT_MS: f64 = 50.0;

/// What a trigger is bound to: one element, or every element matching a
/// selector (delegated).
#[derive(Clone)]
pub enum Target<E> {
    Selector(String),
    Element(E),
}

impl<E> Target<E> {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    pub fn element(element: E) -> Self {
        Self::Element(element)
    }
}

impl<E> From<&str> for Target<E> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

/// Install a listener for `kind`, delegated or direct per the target form.
fn register<D: Document>(
    doc: &D,
    target: Target<D::Elem>,
    kind: EventKind,
    callback: Rc<dyn Fn(&D::Elem)>,
) -> ListenerId
where
    D::Elem: 'static,
{
    match target {
        Target::Selector(selector) => {
            let root = doc.root();
            doc.add_listener(
                &root,
                kind,
                Rc::new(move |event_target: &D::Elem, _ev| {
                    if let Some(el) = event_target.closest(&selector) {
                        callback(&el);
                    }
                }),
            )
        }
        Target::Element(el) => {
            let bound = el.clone();
            doc.add_listener(&el, kind, Rc::new(move |_, _ev| callback(&bound)))
        }
    }
}

/// Fire `handler` on every click of the target.
pub fn on_click<D: Document>(
    doc: &D,
    target: Target<D::Elem>,
    handler: impl Fn(&D::Elem) + 'static,
) -> ListenerId
where
    D::Elem: 'static,
{
    register(doc, target, EventKind::Click, Rc::new(handler))
}

/// Fire `handler` when a second click lands within [`DOUBLE_CLICK_WINDOW_MS`]
/// of the first on the same element.
pub fn on_double_click<D: Document>(
    doc: &D,
    target: Target<D::Elem>,
    clock: impl Clock + 'static,
    handler: impl Fn(&D::Elem) + 'static,
) -> ListenerId
where
    D::Elem: 'static,
{
    on_double_click_within(doc, target, clock, DOUBLE_CLICK_WINDOW_MS, handler)
}

/// Double-click with an explicit window. Each element tracks its own
/// last-click timestamp; a fire resets the timestamp so a rapid third click
/// starts a fresh window instead of firing again.
pub fn on_double_click_within<D: Document>(
    doc: &D,
    target: Target<D::Elem>,
    clock: impl Clock + 'static,
    window_ms: f64,
    handler: impl Fn(&D::Elem) + 'static,
) -> ListenerId
where
    D::Elem: 'static,
{
    let last_click: Rc<RefCell<HashMap<ElementKey, f64>>> = Rc::new(RefCell::new(HashMap::new()));
    register(
        doc,
        target,
        EventKind::Click,
        Rc::new(move |el: &D::Elem| {
            let now = clock.now_ms();
            let key = el.key();
            let fire = {
                let mut last = last_click.borrow_mut();
                match last.get(&key) {
                    Some(prev) if now - prev <= window_ms => {
                        last.remove(&key);
                        true
                    }
                    _ => {
                        last.insert(key, now);
                        false
                    }
                }
            };
            if fire {
                debug!(element = key.0, "double click");
                handler(el);
            }
        }),
    )
}

/// Fire `on_enter`/`on_leave` as the pointer enters and leaves the target.
pub fn on_hover<D: Document>(
    doc: &D,
    target: Target<D::Elem>,
    on_enter: impl Fn(&D::Elem) + 'static,
    on_leave: impl Fn(&D::Elem) + 'static,
) -> (ListenerId, ListenerId)
where
    D::Elem: 'static,
{
    let enter = register(doc, target.clone(), EventKind::PointerEnter, Rc::new(on_enter));
    let leave = register(doc, target, EventKind::PointerLeave, Rc::new(on_leave));
    (enter, leave)
}

/// Disposer for a viewport-entry registration. Disconnecting stops
/// observation for every element the registration covered.
pub struct ViewportRegistration {
    observers: Vec<ObserverId>,
}

impl ViewportRegistration {
    /// Number of elements being observed at registration time.
    pub fn observed(&self) -> usize {
        self.observers.len()
    }

    pub fn disconnect<D: Document>(&self, doc: &D) {
        for id in &self.observers {
            doc.unobserve(*id);
        }
    }
}

/// Fire `callback` when an observed element enters the viewport.
///
/// The selector form observes every currently matching element. With
/// `options.once` (the default) each element fires at most once, including
/// across later enter/exit/enter cycles.
pub fn on_enter_viewport<D: Document>(
    doc: &D,
    target: Target<D::Elem>,
    options: ObserverOptions,
    callback: impl Fn(&D::Elem) + 'static,
) -> ViewportRegistration
where
    D::Elem: 'static,
{
    let callback: IntersectionHandler<D::Elem> = Rc::new(callback);
    let elements = match target {
        Target::Selector(selector) => doc.query_all(&selector),
        Target::Element(el) => vec![el],
    };
    debug!(count = elements.len(), "viewport observation");
    let observers = elements
        .iter()
        .map(|el| doc.observe_intersection(el, options, Rc::clone(&callback)))
        .collect();
    ViewportRegistration { observers }
}

/// Leading-edge throttle with the default [`THROTTLE_WAIT_MS`] interval.
pub fn throttle<T>(
    clock: impl Clock + 'static,
    f: impl FnMut(T) + 'static,
) -> impl FnMut(T) {
    throttle_within(clock, THROTTLE_WAIT_MS, f)
}

/// Wrap `f` so calls landing less than `wait_ms` after the last accepted
/// call are dropped. The first call, and any call at or past the interval
/// boundary, is accepted and resets the window.
pub fn throttle_within<T>(
    clock: impl Clock + 'static,
    wait_ms: f64,
    mut f: impl FnMut(T) + 'static,
) -> impl FnMut(T) {
    let mut last_accepted: Option<f64> = None;
    move |arg: T| {
        let now = clock.now_ms();
        let accept = last_accepted.is_none_or(|last| now - last >= wait_ms);
        if accept {
            last_accepted = Some(now);
            f(arg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use motio_dom::{Document as _, MemoryDocument, MemoryElement, Rect};
    use std::cell::Cell;

    fn doc_with_buttons(n: usize) -> (MemoryDocument, Vec<MemoryElement>) {
        let doc = MemoryDocument::new();
        let mut buttons = Vec::new();
        for _ in 0..n {
            let wrap = doc.create_element("div");
            let button = doc.create_element("button");
            button.add_class("cta");
            doc.append_child(&doc.root(), &wrap);
            doc.append_child(&wrap, &button);
            buttons.push(button);
        }
        (doc, buttons)
    }

    #[test]
    fn delegated_click_resolves_nearest_match() {
        let (doc, buttons) = doc_with_buttons(1);
        let inner = doc.create_element("span");
        doc.append_child(&buttons[0], &inner);

        let hits: Rc<RefCell<Vec<ElementKey>>> = Rc::new(RefCell::new(Vec::new()));
        let h = hits.clone();
        on_click(&doc, Target::selector(".cta"), move |el: &MemoryElement| {
            h.borrow_mut().push(el.key());
        });

        // A click on a descendant resolves to the matching ancestor.
        doc.click(&inner);
        // A click outside any match does nothing.
        doc.click(&doc.root());
        assert_eq!(*hits.borrow(), vec![buttons[0].key()]);
    }

    #[test]
    fn direct_click_binds_one_element() {
        let (doc, buttons) = doc_with_buttons(2);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        on_click(&doc, Target::element(buttons[0].clone()), move |_| {
            h.set(h.get() + 1);
        });

        doc.click(&buttons[0]);
        doc.click(&buttons[1]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn double_click_within_window_fires_once() {
        let (doc, buttons) = doc_with_buttons(1);
        let clock = ManualClock::new();
        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        on_double_click(&doc, Target::selector(".cta"), clock.clone(), move |_| {
            f.set(f.get() + 1);
        });

        doc.click(&buttons[0]);
        clock.advance(250.0);
        doc.click(&buttons[0]);
        assert_eq!(fires.get(), 1);

        // Third rapid click starts a fresh window, no second fire.
        clock.advance(100.0);
        doc.click(&buttons[0]);
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn slow_clicks_never_fire_double_click() {
        let (doc, buttons) = doc_with_buttons(1);
        let clock = ManualClock::new();
        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        on_double_click(&doc, Target::selector(".cta"), clock.clone(), move |_| {
            f.set(f.get() + 1);
        });

        doc.click(&buttons[0]);
        clock.advance(400.0);
        doc.click(&buttons[0]);
        clock.advance(400.0);
        doc.click(&buttons[0]);
        assert_eq!(fires.get(), 0);
    }

    #[test]
    fn double_click_windows_are_per_element() {
        let (doc, buttons) = doc_with_buttons(2);
        let clock = ManualClock::new();
        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        on_double_click(&doc, Target::selector(".cta"), clock.clone(), move |_| {
            f.set(f.get() + 1);
        });

        // Alternating clicks on two elements never close either window.
        doc.click(&buttons[0]);
        clock.advance(100.0);
        doc.click(&buttons[1]);
        clock.advance(100.0);
        assert_eq!(fires.get(), 0);
        doc.click(&buttons[0]);
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn hover_fires_enter_and_leave() {
        let (doc, buttons) = doc_with_buttons(1);
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        let l2 = log.clone();
        on_hover(
            &doc,
            Target::selector(".cta"),
            move |_: &MemoryElement| l1.borrow_mut().push("enter"),
            move |_: &MemoryElement| l2.borrow_mut().push("leave"),
        );

        doc.pointer_enter(&buttons[0]);
        doc.pointer_leave(&buttons[0]);
        assert_eq!(*log.borrow(), vec!["enter", "leave"]);
    }

    #[test]
    fn viewport_entry_once_per_element() {
        let (doc, buttons) = doc_with_buttons(2);
        buttons[0].set_rect(Rect::new(0.0, 2000.0, 100.0, 50.0));
        buttons[1].set_rect(Rect::new(0.0, 4000.0, 100.0, 50.0));

        let fired: Rc<RefCell<Vec<ElementKey>>> = Rc::new(RefCell::new(Vec::new()));
        let f = fired.clone();
        let registration = on_enter_viewport(
            &doc,
            Target::selector(".cta"),
            ObserverOptions::default(),
            move |el: &MemoryElement| f.borrow_mut().push(el.key()),
        );
        assert_eq!(registration.observed(), 2);

        // Scroll to the first, back up, then down past both.
        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 0.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 3800.0, 1280.0, 800.0));

        assert_eq!(*fired.borrow(), vec![buttons[0].key(), buttons[1].key()]);
    }

    #[test]
    fn viewport_disconnect_stops_all_observation() {
        let (doc, buttons) = doc_with_buttons(1);
        buttons[0].set_rect(Rect::new(0.0, 2000.0, 100.0, 50.0));

        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        let registration = on_enter_viewport(
            &doc,
            Target::element(buttons[0].clone()),
            ObserverOptions::default(),
            move |_: &MemoryElement| f.set(f.get() + 1),
        );

        registration.disconnect(&doc);
        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        assert_eq!(fires.get(), 0);
    }

    #[test]
    fn selector_with_no_matches_registers_quietly() {
        let (doc, _) = doc_with_buttons(1);
        let registration = on_enter_viewport(
            &doc,
            Target::selector(".missing"),
            ObserverOptions::default(),
            |_: &MemoryElement| {},
        );
        assert_eq!(registration.observed(), 0);
    }

    #[test]
    fn throttle_leading_edge() {
        let clock = ManualClock::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut throttled = throttle_within(clock.clone(), 50.0, move |_: ()| {
            c.set(c.get() + 1);
        });

        throttled(()); // first call accepted
        throttled(()); // same instant, dropped
        clock.advance(30.0);
        throttled(()); // inside window, dropped
        clock.advance(20.0); // exactly at the boundary
        throttled(());
        assert_eq!(calls.get(), 2);
    }
}

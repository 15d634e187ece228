//! In-memory document implementation.
//!
//! `MemoryDocument` is a deterministic fake host: a node tree with inline and
//! base ("computed") styles, simple selector matching, bubbling event
//! dispatch, and rectangle-based intersection observation. The engine's tests
//! and the demo binary run entirely against it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::element::{Element, ElementKey, Rect};
use crate::events::{
    Document, EventKind, IntersectionHandler, ListenerId, ObserverId, ObserverOptions,
    PointerEvent, PointerHandler,
};

struct NodeData {
    key: ElementKey,
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    /// Inline styles, written by the engine.
    inline: HashMap<String, String>,
    /// Base styles standing in for the stylesheet; computed reads fall back
    /// to these when no inline value exists.
    base: HashMap<String, String>,
    /// Style properties this node rejects writes for.
    denied_styles: Vec<String>,
    rect: Rect,
    connected: bool,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<Rc<RefCell<NodeData>>>,
}

/// Cloneable handle to a node in a [`MemoryDocument`].
#[derive(Clone)]
pub struct MemoryElement {
    node: Rc<RefCell<NodeData>>,
}

impl std::fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.node.borrow();
        f.debug_struct("MemoryElement")
            .field("key", &n.key)
            .field("tag", &n.tag)
            .field("id", &n.id)
            .finish()
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl MemoryElement {
    fn new(key: ElementKey, tag: &str) -> Self {
        Self {
            node: Rc::new(RefCell::new(NodeData {
                key,
                tag: tag.to_string(),
                id: None,
                classes: Vec::new(),
                attributes: HashMap::new(),
                inline: HashMap::new(),
                base: HashMap::new(),
                denied_styles: Vec::new(),
                rect: Rect::default(),
                connected: false,
                parent: Weak::new(),
                children: Vec::new(),
            })),
        }
    }

    /// Set the element id (for `#id` selectors).
    pub fn set_id(&self, id: &str) {
        self.node.borrow_mut().id = Some(id.to_string());
    }

    /// Seed a base ("computed") style value, standing in for the stylesheet.
    pub fn set_base_style(&self, property: &str, value: &str) {
        self.node
            .borrow_mut()
            .base
            .insert(property.to_string(), value.to_string());
    }

    /// Read back the inline style the engine wrote, if any.
    pub fn inline_style(&self, property: &str) -> Option<String> {
        self.node.borrow().inline.get(property).cloned()
    }

    /// Reject future writes to a style property (error-path testing).
    pub fn deny_style(&self, property: &str) {
        self.node.borrow_mut().denied_styles.push(property.to_string());
    }

    /// Set the layout rectangle used for intersection testing.
    pub fn set_rect(&self, rect: Rect) {
        self.node.borrow_mut().rect = rect;
    }

    pub fn rect(&self) -> Rect {
        self.node.borrow().rect
    }

    /// Detach the element from the document (it keeps its state but reports
    /// itself as disconnected).
    pub fn detach(&self) {
        self.node.borrow_mut().connected = false;
    }

    fn parent(&self) -> Option<MemoryElement> {
        self.node
            .borrow()
            .parent
            .upgrade()
            .map(|node| MemoryElement { node })
    }

    /// Ancestor chain from this element up to the root, self included.
    fn ancestor_chain(&self) -> Vec<MemoryElement> {
        let mut chain = vec![self.clone()];
        let mut cursor = self.parent();
        while let Some(el) = cursor {
            cursor = el.parent();
            chain.push(el);
        }
        chain
    }
}

/// Match a node against one simple selector: `tag`, `#id`, `.class`, or a
/// compound like `button.cta`.
fn matches_selector(node: &NodeData, selector: &str) -> bool {
    let selector = selector.trim();
    if selector.is_empty() {
        return false;
    }
    let mut rest = selector;
    // Leading tag segment, if the selector does not start with # or .
    if !rest.starts_with(['#', '.']) {
        let end = rest.find(['#', '.']).unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(end);
        if !tag.eq_ignore_ascii_case(&node.tag) {
            return false;
        }
        rest = tail;
    }
    while !rest.is_empty() {
        let marker = rest.as_bytes()[0];
        let body = &rest[1..];
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let (name, tail) = body.split_at(end);
        match marker {
            b'#' => {
                if node.id.as_deref() != Some(name) {
                    return false;
                }
            }
            b'.' => {
                if !node.classes.iter().any(|c| c == name) {
                    return false;
                }
            }
            _ => return false,
        }
        rest = tail;
    }
    true
}

impl Element for MemoryElement {
    fn key(&self) -> ElementKey {
        self.node.borrow().key
    }

    fn is_connected(&self) -> bool {
        self.node.borrow().connected
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        let n = self.node.borrow();
        n.inline
            .get(property)
            .or_else(|| n.base.get(property))
            .cloned()
    }

    fn set_style(&self, property: &str, value: &str) -> bool {
        let mut n = self.node.borrow_mut();
        if n.denied_styles.iter().any(|p| p == property) {
            return false;
        }
        n.inline.insert(property.to_string(), value.to_string());
        true
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.node
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.node.borrow().attributes.get(name).cloned()
    }

    fn add_class(&self, class: &str) {
        let mut n = self.node.borrow_mut();
        if !n.classes.iter().any(|c| c == class) {
            n.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.node.borrow_mut().classes.retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.borrow().classes.iter().any(|c| c == class)
    }

    fn matches(&self, selector: &str) -> bool {
        matches_selector(&self.node.borrow(), selector)
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        self.ancestor_chain()
            .into_iter()
            .find(|el| el.matches(selector))
    }

    fn toggle_container_display(&self, value: &str) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        let sibling = {
            let p = parent.node.borrow();
            p.children
                .iter()
                .filter(|c| !Rc::ptr_eq(c, &self.node))
                .find(|c| c.borrow().classes.iter().any(|cl| cl == "container"))
                .cloned()
        };
        match sibling {
            Some(node) => {
                node.borrow_mut()
                    .inline
                    .insert("display".to_string(), value.to_string());
                true
            }
            None => false,
        }
    }
}

struct ListenerRecord {
    id: ListenerId,
    kind: EventKind,
    target_key: ElementKey,
    handler: PointerHandler<MemoryElement>,
}

struct ObserverRecord {
    id: ObserverId,
    element: MemoryElement,
    options: ObserverOptions,
    handler: IntersectionHandler<MemoryElement>,
    intersecting: bool,
    done: bool,
}

struct DocInner {
    root: MemoryElement,
    listeners: Vec<ListenerRecord>,
    observers: Vec<ObserverRecord>,
    viewport: Rect,
    next_key: u64,
    next_listener: u64,
    next_observer: u64,
}

/// In-memory host document.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Rc<RefCell<DocInner>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let root = MemoryElement::new(ElementKey(0), "root");
        root.node.borrow_mut().connected = true;
        Self {
            inner: Rc::new(RefCell::new(DocInner {
                root,
                listeners: Vec::new(),
                observers: Vec::new(),
                viewport: Rect::new(0.0, 0.0, 1280.0, 800.0),
                next_key: 1,
                next_listener: 1,
                next_observer: 1,
            })),
        }
    }

    /// Create a detached element. Append it to make it live.
    pub fn create_element(&self, tag: &str) -> MemoryElement {
        let mut inner = self.inner.borrow_mut();
        let key = ElementKey(inner.next_key);
        inner.next_key += 1;
        MemoryElement::new(key, tag)
    }

    /// Append `child` under `parent`, connecting it to the document.
    pub fn append_child(&self, parent: &MemoryElement, child: &MemoryElement) {
        {
            let mut c = child.node.borrow_mut();
            c.parent = Rc::downgrade(&parent.node);
            c.connected = true;
        }
        parent.node.borrow_mut().children.push(child.node.clone());
    }

    /// Dispatch a pointer event at `target`, bubbling to the root.
    pub fn dispatch(&self, target: &MemoryElement, event: PointerEvent) {
        let chain: Vec<ElementKey> = target
            .ancestor_chain()
            .iter()
            .map(|el| el.key())
            .collect();
        let handlers: Vec<PointerHandler<MemoryElement>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == event.kind && chain.contains(&l.target_key))
            .map(|l| Rc::clone(&l.handler))
            .collect();
        trace!(kind = ?event.kind, listeners = handlers.len(), "dispatch");
        for handler in handlers {
            handler(target, &event);
        }
    }

    /// Convenience: dispatch a click at the target's rect origin.
    pub fn click(&self, target: &MemoryElement) {
        let rect = target.rect();
        self.dispatch(target, PointerEvent::new(EventKind::Click, rect.x, rect.y));
    }

    pub fn pointer_enter(&self, target: &MemoryElement) {
        let rect = target.rect();
        self.dispatch(
            target,
            PointerEvent::new(EventKind::PointerEnter, rect.x, rect.y),
        );
    }

    pub fn pointer_leave(&self, target: &MemoryElement) {
        let rect = target.rect();
        self.dispatch(
            target,
            PointerEvent::new(EventKind::PointerLeave, rect.x, rect.y),
        );
    }

    /// Move the viewport and re-test every observed element.
    pub fn set_viewport(&self, viewport: Rect) {
        self.inner.borrow_mut().viewport = viewport;
        self.update_intersections();
    }

    pub fn viewport(&self) -> Rect {
        self.inner.borrow().viewport
    }

    /// Re-test all intersection observers against the current viewport.
    ///
    /// Call after moving the viewport or changing element rects.
    pub fn update_intersections(&self) {
        let mut fired: Vec<(IntersectionHandler<MemoryElement>, MemoryElement)> = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let viewport = inner.viewport;
            for obs in inner.observers.iter_mut() {
                if obs.done {
                    continue;
                }
                let qualifies = intersection_qualifies(&viewport, obs);
                if qualifies && !obs.intersecting {
                    fired.push((Rc::clone(&obs.handler), obs.element.clone()));
                    if obs.options.once {
                        obs.done = true;
                    }
                }
                obs.intersecting = qualifies;
            }
            inner.observers.retain(|o| !o.done);
        }
        for (handler, element) in fired {
            handler(&element);
        }
    }

    fn all_elements(&self) -> Vec<MemoryElement> {
        fn walk(node: &Rc<RefCell<NodeData>>, out: &mut Vec<MemoryElement>) {
            out.push(MemoryElement { node: node.clone() });
            let children = node.borrow().children.clone();
            for child in &children {
                walk(child, out);
            }
        }
        let root = self.inner.borrow().root.clone();
        let mut out = Vec::new();
        walk(&root.node, &mut out);
        out
    }
}

fn intersection_qualifies(viewport: &Rect, obs: &ObserverRecord) -> bool {
    let expanded = viewport.inflate(obs.options.root_margin);
    let rect = obs.element.rect();
    let overlap = expanded.intersect(&rect);
    if overlap.area() <= 0.0 || rect.area() <= 0.0 {
        return false;
    }
    overlap.area() / rect.area() >= obs.options.threshold
}

impl Document for MemoryDocument {
    type Elem = MemoryElement;

    fn root(&self) -> MemoryElement {
        self.inner.borrow().root.clone()
    }

    fn query_all(&self, selector: &str) -> Vec<MemoryElement> {
        self.all_elements()
            .into_iter()
            .filter(|el| el.matches(selector))
            .collect()
    }

    fn add_listener(
        &self,
        target: &MemoryElement,
        kind: EventKind,
        handler: PointerHandler<MemoryElement>,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push(ListenerRecord {
            id,
            kind,
            target_key: target.key(),
            handler,
        });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.borrow_mut().listeners.retain(|l| l.id != id);
    }

    fn observe_intersection(
        &self,
        element: &MemoryElement,
        options: ObserverOptions,
        handler: IntersectionHandler<MemoryElement>,
    ) -> ObserverId {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = ObserverId(inner.next_observer);
            inner.next_observer += 1;
            inner.observers.push(ObserverRecord {
                id,
                element: element.clone(),
                options,
                handler,
                intersecting: false,
                done: false,
            });
            id
        };
        // Initial check, matching platform observer behavior.
        self.update_intersections();
        id
    }

    fn unobserve(&self, id: ObserverId) {
        self.inner.borrow_mut().observers.retain(|o| o.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn doc_with_button() -> (MemoryDocument, MemoryElement, MemoryElement) {
        let doc = MemoryDocument::new();
        let section = doc.create_element("section");
        let button = doc.create_element("button");
        button.add_class("cta");
        doc.append_child(&doc.root(), &section);
        doc.append_child(&section, &button);
        (doc, section, button)
    }

    #[test]
    fn selector_matching() {
        let (_, section, button) = doc_with_button();
        assert!(button.matches("button"));
        assert!(button.matches(".cta"));
        assert!(button.matches("button.cta"));
        assert!(!button.matches("section"));
        assert!(!section.matches(".cta"));

        button.set_id("go");
        assert!(button.matches("#go"));
        assert!(button.matches("button#go.cta"));
    }

    #[test]
    fn closest_walks_ancestors() {
        let (_, section, button) = doc_with_button();
        section.add_class("hero");
        let found = button.closest(".hero").unwrap();
        assert_eq!(found.key(), section.key());
        assert_eq!(button.closest("button").unwrap().key(), button.key());
        assert!(button.closest(".missing").is_none());
    }

    #[test]
    fn computed_style_falls_back_to_base() {
        let (_, _, button) = doc_with_button();
        button.set_base_style("opacity", "0.5");
        assert_eq!(button.computed_style("opacity").as_deref(), Some("0.5"));
        button.set_style("opacity", "1");
        assert_eq!(button.computed_style("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn denied_style_write_is_rejected() {
        let (_, _, button) = doc_with_button();
        button.deny_style("position");
        assert!(!button.set_style("position", "fixed"));
        assert!(button.inline_style("position").is_none());
        assert!(button.set_style("opacity", "1"));
    }

    #[test]
    fn click_bubbles_to_ancestors_with_original_target() {
        let (doc, section, button) = doc_with_button();
        let targets: Rc<RefCell<Vec<ElementKey>>> = Rc::new(RefCell::new(Vec::new()));

        let t = targets.clone();
        doc.add_listener(
            &section,
            EventKind::Click,
            Rc::new(move |target: &MemoryElement, _ev| {
                t.borrow_mut().push(target.key());
            }),
        );

        // A click on the button bubbles to the section listener, which sees
        // the button as the original target; a click on the section itself
        // sees the section.
        doc.click(&button);
        doc.click(&section);
        assert_eq!(*targets.borrow(), vec![button.key(), section.key()]);
    }

    #[test]
    fn removed_listener_stops_firing() {
        let (doc, _, button) = doc_with_button();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = doc.add_listener(
            &button,
            EventKind::Click,
            Rc::new(move |_: &MemoryElement, _| h.set(h.get() + 1)),
        );
        doc.click(&button);
        doc.remove_listener(id);
        doc.click(&button);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn one_shot_observer_fires_once_across_cycles() {
        let (doc, _, button) = doc_with_button();
        button.set_rect(Rect::new(0.0, 2000.0, 100.0, 50.0));
        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        doc.observe_intersection(
            &button,
            ObserverOptions::default(),
            Rc::new(move |_: &MemoryElement| f.set(f.get() + 1)),
        );
        assert_eq!(fires.get(), 0);

        // Enter, leave, enter again.
        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 0.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn repeating_observer_fires_per_entry() {
        let (doc, _, button) = doc_with_button();
        button.set_rect(Rect::new(0.0, 2000.0, 100.0, 50.0));
        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        doc.observe_intersection(
            &button,
            ObserverOptions::default().with_once(false),
            Rc::new(move |_: &MemoryElement| f.set(f.get() + 1)),
        );

        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 0.0, 1280.0, 800.0));
        doc.set_viewport(Rect::new(0.0, 1800.0, 1280.0, 800.0));
        assert_eq!(fires.get(), 2);
    }

    #[test]
    fn observer_fires_initially_when_already_visible() {
        let (doc, _, button) = doc_with_button();
        button.set_rect(Rect::new(0.0, 100.0, 100.0, 50.0));
        let fires = Rc::new(Cell::new(0));
        let f = fires.clone();
        doc.observe_intersection(
            &button,
            ObserverOptions::default(),
            Rc::new(move |_: &MemoryElement| f.set(f.get() + 1)),
        );
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn container_sibling_display_toggle() {
        let doc = MemoryDocument::new();
        let wrap = doc.create_element("div");
        let input = doc.create_element("input");
        let container = doc.create_element("div");
        container.add_class("container");
        doc.append_child(&doc.root(), &wrap);
        doc.append_child(&wrap, &input);
        doc.append_child(&wrap, &container);

        assert!(input.toggle_container_display("flex"));
        assert_eq!(container.inline_style("display").as_deref(), Some("flex"));
        assert!(input.toggle_container_display("none"));
        assert_eq!(container.inline_style("display").as_deref(), Some("none"));
    }

    #[test]
    fn query_all_in_document_order() {
        let (doc, section, button) = doc_with_button();
        let another = doc.create_element("button");
        doc.append_child(&section, &another);
        let found = doc.query_all("button");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].key(), button.key());
        assert_eq!(found[1].key(), another.key());
    }
}

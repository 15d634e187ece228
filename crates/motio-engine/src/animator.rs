//! Property animator: dispatches a property-change map to the right
//! interpolation strategy and manages overlapping animations.
//!
//! The animator owns an explicit side table keyed by [`ElementKey`]: each
//! animated element gets a transform [`ChannelCache`] and a list of its
//! active tweens, created lazily on first animation. A new `animate` call on
//! an element always wins: every tween still registered against that element
//! is stopped before the new ones start, so at most one animation generation
//! per element is ever advancing.
//!
//! Nothing here is fatal. A detached element is a silent no-op, unparsable
//! current values fall back to defined defaults, and rejected style writes
//! are swallowed while the rest of the call proceeds.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::debug;

use motio_dom::{Element, ElementKey};

use crate::easing::Easing;
use crate::scheduler::FrameScheduler;
use crate::style::{color_has_alpha, parse_blur_radius, parse_color, parse_length, parse_opacity};
use crate::transform::{ChannelCache, TransformChannel};
use crate::tween::Tween;
use crate::value::Rgba;

/// Options shared by every tween of one `animate` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AnimateOptions {
    pub duration_ms: f64,
    pub easing: Easing,
    pub delay_ms: f64,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            duration_ms: 400.0,
            easing: Easing::Linear,
            delay_ms: 0.0,
        }
    }
}

impl AnimateOptions {
    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Closed dispatch over the supported property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// A transform channel, composed through the element's channel cache.
    Transform(TransformChannel),
    /// `backgroundColor` / `color` / `borderColor`.
    Color,
    /// `filterBlur`: the radius of a `blur()` filter, in pixels.
    FilterBlur,
    Opacity,
    /// The `value` completion sentinel: a zero-duration tween whose only
    /// effect is a completion action one frame later.
    Value,
    /// Any other key whose target is a plain number or `Npx`.
    Numeric,
    /// Everything else: assigned to the style property immediately.
    Passthrough,
}

impl PropertyKind {
    /// Classify a property-map entry by key, falling back to the shape of
    /// the target value.
    pub fn classify(key: &str, target: &str) -> Self {
        if let Some(channel) = TransformChannel::from_key(key) {
            return Self::Transform(channel);
        }
        match key {
            "backgroundColor" | "color" | "borderColor" => Self::Color,
            "filterBlur" => Self::FilterBlur,
            "opacity" => Self::Opacity,
            "value" => Self::Value,
            _ => match parse_length(target) {
                Ok(len) if len.is_px_or_unitless() => Self::Numeric,
                _ => Self::Passthrough,
            },
        }
    }
}

assert_impl_all!(AnimateOptions: Send, Sync, Copy);
assert_impl_all!(PropertyKind: Send, Sync, Copy);

/// Ordered property-change map. Keys are camel-case property names
/// (`translateX`, `backgroundColor`, `width`, ...), values are their targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: Vec<(String, String)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.push((key.into(), target.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle to the tweens of one `animate` call.
pub struct AnimationHandle {
    key: ElementKey,
    tweens: Vec<Tween>,
}

impl AnimationHandle {
    pub fn element(&self) -> ElementKey {
        self.key
    }

    /// Whether any tween of this call can still advance.
    pub fn is_active(&self) -> bool {
        self.tweens.iter().any(|t| !t.is_terminal())
    }
}

#[derive(Default)]
struct ElementState {
    cache: Rc<RefCell<ChannelCache>>,
    active: Vec<Tween>,
}

/// The property animator. Clones share the side table and scheduler.
#[derive(Clone)]
pub struct Animator {
    states: Rc<RefCell<HashMap<ElementKey, ElementState>>>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl Animator {
    pub fn new(scheduler: impl FrameScheduler + 'static) -> Self {
        Self {
            states: Rc::new(RefCell::new(HashMap::new())),
            scheduler: Rc::new(scheduler),
        }
    }

    /// Pre-seed a transform channel's starting value for an element, ahead
    /// of any animation. Later `animate` calls read this instead of probing
    /// rendered style or using the semantic default.
    pub fn prime<E: Element>(&self, element: &E, channel: TransformChannel, value: f64) {
        let mut states = self.states.borrow_mut();
        let state = states.entry(element.key()).or_default();
        state.cache.borrow_mut().prime(channel, value);
    }

    /// Animate a map of properties on one element.
    ///
    /// Cancels the element's previous tweens, resolves a start value per
    /// property, and starts one tween per entry (passthrough entries write
    /// immediately instead). Returns `None` for a detached element.
    pub fn animate<E: Element + 'static>(
        &self,
        element: &E,
        properties: &PropertyMap,
        options: AnimateOptions,
    ) -> Option<AnimationHandle> {
        if !element.is_connected() {
            debug!(element = ?element.key(), "animate on detached element, skipping");
            return None;
        }
        let key = element.key();
        let (cache, previous) = {
            let mut states = self.states.borrow_mut();
            let state = states.entry(key).or_default();
            (state.cache.clone(), std::mem::take(&mut state.active))
        };
        if !previous.is_empty() {
            debug!(element = key.0, count = previous.len(), "cancelling previous tweens");
            for tween in previous {
                tween.stop();
            }
        }

        let mut tweens = Vec::with_capacity(properties.len());
        for (prop_key, target) in properties.iter() {
            let kind = PropertyKind::classify(prop_key, target);
            let tween = match kind {
                PropertyKind::Transform(channel) => {
                    self.transform_tween(element, &cache, channel, target, options)
                }
                PropertyKind::Color => color_tween(element, prop_key, target, options),
                PropertyKind::FilterBlur => blur_tween(element, target, options),
                PropertyKind::Opacity => opacity_tween(element, target, options),
                PropertyKind::Value => value_sentinel(element, target, options),
                PropertyKind::Numeric => numeric_tween(element, prop_key, target, options),
                PropertyKind::Passthrough => {
                    element.set_style(&camel_to_kebab(prop_key), target);
                    continue;
                }
            };
            tweens.push(tween);
        }

        for tween in &tweens {
            tween.start(self.scheduler.as_ref());
        }
        debug!(element = key.0, count = tweens.len(), "animation started");

        if let Some(state) = self.states.borrow_mut().get_mut(&key) {
            state.active = tweens.clone();
        }
        Some(AnimationHandle { key, tweens })
    }

    /// Stop every tween of one `animate` call and drop them from the
    /// element's active list. Tweens of later calls are untouched.
    pub fn stop(&self, handle: &AnimationHandle) {
        for tween in &handle.tweens {
            tween.stop();
        }
        if let Some(state) = self.states.borrow_mut().get_mut(&handle.key) {
            state
                .active
                .retain(|t| !handle.tweens.iter().any(|h| h.ptr_eq(t)));
        }
    }

    fn transform_tween<E: Element + 'static>(
        &self,
        element: &E,
        cache: &Rc<RefCell<ChannelCache>>,
        channel: TransformChannel,
        target: &str,
        options: AnimateOptions,
    ) -> Tween {
        // Resolve the start, cache it, and render immediately so there is no
        // visible jump before the first tick. The cache is authoritative once
        // the channel is present; rendered style is only probed on a miss.
        let parsed_target = parse_length(target).ok();
        let end = parsed_target.as_ref().map(|l| l.value).unwrap_or(0.0);
        let start = {
            let mut c = cache.borrow_mut();
            let start = match c.get(channel) {
                Some(value) => value,
                None => {
                    let rendered = element.computed_style("transform");
                    c.resolve_start(channel, rendered.as_deref())
                }
            };
            if let Some(unit) = parsed_target.and_then(|l| l.unit) {
                if unit != "px" {
                    c.set_unit(channel, unit);
                }
            }
            element.set_style("transform", &c.render());
            start
        };

        let el = element.clone();
        let cache = cache.clone();
        Tween::new(start, end)
            .with_duration(options.duration_ms)
            .with_delay(options.delay_ms)
            .with_easing(options.easing)
            .with_tag(channel.key())
            .on_update(move |value, _, _, _| {
                if let Some(v) = value.as_number() {
                    let rendered = {
                        let mut c = cache.borrow_mut();
                        c.set(channel, v);
                        c.render()
                    };
                    el.set_style("transform", &rendered);
                }
            })
    }
}

fn base_tween(from: f64, to: f64, options: AnimateOptions) -> Tween {
    Tween::new(from, to)
        .with_duration(options.duration_ms)
        .with_delay(options.delay_ms)
        .with_easing(options.easing)
}

fn color_tween<E: Element + 'static>(
    element: &E,
    prop_key: &str,
    target: &str,
    options: AnimateOptions,
) -> Tween {
    let css = camel_to_kebab(prop_key);
    let current = element
        .computed_style(&css)
        .and_then(|s| parse_color(&s).ok())
        .unwrap_or(Rgba::BLACK);
    let to = parse_color(target).unwrap_or(Rgba::BLACK);
    // A fully transparent computed color has no meaningful RGB to fade from;
    // start at the target's RGB with alpha 0 instead.
    let from = if current.is_transparent() {
        to.with_alpha(0.0)
    } else {
        current
    };
    let use_alpha = color_has_alpha(target) || current.is_transparent();

    let el = element.clone();
    Tween::new(from, to)
        .with_duration(options.duration_ms)
        .with_delay(options.delay_ms)
        .with_easing(options.easing)
        .on_update(move |value, _, _, _| {
            if let Some(rgba) = value.as_color() {
                let rendered = if use_alpha {
                    rgba.to_css_rgba()
                } else {
                    rgba.to_css_rgb()
                };
                el.set_style(&css, &rendered);
            }
        })
}

fn blur_tween<E: Element + 'static>(element: &E, target: &str, options: AnimateOptions) -> Tween {
    let from = element
        .computed_style("filter")
        .and_then(|s| parse_blur_radius(&s))
        .unwrap_or(0.0);
    let to = parse_length(target).map(|l| l.value).unwrap_or(0.0);

    let el = element.clone();
    base_tween(from, to, options).on_update(move |value, _, _, _| {
        if let Some(v) = value.as_number() {
            el.set_style("filter", &format!("blur({v}px)"));
        }
    })
}

fn opacity_tween<E: Element + 'static>(element: &E, target: &str, options: AnimateOptions) -> Tween {
    let from = element
        .computed_style("opacity")
        .and_then(|s| parse_opacity(&s))
        .unwrap_or(0.0);
    let to = parse_opacity(target).unwrap_or(0.0);

    let el = element.clone();
    base_tween(from, to, options).on_update(move |value, _, _, _| {
        if let Some(v) = value.as_number() {
            el.set_style("opacity", &v.to_string());
        }
    })
}

/// The `value` sentinel: no interpolation, just a completion action one
/// frame later. Sets the element's `value` attribute when it carries one,
/// else treats `flex`/`none` as a display toggle on the designated
/// container sibling.
fn value_sentinel<E: Element + 'static>(
    element: &E,
    target: &str,
    options: AnimateOptions,
) -> Tween {
    let el = element.clone();
    let target = target.to_string();
    Tween::new(0.0, 1.0)
        .with_duration(0.0)
        .with_delay(options.delay_ms)
        .on_complete(move || {
            if el.attribute("value").is_some() {
                el.set_attribute("value", &target);
            } else if target == "flex" || target == "none" {
                el.toggle_container_display(&target);
            }
        })
}

fn numeric_tween<E: Element + 'static>(
    element: &E,
    prop_key: &str,
    target: &str,
    options: AnimateOptions,
) -> Tween {
    let css = camel_to_kebab(prop_key);
    let parsed = parse_length(target).ok();
    let to = parsed.as_ref().map(|l| l.value).unwrap_or(0.0);
    let unit = parsed
        .and_then(|l| l.unit)
        .unwrap_or_default();
    let from = element
        .computed_style(&css)
        .and_then(|s| parse_length(&s).ok())
        .map(|l| l.value)
        .unwrap_or(0.0);

    let el = element.clone();
    base_tween(from, to, options).on_update(move |value, _, _, _| {
        if let Some(v) = value.as_number() {
            el.set_style(&css, &format!("{v}{unit}"));
        }
    })
}

/// `backgroundColor` -> `background-color`.
fn camel_to_kebab(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

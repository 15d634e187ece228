//! Transform channel cache and deterministic rendering.
//!
//! Each element accumulates named transform channels (`translateX`, `scale`,
//! `rotate`, ...) in a [`ChannelCache`]. The cache is the authoritative
//! current value for every channel it holds: start values for new animations
//! come from here first, then from the element's rendered transform string,
//! then from the channel's semantic default. Rendering always emits channels
//! in one fixed order so concurrent animations on different channels of the
//! same element compose instead of clobbering each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::style::parse_length;

/// A named transform component composed into one CSS transform value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformChannel {
    TranslateX,
    TranslateY,
    TranslateZ,
    Scale,
    ScaleX,
    ScaleY,
    Rotate,
    SkewX,
    SkewY,
}

/// Render order. Translate channels collapse into a single `translate3d`
/// emitted first, then the scale family, then rotation and skew.
const RENDER_ORDER: [TransformChannel; 6] = [
    TransformChannel::Scale,
    TransformChannel::ScaleX,
    TransformChannel::ScaleY,
    TransformChannel::Rotate,
    TransformChannel::SkewX,
    TransformChannel::SkewY,
];

impl TransformChannel {
    pub const ALL: [TransformChannel; 9] = [
        Self::TranslateX,
        Self::TranslateY,
        Self::TranslateZ,
        Self::Scale,
        Self::ScaleX,
        Self::ScaleY,
        Self::Rotate,
        Self::SkewX,
        Self::SkewY,
    ];

    /// Look up a channel by its CSS-style property key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "translateX" => Some(Self::TranslateX),
            "translateY" => Some(Self::TranslateY),
            "translateZ" => Some(Self::TranslateZ),
            "scale" => Some(Self::Scale),
            "scaleX" => Some(Self::ScaleX),
            "scaleY" => Some(Self::ScaleY),
            "rotate" => Some(Self::Rotate),
            "skewX" => Some(Self::SkewX),
            "skewY" => Some(Self::SkewY),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::TranslateZ => "translateZ",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Rotate => "rotate",
            Self::SkewX => "skewX",
            Self::SkewY => "skewY",
        }
    }

    /// Identity value for the channel: 1 for the scale family, 0 otherwise.
    pub fn default_value(&self) -> f64 {
        match self {
            Self::Scale | Self::ScaleX | Self::ScaleY => 1.0,
            _ => 0.0,
        }
    }

    fn is_translate(&self) -> bool {
        matches!(self, Self::TranslateX | Self::TranslateY | Self::TranslateZ)
    }

    fn unit(&self) -> &'static str {
        match self {
            Self::TranslateX | Self::TranslateY | Self::TranslateZ => "px",
            Self::Rotate | Self::SkewX | Self::SkewY => "deg",
            Self::Scale | Self::ScaleX | Self::ScaleY => "",
        }
    }
}

/// Components extracted from a rendered transform string.
///
/// Only the functions the engine itself can produce (plus `matrix`) are
/// recognized; anything else is skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedTransform {
    pub translate_x: Option<f64>,
    pub translate_y: Option<f64>,
    pub translate_z: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub rotate_deg: Option<f64>,
}

impl ParsedTransform {
    /// The component this transform contributes to `channel`, if any.
    pub fn channel(&self, channel: TransformChannel) -> Option<f64> {
        match channel {
            TransformChannel::TranslateX => self.translate_x,
            TransformChannel::TranslateY => self.translate_y,
            TransformChannel::TranslateZ => self.translate_z,
            TransformChannel::Scale | TransformChannel::ScaleX => self.scale_x,
            TransformChannel::ScaleY => self.scale_y,
            TransformChannel::Rotate => self.rotate_deg,
            TransformChannel::SkewX | TransformChannel::SkewY => None,
        }
    }
}

/// Parse a rendered transform string (`translate3d`, `translate`, `scale`,
/// `rotate`, `matrix`). Returns `None` for `none`, empty, or fully
/// unrecognized input.
pub fn parse_transform(input: &str) -> Option<ParsedTransform> {
    let s = input.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return None;
    }
    let mut out = ParsedTransform::default();
    let mut recognized = false;
    for (name, args) in transform_functions(s) {
        let nums: Vec<f64> = args
            .split(',')
            .filter_map(|a| parse_length(a).ok().map(|l| l.value))
            .collect();
        match name {
            "translate3d" if nums.len() == 3 => {
                out.translate_x = Some(nums[0]);
                out.translate_y = Some(nums[1]);
                out.translate_z = Some(nums[2]);
                recognized = true;
            }
            "translate" if !nums.is_empty() => {
                out.translate_x = Some(nums[0]);
                out.translate_y = Some(nums.get(1).copied().unwrap_or(0.0));
                recognized = true;
            }
            "scale" if !nums.is_empty() => {
                out.scale_x = Some(nums[0]);
                out.scale_y = Some(nums.get(1).copied().unwrap_or(nums[0]));
                recognized = true;
            }
            "rotate" if nums.len() == 1 => {
                out.rotate_deg = Some(nums[0]);
                recognized = true;
            }
            "matrix" if nums.len() == 6 => {
                let (a, b, c, d, e, f) = (nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                out.translate_x = Some(e);
                out.translate_y = Some(f);
                let sx = a.hypot(b);
                out.scale_x = Some(sx);
                if sx.abs() > f64::EPSILON {
                    out.scale_y = Some((a * d - b * c) / sx);
                }
                out.rotate_deg = Some(b.atan2(a).to_degrees());
                recognized = true;
            }
            _ => {}
        }
    }
    recognized.then_some(out)
}

/// Iterate `name(args)` pairs in a transform list.
fn transform_functions(s: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let open = rest.find('(')?;
        let close = rest[open..].find(')')? + open;
        let name = rest[..open].trim_start_matches(|c: char| c.is_whitespace());
        let name = name.rsplit(char::is_whitespace).next().unwrap_or(name);
        let args = &rest[open + 1..close];
        rest = &rest[close + 1..];
        Some((name, args))
    })
}

/// Per-element transform channel cache.
#[derive(Debug, Clone, Default)]
pub struct ChannelCache {
    values: HashMap<TransformChannel, f64>,
    /// Render units for translate channels whose target carried one
    /// (`%`, `rem`, ...). Absent channels render in pixels.
    units: HashMap<TransformChannel, String>,
}

impl ChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: TransformChannel) -> Option<f64> {
        self.values.get(&channel).copied()
    }

    /// Write a channel value. The cache becomes authoritative for the channel
    /// from this point on.
    pub fn set(&mut self, channel: TransformChannel, value: f64) {
        self.values.insert(channel, value);
    }

    /// Override the render unit of a translate channel. Translate components
    /// render in pixels unless the animated value was already unit-bearing.
    /// Ignored for non-translate channels.
    pub fn set_unit(&mut self, channel: TransformChannel, unit: impl Into<String>) {
        if channel.is_translate() {
            self.units.insert(channel, unit.into());
        }
    }

    /// Pre-seed a channel's value before any animation runs. Callers use this
    /// to supply page-specific starting values instead of the semantic
    /// defaults. Does not overwrite a value already cached.
    pub fn prime(&mut self, channel: TransformChannel, value: f64) {
        self.values.entry(channel).or_insert(value);
    }

    /// Resolve the starting value for a channel: cached value, else the
    /// component parsed from `rendered` (the element's current transform
    /// string), else the channel's semantic default. The resolved value is
    /// cached immediately.
    pub fn resolve_start(&mut self, channel: TransformChannel, rendered: Option<&str>) -> f64 {
        if let Some(value) = self.get(channel) {
            return value;
        }
        let value = rendered
            .and_then(parse_transform)
            .and_then(|parsed| parsed.channel(channel))
            .unwrap_or_else(|| channel.default_value());
        self.set(channel, value);
        value
    }

    /// Render the cached channels into one transform string, in fixed order:
    /// `translate3d` (x/y/z combined), `scale`, `scaleX`, `scaleY`, `rotate`,
    /// `skewX`, `skewY`. Channels absent from the cache are not emitted;
    /// absent translate components render as 0.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let has_translate = TransformChannel::ALL
            .iter()
            .any(|c| c.is_translate() && self.values.contains_key(c));
        if has_translate {
            let t = |c: TransformChannel| {
                let unit = self.units.get(&c).map(String::as_str).unwrap_or("px");
                format!("{}{}", fmt(self.get(c).unwrap_or(0.0)), unit)
            };
            parts.push(format!(
                "translate3d({}, {}, {})",
                t(TransformChannel::TranslateX),
                t(TransformChannel::TranslateY),
                t(TransformChannel::TranslateZ),
            ));
        }
        for channel in RENDER_ORDER {
            if let Some(value) = self.get(channel) {
                parts.push(format!("{}({}{})", channel.key(), fmt(value), channel.unit()));
            }
        }
        parts.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Format a channel value without a trailing `.0` on whole numbers.
fn fmt(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn parses_translate3d_and_scale() {
        let parsed = parse_transform("translate3d(10px, -4px, 0px) scale(1.5)")
            .expect("recognized");
        assert!(approx(parsed.translate_x.unwrap(), 10.0));
        assert!(approx(parsed.translate_y.unwrap(), -4.0));
        assert!(approx(parsed.scale_x.unwrap(), 1.5));
        assert!(approx(parsed.scale_y.unwrap(), 1.5));
    }

    #[test]
    fn parses_matrix_translation() {
        let parsed = parse_transform("matrix(1, 0, 0, 1, 50, 0)").expect("recognized");
        assert!(approx(parsed.translate_x.unwrap(), 50.0));
        assert!(approx(parsed.translate_y.unwrap(), 0.0));
        assert!(approx(parsed.scale_x.unwrap(), 1.0));
        assert!(approx(parsed.rotate_deg.unwrap(), 0.0));
    }

    #[test]
    fn parses_matrix_rotation_and_scale() {
        // 90 degree rotation at scale 2.
        let parsed = parse_transform("matrix(0, 2, -2, 0, 0, 0)").expect("recognized");
        assert!(approx(parsed.rotate_deg.unwrap(), 90.0));
        assert!(approx(parsed.scale_x.unwrap(), 2.0));
        assert!(approx(parsed.scale_y.unwrap(), 2.0));
    }

    #[test]
    fn none_and_garbage_are_unparsed() {
        assert_eq!(parse_transform("none"), None);
        assert_eq!(parse_transform(""), None);
        assert_eq!(parse_transform("perspective(400px)"), None);
    }

    #[test]
    fn cold_start_priority_order() {
        let mut cache = ChannelCache::new();
        // No cache, rendered style wins over the default.
        let start = cache.resolve_start(
            TransformChannel::TranslateX,
            Some("matrix(1, 0, 0, 1, 50, 0)"),
        );
        assert!(approx(start, 50.0));
        // Now cached; a different rendered style no longer matters.
        let again = cache.resolve_start(TransformChannel::TranslateX, Some("translate(7px)"));
        assert!(approx(again, 50.0));
    }

    #[test]
    fn semantic_defaults() {
        let mut cache = ChannelCache::new();
        assert!(approx(cache.resolve_start(TransformChannel::Scale, None), 1.0));
        assert!(approx(cache.resolve_start(TransformChannel::Rotate, Some("none")), 0.0));
    }

    #[test]
    fn prime_seeds_without_overwriting() {
        let mut cache = ChannelCache::new();
        cache.prime(TransformChannel::TranslateY, -14.0);
        assert!(approx(cache.resolve_start(TransformChannel::TranslateY, None), -14.0));
        cache.prime(TransformChannel::TranslateY, 99.0);
        assert!(approx(cache.get(TransformChannel::TranslateY).unwrap(), -14.0));
    }

    #[test]
    fn render_order_is_fixed() {
        let mut a = ChannelCache::new();
        a.set(TransformChannel::Rotate, 45.0);
        a.set(TransformChannel::Scale, 1.2);

        let mut b = ChannelCache::new();
        b.set(TransformChannel::Scale, 1.2);
        b.set(TransformChannel::Rotate, 45.0);

        assert_eq!(a.render(), b.render());
        assert_eq!(a.render(), "scale(1.2) rotate(45deg)");
    }

    #[test]
    fn unit_bearing_translate_renders_its_unit() {
        let mut cache = ChannelCache::new();
        cache.set(TransformChannel::TranslateX, 50.0);
        cache.set_unit(TransformChannel::TranslateX, "%");
        assert_eq!(cache.render(), "translate3d(50%, 0px, 0px)");

        // Non-translate channels keep their fixed units.
        cache.set_unit(TransformChannel::Rotate, "%");
        cache.set(TransformChannel::Rotate, 10.0);
        assert_eq!(cache.render(), "translate3d(50%, 0px, 0px) rotate(10deg)");
    }

    #[test]
    fn translate_channels_combine() {
        let mut cache = ChannelCache::new();
        cache.set(TransformChannel::TranslateY, -20.0);
        assert_eq!(cache.render(), "translate3d(0px, -20px, 0px)");
        cache.set(TransformChannel::TranslateX, 5.5);
        cache.set(TransformChannel::SkewX, 10.0);
        assert_eq!(cache.render(), "translate3d(5.5px, -20px, 0px) skewX(10deg)");
    }
}

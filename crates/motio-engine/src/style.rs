//! Parsing of the small set of CSS value shapes the animator reads.
//!
//! Parsers here are strict and return typed errors; the animator is the one
//! that maps failures to the documented fallbacks (opaque black for colors,
//! zero for numerics) so a bad value degrades instead of failing the call.

use thiserror::Error;

use crate::value::Rgba;

/// A value that failed to parse as any recognized pattern.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleParseError {
    #[error("unrecognized color value: {0:?}")]
    Color(String),
    #[error("unrecognized length value: {0:?}")]
    Length(String),
}

/// A numeric style value with its unit suffix, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Option<String>,
}

impl Length {
    pub fn unitless(value: f64) -> Self {
        Self { value, unit: None }
    }

    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: Some("px".to_string()),
        }
    }

    pub fn is_px_or_unitless(&self) -> bool {
        match self.unit.as_deref() {
            None | Some("px") => true,
            _ => false,
        }
    }
}

/// Parse a color in hex shorthand/long form, `rgb()`/`rgba()` form, or the
/// `transparent` keyword.
pub fn parse_color(input: &str) -> Result<Rgba, StyleParseError> {
    let s = input.trim();
    if s.eq_ignore_ascii_case("transparent") {
        return Ok(Rgba::TRANSPARENT);
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| StyleParseError::Color(input.to_string()));
    }
    if let Some(args) = strip_function(s, "rgba").or_else(|| strip_function(s, "rgb")) {
        return parse_rgb_args(args).ok_or_else(|| StyleParseError::Color(input.to_string()));
    }
    Err(StyleParseError::Color(input.to_string()))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digits: Vec<u32> = hex.chars().map(|c| c.to_digit(16)).collect::<Option<_>>()?;
    match digits.len() {
        3 => Some(Rgba::opaque(
            (digits[0] * 17) as f32,
            (digits[1] * 17) as f32,
            (digits[2] * 17) as f32,
        )),
        6 => Some(Rgba::opaque(
            (digits[0] * 16 + digits[1]) as f32,
            (digits[2] * 16 + digits[3]) as f32,
            (digits[4] * 16 + digits[5]) as f32,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r: f32 = parts[0].parse().ok()?;
    let g: f32 = parts[1].parse().ok()?;
    let b: f32 = parts[2].parse().ok()?;
    let a: f32 = match parts.get(3) {
        Some(p) => p.parse().ok()?,
        None => 1.0,
    };
    Some(Rgba::new(r, g, b, a))
}

/// Strip `name(` ... `)` and return the argument text.
fn strip_function<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?.trim_start();
    rest.strip_prefix('(')?.trim_end().strip_suffix(')')
}

/// Whether an `rgb()`/`rgba()` string (or `transparent`) explicitly carries
/// an alpha channel.
pub fn color_has_alpha(input: &str) -> bool {
    let s = input.trim();
    s.eq_ignore_ascii_case("transparent")
        || strip_function(s, "rgba")
            .map(|args| args.split(',').count() == 4)
            .unwrap_or(false)
}

/// Parse a numeric value with an optional trailing unit (`"12px"`, `"0.5"`,
/// `"-14rem"`).
pub fn parse_length(input: &str) -> Result<Length, StyleParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(StyleParseError::Length(input.to_string()));
    }
    let split = s
        .char_indices()
        .find(|(i, c)| {
            !(c.is_ascii_digit() || *c == '.' || ((*c == '-' || *c == '+') && *i == 0))
        })
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let (num, unit) = s.split_at(split);
    let value: f64 = num
        .parse()
        .map_err(|_| StyleParseError::Length(input.to_string()))?;
    let unit = unit.trim();
    Ok(Length {
        value,
        unit: if unit.is_empty() {
            None
        } else {
            Some(unit.to_string())
        },
    })
}

/// Extract the radius of a `blur(Npx)` filter, if present.
pub fn parse_blur_radius(filter: &str) -> Option<f64> {
    let start = filter.find("blur(")?;
    let rest = &filter[start + 5..];
    let end = rest.find(')')?;
    parse_length(&rest[..end]).ok().map(|l| l.value)
}

/// Parse an opacity value; `None` for anything non-numeric.
pub fn parse_opacity(input: &str) -> Option<f64> {
    input.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_color("#fff").unwrap(), Rgba::opaque(255.0, 255.0, 255.0));
        assert_eq!(parse_color("#102030").unwrap(), Rgba::opaque(16.0, 32.0, 48.0));
        assert_eq!(parse_color(" #abc ").unwrap(), Rgba::opaque(170.0, 187.0, 204.0));
    }

    #[test]
    fn rgb_and_rgba_colors() {
        assert_eq!(
            parse_color("rgb(10, 20, 30)").unwrap(),
            Rgba::opaque(10.0, 20.0, 30.0)
        );
        assert_eq!(
            parse_color("rgba(10, 20, 30, 0.4)").unwrap(),
            Rgba::new(10.0, 20.0, 30.0, 0.4)
        );
        assert_eq!(parse_color("transparent").unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn malformed_colors_error() {
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
        assert!(parse_color("papayawhip").is_err());
        assert!(parse_color("").is_err());
    }

    #[test]
    fn alpha_detection() {
        assert!(color_has_alpha("rgba(0, 0, 0, 0.5)"));
        assert!(color_has_alpha("transparent"));
        assert!(!color_has_alpha("rgb(0, 0, 0)"));
        assert!(!color_has_alpha("#000"));
    }

    #[test]
    fn lengths() {
        assert_eq!(parse_length("12px").unwrap(), Length::px(12.0));
        assert_eq!(parse_length("0.5").unwrap(), Length::unitless(0.5));
        let rem = parse_length("-14rem").unwrap();
        assert_eq!(rem.value, -14.0);
        assert_eq!(rem.unit.as_deref(), Some("rem"));
        assert!(!rem.is_px_or_unitless());
        assert!(parse_length("auto").is_err());
        assert!(parse_length("").is_err());
    }

    #[test]
    fn blur_radius() {
        assert_eq!(parse_blur_radius("blur(4px)"), Some(4.0));
        assert_eq!(parse_blur_radius("grayscale(1) blur(2.5px)"), Some(2.5));
        assert_eq!(parse_blur_radius("none"), None);
        assert_eq!(parse_blur_radius(""), None);
    }

    #[test]
    fn opacity() {
        assert_eq!(parse_opacity("0.35"), Some(0.35));
        assert_eq!(parse_opacity(" 1 "), Some(1.0));
        assert_eq!(parse_opacity("inherit"), None);
    }
}

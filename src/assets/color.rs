use serde::{Deserialize, Serialize};

use crate::foundation::error::{StyleError, StyleResult};
use crate::foundation::value::Value;

/// Straight-alpha sRGB color with channels in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in `0..=255`, alpha in `0..=1` (CSS `rgba()` convention).
    pub fn from_rgba8(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::rgba(
            (r / 255.0).clamp(0.0, 1.0),
            (g / 255.0).clamp(0.0, 1.0),
            (b / 255.0).clamp(0.0, 1.0),
            a.clamp(0.0, 1.0),
        )
    }

    /// Parse a color from a resolved field value (CSS string or `[r, g, b(, a)]` array).
    pub fn from_value(v: &Value) -> StyleResult<Self> {
        match v {
            Value::String(_) | Value::Array(_) => serde_json::from_value(v.to_json())
                .map_err(|e| StyleError::build(format!("invalid color {v}: {e}"))),
            other => Err(StyleError::build(format!(
                "expected a color string or array, got {}",
                other.type_name()
            ))),
        }
    }

    /// CSS `rgba()` form.
    pub fn to_css(self) -> String {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        format!(
            "rgba({},{},{},{})",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b),
            crate::foundation::value::format_number(self.a.clamp(0.0, 1.0))
        )
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => parse_css(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::from_rgba8(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Self::from_rgba8(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_css(s: &str) -> Result<Color, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some((func, args)) = lower.split_once('(') {
        let args = args
            .strip_suffix(')')
            .ok_or_else(|| format!("unterminated color function \"{s}\""))?;
        return parse_function(func.trim(), args);
    }
    named(&lower).ok_or_else(|| format!("unknown color \"{s}\""))
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn digit(c: u8) -> Result<f64, String> {
        (c as char)
            .to_digit(16)
            .map(f64::from)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }

    let b = s.as_bytes();
    let short = |i: usize| digit(b[i]).map(|d| d * 17.0);
    let long = |i: usize| Ok::<_, String>(digit(b[i])? * 16.0 + digit(b[i + 1])?);

    let (r, g, bl, a) = match b.len() {
        3 => (short(0)?, short(1)?, short(2)?, 255.0),
        4 => (short(0)?, short(1)?, short(2)?, short(3)?),
        6 => (long(0)?, long(2)?, long(4)?, 255.0),
        8 => (long(0)?, long(2)?, long(4)?, long(6)?),
        _ => {
            return Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };
    Ok(Color::from_rgba8(r, g, bl, a / 255.0))
}

fn parse_function(func: &str, args: &str) -> Result<Color, String> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_ascii_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(format!("{func}() expects 3 or 4 components"));
    }
    let alpha = match parts.get(3) {
        Some(p) => component(p, 1.0)?,
        None => 1.0,
    };

    match func {
        "rgb" | "rgba" => Ok(Color::from_rgba8(
            component(parts[0], 255.0)?,
            component(parts[1], 255.0)?,
            component(parts[2], 255.0)?,
            alpha,
        )),
        "hsl" | "hsla" => {
            let h = parts[0]
                .trim_end_matches("deg")
                .parse::<f64>()
                .map_err(|_| format!("invalid hue \"{}\"", parts[0]))?;
            let sat = component(parts[1], 100.0)? / 100.0;
            let light = component(parts[2], 100.0)? / 100.0;
            Ok(hsla_to_rgba(h, sat, light, alpha))
        }
        other => Err(format!("unknown color function \"{other}\"")),
    }
}

/// A number, or a percentage of `full`.
fn component(p: &str, full: f64) -> Result<f64, String> {
    let (num, scale) = match p.strip_suffix('%') {
        Some(pct) => (pct, full / 100.0),
        None => (p, 1.0),
    };
    num.parse::<f64>()
        .map(|v| v * scale)
        .map_err(|_| format!("invalid color component \"{p}\""))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let a = a.clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Color::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

fn named(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "orange" => (255, 165, 0),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "gold" => (255, 215, 0),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        _ => return None,
    };
    Some(Color::from_rgba8(f64::from(r), f64::from(g), f64::from(b), 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;

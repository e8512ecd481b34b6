//! Primitive builders and variant realization.
//!
//! Every builder takes a resolved descriptor and returns `Ok(None)` when the descriptor is
//! absent or carries `when: false`. A descriptor that already is a built primitive (a typed
//! definition referenced through `D`) is handed back unchanged.

use std::sync::Arc;

use indexmap::IndexMap;
use kurbo::Point;
use serde::de::DeserializeOwned;

use crate::assets::color::Color;
use crate::assets::image::ImageHandle;
use crate::document::template::Node;
use crate::expression::eval::EvalContext;
use crate::foundation::error::{StyleError, StyleResult};
use crate::foundation::value::Value;
use crate::style::primitives::{
    CircleStyle, ColorStop, Fill, Icon, ImageStyle, Paint, Primitive, RegularShape, Stroke,
    StyleSet, StyleVariant, Text,
};

/// `type` tags a definitions entry may carry to be built as a primitive.
pub const DEFINITION_TAGS: &[&str] = &[
    "Fill",
    "Stroke",
    "Text",
    "Icon",
    "RegularShape",
    "Circle",
    "LinearGradient",
    "RadialGradient",
    "ConicGradient",
    "PatternFill",
    "CanvasPattern",
];

pub fn is_definition_tag(tag: &str) -> bool {
    DEFINITION_TAGS.contains(&tag)
}

/// Field access over an object descriptor, with build errors naming the field.
struct Descriptor<'a> {
    kind: &'static str,
    fields: &'a IndexMap<String, Value>,
}

impl<'a> Descriptor<'a> {
    /// `None` for a nullish value or a descriptor guarded off with `when: false`.
    fn open(kind: &'static str, v: &'a Value) -> StyleResult<Option<Self>> {
        match v {
            Value::Undefined | Value::Null => Ok(None),
            Value::Object(fields) => {
                let d = Self { kind, fields };
                Ok((!d.get("when").strict_eq(&Value::Bool(false))).then_some(d))
            }
            other => Err(StyleError::build(format!(
                "{kind} descriptor must be an object, got {}",
                other.type_name()
            ))),
        }
    }

    fn get(&self, key: &str) -> &'a Value {
        static UNDEFINED: Value = Value::Undefined;
        self.fields.get(key).unwrap_or(&UNDEFINED)
    }

    fn invalid(&self, key: &str, expected: &str) -> StyleError {
        StyleError::build(format!(
            "{}.{key}: expected {expected}, got {}",
            self.kind,
            self.get(key).type_name()
        ))
    }

    fn num(&self, key: &str) -> StyleResult<Option<f64>> {
        match self.get(key) {
            Value::Undefined | Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            _ => Err(self.invalid(key, "a number")),
        }
    }

    fn num_or(&self, key: &str, default: f64) -> StyleResult<f64> {
        Ok(self.num(key)?.unwrap_or(default))
    }

    fn required_num(&self, key: &str) -> StyleResult<f64> {
        self.num(key)?.ok_or_else(|| self.invalid(key, "a number"))
    }

    fn string(&self, key: &str) -> StyleResult<Option<String>> {
        match self.get(key) {
            Value::Undefined | Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(self.invalid(key, "a string")),
        }
    }

    fn bool_or(&self, key: &str, default: bool) -> StyleResult<bool> {
        match self.get(key) {
            Value::Undefined | Value::Null => Ok(default),
            Value::Bool(b) => Ok(*b),
            _ => Err(self.invalid(key, "a boolean")),
        }
    }

    fn numbers(&self, key: &str) -> StyleResult<Option<Vec<f64>>> {
        match self.get(key) {
            Value::Undefined | Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_f64().ok_or_else(|| self.invalid(key, "an array of numbers")))
                .collect::<StyleResult<Vec<_>>>()
                .map(Some),
            _ => Err(self.invalid(key, "an array of numbers")),
        }
    }

    fn pair_or(&self, key: &str, default: [f64; 2]) -> StyleResult<[f64; 2]> {
        match self.numbers(key)?.as_deref() {
            None => Ok(default),
            Some(&[a, b]) => Ok([a, b]),
            Some(_) => Err(self.invalid(key, "[x, y]")),
        }
    }

    fn point(&self, x: &str, y: &str) -> StyleResult<Point> {
        Ok(Point::new(self.num_or(x, 0.0)?, self.num_or(y, 0.0)?))
    }

    /// Lower-case keyword enums (`lineCap`, `textAlign`, ...).
    fn keyword<T: DeserializeOwned>(&self, key: &str) -> StyleResult<Option<T>> {
        match self.string(key)? {
            None => Ok(None),
            Some(s) => keyword(&s).map(Some).map_err(|_| {
                StyleError::build(format!("{}.{key}: unknown value \"{s}\"", self.kind))
            }),
        }
    }

    fn image(&self, key: &str) -> Option<ImageHandle> {
        match self.get(key) {
            Value::Image(handle) => Some(handle.clone()),
            _ => None,
        }
    }
}

pub(crate) fn keyword<T: DeserializeOwned>(s: &str) -> StyleResult<T> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|e| StyleError::build(format!("unknown keyword \"{s}\": {e}")))
}

/// Build the paint for a `color` field.
///
/// Strings and arrays are colors; objects must carry a paint `type` tag.
pub fn build_paint(v: &Value) -> StyleResult<Option<Paint>> {
    match v {
        Value::Undefined | Value::Null => Ok(None),
        Value::Primitive(p) => match p.as_ref() {
            Primitive::Paint(paint) => Ok(Some(paint.clone())),
            other => Err(StyleError::build(format!(
                "a {} cannot be used as a color",
                other.kind_name()
            ))),
        },
        Value::Object(fields) => {
            let d = Descriptor {
                kind: "paint",
                fields,
            };
            let tag = d.string("type")?.unwrap_or_default();
            let stops = || build_stops(d.get("stops"));
            let paint = match tag.as_str() {
                "PatternFill" | "CanvasPattern" => Paint::Pattern {
                    image: d.image("img").ok_or_else(|| d.invalid("img", "an image"))?,
                    repetition: d.string("repetition")?.unwrap_or_else(|| "repeat".to_owned()),
                },
                "LinearGradient" => Paint::LinearGradient {
                    p0: d.point("x0", "y0")?,
                    p1: d.point("x1", "y1")?,
                    stops: stops()?,
                },
                "RadialGradient" => Paint::RadialGradient {
                    c0: d.point("x0", "y0")?,
                    r0: d.num_or("r0", 0.0)?,
                    c1: d.point("x1", "y1")?,
                    r1: d.num_or("r1", 0.0)?,
                    stops: stops()?,
                },
                "ConicGradient" => Paint::ConicGradient {
                    start_angle: d.num_or("startAngle", 0.0)?,
                    center: d.point("x", "y")?,
                    stops: stops()?,
                },
                "" => return Err(StyleError::build("paint object without a `type` tag")),
                other => return Err(StyleError::build(format!("unknown paint type \"{other}\""))),
            };
            Ok(Some(paint))
        }
        other => Color::from_value(other).map(|c| Some(Paint::Color(c))),
    }
}

fn build_stops(v: &Value) -> StyleResult<Vec<ColorStop>> {
    let items = match v {
        Value::Undefined | Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(StyleError::build(format!(
                "gradient stops must be an array, got {}",
                other.type_name()
            )));
        }
    };
    items
        .iter()
        .map(|stop| match stop {
            Value::Array(pair) if pair.len() == 2 => Ok(ColorStop {
                offset: pair[0]
                    .as_f64()
                    .ok_or_else(|| StyleError::build("gradient stop offset must be a number"))?,
                color: Color::from_value(&pair[1])?,
            }),
            _ => Err(StyleError::build("gradient stops must be [offset, color] pairs")),
        })
        .collect()
}

pub fn build_fill(v: &Value) -> StyleResult<Option<Fill>> {
    if let Value::Primitive(p) = v {
        return match p.as_ref() {
            Primitive::Fill(fill) => Ok(Some(fill.clone())),
            other => Err(mismatch("fill", other)),
        };
    }
    let Some(d) = Descriptor::open("fill", v)? else {
        return Ok(None);
    };
    Ok(Some(Fill {
        color: build_paint(d.get("color"))?,
    }))
}

pub fn build_stroke(v: &Value) -> StyleResult<Option<Stroke>> {
    if let Value::Primitive(p) = v {
        return match p.as_ref() {
            Primitive::Stroke(stroke) => Ok(Some(stroke.clone())),
            other => Err(mismatch("stroke", other)),
        };
    }
    let Some(d) = Descriptor::open("stroke", v)? else {
        return Ok(None);
    };
    Ok(Some(Stroke {
        color: build_paint(d.get("color"))?,
        width: d.num("width")?,
        line_cap: d.keyword("lineCap")?,
        line_join: d.keyword("lineJoin")?,
        line_dash: d.numbers("lineDash")?,
        line_dash_offset: d.num("lineDashOffset")?,
        miter_limit: d.num("miterLimit")?,
    }))
}

/// Dispatch on the descriptor's `type` (`Icon`, `RegularShape`, `Circle`).
///
/// An unknown or missing type yields no image.
pub fn build_image(v: &Value) -> StyleResult<Option<ImageStyle>> {
    if let Value::Primitive(p) = v {
        return match p.as_ref() {
            Primitive::Image(img) => Ok(Some(img.clone())),
            other => Err(mismatch("image", other)),
        };
    }
    let Some(d) = Descriptor::open("image", v)? else {
        return Ok(None);
    };
    let image = match d.get("type").as_str() {
        Some("Icon") => ImageStyle::Icon(build_icon(&d)?),
        Some("RegularShape") => ImageStyle::RegularShape(build_regular_shape(&d)?),
        Some("Circle") => ImageStyle::Circle(build_circle(&d)?),
        _ => return Ok(None),
    };
    Ok(Some(image))
}

fn build_icon(d: &Descriptor<'_>) -> StyleResult<Icon> {
    let (src, img) = match d.get("src") {
        Value::Image(handle) => (None, Some(handle.clone())),
        _ => (d.string("src")?, d.image("img")),
    };
    if src.is_none() && img.is_none() {
        return Err(StyleError::build("Icon needs a `src` or an `img`"));
    }
    let color = match d.get("color") {
        Value::Undefined | Value::Null => None,
        c => Some(Color::from_value(c)?),
    };
    Ok(Icon {
        src,
        img,
        anchor: d.pair_or("anchor", [0.5, 0.5])?,
        color,
        opacity: d.num_or("opacity", 1.0)?,
        scale: d.num_or("scale", 1.0)?,
        rotation: d.num_or("rotation", 0.0)?,
        displacement: d.pair_or("displacement", [0.0, 0.0])?,
        width: d.num("width")?,
        height: d.num("height")?,
    })
}

fn build_regular_shape(d: &Descriptor<'_>) -> StyleResult<RegularShape> {
    let points = d.required_num("points")?;
    if !(points >= 1.0 && points.fract() == 0.0) {
        return Err(d.invalid("points", "a positive integer"));
    }
    let radius = match d.num("radius")? {
        Some(r) => r,
        None => d.required_num("radius1")?,
    };
    Ok(RegularShape {
        points: points as u32,
        radius,
        radius2: d.num("radius2")?,
        angle: d.num_or("angle", 0.0)?,
        rotation: d.num_or("rotation", 0.0)?,
        scale: d.num_or("scale", 1.0)?,
        displacement: d.pair_or("displacement", [0.0, 0.0])?,
        fill: build_fill(d.get("fill"))?,
        stroke: build_stroke(d.get("stroke"))?,
    })
}

fn build_circle(d: &Descriptor<'_>) -> StyleResult<CircleStyle> {
    Ok(CircleStyle {
        radius: d.required_num("radius")?,
        rotation: d.num_or("rotation", 0.0)?,
        scale: d.num_or("scale", 1.0)?,
        displacement: d.pair_or("displacement", [0.0, 0.0])?,
        fill: build_fill(d.get("fill"))?,
        stroke: build_stroke(d.get("stroke"))?,
    })
}

pub fn build_text(v: &Value) -> StyleResult<Option<Text>> {
    if let Value::Primitive(p) = v {
        return match p.as_ref() {
            Primitive::Text(text) => Ok(Some(text.clone())),
            other => Err(mismatch("text", other)),
        };
    }
    let Some(d) = Descriptor::open("text", v)? else {
        return Ok(None);
    };
    let defaults = Text::default();
    let padding = match d.numbers("padding")?.as_deref() {
        None => defaults.padding,
        Some(&[top, right, bottom, left]) => [top, right, bottom, left],
        Some(_) => return Err(d.invalid("padding", "[top, right, bottom, left]")),
    };
    Ok(Some(Text {
        text: text_content(d.get("text")),
        font: d.string("font")?,
        scale: d.num("scale")?,
        rotation: d.num_or("rotation", defaults.rotation)?,
        offset_x: d.num_or("offsetX", defaults.offset_x)?,
        offset_y: d.num_or("offsetY", defaults.offset_y)?,
        text_align: d.keyword("textAlign")?,
        text_baseline: d.keyword("textBaseline")?,
        placement: d.keyword("placement")?.unwrap_or_default(),
        max_angle: d.num_or("maxAngle", defaults.max_angle)?,
        overflow: d.bool_or("overflow", defaults.overflow)?,
        padding,
        fill: build_fill(d.get("fill"))?,
        stroke: build_stroke(d.get("stroke"))?,
        background_fill: build_fill(d.get("backgroundFill"))?,
        background_stroke: build_stroke(d.get("backgroundStroke"))?,
    }))
}

/// Label content: strings as-is, other scalars in their string form.
pub(crate) fn text_content(v: &Value) -> Option<String> {
    match v {
        Value::Undefined | Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_js_string()),
    }
}

fn mismatch(expected: &str, got: &Primitive) -> StyleError {
    StyleError::build(format!("expected a {expected}, got a {}", got.kind_name()))
}

/// Build a typed definitions entry.
///
/// `Ok(None)` when the value carries no known `type` tag and is exposed as-is. A builder that
/// declines (e.g. `when: false`) yields `null`.
pub(crate) fn build_definition(v: &Value) -> StyleResult<Option<Value>> {
    let Some(tag) = v.field("type").as_str().map(str::to_owned) else {
        return Ok(None);
    };
    let built = match tag.as_str() {
        "Fill" => build_fill(v)?.map(Primitive::Fill),
        "Stroke" => build_stroke(v)?.map(Primitive::Stroke),
        "Text" => build_text(v)?.map(Primitive::Text),
        "Icon" | "RegularShape" | "Circle" => build_image(v)?.map(Primitive::Image),
        "LinearGradient" | "RadialGradient" | "ConicGradient" | "PatternFill" | "CanvasPattern" => {
            build_paint(v)?.map(Primitive::Paint)
        }
        _ => return Ok(None),
    };
    Ok(Some(built.map_or(Value::Null, |p| Value::Primitive(Arc::new(p)))))
}

/// Realize every `static` entry whose `when` guard resolves truthy, in document order.
///
/// A primitive that fails to build is dropped from its variant; the variant itself survives.
pub(crate) fn realize_style_set(statics: &Node, ctx: &EvalContext<'_>) -> StyleSet {
    let Node::Object(entries) = statics else {
        return StyleSet::default();
    };

    let mut variants = Vec::with_capacity(entries.len());
    for (name, entry) in entries {
        if !entry.resolve_field("when", ctx).is_truthy() {
            continue;
        }
        let mut variant = StyleVariant::named(name.as_str());
        variant.fill = built(name, "fill", build_fill(&entry.resolve_field("fill", ctx)));
        variant.stroke = built(name, "stroke", build_stroke(&entry.resolve_field("stroke", ctx)));
        variant.image = built(name, "image", build_image(&entry.resolve_field("image", ctx)));
        variant.text = built(name, "text", build_text(&entry.resolve_field("text", ctx)));
        variant.z_index = entry.resolve_field("zIndex", ctx).as_f64();
        variants.push(variant);
    }
    StyleSet::new(variants)
}

fn built<T>(variant: &str, kind: &str, res: StyleResult<Option<T>>) -> Option<T> {
    res.unwrap_or_else(|err| {
        tracing::warn!(variant, kind, error = %err, "primitive dropped");
        None
    })
}

#[cfg(test)]
#[path = "../../tests/unit/style/builder.rs"]
mod tests;

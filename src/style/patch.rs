//! Late per-feature mutation of realized style sets.
//!
//! A patch pointer `#/<variant|*>/<getter>/…/<setter>` names a variant (or all of them), a
//! chain of getters leading to a primitive, and the property to set on it. Getters and
//! setters are explicit per-kind tables; anything not in a table skips the patch.

use std::fmt;

use crate::foundation::error::{StyleError, StyleResult};
use crate::foundation::value::Value;
use crate::style::builder::{
    build_fill, build_image, build_paint, build_stroke, build_text, keyword, text_content,
};
use crate::style::primitives::{Fill, ImageStyle, StyleSet, StyleVariant, Stroke, Text};

pub const ALL_VARIANTS: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSelector {
    All,
    Named(String),
}

impl VariantSelector {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(n) => n == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPointer {
    variant: VariantSelector,
    path: Vec<String>,
    property: String,
}

impl PatchPointer {
    /// Parse `#/poi/text/fill/color` (the `#` is optional).
    pub fn parse(pointer: &str) -> StyleResult<Self> {
        let trimmed = pointer.strip_prefix('#').unwrap_or(pointer);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut segments: Vec<String> = trimmed.split('/').map(str::to_owned).collect();
        if segments.len() < 2 || segments.iter().any(String::is_empty) {
            return Err(StyleError::patch(format!(
                "patch pointer \"{pointer}\" must look like #/<variant|*>/…/<property>"
            )));
        }
        let property = segments.pop().unwrap_or_default();
        let variant = segments.remove(0);
        let variant = if variant == ALL_VARIANTS {
            VariantSelector::All
        } else {
            VariantSelector::Named(variant)
        };
        Ok(Self {
            variant,
            path: segments,
            property,
        })
    }

    pub fn variant(&self) -> &VariantSelector {
        &self.variant
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    /// Apply to one variant, regardless of the selector.
    pub fn apply_to(&self, variant: &mut StyleVariant, value: &Value) -> StyleResult<()> {
        let mut target = Target::Variant(variant);
        for getter in &self.path {
            target = target.get(getter)?;
        }
        target.set(&self.property, value)
    }
}

impl fmt::Display for PatchPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            VariantSelector::All => write!(f, "#/{ALL_VARIANTS}")?,
            VariantSelector::Named(n) => write!(f, "#/{n}")?,
        }
        for seg in &self.path {
            write!(f, "/{seg}")?;
        }
        write!(f, "/{}", self.property)
    }
}

/// A patch with its value resolved for the current feature.
#[derive(Debug, Clone)]
pub struct Patch {
    pub pointer: PatchPointer,
    pub value: Value,
}

/// Apply `patches` in order to every matching variant of `set`.
///
/// Failures skip the single (patch, variant) pair. Returns how many applications succeeded.
pub fn apply_patches(patches: &[Patch], set: &mut StyleSet) -> usize {
    let mut applied = 0;
    for patch in patches {
        for variant in set.variants_mut() {
            if !patch.pointer.variant.matches(&variant.name) {
                continue;
            }
            match patch.pointer.apply_to(variant, &patch.value) {
                Ok(()) => applied += 1,
                Err(err) => tracing::debug!(
                    pointer = %patch.pointer,
                    variant = %variant.name,
                    error = %err,
                    "patch skipped"
                ),
            }
        }
    }
    applied
}

enum Target<'a> {
    Variant(&'a mut StyleVariant),
    Fill(&'a mut Fill),
    Stroke(&'a mut Stroke),
    Image(&'a mut ImageStyle),
    Text(&'a mut Text),
}

impl<'a> Target<'a> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Variant(_) => "style",
            Self::Fill(_) => "Fill",
            Self::Stroke(_) => "Stroke",
            Self::Image(img) => img.kind_name(),
            Self::Text(_) => "Text",
        }
    }

    fn get(self, name: &str) -> StyleResult<Target<'a>> {
        let kind = self.kind();
        let next = match (self, name) {
            (Self::Variant(v), "fill") => v.fill.as_mut().map(Target::Fill),
            (Self::Variant(v), "stroke") => v.stroke.as_mut().map(Target::Stroke),
            (Self::Variant(v), "image") => v.image.as_mut().map(Target::Image),
            (Self::Variant(v), "text") => v.text.as_mut().map(Target::Text),
            (Self::Image(ImageStyle::RegularShape(s)), "fill") => s.fill.as_mut().map(Target::Fill),
            (Self::Image(ImageStyle::RegularShape(s)), "stroke") => {
                s.stroke.as_mut().map(Target::Stroke)
            }
            (Self::Image(ImageStyle::Circle(c)), "fill") => c.fill.as_mut().map(Target::Fill),
            (Self::Image(ImageStyle::Circle(c)), "stroke") => c.stroke.as_mut().map(Target::Stroke),
            (Self::Text(t), "fill") => t.fill.as_mut().map(Target::Fill),
            (Self::Text(t), "stroke") => t.stroke.as_mut().map(Target::Stroke),
            (Self::Text(t), "backgroundFill") => t.background_fill.as_mut().map(Target::Fill),
            (Self::Text(t), "backgroundStroke") => {
                t.background_stroke.as_mut().map(Target::Stroke)
            }
            _ => return Err(StyleError::patch(format!("{kind} has no getter \"{name}\""))),
        };
        next.ok_or_else(|| StyleError::patch(format!("{kind}.{name} is not set")))
    }

    fn set(self, name: &str, value: &Value) -> StyleResult<()> {
        let kind = self.kind();
        match (self, name) {
            (Self::Variant(v), "fill") => v.fill = build_fill(value)?,
            (Self::Variant(v), "stroke") => v.stroke = build_stroke(value)?,
            (Self::Variant(v), "image") => v.image = build_image(value)?,
            (Self::Variant(v), "text") => v.text = build_text(value)?,
            (Self::Variant(v), "zIndex") => v.z_index = opt_num(name, value)?,

            (Self::Fill(f), "color") => f.color = build_paint(value)?,

            (Self::Stroke(s), "color") => s.color = build_paint(value)?,
            (Self::Stroke(s), "width") => s.width = opt_num(name, value)?,
            (Self::Stroke(s), "lineCap") => s.line_cap = opt_keyword(name, value)?,
            (Self::Stroke(s), "lineJoin") => s.line_join = opt_keyword(name, value)?,
            (Self::Stroke(s), "lineDash") => s.line_dash = opt_numbers(name, value)?,
            (Self::Stroke(s), "lineDashOffset") => s.line_dash_offset = opt_num(name, value)?,
            (Self::Stroke(s), "miterLimit") => s.miter_limit = opt_num(name, value)?,

            (Self::Text(t), "text") => t.text = text_content(value),
            (Self::Text(t), "font") => t.font = opt_string(name, value)?,
            (Self::Text(t), "scale") => t.scale = opt_num(name, value)?,
            (Self::Text(t), "rotation") => t.rotation = num(name, value)?,
            (Self::Text(t), "offsetX") => t.offset_x = num(name, value)?,
            (Self::Text(t), "offsetY") => t.offset_y = num(name, value)?,
            (Self::Text(t), "textAlign") => t.text_align = opt_keyword(name, value)?,
            (Self::Text(t), "textBaseline") => t.text_baseline = opt_keyword(name, value)?,
            (Self::Text(t), "placement") => {
                t.placement = opt_keyword(name, value)?.unwrap_or_default()
            }
            (Self::Text(t), "maxAngle") => t.max_angle = num(name, value)?,
            (Self::Text(t), "overflow") => t.overflow = value.is_truthy(),
            (Self::Text(t), "fill") => t.fill = build_fill(value)?,
            (Self::Text(t), "stroke") => t.stroke = build_stroke(value)?,
            (Self::Text(t), "backgroundFill") => t.background_fill = build_fill(value)?,
            (Self::Text(t), "backgroundStroke") => t.background_stroke = build_stroke(value)?,

            (Self::Image(img), prop) => set_image(img, prop, value)?,

            (_, other) => {
                return Err(StyleError::patch(format!("{kind} has no setter \"{other}\"")));
            }
        }
        Ok(())
    }
}

fn set_image(img: &mut ImageStyle, name: &str, value: &Value) -> StyleResult<()> {
    let kind = img.kind_name();
    match (img, name) {
        (ImageStyle::Icon(i), "rotation") => i.rotation = num(name, value)?,
        (ImageStyle::Icon(i), "scale") => i.scale = num(name, value)?,
        (ImageStyle::Icon(i), "opacity") => i.opacity = num(name, value)?,
        (ImageStyle::Icon(i), "displacement") => i.displacement = pair(name, value)?,
        (ImageStyle::Icon(i), "anchor") => i.anchor = pair(name, value)?,
        (ImageStyle::RegularShape(s), "rotation") => s.rotation = num(name, value)?,
        (ImageStyle::RegularShape(s), "scale") => s.scale = num(name, value)?,
        (ImageStyle::RegularShape(s), "radius") => s.radius = num(name, value)?,
        (ImageStyle::RegularShape(s), "displacement") => s.displacement = pair(name, value)?,
        (ImageStyle::RegularShape(s), "fill") => s.fill = build_fill(value)?,
        (ImageStyle::RegularShape(s), "stroke") => s.stroke = build_stroke(value)?,
        (ImageStyle::Circle(c), "rotation") => c.rotation = num(name, value)?,
        (ImageStyle::Circle(c), "scale") => c.scale = num(name, value)?,
        (ImageStyle::Circle(c), "radius") => c.radius = num(name, value)?,
        (ImageStyle::Circle(c), "displacement") => c.displacement = pair(name, value)?,
        (ImageStyle::Circle(c), "fill") => c.fill = build_fill(value)?,
        (ImageStyle::Circle(c), "stroke") => c.stroke = build_stroke(value)?,
        (_, other) => {
            return Err(StyleError::patch(format!("{kind} has no setter \"{other}\"")));
        }
    }
    Ok(())
}

fn wrong_type(name: &str, expected: &str, value: &Value) -> StyleError {
    StyleError::patch(format!(
        "{name}: expected {expected}, got {}",
        value.type_name()
    ))
}

fn num(name: &str, value: &Value) -> StyleResult<f64> {
    value.as_f64().ok_or_else(|| wrong_type(name, "a number", value))
}

fn opt_num(name: &str, value: &Value) -> StyleResult<Option<f64>> {
    if value.is_nullish() {
        return Ok(None);
    }
    num(name, value).map(Some)
}

fn opt_string(name: &str, value: &Value) -> StyleResult<Option<String>> {
    match value {
        Value::Undefined | Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(wrong_type(name, "a string", other)),
    }
}

fn opt_keyword<T: serde::de::DeserializeOwned>(name: &str, value: &Value) -> StyleResult<Option<T>> {
    match opt_string(name, value)? {
        None => Ok(None),
        Some(s) => keyword(&s).map(Some),
    }
}

fn opt_numbers(name: &str, value: &Value) -> StyleResult<Option<Vec<f64>>> {
    match value {
        Value::Undefined | Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|v| num(name, v))
            .collect::<StyleResult<Vec<_>>>()
            .map(Some),
        other => Err(wrong_type(name, "an array of numbers", other)),
    }
}

fn pair(name: &str, value: &Value) -> StyleResult<[f64; 2]> {
    match opt_numbers(name, value)?.as_deref() {
        Some(&[a, b]) => Ok([a, b]),
        _ => Err(wrong_type(name, "[x, y]", value)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/patch.rs"]
mod tests;

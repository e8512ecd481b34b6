use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StyleError, StyleResult};

pub const DEFAULT_MIN_SCALE: f64 = 0.0;
pub const DEFAULT_MAX_SCALE: f64 = 100_000_000.0;
pub const DEFAULT_CACHE_KEY: &str = "DEFAULT";
/// Guard installed on `static` entries (and their object members) that carry none.
pub const ALWAYS: &str = "=> true";

static LAYER_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Layer metadata carried by the document, for the map widget hosting the layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: serde_json::Value,
    pub title: String,
    pub group: String,
    pub crs: String,
    pub visible: bool,
    pub debug: bool,
    pub format: String,
}

/// A normalized style document: defaults applied, breakpoints sorted, shape validated.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    root: serde_json::Value,
    meta: DocumentMeta,
    scales: Vec<f64>,
}

impl Document {
    /// Normalize `json` into a document for layer `name` (`LAYER<n>` when absent).
    pub fn parse(name: Option<&str>, json: serde_json::Value) -> StyleResult<Self> {
        let name = match name {
            Some(n) => n.to_owned(),
            None => format!("LAYER{}", LAYER_COUNT.fetch_add(1, Ordering::Relaxed) + 1),
        };

        let mut root = match json {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(StyleError::validation(format!(
                    "style document must be an object, got {}",
                    json_type(&other)
                )));
            }
        };

        let mut default = |key: &str, value: serde_json::Value| {
            let slot = root.entry(key).or_insert(serde_json::Value::Null);
            if slot.is_null() {
                *slot = value;
            }
        };
        default("debug", false.into());
        default("format", "geojson".into());
        default("group", name.clone().into());
        default("title", format!("Layer {name}").into());
        default("crs", "EPSG:4326".into());
        default(
            "scales",
            serde_json::json!([DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE]),
        );
        default("cacheKey", DEFAULT_CACHE_KEY.into());
        default("visible", true.into());
        default("static", serde_json::json!({}));
        default("dynamic", serde_json::json!([]));
        default("constants", serde_json::json!({}));
        default("definitions", serde_json::json!({}));
        root.entry("id").or_insert(serde_json::Value::Null);

        let scales = sorted_scales(&root["scales"])?;
        root.insert(
            "scales".to_owned(),
            scales.iter().copied().map(serde_json::Value::from).collect(),
        );

        let Some(statics) = root.get_mut("static").and_then(|s| s.as_object_mut()) else {
            return Err(StyleError::validation("`static` must be an object of named styles"));
        };
        for (variant, entry) in statics.iter_mut() {
            let Some(entry) = entry.as_object_mut() else {
                return Err(StyleError::validation(format!(
                    "static style `{variant}` must be an object"
                )));
            };
            guard_default(entry);
            for member in entry.values_mut() {
                if let Some(member) = member.as_object_mut() {
                    guard_default(member);
                }
            }
        }

        if !root["dynamic"].is_array() {
            return Err(StyleError::validation("`dynamic` must be an array of patches"));
        }

        let root = serde_json::Value::Object(root);
        let meta = DocumentMeta::deserialize(&root)?;
        Ok(Self {
            name,
            root,
            meta,
            scales,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    /// Breakpoints, ascending.
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn min_scale(&self) -> f64 {
        self.scales.first().copied().unwrap_or(DEFAULT_MIN_SCALE)
    }

    pub fn max_scale(&self) -> f64 {
        self.scales.last().copied().unwrap_or(DEFAULT_MAX_SCALE)
    }

    /// Features render for `min_scale() <= scale < max_scale()`.
    pub fn scale_in_range(&self, scale: f64) -> bool {
        scale >= self.min_scale() && scale < self.max_scale()
    }

    /// The normalized document JSON.
    pub fn root(&self) -> &serde_json::Value {
        &self.root
    }
}

fn guard_default(map: &mut serde_json::Map<String, serde_json::Value>) {
    let when = map.entry("when").or_insert(serde_json::Value::Null);
    if when.is_null() {
        *when = ALWAYS.into();
    }
}

fn sorted_scales(v: &serde_json::Value) -> StyleResult<Vec<f64>> {
    let items = v
        .as_array()
        .ok_or_else(|| StyleError::validation("`scales` must be an array of numbers"))?;
    let mut scales = items
        .iter()
        .map(|s| {
            s.as_f64().ok_or_else(|| {
                StyleError::validation(format!("`scales` entries must be numbers, got {s}"))
            })
        })
        .collect::<StyleResult<Vec<_>>>()?;
    scales.sort_by(f64::total_cmp);
    Ok(scales)
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;

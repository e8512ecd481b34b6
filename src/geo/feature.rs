use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::value::Value;

/// A GeoJSON feature as seen by style expressions (`F`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_owned(), value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: serde_json::Value) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// Object view exposed to expressions when `F` is used as a whole.
    pub fn to_value(&self) -> Value {
        let mut map = indexmap::IndexMap::new();
        map.insert("type".to_owned(), Value::from("Feature"));
        map.insert(
            "id".to_owned(),
            self.id.as_ref().map_or(Value::Undefined, Value::from_json),
        );
        map.insert(
            "properties".to_owned(),
            Value::Object(
                self.properties
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        );
        map.insert(
            "geometry".to_owned(),
            self.geometry.as_ref().map_or(Value::Null, Value::from_json),
        );
        Value::Object(map)
    }
}

/// GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<serde_json::Map<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/geo/feature.rs"]
mod tests;

use std::{borrow::Cow, collections::BTreeMap};

use serde::{Deserialize, Serialize};

pub type Tags = BTreeMap<String, TagValue>;

/// A tag value as found on an element. Raw OSM data only ever carries strings,
/// the other variants appear once tags have been through [`coerce_tags`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl TagValue {
    /// The value as OSM would have spelled it before coercion.
    pub fn as_osm_str(&self) -> Cow<'_, str> {
        match self {
            TagValue::String(value) => Cow::Borrowed(value),
            TagValue::Bool(true) => Cow::Borrowed("yes"),
            TagValue::Bool(false) => Cow::Borrowed("no"),
            TagValue::Number(value) => Cow::Owned(value.to_string()),
        }
    }

    pub fn is_no(&self) -> bool {
        self.as_osm_str() == "no"
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::String(value)
    }
}

impl From<TagValue> for serde_json::Value {
    fn from(value: TagValue) -> Self {
        match value {
            TagValue::Bool(value) => serde_json::Value::Bool(value),
            TagValue::Number(value) => serde_json::Value::Number(value),
            TagValue::String(value) => serde_json::Value::String(value),
        }
    }
}

fn coerce_value(value: &TagValue) -> TagValue {
    let TagValue::String(raw) = value else {
        return value.clone();
    };
    match raw.as_str() {
        "yes" => return TagValue::Bool(true),
        "no" => return TagValue::Bool(false),
        _ => (),
    }
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return TagValue::Number(int.into());
    }
    trimmed.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(TagValue::Number)
        .unwrap_or_else(|| value.clone())
}

/// Turns `yes`/`no` into booleans and numeric strings into numbers. Values
/// that only start with a number ("3 lanes") stay strings.
pub fn coerce_tags(tags: &Tags) -> Tags {
    tags.iter()
        .map(|(key, value)| (key.clone(), coerce_value(value)))
        .collect()
}

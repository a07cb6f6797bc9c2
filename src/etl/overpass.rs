use std::io::Read;
use std::sync::OnceLock;

use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::osm::Element;
use crate::errors::{Error, Result};

/// Body of an Overpass API `[out:json]` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassResponse {
    pub version: Option<f64>,
    pub generator: Option<String>,
    pub osm3s: Option<Osm3s>,
    #[serde(default)]
    pub elements: Vec<Element>,
    pub remark: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Osm3s {
    pub timestamp_osm_base: Option<String>,
    pub timestamp_areas_base: Option<String>,
    pub copyright: Option<String>,
}

/// Overpass reports query failures such as timeouts as a remark on an
/// otherwise successful response.
fn remark_error(remark: &str) -> Error {
    let message = runtime_error_pattern().captures(remark)
        .and_then(|captures| captures.name("message"))
        .map(|message| message.as_str().trim())
        .unwrap_or_else(|| remark.trim());
    format!("Overpass error: {}", message).into()
}

fn runtime_error_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"runtime error: (?<message>.*)").expect("remark pattern is valid"))
}

impl OverpassResponse {
    pub fn into_elements(self) -> Result<Vec<Element>> {
        if let Some(remark) = &self.remark {
            return Err(remark_error(remark));
        }
        Ok(self.elements)
    }
}

pub fn read_overpass_json(reader: impl Read) -> Result<Vec<Element>> {
    let response: OverpassResponse = serde_json::from_reader(reader)?;
    if let Some(osm3s) = &response.osm3s {
        if let Some(timestamp) = &osm3s.timestamp_osm_base {
            info!(timestamp_osm_base = timestamp.as_str(); "Read Overpass response");
        }
    }
    response.into_elements()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::osm::ElementType;

    #[test]
    fn reads_elements() {
        let body = r#"{
            "version": 0.6,
            "generator": "Overpass API",
            "osm3s": {"timestamp_osm_base": "2024-01-01T00:00:00Z", "copyright": "ODbL"},
            "elements": [
                {"type": "node", "id": 1, "lat": 51.5, "lon": -0.1, "tags": {"amenity": "cafe"}},
                {"type": "way", "id": 2, "nodes": [1, 3]},
                {"type": "relation", "id": 3, "members": [{"type": "way", "ref": 2, "role": "outer"}]}
            ]
        }"#;

        let elements = read_overpass_json(body.as_bytes()).unwrap();

        let types: Vec<_> = elements.iter().map(|e| (e.element_type(), e.id())).collect();
        assert_eq!(types, vec![(ElementType::Node, 1), (ElementType::Way, 2), (ElementType::Relation, 3)]);
    }

    #[test]
    fn remark_becomes_error() {
        let body = r#"{
            "elements": [],
            "remark": "runtime error: Query timed out in \"query\" at line 3 after 26 seconds."
        }"#;

        let err = read_overpass_json(body.as_bytes()).unwrap_err();
        assert_eq!(err.message, "Overpass error: Query timed out in \"query\" at line 3 after 26 seconds.");
    }

    #[test]
    fn unstructured_remark_is_reported_whole() {
        let body = r#"{"elements": [], "remark": "something odd"}"#;
        let err = read_overpass_json(body.as_bytes()).unwrap_err();
        assert_eq!(err.message, "Overpass error: something odd");
    }

    #[test]
    fn runtime_error_is_found_inside_longer_remarks() {
        let first = remark_error("An error occurred: runtime error: open64: 0 Success");
        let second = remark_error("runtime error: Query run out of memory");
        assert_eq!(first.message, "Overpass error: open64: 0 Success");
        assert_eq!(second.message, "Overpass error: Query run out of memory");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(read_overpass_json("{\"elements\": [".as_bytes()).is_err());
    }
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::tags::{coerce_tags, Tags};

pub type OsmId = u64;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Node => "node",
            ElementType::Way => "way",
            ElementType::Relation => "relation",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editing metadata. Overpass sends some of these as numbers, they are kept as
/// strings here.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct Meta {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub changeset: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Meta {
    /// Present fields only, in a fixed order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("timestamp", &self.timestamp),
            ("version", &self.version),
            ("changeset", &self.changeset),
            ("user", &self.user),
            ("uid", &self.uid),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key, value)))
    }

    /// Numeric version, with absent or unparsable versions counting as 0.
    pub fn version_number(&self) -> i64 {
        self.version.as_deref()
            .and_then(|version| version.trim().parse().ok())
            .unwrap_or(0)
    }

    fn merge(&mut self, incoming: Meta) {
        fn take(existing: &mut Option<String>, incoming: Option<String>) {
            if incoming.is_some() {
                *existing = incoming;
            }
        }
        take(&mut self.timestamp, incoming.timestamp);
        take(&mut self.version, incoming.version);
        take(&mut self.changeset, incoming.changeset);
        take(&mut self.user, incoming.user);
        take(&mut self.uid, incoming.uid);
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::String(value) => value,
        Raw::Number(value) => value.to_string(),
    }))
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmId,
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default)]
    pub nodes: Vec<OsmId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<LatLon>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Member {
    #[serde(rename = "type")]
    pub member_type: ElementType,
    #[serde(rename = "ref")]
    pub reference: OsmId,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<LatLon>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<LatLon>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        match self {
            Element::Node(_) => ElementType::Node,
            Element::Way(_) => ElementType::Way,
            Element::Relation(_) => ElementType::Relation,
        }
    }

    pub fn id(&self) -> OsmId {
        match self {
            Element::Node(node) => node.id,
            Element::Way(way) => way.id,
            Element::Relation(relation) => relation.id,
        }
    }

    pub fn coerce_tags(&mut self) {
        let tags = match self {
            Element::Node(node) => &mut node.tags,
            Element::Way(way) => &mut way.tags,
            Element::Relation(relation) => &mut relation.tags,
        };
        *tags = coerce_tags(tags);
    }
}

/// Common view over the three element variants, used when collapsing repeated
/// observations of one element.
pub trait OsmObject {
    fn id(&self) -> OsmId;
    fn meta(&self) -> &Meta;

    /// Field-wise merge: fields present on `incoming` overwrite, tags are
    /// merged key by key with `incoming` winning.
    fn absorb(&mut self, incoming: Self);
}

impl OsmObject for Node {
    fn id(&self) -> OsmId {
        self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn absorb(&mut self, incoming: Self) {
        self.meta.merge(incoming.meta);
        self.tags.extend(incoming.tags);
        self.lat = incoming.lat;
        self.lon = incoming.lon;
    }
}

impl OsmObject for Way {
    fn id(&self) -> OsmId {
        self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn absorb(&mut self, incoming: Self) {
        self.meta.merge(incoming.meta);
        self.tags.extend(incoming.tags);
        if !incoming.nodes.is_empty() {
            self.nodes = incoming.nodes;
        }
        self.geometry = incoming.geometry.or(self.geometry.take());
        self.center = incoming.center.or(self.center);
        self.bounds = incoming.bounds.or(self.bounds);
    }
}

impl OsmObject for Relation {
    fn id(&self) -> OsmId {
        self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn absorb(&mut self, incoming: Self) {
        self.meta.merge(incoming.meta);
        self.tags.extend(incoming.tags);
        if !incoming.members.is_empty() {
            self.members = incoming.members;
        }
        self.geometry = incoming.geometry.or(self.geometry.take());
        self.center = incoming.center.or(self.center);
        self.bounds = incoming.bounds.or(self.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tags::TagValue;

    #[test]
    fn parses_overpass_way_with_numeric_meta() {
        let element: Element = serde_json::from_str(r#"{
            "type": "way",
            "id": 42,
            "version": 3,
            "changeset": 123456,
            "user": "mapper",
            "nodes": [1, 2, 3],
            "tags": {"highway": "residential"}
        }"#).unwrap();

        let Element::Way(way) = element else {
            panic!("expected a way");
        };
        assert_eq!(way.id, 42);
        assert_eq!(way.meta.version.as_deref(), Some("3"));
        assert_eq!(way.meta.changeset.as_deref(), Some("123456"));
        assert_eq!(way.meta.timestamp, None);
        assert_eq!(way.nodes, vec![1, 2, 3]);
        assert_eq!(way.tags["highway"], TagValue::from("residential"));
    }

    #[test]
    fn parses_relation_members() {
        let element: Element = serde_json::from_str(r#"{
            "type": "relation",
            "id": 5,
            "members": [
                {"type": "node", "ref": 10, "role": "entrance"},
                {"type": "way", "ref": 11, "role": ""}
            ]
        }"#).unwrap();

        let Element::Relation(relation) = element else {
            panic!("expected a relation");
        };
        assert!(relation.tags.is_empty());
        assert_eq!(relation.members.len(), 2);
        assert_eq!(relation.members[0].member_type, ElementType::Node);
        assert_eq!(relation.members[0].reference, 10);
        assert_eq!(relation.members[0].role, "entrance");
    }

    #[test]
    fn rejects_unknown_element_type() {
        let parsed = serde_json::from_str::<Element>(r#"{"type": "area", "id": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn meta_entries_skip_absent_fields() {
        let meta = Meta {
            version: Some("2".into()),
            user: Some("someone".into()),
            ..Meta::default()
        };
        let entries: Vec<_> = meta.entries().collect();
        assert_eq!(entries, vec![("version", "2"), ("user", "someone")]);
    }

    #[test]
    fn version_number_defaults_to_zero() {
        assert_eq!(Meta::default().version_number(), 0);
        let meta = Meta { version: Some("abc".into()), ..Meta::default() };
        assert_eq!(meta.version_number(), 0);
        let meta = Meta { version: Some("17".into()), ..Meta::default() };
        assert_eq!(meta.version_number(), 17);
    }
}

use std::collections::HashSet;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Position, Value};
use log::debug;
use serde_json::json;

use crate::data::{
    osm::{Element, ElementType, Meta, Node, OsmId, Way},
    tags::Tags,
    ElementMap, OsmMapData,
};

use super::{
    dedup::partition,
    membership::{MembershipRecord, RelationIndex},
    polygon::is_polygon,
    rewind::rewind_collection,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssembleOptions {
    /// Winding direction for outer rings.
    pub outer_clockwise: bool,
    /// Keep relation memberships as an `@relations` property.
    pub keep_relations: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        AssembleOptions {
            outer_clockwise: true,
            keep_relations: false,
        }
    }
}

/// A feature before its properties are flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftFeature {
    pub element_type: ElementType,
    pub id: OsmId,
    pub tags: Tags,
    pub relations: Vec<MembershipRecord>,
    pub meta: Meta,
    pub geometry: Value,
}

impl DraftFeature {
    fn new(element_type: ElementType, id: OsmId, tags: &Tags, meta: &Meta, index: &RelationIndex, geometry: Value) -> Self {
        DraftFeature {
            element_type,
            id,
            tags: tags.clone(),
            relations: index.get(element_type, id).to_vec(),
            meta: meta.clone(),
            geometry,
        }
    }

    pub fn feature_id(&self) -> String {
        format!("{}/{}", self.element_type, self.id)
    }

    /// Meta, then tags, then `id`, so a tag named `id` never shadows the
    /// feature id.
    fn into_feature(self, keep_relations: bool) -> Feature {
        let feature_id = self.feature_id();
        let mut properties = JsonObject::new();
        for (key, value) in self.meta.entries() {
            properties.insert(key.to_string(), json!(value));
        }
        for (key, value) in self.tags {
            properties.insert(key, value.into());
        }
        if keep_relations {
            properties.insert("@relations".to_string(), json!(self.relations));
        }
        properties.insert("id".to_string(), json!(feature_id));

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(self.geometry)),
            id: Some(Id::String(feature_id)),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Nodes never referenced by any way.
fn points_of_interest<'a>(nodes: &'a ElementMap<Node>, ways: &ElementMap<Way>) -> impl Iterator<Item = &'a Node> {
    let way_nodes: HashSet<OsmId> = ways.iter()
        .flat_map(|way| way.nodes.iter().copied())
        .collect();
    nodes.iter().filter(move |node| !way_nodes.contains(&node.id))
}

fn way_coordinates(way: &Way, nodes: &ElementMap<Node>) -> Vec<Position> {
    match &way.geometry {
        Some(geometry) if !geometry.is_empty() => geometry.iter()
            .map(|point| vec![point.lon, point.lat])
            .collect(),
        _ => way.nodes.iter()
            .filter_map(|id| nodes.get(*id))
            .map(|node| vec![node.lon, node.lat])
            .collect(),
    }
}

fn way_geometry(way: &Way, nodes: &ElementMap<Node>) -> Option<Value> {
    let coords = way_coordinates(way, nodes);
    if coords.len() < 2 {
        debug!(way = way.id, coordinates = coords.len(); "Dropping way without enough resolvable coordinates");
        return None;
    }
    let is_closed = coords.first() == coords.last();
    if is_closed && is_polygon(&way.tags) {
        Some(Value::Polygon(vec![coords]))
    } else {
        Some(Value::LineString(coords))
    }
}

/// Point features for standalone nodes, then one line or polygon per way.
pub fn draft_features(data: &OsmMapData, index: &RelationIndex) -> Vec<DraftFeature> {
    let mut features: Vec<DraftFeature> = points_of_interest(&data.nodes, &data.ways)
        .map(|node| DraftFeature::new(
            ElementType::Node,
            node.id,
            &node.tags,
            &node.meta,
            index,
            Value::Point(vec![node.lon, node.lat]),
        ))
        .collect();

    for way in data.ways.iter() {
        if let Some(geometry) = way_geometry(way, &data.nodes) {
            features.push(DraftFeature::new(ElementType::Way, way.id, &way.tags, &way.meta, index, geometry));
        }
    }
    features
}

pub fn assemble(elements: impl IntoIterator<Item = Element>) -> FeatureCollection {
    assemble_with(elements, &AssembleOptions::default())
}

pub fn assemble_with(elements: impl IntoIterator<Item = Element>, options: &AssembleOptions) -> FeatureCollection {
    let data = partition(elements);
    debug!(
        nodes = data.nodes.len(),
        ways = data.ways.len(),
        relations = data.relations.len();
        "Deduplicated elements"
    );
    let index = RelationIndex::build(&data.relations);

    let features = draft_features(&data, &index)
        .into_iter()
        .map(|draft| draft.into_feature(options.keep_relations))
        .collect();

    let mut collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    rewind_collection(&mut collection, options.outer_clockwise);

    debug!(features = collection.features.len(); "Assembled feature collection");
    collection
}

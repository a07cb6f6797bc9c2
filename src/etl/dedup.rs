use log::trace;

use crate::data::{
    osm::{Element, OsmObject},
    ElementMap, OsmMapData,
};

/// Folds `incoming` into `existing`, both observations of the same element.
///
/// When either side carries a version and the versions differ, the higher
/// version replaces the other wholesale, with ties going to `incoming`.
/// Otherwise the two are merged field by field.
pub fn merge_into<T: OsmObject>(existing: &mut T, incoming: T) {
    let (old, new) = (existing.meta(), incoming.meta());
    if (old.version.is_some() || new.version.is_some()) && old.version != new.version {
        if old.version_number() <= new.version_number() {
            *existing = incoming;
        }
        return;
    }
    existing.absorb(incoming);
}

pub fn merge<T: OsmObject>(existing: T, incoming: T) -> T {
    let mut merged = existing;
    merge_into(&mut merged, incoming);
    merged
}

pub fn dedup<T: OsmObject>(elements: impl IntoIterator<Item = T>) -> ElementMap<T> {
    let mut map = ElementMap::default();
    for element in elements {
        match map.get_mut(element.id()) {
            Some(existing) => {
                trace!(id = element.id(); "Merging repeated element");
                merge_into(existing, element);
            }
            None => map.push(element),
        }
    }
    map
}

/// Splits a mixed element list by variant and deduplicates each variant.
pub fn partition(elements: impl IntoIterator<Item = Element>) -> OsmMapData {
    let mut nodes = Vec::new();
    let mut ways = Vec::new();
    let mut relations = Vec::new();
    for element in elements {
        match element {
            Element::Node(node) => nodes.push(node),
            Element::Way(way) => ways.push(way),
            Element::Relation(relation) => relations.push(relation),
        }
    }
    OsmMapData {
        nodes: dedup(nodes),
        ways: dedup(ways),
        relations: dedup(relations),
    }
}

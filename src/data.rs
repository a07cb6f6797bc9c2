use std::collections::HashMap;

use self::osm::{Node, OsmId, OsmObject, Relation, Way};

pub mod osm;
pub mod tags;

/// Elements of one variant keyed by id, iterating in first-seen order.
#[derive(Debug, Clone)]
pub struct ElementMap<T> {
    elements: Vec<T>,
    index: HashMap<OsmId, usize>,
}

impl<T> Default for ElementMap<T> {
    fn default() -> Self {
        ElementMap {
            elements: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: OsmObject> ElementMap<T> {
    pub fn get(&self, id: OsmId) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.elements[pos])
    }

    pub(crate) fn get_mut(&mut self, id: OsmId) -> Option<&mut T> {
        self.index.get(&id).map(|&pos| &mut self.elements[pos])
    }

    /// Appends an element not seen before. Callers check [`ElementMap::get_mut`]
    /// first.
    pub(crate) fn push(&mut self, element: T) {
        self.index.insert(element.id(), self.elements.len());
        self.elements.push(element);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Map data after deduplication, one canonical element per (type, id).
#[derive(Debug, Default, Clone)]
pub struct OsmMapData {
    pub nodes: ElementMap<Node>,
    pub ways: ElementMap<Way>,
    pub relations: ElementMap<Relation>,
}

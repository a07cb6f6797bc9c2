use std::collections::HashMap;

use serde::Serialize;

use crate::data::{
    osm::{ElementType, OsmId, Relation},
    tags::Tags,
    ElementMap,
};

/// One relation referencing one member.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MembershipRecord {
    pub role: String,
    pub rel: OsmId,
    pub reltags: Tags,
}

/// Lookup from (member type, member id) to the relations referencing it.
/// Members that are not part of the batch still get entries.
#[derive(Debug, Default)]
pub struct RelationIndex {
    nodes: HashMap<OsmId, Vec<MembershipRecord>>,
    ways: HashMap<OsmId, Vec<MembershipRecord>>,
    relations: HashMap<OsmId, Vec<MembershipRecord>>,
}

impl RelationIndex {
    pub fn build(relations: &ElementMap<Relation>) -> Self {
        let mut index = RelationIndex::default();
        for relation in relations.iter() {
            for member in &relation.members {
                index.by_type_mut(member.member_type)
                    .entry(member.reference)
                    .or_default()
                    .push(MembershipRecord {
                        role: member.role.clone(),
                        rel: relation.id,
                        reltags: relation.tags.clone(),
                    });
            }
        }
        index
    }

    fn by_type_mut(&mut self, element_type: ElementType) -> &mut HashMap<OsmId, Vec<MembershipRecord>> {
        match element_type {
            ElementType::Node => &mut self.nodes,
            ElementType::Way => &mut self.ways,
            ElementType::Relation => &mut self.relations,
        }
    }

    /// Memberships in relation declaration order, empty when there are none.
    pub fn get(&self, element_type: ElementType, id: OsmId) -> &[MembershipRecord] {
        let by_type = match element_type {
            ElementType::Node => &self.nodes,
            ElementType::Way => &self.ways,
            ElementType::Relation => &self.relations,
        };
        by_type.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

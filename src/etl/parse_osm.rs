use std::collections::HashMap;
use std::io::BufRead;
use std::str;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::osm::{Element, ElementType, Member, Meta, Node, Relation, Way};
use crate::data::tags::{TagValue, Tags};
use crate::errors::{Error, Result};

enum ParserState {
    Top,
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl ParserState {
    fn tags_mut(&mut self) -> Option<&mut Tags> {
        match self {
            ParserState::Top => None,
            ParserState::Node(node) => Some(&mut node.tags),
            ParserState::Way(way) => Some(&mut way.tags),
            ParserState::Relation(relation) => Some(&mut relation.tags),
        }
    }

    fn finish(self) -> Option<Element> {
        match self {
            ParserState::Top => None,
            ParserState::Node(node) => Some(Element::Node(node)),
            ParserState::Way(way) => Some(Element::Way(way)),
            ParserState::Relation(relation) => Some(Element::Relation(relation)),
        }
    }
}

type Attributes = HashMap<String, String>;

fn attributes(el: &BytesStart) -> Result<Attributes> {
    let mut attrs = HashMap::new();
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn required<'a>(attrs: &'a Attributes, element: &str, key: &str) -> Result<&'a str> {
    attrs.get(key)
        .map(String::as_str)
        .ok_or_else(|| Error::from(format!("<{}> is missing the '{}' attribute", element, key)))
}

fn parse_meta(attrs: &mut Attributes) -> Meta {
    Meta {
        timestamp: attrs.remove("timestamp"),
        version: attrs.remove("version"),
        changeset: attrs.remove("changeset"),
        user: attrs.remove("user"),
        uid: attrs.remove("uid"),
    }
}

fn parse_node(el: &BytesStart) -> Result<Node> {
    let mut attrs = attributes(el)?;
    Ok(Node {
        id: required(&attrs, "node", "id")?.parse()?,
        lat: required(&attrs, "node", "lat")?.parse()?,
        lon: required(&attrs, "node", "lon")?.parse()?,
        meta: parse_meta(&mut attrs),
        tags: Tags::new(),
    })
}

fn parse_way(el: &BytesStart) -> Result<Way> {
    let mut attrs = attributes(el)?;
    Ok(Way {
        id: required(&attrs, "way", "id")?.parse()?,
        meta: parse_meta(&mut attrs),
        tags: Tags::new(),
        nodes: Vec::new(),
        geometry: None,
        center: None,
        bounds: None,
    })
}

fn parse_relation(el: &BytesStart) -> Result<Relation> {
    let mut attrs = attributes(el)?;
    Ok(Relation {
        id: required(&attrs, "relation", "id")?.parse()?,
        meta: parse_meta(&mut attrs),
        tags: Tags::new(),
        members: Vec::new(),
        geometry: None,
        center: None,
        bounds: None,
    })
}

fn parse_member(el: &BytesStart) -> Result<Member> {
    let attrs = attributes(el)?;
    let member_type = match required(&attrs, "member", "type")? {
        "node" => ElementType::Node,
        "way" => ElementType::Way,
        "relation" => ElementType::Relation,
        other => return Err(format!("Unknown member type '{}'", other).into()),
    };
    Ok(Member {
        member_type,
        reference: required(&attrs, "member", "ref")?.parse()?,
        role: attrs.get("role").cloned().unwrap_or_default(),
        lat: None,
        lon: None,
        geometry: None,
    })
}

/// Handles a tag that may open an element (`Start`) or be self-closing
/// (`Empty`). Returns the element when it is complete.
fn handle_tag(state: &mut ParserState, el: &BytesStart, is_empty: bool) -> Result<Option<Element>> {
    let opened = match el.name().as_ref() {
        b"node" => Some(ParserState::Node(parse_node(el)?)),
        b"way" => Some(ParserState::Way(parse_way(el)?)),
        b"relation" => Some(ParserState::Relation(parse_relation(el)?)),
        b"tag" => {
            let attrs = attributes(el)?;
            let key = required(&attrs, "tag", "k")?.to_string();
            let value = required(&attrs, "tag", "v")?;
            match state.tags_mut() {
                Some(tags) => {
                    tags.insert(key, TagValue::from(value));
                }
                None => warn!(key = key.as_str(); "Ignoring tag outside of an element"),
            }
            None
        }
        b"nd" => {
            if let ParserState::Way(way) = state {
                let attrs = attributes(el)?;
                way.nodes.push(required(&attrs, "nd", "ref")?.parse()?);
            }
            None
        }
        b"member" => {
            if let ParserState::Relation(relation) = state {
                relation.members.push(parse_member(el)?);
            }
            None
        }
        _ => None,
    };

    match opened {
        Some(opened) if is_empty => Ok(opened.finish()),
        Some(opened) => {
            *state = opened;
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Reads every node, way and relation from an OSM XML document.
pub fn read_osm_xml(input: impl BufRead) -> Result<Vec<Element>> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut elements: Vec<Element> = Vec::new();
    let mut state = ParserState::Top;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                if let Some(element) = handle_tag(&mut state, &e, false)? {
                    elements.push(element);
                }
            }
            Event::Empty(e) => {
                if let Some(element) = handle_tag(&mut state, &e, true)? {
                    elements.push(element);
                }
            }
            Event::End(e) => {
                if matches!(e.name().as_ref(), b"node" | b"way" | b"relation") {
                    if let Some(element) = std::mem::replace(&mut state, ParserState::Top).finish() {
                        elements.push(element);
                    }
                }
            }
            // Declarations, comments and <note>/<meta> text carry nothing we need.
            _ => (),
        }
        // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
        buf.clear();
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="Overpass API">
  <note>The data included in this document is from www.openstreetmap.org.</note>
  <meta osm_base="2024-01-01T00:00:00Z"/>
  <bounds minlat="0" minlon="0" maxlat="1" maxlon="1"/>
  <node id="10" lat="0.0" lon="0.0" version="2" user="mapper" uid="7"/>
  <node id="11" lat="1.0" lon="0.0">
    <tag k="name" v="Fish &amp; Chips"/>
  </node>
  <way id="1" version="3">
    <nd ref="10"/>
    <nd ref="11"/>
    <tag k="highway" v="path"/>
  </way>
  <relation id="5">
    <member type="node" ref="10" role="entrance"/>
    <member type="way" ref="1" role=""/>
    <tag k="type" v="site"/>
  </relation>
</osm>"#;

    #[test]
    fn reads_all_element_kinds() {
        let elements = read_osm_xml(SAMPLE.as_bytes()).unwrap();
        assert_eq!(elements.len(), 4);

        let Element::Node(node) = &elements[0] else { panic!("expected node") };
        assert_eq!(node.id, 10);
        assert_eq!(node.meta.version.as_deref(), Some("2"));
        assert_eq!(node.meta.uid.as_deref(), Some("7"));
        assert!(node.tags.is_empty());

        let Element::Node(node) = &elements[1] else { panic!("expected node") };
        assert_eq!(node.lat, 1.0);
        assert_eq!(node.tags["name"], TagValue::from("Fish & Chips"));

        let Element::Way(way) = &elements[2] else { panic!("expected way") };
        assert_eq!(way.nodes, vec![10, 11]);
        assert_eq!(way.tags["highway"], TagValue::from("path"));
        assert_eq!(way.meta.version.as_deref(), Some("3"));

        let Element::Relation(relation) = &elements[3] else { panic!("expected relation") };
        assert_eq!(relation.members.len(), 2);
        assert_eq!(relation.members[0].role, "entrance");
        assert_eq!(relation.members[1].member_type, ElementType::Way);
        assert_eq!(relation.tags["type"], TagValue::from("site"));
    }

    #[test]
    fn node_without_coordinates_is_an_error() {
        let err = read_osm_xml(r#"<osm><node id="1" lat="0"/></osm>"#.as_bytes()).unwrap_err();
        assert!(err.message.contains("lon"));
    }

    #[test]
    fn unparsable_id_is_an_error() {
        assert!(read_osm_xml(r#"<osm><way id="abc"/></osm>"#.as_bytes()).is_err());
    }
}

//! Converts OpenStreetMap elements (nodes, ways and relations, as returned by
//! Overpass or read from an OSM XML extract) into a GeoJSON FeatureCollection.

pub mod config;
pub mod data;
pub mod errors;
pub mod etl;

pub use etl::assemble::{assemble, assemble_with, AssembleOptions};
pub use etl::rewind::rewind;

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use serde::Deserialize;
use xz::bufread::XzDecoder;

use crate::data::osm::Element;
use crate::errors::Result;

use super::{overpass::read_overpass_json, parse_osm::read_osm_xml};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    OverpassJson,
    OsmXml,
}

fn is_xz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "xz")
}

impl InputFormat {
    /// Guesses the format from the file name, looking through a trailing `.xz`.
    pub fn detect(path: &Path) -> Result<Self> {
        let inner = if is_xz(path) {
            Path::new(path.file_stem().ok_or("Could not get input file name")?)
        } else {
            path
        };
        match inner.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(InputFormat::OverpassJson),
            Some("osm") | Some("xml") => Ok(InputFormat::OsmXml),
            _ => Err(format!("Cannot tell the input format of {}, set input_format", path.display()).into()),
        }
    }
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = fs::File::open(path)?;
    let file_reader = BufReader::new(file);
    if is_xz(path) {
        let xz_reader = XzDecoder::new(file_reader);
        Ok(Box::new(BufReader::new(xz_reader)))
    } else {
        Ok(Box::new(file_reader))
    }
}

/// Reads all elements from `path`, decompressing `.xz` files on the way.
pub fn read_elements(path: &Path, format: Option<InputFormat>) -> Result<Vec<Element>> {
    let format = match format {
        Some(format) => format,
        None => InputFormat::detect(path)?,
    };
    let reader = open_input(path)?;
    let elements = match format {
        InputFormat::OverpassJson => read_overpass_json(reader)?,
        InputFormat::OsmXml => read_osm_xml(reader)?,
    };
    info!(path = &*path.to_string_lossy(), elements = elements.len(); "Read input elements");
    Ok(elements)
}

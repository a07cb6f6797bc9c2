use std::{fs::{self, File}, io::{BufWriter, Write}, path::{Path, PathBuf}};

use geojson::FeatureCollection;
use log::info;

use crate::{config::UserConfig, data::osm::Element, errors::Result};

use super::{assemble::assemble_with, input::read_elements, Etl};

pub const ETL_NAME: &str = "osm_to_geojson";

/// Reads OSM elements from `data_path` and writes them as a GeoJSON
/// FeatureCollection into the output directory.
pub struct OsmToGeoJsonEtl<'a> {
    config: &'a UserConfig,
}

impl<'a> OsmToGeoJsonEtl<'a> {
    pub fn new(config: &'a UserConfig) -> Self {
        OsmToGeoJsonEtl { config }
    }

    fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.config.output_file_name)
    }
}

impl Etl for OsmToGeoJsonEtl<'_> {
    type Input = Vec<Element>;
    type Output = FeatureCollection;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(self.output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        if self.is_cached(dir)? {
            fs::remove_file(self.output_path(dir))?;
        }
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        read_elements(Path::new(&self.config.data_path), self.config.input_format)
    }

    fn transform(&mut self, mut input: Self::Input) -> Result<Self::Output> {
        if self.config.parse_tags {
            input.iter_mut().for_each(Element::coerce_tags);
        }
        Ok(assemble_with(input, &self.config.assemble_options()))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let path = self.output_path(dir);
        let mut writer = BufWriter::new(File::create(&path)?);
        if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, &output)?;
        } else {
            serde_json::to_writer(&mut writer, &output)?;
        }
        writer.flush()?;
        info!(path = &*path.to_string_lossy(), features = output.features.len(); "Wrote feature collection");
        Ok(())
    }
}

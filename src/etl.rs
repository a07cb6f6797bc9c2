pub mod assemble;
pub mod dedup;
pub mod input;
pub mod membership;
pub mod osm_to_geojson;
pub mod overpass;
pub mod parse_osm;
pub mod polygon;
pub mod rewind;

use std::path::Path;
use log::{info, error};

use crate::errors::Result;

/// A conversion step reading its input and writing its output below one
/// directory.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;

    fn is_cached(&self, dir: &Path) -> Result<bool>;
    fn clean(&self, dir: &Path) -> Result<()>;

    fn extract(&mut self, dir: &Path) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    /// Extract, transform and load, unless the output of a previous run is
    /// still in `dir`.
    fn process(&mut self, dir: &Path) -> Result<()> {
        let etl_name = self.etl_name().to_string();
        info!(etl_name = etl_name.as_str(); "Starting ETL process");
        if self.is_cached(dir)? {
            info!(etl_name = etl_name.as_str(); "Using cached value");
            return Ok(());
        }

        info!(etl_name = etl_name.as_str(); "Extracting");
        let input = log_failure(&etl_name, "extract", self.extract(dir))?;

        info!(etl_name = etl_name.as_str(); "Transforming");
        let output = log_failure(&etl_name, "transform", self.transform(input))?;

        info!(etl_name = etl_name.as_str(); "Loading");
        log_failure(&etl_name, "load", self.load(dir, output))?;

        info!(etl_name = etl_name.as_str(); "Process finished");
        Ok(())
    }
}

fn log_failure<T>(etl_name: &str, phase: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!(etl_name = etl_name, phase = phase, err = err.message.as_str(); "ETL phase failed with error");
    }
    result
}

use std::env;
use std::fs::create_dir_all;
use std::io;
use std::path::{Path, PathBuf};

use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm2geojson::config::{load_user_config, UserConfig, DEFAULT_CONFIG_PATH};
use osm2geojson::errors::Result;
use osm2geojson::etl::osm_to_geojson::OsmToGeoJsonEtl;
use osm2geojson::etl::Etl;

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let output_dir = PathBuf::from(&config.dest_path);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging() {
    let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    Builder::with_level(&level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(Path::new(&config_path))?;
    let output_dir = create_output_dir(&user_config)?;

    let mut etl = OsmToGeoJsonEtl::new(&user_config);
    if user_config.force {
        etl.clean(&output_dir)?;
    }
    etl.process(&output_dir)?;

    Ok(())
}

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;
use crate::etl::{assemble::AssembleOptions, input::InputFormat};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "features.geojson";

fn default_output_file_name() -> String {
    DEFAULT_OUTPUT_FILE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UserConfig {
    pub data_path: String,
    pub dest_path: String,
    /// Detected from the `data_path` extension when absent.
    #[serde(default)]
    pub input_format: Option<InputFormat>,
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
    /// Coerce `yes`/`no` and numeric tag values to JSON primitives.
    #[serde(default)]
    pub parse_tags: bool,
    #[serde(default = "default_true")]
    pub outer_clockwise: bool,
    #[serde(default)]
    pub keep_relations: bool,
    #[serde(default)]
    pub pretty: bool,
    /// Ignore a previous output and convert again.
    #[serde(default)]
    pub force: bool,
}

impl UserConfig {
    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            outer_clockwise: self.outer_clockwise,
            keep_relations: self.keep_relations,
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| format!("Could not open config file {}: {}", path.display(), err))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

use std::{fs, io::ErrorKind, path::{Path, PathBuf}};

use serde::Deserialize;
use snafu::{whatever, ResultExt, Whatever};

pub const DEFAULT_CONFIG_PATH: &str = "s3-manager.toml";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Config, Whatever> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => whatever!("Unable to read config file {}: {}", path.display(), err),
        };

        toml::from_str::<Config>(&contents)
            .with_whatever_context(|_| format!("Unable to parse config file {}", path.display()))
    }
}

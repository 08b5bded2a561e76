//! Meter configuration
//!
//! Re-exports the shared [`MeterConfig`] and adds persistence through confy
//! (`<config dir>/dps-meter/config.toml`) or an explicit TOML file.

mod error;

pub use dps_meter_types::{ContractPolicy, MeterConfig};
pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::names::CreatureNames;

const APP_NAME: &str = "dps-meter";
const CONFIG_NAME: &str = "config";

/// Extension trait for MeterConfig persistence
pub trait MeterConfigExt: Sized {
    /// Load from the platform config directory, creating defaults if absent.
    fn load() -> Result<Self, ConfigError>;
    /// Load from an explicit TOML file. Missing keys take their defaults.
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
    /// The configured creature name table, or an empty one.
    fn creature_names(&self) -> Result<CreatureNames, ConfigError>;
}

impl MeterConfigExt for MeterConfig {
    fn load() -> Result<Self, ConfigError> {
        let mut config: MeterConfig =
            confy::load(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)?;
        let path = Self::config_path()?;
        anchor_names_file(&mut config, &path);
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = parse_config(&text, path)?;
        anchor_names_file(&mut config, path);
        debug!(?config, path = ?path, "loaded configuration");
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Locate)
    }

    fn creature_names(&self) -> Result<CreatureNames, ConfigError> {
        match &self.names_file {
            Some(path) => Ok(CreatureNames::load(path)?),
            None => Ok(CreatureNames::new()),
        }
    }
}

fn parse_config(text: &str, path: &Path) -> Result<MeterConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Make a relative names file path relative to the config file's directory.
fn anchor_names_file(config: &mut MeterConfig, config_path: &Path) {
    let Some(dir) = config_path.parent() else {
        return;
    };
    if let Some(names) = config.names_file.as_mut()
        && names.is_relative()
    {
        *names = dir.join(&*names);
    }
}

//! Configuration loading and parsing for `release-assets.toml` files.
//!
//! Every value can also be given on the command line, which takes
//! precedence over the file.
use log::*;
use serde::Deserialize;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use crate::{
    Result,
    error::AssetError,
    forge::config::{DEFAULT_LISTING_FILE, MAX_ASSETS_PER_RELEASE},
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "release-assets.toml";

/// Root configuration structure for `release-assets.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct Config {
    /// Repository in `OWNER/REPO` form or as a repository URL.
    pub repo: Option<String>,
    /// Asset ceiling applied when placing new files (1..=1000).
    pub max_assets_per_release: usize,
    /// Asset name of the generated listing manifest.
    pub listing_file: String,
    /// Branch or commit new extra releases are tagged from.
    pub new_release_target: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: None,
            max_assets_per_release: MAX_ASSETS_PER_RELEASE,
            listing_file: DEFAULT_LISTING_FILE.into(),
            new_release_target: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] in
    /// the working directory when no path is given. Only an explicitly
    /// requested file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(AssetError::invalid_config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            debug!("no configuration file found: using defaults");
            return Ok(Self::default());
        }

        info!("loading configuration from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_max_assets(self.max_assets_per_release)?;

        validate_listing_file(&self.listing_file)?;

        Ok(())
    }
}

/// Listing name doubles as the asset name on the release, so it has to be
/// a bare file name.
pub fn validate_listing_file(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AssetError::invalid_config(
            "listing_file must not be empty",
        ));
    }

    let is_bare = !name.contains(['/', '\\'])
        && Path::new(name).file_name() == Some(OsStr::new(name));

    if !is_bare {
        return Err(AssetError::invalid_config(format!(
            "listing_file must be a plain file name, got '{name}'"
        )));
    }

    Ok(())
}

/// Ceiling must leave room for at least one asset and cannot exceed what
/// the hosting service accepts.
pub fn validate_max_assets(max: usize) -> Result<()> {
    if max == 0 || max > MAX_ASSETS_PER_RELEASE {
        return Err(AssetError::invalid_config(format!(
            "max assets per release must be between 1 and {MAX_ASSETS_PER_RELEASE}, got {max}"
        )));
    }
    Ok(())
}

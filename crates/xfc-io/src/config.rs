//! Configuration files.
//!
//! TOML, YAML and JSON are accepted and picked by file extension. Files with any
//! other extension are tried as TOML, then YAML, then JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use xfc_core::config::Configuration;

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Some(ConfigFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Some(ConfigFormat::Yaml)
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ConfigFormat::Json),
            _ => None,
        }
    }
}

pub fn load_configuration(path: &Path) -> Result<Configuration> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading configuration '{}'", path.display()))?;
    let config = match ConfigFormat::from_path(path) {
        Some(format) => parse_configuration(&data, format)
            .with_context(|| format!("parsing configuration '{}'", path.display()))?,
        None => toml::from_str::<Configuration>(&data)
            .map_err(anyhow::Error::from)
            .or_else(|_| serde_yaml::from_str(&data).map_err(anyhow::Error::from))
            .or_else(|_| serde_json::from_str(&data).map_err(anyhow::Error::from))
            .with_context(|| format!("parsing configuration '{}'", path.display()))?,
    };
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

pub fn parse_configuration(data: &str, format: ConfigFormat) -> Result<Configuration> {
    match format {
        ConfigFormat::Toml => toml::from_str(data).context("parsing configuration toml"),
        ConfigFormat::Yaml => serde_yaml::from_str(data).context("parsing configuration yaml"),
        ConfigFormat::Json => serde_json::from_str(data).context("parsing configuration json"),
    }
}

pub fn render_configuration(config: &Configuration, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).context("rendering configuration toml"),
        ConfigFormat::Yaml => serde_yaml::to_string(config).context("rendering configuration yaml"),
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).context("rendering configuration json")
        }
    }
}

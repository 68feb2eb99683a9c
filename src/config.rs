use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::app::PipelineOptions;
use crate::domain::ResourceKind;
use crate::endpoints::Endpoints;
use crate::error::SasbdbError;
use crate::pacing::DEFAULT_DELAY;

pub const DEFAULT_CONFIG_FILE: &str = "sasbdb-fetch.json";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub kinds: Option<Vec<ResourceKind>>,
    #[serde(default)]
    pub write_manifest: Option<bool>,
    #[serde(default)]
    pub delay_secs: Option<f64>,
    #[serde(default)]
    pub endpoints: Option<Endpoints>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: Utf8PathBuf,
    pub options: PipelineOptions,
    pub endpoints: Endpoints,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `sasbdb-fetch.json` from the current directory when it
    /// exists. Without any file the built-in defaults apply.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, SasbdbError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| SasbdbError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| SasbdbError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, SasbdbError> {
        let kinds = match config.kinds {
            Some(kinds) if kinds.is_empty() => {
                return Err(SasbdbError::ConfigParse(
                    "`kinds` must name at least one resource kind".to_string(),
                ));
            }
            Some(kinds) => ResourceKind::canonical(&kinds),
            None => ResourceKind::ALL.to_vec(),
        };
        let delay = match config.delay_secs {
            Some(secs) => delay_from_secs(secs)?,
            None => DEFAULT_DELAY,
        };

        Ok(ResolvedConfig {
            data_dir: Utf8PathBuf::from(
                config
                    .data_dir
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            options: PipelineOptions {
                kinds,
                write_manifest: config.write_manifest.unwrap_or(true),
                delay,
            },
            endpoints: config.endpoints.unwrap_or_default(),
        })
    }
}

pub fn delay_from_secs(secs: f64) -> Result<Duration, SasbdbError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|err| SasbdbError::ConfigParse(format!("invalid delay {secs}: {err}")))
}

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::model::BaseModel;
use crate::params::Params;
use crate::registry::Registry;

/// Model name plus constructor parameters, as stored in JSON configs.
///
/// ```json
/// { "model_type": "Ridge", "params": { "alpha": 0.5 } }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model_type: String,

    #[serde(default)]
    pub params: Params,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model type must not be empty")]
    EmptyModelType,
}

impl ModelConfig {
    pub fn new(model_type: &str, params: Params) -> Self {
        Self {
            model_type: model_type.to_string(),
            params,
        }
    }

    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Resolve and construct the configured model in the built-in registry.
    pub fn build(&self) -> Result<BaseModel> {
        BaseModel::new(&self.model_type, self.params.clone())
    }

    pub fn build_with(&self, registry: &Registry) -> Result<BaseModel> {
        BaseModel::with_registry(registry, &self.model_type, self.params.clone())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: "LinearRegression".to_string(),
            params: Params::new(),
        }
    }
}

/// Parses a bare model name into a config with no parameters.
impl FromStr for ModelConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyModelType);
        }
        Ok(ModelConfig::new(name, Params::new()))
    }
}

//! TOML-based application configuration.
//!
//! Stores:
//! - The default user id commands act on
//! - The text-generation provider chain (kind, endpoint, model, key)
//!
//! Scoring constants are part of the product definition and are not
//! configurable here. Configuration is stored at
//! `~/.config/worklens/config.toml`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::data_dir;
use crate::error::ConfigError;
use crate::generator::{GeneratorChain, Provider, DEFAULT_TIMEOUT_SECS};

/// One upstream text-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorProviderConfig {
    /// "chat" for OpenAI-style endpoints, "completion" for bare ones.
    pub kind: String,
    pub endpoint: String,
    /// Model name, required for chat providers.
    #[serde(default)]
    pub model: Option<String>,
    /// Name of the environment variable holding the API key, if any.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl GeneratorProviderConfig {
    /// Resolve this entry into a concrete provider.
    fn build(&self) -> Result<Provider, ConfigError> {
        Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "generator.providers.endpoint".to_string(),
            message: format!("'{}': {e}", self.endpoint),
        })?;

        match self.kind.as_str() {
            "chat" => {
                let model = self.model.clone().ok_or_else(|| ConfigError::InvalidValue {
                    key: "generator.providers.model".to_string(),
                    message: "chat providers need a model".to_string(),
                })?;
                let api_key = self
                    .api_key_env
                    .as_deref()
                    .and_then(|name| std::env::var(name).ok());
                Ok(Provider::chat(&self.endpoint, model, api_key))
            }
            "completion" => Ok(Provider::completion(&self.endpoint)),
            other => Err(ConfigError::InvalidValue {
                key: "generator.providers.kind".to_string(),
                message: format!("unknown provider kind '{other}' (expected chat or completion)"),
            }),
        }
    }
}

/// Text-generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Providers in fallback order. An empty list is valid; generation
    /// then always lands on the canned fallback reply.
    #[serde(default)]
    pub providers: Vec<GeneratorProviderConfig>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Assemble the provider chain described by this config.
    pub fn chain(&self) -> Result<GeneratorChain, ConfigError> {
        let mut providers = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            providers.push(provider.build()?);
        }
        Ok(GeneratorChain::new(providers)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/worklens/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// User id commands act on when --user is not given.
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

// Default functions
fn default_user() -> String {
    "local".to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: default_user(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Absolute path of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = locate(&json, key)?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. The new value is coerced to
    /// the type of the existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// coerced, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}

/// Walk a dot-separated key down a JSON tree.
fn locate<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Replace the value at a dot-separated key, keeping the existing type.
fn set_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::InvalidValue {
        key: key.to_string(),
        message: "unknown config key".to_string(),
    };

    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, parents)) = parts.split_last() else {
        return Err(unknown());
    };

    let mut current = root;
    for part in parents {
        current = current.get_mut(*part).ok_or_else(unknown)?;
    }
    let object = current.as_object_mut().ok_or_else(unknown)?;
    let existing = object.get(*leaf).ok_or_else(unknown)?;

    let coerced = coerce(existing, key, value)?;
    object.insert(leaf.to_string(), coerced);
    Ok(())
}

/// Coerce a raw string to the JSON type already stored at the key.
fn coerce(
    existing: &serde_json::Value,
    key: &str,
    raw: &str,
) -> Result<serde_json::Value, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    match existing {
        serde_json::Value::Bool(_) => raw
            .parse::<bool>()
            .map(serde_json::Value::Bool)
            .map_err(|_| invalid(format!("cannot parse '{raw}' as bool"))),
        serde_json::Value::Number(_) => {
            if let Ok(n) = raw.parse::<u64>() {
                Ok(serde_json::Value::Number(n.into()))
            } else if let Ok(n) = raw.parse::<f64>() {
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{raw}' as number")))
            } else {
                Err(invalid(format!("cannot parse '{raw}' as number")))
            }
        }
        serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
            serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))
        }
        _ => Ok(serde_json::Value::String(raw.to_string())),
    }
}

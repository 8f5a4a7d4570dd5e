//! Configuration management for FastCV

use crate::error::{FastCvError, Result};
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Checked when `api_key_env` is unset
const FALLBACK_API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub extract_temperature: f32,
    pub tailor_temperature: f32,
    pub cover_letter_temperature: f32,
    pub rewrite_temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    Pdf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fastcv");

        Self {
            ai: AiConfig {
                model: DEFAULT_MODEL.to_string(),
                base_url: GEMINI_API_BASE_URL.to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                api_key: None,
                timeout_secs: 120,
                max_retries: 3,
                extract_temperature: 0.2,
                tailor_temperature: 0.7,
                cover_letter_temperature: 0.7,
                rewrite_temperature: 0.6,
            },
            storage: StorageConfig { data_dir },
            output: OutputConfig {
                format: OutputFormat::Html,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `path` (or the default location), writing defaults on first run
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| FastCvError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(&config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FastCvError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("fastcv")
            .join("config.toml")
    }

    pub fn data_dir(&self) -> &Path {
        &self.storage.data_dir
    }

    /// API key from the config file, the configured variable, or `API_KEY`
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.ai.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }
        for var in [self.ai.api_key_env.as_str(), FALLBACK_API_KEY_ENV] {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    return Ok(key.trim().to_string());
                }
            }
        }
        Err(FastCvError::Configuration(format!(
            "No API key found. Set {} or ai.api_key in the config file",
            self.ai.api_key_env
        )))
    }

    /// Set a dotted key such as `ai.model`, keeping the existing value's type
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let updated = self.with_override(key, value)?;
        *self = updated;
        Ok(())
    }

    fn with_override(&self, key: &str, value: &str) -> anyhow::Result<Config> {
        let mut root = toml::Value::try_from(self).context("Failed to serialize config")?;
        let mut segments = key.split('.').peekable();
        let mut cursor = &mut root;

        while let Some(segment) = segments.next() {
            let table = cursor
                .as_table_mut()
                .ok_or_else(|| anyhow!("'{}' is not a section", key))?;
            if segments.peek().is_none() {
                let existing = table.get(segment);
                let parsed = parse_like(existing, value)
                    .with_context(|| format!("Invalid value for {}", key))?;
                table.insert(segment.to_string(), parsed);
                break;
            }
            cursor = table
                .get_mut(segment)
                .ok_or_else(|| anyhow!("Unknown config section '{}'", segment))?;
        }

        let config: Config = root
            .try_into()
            .with_context(|| format!("Value '{}' is not valid for {}", value, key))?;
        Ok(config)
    }
}

/// Parse `raw` as the same TOML type as `existing`
fn parse_like(existing: Option<&toml::Value>, raw: &str) -> anyhow::Result<toml::Value> {
    let value = match existing {
        Some(toml::Value::Integer(_)) => toml::Value::Integer(raw.trim().parse()?),
        Some(toml::Value::Float(_)) => toml::Value::Float(raw.trim().parse()?),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(raw.trim().parse()?),
        Some(toml::Value::String(_)) | None => toml::Value::String(raw.to_string()),
        Some(other) => bail!("cannot set a {} from the command line", other.type_str()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let loaded = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(loaded, Config::default());
        assert_eq!(loaded.ai.model, DEFAULT_MODEL);

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded, loaded);
    }

    #[test]
    fn test_set_value_keeps_types() {
        let mut config = Config::default();

        config.set_value("ai.model", "gemini-2.5-pro").unwrap();
        config.set_value("ai.max_retries", "5").unwrap();
        config.set_value("ai.tailor_temperature", "0.9").unwrap();
        config.set_value("output.color_output", "false").unwrap();
        config.set_value("output.format", "Markdown").unwrap();

        assert_eq!(config.ai.model, "gemini-2.5-pro");
        assert_eq!(config.ai.max_retries, 5);
        assert!((config.ai.tailor_temperature - 0.9).abs() < f32::EPSILON);
        assert!(!config.output.color_output);
        assert_eq!(config.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = Config::default();
        let before = config.clone();

        assert!(config.set_value("ai.max_retries", "many").is_err());
        assert!(config.set_value("output.format", "Docx").is_err());
        assert!(config.set_value("nope.key", "1").is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_api_key_from_config() {
        let mut config = Config::default();
        config.ai.api_key = Some(" secret ".into());
        assert_eq!(config.resolve_api_key().unwrap(), "secret");
    }
}

/// Router configuration and the optional model/provider selection

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Below this a full `process_query` refuses to plan.
pub const DEFAULT_PROCESS_THRESHOLD: f64 = 0.4;
/// At or below this `check_clarification` asks the user for more detail.
pub const DEFAULT_CLARIFICATION_THRESHOLD: f64 = 0.6;

pub const RESOURCES_PATH_ENV: &str = "LAS_ROUTER_RESOURCES_PATH";
pub const OUTPUT_PATH_ENV: &str = "LAS_ROUTER_OUTPUT_PATH";
const LEGACY_RESOURCES_PATH_ENV: &str = "MCP_RESOURCES_PATH";
const LEGACY_OUTPUT_PATH_ENV: &str = "MCP_OUTPUT_PATH";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    #[default]
    Static,
    StaticExtended,
    Discovered,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    pub resources_path: PathBuf,
    pub output_path: PathBuf,
    pub data_dir: String,
    pub scripts_dir: String,
    pub data_extension: String,
    pub script_extension: String,
    pub interpreter: String,
    pub clarification_threshold: f64,
    pub process_threshold: f64,
    pub suggestion_tools: usize,
    pub max_suggestions: usize,
    pub max_query_length: usize,
    pub script_timeout_secs: u64,
    pub discovery_timeout_secs: u64,
    pub catalog: CatalogKind,
    pub catalog_command: Option<CatalogCommand>,
    pub execute: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            resources_path: PathBuf::from("./mcp_resources"),
            output_path: PathBuf::from("./output"),
            data_dir: "las_files".to_string(),
            scripts_dir: "scripts".to_string(),
            data_extension: "las".to_string(),
            script_extension: "py".to_string(),
            interpreter: "python3".to_string(),
            clarification_threshold: DEFAULT_CLARIFICATION_THRESHOLD,
            process_threshold: DEFAULT_PROCESS_THRESHOLD,
            suggestion_tools: 3,
            max_suggestions: 5,
            max_query_length: 2000,
            script_timeout_secs: 300,
            discovery_timeout_secs: 3,
            catalog: CatalogKind::Static,
            catalog_command: None,
            execute: false,
        }
    }
}

impl RouterConfig {
    /// Reads a TOML file; fields it omits keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouterError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: RouterConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with resource/output paths taken from the environment when set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = env_path(RESOURCES_PATH_ENV, LEGACY_RESOURCES_PATH_ENV) {
            self.resources_path = path;
        }
        if let Some(path) = env_path(OUTPUT_PATH_ENV, LEGACY_OUTPUT_PATH_ENV) {
            self.output_path = path;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("clarification_threshold", self.clarification_threshold),
            ("process_threshold", self.process_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RouterError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.script_timeout_secs == 0 || self.discovery_timeout_secs == 0 {
            return Err(RouterError::InvalidConfig(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.max_suggestions == 0 {
            return Err(RouterError::InvalidConfig(
                "max_suggestions must be greater than zero".to_string(),
            ));
        }
        if self.catalog == CatalogKind::Command && self.catalog_command.is_none() {
            return Err(RouterError::InvalidConfig(
                "catalog = \"command\" requires a [catalog_command] table".to_string(),
            ));
        }
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        self.resources_path.join(&self.data_dir)
    }

    pub fn scripts_path(&self) -> PathBuf {
        self.resources_path.join(&self.scripts_dir)
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}

fn env_path(primary: &str, legacy: &str) -> Option<PathBuf> {
    std::env::var_os(primary)
        .or_else(|| std::env::var_os(legacy))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Model/provider selection supplied per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    #[serde(alias = "apiKey", alias = "credential")]
    pub api_key: Option<String>,
    pub temperature: f64,
    /// Classification service URL; no classifier is used without one.
    pub endpoint: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "keyword".to_string(),
            model: String::new(),
            api_key: None,
            temperature: 0.0,
            endpoint: None,
        }
    }
}

impl ModelConfig {
    /// Never fails: malformed input is logged and replaced by the default.
    pub fn parse_lenient(raw: &str) -> Self {
        match serde_json::from_str::<ModelConfig>(raw) {
            Ok(config) if (0.0..=2.0).contains(&config.temperature) => config,
            Ok(config) => {
                tracing::warn!(
                    temperature = config.temperature,
                    "Model temperature out of range, using default configuration"
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invalid model configuration, using defaults");
                Self::default()
            }
        }
    }

    pub fn wants_classifier(&self) -> bool {
        self.provider != "keyword" && self.endpoint.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = RouterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data_path(), PathBuf::from("./mcp_resources/las_files"));
        assert_eq!(config.script_timeout(), Duration::from_secs(300));
        assert_eq!(config.discovery_timeout(), Duration::from_secs(3));
        assert!(config.process_threshold < config.clarification_threshold);
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(
            &path,
            "resources_path = \"/data/wells\"\nclarification_threshold = 0.7\ncatalog = \"discovered\"\n",
        )
        .unwrap();

        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.resources_path, PathBuf::from("/data/wells"));
        assert_eq!(config.clarification_threshold, 0.7);
        assert_eq!(config.catalog, CatalogKind::Discovered);
        assert_eq!(config.process_threshold, DEFAULT_PROCESS_THRESHOLD);
    }

    #[test]
    fn test_load_rejects_out_of_range_threshold() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(&path, "process_threshold = 1.5\n").unwrap();
        assert!(matches!(
            RouterConfig::load(&path),
            Err(RouterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_command_catalog_requires_command() {
        let config = RouterConfig {
            catalog: CatalogKind::Command,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_config_lenient_parsing() {
        let parsed = ModelConfig::parse_lenient(
            r#"{"provider":"openai","model":"gpt-4","apiKey":"sk-test","temperature":0.3}"#,
        );
        assert_eq!(parsed.provider, "openai");
        assert_eq!(parsed.api_key.as_deref(), Some("sk-test"));
        assert!(!parsed.wants_classifier());

        assert_eq!(ModelConfig::parse_lenient("{not json"), ModelConfig::default());
        assert_eq!(
            ModelConfig::parse_lenient(r#"{"temperature": 9.0}"#),
            ModelConfig::default()
        );
    }
}

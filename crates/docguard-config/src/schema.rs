//! Configuration schema for the docguard pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use docguard_core::RiskThresholds;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// File content is not valid YAML for the schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An environment override carries an unusable value.
    #[error("environment variable {var} has invalid value `{value}`: {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },

    /// A setting violates the schema's constraints.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration for the fraud pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocguardConfig {
    /// LLM gateway settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Directory holding per-kind scaler and regressor artifacts.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// Per-kind enable flags.
    #[serde(default)]
    pub kinds: KindToggles,
    /// Decision-matrix threshold overrides.
    #[serde(default)]
    pub thresholds: RiskThresholds,
    /// History store settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for DocguardConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            model_dir: default_model_dir(),
            kinds: KindToggles::default(),
            thresholds: RiskThresholds::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// LLM gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier sent to the gateway.
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Hard deadline for one synthesis call, in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
    /// Chat-completions endpoint base URL.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key
    /// itself never appears in config files.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Per-kind enable flags; a disabled kind is rejected at the pipeline
/// boundary before extraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KindToggles {
    #[serde(default = "default_true")]
    pub bank_statement: bool,
    #[serde(default = "default_true")]
    pub check: bool,
    #[serde(default = "default_true")]
    pub paystub: bool,
    #[serde(default = "default_true")]
    pub money_order: bool,
}

impl Default for KindToggles {
    fn default() -> Self {
        Self {
            bank_statement: true,
            check: true,
            paystub: true,
            money_order: true,
        }
    }
}

impl KindToggles {
    /// Whether a kind is enabled.
    pub fn is_enabled(&self, kind: docguard_core::DocumentKind) -> bool {
        use docguard_core::DocumentKind::*;
        match kind {
            BankStatement => self.bank_statement,
            Check => self.check,
            Paystub => self.paystub,
            MoneyOrder => self.money_order,
        }
    }
}

/// History store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Snapshot path for the JSON-file store; `None` keeps history
    /// in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./models")
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "DOCGUARD_LLM_API_KEY".to_string()
}
fn default_true() -> bool {
    true
}

impl DocguardConfig {
    /// Load a YAML config file and apply environment overrides.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.apply_env_overrides()?;
        crate::validation::validate_config(&config)?;
        Ok(config)
    }

    /// Build a config from defaults plus environment overrides.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        crate::validation::validate_config(&config)?;
        Ok(config)
    }

    /// Apply the documented environment variables on top of the current
    /// values.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(raw) = std::env::var("LLM_TIMEOUT_SECONDS") {
            self.llm.timeout_seconds = parse_env("LLM_TIMEOUT_SECONDS", &raw)?;
        }
        if let Ok(dir) = std::env::var("MODEL_DIR") {
            self.model_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = std::env::var("DOCUMENT_KIND_ENABLED_BANK_STATEMENT") {
            self.kinds.bank_statement = parse_bool("DOCUMENT_KIND_ENABLED_BANK_STATEMENT", &raw)?;
        }
        if let Ok(raw) = std::env::var("DOCUMENT_KIND_ENABLED_CHECK") {
            self.kinds.check = parse_bool("DOCUMENT_KIND_ENABLED_CHECK", &raw)?;
        }
        if let Ok(raw) = std::env::var("DOCUMENT_KIND_ENABLED_PAYSTUB") {
            self.kinds.paystub = parse_bool("DOCUMENT_KIND_ENABLED_PAYSTUB", &raw)?;
        }
        if let Ok(raw) = std::env::var("DOCUMENT_KIND_ENABLED_MONEY_ORDER") {
            self.kinds.money_order = parse_bool("DOCUMENT_KIND_ENABLED_MONEY_ORDER", &raw)?;
        }
        if let Ok(raw) = std::env::var("RISK_THRESHOLD_APPROVE") {
            self.thresholds.approve = parse_env("RISK_THRESHOLD_APPROVE", &raw)?;
        }
        if let Ok(raw) = std::env::var("RISK_THRESHOLD_ESCALATE_MAX_CLEAN") {
            self.thresholds.escalate_max_clean =
                parse_env("RISK_THRESHOLD_ESCALATE_MAX_CLEAN", &raw)?;
        }
        if let Ok(path) = std::env::var("HISTORY_PATH") {
            self.history.path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, raw: &str) -> ConfigResult<T> {
    raw.parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: raw.to_string(),
        reason: format!("expected a {}", std::any::type_name::<T>()),
    })
}

fn parse_bool(var: &str, raw: &str) -> ConfigResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DocguardConfig::default();
        assert_eq!(config.llm.timeout_seconds, 30);
        assert!(config.kinds.bank_statement);
        assert_eq!(config.thresholds.approve, 0.30);
        assert!(config.history.path.is_none());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
llm:
  model: "claude-sonnet"
  timeout_seconds: 10
model_dir: "/opt/models"
kinds:
  money_order: false
thresholds:
  approve: 0.25
  escalate_max_clean: 0.9
"#;
        let config: DocguardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.model, "claude-sonnet");
        assert_eq!(config.llm.timeout_seconds, 10);
        assert_eq!(config.model_dir, PathBuf::from("/opt/models"));
        assert!(!config.kinds.money_order);
        assert!(config.kinds.check);
        assert_eq!(config.thresholds.approve, 0.25);
    }

    #[test]
    fn test_parse_bool_values() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}

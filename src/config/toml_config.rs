use crate::core::GatewaySettings;
use crate::utils::error::{AquaError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AquaConfig {
    pub gateway: GatewayConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    #[default]
    Rest,
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub kind: GatewayKind,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub fixture_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl AquaConfig {
    /// Loads and parses a TOML file, substituting `${VAR}` references first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AquaError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AquaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// REST gateway settings from `SUPABASE_URL` and `SUPABASE_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL").ok();
        let api_key = std::env::var("SUPABASE_KEY").ok();
        validation::validate_required_field("SUPABASE_URL", &base_url)?;
        validation::validate_required_field("SUPABASE_KEY", &api_key)?;

        Ok(Self {
            gateway: GatewayConfig {
                kind: GatewayKind::Rest,
                base_url,
                api_key,
                timeout_seconds: None,
                fixture_path: None,
            },
            logging: None,
        })
    }

    pub fn fixture(path: impl Into<String>) -> Self {
        Self {
            gateway: GatewayConfig {
                kind: GatewayKind::Fixture,
                base_url: None,
                api_key: None,
                timeout_seconds: None,
                fixture_path: Some(path.into()),
            },
            logging: None,
        }
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AquaError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.gateway.kind {
            GatewayKind::Rest => {
                let base_url =
                    validation::validate_required_field("gateway.base_url", &self.gateway.base_url)?;
                validation::validate_gateway_url("gateway.base_url", base_url)?;
                let api_key =
                    validation::validate_required_field("gateway.api_key", &self.gateway.api_key)?;
                validation::validate_api_key("gateway.api_key", api_key)?;
            }
            GatewayKind::Fixture => {
                let path = validation::validate_required_field(
                    "gateway.fixture_path",
                    &self.gateway.fixture_path,
                )?;
                validation::validate_fixture_path("gateway.fixture_path", path)?;
            }
        }

        if let Some(timeout) = self.gateway.timeout_seconds {
            validation::validate_range("gateway.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(level) = self.log_level() {
            validation::validate_log_level("logging.level", level)?;
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl GatewaySettings for AquaConfig {
    fn base_url(&self) -> &str {
        self.gateway.base_url.as_deref().unwrap_or_default()
    }

    fn api_key(&self) -> &str {
        self.gateway.api_key.as_deref().unwrap_or_default()
    }

    fn timeout_seconds(&self) -> u64 {
        self.gateway.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for AquaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

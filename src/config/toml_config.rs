use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedSettings,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedSettings {
    pub poll_interval_seconds: Option<u64>,
    pub prepend_pushed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
}

impl FeedConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FeedError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FeedError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ITEMS_API_URL})，未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FeedError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = Some(base_url.into());
        self
    }

    pub fn log_format(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .unwrap_or("compact")
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let base_url = validation::validate_required_field("api.base_url", &self.api.base_url)?;
        validation::validate_url("api.base_url", base_url)?;

        validation::validate_positive_number("api.timeout_seconds", self.timeout_seconds(), 1)?;
        validation::validate_positive_number(
            "feed.poll_interval_seconds",
            self.poll_interval_seconds(),
            1,
        )?;

        validation::validate_one_of("logging.format", self.log_format(), &["compact", "json"])?;

        Ok(())
    }
}

impl ConfigProvider for FeedConfig {
    fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or_default()
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn poll_interval_seconds(&self) -> u64 {
        self.feed
            .poll_interval_seconds
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS)
    }

    fn prepend_pushed(&self) -> bool {
        self.feed.prepend_pushed.unwrap_or(true)
    }
}

impl Validate for FeedConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[api]
base_url = "http://127.0.0.1:3000"
timeout_seconds = 3

[feed]
poll_interval_seconds = 2
prepend_pushed = false

[logging]
format = "json"
"#;

        let config = FeedConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
        assert_eq!(config.timeout_seconds(), 3);
        assert_eq!(config.poll_interval_seconds(), 2);
        assert!(!config.prepend_pushed());
        assert_eq!(config.log_format(), "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = FeedConfig::from_toml_str("[api]\nbase_url = \"http://localhost:3000\"\n")
            .unwrap();

        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.poll_interval_seconds(), DEFAULT_POLL_INTERVAL_SECONDS);
        assert!(config.prepend_pushed());
        assert_eq!(config.log_format(), "compact");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ITEM_FEED_TEST_API_URL", "https://items.example.com");

        let toml_content = r#"
[api]
base_url = "${ITEM_FEED_TEST_API_URL}"
"#;

        let config = FeedConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), "https://items.example.com");

        std::env::remove_var("ITEM_FEED_TEST_API_URL");
    }

    #[test]
    fn test_missing_base_url_fails_validation() {
        let config = FeedConfig::from_toml_str("[feed]\npoll_interval_seconds = 1\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(FeedError::MissingConfigError { .. })
        ));

        let config = config.with_base_url("http://localhost:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let zero_interval = r#"
[api]
base_url = "http://localhost:3000"

[feed]
poll_interval_seconds = 0
"#;
        assert!(FeedConfig::from_toml_str(zero_interval)
            .unwrap()
            .validate()
            .is_err());

        let bad_format = r#"
[api]
base_url = "http://localhost:3000"

[logging]
format = "xml"
"#;
        assert!(FeedConfig::from_toml_str(bad_format)
            .unwrap()
            .validate()
            .is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = FeedConfig::from_toml_str("[api\nbase_url = 1");
        assert!(matches!(result, Err(FeedError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"http://localhost:3000\"\n")
            .unwrap();

        let config = FeedConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
    }
}

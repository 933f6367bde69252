use crate::core::ConfigProvider;
use crate::domain::model::UserPreferences;
use crate::utils::error::{Result, StyleCutError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub defaults: UserPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub analysis_model: String,
    pub image_model: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_seconds: Some(120),
            retry_attempts: Some(2),
            retry_delay_ms: Some(1200),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub max_image_bytes: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: crate::core::intake::MAX_IMAGE_BYTES,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StyleCutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StyleCutError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 有指定檔案就讀檔，否則使用預設值；最後補上環境變數中的 API key
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_fallbacks();
        Ok(config)
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StyleCutError::config(e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn apply_env_fallbacks(&mut self) {
        let has_key = self
            .backend
            .api_key
            .as_deref()
            .map(|key| !key.trim().is_empty() && !key.starts_with("${"))
            .unwrap_or(false);
        if has_key {
            return;
        }
        self.backend.api_key = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("backend.api_base", &self.backend.api_base)?;
        let key = validate_required_field("backend.api_key", &self.backend.api_key)?;
        validate_non_empty_string("backend.api_key", key)?;
        validate_non_empty_string("backend.analysis_model", &self.backend.analysis_model)?;
        validate_non_empty_string("backend.image_model", &self.backend.image_model)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_positive_number("backend.timeout_seconds", timeout as usize, 1)?;
        }
        if let Some(retries) = self.backend.retry_attempts {
            validate_range("backend.retry_attempts", retries, 0, 5)?;
        }
        validate_positive_number("intake.max_image_bytes", self.intake.max_image_bytes, 1)?;

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn api_base(&self) -> &str {
        &self.backend.api_base
    }

    fn api_key(&self) -> &str {
        self.backend.api_key.as_deref().unwrap_or_default()
    }

    fn analysis_model(&self) -> &str {
        &self.backend.analysis_model
    }

    fn image_model(&self) -> &str {
        &self.backend.image_model
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.backend.timeout_seconds.map(Duration::from_secs)
    }

    fn retry_attempts(&self) -> u32 {
        self.backend.retry_attempts.unwrap_or(0)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.backend.retry_delay_ms.unwrap_or(1200))
    }

    fn max_image_bytes(&self) -> usize {
        self.intake.max_image_bytes
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

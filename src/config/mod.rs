pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{FacialHair, Gender, LengthPreference, StyleCategory, UserPreferences};
#[cfg(feature = "cli")]
use crate::utils::error::{Result, StyleCutError};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "stylecut")]
#[command(about = "AI haircut recommendations and virtual try-on from a selfie")]
pub struct CliConfig {
    #[arg(long, help = "Selfie to analyze (jpeg, png or webp, max 5MB)")]
    pub photo: String,

    #[arg(long, help = "TOML config file")]
    pub config: Option<String>,

    #[arg(long, help = "masculine | feminine | neutral")]
    pub gender: Option<Gender>,

    #[arg(long, help = "short | medium | long | any")]
    pub length: Option<LengthPreference>,

    #[arg(long, help = "professional | casual | trendy | edgy | classic")]
    pub style: Option<StyleCategory>,

    #[arg(long, help = "none | clean_shave | stubble | full_beard | goatee | mustache")]
    pub facial_hair: Option<FacialHair>,

    #[arg(long, help = "Describe a custom style to add (repeatable)")]
    pub custom: Vec<String>,

    #[arg(long, help = "Generate a try-on image for the recommendation at this index")]
    pub try_on: Option<usize>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "API key (defaults to GEMINI_API_KEY)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數優先於設定檔中的預設值
    pub fn preferences(&self, defaults: UserPreferences) -> UserPreferences {
        UserPreferences {
            gender: self.gender.unwrap_or(defaults.gender),
            length_preference: self.length.unwrap_or(defaults.length_preference),
            style_category: self.style.unwrap_or(defaults.style_category),
            facial_hair: self.facial_hair.unwrap_or(defaults.facial_hair),
        }
    }

    pub fn apply_overrides(&self, config: &mut toml_config::AppConfig) {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            config.backend.api_key = Some(key.trim().to_string());
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("photo", &self.photo)?;
        validate_non_empty_string("output_path", &self.output_path)?;
        if self.output_path.contains('\0') {
            return Err(StyleCutError::InvalidConfigValueError {
                field: "output_path".to_string(),
                value: self.output_path.clone(),
                reason: "Path contains null bytes".to_string(),
            });
        }
        Ok(())
    }
}

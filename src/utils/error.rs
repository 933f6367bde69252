use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleCutError {
    #[error("Photo validation failed: {message}")]
    ValidationError { message: String },

    #[error("Face analysis failed: {message}")]
    AnalysisError { message: String },

    #[error("Custom style generation failed: {message}")]
    CustomizationError { message: String },

    #[error("Try-on image generation failed: {message}")]
    GenerationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Cannot {action} while session is {phase}")]
    InvalidTransition { action: String, phase: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 使用者可見的錯誤種類（對應 session 上顯示的錯誤）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Analysis,
    Customization,
    Generation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Backend,
    Configuration,
    Session,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StyleCutError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::AnalysisError {
            message: message.into(),
        }
    }

    pub fn customization(message: impl Into<String>) -> Self {
        Self::CustomizationError {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_transition(action: &str, phase: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            action: action.to_string(),
            phase: phase.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError { .. } => ErrorKind::Validation,
            Self::AnalysisError { .. } => ErrorKind::Analysis,
            Self::CustomizationError { .. } => ErrorKind::Customization,
            Self::GenerationError { .. } => ErrorKind::Generation,
            _ => ErrorKind::Other,
        }
    }

    /// 錯誤本身的訊息，不含種類前綴
    pub fn detail(&self) -> String {
        match self {
            Self::ValidationError { message }
            | Self::AnalysisError { message }
            | Self::CustomizationError { message }
            | Self::GenerationError { message }
            | Self::ConfigError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// 將任意錯誤轉為指定種類，已是該種類則原樣返回
    pub fn into_kind(self, kind: ErrorKind) -> Self {
        if self.kind() == kind {
            return self;
        }
        let message = self.detail();
        match kind {
            ErrorKind::Validation => Self::validation(message),
            ErrorKind::Analysis => Self::analysis(message),
            ErrorKind::Customization => Self::customization(message),
            ErrorKind::Generation => Self::generation(message),
            ErrorKind::Other => self,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::AnalysisError { .. }
            | Self::CustomizationError { .. }
            | Self::GenerationError { .. }
            | Self::ApiError(_)
            | Self::SerializationError(_) => ErrorCategory::Backend,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::InvalidTransition { .. } => ErrorCategory::Session,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CustomizationError { .. } => ErrorSeverity::Low,
            Self::GenerationError { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::ValidationError { .. }
            | Self::AnalysisError { .. }
            | Self::InvalidTransition { .. }
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("This photo can't be used: {}", message),
            Self::AnalysisError { .. } => "Analysis failed. Please try a clearer photo.".to_string(),
            Self::CustomizationError { .. } => {
                "We couldn't create that custom style right now.".to_string()
            }
            Self::GenerationError { .. } => "The try-on image could not be generated.".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Setting '{}' is required", field),
            Self::InvalidTransition { action, phase } => {
                format!("Can't {} right now (session is {})", action, phase)
            }
            Self::ApiError(_) => "The style service could not be reached.".to_string(),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(_) => "The style service returned unreadable data.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "Upload a JPEG, PNG or WebP photo under 5MB",
            Self::AnalysisError { .. } => "Retry with another, well-lit front-facing photo",
            Self::CustomizationError { .. } => "Rephrase the style description and try again",
            Self::GenerationError { .. } => "Retry the try-on or pick another style",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Check the config file and the GEMINI_API_KEY environment variable"
            }
            Self::InvalidTransition { .. } => "Follow the flow: photo, preferences, analyze, try on",
            Self::ApiError(_) => "Check network connectivity and the API endpoint",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "Retry the request",
        }
    }
}

pub type Result<T> = std::result::Result<T, StyleCutError>;

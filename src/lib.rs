pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::AppConfig};
pub use core::{controller::SessionController, gemini::GeminiAdvisor, session::Session};
pub use utils::error::{Result, StyleCutError};

pub mod controller;
pub mod gemini;
pub mod intake;
pub mod prompts;
pub mod schema;
pub mod session;
pub mod share;

pub use crate::domain::model::{
    AnalysisResult, EncodedImage, FaceAnalysis, GeneratedImage, HairstyleRecommendation,
    UserPreferences,
};
pub use crate::domain::ports::{ConfigProvider, Storage, StyleAdvisor};
pub use crate::utils::error::Result;

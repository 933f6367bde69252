use crate::domain::model::{
    AnalysisResult, EncodedImage, FaceAnalysis, FacialHair, Gender, GeneratedImage,
    HairstyleRecommendation, UserPreferences,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn api_key(&self) -> &str;
    fn analysis_model(&self) -> &str;
    fn image_model(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn max_image_bytes(&self) -> usize;
}

/// 外部生成式 AI 的三個操作
#[async_trait]
pub trait StyleAdvisor: Send + Sync {
    async fn analyze(
        &self,
        image: &EncodedImage,
        prefs: &UserPreferences,
    ) -> Result<AnalysisResult>;

    async fn customize(
        &self,
        description: &str,
        analysis: &FaceAnalysis,
        prefs: &UserPreferences,
    ) -> Result<HairstyleRecommendation>;

    async fn try_on(
        &self,
        image: &EncodedImage,
        style_name: &str,
        gender: Gender,
        facial_hair: FacialHair,
    ) -> Result<GeneratedImage>;
}

use crate::core::gemini::GeminiAdvisor;
use crate::core::intake;
use crate::core::session::{Completion, Session};
use crate::domain::model::{AnalysisResult, GeneratedImage, HairstyleRecommendation, UserPreferences};
use crate::domain::ports::{ConfigProvider, StyleAdvisor};
use crate::utils::error::{ErrorKind, Result, StyleCutError};
use tokio::sync::Mutex;

/// 串接照片、分析、自訂風格與試穿的協調者
///
/// Session 只在狀態轉換時短暫上鎖，外部呼叫期間不持有鎖，
/// 所以多個請求可以交錯完成，由 session 的序號決定誰生效。
pub struct SessionController<A: StyleAdvisor> {
    advisor: A,
    session: Mutex<Session>,
    max_image_bytes: usize,
}

impl<A: StyleAdvisor> SessionController<A> {
    pub fn new(advisor: A) -> Self {
        Self::with_preferences(advisor, UserPreferences::default())
    }

    pub fn with_preferences(advisor: A, preferences: UserPreferences) -> Self {
        Self {
            advisor,
            session: Mutex::new(Session::new(preferences)),
            max_image_bytes: intake::MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn advisor(&self) -> &A {
        &self.advisor
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// 驗證失敗只記錄錯誤，現有狀態不變，且不會有任何網路請求
    pub async fn select_photo(&self, data: Vec<u8>, declared_mime: Option<&str>) -> Result<()> {
        let encoded = intake::encode_with_limit(data, declared_mime, self.max_image_bytes);
        let mut session = self.session.lock().await;
        match encoded {
            Ok(image) => {
                tracing::info!("📷 Photo accepted ({}, {} bytes)", image.mime, image.len());
                session.select_photo(image);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("❌ Photo rejected: {}", err);
                session.reject_photo(&err);
                Err(err)
            }
        }
    }

    pub async fn set_preferences(&self, preferences: UserPreferences) {
        self.session.lock().await.set_preferences(preferences);
    }

    /// 成功返回 Some；被新照片取代時返回 None
    pub async fn analyze(&self) -> Result<Option<AnalysisResult>> {
        let ticket = self.session.lock().await.begin_analysis()?;

        let outcome = self
            .advisor
            .analyze(&ticket.image, &ticket.preferences)
            .await
            .map_err(|e| e.into_kind(ErrorKind::Analysis));

        let returned = match &outcome {
            Ok(result) => Ok(result.clone()),
            Err(err) => Err(StyleCutError::analysis(err.detail())),
        };

        let mut session = self.session.lock().await;
        match session.complete_analysis(&ticket, outcome) {
            Completion::Applied => returned.map(Some),
            Completion::Stale => Ok(None),
        }
    }

    /// 失敗只記錄在日誌中，對呼叫者而言與無操作相同（返回 None）
    pub async fn customize(&self, description: &str) -> Result<Option<HairstyleRecommendation>> {
        let Some(ticket) = self.session.lock().await.begin_custom_style(description)? else {
            tracing::debug!("Empty custom style description, nothing to do");
            return Ok(None);
        };

        let outcome = self
            .advisor
            .customize(&ticket.description, &ticket.analysis, &ticket.preferences)
            .await
            .map_err(|e| e.into_kind(ErrorKind::Customization));
        let failed = outcome.is_err();

        let mut session = self.session.lock().await;
        match session.complete_custom_style(&ticket, outcome) {
            Completion::Applied if !failed => Ok(session.recommendations().first().cloned()),
            _ => Ok(None),
        }
    }

    /// 返回生效的試穿結果；被較新的請求取代或視窗已關閉時返回 Ok(None)
    pub async fn try_on(&self, style_id: &str) -> Result<Option<GeneratedImage>> {
        let ticket = self.session.lock().await.begin_try_on(style_id)?;

        let outcome = self
            .advisor
            .try_on(
                &ticket.image,
                &ticket.style_name,
                ticket.gender,
                ticket.facial_hair,
            )
            .await
            .map_err(|e| e.into_kind(ErrorKind::Generation));

        let returned = match &outcome {
            Ok(image) => Ok(image.clone()),
            Err(err) => Err(StyleCutError::generation(err.detail())),
        };

        let mut session = self.session.lock().await;
        match session.complete_try_on(&ticket, outcome) {
            Completion::Applied => returned.map(Some),
            Completion::Stale => Ok(None),
        }
    }

    pub async fn dismiss_try_on(&self) {
        self.session.lock().await.dismiss_try_on();
    }

    pub async fn clear_error(&self) {
        self.session.lock().await.clear_error();
    }

    pub async fn reset(&self) {
        tracing::info!("🏠 Session reset");
        self.session.lock().await.reset();
    }
}

impl<C: ConfigProvider> SessionController<GeminiAdvisor<C>> {
    /// 照片上限取自後端設定
    pub fn from_gemini(advisor: GeminiAdvisor<C>, preferences: UserPreferences) -> Self {
        let max_image_bytes = advisor.config().max_image_bytes();
        Self::with_preferences(advisor, preferences).with_max_image_bytes(max_image_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::AppConfig;
    use crate::core::session::Phase;
    use crate::utils::error::ErrorKind;

    fn jpeg(len: usize) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        data.resize(len, 0);
        data
    }

    #[tokio::test]
    async fn test_from_gemini_uses_configured_image_limit() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("key".to_string());
        config.intake.max_image_bytes = 16;

        let advisor = GeminiAdvisor::new(config).unwrap();
        let controller = SessionController::from_gemini(advisor, UserPreferences::default());

        let err = controller.select_photo(jpeg(17), None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        controller.select_photo(jpeg(16), None).await.unwrap();
        assert_eq!(controller.snapshot().await.phase(), Phase::AwaitingPreferences);
    }
}

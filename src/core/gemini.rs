use crate::core::prompts;
use crate::core::schema;
use crate::domain::model::{
    AnalysisResult, EncodedImage, FaceAnalysis, FacialHair, Gender, GeneratedImage,
    HairstyleRecommendation, UserPreferences,
};
use crate::domain::ports::{ConfigProvider, StyleAdvisor};
use crate::utils::error::{ErrorKind, Result, StyleCutError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BODY_EXCERPT_CHARS: usize = 300;

/// 三種後端操作，各自對應一種錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Analysis,
    Customization,
    Generation,
}

impl Operation {
    fn kind(self) -> ErrorKind {
        match self {
            Operation::Analysis => ErrorKind::Analysis,
            Operation::Customization => ErrorKind::Customization,
            Operation::Generation => ErrorKind::Generation,
        }
    }

    fn error(self, message: impl Into<String>) -> StyleCutError {
        match self {
            Operation::Analysis => StyleCutError::analysis(message),
            Operation::Customization => StyleCutError::customization(message),
            Operation::Generation => StyleCutError::generation(message),
        }
    }
}

/// 透過 generateContent API 實作 StyleAdvisor
pub struct GeminiAdvisor<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> GeminiAdvisor<C> {
    pub fn new(config: C) -> Result<Self> {
        if config.api_key().trim().is_empty() {
            return Err(StyleCutError::MissingConfigError {
                field: "backend.api_key".to_string(),
            });
        }
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{}", trimmed)
        };
        format!(
            "{}/{}:generateContent",
            self.config.api_base().trim_end_matches('/'),
            model_path
        )
    }

    async fn post_json(&self, op: Operation, model: &str, payload: &Value) -> Result<Value> {
        let endpoint = self.endpoint_for_model(model);
        let max_retries = self.config.retry_attempts();
        let mut attempt: u32 = 0;

        loop {
            let mut request = self
                .client
                .post(&endpoint)
                .query(&[("key", self.config.api_key())])
                .json(payload);

            if let Some(timeout) = self.config.request_timeout() {
                request = request.timeout(timeout);
            }

            tracing::debug!("📡 {:?}: POST {} (attempt {})", op, endpoint, attempt + 1);

            let failure = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!("📡 {:?}: response status {}", op, status);

                    if status.is_success() {
                        return response
                            .json::<Value>()
                            .await
                            .map_err(|e| StyleCutError::from(e).into_kind(op.kind()));
                    }

                    let body = response.text().await.unwrap_or_default();
                    let err = op.error(format!(
                        "{} returned status {}: {}",
                        model,
                        status,
                        excerpt(&body)
                    ));
                    if !is_retryable_status(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => StyleCutError::from(e).into_kind(op.kind()),
            };

            if attempt >= max_retries {
                return Err(failure);
            }
            attempt += 1;
            tracing::warn!(
                "🔁 {:?}: retry {}/{} after failure: {}",
                op,
                attempt,
                max_retries,
                failure
            );
            tokio::time::sleep(self.config.retry_delay() * attempt).await;
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{}…", cut)
}

pub fn inline_image_part(image: &EncodedImage) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime.as_str(),
            "data": image.to_base64(),
        }
    })
}

fn candidate_parts(payload: &Value) -> impl Iterator<Item = &Value> {
    payload
        .get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|candidate| {
            candidate
                .get("content")
                .and_then(|content| content.get("parts"))
                .and_then(Value::as_array)
        })
        .flatten()
}

fn block_reason(payload: &Value) -> Option<&str> {
    payload
        .get("promptFeedback")
        .and_then(|feedback| feedback.get("blockReason"))
        .and_then(Value::as_str)
}

/// 取第一個候選的文字內容（略過 thought 片段）
pub fn response_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)?;

    let text: String = parts
        .iter()
        .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 掃描所有片段，回傳第一個內嵌圖片
pub fn extract_first_image(payload: &Value) -> Result<GeneratedImage> {
    for part in candidate_parts(payload) {
        let Some(inline) = part
            .get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(Value::as_object)
        else {
            continue;
        };

        let data = inline.get("data").and_then(Value::as_str).unwrap_or_default();
        if data.is_empty() {
            continue;
        }

        let bytes = BASE64
            .decode(data.as_bytes())
            .map_err(|e| StyleCutError::generation(format!("image base64 decode failed: {}", e)))?;
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .map(str::to_string);

        return Ok(GeneratedImage::new(mime_type, bytes));
    }

    let reason = match block_reason(payload) {
        Some(reason) => format!("no image generated (blocked: {})", reason),
        None => "no image generated".to_string(),
    };
    Err(StyleCutError::generation(reason))
}

fn require_text(op: Operation, payload: &Value) -> Result<String> {
    response_text(payload).ok_or_else(|| match block_reason(payload) {
        Some(reason) => op.error(format!("request was blocked: {}", reason)),
        None => op.error("backend returned no text"),
    })
}

#[async_trait::async_trait]
impl<C: ConfigProvider> StyleAdvisor for GeminiAdvisor<C> {
    async fn analyze(
        &self,
        image: &EncodedImage,
        prefs: &UserPreferences,
    ) -> Result<AnalysisResult> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    inline_image_part(image),
                    { "text": prompts::analysis_prompt(prefs) }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema::analysis_schema()
            }
        });

        tracing::info!(
            "🧠 Analyzing photo ({} bytes) for {} / {} / {}",
            image.len(),
            prefs.gender,
            prefs.length_preference,
            prefs.style_category
        );

        let response = self
            .post_json(Operation::Analysis, self.config.analysis_model(), &payload)
            .await?;
        let text = require_text(Operation::Analysis, &response)?;
        let result = schema::parse_analysis(&text)?;

        tracing::info!(
            "✅ Face shape {} ({:.0}% confidence), {} recommendations",
            result.analysis.face_shape,
            result.analysis.confidence_score,
            result.recommendations.len()
        );
        Ok(result)
    }

    async fn customize(
        &self,
        description: &str,
        analysis: &FaceAnalysis,
        prefs: &UserPreferences,
    ) -> Result<HairstyleRecommendation> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompts::custom_style_prompt(description, analysis, prefs) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema::recommendation_schema()
            }
        });

        tracing::info!("✨ Generating custom style: {}", description.trim());

        let response = self
            .post_json(Operation::Customization, self.config.analysis_model(), &payload)
            .await?;
        let text = require_text(Operation::Customization, &response)?;
        schema::parse_recommendation(&text)
    }

    async fn try_on(
        &self,
        image: &EncodedImage,
        style_name: &str,
        gender: Gender,
        facial_hair: FacialHair,
    ) -> Result<GeneratedImage> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    inline_image_part(image),
                    { "text": prompts::try_on_prompt(style_name, gender, facial_hair) }
                ]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE", "TEXT"]
            }
        });

        tracing::info!("🎨 Generating try-on for '{}'", style_name);

        let response = self
            .post_json(Operation::Generation, self.config.image_model(), &payload)
            .await?;
        let generated = extract_first_image(&response)?;

        tracing::info!(
            "🖼️ Try-on image ready ({}, {} bytes)",
            generated.mime_type,
            generated.data.len()
        );
        Ok(generated)
    }
}

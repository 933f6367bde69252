use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use stylecut::core::ConfigProvider;
use stylecut::domain::model::{
    EncodedImage, FaceAnalysis, FacialFeatures, FacialHair, Gender, ImageMime, LengthPreference,
    MaintenanceLevel, StyleCategory, UserPreferences,
};
use stylecut::domain::ports::StyleAdvisor;
use stylecut::utils::error::ErrorKind;
use stylecut::{GeminiAdvisor, StyleCutError};

struct MockConfig {
    api_base: String,
    retry_attempts: u32,
}

impl MockConfig {
    fn new(server: &MockServer) -> Self {
        Self {
            api_base: server.url("/v1beta"),
            retry_attempts: 0,
        }
    }
}

impl ConfigProvider for MockConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> &str {
        "test-key"
    }

    fn analysis_model(&self) -> &str {
        "gemini-2.5-flash"
    }

    fn image_model(&self) -> &str {
        "gemini-2.5-flash-image"
    }

    fn request_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(5))
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn max_image_bytes(&self) -> usize {
        5 * 1024 * 1024
    }
}

fn selfie() -> EncodedImage {
    EncodedImage {
        mime: ImageMime::Jpeg,
        data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
    }
}

fn text_response(body: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": body.to_string() }] }
        }]
    })
}

fn recommendation(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "Tapered sides with a textured top",
        "whyItSuits": "Adds height that balances a round face",
        "maintenanceLevel": "Medium",
        "stylingTips": ["Blow dry upwards"],
        "products": ["Matte clay"]
    })
}

fn analysis_body() -> serde_json::Value {
    json!({
        "analysis": {
            "faceShape": "Round",
            "faceShapeDescription": "Soft jaw with full cheeks",
            "features": { "jawline": "Soft", "forehead": "Medium", "cheekbones": "Full" },
            "detectedHairType": "Straight",
            "skinTone": "Warm",
            "confidenceScore": 88
        },
        "recommendations": [
            recommendation("quiff", "Modern Quiff"),
            recommendation("crop", "Textured Crop"),
            recommendation("quiff", "Side Part"),
            recommendation("", "Faux Hawk")
        ]
    })
}

fn round_face() -> FaceAnalysis {
    FaceAnalysis {
        face_shape: "Round".to_string(),
        face_shape_description: "Soft jaw".to_string(),
        features: FacialFeatures {
            jawline: "Soft".to_string(),
            forehead: "Medium".to_string(),
            cheekbones: "Full".to_string(),
        },
        detected_hair_type: "Straight".to_string(),
        skin_tone: "Warm".to_string(),
        confidence_score: 88.0,
    }
}

#[tokio::test]
async fn test_analyze_sends_image_and_preferences() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent")
            .query_param("key", "test-key")
            .body_contains("\"mimeType\":\"image/jpeg\"")
            .body_contains("preference for masculine styles, short length, and classic look")
            .body_contains("facial hair style: full_beard")
            .body_contains("responseSchema");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(text_response(analysis_body()));
    });

    let advisor = GeminiAdvisor::new(MockConfig::new(&server)).unwrap();
    let prefs = UserPreferences {
        gender: Gender::Masculine,
        length_preference: LengthPreference::Short,
        style_category: StyleCategory::Classic,
        facial_hair: FacialHair::FullBeard,
    };

    let result = advisor.analyze(&selfie(), &prefs).await.unwrap();
    api_mock.assert();

    assert_eq!(result.analysis.face_shape, "Round");
    assert_eq!(result.analysis.confidence_score, 88.0);
    assert_eq!(result.recommendations.len(), 4);
    assert_eq!(result.recommendations[0].id, "quiff");
    assert_eq!(result.recommendations[1].maintenance_level, MaintenanceLevel::Medium);

    // Duplicate and blank ids are re-keyed so every id stays unique
    let mut ids: Vec<&str> = result.recommendations.iter().map(|r| r.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(result.recommendations[2].name, "Side Part");
}

#[tokio::test]
async fn test_analyze_server_error_is_retried_then_reported() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent");
        then.status(503).body("overloaded");
    });

    let config = MockConfig {
        retry_attempts: 1,
        ..MockConfig::new(&server)
    };
    let advisor = GeminiAdvisor::new(config).unwrap();

    let err = advisor
        .analyze(&selfie(), &UserPreferences::default())
        .await
        .unwrap_err();

    api_mock.assert_hits(2);
    assert_eq!(err.kind(), ErrorKind::Analysis);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent");
        then.status(400).body("{\"error\":{\"message\":\"API key not valid\"}}");
    });

    let config = MockConfig {
        retry_attempts: 3,
        ..MockConfig::new(&server)
    };
    let advisor = GeminiAdvisor::new(config).unwrap();

    let err = advisor
        .analyze(&selfie(), &UserPreferences::default())
        .await
        .unwrap_err();

    api_mock.assert_hits(1);
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_analyze_rejects_malformed_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent");
        then.status(200)
            .json_body(text_response(json!({ "analysis": { "faceShape": "Oval" } })));
    });

    let advisor = GeminiAdvisor::new(MockConfig::new(&server)).unwrap();
    let err = advisor
        .analyze(&selfie(), &UserPreferences::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StyleCutError::AnalysisError { .. }));
}

#[tokio::test]
async fn test_customize_returns_single_recommendation() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent")
            .body_contains("Messy mullet")
            .body_contains("The user's face shape is Round.");
        then.status(200).json_body(text_response(json!({
            "id": "custom-mullet",
            "name": "Messy Mullet",
            "description": "Short front, long back",
            "whyItSuits": "It can work, but it will widen a round face.",
            "maintenanceLevel": "High",
            "stylingTips": [],
            "products": ["Texturizing spray"]
        })));
    });

    let advisor = GeminiAdvisor::new(MockConfig::new(&server)).unwrap();
    let rec = advisor
        .customize("Messy mullet", &round_face(), &UserPreferences::default())
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(rec.name, "Messy Mullet");
    assert_eq!(rec.maintenance_level, MaintenanceLevel::High);
    assert!(rec.why_it_suits.contains("widen"));
}

#[tokio::test]
async fn test_try_on_returns_first_inline_image() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash-image:generateContent")
            .query_param("key", "test-key")
            .body_contains("Edit this photo to give the person a Buzz Cut hairstyle.")
            .body_contains("italian style stubble beard")
            .body_contains("responseModalities");
        then.status(200).json_body(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                    ]
                }
            }]
        }));
    });

    let advisor = GeminiAdvisor::new(MockConfig::new(&server)).unwrap();
    let image = advisor
        .try_on(&selfie(), "Buzz Cut", Gender::Masculine, FacialHair::Stubble)
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(&image.data[..4], &[0x89, b'P', b'N', b'G']);
    assert!(image.data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[tokio::test]
async fn test_try_on_without_image_is_generation_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash-image:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot edit this image." }] } }]
        }));
    });

    let advisor = GeminiAdvisor::new(MockConfig::new(&server)).unwrap();
    let err = advisor
        .try_on(&selfie(), "Buzz Cut", Gender::Neutral, FacialHair::None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generation);
}

#[test]
fn test_missing_api_key_is_rejected() {
    struct NoKey;
    impl ConfigProvider for NoKey {
        fn api_base(&self) -> &str {
            "http://localhost"
        }
        fn api_key(&self) -> &str {
            "  "
        }
        fn analysis_model(&self) -> &str {
            "m"
        }
        fn image_model(&self) -> &str {
            "m"
        }
        fn request_timeout(&self) -> Option<Duration> {
            None
        }
        fn retry_attempts(&self) -> u32 {
            0
        }
        fn retry_delay(&self) -> Duration {
            Duration::ZERO
        }
        fn max_image_bytes(&self) -> usize {
            1
        }
    }

    assert!(matches!(
        GeminiAdvisor::new(NoKey),
        Err(StyleCutError::MissingConfigError { .. })
    ));
}

//! Response schemas sent to the model and the checks applied to what comes back.
//!
//! Nothing from the backend becomes a domain value without passing through
//! `parse_analysis` or `parse_recommendation`.

use crate::domain::model::{
    fresh_recommendation_id, AnalysisResult, FaceAnalysis, FacialFeatures,
    HairstyleRecommendation, MaintenanceLevel,
};
use crate::utils::error::{Result, StyleCutError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

pub fn recommendation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "name": { "type": "STRING" },
            "description": { "type": "STRING" },
            "whyItSuits": { "type": "STRING" },
            "maintenanceLevel": {
                "type": "STRING",
                "enum": MaintenanceLevel::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>()
            },
            "stylingTips": { "type": "ARRAY", "items": { "type": "STRING" } },
            "products": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "id", "name", "description", "whyItSuits",
            "maintenanceLevel", "stylingTips", "products"
        ]
    })
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {
                "type": "OBJECT",
                "properties": {
                    "faceShape": { "type": "STRING" },
                    "faceShapeDescription": { "type": "STRING" },
                    "features": {
                        "type": "OBJECT",
                        "properties": {
                            "jawline": { "type": "STRING" },
                            "forehead": { "type": "STRING" },
                            "cheekbones": { "type": "STRING" }
                        },
                        "required": ["jawline", "forehead", "cheekbones"]
                    },
                    "detectedHairType": { "type": "STRING" },
                    "skinTone": { "type": "STRING" },
                    "confidenceScore": {
                        "type": "NUMBER",
                        "description": "Confidence score between 0 and 100"
                    }
                },
                "required": [
                    "faceShape", "faceShapeDescription", "features",
                    "detectedHairType", "skinTone", "confidenceScore"
                ]
            },
            "recommendations": {
                "type": "ARRAY",
                "items": recommendation_schema()
            }
        },
        "required": ["analysis", "recommendations"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFeatures {
    jawline: String,
    forehead: String,
    cheekbones: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    face_shape: String,
    face_shape_description: String,
    features: WireFeatures,
    detected_hair_type: String,
    skin_tone: String,
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecommendation {
    #[serde(default)]
    id: String,
    name: String,
    description: String,
    why_it_suits: String,
    maintenance_level: MaintenanceLevel,
    #[serde(default)]
    styling_tips: Vec<String>,
    #[serde(default)]
    products: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    analysis: WireAnalysis,
    recommendations: Vec<WireRecommendation>,
}

/// 模型有時會把 JSON 包在 ```json 區塊裡
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn clamp_confidence(score: f64) -> Result<f64> {
    if !score.is_finite() {
        return Err(StyleCutError::analysis(format!(
            "confidenceScore is not a finite number: {}",
            score
        )));
    }
    if !(0.0..=100.0).contains(&score) {
        tracing::warn!("⚠️ confidenceScore {} outside [0,100], clamping", score);
    }
    Ok(score.clamp(0.0, 100.0))
}

fn non_blank(field: &str, value: String) -> std::result::Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("field '{}' is empty", field));
    }
    Ok(trimmed.to_string())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn into_recommendation(wire: WireRecommendation) -> std::result::Result<HairstyleRecommendation, String> {
    Ok(HairstyleRecommendation {
        id: wire.id.trim().to_string(),
        name: non_blank("name", wire.name)?,
        description: wire.description.trim().to_string(),
        why_it_suits: non_blank("whyItSuits", wire.why_it_suits)?,
        maintenance_level: wire.maintenance_level,
        styling_tips: clean_list(wire.styling_tips),
        products: clean_list(wire.products),
    })
}

pub fn parse_analysis(text: &str) -> Result<AnalysisResult> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(StyleCutError::analysis("backend returned an empty response"));
    }

    let envelope: WireEnvelope = serde_json::from_str(body)
        .map_err(|e| StyleCutError::analysis(format!("response does not match schema: {}", e)))?;

    if envelope.recommendations.is_empty() {
        return Err(StyleCutError::analysis("response contains no recommendations"));
    }

    let wire = envelope.analysis;
    let analysis = FaceAnalysis {
        face_shape: non_blank("faceShape", wire.face_shape).map_err(StyleCutError::analysis)?,
        face_shape_description: wire.face_shape_description.trim().to_string(),
        features: FacialFeatures {
            jawline: wire.features.jawline,
            forehead: wire.features.forehead,
            cheekbones: wire.features.cheekbones,
        },
        detected_hair_type: wire.detected_hair_type,
        skin_tone: wire.skin_tone,
        confidence_score: clamp_confidence(wire.confidence_score)?,
    };

    let mut seen = HashSet::new();
    let mut recommendations = Vec::with_capacity(envelope.recommendations.len());
    for (index, item) in envelope.recommendations.into_iter().enumerate() {
        let mut rec = into_recommendation(item).map_err(|reason| {
            StyleCutError::analysis(format!("recommendation {} is malformed: {}", index, reason))
        })?;
        if rec.id.is_empty() || seen.contains(&rec.id) {
            rec.id = fresh_recommendation_id("style");
        }
        seen.insert(rec.id.clone());
        recommendations.push(rec);
    }

    Ok(AnalysisResult {
        analysis,
        recommendations,
    })
}

pub fn parse_recommendation(text: &str) -> Result<HairstyleRecommendation> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(StyleCutError::customization("backend returned an empty response"));
    }

    let wire: WireRecommendation = serde_json::from_str(body).map_err(|e| {
        StyleCutError::customization(format!("response does not match schema: {}", e))
    })?;

    into_recommendation(wire).map_err(StyleCutError::customization)
}

use crate::utils::error::{Result, StyleCutError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    #[default]
    Neutral,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Masculine, Gender::Feminine, Gender::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthPreference {
    Short,
    #[default]
    Medium,
    Long,
    Any,
}

impl LengthPreference {
    pub const ALL: [LengthPreference; 4] = [
        LengthPreference::Short,
        LengthPreference::Medium,
        LengthPreference::Long,
        LengthPreference::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthPreference::Short => "short",
            LengthPreference::Medium => "medium",
            LengthPreference::Long => "long",
            LengthPreference::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StyleCategory {
    Professional,
    Casual,
    #[default]
    Trendy,
    Edgy,
    Classic,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 5] = [
        StyleCategory::Professional,
        StyleCategory::Casual,
        StyleCategory::Trendy,
        StyleCategory::Edgy,
        StyleCategory::Classic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleCategory::Professional => "professional",
            StyleCategory::Casual => "casual",
            StyleCategory::Trendy => "trendy",
            StyleCategory::Edgy => "edgy",
            StyleCategory::Classic => "classic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacialHair {
    #[default]
    None,
    CleanShave,
    Stubble,
    FullBeard,
    Goatee,
    Mustache,
}

impl FacialHair {
    pub const ALL: [FacialHair; 6] = [
        FacialHair::None,
        FacialHair::CleanShave,
        FacialHair::Stubble,
        FacialHair::FullBeard,
        FacialHair::Goatee,
        FacialHair::Mustache,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacialHair::None => "none",
            FacialHair::CleanShave => "clean_shave",
            FacialHair::Stubble => "stubble",
            FacialHair::FullBeard => "full_beard",
            FacialHair::Goatee => "goatee",
            FacialHair::Mustache => "mustache",
        }
    }

    pub fn is_specified(&self) -> bool {
        !matches!(self, FacialHair::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceLevel {
    Low,
    Medium,
    High,
}

impl MaintenanceLevel {
    pub const ALL: [MaintenanceLevel; 3] = [
        MaintenanceLevel::Low,
        MaintenanceLevel::Medium,
        MaintenanceLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceLevel::Low => "Low",
            MaintenanceLevel::Medium => "Medium",
            MaintenanceLevel::High => "High",
        }
    }
}

fn parse_choice<T: Copy>(
    field: &str,
    value: &str,
    all: &[T],
    as_str: impl Fn(&T) -> &'static str,
) -> Result<T> {
    let trimmed = value.trim();
    all.iter()
        .find(|choice| as_str(*choice) == trimmed)
        .copied()
        .ok_or_else(|| {
            let allowed: Vec<&str> = all.iter().map(&as_str).collect();
            StyleCutError::validation(format!(
                "unknown {} '{}', expected one of: {}",
                field,
                value,
                allowed.join(", ")
            ))
        })
}

impl FromStr for Gender {
    type Err = StyleCutError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("gender", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for LengthPreference {
    type Err = StyleCutError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("length preference", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for StyleCategory {
    type Err = StyleCutError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("style category", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for FacialHair {
    type Err = StyleCutError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("facial hair", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for MaintenanceLevel {
    type Err = StyleCutError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("maintenance level", s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LengthPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FacialHair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MaintenanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 使用者選擇的風格偏好，每次分析時取快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub gender: Gender,
    pub length_preference: LengthPreference,
    pub style_category: StyleCategory,
    pub facial_hair: FacialHair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
        }
    }

    /// 接受 "image/jpeg"、"image/jpg" 以及簡寫 "jpeg" 等寫法
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let subtype = normalized.strip_prefix("image/").unwrap_or(&normalized);
        match subtype {
            "jpeg" | "jpg" | "pjpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            "webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已驗證、可直接送出的照片（只存在於記憶體中）
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime: ImageMime,
    pub data: Vec<u8>,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.to_base64())
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacialFeatures {
    pub jawline: String,
    pub forehead: String,
    pub cheekbones: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnalysis {
    pub face_shape: String,
    pub face_shape_description: String,
    pub features: FacialFeatures,
    pub detected_hair_type: String,
    pub skin_tone: String,
    /// 0 到 100 之間
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HairstyleRecommendation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub why_it_suits: String,
    pub maintenance_level: MaintenanceLevel,
    pub styling_tips: Vec<String>,
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: FaceAnalysis,
    pub recommendations: Vec<HairstyleRecommendation>,
}

impl AnalysisResult {
    pub fn find(&self, id: &str) -> Option<&HairstyleRecommendation> {
        self.recommendations.iter().find(|rec| rec.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// 插入到最前面，其餘順序不變；id 空白或重複時重新產生
    pub fn prepend(&mut self, mut recommendation: HairstyleRecommendation) -> &HairstyleRecommendation {
        if recommendation.id.trim().is_empty() || self.contains_id(&recommendation.id) {
            recommendation.id = fresh_recommendation_id("custom");
        }
        self.recommendations.insert(0, recommendation);
        &self.recommendations[0]
    }
}

pub fn fresh_recommendation_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// 試穿結果圖片，不做快取
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedImage {
    pub const DEFAULT_MIME: &'static str = "image/png";

    pub fn new(mime_type: Option<String>, data: Vec<u8>) -> Self {
        let mime_type = mime_type
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_MIME.to_string());
        Self {
            mime_type,
            data,
            created_at: Utc::now(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.data))
    }

    pub fn file_extension(&self) -> &'static str {
        match ImageMime::parse(&self.mime_type) {
            Some(ImageMime::Jpeg) => "jpg",
            Some(ImageMime::Webp) => "webp",
            _ => "png",
        }
    }
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation(id: &str, name: &str) -> HairstyleRecommendation {
        HairstyleRecommendation {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            why_it_suits: "Balances the jawline".to_string(),
            maintenance_level: MaintenanceLevel::Medium,
            styling_tips: vec!["Blow dry forward".to_string()],
            products: vec!["Matte clay".to_string()],
        }
    }

    fn result_with(ids: &[&str]) -> AnalysisResult {
        AnalysisResult {
            analysis: FaceAnalysis {
                face_shape: "Oval".to_string(),
                face_shape_description: "Balanced proportions".to_string(),
                features: FacialFeatures {
                    jawline: "Soft".to_string(),
                    forehead: "Medium".to_string(),
                    cheekbones: "High".to_string(),
                },
                detected_hair_type: "Wavy".to_string(),
                skin_tone: "Olive".to_string(),
                confidence_score: 88.0,
            },
            recommendations: ids.iter().map(|id| recommendation(id, id)).collect(),
        }
    }

    #[test]
    fn test_default_preferences() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.gender, Gender::Neutral);
        assert_eq!(prefs.length_preference, LengthPreference::Medium);
        assert_eq!(prefs.style_category, StyleCategory::Trendy);
        assert_eq!(prefs.facial_hair, FacialHair::None);
    }

    #[test]
    fn test_enum_strings_parse_back() {
        for hair in FacialHair::ALL {
            assert_eq!(hair.as_str().parse::<FacialHair>().unwrap(), hair);
        }
        assert_eq!("full_beard".parse::<FacialHair>().unwrap(), FacialHair::FullBeard);
        assert!("beardy".parse::<FacialHair>().is_err());
        assert!("Masculine".parse::<Gender>().is_err());
    }

    #[test]
    fn test_preferences_serialize_with_wire_names() {
        let prefs = UserPreferences {
            gender: Gender::Masculine,
            length_preference: LengthPreference::Short,
            style_category: StyleCategory::Classic,
            facial_hair: FacialHair::FullBeard,
        };
        let json = serde_json::to_value(prefs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "gender": "masculine",
                "lengthPreference": "short",
                "styleCategory": "classic",
                "facialHair": "full_beard"
            })
        );
    }

    #[test]
    fn test_image_mime_parse() {
        assert_eq!(ImageMime::parse("image/jpeg"), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::parse("JPG"), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::parse("image/webp"), Some(ImageMime::Webp));
        assert_eq!(ImageMime::parse("image/gif"), None);
    }

    #[test]
    fn test_encoded_image_data_url() {
        let image = EncodedImage {
            mime: ImageMime::Png,
            data: vec![1, 2, 3],
        };
        assert_eq!(image.data_url(), "data:image/png;base64,AQID");
        assert_eq!(format!("{:?}", image), "EncodedImage { mime: Png, bytes: 3 }");
    }

    #[test]
    fn test_prepend_keeps_prior_order() {
        let mut result = result_with(&["a", "b", "c"]);
        result.prepend(recommendation("custom-1", "Textured Fringe"));

        let ids: Vec<&str> = result.recommendations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["custom-1", "a", "b", "c"]);
    }

    #[test]
    fn test_prepend_rekeys_colliding_or_blank_ids() {
        let mut result = result_with(&["a", "b"]);
        let id = result.prepend(recommendation("a", "Duplicate")).id.clone();
        assert_ne!(id, "a");
        assert!(id.starts_with("custom-"));

        let blank = result.prepend(recommendation("  ", "Blank")).id.clone();
        assert!(!blank.trim().is_empty());
        assert_eq!(result.recommendations.len(), 4);
        assert_eq!(result.recommendations[2].id, "a");
    }

    #[test]
    fn test_generated_image_defaults_to_png() {
        let image = GeneratedImage::new(None, vec![0xAB]);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.file_extension(), "png");

        let jpeg = GeneratedImage::new(Some("image/jpeg".to_string()), vec![0xAB]);
        assert_eq!(jpeg.file_extension(), "jpg");
        assert!(jpeg.data_url().starts_with("data:image/jpeg;base64,"));
    }
}

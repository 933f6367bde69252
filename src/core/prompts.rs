use crate::domain::model::{FaceAnalysis, FacialHair, Gender, UserPreferences};

pub const RECOMMENDATION_COUNT: usize = 4;

pub const FACE_SHAPES: [&str; 6] = ["Oval", "Round", "Square", "Heart", "Diamond", "Oblong"];

/// 將內部的鬍鬚選項轉成自然語言描述
pub fn facial_hair_descriptor(facial_hair: FacialHair) -> Option<&'static str> {
    match facial_hair {
        FacialHair::None => None,
        FacialHair::CleanShave => Some("clean shaven face, no beard"),
        FacialHair::FullBeard => Some("full groomed beard"),
        FacialHair::Goatee => Some("goatee beard"),
        FacialHair::Mustache => Some("mustache"),
        FacialHair::Stubble => Some("italian style stubble beard"),
    }
}

pub fn facial_hair_clause(facial_hair: FacialHair) -> Option<String> {
    if !facial_hair.is_specified() {
        return None;
    }
    Some(format!(
        "Also, the user specifically prefers this facial hair style: {}. \
         Ensure the recommendations work well with this facial hair.",
        facial_hair
    ))
}

pub fn analysis_prompt(prefs: &UserPreferences) -> String {
    let mut lines = vec![
        "Analyze the uploaded face image.".to_string(),
        format!(
            "1. Identify the face shape ({}).",
            FACE_SHAPES.join(", ")
        ),
        "2. Analyze key facial features (Jawline, Forehead, Cheekbones).".to_string(),
        "3. Detect current hair type and skin tone.".to_string(),
        format!(
            "4. Based on the analysis and the user's preference for {} styles, {} length, \
             and {} look, recommend {} specific hairstyles.",
            prefs.gender, prefs.length_preference, prefs.style_category, RECOMMENDATION_COUNT
        ),
    ];

    if let Some(clause) = facial_hair_clause(prefs.facial_hair) {
        lines.push(clause);
    }

    lines.push(
        "Give every recommendation a unique id. Report confidenceScore as a number between 0 and 100."
            .to_string(),
    );
    lines.push("Return the result in strictly structured JSON format.".to_string());
    lines.join("\n")
}

pub fn custom_style_prompt(description: &str, analysis: &FaceAnalysis, prefs: &UserPreferences) -> String {
    [
        format!(
            "The user wants a specific custom hairstyle described as: \"{}\".",
            description.trim()
        ),
        format!("The user's face shape is {}.", analysis.face_shape),
        format!("The user prefers {} styles.", prefs.gender),
        String::new(),
        "Create a detailed recommendation object for this specific custom style.".to_string(),
        "Explain honestly and politely in the 'whyItSuits' field whether this custom style \
         suits their face shape or not. Do not claim it suits them if it does not."
            .to_string(),
    ]
    .join("\n")
}

pub fn try_on_prompt(style_name: &str, gender: Gender, facial_hair: FacialHair) -> String {
    let mut lines = vec![format!(
        "Edit this photo to give the person a {} hairstyle.",
        style_name.trim()
    )];

    if let Some(descriptor) = facial_hair_descriptor(facial_hair) {
        lines.push(format!("Ensure the person has a {}.", descriptor));
    }

    lines.push("Keep the person's face, skin tone, and background exactly the same.".to_string());
    lines.push(
        "Only change the hair (and facial hair if specified). Make it look photorealistic and high quality."
            .to_string(),
    );
    lines.push(format!("The person presents as {}.", gender));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FacialFeatures, LengthPreference, StyleCategory};

    fn analysis() -> FaceAnalysis {
        FaceAnalysis {
            face_shape: "Square".to_string(),
            face_shape_description: "Strong angular jaw".to_string(),
            features: FacialFeatures {
                jawline: "Angular".to_string(),
                forehead: "Broad".to_string(),
                cheekbones: "Flat".to_string(),
            },
            detected_hair_type: "Straight".to_string(),
            skin_tone: "Fair".to_string(),
            confidence_score: 91.0,
        }
    }

    #[test]
    fn test_analysis_prompt_embeds_preferences_verbatim() {
        for gender in Gender::ALL {
            for length in LengthPreference::ALL {
                for style in StyleCategory::ALL {
                    for facial_hair in FacialHair::ALL {
                        let prefs = UserPreferences {
                            gender,
                            length_preference: length,
                            style_category: style,
                            facial_hair,
                        };
                        let prompt = analysis_prompt(&prefs);
                        assert!(prompt.contains(&format!("preference for {} styles", gender)));
                        assert!(prompt.contains(&format!("{} length", length)));
                        assert!(prompt.contains(&format!("{} look", style)));
                        assert_eq!(
                            prompt.contains("facial hair style"),
                            facial_hair != FacialHair::None,
                            "facial hair clause mismatch for {}",
                            facial_hair
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_analysis_prompt_names_facial_hair_choice() {
        let prefs = UserPreferences {
            facial_hair: FacialHair::FullBeard,
            ..UserPreferences::default()
        };
        let prompt = analysis_prompt(&prefs);
        assert!(prompt.contains("facial hair style: full_beard"));
        assert!(prompt.contains("recommend 4 specific hairstyles"));
    }

    #[test]
    fn test_try_on_prompt_maps_stubble() {
        let prompt = try_on_prompt("Textured Crop", Gender::Masculine, FacialHair::Stubble);
        assert!(prompt.contains("Ensure the person has a italian style stubble beard."));
        assert!(prompt.contains("Textured Crop hairstyle"));
        assert!(prompt.contains("The person presents as masculine."));
    }

    #[test]
    fn test_try_on_prompt_without_facial_hair() {
        let prompt = try_on_prompt("Long Layers", Gender::Feminine, FacialHair::None);
        assert!(!prompt.contains("Ensure the person has"));
        assert!(!prompt.to_lowercase().contains("beard"));
        assert!(prompt.contains("Keep the person's face, skin tone, and background exactly the same."));
    }

    #[test]
    fn test_every_facial_hair_choice_has_descriptor() {
        for facial_hair in FacialHair::ALL {
            assert_eq!(
                facial_hair_descriptor(facial_hair).is_some(),
                facial_hair.is_specified()
            );
        }
    }

    #[test]
    fn test_custom_style_prompt_asks_for_honest_fit() {
        let prompt = custom_style_prompt(
            "  Bob cut with purple highlights ",
            &analysis(),
            &UserPreferences::default(),
        );
        assert!(prompt.contains("described as: \"Bob cut with purple highlights\""));
        assert!(prompt.contains("face shape is Square"));
        assert!(prompt.contains("prefers neutral styles"));
        assert!(prompt.contains("whyItSuits"));
        assert!(prompt.contains("or not"));
    }
}

use crate::domain::model::GeneratedImage;
use url::form_urlencoded;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// 地圖上搜尋擅長該髮型的沙龍
pub fn salon_search_url(style_name: &str) -> String {
    let query = format!("hair salon specialized in {}", style_name.trim());
    let encoded = form_urlencoded::Serializer::new(String::new())
        .append_pair("api", "1")
        .append_pair("query", &query)
        .finish();
    format!("{}?{}", MAPS_SEARCH_URL, encoded)
}

pub fn share_title(style_name: &str) -> String {
    format!("My new {}", style_name.trim())
}

pub fn share_caption(style_name: &str) -> String {
    format!("Checking out this {} look from StyleCut AI!", style_name.trim())
}

/// 分享時附加的檔名
pub fn share_file_name(image: &GeneratedImage) -> String {
    format!("my-new-style.{}", image.file_extension())
}

/// 儲存到本機的檔名，依髮型 id 區分；非安全字元一律換成 '-'
pub fn save_file_name(style_id: &str, image: &GeneratedImage) -> String {
    let safe_id: String = style_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("stylecut-{}.{}", safe_id, image.file_extension())
}

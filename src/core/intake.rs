use crate::domain::model::{EncodedImage, ImageMime};
use crate::utils::error::{Result, StyleCutError};
use std::path::Path;

/// 上傳照片上限：5MB
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// 驗證照片並轉成可送出的格式，失敗時不應發出任何網路請求
pub fn encode(data: Vec<u8>, declared_mime: Option<&str>) -> Result<EncodedImage> {
    encode_with_limit(data, declared_mime, MAX_IMAGE_BYTES)
}

pub fn encode_with_limit(
    data: Vec<u8>,
    declared_mime: Option<&str>,
    max_bytes: usize,
) -> Result<EncodedImage> {
    if data.len() > max_bytes {
        return Err(StyleCutError::validation(format!(
            "image is {} bytes, limit is {} bytes",
            data.len(),
            max_bytes
        )));
    }

    if data.is_empty() {
        return Err(StyleCutError::validation("image data is empty or unreadable"));
    }

    let declared = match declared_mime {
        Some(raw) => Some(ImageMime::parse(raw).ok_or_else(|| {
            StyleCutError::validation(format!(
                "unsupported image type '{}', expected jpeg, png or webp",
                raw
            ))
        })?),
        None => None,
    };

    let sniffed = sniff_mime(&data).ok_or_else(|| {
        StyleCutError::validation("image data is unreadable or not a jpeg, png or webp file")
    })?;

    if let Some(declared) = declared {
        if declared != sniffed {
            return Err(StyleCutError::validation(format!(
                "file declared as {} but contains {} data",
                declared, sniffed
            )));
        }
    }

    tracing::debug!("📷 Accepted {} photo ({} bytes)", sniffed, data.len());

    Ok(EncodedImage {
        mime: sniffed,
        data,
    })
}

pub fn sniff_mime(data: &[u8]) -> Option<ImageMime> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageMime::Jpeg)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageMime::Png)
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some(ImageMime::Webp)
    } else {
        None
    }
}

/// 依副檔名推測 MIME，未知副檔名返回原字串交給 encode 拒絕
pub fn mime_from_path(path: &str) -> Option<String> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();

    Some(match ImageMime::parse(&extension) {
        Some(mime) => mime.as_str().to_string(),
        None => extension,
    })
}

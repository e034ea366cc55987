use base64::{engine::general_purpose, Engine as _};

const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" || brand == b"mif1" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// Encodes image bytes as a `data:` URL suitable for an `image_url` content part.
pub fn image_data_url(data: &[u8]) -> String {
    let mime_type = detect_mime_type(data)
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string());
    let encoded = general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{}", mime_type, encoded)
}

#[cfg(test)]
pub(crate) const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png_signature() {
        assert_eq!(detect_mime_type(TINY_PNG).as_deref(), Some("image/png"));
    }

    #[test]
    fn detects_heif_brand() {
        let mut data = vec![0x00, 0x00, 0x00, 0x18];
        data.extend_from_slice(b"ftypheic");
        data.extend_from_slice(&[0u8; 8]);
        assert_eq!(detect_mime_type(&data).as_deref(), Some("image/heic"));
    }

    #[test]
    fn unknown_bytes_fall_back_to_jpeg_data_url() {
        let url = image_data_url(b"not really an image");
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn png_data_url_carries_detected_mime() {
        let url = image_data_url(TINY_PNG);
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}

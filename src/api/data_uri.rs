/// Data-URI codec for the conversion wire contract
///
/// Images travel to and from the service as `data:<mime>;base64,<payload>`
/// strings inside JSON bodies. Encoding is exact; decoding mirrors the
/// service's own tolerance: it splits on `base64,` wherever that marker
/// appears and assumes JPEG when a bare payload arrives without a header.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::state::MediaType;

/// Why a data URI could not be turned back into image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    /// The header names a media type outside the JPEG/PNG set
    #[error("unhandled media type '{0}' in data URI")]
    UnsupportedMediaType(String),

    /// The payload is not decodable base64, or decodes to nothing
    #[error("invalid image payload: {0}")]
    InvalidPayload(String),
}

/// Encode image bytes as a data URI with the given media type.
pub fn encode(bytes: &[u8], media_type: MediaType) -> String {
    format!("data:{};base64,{}", media_type.mime(), BASE64.encode(bytes))
}

/// Decode a data URI (or bare base64 payload) back into bytes and type.
///
/// The service always renders JPEG, so a payload with no `data:` header
/// is treated as JPEG rather than rejected - the same split-on-`base64,`
/// tolerance the service applies to uploads.
pub fn decode(uri: &str) -> Result<(Vec<u8>, MediaType), DataUriError> {
    let trimmed = uri.trim();
    let (media_type, payload) = match trimmed.split_once("base64,") {
        Some((header, payload)) => {
            let mime = header
                .strip_prefix("data:")
                .unwrap_or(header)
                .trim_end_matches(';');
            let media_type = MediaType::from_mime(mime)
                .ok_or_else(|| DataUriError::UnsupportedMediaType(mime.to_string()))?;
            (media_type, payload)
        }
        None => (MediaType::Jpeg, trimmed),
    };

    let bytes = BASE64
        .decode(payload.as_bytes())
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;
    if bytes.is_empty() {
        return Err(DataUriError::InvalidPayload("empty image payload".to_string()));
    }
    Ok((bytes, media_type))
}

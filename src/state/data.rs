/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the conversion gateway and the UI layer: the selected source
/// image, the request pairing sent to the service, and the
/// rendered result that comes back.

use super::style::Style;

/// MIME type reported when the content matches no known image format.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Media types the client accepts for upload.
///
/// This is the configured allow-list: anything else (GIF, WebP, plain
/// text, ...) is rejected before a source image is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
}

impl MediaType {
    /// Match a declared MIME string against the allow-list.
    ///
    /// Accepts the legacy alias `image/jpg` alongside the canonical
    /// `image/jpeg`; the service treats both as JPEG.
    pub fn from_mime(mime: &str) -> Option<MediaType> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            _ => None,
        }
    }

    /// Canonical MIME string, used inside data URIs.
    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }

    /// File extension for saved results.
    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Jpeg => "jpg",
            MediaType::Png => "png",
        }
    }
}

/// Sniff the media type of raw file content from its magic numbers.
///
/// Nothing upstream declares a type for a file picked off disk, so the
/// sniffed MIME plays that role. Formats the `image` crate recognizes
/// report their real name (so a GIF is rejected *as* `image/gif`);
/// anything else falls back to `application/octet-stream`.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MIME)
}

/// The image the user selected for conversion.
///
/// Replaced wholesale on a new selection and never mutated afterwards;
/// a successful conversion produces a separate ConversionResult and
/// leaves these bytes bit-identical to the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Raw file content, exactly as read from disk
    pub bytes: Vec<u8>,
    /// Sniffed media type, already checked against the allow-list
    pub media_type: MediaType,
}

/// The (image, style) pairing captured at the moment of submission.
///
/// Exists only for the duration of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub image: SourceImage,
    pub style: Style,
}

/// The rendered image returned by the conversion service.
///
/// At most one result is live at a time; a new image selection discards
/// it and a newly successful conversion replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Decoded image content, ready to preview or save
    pub bytes: Vec<u8>,
    /// Media type declared by the service in its data URI
    pub media_type: MediaType,
}

/// Session state controller for one conversion session
///
/// Owns the four pieces of session state (source image, style choice,
/// processing flag, conversion result) and enforces every transition
/// between them. Pure data and transitions: no network calls and no
/// widgets, so the whole state machine can be tested on its own. The
/// shell in main.rs routes user events into these methods and hands the
/// returned request to the conversion gateway.

use chrono::Utc;
use thiserror::Error;

use super::data::{ConversionRequest, ConversionResult, MediaType, SourceImage};
use super::style::Style;

/// Validation failures detected locally, before any network activity.
///
/// Every variant leaves the session exactly as it was; the Display
/// string is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The selected file is not on the JPEG/PNG allow-list
    #[error("unsupported file type ({media_type}) - choose a JPEG or PNG image")]
    InvalidMediaType { media_type: String },

    /// A style identifier outside the supported set
    #[error("unknown style '{style_id}'")]
    UnknownStyle { style_id: String },

    /// Convert requested without both an image and a style
    #[error("select an image and a style first")]
    MissingInput,

    /// Convert requested while a conversion is already running
    #[error("a conversion is already running")]
    AlreadyInFlight,
}

/// The session state machine.
///
/// Transitions: Empty -> ImageSelected -> Ready -> Converting -> Ready
/// (with or without a result). Only `Converting` rejects a new
/// submission; image and style selection are accepted in every state,
/// and a new image always discards the displayed result.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Currently selected source image, if any
    source: Option<SourceImage>,
    /// Currently selected style; persists across conversions until changed
    style: Option<Style>,
    /// True while exactly one conversion request is in flight
    processing: bool,
    /// The most recent successfully rendered result still worth showing
    result: Option<ConversionResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a new source image.
    ///
    /// `declared_mime` is checked against the allow-list first; a
    /// rejected file changes nothing (the previous image, style and
    /// result all stay put). On success the new image replaces the old
    /// one wholesale and any displayed result is discarded, since it no
    /// longer corresponds to the visible source.
    pub fn select_image(
        &mut self,
        bytes: Vec<u8>,
        declared_mime: &str,
    ) -> Result<(), SessionError> {
        let media_type = MediaType::from_mime(declared_mime).ok_or_else(|| {
            SessionError::InvalidMediaType {
                media_type: declared_mime.to_string(),
            }
        })?;

        self.source = Some(SourceImage { bytes, media_type });
        self.result = None;
        Ok(())
    }

    /// Select a style by its wire identifier.
    ///
    /// Unknown identifiers are rejected without touching anything.
    /// Deliberately does NOT clear an existing result: switching style
    /// leaves the previous render visible until a new conversion
    /// completes.
    pub fn select_style(&mut self, style_id: &str) -> Result<(), SessionError> {
        let style = Style::from_id(style_id).ok_or_else(|| SessionError::UnknownStyle {
            style_id: style_id.to_string(),
        })?;

        self.style = Some(style);
        Ok(())
    }

    /// Gate a new conversion attempt and capture the request pairing.
    ///
    /// This is the only place the processing flag is raised: a plain
    /// check-and-set, not a queue. A second attempt while one request is
    /// outstanding is rejected, never deferred. The previous result stays
    /// visible while the new request runs.
    pub fn begin_conversion(&mut self) -> Result<ConversionRequest, SessionError> {
        if self.processing {
            return Err(SessionError::AlreadyInFlight);
        }

        let (Some(image), Some(style)) = (self.source.as_ref(), self.style) else {
            return Err(SessionError::MissingInput);
        };

        let request = ConversionRequest {
            image: image.clone(),
            style,
        };
        self.processing = true;
        Ok(request)
    }

    /// Apply the outcome of the in-flight conversion.
    ///
    /// The processing flag always clears here, success or failure - a
    /// flag left stuck would block every later attempt. On success the
    /// result is replaced wholesale; on failure the previous result (if
    /// any) stays visible and the error is handed back for display.
    pub fn finish_conversion<E>(
        &mut self,
        outcome: Result<ConversionResult, E>,
    ) -> Result<(), E> {
        self.processing = false;
        let result = outcome?;
        self.result = Some(result);
        Ok(())
    }

    /// Suggested filename for saving the current result:
    /// `illustrated_<style>_<timestamp>.<ext>`, with a millisecond UTC
    /// timestamp. Uniqueness is best-effort only. None when there is no
    /// result to save.
    pub fn download_file_name(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        let style = self.style?;
        Some(format!(
            "illustrated_{}_{}.{}",
            style.id(),
            Utc::now().timestamp_millis(),
            result.media_type.extension(),
        ))
    }

    /// Caption for the share flow, naming the style that produced the
    /// current result. None when there is nothing to share.
    pub fn share_caption(&self) -> Option<String> {
        self.result.as_ref()?;
        let style = self.style?;
        Some(format!(
            "Turned my photo into {} with Image Illustrator! #ImageIllustrator",
            style.label(),
        ))
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn style(&self) -> Option<Style> {
        self.style
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    /// Whether the convert affordance should be enabled: both inputs
    /// present and nothing in flight. Mirrors the begin_conversion gate.
    pub fn can_convert(&self) -> bool {
        self.source.is_some() && self.style.is_some() && !self.processing
    }

    /// Whether the download/share affordances should be enabled.
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConvertError;

    fn rendered(bytes: &[u8]) -> ConversionResult {
        ConversionResult {
            bytes: bytes.to_vec(),
            media_type: MediaType::Jpeg,
        }
    }

    /// Session with a JPEG image and the anime style already selected.
    fn ready_session() -> Session {
        let mut session = Session::new();
        session
            .select_image(b"original jpeg bytes".to_vec(), "image/jpeg")
            .unwrap();
        session.select_style("anime").unwrap();
        session
    }

    #[test]
    fn test_select_image_stores_source() {
        let mut session = Session::new();
        session
            .select_image(b"photo".to_vec(), "image/png")
            .unwrap();

        let source = session.source().unwrap();
        assert_eq!(source.bytes, b"photo");
        assert_eq!(source.media_type, MediaType::Png);
    }

    #[test]
    fn test_select_image_rejects_disallowed_types() {
        let mut session = ready_session();
        let before = session.source().cloned();

        let err = session
            .select_image(b"GIF89a".to_vec(), "image/gif")
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidMediaType {
                media_type: "image/gif".to_string()
            }
        );
        assert!(err.to_string().contains("image/gif"));

        // Prior state untouched, message is the only side effect.
        assert_eq!(session.source().cloned(), before);
        assert_eq!(session.style(), Some(Style::Anime));

        let err = session
            .select_image(b"not an image".to_vec(), "application/octet-stream")
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidMediaType { .. }));
        assert_eq!(session.source().cloned(), before);
    }

    #[test]
    fn test_new_image_discards_displayed_result() {
        let mut session = ready_session();
        session.begin_conversion().unwrap();
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"render one")))
            .unwrap();
        assert!(session.has_result());

        session
            .select_image(b"second photo".to_vec(), "image/jpeg")
            .unwrap();

        // The result became stale the moment the source changed.
        assert!(!session.has_result());
        assert_eq!(session.source().unwrap().bytes, b"second photo");
        // Style selection survives the new image.
        assert_eq!(session.style(), Some(Style::Anime));
    }

    #[test]
    fn test_select_style_rejects_unknown_ids() {
        let mut session = ready_session();

        let err = session.select_style("cubism").unwrap_err();
        assert_eq!(
            err,
            SessionError::UnknownStyle {
                style_id: "cubism".to_string()
            }
        );
        assert_eq!(session.style(), Some(Style::Anime));
    }

    #[test]
    fn test_switching_style_keeps_result_visible() {
        let mut session = ready_session();
        session.begin_conversion().unwrap();
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"anime render")))
            .unwrap();

        session.select_style("sketch").unwrap();

        // The stale render stays up until a new conversion replaces it.
        assert_eq!(session.result().unwrap().bytes, b"anime render");
        assert_eq!(session.style(), Some(Style::Sketch));
    }

    #[test]
    fn test_submit_requires_both_inputs() {
        let mut session = Session::new();
        assert_eq!(
            session.begin_conversion().unwrap_err(),
            SessionError::MissingInput
        );

        session
            .select_image(b"photo".to_vec(), "image/jpeg")
            .unwrap();
        assert_eq!(
            session.begin_conversion().unwrap_err(),
            SessionError::MissingInput
        );
        // The gate never raised the flag, so no request was started.
        assert!(!session.is_processing());

        let mut style_only = Session::new();
        style_only.select_style("oil").unwrap();
        assert_eq!(
            style_only.begin_conversion().unwrap_err(),
            SessionError::MissingInput
        );
    }

    #[test]
    fn test_second_submit_rejected_while_in_flight() {
        let mut session = ready_session();
        let request = session.begin_conversion().unwrap();
        assert!(session.is_processing());

        // Re-entrant submit is rejected, not queued...
        assert_eq!(
            session.begin_conversion().unwrap_err(),
            SessionError::AlreadyInFlight
        );

        // ...and the first attempt still settles normally.
        assert_eq!(request.style, Style::Anime);
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"render")))
            .unwrap();
        assert!(!session.is_processing());
        assert_eq!(session.result().unwrap().bytes, b"render");
    }

    #[test]
    fn test_successful_conversion() {
        let mut session = ready_session();
        let request = session.begin_conversion().unwrap();
        assert_eq!(request.image.media_type, MediaType::Jpeg);
        assert_eq!(request.style, Style::Anime);

        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"anime render")))
            .unwrap();

        assert!(!session.is_processing());
        assert_eq!(session.result(), Some(&rendered(b"anime render")));
    }

    #[test]
    fn test_failure_preserves_previous_result() {
        let mut session = Session::new();
        session
            .select_image(b"png bytes".to_vec(), "image/png")
            .unwrap();
        session.select_style("sketch").unwrap();

        // First conversion succeeds and leaves a result on screen.
        session.begin_conversion().unwrap();
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"first render")))
            .unwrap();

        // Second conversion fails at the service.
        session.begin_conversion().unwrap();
        let err = session
            .finish_conversion(Err::<ConversionResult, _>(ConvertError::Service(
                "rate limited".to_string(),
            )))
            .unwrap_err();

        assert!(!session.is_processing());
        assert_eq!(session.result().unwrap().bytes, b"first render");
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_source_bytes_survive_conversion() {
        let original = b"original jpeg bytes".to_vec();
        let mut session = ready_session();

        session.begin_conversion().unwrap();
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"render")))
            .unwrap();

        // Only the result slot is touched by the service; the source
        // stays bit-identical to the selected file.
        assert_eq!(session.source().unwrap().bytes, original);
        assert_eq!(session.result().unwrap().bytes, b"render");
    }

    #[test]
    fn test_download_name_requires_result() {
        let mut session = ready_session();
        assert_eq!(session.download_file_name(), None);

        session.begin_conversion().unwrap();
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"render")))
            .unwrap();

        let name = session.download_file_name().unwrap();
        assert!(name.starts_with("illustrated_anime_"), "got {name}");
        assert!(name.ends_with(".jpg"), "got {name}");
    }

    #[test]
    fn test_share_caption_requires_result() {
        let mut session = ready_session();
        assert_eq!(session.share_caption(), None);

        session.begin_conversion().unwrap();
        session
            .finish_conversion::<ConvertError>(Ok(rendered(b"render")))
            .unwrap();

        let caption = session.share_caption().unwrap();
        assert!(caption.contains("Anime"));
        assert!(caption.contains("#ImageIllustrator"));
    }

    #[test]
    fn test_convert_affordance_gating() {
        let mut session = Session::new();
        assert!(!session.can_convert());

        session
            .select_image(b"photo".to_vec(), "image/jpeg")
            .unwrap();
        assert!(!session.can_convert());

        session.select_style("watercolor").unwrap();
        assert!(session.can_convert());

        session.begin_conversion().unwrap();
        assert!(!session.can_convert());
    }
}

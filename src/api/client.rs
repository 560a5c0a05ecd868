/// Conversion service client
///
/// Wraps the single network exchange behind one conversion attempt:
/// encode the (image, style) pairing into the service's JSON contract,
/// POST it once to `/convert`, and normalize whatever comes back into a
/// ConversionResult or a ConvertError. No retries, no timeout of its own
/// (a transport-layer timeout surfaces as a Transport error), and no
/// state beyond the in-flight request.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::data_uri;
use crate::state::{ConversionRequest, ConversionResult, Style};

/// Default endpoint, matching the development server.
const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// Environment variable that overrides the endpoint.
const API_URL_VAR: &str = "ILLUSTRATOR_API_URL";

/// How a conversion attempt failed after it left the session gate.
///
/// Message enums must be Clone, so these carry message strings instead
/// of the underlying error values. The Display strings are shown to the
/// user and keep transport failures distinguishable from errors the
/// service itself reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// No response obtained at all
    #[error("could not reach the conversion service: {0}")]
    Transport(String),

    /// The service answered with a failure
    #[error("the conversion service rejected the request: {0}")]
    Service(String),

    /// The service claimed success but the body was unusable
    #[error("the conversion service returned an unusable response: {0}")]
    MalformedResponse(String),
}

/// Request body for POST /convert.
#[derive(Debug, Serialize)]
struct ConvertBody<'a> {
    image_data: &'a str,
    style: Style,
}

/// Success body. The service also sends a `status` field; only the
/// image matters here, and its absence is what makes a reply malformed.
#[derive(Debug, Deserialize)]
struct ConvertReply {
    processed_image: Option<String>,
}

/// Failure body.
#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// Client for the conversion endpoint.
#[derive(Debug, Clone)]
pub struct ConvertClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ConvertClient {
    /// Create a client for the given API base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client from the environment.
    ///
    /// `ILLUSTRATOR_API_URL` overrides the development default; an
    /// unparsable override fails construction rather than being ignored.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let raw =
            std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Ok(Self::new(Url::parse(&raw)?))
    }

    /// The page a share link should reference: the service origin, which
    /// is where the hosted app lives.
    pub fn page_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/");
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    fn convert_url(&self) -> String {
        format!("{}/convert", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Perform exactly one conversion exchange.
    ///
    /// The caller's processing flag stays raised until this settles, so
    /// everything here maps onto one of the three ConvertError variants
    /// rather than being retried or swallowed.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionResult, ConvertError> {
        let image_data = data_uri::encode(&request.image.bytes, request.image.media_type);
        let body = ConvertBody {
            image_data: &image_data,
            style: request.style,
        };

        tracing::info!(
            style = request.style.id(),
            source_bytes = request.image.bytes.len(),
            "submitting conversion request"
        );

        let response = self
            .http
            .post(self.convert_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| ConvertError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ConvertError::Transport(e.to_string()))?;

        if status.is_success() {
            decode_success_body(&text)
        } else {
            tracing::warn!(%status, "conversion service returned a failure");
            Err(decode_error_body(&text))
        }
    }
}

/// Normalize a 2xx body: decode the JSON envelope, then the data URI
/// inside it. Anything unusable is a MalformedResponse.
fn decode_success_body(body: &str) -> Result<ConversionResult, ConvertError> {
    let reply: ConvertReply = serde_json::from_str(body)
        .map_err(|e| ConvertError::MalformedResponse(e.to_string()))?;

    let uri = reply.processed_image.ok_or_else(|| {
        ConvertError::MalformedResponse("missing processed_image field".to_string())
    })?;

    let (bytes, media_type) =
        data_uri::decode(&uri).map_err(|e| ConvertError::MalformedResponse(e.to_string()))?;

    Ok(ConversionResult { bytes, media_type })
}

/// Normalize a non-2xx body: use the service's own message when it sent
/// one, otherwise report the failure as unexplained.
fn decode_error_body(body: &str) -> ConvertError {
    match serde_json::from_str::<ErrorReply>(body) {
        Ok(reply) => ConvertError::Service(reply.error),
        Err(_) => ConvertError::Service("unknown".to_string()),
    }
}

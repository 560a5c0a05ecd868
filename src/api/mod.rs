/// Conversion gateway module
///
/// This module handles the wire contract with the remote conversion
/// service:
/// - Encoding images as base64 data URIs (data_uri.rs)
/// - The HTTP client and response normalization (client.rs)

pub mod client;
pub mod data_uri;

pub use client::{ConvertClient, ConvertError};

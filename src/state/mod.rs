/// State management module
///
/// This module handles all session state, including:
/// - Shared data structures and the upload allow-list (data.rs)
/// - The closed set of supported styles (style.rs)
/// - The session state machine and its transition rules (session.rs)

pub mod data;
pub mod session;
pub mod style;

pub use data::{ConversionRequest, ConversionResult, MediaType, SourceImage};
pub use session::{Session, SessionError};
pub use style::Style;

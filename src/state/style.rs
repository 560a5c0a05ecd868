/// Illustration styles supported by the conversion service
///
/// The set is closed: the service only understands these four identifiers,
/// so free-form style strings are rejected before they ever reach the wire.

use serde::Serialize;
use std::fmt;

/// One of the named visual transformations the service can apply.
///
/// Serializes as its lowercase wire identifier (`anime`, `watercolor`,
/// `oil`, `sketch`) so request bodies can embed the enum directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Anime,
    Watercolor,
    Oil,
    Sketch,
}

impl Style {
    /// All styles, in pick-list order.
    pub const ALL: [Style; 4] = [Style::Anime, Style::Watercolor, Style::Oil, Style::Sketch];

    /// The wire identifier understood by the conversion endpoint.
    pub fn id(self) -> &'static str {
        match self {
            Style::Anime => "anime",
            Style::Watercolor => "watercolor",
            Style::Oil => "oil",
            Style::Sketch => "sketch",
        }
    }

    /// Human-readable label for the pick list and share captions.
    pub fn label(self) -> &'static str {
        match self {
            Style::Anime => "Anime",
            Style::Watercolor => "Watercolor",
            Style::Oil => "Oil Painting",
            Style::Sketch => "Sketch",
        }
    }

    /// Look up a style by its wire identifier.
    /// Returns None for anything outside the supported set.
    pub fn from_id(id: &str) -> Option<Style> {
        match id {
            "anime" => Some(Style::Anime),
            "watercolor" => Some(Style::Watercolor),
            "oil" => Some(Style::Oil),
            "sketch" => Some(Style::Sketch),
            _ => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//! Style options passed to the content source.

use crate::Palette;

/// User-selected styling and content options for one generation request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleOptions {
    /// Deck default palette; also the per-slide fallback.
    pub palette: Palette,
    /// Presentation style, e.g. "Business Presentation".
    pub presentation_kind: String,
    /// Requested number of slides, if any.
    pub slide_count_hint: Option<u32>,
    pub tone: String,
    pub audience: String,
    /// Whether slides should carry illustrative images.
    pub include_images: bool,
    /// Elements the deck must include, e.g. "timeline", "statistics".
    pub required_elements: Vec<String>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            presentation_kind: "Business Presentation".to_string(),
            slide_count_hint: None,
            tone: "professional".to_string(),
            audience: "general".to_string(),
            include_images: true,
            required_elements: Vec::new(),
        }
    }
}

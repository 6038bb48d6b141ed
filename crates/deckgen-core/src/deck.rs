//! Deck type - the normalized presentation handed to assemblers.

use crate::Palette;

/// Title used when the content source does not provide one.
pub const DEFAULT_DECK_TITLE: &str = "Generated Presentation";

/// A normalized presentation: a title and an ordered, non-empty list of slides.
///
/// A deck is built fresh per generation or edit request and is never mutated
/// by an assembler. Stages that enrich it (image resolution) consume it and
/// hand back a new value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deck {
    /// Presentation title.
    pub title: String,
    /// Slides in presentation order.
    pub slides: Vec<SlideRecord>,
}

/// One normalized slide.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlideRecord {
    /// 1-based ordinal, always equal to the slide's position in the deck.
    pub index: usize,
    /// Non-empty slide title.
    pub title: String,
    /// Slide role.
    pub kind: SlideKind,
    /// Bullet list, paragraph, or nothing.
    pub body: SlideBody,
    /// Free-text description of an illustrative image, if one was requested.
    pub image_query: Option<String>,
    /// Resolved image, filled in by the image resolver.
    pub image: Option<ImageRef>,
    /// Fully populated colour triple.
    pub palette: Palette,
}

/// Role of a slide within the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SlideKind {
    Title,
    #[default]
    Content,
    Introduction,
    Conclusion,
}

/// Slide body. Bullets and paragraph are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "value", rename_all = "lowercase")
)]
pub enum SlideBody {
    /// Ordered, non-empty bullet strings.
    Bullets(Vec<String>),
    /// A single paragraph of text.
    Paragraph(String),
    #[default]
    Empty,
}

/// A resolved image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRef {
    /// Where the image lives.
    pub url: String,
    /// Alternative text, also used as the caption.
    pub alt_text: String,
}

impl Deck {
    /// Create a deck, renumbering slides by position.
    ///
    /// Indices carried by `slides` are ignored; the deck owns ordering.
    pub fn new(title: impl Into<String>, slides: Vec<SlideRecord>) -> Self {
        let mut deck = Self {
            title: title.into(),
            slides,
        };
        deck.renumber();
        deck
    }

    /// Reassign every slide index to its 1-based position.
    pub fn renumber(&mut self) {
        for (position, slide) in self.slides.iter_mut().enumerate() {
            slide.index = position + 1;
        }
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// A deck with no slides is invalid input for every assembler.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Palette used for document-wide styling: the first slide's, or the
    /// built-in default for an empty deck.
    pub fn theme_palette(&self) -> Palette {
        self.slides
            .first()
            .map(|s| s.palette.clone())
            .unwrap_or_default()
    }

    /// Number of slides that asked for an image.
    pub fn image_requests(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| s.image_query.is_some())
            .count()
    }
}

impl SlideRecord {
    /// Create a content slide with an empty body.
    pub fn new(index: usize, title: impl Into<String>, palette: Palette) -> Self {
        Self {
            index,
            title: title.into(),
            kind: SlideKind::Content,
            body: SlideBody::Empty,
            image_query: None,
            image: None,
            palette,
        }
    }

    /// The title substituted when a slide has none.
    pub fn default_title(index: usize) -> String {
        format!("Slide {index}")
    }
}

impl SlideKind {
    /// Parse a kind name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SlideKind::Title),
            "content" => Some(SlideKind::Content),
            "introduction" | "intro" => Some(SlideKind::Introduction),
            "conclusion" => Some(SlideKind::Conclusion),
            _ => None,
        }
    }

    /// Get the kind as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideKind::Title => "title",
            SlideKind::Content => "content",
            SlideKind::Introduction => "introduction",
            SlideKind::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for SlideKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SlideBody {
    /// Bullet strings, if this is a bullet list.
    pub fn bullets(&self) -> Option<&[String]> {
        match self {
            SlideBody::Bullets(items) => Some(items),
            _ => None,
        }
    }

    /// Paragraph text, if this is a paragraph.
    pub fn paragraph(&self) -> Option<&str> {
        match self {
            SlideBody::Paragraph(text) => Some(text),
            _ => None,
        }
    }

    /// True when there is no text to show: no body, no bullets, or a blank
    /// paragraph.
    pub fn is_empty(&self) -> bool {
        match self {
            SlideBody::Empty => true,
            SlideBody::Bullets(items) => items.is_empty(),
            SlideBody::Paragraph(text) => text.trim().is_empty(),
        }
    }
}

impl ImageRef {
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
        }
    }
}

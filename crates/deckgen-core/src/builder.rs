//! Type-safe deck builders.
//!
//! The builders keep a deck valid while it is assembled by hand: indices come
//! from position, every slide inherits the deck palette unless it overrides a
//! colour, and a slide body is either bullets or a paragraph, never both.
//!
//! # Example
//!
//! ```rust
//! use deckgen_core::builder::*;
//!
//! let deck = deck("Q3 Review", |d| d
//!     .slide("Intro", |s| s
//!         .bullet("Revenue up")
//!         .bullet("Costs down")
//!     )
//!     .slide("Outlook", |s| s
//!         .paragraph("Steady growth expected.")
//!         .image_query("rising chart on a whiteboard")
//!     )
//! );
//!
//! assert_eq!(deck.slides.len(), 2);
//! assert_eq!(deck.slides[1].index, 2);
//! ```

use crate::{Color, Deck, ImageRef, Palette, SlideBody, SlideKind, SlideRecord};

/// Build a deck with the default palette.
pub fn deck<F>(title: impl Into<String>, f: F) -> Deck
where
    F: FnOnce(DeckBuilder) -> DeckBuilder,
{
    f(DeckBuilder::new(title)).build()
}

/// Builder for a whole deck.
pub struct DeckBuilder {
    title: String,
    palette: Palette,
    slides: Vec<SlideRecord>,
}

impl DeckBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            palette: Palette::default(),
            slides: Vec::new(),
        }
    }

    /// Set the deck palette. Applies to slides added afterwards.
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Add a slide.
    pub fn slide<F>(mut self, title: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(SlideBuilder) -> SlideBuilder,
    {
        let index = self.slides.len() + 1;
        let builder = f(SlideBuilder::new(index, title, self.palette.clone()));
        self.slides.push(builder.build());
        self
    }

    pub fn build(self) -> Deck {
        Deck::new(self.title, self.slides)
    }
}

/// Builder for one slide.
pub struct SlideBuilder {
    record: SlideRecord,
}

impl SlideBuilder {
    fn new(index: usize, title: impl Into<String>, palette: Palette) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            SlideRecord::default_title(index)
        } else {
            title
        };
        Self {
            record: SlideRecord::new(index, title, palette),
        }
    }

    pub fn kind(mut self, kind: SlideKind) -> Self {
        self.record.kind = kind;
        self
    }

    /// Append a bullet. Replaces a paragraph body.
    pub fn bullet(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            return self;
        }
        match &mut self.record.body {
            SlideBody::Bullets(items) => items.push(text),
            body => *body = SlideBody::Bullets(vec![text]),
        }
        self
    }

    /// Set a paragraph body. Replaces any bullets; blank text is ignored.
    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            return self;
        }
        self.record.body = SlideBody::Paragraph(text);
        self
    }

    /// Request an illustrative image.
    pub fn image_query(mut self, query: impl Into<String>) -> Self {
        self.record.image_query = Some(query.into());
        self
    }

    /// Attach an already-resolved image.
    pub fn image(mut self, url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        self.record.image = Some(ImageRef::new(url, alt_text));
        self
    }

    pub fn primary(mut self, color: Color) -> Self {
        self.record.palette.primary = color;
        self
    }

    pub fn secondary(mut self, color: Color) -> Self {
        self.record.palette.secondary = color;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.record.palette.background = color;
        self
    }

    fn build(self) -> SlideRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_replace_paragraph() {
        let d = deck("D", |d| d.slide("S", |s| s.paragraph("p").bullet("b")));
        assert_eq!(d.slides[0].body, SlideBody::Bullets(vec!["b".to_string()]));
    }

    #[test]
    fn test_blank_paragraph_ignored() {
        let d = deck("D", |d| d.slide("S", |s| s.paragraph("")).slide("T", |s| s.bullet("b").paragraph("  ")));
        assert_eq!(d.slides[0].body, SlideBody::Empty);
        assert_eq!(d.slides[1].body, SlideBody::Bullets(vec!["b".to_string()]));
    }

    #[test]
    fn test_blank_title_defaults() {
        let d = deck("D", |d| d.slide("", |s| s).slide("  ", |s| s));
        assert_eq!(d.slides[0].title, "Slide 1");
        assert_eq!(d.slides[1].title, "Slide 2");
    }

    #[test]
    fn test_slide_colour_override_keeps_rest() {
        let red = Color::parse("#ff0000").unwrap();
        let d = deck("D", |d| d.slide("S", |s| s.primary(red.clone())));
        let p = &d.slides[0].palette;
        assert_eq!(p.primary, red);
        assert_eq!(p.secondary, Palette::default().secondary);
        assert_eq!(p.background, Palette::default().background);
    }
}

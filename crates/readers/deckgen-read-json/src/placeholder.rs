//! Placeholder deck substituted when generated content is unusable.

use deckgen_core::{DEFAULT_DECK_TITLE, Deck, Palette, SlideBody, SlideKind, SlideRecord};

/// Two-slide deck presented instead of failing outright.
pub fn placeholder_deck(palette: &Palette) -> Deck {
    let slide = |title: &str, kind: SlideKind, bullets: [&str; 4]| SlideRecord {
        kind,
        body: SlideBody::Bullets(bullets.iter().map(|b| b.to_string()).collect()),
        ..SlideRecord::new(0, title, palette.clone())
    };

    Deck::new(
        DEFAULT_DECK_TITLE,
        vec![
            slide(
                "Welcome to Your Presentation",
                SlideKind::Title,
                [
                    "AI-powered content generation",
                    "Custom color schemes and themes",
                    "Professional presentation format",
                    "Engaging visual design",
                ],
            ),
            slide(
                "Main Content Section",
                SlideKind::Content,
                [
                    "Colorful and engaging slides",
                    "Professional design elements",
                    "Easy to read and understand",
                    "Customizable themes and layouts",
                ],
            ),
        ],
    )
}

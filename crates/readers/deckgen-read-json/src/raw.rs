//! Deck to content-source JSON, the inverse of normalization.
//!
//! Edit requests send the current deck back to the model in the same shape
//! it was asked to produce.

use deckgen_core::{Deck, SlideBody};
use serde_json::{Map, Value, json};

/// Project a deck into the raw JSON shape the content source speaks.
pub fn to_raw(deck: &Deck) -> Value {
    let slides: Vec<Value> = deck
        .slides
        .iter()
        .map(|slide| {
            let mut m = Map::new();
            m.insert("slideNumber".into(), json!(slide.index));
            m.insert("title".into(), json!(slide.title));
            match &slide.body {
                SlideBody::Bullets(items) => {
                    m.insert("bulletPoints".into(), json!(items));
                }
                SlideBody::Paragraph(text) => {
                    m.insert("content".into(), json!(text));
                }
                SlideBody::Empty => {}
            }
            m.insert("type".into(), json!(slide.kind.as_str()));
            m.insert("primaryColor".into(), json!(slide.palette.primary.to_string()));
            m.insert("secondaryColor".into(), json!(slide.palette.secondary.to_string()));
            m.insert("backgroundColor".into(), json!(slide.palette.background.to_string()));
            if let Some(query) = &slide.image_query {
                m.insert("imageDescription".into(), json!(query));
            }
            Value::Object(m)
        })
        .collect();

    json!({ "title": deck.title, "slides": slides })
}

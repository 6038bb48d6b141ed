//! Content-source JSON reader for deckgen.
//!
//! Turns the text a generative model returned into a canonical [`Deck`].
//! The model is asked for one JSON object shaped like
//!
//! ```json
//! {
//!   "title": "Presentation Title",
//!   "slides": [
//!     {
//!       "slideNumber": 1,
//!       "title": "Slide Title",
//!       "content": "Paragraph text",
//!       "bulletPoints": ["Point 1", "Point 2"],
//!       "type": "title|content|conclusion|introduction",
//!       "primaryColor": "#2563eb",
//!       "secondaryColor": "#3b82f6",
//!       "backgroundColor": "#f8fafc",
//!       "imageDescription": "team meeting in a modern office"
//!     }
//!   ]
//! }
//! ```
//!
//! but may wrap it in prose or code fences, drop fields, or use the wrong
//! types. [`parse`] repairs what it can and reports every repair as a
//! fidelity warning; [`normalize_or_placeholder`] additionally never fails.
//!
//! # Example
//!
//! ```
//! use deckgen_core::Palette;
//! use deckgen_read_json::normalize_or_placeholder;
//!
//! let raw = "```json\n{\"title\":\"Q3\",\"slides\":[{\"title\":\"Intro\"}]}\n```";
//! let result = normalize_or_placeholder(raw, &Palette::default());
//! assert!(!result.is_placeholder());
//! assert_eq!(result.deck().slides[0].title, "Intro");
//! ```

mod placeholder;
mod raw;

pub use placeholder::placeholder_deck;
pub use raw::to_raw;

use deckgen_core::{
    Color, ConversionResult, DEFAULT_DECK_TITLE, Deck, FidelityWarning, NormalizationFailure,
    Palette, Severity, SlideBody, SlideKind, SlideRecord, WarningKind,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Outcome of normalization: the model's deck, or the placeholder that
/// replaced unusable content.
#[derive(Debug)]
pub enum NormalizedDeck {
    /// Content was usable; warnings list every repair.
    Normalized(ConversionResult<Deck>),
    /// Content was unusable; `deck` is the two-slide placeholder.
    Placeholder {
        deck: Deck,
        reason: NormalizationFailure,
    },
}

impl NormalizedDeck {
    pub fn deck(&self) -> &Deck {
        match self {
            NormalizedDeck::Normalized(result) => &result.value,
            NormalizedDeck::Placeholder { deck, .. } => deck,
        }
    }

    pub fn into_deck(self) -> Deck {
        match self {
            NormalizedDeck::Normalized(result) => result.value,
            NormalizedDeck::Placeholder { deck, .. } => deck,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, NormalizedDeck::Placeholder { .. })
    }

    /// The deck plus its warnings; a placeholder yields one
    /// `PlaceholderContent` warning.
    pub fn into_result(self) -> ConversionResult<Deck> {
        match self {
            NormalizedDeck::Normalized(result) => result,
            NormalizedDeck::Placeholder { deck, reason } => ConversionResult::ok(deck).warn(
                FidelityWarning::new(
                    Severity::Major,
                    WarningKind::PlaceholderContent,
                    format!("generated content was unusable ({reason}); placeholder slides used"),
                ),
            ),
        }
    }
}

/// Normalize model output, substituting the placeholder deck on failure.
pub fn normalize_or_placeholder(text: &str, defaults: &Palette) -> NormalizedDeck {
    match parse(text, defaults) {
        Ok(result) => NormalizedDeck::Normalized(result),
        Err(reason) => {
            warn!(%reason, "content normalization failed, using placeholder deck");
            NormalizedDeck::Placeholder {
                deck: placeholder_deck(defaults),
                reason,
            }
        }
    }
}

/// Parse model output text into a deck.
pub fn parse(text: &str, defaults: &Palette) -> Result<ConversionResult<Deck>, NormalizationFailure> {
    let json = extract_json(text);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| NormalizationFailure::Malformed(format!("JSON parse error: {e}")))?;
    normalize(&value, defaults)
}

/// Normalize an already-parsed JSON value into a deck.
pub fn normalize(value: &Value, defaults: &Palette) -> Result<ConversionResult<Deck>, NormalizationFailure> {
    let root = value.as_object().ok_or(NormalizationFailure::NotAnObject)?;
    let entries = root
        .get("slides")
        .and_then(Value::as_array)
        .ok_or(NormalizationFailure::MissingSlides)?;
    if entries.is_empty() {
        return Err(NormalizationFailure::EmptyDeck);
    }

    let mut warnings = Vec::new();

    let title = match non_blank_str(root.get("title")) {
        Some(t) => t.to_string(),
        None => {
            warnings.push(FidelityWarning::new(
                Severity::Minor,
                WarningKind::DefaultedField("title".to_string()),
                format!("deck title missing, using \"{DEFAULT_DECK_TITLE}\""),
            ));
            DEFAULT_DECK_TITLE.to_string()
        }
    };

    let mut slides = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let index = position + 1;
        let fields = entry.as_object().ok_or_else(|| {
            NormalizationFailure::Malformed(format!("slide {index} is not an object"))
        })?;
        slides.push(convert_slide(index, fields, defaults, &mut warnings));
    }

    debug!(slides = slides.len(), warnings = warnings.len(), "normalized deck");
    Ok(ConversionResult::with_warnings(
        Deck::new(title, slides),
        warnings,
    ))
}

/// Strip code fences and surrounding prose, leaving the outermost object.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => strip_fences(trimmed),
    }
}

/// Remove a leading "```json" / "```" fence and a trailing "```".
fn strip_fences(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn convert_slide(
    index: usize,
    fields: &Map<String, Value>,
    defaults: &Palette,
    warnings: &mut Vec<FidelityWarning>,
) -> SlideRecord {
    let title = match non_blank_str(fields.get("title")) {
        Some(t) => t.to_string(),
        None => {
            let fallback = SlideRecord::default_title(index);
            warnings.push(
                FidelityWarning::new(
                    Severity::Minor,
                    WarningKind::DefaultedField("title".to_string()),
                    format!("title missing, using \"{fallback}\""),
                )
                .on_slide(index),
            );
            fallback
        }
    };

    if let Some(claimed) = fields.get("slideNumber").and_then(Value::as_u64)
        && claimed != index as u64
    {
        warnings.push(
            FidelityWarning::new(
                Severity::Info,
                WarningKind::DroppedField("slideNumber".to_string()),
                format!("claimed slide number {claimed} ignored"),
            )
            .on_slide(index),
        );
    }

    let kind = match fields.get("type") {
        None | Some(Value::Null) => SlideKind::Content,
        Some(value) => match value.as_str().and_then(SlideKind::parse) {
            Some(kind) => kind,
            None => {
                warnings.push(
                    FidelityWarning::new(
                        Severity::Minor,
                        WarningKind::DefaultedField("type".to_string()),
                        format!("unknown slide type {value}, using \"content\""),
                    )
                    .on_slide(index),
                );
                SlideKind::Content
            }
        },
    };

    let body = convert_body(index, fields, warnings);

    let image_query = non_blank_str(fields.get("imageDescription")).map(str::to_string);

    let palette = Palette {
        primary: color_field(index, fields, "primaryColor", &defaults.primary, warnings),
        secondary: color_field(index, fields, "secondaryColor", &defaults.secondary, warnings),
        background: color_field(index, fields, "backgroundColor", &defaults.background, warnings),
    };

    SlideRecord {
        index,
        title,
        kind,
        body,
        image_query,
        image: None,
        palette,
    }
}

fn convert_body(
    index: usize,
    fields: &Map<String, Value>,
    warnings: &mut Vec<FidelityWarning>,
) -> SlideBody {
    let mut bullets = Vec::new();
    match fields.get("bulletPoints") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            let mut dropped = 0usize;
            for item in items {
                match item.as_str() {
                    Some(text) if !text.trim().is_empty() => bullets.push(text.to_string()),
                    _ => dropped += 1,
                }
            }
            if dropped > 0 {
                warnings.push(
                    FidelityWarning::new(
                        Severity::Minor,
                        WarningKind::DroppedField("bulletPoints".to_string()),
                        format!("{dropped} empty or non-text bullet(s) dropped"),
                    )
                    .on_slide(index),
                );
            }
        }
        Some(_) => warnings.push(
            FidelityWarning::new(
                Severity::Minor,
                WarningKind::DroppedField("bulletPoints".to_string()),
                "bulletPoints is not a list",
            )
            .on_slide(index),
        ),
    }

    let paragraph = non_blank_str(fields.get("content"));

    match (bullets.is_empty(), paragraph) {
        (false, Some(_)) => {
            warnings.push(
                FidelityWarning::new(
                    Severity::Info,
                    WarningKind::Simplified("content".to_string()),
                    "slide has both bullets and a paragraph; keeping the bullets",
                )
                .on_slide(index),
            );
            SlideBody::Bullets(bullets)
        }
        (false, None) => SlideBody::Bullets(bullets),
        (true, Some(text)) => SlideBody::Paragraph(text.to_string()),
        (true, None) => SlideBody::Empty,
    }
}

fn color_field(
    index: usize,
    fields: &Map<String, Value>,
    key: &str,
    default: &Color,
    warnings: &mut Vec<FidelityWarning>,
) -> Color {
    match fields.get(key) {
        None | Some(Value::Null) => default.clone(),
        Some(Value::String(s)) if s.trim().is_empty() => default.clone(),
        Some(value) => match value.as_str().and_then(Color::parse) {
            Some(color) => color,
            None => {
                warnings.push(
                    FidelityWarning::new(
                        Severity::Minor,
                        WarningKind::DefaultedField(key.to_string()),
                        format!("{key} {value} is not a hex colour, using {default}"),
                    )
                    .on_slide(index),
                );
                default.clone()
            }
        },
    }
}

/// The string as written, unless it is missing or blank.
fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn defaults() -> Palette {
        Palette::default()
    }

    #[test]
    fn test_scenario_single_slide_with_bullets() {
        let raw = r#"{"title":"Q3 Review","slides":[{"title":"Intro","bulletPoints":["Revenue up","Costs down"]}]}"#;
        let deck = parse(raw, &defaults()).unwrap().value;
        assert_eq!(deck.title, "Q3 Review");
        assert_eq!(deck.slides.len(), 1);
        let slide = &deck.slides[0];
        assert_eq!(slide.index, 1);
        assert_eq!(slide.title, "Intro");
        assert_eq!(
            slide.body,
            SlideBody::Bullets(vec!["Revenue up".to_string(), "Costs down".to_string()])
        );
        assert_eq!(slide.palette, defaults());
        assert_eq!(slide.kind, SlideKind::Content);
    }

    #[test]
    fn test_not_json_yields_placeholder() {
        let result = normalize_or_placeholder("not json", &defaults());
        assert!(result.is_placeholder());
        let titles: Vec<_> = result.deck().slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Welcome to Your Presentation", "Main Content Section"]
        );
    }

    #[test]
    fn test_structural_failures() {
        assert!(matches!(
            parse("[1, 2]", &defaults()),
            Err(NormalizationFailure::NotAnObject)
        ));
        assert!(matches!(
            parse(r#"{"title":"x"}"#, &defaults()),
            Err(NormalizationFailure::MissingSlides)
        ));
        assert!(matches!(
            parse(r#"{"slides":[]}"#, &defaults()),
            Err(NormalizationFailure::EmptyDeck)
        ));
        assert!(matches!(
            parse(r#"{"slides":[{"title":"ok"}, "nope"]}"#, &defaults()),
            Err(NormalizationFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_strips_fences_and_prose() {
        let raw = "Here you go:\n```json\n{\"slides\":[{\"title\":\"A\"}]}\n```\nEnjoy!";
        let deck = parse(raw, &defaults()).unwrap().value;
        assert_eq!(deck.title, DEFAULT_DECK_TITLE);
        assert_eq!(deck.slides[0].title, "A");
    }

    #[test]
    fn test_defaults_and_warnings() {
        let raw = r#"{"slides":[{"slideNumber":9,"type":"weird","bulletPoints":["a", 3, "  "]}]}"#;
        let result = parse(raw, &defaults()).unwrap();
        let slide = &result.value.slides[0];
        assert_eq!(slide.title, "Slide 1");
        assert_eq!(slide.kind, SlideKind::Content);
        assert_eq!(slide.body, SlideBody::Bullets(vec!["a".to_string()]));
        let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind.clone()).collect();
        assert!(kinds.contains(&WarningKind::DefaultedField("title".to_string())));
        assert!(kinds.contains(&WarningKind::DefaultedField("type".to_string())));
        assert!(kinds.contains(&WarningKind::DroppedField("slideNumber".to_string())));
        assert!(kinds.contains(&WarningKind::DroppedField("bulletPoints".to_string())));
    }

    #[test]
    fn test_bullets_win_over_paragraph() {
        let raw = r#"{"slides":[{"title":"A","content":"para","bulletPoints":["b"]},{"title":"B","content":"only para"}]}"#;
        let deck = parse(raw, &defaults()).unwrap().value;
        assert_eq!(deck.slides[0].body, SlideBody::Bullets(vec!["b".to_string()]));
        assert_eq!(
            deck.slides[1].body,
            SlideBody::Paragraph("only para".to_string())
        );
    }

    #[test]
    fn test_partial_palette_override() {
        let raw = r##"{"slides":[{"title":"A","primaryColor":"#ff0000","secondaryColor":"teal"}]}"##;
        let result = parse(raw, &defaults()).unwrap();
        let palette = &result.value.slides[0].palette;
        assert_eq!(palette.primary.hex(), "FF0000");
        assert_eq!(palette.secondary, defaults().secondary);
        assert_eq!(palette.background, defaults().background);
        assert!(result.has_warnings());
    }

    #[test]
    fn test_image_description_kept_raw() {
        let raw = r#"{"slides":[{"title":"A","imageDescription":"AI & Robots <2025>"}]}"#;
        let deck = parse(raw, &defaults()).unwrap().value;
        assert_eq!(
            deck.slides[0].image_query.as_deref(),
            Some("AI & Robots <2025>")
        );
    }

    #[test]
    fn test_text_fields_copied_verbatim() {
        let raw = r#"{"title":" Deck ","slides":[
            {"title":"  Intro  ","bulletPoints":[" a ","b\t"],"imageDescription":" sunrise "},
            {"title":"B","content":"\n  indented\n"}
        ]}"#;
        let deck = parse(raw, &defaults()).unwrap().value;
        assert_eq!(deck.title, " Deck ");
        assert_eq!(deck.slides[0].title, "  Intro  ");
        assert_eq!(
            deck.slides[0].body,
            SlideBody::Bullets(vec![" a ".to_string(), "b\t".to_string()])
        );
        assert_eq!(deck.slides[0].image_query.as_deref(), Some(" sunrise "));
        assert_eq!(
            deck.slides[1].body,
            SlideBody::Paragraph("\n  indented\n".to_string())
        );
    }

    fn raw_slide() -> impl Strategy<Value = Value> {
        (
            proptest::option::of(".{0,12}"),
            proptest::option::of(any::<i64>()),
            proptest::option::of(prop_oneof![
                Just("#123abc".to_string()),
                Just("zzz".to_string()),
                Just(String::new()),
            ]),
        )
            .prop_map(|(title, number, color)| {
                let mut m = Map::new();
                if let Some(t) = title {
                    m.insert("title".to_string(), Value::String(t));
                }
                if let Some(n) = number {
                    m.insert("slideNumber".to_string(), Value::from(n));
                }
                if let Some(c) = color {
                    m.insert("primaryColor".to_string(), Value::String(c));
                }
                Value::Object(m)
            })
    }

    proptest! {
        #[test]
        fn prop_indices_are_positions(slides in proptest::collection::vec(raw_slide(), 1..20)) {
            let n = slides.len();
            let raw = serde_json::json!({ "title": "T", "slides": slides });
            let deck = normalize(&raw, &defaults()).unwrap().value;
            let indices: Vec<usize> = deck.slides.iter().map(|s| s.index).collect();
            prop_assert_eq!(indices, (1..=n).collect::<Vec<_>>());
        }

        #[test]
        fn prop_palette_always_complete(slides in proptest::collection::vec(raw_slide(), 1..20)) {
            let raw = serde_json::json!({ "slides": slides });
            let deck = normalize(&raw, &defaults()).unwrap().value;
            for slide in &deck.slides {
                prop_assert_eq!(slide.palette.primary.hex().len(), 6);
                prop_assert_eq!(slide.palette.secondary.hex().len(), 6);
                prop_assert_eq!(slide.palette.background.hex().len(), 6);
                prop_assert!(!slide.title.trim().is_empty());
            }
        }

        #[test]
        fn prop_never_panics_and_always_yields_slides(text in ".{0,200}") {
            let result = normalize_or_placeholder(&text, &defaults());
            prop_assert!(!result.deck().slides.is_empty());
        }
    }
}

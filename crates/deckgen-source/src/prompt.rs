//! Prompt construction for generation and edit requests.

use deckgen_core::{Deck, StyleOptions};

/// Slide count asked for in the topic itself, e.g. "in 6 slides".
pub fn requested_slide_count(topic: &str) -> Option<u32> {
    let lower = topic.to_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let number = &lower[start..i];
        let rest = lower[i..].trim_start();
        if (rest.starts_with("slide") || rest.starts_with("page"))
            && let Ok(n) = number.parse::<u32>()
            && n > 0
        {
            return Some(n);
        }
    }
    None
}

fn slide_count_guidance(topic: &str, style: &StyleOptions) -> String {
    match requested_slide_count(topic).or(style.slide_count_hint) {
        Some(n) => format!("Create exactly {n} slides as requested."),
        None => "Create an appropriate number of slides (typically 5-12) based on the content \
                 depth. Use 5-7 slides for simple topics and 8-12 for comprehensive ones."
            .to_string(),
    }
}

fn json_shape(style: &StyleOptions) -> String {
    let p = &style.palette;
    format!(
        r#"{{
  "title": "Presentation Title Here",
  "slides": [
    {{
      "slideNumber": 1,
      "title": "Slide Title",
      "content": "Main content paragraph when needed",
      "bulletPoints": ["Point 1", "Point 2", "Point 3"],
      "type": "title|content|conclusion|introduction",
      "primaryColor": "{}",
      "secondaryColor": "{}",
      "backgroundColor": "{}",
      "imageDescription": "Specific description of a relevant image"
    }}
  ]
}}"#,
        p.primary, p.secondary, p.background
    )
}

fn elements(style: &StyleOptions) -> String {
    if style.required_elements.is_empty() {
        "standard presentation elements".to_string()
    } else {
        style.required_elements.join(", ")
    }
}

/// Prompt asking for a brand-new deck about `topic`.
pub fn generation_prompt(topic: &str, style: &StyleOptions) -> String {
    let p = &style.palette;
    let images = if style.include_images { "Yes" } else { "No" };
    let image_guidance = if style.include_images {
        "\nFor imageDescription, be specific and use search-friendly keywords: \
         \"business team collaboration meeting office\" rather than \"team work\", \
         \"modern technology innovation digital circuit\" rather than \"technology\".\n"
    } else {
        "\nOmit imageDescription.\n"
    };

    format!(
        r#"Create a comprehensive presentation about: "{topic}"

STRICT REQUIREMENTS:
1. Return ONLY valid JSON without any markdown formatting or code blocks
2. Use this exact color scheme:
   - Primary Color: {primary}
   - Secondary Color: {secondary}
   - Background Color: {background}
3. Presentation Style: {kind}
4. {count}
5. Tone: {tone}
6. Target Audience: {audience}
7. Include Images: {images}
8. Include elements: {elements}

EXACT JSON FORMAT (no deviations):
{shape}

CONTENT GUIDELINES:
- Each slide has 3-5 bullet points OR one detailed content paragraph
- Vary slide types: a title slide, content slides and a conclusion slide
- Make the content flow logically from introduction to conclusion
{image_guidance}
Return the JSON immediately without any explanation."#,
        primary = p.primary,
        secondary = p.secondary,
        background = p.background,
        kind = style.presentation_kind,
        count = slide_count_guidance(topic, style),
        tone = style.tone,
        audience = style.audience,
        elements = elements(style),
        shape = json_shape(style),
    )
}

/// Prompt asking for a revised deck. The current deck is embedded in the
/// same JSON shape the model produces.
pub fn edit_prompt(instruction: &str, current: &Deck, style: &StyleOptions) -> String {
    let raw = deckgen_read_json::to_raw(current);
    let current_json = serde_json::to_string_pretty(&raw).unwrap_or_else(|_| raw.to_string());
    format!(
        r#"You edit presentation slide content. Apply the user's editing request to the
current presentation and return the complete updated presentation.

User editing request: {instruction}

Current presentation:
{current_json}

Return ONLY valid JSON in exactly the same format, without markdown or explanation.
Keep the color properties on every slide unless the request changes them.
Tone: {tone}. Target audience: {audience}."#,
        tone = style.tone,
        audience = style.audience,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::builder::deck;

    #[test]
    fn test_requested_slide_count() {
        assert_eq!(requested_slide_count("Climate change in 6 slides"), Some(6));
        assert_eq!(requested_slide_count("a 10-page deck"), None);
        assert_eq!(requested_slide_count("a 10 Page deck"), Some(10));
        assert_eq!(requested_slide_count("Top 3 tips, 4slides"), Some(4));
        assert_eq!(requested_slide_count("Rust in 2025"), None);
        assert_eq!(requested_slide_count("0 slides"), None);
    }

    #[test]
    fn test_topic_count_overrides_hint() {
        let style = StyleOptions {
            slide_count_hint: Some(9),
            ..StyleOptions::default()
        };
        assert!(generation_prompt("Rust in 4 slides", &style).contains("exactly 4 slides"));
        assert!(generation_prompt("Rust", &style).contains("exactly 9 slides"));
        assert!(generation_prompt("Rust", &StyleOptions::default()).contains("typically 5-12"));
    }

    #[test]
    fn test_generation_prompt_lists_style() {
        let style = StyleOptions {
            include_images: false,
            required_elements: vec!["timeline".into(), "statistics".into()],
            ..StyleOptions::default()
        };
        let prompt = generation_prompt("Solar power", &style);
        assert!(prompt.contains("\"Solar power\""));
        assert!(prompt.contains("Primary Color: #2563EB"));
        assert!(prompt.contains("Include Images: No"));
        assert!(prompt.contains("timeline, statistics"));
        assert!(prompt.contains("\"bulletPoints\""));
    }

    #[test]
    fn test_edit_prompt_embeds_deck() {
        let current = deck("Roadmap", |d| d.slide("Now", |s| s.bullet("Ship v1")));
        let prompt = edit_prompt("add a risks slide", &current, &StyleOptions::default());
        assert!(prompt.contains("add a risks slide"));
        assert!(prompt.contains("\"title\": \"Roadmap\""));
        assert!(prompt.contains("Ship v1"));
    }
}

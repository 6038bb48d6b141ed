//! Styled HTML fallback renderer for deckgen.
//!
//! Used when the PPTX package cannot be assembled. Produces a standalone
//! HTML5 document with one section per slide and a page break between
//! sections, so printing or pasting into a presentation tool keeps the
//! slide boundaries. Rendering never fails.

use deckgen_core::escape::escape_markup;
use deckgen_core::{
    Artifact, ArtifactFormat, ConversionResult, DEFAULT_DECK_TITLE, Deck, FallbackRenderer,
    FidelityWarning, Palette, Severity, SlideBody, SlideRecord, WarningKind,
};
use tracing::debug;

/// Render a deck as a standalone HTML document.
pub fn emit(deck: &Deck) -> ConversionResult<Artifact> {
    let mut ctx = EmitContext::new();
    let title = if deck.title.trim().is_empty() {
        DEFAULT_DECK_TITLE
    } else {
        deck.title.as_str()
    };

    emit_head(title, &deck.theme_palette(), &mut ctx);
    emit_header(title, deck.len(), &mut ctx);
    if deck.is_empty() {
        ctx.write("<p class=\"empty\">This presentation has no slides.</p>\n");
        ctx.warnings.push(FidelityWarning::new(
            Severity::Major,
            WarningKind::DroppedField("slides".to_string()),
            "deck has no slides",
        ));
    }
    for slide in &deck.slides {
        emit_slide(slide, &mut ctx);
    }
    ctx.write("</body>\n</html>\n");

    debug!(bytes = ctx.output.len(), "fallback document rendered");
    ConversionResult::with_warnings(Artifact::html(ctx.output.into_bytes()), ctx.warnings)
}

/// The fallback backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFallback;

impl FallbackRenderer for HtmlFallback {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Html
    }

    fn render(&self, deck: &Deck) -> ConversionResult<Artifact> {
        emit(deck)
    }
}

struct EmitContext {
    output: String,
    warnings: Vec<FidelityWarning>,
}

impl EmitContext {
    fn new() -> Self {
        Self {
            output: String::with_capacity(8 * 1024),
            warnings: Vec::new(),
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_escaped(&mut self, s: &str) {
        self.output.push_str(&escape_markup(s));
    }
}

fn emit_head(title: &str, theme: &Palette, ctx: &mut EmitContext) {
    ctx.write("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    ctx.write("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>");
    ctx.write_escaped(title);
    ctx.write("</title>\n<style>\n");
    ctx.write(&format!(
        ":root {{ --primary: {}; --secondary: {}; --background: {}; }}\n",
        theme.primary, theme.secondary, theme.background
    ));
    ctx.write(STYLESHEET);
    ctx.write("</style>\n</head>\n<body>\n");
}

const STYLESHEET: &str = r#"body { font-family: Calibri, Arial, sans-serif; margin: 0; color: #333333; background: #e5e7eb; }
header.deck { padding: 2rem 3rem; background: var(--primary); color: #ffffff; }
header.deck h1 { margin: 0 0 0.5rem; font-size: 2.2rem; }
header.deck p { margin: 0.25rem 0; opacity: 0.9; }
section.slide { width: 25.4cm; min-height: 19cm; margin: 1.5rem auto; padding: 2rem 3rem; box-sizing: border-box; background: var(--background); border-top: 0.5rem solid var(--primary); page-break-after: always; }
section.slide h2 { color: var(--primary); font-size: 2rem; margin-top: 0; }
section.slide .kind { color: var(--secondary); text-transform: uppercase; letter-spacing: 0.1em; font-size: 0.8rem; }
section.slide ul { padding-left: 1.5rem; }
section.slide li { font-size: 1.2rem; line-height: 1.8; }
section.slide li::marker { color: var(--secondary); }
section.slide p.body { font-size: 1.2rem; line-height: 1.8; }
section.slide figure { margin: 1.5rem 0 0; text-align: center; }
section.slide img { max-width: 100%; max-height: 9cm; }
section.slide figcaption { font-style: italic; color: #666666; font-size: 0.9rem; }
@media print { body { background: #ffffff; } section.slide { margin: 0; } }
"#;

fn emit_header(title: &str, slide_count: usize, ctx: &mut EmitContext) {
    ctx.write("<header class=\"deck\">\n<h1>");
    ctx.write_escaped(title);
    ctx.write("</h1>\n");
    ctx.write(&format!("<p>{slide_count} slide(s)</p>\n"));
    ctx.write(
        "<p>To convert to PowerPoint: open this file in a browser, select all, copy, \
         paste into a new presentation and save as .pptx.</p>\n",
    );
    ctx.write("</header>\n");
}

fn emit_slide(slide: &SlideRecord, ctx: &mut EmitContext) {
    let palette = &slide.palette;
    ctx.write(&format!(
        "<section class=\"slide\" id=\"slide-{}\" style=\"--primary: {}; --secondary: {}; --background: {};\">\n",
        slide.index, palette.primary, palette.secondary, palette.background
    ));
    ctx.write(&format!("<div class=\"kind\">{}</div>\n", slide.kind));
    ctx.write(&format!("<h2>Slide {}: ", slide.index));
    ctx.write_escaped(&slide.title);
    ctx.write("</h2>\n");

    match &slide.body {
        SlideBody::Bullets(items) => {
            ctx.write("<ul>\n");
            for item in items {
                ctx.write("<li>");
                ctx.write_escaped(item);
                ctx.write("</li>\n");
            }
            ctx.write("</ul>\n");
        }
        SlideBody::Paragraph(text) => {
            ctx.write("<p class=\"body\">");
            ctx.write_escaped(text);
            ctx.write("</p>\n");
        }
        SlideBody::Empty => {}
    }

    if let Some(image) = &slide.image {
        ctx.write("<figure>\n<img src=\"");
        ctx.write_escaped(&image.url);
        ctx.write("\" alt=\"");
        ctx.write_escaped(&image.alt_text);
        ctx.write("\">\n<figcaption>");
        ctx.write_escaped(&image.alt_text);
        ctx.write("</figcaption>\n</figure>\n");
    }

    ctx.write("</section>\n");
}

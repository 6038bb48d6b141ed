#![no_main]

use arbitrary::Arbitrary;
use deckgen_core::builder::deck;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

#[derive(Arbitrary, Debug)]
struct FuzzSlide {
    title: String,
    bullets: Vec<String>,
    paragraph: Option<String>,
    image: Option<(String, String)>,
}

#[derive(Arbitrary, Debug)]
struct FuzzDeck {
    title: String,
    slides: Vec<FuzzSlide>,
}

fuzz_target!(|input: FuzzDeck| {
    let slides = input.slides;
    let d = deck(input.title, |mut d| {
        for s in &slides {
            d = d.slide(s.title.clone(), |mut b| {
                for bullet in &s.bullets {
                    b = b.bullet(bullet.clone());
                }
                if let Some(p) = &s.paragraph {
                    b = b.paragraph(p.clone());
                }
                if let Some((url, alt)) = &s.image {
                    b = b.image(url.clone(), alt.clone());
                }
                b
            });
        }
        d
    });

    // The fallback never fails and is never empty
    let html = deckgen_write_html::emit(&d);
    assert!(!html.value.data.is_empty());

    // A successful package is a readable archive with one part per slide
    if let Ok(result) = deckgen_write_pptx::emit(&d) {
        let archive = zip::ZipArchive::new(Cursor::new(&result.value.data))
            .expect("assembled package is not a zip archive");
        let slide_parts = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count();
        assert_eq!(slide_parts, d.slides.len());
    }
});

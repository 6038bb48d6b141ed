//! PPTX (PowerPoint) package assembler for deckgen.
//!
//! Builds an Office Open XML presentation from a [`Deck`], one slide part per
//! slide. Images are linked externally rather than embedded, so assembly
//! never touches the network.
//!
//! Assembly runs strictly in order: manifest, relationships, static parts,
//! slide parts, then packaging. Any failure aborts the whole build; a partial
//! package is never returned.

mod parts;
mod slide;

use chrono::Utc;
use deckgen_core::{
    Artifact, ArtifactFormat, AssembleOptions, Assembler, AssemblyFailure, ConversionResult, Deck,
};
use parts::Manifest;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Assemble a deck into a PPTX package.
pub fn emit(deck: &Deck) -> Result<ConversionResult<Artifact>, AssemblyFailure> {
    emit_with_options(deck, &AssembleOptions::default())
}

/// Assemble a deck into a PPTX package with options.
pub fn emit_with_options(
    deck: &Deck,
    options: &AssembleOptions,
) -> Result<ConversionResult<Artifact>, AssemblyFailure> {
    if deck.is_empty() {
        return Err(AssemblyFailure::EmptyDeck);
    }
    let slide_count = deck.len();
    let mut warnings = Vec::new();
    let mut package = Package::default();

    let manifest = Manifest::for_deck(slide_count);
    package.add(parts::CONTENT_TYPES, manifest.to_xml());
    debug!(slides = slide_count, "manifest built");

    package.add("_rels/.rels", parts::root_rels());
    package.add("ppt/presentation.xml", parts::presentation(slide_count));
    package.add(
        "ppt/_rels/presentation.xml.rels",
        parts::presentation_rels(slide_count),
    );
    debug!("relationships built");

    let created = options.created.unwrap_or_else(Utc::now);
    package.add("ppt/theme/theme1.xml", parts::theme(&deck.theme_palette()));
    package.add("ppt/slideMasters/slideMaster1.xml", parts::slide_master());
    package.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        parts::slide_master_rels(),
    );
    package.add("ppt/slideLayouts/slideLayout1.xml", parts::slide_layout());
    package.add(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        parts::slide_layout_rels(),
    );
    package.add(
        "docProps/core.xml",
        parts::core_properties(&deck.title, &options.author, created),
    );
    package.add("docProps/app.xml", parts::app_properties(slide_count));
    debug!("static parts built");

    for (position, record) in deck.slides.iter().enumerate() {
        let index = position + 1;
        let result = slide::slide_xml(record);
        warnings.extend(result.warnings);
        package.add(parts::slide_part(index), result.value);
        package.add(parts::slide_rels_part(index), slide::slide_rels(record));
    }
    debug!("slide parts built");

    package.verify(&manifest)?;
    let artifact = Artifact::pptx(package.write()?);
    artifact.ensure_plausible(options.min_artifact_size)?;
    debug!(bytes = artifact.len(), "package written");

    Ok(ConversionResult::with_warnings(artifact, warnings))
}

/// The primary assembler backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxAssembler;

impl Assembler for PptxAssembler {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Pptx
    }

    fn assemble(
        &self,
        deck: &Deck,
        options: &AssembleOptions,
    ) -> Result<ConversionResult<Artifact>, AssemblyFailure> {
        emit_with_options(deck, options)
    }
}

/// Parts staged for packaging, in write order.
#[derive(Default)]
struct Package {
    parts: Vec<(String, String)>,
}

impl Package {
    fn add(&mut self, name: impl Into<String>, xml: String) {
        self.parts.push((name.into(), xml));
    }

    fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    /// Check the staged parts against the manifest.
    fn verify(&self, manifest: &Manifest) -> Result<(), AssemblyFailure> {
        let emitted = self
            .parts
            .iter()
            .filter(|(name, _)| parts::is_slide_part(name))
            .count();
        if emitted != manifest.slide_count() {
            return Err(AssemblyFailure::ManifestMismatch {
                declared: manifest.slide_count(),
                emitted,
            });
        }

        let declared = manifest.part_names().count();
        let present = manifest.part_names().filter(|n| self.contains(n)).count();
        if present != declared {
            return Err(AssemblyFailure::ManifestMismatch {
                declared,
                emitted: present,
            });
        }
        Ok(())
    }

    fn write(&self) -> Result<Vec<u8>, AssemblyFailure> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, xml) in &self.parts {
            zip.start_file(name.as_str(), options)
                .map_err(|e| AssemblyFailure::Archive(e.to_string()))?;
            zip.write_all(xml.as_bytes())?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| AssemblyFailure::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use deckgen_core::builder::deck;
    use deckgen_core::{SlideKind, WarningKind};
    use proptest::prelude::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(data: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut s = String::new();
        file.read_to_string(&mut s).unwrap();
        s
    }

    fn part_names(data: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(data)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    fn sample(n: usize) -> Deck {
        deck("Sample", |d| {
            (1..=n).fold(d, |d, i| d.slide(format!("Slide title {i}"), |s| s.bullet("point")))
        })
    }

    #[test]
    fn test_emit_basic() {
        let d = deck("Q3 Review", |d| {
            d.slide("Welcome", |s| s.kind(SlideKind::Title))
                .slide("Intro", |s| s.bullet("Revenue up").bullet("Costs down"))
        });
        let result = emit(&d).unwrap();
        let artifact = &result.value;
        assert_eq!(artifact.format, ArtifactFormat::Pptx);
        assert_eq!(&artifact.data[0..2], b"PK");
        assert!(artifact.len() >= deckgen_core::DEFAULT_MIN_ARTIFACT_SIZE);

        let slide = read_part(&artifact.data, "ppt/slides/slide2.xml");
        assert!(slide.contains("<a:t>Revenue up</a:t>"));
        assert!(slide.contains("<a:t>Costs down</a:t>"));
    }

    #[test]
    fn test_all_parts_present() {
        let names = part_names(&emit(&sample(2)).unwrap().value.data);
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/theme/theme1.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            "ppt/slides/slide1.xml",
            "ppt/slides/_rels/slide1.xml.rels",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        assert_eq!(names.len(), 15);
    }

    #[test]
    fn test_empty_deck_rejected() {
        let empty = Deck::new("Nothing", Vec::new());
        assert!(matches!(emit(&empty), Err(AssemblyFailure::EmptyDeck)));
    }

    #[test]
    fn test_implausible_size_rejected() {
        let options = AssembleOptions {
            min_artifact_size: 10 * 1024 * 1024,
            ..AssembleOptions::default()
        };
        let err = emit_with_options(&sample(1), &options).unwrap_err();
        assert!(matches!(err, AssemblyFailure::ImplausibleSize { .. }));
    }

    #[test]
    fn test_text_escaped_exactly_once() {
        let d = deck("R&D", |d| {
            d.slide("Tom & Jerry's <show>", |s| {
                s.bullet("a \"quoted\" & <tagged> bullet")
                    .image("https://img?x=1&y=2", "AI & Robots <2025>")
            })
        });
        let data = emit(&d).unwrap().value.data;
        let slide = read_part(&data, "ppt/slides/slide1.xml");
        assert!(slide.contains("Tom &amp; Jerry&apos;s &lt;show&gt;"));
        assert!(slide.contains("a &quot;quoted&quot; &amp; &lt;tagged&gt; bullet"));
        assert!(slide.contains("AI &amp; Robots &lt;2025&gt;"));
        assert!(!slide.contains("&amp;amp;"));
        assert!(!slide.contains("AI & Robots"));
        assert!(!slide.contains("<2025>"));

        let core = read_part(&data, "docProps/core.xml");
        assert!(core.contains("<dc:title>R&amp;D</dc:title>"));
    }

    #[test]
    fn test_reproducible_with_fixed_timestamp() {
        let options = AssembleOptions {
            created: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..AssembleOptions::default()
        };
        let data = emit_with_options(&sample(1), &options).unwrap().value.data;
        let core = read_part(&data, "docProps/core.xml");
        assert!(core.contains("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_region_fallback_reported() {
        let d = deck("D", |d| {
            d.slide("S", |s| {
                (0..10)
                    .fold(s, |s, i| s.bullet(format!("b{i}")))
                    .image("https://i", "alt")
            })
        });
        let result = emit(&d).unwrap();
        assert!(result.warnings.iter().any(|w| w.kind == WarningKind::ImageRegion));
    }

    #[test]
    fn test_verify_detects_missing_slide() {
        let manifest = Manifest::for_deck(2);
        let mut package = Package::default();
        for name in manifest.part_names().filter(|n| *n != "ppt/slides/slide2.xml") {
            package.add(name, String::new());
        }
        assert!(matches!(
            package.verify(&manifest),
            Err(AssemblyFailure::ManifestMismatch { declared: 2, emitted: 1 })
        ));
    }

    #[test]
    fn test_assembler_trait() {
        let assembler = PptxAssembler;
        assert_eq!(assembler.format(), ArtifactFormat::Pptx);
        let result = assembler
            .assemble(&sample(3), &AssembleOptions::default())
            .unwrap();
        assert!(!result.value.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_manifest_matches_slide_parts(n in 1usize..30) {
            let data = emit(&sample(n)).unwrap().value.data;
            let manifest = read_part(&data, "[Content_Types].xml");
            let declared = manifest.matches("presentationml.slide+xml").count();
            prop_assert_eq!(declared, n);

            let names = part_names(&data);
            let slides = names.iter().filter(|p| parts::is_slide_part(p)).count();
            prop_assert_eq!(slides, n);
            // Eleven fixed parts, plus a part and a rels file per slide.
            prop_assert_eq!(names.len(), 11 + 2 * n);
        }
    }
}

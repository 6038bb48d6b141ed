//! Slide parts and their layout geometry.
//!
//! All positions are EMU on a 4:3 slide (9144000 x 6858000).

use crate::parts::{REL_IMAGE, REL_SLIDE_LAYOUT};
use deckgen_core::escape::escape_xml_text;
use deckgen_core::{
    ConversionResult, FidelityWarning, ImageRef, Palette, Severity, SlideBody, SlideKind,
    SlideRecord, WarningKind,
};

const MARGIN_X: i64 = 457_200;
const CONTENT_CX: i64 = 8_229_600;

const TITLE_Y: i64 = 274_638;
const TITLE_CY: i64 = 1_143_000;

const BODY_Y: i64 = 1_600_200;
/// Body height when the slide has no image.
const BODY_CY: i64 = 4_525_963;
/// Height reserved per bullet line.
const BULLET_LINE_CY: i64 = 640_080;
/// Height reserved for a paragraph body.
const PARAGRAPH_CY: i64 = 2_286_000;
const GAP: i64 = 91_440;

/// The image and its caption must end above this line.
const IMAGE_BOTTOM: i64 = 6_400_800;
const MIN_IMAGE_CY: i64 = 1_371_600;
const CAPTION_CY: i64 = 365_760;

/// Fallback image region when the body leaves no room.
const DEFAULT_BODY_CY: i64 = 2_500_000;
const DEFAULT_IMAGE_Y: i64 = 4_200_000;

/// Slide relationship carrying the external image link.
const IMAGE_REL_ID: &str = "rId2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub y: i64,
    pub cy: i64,
}

/// Vertical placement of a slide's body and image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub body: Region,
    pub image: Option<Region>,
}

/// Space a body needs; bullets reserve less than paragraphs.
fn body_height(body: &SlideBody) -> i64 {
    if body.is_empty() {
        return 0;
    }
    match body {
        SlideBody::Bullets(items) => BULLET_LINE_CY * items.len() as i64,
        SlideBody::Paragraph(_) => PARAGRAPH_CY,
        SlideBody::Empty => 0,
    }
}

/// Place body and image. `None` alongside the layout means the computed
/// placement was used; otherwise the warning explains the fallback.
pub(crate) fn layout(slide: &SlideRecord) -> (Layout, Option<FidelityWarning>) {
    if slide.image.is_none() {
        return (
            Layout {
                body: Region { y: BODY_Y, cy: BODY_CY },
                image: None,
            },
            None,
        );
    }

    let needed = body_height(&slide.body);
    let image_y = BODY_Y + needed + GAP;
    if IMAGE_BOTTOM - image_y >= MIN_IMAGE_CY {
        return (
            Layout {
                body: Region { y: BODY_Y, cy: needed },
                image: Some(Region {
                    y: image_y,
                    cy: IMAGE_BOTTOM - image_y,
                }),
            },
            None,
        );
    }

    let warning = FidelityWarning::new(
        Severity::Minor,
        WarningKind::ImageRegion,
        "body leaves no room for the image, using the default image region",
    )
    .on_slide(slide.index);
    (
        Layout {
            body: Region {
                y: BODY_Y,
                cy: DEFAULT_BODY_CY,
            },
            image: Some(Region {
                y: DEFAULT_IMAGE_Y,
                cy: IMAGE_BOTTOM - DEFAULT_IMAGE_Y,
            }),
        },
        Some(warning),
    )
}

/// Emit the markup for one slide.
pub(crate) fn slide_xml(slide: &SlideRecord) -> ConversionResult<String> {
    let (layout, warning) = layout(slide);
    let palette = &slide.palette;

    let mut shapes = title_shape(slide, palette);
    if !slide.body.is_empty() {
        shapes.push_str(&body_shape(&slide.body, palette, layout.body));
    }
    if let (Some(image), Some(region)) = (&slide.image, layout.image) {
        shapes.push_str(&picture(image, region));
        shapes.push_str(&caption(image, region));
    }

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:bg>
      <p:bgPr>
        <a:solidFill><a:srgbClr val="{background}"/></a:solidFill>
        <a:effectLst/>
      </p:bgPr>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{shapes}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>
"#,
        background = palette.background.hex(),
    );

    match warning {
        Some(w) => ConversionResult::ok(xml).warn(w),
        None => ConversionResult::ok(xml),
    }
}

pub(crate) fn slide_rels(slide: &SlideRecord) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_SLIDE_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>
"#
    );
    if let Some(image) = &slide.image {
        xml.push_str(&format!(
            "  <Relationship Id=\"{IMAGE_REL_ID}\" Type=\"{REL_IMAGE}\" Target=\"{}\" TargetMode=\"External\"/>\n",
            escape_xml_text(&image.url)
        ));
    }
    xml.push_str("</Relationships>\n");
    xml
}

fn title_shape(slide: &SlideRecord, palette: &Palette) -> String {
    // Title slides get a larger, centred heading.
    let (size, align) = match slide.kind {
        SlideKind::Title => (4400, r#" algn="ctr""#),
        _ => (3200, ""),
    };
    format!(
        r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Title"/>
          <p:cNvSpPr/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm>
            <a:off x="{MARGIN_X}" y="{TITLE_Y}"/>
            <a:ext cx="{CONTENT_CX}" cy="{TITLE_CY}"/>
          </a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
        <p:txBody>
          <a:bodyPr anchor="ctr"/>
          <a:lstStyle/>
          <a:p>
            <a:pPr{align}/>
            <a:r>
              <a:rPr lang="en-US" sz="{size}" b="1"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill></a:rPr>
              <a:t>{title}</a:t>
            </a:r>
          </a:p>
        </p:txBody>
      </p:sp>
"#,
        color = palette.primary.hex(),
        title = escape_xml_text(&slide.title),
    )
}

fn body_shape(body: &SlideBody, palette: &Palette, region: Region) -> String {
    let mut paragraphs = String::new();
    match body {
        SlideBody::Bullets(items) => {
            for item in items {
                paragraphs.push_str(&format!(
                    r#"          <a:p>
            <a:pPr marL="342900" indent="-342900">
              <a:buClr><a:srgbClr val="{bullet}"/></a:buClr>
              <a:buFont typeface="Arial"/>
              <a:buChar char="&#8226;"/>
            </a:pPr>
            <a:r>
              <a:rPr lang="en-US" sz="2000"><a:solidFill><a:srgbClr val="333333"/></a:solidFill></a:rPr>
              <a:t>{text}</a:t>
            </a:r>
          </a:p>
"#,
                    bullet = palette.secondary.hex(),
                    text = escape_xml_text(item),
                ));
            }
        }
        SlideBody::Paragraph(text) => {
            for line in text.lines() {
                paragraphs.push_str(&format!(
                    r#"          <a:p>
            <a:r>
              <a:rPr lang="en-US" sz="2000"><a:solidFill><a:srgbClr val="333333"/></a:solidFill></a:rPr>
              <a:t>{}</a:t>
            </a:r>
          </a:p>
"#,
                    escape_xml_text(line)
                ));
            }
        }
        SlideBody::Empty => {}
    }
    // A text body needs at least one paragraph.
    if paragraphs.is_empty() {
        paragraphs.push_str("          <a:p/>\n");
    }

    format!(
        r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="Content"/>
          <p:cNvSpPr txBox="1"/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm>
            <a:off x="{MARGIN_X}" y="{y}"/>
            <a:ext cx="{CONTENT_CX}" cy="{cy}"/>
          </a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr>
          <a:lstStyle/>
{paragraphs}        </p:txBody>
      </p:sp>
"#,
        y = region.y,
        cy = region.cy,
    )
}

fn picture(image: &ImageRef, region: Region) -> String {
    let cy = region.cy - CAPTION_CY;
    format!(
        r#"      <p:pic>
        <p:nvPicPr>
          <p:cNvPr id="4" name="Image" descr="{alt}"/>
          <p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>
          <p:nvPr/>
        </p:nvPicPr>
        <p:blipFill>
          <a:blip r:link="{IMAGE_REL_ID}"/>
          <a:stretch><a:fillRect/></a:stretch>
        </p:blipFill>
        <p:spPr>
          <a:xfrm>
            <a:off x="{MARGIN_X}" y="{y}"/>
            <a:ext cx="{CONTENT_CX}" cy="{cy}"/>
          </a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
      </p:pic>
"#,
        alt = escape_xml_text(&image.alt_text),
        y = region.y,
    )
}

fn caption(image: &ImageRef, region: Region) -> String {
    format!(
        r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="5" name="Caption"/>
          <p:cNvSpPr txBox="1"/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm>
            <a:off x="{MARGIN_X}" y="{y}"/>
            <a:ext cx="{CONTENT_CX}" cy="{CAPTION_CY}"/>
          </a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p>
            <a:pPr algn="ctr"/>
            <a:r>
              <a:rPr lang="en-US" sz="1200" i="1"><a:solidFill><a:srgbClr val="666666"/></a:solidFill></a:rPr>
              <a:t>{alt}</a:t>
            </a:r>
          </a:p>
        </p:txBody>
      </p:sp>
"#,
        y = region.y + region.cy - CAPTION_CY,
        alt = escape_xml_text(&image.alt_text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::builder::deck;

    fn only_slide(d: deckgen_core::Deck) -> SlideRecord {
        d.slides.into_iter().next().unwrap()
    }

    #[test]
    fn test_no_image_uses_full_body() {
        let s = only_slide(deck("D", |d| d.slide("S", |s| s.bullet("a"))));
        let (l, w) = layout(&s);
        assert_eq!(l.body.cy, BODY_CY);
        assert!(l.image.is_none());
        assert!(w.is_none());
    }

    #[test]
    fn test_bullets_leave_more_room_than_paragraph() {
        let bullets = only_slide(deck("D", |d| {
            d.slide("S", |s| s.bullet("a").bullet("b").image("https://i", "alt"))
        }));
        let para = only_slide(deck("D", |d| {
            d.slide("S", |s| s.paragraph("text").image("https://i", "alt"))
        }));
        let b = layout(&bullets).0.image.unwrap();
        let p = layout(&para).0.image.unwrap();
        assert!(b.y < p.y);
        assert!(b.cy > p.cy);
        assert_eq!(b.y + b.cy, IMAGE_BOTTOM);
    }

    #[test]
    fn test_crowded_body_uses_default_region() {
        let s = only_slide(deck("D", |d| {
            d.slide("S", |s| {
                (0..8)
                    .fold(s, |s, i| s.bullet(format!("point {i}")))
                    .image("https://i", "alt")
            })
        }));
        let (l, w) = layout(&s);
        assert_eq!(l.image, Some(Region { y: DEFAULT_IMAGE_Y, cy: IMAGE_BOTTOM - DEFAULT_IMAGE_Y }));
        assert_eq!(l.body.cy, DEFAULT_BODY_CY);
        assert_eq!(w.unwrap().kind, WarningKind::ImageRegion);
    }

    #[test]
    fn test_image_linked_externally_and_escaped() {
        let s = only_slide(deck("D", |d| {
            d.slide("S", |s| s.image("https://img?a=1&b=2", "AI & Robots <2025>"))
        }));
        let rels = slide_rels(&s);
        assert!(rels.contains(r#"Target="https://img?a=1&amp;b=2" TargetMode="External""#));
        let xml = slide_xml(&s).value;
        assert!(xml.contains(r#"<a:blip r:link="rId2"/>"#));
        assert!(xml.contains("<a:t>AI &amp; Robots &lt;2025&gt;</a:t>"));
        assert!(xml.contains(r#"descr="AI &amp; Robots &lt;2025&gt;""#));
    }

    #[test]
    fn test_textless_body_has_no_empty_text_box() {
        let palette = Palette::default();
        let mut empty_bullets = SlideRecord::new(1, "S", palette.clone());
        empty_bullets.body = SlideBody::Bullets(Vec::new());
        let mut empty_para = SlideRecord::new(1, "S", palette.clone());
        empty_para.body = SlideBody::Paragraph(String::new());

        for s in [&empty_bullets, &empty_para] {
            let xml = slide_xml(s).value;
            assert!(!xml.contains(r#"name="Content""#));
            assert_eq!(xml.matches("<p:txBody>").count(), xml.matches("<a:p>").count());
        }

        let region = Region { y: BODY_Y, cy: BODY_CY };
        let shape = body_shape(&SlideBody::Paragraph(String::new()), &palette, region);
        assert!(shape.contains("<a:p/>"));
    }

    #[test]
    fn test_palette_applied() {
        let s = only_slide(deck("D", |d| d.slide("S", |s| s.bullet("x"))));
        let xml = slide_xml(&s).value;
        assert!(xml.contains(r#"<a:solidFill><a:srgbClr val="F8FAFC"/></a:solidFill>"#));
        assert!(xml.contains(r#"<a:srgbClr val="2563EB"/>"#));
        assert!(xml.contains(r#"<a:buClr><a:srgbClr val="3B82F6"/></a:buClr>"#));
    }

    #[test]
    fn test_empty_body_has_no_content_shape() {
        let s = only_slide(deck("D", |d| d.slide("Only title", |s| s)));
        let xml = slide_xml(&s).value;
        assert!(!xml.contains(r#"name="Content""#));
        assert!(xml.contains("<a:t>Only title</a:t>"));
    }
}

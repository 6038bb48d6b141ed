//! Package-level parts: manifest, relationships, theme, master, layout and
//! document properties. Identical for every deck apart from counts, the
//! theme accents and the document properties.

use chrono::{DateTime, SecondsFormat, Utc};
use deckgen_core::Palette;
use deckgen_core::escape::escape_xml_text;

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// First slide relationship id in `presentation.xml.rels`; master and theme
/// take `rId1` and `rId2`.
const SLIDE_REL_OFFSET: usize = 2;
/// Slide ids start above the reserved range.
const SLIDE_ID_OFFSET: usize = 255;

pub(crate) const CONTENT_TYPES: &str = "[Content_Types].xml";

pub(crate) fn slide_part(index: usize) -> String {
    format!("ppt/slides/slide{index}.xml")
}

pub(crate) fn slide_rels_part(index: usize) -> String {
    format!("ppt/slides/_rels/slide{index}.xml.rels")
}

pub(crate) fn is_slide_part(name: &str) -> bool {
    name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
}

/// The content-type manifest: every part the package must contain.
pub(crate) struct Manifest {
    overrides: Vec<(String, &'static str)>,
    slide_count: usize,
}

impl Manifest {
    pub(crate) fn for_deck(slide_count: usize) -> Self {
        let mut overrides = vec![
            ("ppt/presentation.xml".to_string(), CT_PRESENTATION),
            ("ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
            ("ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
            ("ppt/theme/theme1.xml".to_string(), CT_THEME),
            ("docProps/core.xml".to_string(), CT_CORE),
            ("docProps/app.xml".to_string(), CT_APP),
        ];
        for i in 1..=slide_count {
            overrides.push((slide_part(i), CT_SLIDE));
        }
        Self {
            overrides,
            slide_count,
        }
    }

    pub(crate) fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub(crate) fn part_names(&self) -> impl Iterator<Item = &str> {
        self.overrides.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
"#
        .to_string();
        for (name, content_type) in &self.overrides {
            xml.push_str(&format!(
                "  <Override PartName=\"/{name}\" ContentType=\"{content_type}\"/>\n"
            ));
        }
        xml.push_str("</Types>\n");
        xml
    }
}

pub(crate) fn root_rels() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_OFFICE_DOCUMENT}" Target="ppt/presentation.xml"/>
  <Relationship Id="rId2" Type="{REL_CORE}" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="{REL_APP}" Target="docProps/app.xml"/>
</Relationships>
"#
    )
}

/// Relationship id of the slide at 1-based `index`.
pub(crate) fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + SLIDE_REL_OFFSET)
}

pub(crate) fn presentation(slide_count: usize) -> String {
    let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
                xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
  <p:sldIdLst>
"#
    .to_string();

    for i in 1..=slide_count {
        xml.push_str(&format!(
            "    <p:sldId id=\"{}\" r:id=\"{}\"/>\n",
            SLIDE_ID_OFFSET + i,
            slide_rel_id(i)
        ));
    }

    xml.push_str(
        r#"  </p:sldIdLst>
  <p:sldSz cx="9144000" cy="6858000" type="screen4x3"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>
"#,
    );
    xml
}

pub(crate) fn presentation_rels(slide_count: usize) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_SLIDE_MASTER}" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="{REL_THEME}" Target="theme/theme1.xml"/>
"#
    );

    for i in 1..=slide_count {
        xml.push_str(&format!(
            "  <Relationship Id=\"{}\" Type=\"{REL_SLIDE}\" Target=\"slides/slide{i}.xml\"/>\n",
            slide_rel_id(i)
        ));
    }

    xml.push_str("</Relationships>\n");
    xml
}

pub(crate) fn slide_master() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
             xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
             xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:bg>
      <p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
    <p:sldLayoutId id="2147483649" r:id="rId1"/>
  </p:sldLayoutIdLst>
</p:sldMaster>
"#
    .to_string()
}

pub(crate) fn slide_master_rels() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_SLIDE_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="{REL_THEME}" Target="../theme/theme1.xml"/>
</Relationships>
"#
    )
}

pub(crate) fn slide_layout() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
             xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
             xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
             type="blank" preserve="1">
  <p:cSld name="Blank">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>
"#
    .to_string()
}

pub(crate) fn slide_layout_rels() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_SLIDE_MASTER}" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>
"#
    )
}

/// Theme with accents taken from the deck's document-wide palette.
pub(crate) fn theme(palette: &Palette) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Deck Theme">
  <a:themeElements>
    <a:clrScheme name="Deck">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="1F2937"/></a:dk2>
      <a:lt2><a:srgbClr val="{background}"/></a:lt2>
      <a:accent1><a:srgbClr val="{primary}"/></a:accent1>
      <a:accent2><a:srgbClr val="{secondary}"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="{primary}"/></a:hlink>
      <a:folHlink><a:srgbClr val="{secondary}"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>
"#,
        primary = palette.primary.hex(),
        secondary = palette.secondary.hex(),
        background = palette.background.hex(),
    )
}

pub(crate) fn core_properties(title: &str, author: &str, created: DateTime<Utc>) -> String {
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
                   xmlns:dc="http://purl.org/dc/elements/1.1/"
                   xmlns:dcterms="http://purl.org/dc/terms/"
                   xmlns:dcmitype="http://purl.org/dc/dcmitype/"
                   xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{title}</dc:title>
  <dc:creator>{author}</dc:creator>
  <cp:lastModifiedBy>{author}</cp:lastModifiedBy>
  <cp:revision>1</cp:revision>
  <dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>
</cp:coreProperties>
"#,
        title = escape_xml_text(title),
        author = escape_xml_text(author),
    )
}

pub(crate) fn app_properties(slide_count: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"
            xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <Application>deckgen</Application>
  <PresentationFormat>On-screen Show (4:3)</PresentationFormat>
  <Slides>{slide_count}</Slides>
  <AppVersion>1.0000</AppVersion>
</Properties>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manifest_lists_every_slide() {
        let m = Manifest::for_deck(3);
        let xml = m.to_xml();
        assert_eq!(xml.matches(CT_SLIDE).count(), 3);
        assert!(xml.contains("/ppt/slides/slide3.xml"));
        assert!(!xml.contains("/ppt/slides/slide4.xml"));
        assert_eq!(m.part_names().count(), 9);
    }

    #[test]
    fn test_slide_relationship_ids_are_offset() {
        let rels = presentation_rels(2);
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml""#));
        assert!(rels.contains(r#"Id="rId4""#));
        let pres = presentation(2);
        assert!(pres.contains(r#"<p:sldId id="256" r:id="rId3"/>"#));
        assert!(pres.contains(r#"<p:sldId id="257" r:id="rId4"/>"#));
    }

    #[test]
    fn test_theme_uses_palette() {
        let xml = theme(&Palette::default());
        assert!(xml.contains(r#"<a:accent1><a:srgbClr val="2563EB"/></a:accent1>"#));
        assert!(xml.contains(r#"<a:lt2><a:srgbClr val="F8FAFC"/></a:lt2>"#));
    }

    #[test]
    fn test_core_properties_escaped_and_stamped() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let xml = core_properties("R&D <Plan>", "deckgen", created);
        assert!(xml.contains("<dc:title>R&amp;D &lt;Plan&gt;</dc:title>"));
        assert!(xml.contains("2024-05-01T12:00:00Z"));
    }
}

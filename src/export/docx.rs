//! DOCX exporter.
//!
//! Writes a WordprocessingML package: one `w:p` per section title and per
//! block, styled through a generated styles part and two bullet numbering
//! definitions (`•` and `✓`).

use std::io::{Seek, Write};

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{
    Align, Block, ContentTree, Marker, Paragraph, ParagraphRole, Run, SectionLayout, StyleSheet,
    TextStyle,
};

use super::ooxml::{
    NS_RELATIONSHIPS, Package, Relationships, XML_DECL, content_type, escape_xml, rel,
    root_relationships,
};
use super::{CountUnit, ExportSummary, Exporter};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A4 in twentieths of a point.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
const PAGE_MARGIN: u32 = 1440;

/// List indentation per level and hanging indent, in twips.
const LIST_STEP: u32 = 720;
const LIST_HANGING: u32 = 360;

/// Configuration for DOCX export.
#[derive(Debug, Clone, Default)]
pub struct DocxConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

/// DOCX format exporter.
///
/// # Example
///
/// ```no_run
/// use folio::portfolio;
/// use folio::export::{DocxExporter, Exporter};
/// use std::fs::File;
///
/// let mut file = File::create("PORTFOLIO_PRESENTATION.docx")?;
/// DocxExporter::new().export(&portfolio(), &mut file)?;
/// # Ok::<(), folio::Error>(())
/// ```
pub struct DocxExporter {
    config: DocxConfig,
    sheet: StyleSheet,
}

impl DocxExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: DocxConfig::default(),
            sheet: StyleSheet::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: DocxConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for DocxExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for DocxExporter {
    fn export<W: Write + Seek>(
        &self,
        tree: &ContentTree,
        writer: &mut W,
    ) -> Result<ExportSummary> {
        let mut body = DocumentBody::new(&self.sheet);
        for section in tree.sections() {
            body.section_title(&section.title, section.layout);
            for block in &section.blocks {
                body.block(block);
            }
        }
        let paragraphs = body.paragraphs;
        debug!(paragraphs, "built document body");

        let mut package = Package::new(self.config.compression_level);
        package.add_part("_rels/.rels", None, root_relationships("word/document.xml"));
        package.add_part(
            "word/document.xml",
            Some(content_type::WORD_DOCUMENT),
            body.finish(),
        );

        let mut rels = Relationships::new();
        rels.add(rel::STYLES, "styles.xml");
        rels.add(rel::NUMBERING, "numbering.xml");
        package.add_part("word/_rels/document.xml.rels", None, rels.to_xml());

        let language = if tree.language.is_empty() {
            "ko-KR"
        } else {
            tree.language.as_str()
        };
        package.add_part(
            "word/styles.xml",
            Some(content_type::WORD_STYLES),
            styles_xml(&self.sheet, language),
        );
        package.add_part(
            "word/numbering.xml",
            Some(content_type::WORD_NUMBERING),
            numbering_xml(&self.sheet),
        );
        package.add_properties(tree, &format!("<Paragraphs>{paragraphs}</Paragraphs>"));

        package.write(writer)?;
        info!(paragraphs, "rendered DOCX");
        Ok(ExportSummary::new(paragraphs, CountUnit::Paragraphs))
    }
}

// ============================================================================
// document.xml
// ============================================================================

struct DocumentBody<'a> {
    sheet: &'a StyleSheet,
    xml: String,
    paragraphs: usize,
}

impl<'a> DocumentBody<'a> {
    fn new(sheet: &'a StyleSheet) -> Self {
        let mut xml = String::new();
        xml.push_str(XML_DECL);
        xml.push_str(&format!(
            r#"<w:document xmlns:w="{NS_W}" xmlns:r="{NS_RELATIONSHIPS}"><w:body>"#
        ));
        Self {
            sheet,
            xml,
            paragraphs: 0,
        }
    }

    fn section_title(&mut self, title: &str, layout: SectionLayout) {
        let (style, align) = match layout {
            SectionLayout::Title => ("Title", Align::Center),
            SectionLayout::Body | SectionLayout::Closing => ("Heading1", Align::Left),
        };
        let props = ParagraphProps {
            style: Some(style),
            align,
            ..Default::default()
        };
        self.paragraph(&props, &[Run::plain(title)]);
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => {
                let style = if *level <= 1 { "Heading1" } else { "Heading2" };
                let props = ParagraphProps {
                    style: Some(style),
                    ..Default::default()
                };
                self.paragraph(&props, &[Run::plain(text.as_str())]);
            }
            Block::Paragraph(paragraph) => {
                let style = match paragraph.role {
                    ParagraphRole::Body => None,
                    ParagraphRole::Subtitle => Some("Subtitle"),
                    ParagraphRole::Lead => Some("IntenseQuote"),
                };
                let props = ParagraphProps {
                    style,
                    align: paragraph.align,
                    ..Default::default()
                };
                self.paragraph(&props, &paragraph.runs);
            }
            Block::Bullet {
                level,
                marker,
                content,
            } => self.list_item(*level, *marker, content),
            Block::Spacer(points) => {
                // An empty paragraph exactly as tall as the spacer.
                self.xml.push_str(&format!(
                    r#"<w:p><w:pPr><w:spacing w:before="0" w:after="0" w:line="{}" w:lineRule="exact"/></w:pPr></w:p>"#,
                    twips(*points)
                ));
                self.paragraphs += 1;
            }
            Block::PageBreak => {
                self.xml
                    .push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
                self.paragraphs += 1;
            }
            Block::SlideBreak { .. } => {}
        }
    }

    fn list_item(&mut self, level: u8, marker: Marker, content: &Paragraph) {
        let level = u32::from(level.min(1));
        let num_id = match marker {
            Marker::Dot => Some(1),
            Marker::Check => Some(2),
            Marker::None => None,
        };
        let props = ParagraphProps {
            style: Some("ListParagraph"),
            align: content.align,
            numbering: num_id.map(|id| (id, level)),
            indent: num_id
                .is_none()
                .then_some(LIST_STEP * (level + 1)),
        };
        self.paragraph(&props, &content.runs);
    }

    fn paragraph(&mut self, props: &ParagraphProps, runs: &[Run]) {
        self.xml.push_str("<w:p>");
        props.write(&mut self.xml);
        for run in runs {
            self.run(run);
        }
        self.xml.push_str("</w:p>");
        self.paragraphs += 1;
    }

    fn run(&mut self, run: &Run) {
        if run.text.is_empty() {
            return;
        }
        self.xml.push_str("<w:r>");
        if run.bold || run.italic || run.tone.is_some() {
            self.xml.push_str("<w:rPr>");
            if run.bold {
                self.xml.push_str("<w:b/>");
            }
            if run.italic {
                self.xml.push_str("<w:i/>");
            }
            if let Some(tone) = run.tone {
                self.xml.push_str(&format!(
                    r#"<w:color w:val="{}"/>"#,
                    self.sheet.color(tone).to_hex()
                ));
            }
            self.xml.push_str("</w:rPr>");
        }
        self.xml.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_xml(&run.text)
        ));
    }

    fn finish(mut self) -> String {
        self.xml.push_str(&format!(
            r#"<w:sectPr><w:pgSz w:w="{PAGE_WIDTH}" w:h="{PAGE_HEIGHT}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
            m = PAGE_MARGIN
        ));
        self.xml.push_str("</w:body></w:document>");
        self.xml
    }
}

#[derive(Default)]
struct ParagraphProps {
    style: Option<&'static str>,
    align: Align,
    /// (numId, ilvl)
    numbering: Option<(u32, u32)>,
    /// Left indent in twips for unnumbered list lines.
    indent: Option<u32>,
}

impl ParagraphProps {
    fn write(&self, xml: &mut String) {
        if self.style.is_none()
            && self.numbering.is_none()
            && self.indent.is_none()
            && self.align == Align::Left
        {
            return;
        }
        xml.push_str("<w:pPr>");
        if let Some(style) = self.style {
            xml.push_str(&format!(r#"<w:pStyle w:val="{style}"/>"#));
        }
        if let Some((num_id, ilvl)) = self.numbering {
            xml.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{ilvl}"/><w:numId w:val="{num_id}"/></w:numPr>"#
            ));
        }
        if let Some(left) = self.indent {
            xml.push_str(&format!(r#"<w:ind w:left="{left}"/>"#));
        }
        if self.align == Align::Center {
            xml.push_str(r#"<w:jc w:val="center"/>"#);
        }
        xml.push_str("</w:pPr>");
    }
}

// ============================================================================
// styles.xml / numbering.xml
// ============================================================================

fn twips(points: f32) -> u32 {
    (points * 20.0).round() as u32
}

fn half_points(points: f32) -> u32 {
    (points * 2.0).round() as u32
}

/// `ppr` holds the paragraph property children that sort before and after
/// `w:spacing` in the `CT_PPrBase` sequence.
fn paragraph_style(
    xml: &mut String,
    id: &str,
    name: &str,
    sheet: &StyleSheet,
    style: &TextStyle,
    ppr: [&str; 2],
    extra_rpr: &str,
) {
    let [lead, tail] = ppr;
    xml.push_str(&format!(
        r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#
    ));
    xml.push_str(&format!(
        r#"<w:pPr>{lead}<w:spacing w:before="{}" w:after="{}"/>{tail}</w:pPr>"#,
        twips(style.space_before),
        twips(style.space_after)
    ));
    xml.push_str("<w:rPr>");
    if style.bold {
        xml.push_str("<w:b/><w:bCs/>");
    }
    xml.push_str(extra_rpr);
    xml.push_str(&format!(
        r#"<w:color w:val="{}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
        sheet.color(style.tone).to_hex(),
        size = half_points(style.size)
    ));
    xml.push_str("</w:rPr></w:style>");
}

fn styles_xml(sheet: &StyleSheet, language: &str) -> String {
    let font = escape_xml(&sheet.font_family);
    let body = &sheet.body;

    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:styles xmlns:w="{NS_W}">"#));
    xml.push_str(&format!(
        concat!(
            r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#,
            r#"<w:color w:val="{color}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
            r#"<w:lang w:val="en-US" w:eastAsia="{lang}"/>"#,
            r#"</w:rPr></w:rPrDefault>"#,
            r#"<w:pPrDefault><w:pPr><w:spacing w:after="{after}" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#,
            r#"</w:docDefaults>"#,
        ),
        font = font,
        color = sheet.color(body.tone).to_hex(),
        size = half_points(body.size),
        lang = escape_xml(language),
        after = twips(body.space_after),
    ));

    xml.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );
    paragraph_style(
        &mut xml,
        "Title",
        "Title",
        sheet,
        &sheet.title,
        ["", r#"<w:jc w:val="center"/>"#],
        "",
    );
    paragraph_style(
        &mut xml,
        "Heading1",
        "heading 1",
        sheet,
        &sheet.heading1,
        ["<w:keepNext/>", r#"<w:outlineLvl w:val="0"/>"#],
        "",
    );
    paragraph_style(
        &mut xml,
        "Heading2",
        "heading 2",
        sheet,
        &sheet.heading2,
        ["<w:keepNext/>", r#"<w:outlineLvl w:val="1"/>"#],
        "",
    );
    paragraph_style(
        &mut xml,
        "Subtitle",
        "Subtitle",
        sheet,
        &sheet.subtitle,
        ["", ""],
        "",
    );
    paragraph_style(
        &mut xml,
        "IntenseQuote",
        "Intense Quote",
        sheet,
        &TextStyle {
            tone: crate::model::Tone::Primary,
            bold: true,
            ..*body
        },
        [
            r#"<w:pBdr><w:bottom w:val="single" w:sz="4" w:space="4" w:color="4682B4"/></w:pBdr>"#,
            r#"<w:ind w:left="864" w:right="864"/><w:jc w:val="center"/>"#,
        ],
        "<w:i/><w:iCs/>",
    );
    paragraph_style(
        &mut xml,
        "ListParagraph",
        "List Paragraph",
        sheet,
        &sheet.bullet,
        ["", r#"<w:ind w:left="720"/><w:contextualSpacing/>"#],
        "",
    );

    xml.push_str("</w:styles>");
    xml
}

fn numbering_xml(sheet: &StyleSheet) -> String {
    let marker_color = sheet.palette.primary.to_hex();
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:numbering xmlns:w="{NS_W}">"#));

    let markers = [Marker::Dot, Marker::Check];
    for (abstract_id, marker) in markers.iter().enumerate() {
        let Some(glyph) = marker.glyph() else {
            continue;
        };
        xml.push_str(&format!(
            r#"<w:abstractNum w:abstractNumId="{abstract_id}"><w:multiLevelType w:val="hybridMultilevel"/>"#
        ));
        for ilvl in 0..2u32 {
            xml.push_str(&format!(
                concat!(
                    r#"<w:lvl w:ilvl="{ilvl}"><w:start w:val="1"/><w:numFmt w:val="bullet"/>"#,
                    r#"<w:lvlText w:val="{glyph}"/><w:lvlJc w:val="left"/>"#,
                    r#"<w:pPr><w:ind w:left="{left}" w:hanging="{hanging}"/></w:pPr>"#,
                    r#"<w:rPr><w:color w:val="{color}"/></w:rPr></w:lvl>"#,
                ),
                ilvl = ilvl,
                glyph = glyph,
                left = LIST_STEP * (ilvl + 1),
                hanging = LIST_HANGING,
                color = marker_color,
            ));
        }
        xml.push_str("</w:abstractNum>");
    }
    for (abstract_id, _) in markers.iter().enumerate() {
        xml.push_str(&format!(
            r#"<w:num w:numId="{}"><w:abstractNumId w:val="{abstract_id}"/></w:num>"#,
            abstract_id + 1
        ));
    }

    xml.push_str("</w:numbering>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, portfolio};
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use std::io::{Cursor, Read};

    fn export(tree: &ContentTree) -> (ExportSummary, Vec<u8>) {
        let mut out = Cursor::new(Vec::new());
        let summary = DocxExporter::new().export(tree, &mut out).unwrap();
        (summary, out.into_inner())
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut part)
            .unwrap();
        part
    }

    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML at {}: {e}", reader.buffer_position()),
            }
        }
    }

    #[test]
    fn test_counts_titles_and_blocks() {
        let tree = ContentTree::new("t")
            .with_section(
                Section::new("Cover")
                    .with_layout(SectionLayout::Title)
                    .push(Block::Spacer(20.0))
                    .push(Block::PageBreak),
            )
            .with_section(
                Section::new("Body")
                    .push(Block::slide("ignored"))
                    .push(Block::heading(2, "Sub"))
                    .push(Block::bullet(0, Marker::Dot, "item")),
            );
        let (summary, _) = export(&tree);
        // 2 section titles + spacer + page break + heading + bullet
        assert_eq!(summary.count, 6);
        assert_eq!(summary.unit, CountUnit::Paragraphs);
    }

    #[test]
    fn test_portfolio_count_matches_tree() {
        let tree = portfolio();
        let expected = tree.sections().len()
            + tree
                .blocks()
                .filter(|(_, b)| !matches!(b, Block::SlideBreak { .. }))
                .count();
        let (summary, _) = export(&tree);
        assert_eq!(summary.count, expected);
    }

    #[test]
    fn test_parts_are_well_formed() {
        let (_, bytes) = export(&portfolio());
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/numbering.xml",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert_well_formed(&read_part(&bytes, part));
        }
    }

    #[test]
    fn test_document_preserves_section_order() {
        let (_, bytes) = export(&portfolio());
        let doc = read_part(&bytes, "word/document.xml");
        let about = doc.find("About Me").unwrap();
        let skills = doc.find("Technical Skills").unwrap();
        let contact = doc.find("Contact").unwrap();
        assert!(about < skills && skills < contact);
        assert!(doc.contains("전체메뉴 &gt; 메뉴검색"));
        assert!(!doc.contains("Key Experience (1/3)"));
    }

    #[test]
    fn test_list_items_use_numbering() {
        let (_, bytes) = export(&portfolio());
        let doc = read_part(&bytes, "word/document.xml");
        assert!(doc.contains(r#"<w:numId w:val="1"/>"#));
        assert!(doc.contains(r#"<w:numId w:val="2"/>"#));
        assert!(doc.contains(r#"<w:br w:type="page"/>"#));

        let numbering = read_part(&bytes, "word/numbering.xml");
        assert!(numbering.contains(r#"<w:lvlText w:val="•"/>"#));
        assert!(numbering.contains(r#"<w:lvlText w:val="✓"/>"#));
    }

    #[test]
    fn test_styles_use_sheet() {
        let styles = styles_xml(&StyleSheet::default(), "ko-KR");
        assert!(styles.contains(r#"w:eastAsia="맑은 고딕""#));
        assert!(styles.contains(r#"w:styleId="Heading1""#));
        // Title is 28pt
        assert!(styles.contains(r#"<w:sz w:val="56"/>"#));
        assert!(styles.contains(r#"<w:color w:val="003366"/>"#));
    }

    /// Direct children of every `w:pPr`, in document order.
    fn ppr_children(xml: &str) -> Vec<Vec<String>> {
        let mut reader = Reader::from_str(xml);
        let mut found: Vec<Vec<String>> = Vec::new();
        let mut depth = 0usize;
        let mut ppr_depth = None;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    depth += 1;
                    let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    if ppr_depth.is_some_and(|d| depth == d + 1)
                        && let Some(children) = found.last_mut()
                    {
                        children.push(name.clone());
                    }
                    if name == "w:pPr" {
                        ppr_depth = Some(depth);
                        found.push(Vec::new());
                    }
                }
                Event::Empty(e) => {
                    let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    if ppr_depth == Some(depth) {
                        if let Some(children) = found.last_mut() {
                            children.push(name);
                        }
                    } else if name == "w:pPr" {
                        found.push(Vec::new());
                    }
                }
                Event::End(e) => {
                    if e.name().as_ref() == b"w:pPr" {
                        ppr_depth = None;
                    }
                    depth -= 1;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        found
    }

    #[test]
    fn test_paragraph_properties_follow_schema_order() {
        const ORDER: &[&str] = &[
            "w:pStyle",
            "w:keepNext",
            "w:keepLines",
            "w:pageBreakBefore",
            "w:numPr",
            "w:pBdr",
            "w:shd",
            "w:tabs",
            "w:spacing",
            "w:ind",
            "w:contextualSpacing",
            "w:jc",
            "w:outlineLvl",
        ];
        let (_, bytes) = export(&portfolio());
        for part in ["word/styles.xml", "word/document.xml", "word/numbering.xml"] {
            let xml = read_part(&bytes, part);
            let all = ppr_children(&xml);
            assert!(!all.is_empty(), "{part} has no paragraph properties");
            for children in all {
                let ranks: Vec<usize> = children
                    .iter()
                    .map(|name| {
                        ORDER
                            .iter()
                            .position(|known| known == name)
                            .unwrap_or_else(|| panic!("unexpected {name} in {part}"))
                    })
                    .collect();
                assert!(
                    ranks.windows(2).all(|w| w[0] < w[1]),
                    "{part}: {children:?} out of order"
                );
            }
        }
    }

    #[test]
    fn test_heading_styles_keep_outline_level_after_spacing() {
        let styles = styles_xml(&StyleSheet::default(), "ko-KR");
        let heading = &styles[styles.find(r#"w:styleId="Heading1""#).unwrap()..];
        let spacing = heading.find("<w:spacing").unwrap();
        assert!(heading.find("<w:keepNext/>").unwrap() < spacing);
        assert!(heading.find("<w:outlineLvl").unwrap() > spacing);
    }

    #[test]
    fn test_output_is_deterministic() {
        let tree = portfolio();
        assert_eq!(export(&tree).1, export(&tree).1);
    }
}

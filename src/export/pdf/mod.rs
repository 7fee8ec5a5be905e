//! PDF exporter.
//!
//! The tree is turned into a flow of text blocks, spacers and page breaks,
//! laid out on A4 pages ([`layout`]) and written with `pdf-writer`. Text is
//! drawn with the first usable font from the probe list ([`fonts`]).

mod fonts;
mod layout;

use std::collections::BTreeSet;
use std::io::{Seek, Write};
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, TextRenderingMode, UnicodeCmap};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{
    Align, Block, ContentTree, Marker, ParagraphRole, Run, SectionLayout, StyleSheet, TextStyle,
    Tone,
};

use self::fonts::{EMBEDDED_FONT_NAME, EmbeddedFont, HELVETICA_FACES, PdfFont};
use self::layout::{
    Flowable, Margins, PAGE_HEIGHT, PAGE_WIDTH, Page, Paginator, Piece, SpanStyle, TextBlock,
};
use super::{CountUnit, ExportSummary, Exporter};

pub use self::fonts::{FontChoice, default_font_candidates};

/// Space above a display title, in points (two inches).
const DISPLAY_TITLE_GAP: f32 = 144.0;

/// Horizontal shear applied to synthesize italics.
const SYNTHETIC_SKEW: f32 = 0.2;

/// Stroke width for synthetic bold, relative to the font size.
const SYNTHETIC_BOLD_STROKE: f32 = 0.03;

/// Configuration for PDF export.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Font files tried before the platform candidates.
    pub font_candidates: Vec<PathBuf>,
    /// Also try [`default_font_candidates`].
    pub system_fonts: bool,
    /// Flate-compress content and font streams.
    pub compress: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            font_candidates: Vec::new(),
            system_fonts: true,
            compress: true,
        }
    }
}

/// PDF format exporter.
///
/// # Example
///
/// ```no_run
/// use folio::portfolio;
/// use folio::export::{Exporter, PdfConfig, PdfExporter};
/// use std::fs::File;
///
/// let config = PdfConfig {
///     font_candidates: vec!["fonts/NanumGothic.ttf".into()],
///     ..Default::default()
/// };
/// let mut file = File::create("PORTFOLIO_PRESENTATION.pdf")?;
/// PdfExporter::new().with_config(config).export(&portfolio(), &mut file)?;
/// # Ok::<(), folio::Error>(())
/// ```
pub struct PdfExporter {
    config: PdfConfig,
    sheet: StyleSheet,
}

impl PdfExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: PdfConfig::default(),
            sheet: StyleSheet::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    /// Font files probed, in order.
    pub fn font_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = self.config.font_candidates.clone();
        if self.config.system_fonts {
            candidates.extend(default_font_candidates());
        }
        candidates
    }

    /// Run the font probe without rendering.
    pub fn probe_font(&self, tree: &ContentTree) -> FontChoice {
        self.select_font(tree).choice()
    }

    fn select_font(&self, tree: &ContentTree) -> PdfFont {
        let chars: BTreeSet<char> = tree.chars().collect();
        PdfFont::select(&self.font_candidates(), &chars)
    }

    fn compress(&self, data: &[u8]) -> Result<(Vec<u8>, bool)> {
        if !self.config.compress {
            return Ok((data.to_vec(), false));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
        encoder.write_all(data)?;
        Ok((encoder.finish()?, true))
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for PdfExporter {
    fn export<W: Write + Seek>(
        &self,
        tree: &ContentTree,
        writer: &mut W,
    ) -> Result<ExportSummary> {
        let font = self.select_font(tree);
        let flow = build_flow(tree, &self.sheet);

        let measure = |text: &str, style: &SpanStyle| font.text_width(text, style.size, style.bold);
        let mut paginator = Paginator::new(Margins::default(), measure);
        for flowable in &flow {
            paginator.push(flowable);
        }
        let pages = paginator.finish();
        debug!(flowables = flow.len(), pages = pages.len(), "laid out document");

        let bytes = self.write_document(tree, &font, &pages)?;
        writer.write_all(&bytes)?;

        info!(flowables = flow.len(), pages = pages.len(), font = %font.choice(), "rendered PDF");
        Ok(ExportSummary::new(flow.len(), CountUnit::Flowables))
    }
}

// ============================================================================
// Flow
// ============================================================================

fn span_style(sheet: &StyleSheet, style: &TextStyle, run: &Run) -> SpanStyle {
    SpanStyle {
        size: style.size,
        bold: style.bold || run.bold,
        italic: run.italic,
        color: sheet.color(run.tone.unwrap_or(style.tone)),
    }
}

fn text_block(
    sheet: &StyleSheet,
    style: &TextStyle,
    runs: &[Run],
    align: Align,
) -> TextBlock {
    TextBlock {
        pieces: runs
            .iter()
            .filter(|r| !r.text.is_empty())
            .map(|r| Piece::new(r.text.as_str(), span_style(sheet, style, r)))
            .collect(),
        align,
        justify: false,
        indent: style.left_indent,
        marker: None,
        space_before: style.space_before,
        space_after: style.space_after,
        leading: style.leading(),
    }
}

/// Flatten the tree into flowables. Slide breaks have no flowable.
fn build_flow(tree: &ContentTree, sheet: &StyleSheet) -> Vec<Flowable> {
    let mut flow = Vec::new();

    for section in tree.sections() {
        let title = [Run::plain(section.title.as_str())];
        match section.layout {
            SectionLayout::Title => {
                flow.push(Flowable::Spacer(DISPLAY_TITLE_GAP));
                flow.push(Flowable::Text(text_block(
                    sheet,
                    &sheet.title,
                    &title,
                    Align::Center,
                )));
            }
            SectionLayout::Body => {
                flow.push(Flowable::Text(text_block(
                    sheet,
                    &sheet.heading1,
                    &title,
                    Align::Left,
                )));
            }
            SectionLayout::Closing => {
                flow.push(Flowable::Spacer(DISPLAY_TITLE_GAP));
                flow.push(Flowable::Text(text_block(
                    sheet,
                    &sheet.heading1,
                    &title,
                    Align::Left,
                )));
            }
        }

        for block in &section.blocks {
            match block {
                Block::Heading { level, text } => {
                    let style = if *level <= 1 {
                        &sheet.heading1
                    } else {
                        &sheet.heading2
                    };
                    flow.push(Flowable::Text(text_block(
                        sheet,
                        style,
                        &[Run::plain(text.as_str())],
                        Align::Left,
                    )));
                }
                Block::Paragraph(paragraph) => {
                    let lead;
                    let style = match paragraph.role {
                        ParagraphRole::Body => &sheet.body,
                        ParagraphRole::Subtitle => &sheet.subtitle,
                        ParagraphRole::Lead => {
                            lead = TextStyle {
                                tone: Tone::Primary,
                                ..sheet.body
                            };
                            &lead
                        }
                    };
                    let mut text = text_block(sheet, style, &paragraph.runs, paragraph.align);
                    text.justify = paragraph.align == Align::Left
                        && matches!(paragraph.role, ParagraphRole::Body | ParagraphRole::Lead);
                    flow.push(Flowable::Text(text));
                }
                Block::Bullet {
                    level,
                    marker,
                    content,
                } => {
                    let step = sheet.bullet_step * f32::from(*level);
                    let mut item = text_block(sheet, &sheet.bullet, &content.runs, content.align);
                    item.indent += step;
                    item.marker = marker_piece(sheet, *marker).map(|piece| (step, piece));
                    flow.push(Flowable::Text(item));
                }
                Block::Spacer(height) => flow.push(Flowable::Spacer(*height)),
                Block::PageBreak => flow.push(Flowable::PageBreak),
                Block::SlideBreak { .. } => {}
            }
        }
    }

    flow
}

fn marker_piece(sheet: &StyleSheet, marker: Marker) -> Option<Piece> {
    let glyph = marker.glyph()?;
    let style = SpanStyle {
        size: sheet.bullet.size,
        bold: false,
        italic: false,
        color: sheet.palette.primary,
    };
    Some(Piece::new(glyph.to_string(), style))
}

// ============================================================================
// Writing
// ============================================================================

impl PdfExporter {
    fn write_document(&self, tree: &ContentTree, font: &PdfFont, pages: &[Page]) -> Result<Vec<u8>> {
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let page_tree_id = alloc.bump();
        let info_id = alloc.bump();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);

        let font_refs = self.write_fonts(&mut pdf, &mut alloc, font)?;

        let page_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        for (page, &page_id) in pages.iter().zip(&page_ids) {
            let content_id = alloc.bump();

            let mut page_writer = pdf.page(page_id);
            page_writer
                .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
                .parent(page_tree_id)
                .contents(content_id);
            {
                let mut resources = page_writer.resources();
                let mut fonts = resources.fonts();
                for (name, id) in &font_refs {
                    fonts.pair(Name(name.as_bytes()), *id);
                }
            }
            page_writer.finish();

            let content = page_content(page, font);
            let (data, compressed) = self.compress(&content)?;
            let mut stream = pdf.stream(content_id, &data);
            if compressed {
                stream.filter(Filter::FlateDecode);
            }
            stream.finish();
        }

        let mut info = pdf.document_info(info_id);
        info.title(TextStr(&tree.title));
        if !tree.author.is_empty() {
            info.author(TextStr(&tree.author));
        }
        info.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " ",
            env!("CARGO_PKG_VERSION")
        )));
        info.finish();

        Ok(pdf.finish())
    }

    /// Write font objects and return `(resource name, font ref)` pairs.
    fn write_fonts(
        &self,
        pdf: &mut Pdf,
        alloc: &mut Ref,
        font: &PdfFont,
    ) -> Result<Vec<(&'static str, Ref)>> {
        match font {
            PdfFont::Helvetica => Ok(HELVETICA_FACES
                .iter()
                .map(|(name, base)| {
                    let id = alloc.bump();
                    pdf.type1_font(id)
                        .base_font(Name(base.as_bytes()))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                    (*name, id)
                })
                .collect()),
            PdfFont::Embedded(embedded) => {
                let id = self.write_embedded(pdf, alloc, embedded)?;
                Ok(vec![("F1", id)])
            }
        }
    }

    fn write_embedded(&self, pdf: &mut Pdf, alloc: &mut Ref, font: &EmbeddedFont) -> Result<Ref> {
        let type0_id = alloc.bump();
        let cid_id = alloc.bump();
        let descriptor_id = alloc.bump();
        let cmap_id = alloc.bump();
        let file_id = alloc.bump();

        let base_font = Name(EMBEDDED_FONT_NAME.as_bytes());

        pdf.type0_font(type0_id)
            .base_font(base_font)
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_id)
            .to_unicode(cmap_id);

        let mut cid = pdf.cid_font(cid_id);
        cid.subtype(CidFontType::Type2)
            .base_font(base_font)
            .system_info(identity_system_info())
            .font_descriptor(descriptor_id)
            .default_width(font.missing_advance)
            .cid_to_gid_map_predefined(Name(b"Identity"));
        {
            let mut widths = cid.widths();
            let mut by_gid: Vec<(u16, f32)> = font.glyphs.values().map(|g| (g.id, g.advance)).collect();
            by_gid.sort_by_key(|(id, _)| *id);
            by_gid.dedup_by_key(|(id, _)| *id);
            for (id, advance) in by_gid {
                widths.consecutive(id, [advance]);
            }
        }
        cid.finish();

        let [x_min, y_min, x_max, y_max] = font.bbox;
        pdf.font_descriptor(descriptor_id)
            .name(base_font)
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(Rect::new(x_min, y_min, x_max, y_max))
            .italic_angle(0.0)
            .ascent(font.ascent)
            .descent(font.descent)
            .cap_height(font.cap_height)
            .stem_v(80.0)
            .font_file2(file_id);

        let mut cmap = UnicodeCmap::new(Name(b"Custom"), identity_system_info());
        for (c, glyph) in &font.glyphs {
            cmap.pair(glyph.id, *c);
        }
        pdf.cmap(cmap_id, &cmap.finish());

        let (data, compressed) = self.compress(&font.data)?;
        let mut stream = pdf.stream(file_id, &data);
        stream.pair(Name(b"Length1"), font.data.len() as i32);
        if compressed {
            stream.filter(Filter::FlateDecode);
        }
        stream.finish();

        Ok(type0_id)
    }
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

/// Content stream for one page.
fn page_content(page: &Page, font: &PdfFont) -> Vec<u8> {
    let mut content = Content::new();
    content.begin_text();

    for placed in &page.items {
        let style = &placed.piece.style;
        let (resource, fake_bold, fake_italic) = font.resource(style.bold, style.italic);
        let [r, g, b] = style.color.to_unit();

        content.set_font(Name(resource.as_bytes()), style.size);
        content.set_fill_rgb(r, g, b);
        if fake_bold {
            content.set_stroke_rgb(r, g, b);
            content.set_line_width(style.size * SYNTHETIC_BOLD_STROKE);
            content.set_text_rendering_mode(TextRenderingMode::FillStroke);
        } else {
            content.set_text_rendering_mode(TextRenderingMode::Fill);
        }
        let skew = if fake_italic { SYNTHETIC_SKEW } else { 0.0 };
        content.set_text_matrix([1.0, 0.0, skew, 1.0, placed.x, placed.baseline]);
        content.show(Str(&font.encode(&placed.piece.text)));
    }

    content.end_text();
    content.finish().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::portfolio;
    use std::io::Cursor;

    const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

    fn with_font(name: &str) -> (PdfExporter, PathBuf) {
        let path = PathBuf::from(FIXTURES_DIR).join(name);
        let exporter = PdfExporter::new().with_config(PdfConfig {
            font_candidates: vec![path.clone()],
            system_fonts: false,
            compress: false,
        });
        (exporter, path)
    }

    fn helvetica_only() -> PdfExporter {
        PdfExporter::new().with_config(PdfConfig {
            font_candidates: vec![PathBuf::from("/nonexistent/malgun.ttf")],
            system_fonts: false,
            compress: false,
        })
    }

    #[test]
    fn test_flow_count_for_portfolio() {
        let tree = portfolio();
        let flow = build_flow(&tree, &StyleSheet::default());
        let titles: usize = tree
            .sections()
            .iter()
            .map(|s| match s.layout {
                SectionLayout::Title | SectionLayout::Closing => 2,
                SectionLayout::Body => 1,
            })
            .sum();
        let blocks = tree
            .blocks()
            .filter(|(_, b)| !matches!(b, Block::SlideBreak { .. }))
            .count();
        assert_eq!(flow.len(), titles + blocks);
    }

    #[test]
    fn test_bullets_indent_by_level() {
        let tree = portfolio();
        let flow = build_flow(&tree, &StyleSheet::default());
        let indents: Vec<f32> = flow
            .iter()
            .filter_map(|f| match f {
                Flowable::Text(block) if block.marker.is_some() => Some(block.indent),
                _ => None,
            })
            .collect();
        assert!(indents.contains(&20.0));
        assert!(indents.contains(&40.0));
    }

    #[test]
    fn test_fallback_renders_with_helvetica() {
        let tree = portfolio();
        let exporter = helvetica_only();
        assert_eq!(exporter.probe_font(&tree), FontChoice::Helvetica);

        let mut out = Cursor::new(Vec::new());
        let summary = exporter.export(&tree, &mut out).unwrap();
        assert_eq!(summary.unit, CountUnit::Flowables);

        let bytes = out.into_inner();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Helvetica-Bold"));
        assert!(text.contains("/WinAnsiEncoding"));
        assert!(text.contains("(About Me) Tj"));
    }

    #[test]
    fn test_embedded_font_renders_hangul() {
        let tree = portfolio();
        let (exporter, path) = with_font("folio-hangul.ttf");
        assert_eq!(exporter.probe_font(&tree), FontChoice::Embedded(path));

        let font = exporter.select_font(&tree);
        let PdfFont::Embedded(embedded) = &font else {
            panic!("expected the embedded font");
        };
        let hangul: Vec<char> = tree
            .chars()
            .filter(|c| ('가'..='힣').contains(c))
            .collect();
        assert!(!hangul.is_empty());
        for c in &hangul {
            assert_ne!(embedded.glyphs[c].id, 0, "{c} has no glyph");
        }
        let encoded = font.encode("전체메뉴");
        assert_eq!(encoded.len(), 8);
        assert!(encoded.chunks(2).all(|id| id.iter().any(|&b| b != 0)));

        let mut out = Cursor::new(Vec::new());
        exporter.export(&tree, &mut out).unwrap();
        let text = String::from_utf8_lossy(out.get_ref());
        for key in [
            "/Type0",
            "/CIDFontType2",
            "/Identity-H",
            "/FontFile2",
            "/Length1",
            "/ToUnicode",
            "/KoreanFont",
        ] {
            assert!(text.contains(key), "missing {key}");
        }
        assert!(!text.contains("/Helvetica"));
        // ToUnicode maps the subset glyph of 한 (U+D55C) back to its code point.
        let pair = format!("{:04x}> <d55c>", embedded.glyphs[&'한'].id);
        assert!(text.to_lowercase().contains(&pair), "no ToUnicode entry {pair}");
    }

    #[test]
    fn test_collection_candidate_is_embedded() {
        let tree = portfolio();
        let (exporter, path) = with_font("folio-hangul.ttc");
        assert_eq!(exporter.probe_font(&tree), FontChoice::Embedded(path));

        let mut out = Cursor::new(Vec::new());
        exporter.export(&tree, &mut out).unwrap();
        let bytes = out.into_inner();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/FontFile2"));
        assert!(!bytes.windows(4).any(|w| w == b"ttcf"));
    }

    #[test]
    fn test_body_paragraphs_are_justified() {
        let tree = portfolio();
        let flow = build_flow(&tree, &StyleSheet::default());
        let texts: Vec<&TextBlock> = flow
            .iter()
            .filter_map(|f| match f {
                Flowable::Text(block) => Some(block),
                _ => None,
            })
            .collect();
        let body_size = StyleSheet::default().body.size;
        assert!(texts.iter().any(|b| b.justify));
        for block in &texts {
            if block.justify {
                assert_eq!(block.align, Align::Left);
                assert!(block.marker.is_none());
                assert!(block.pieces.iter().all(|p| p.style.size == body_size));
            }
        }
        // Titles, headings and list items keep their own alignment.
        assert!(!texts[0].justify);
        assert!(texts.iter().filter(|b| b.marker.is_some()).all(|b| !b.justify));
    }

    #[test]
    fn test_contact_uses_heading_style() {
        let tree = portfolio();
        let sheet = StyleSheet::default();
        let flow = build_flow(&tree, &sheet);
        let at = flow
            .iter()
            .position(|f| matches!(f, Flowable::Text(b) if b.pieces.first().is_some_and(|p| p.text == "Contact")))
            .unwrap();
        assert_eq!(flow[at - 1], Flowable::Spacer(DISPLAY_TITLE_GAP));
        match &flow[at] {
            Flowable::Text(block) => {
                assert_eq!(block.align, Align::Left);
                assert_eq!(block.pieces[0].style.size, sheet.heading1.size);
                assert_ne!(block.pieces[0].style.size, sheet.title.size);
            }
            other => panic!("expected heading text, got {other:?}"),
        }
    }

    #[test]
    fn test_title_page_comes_first() {
        let tree = portfolio();
        let flow = build_flow(&tree, &StyleSheet::default());
        assert_eq!(flow[0], Flowable::Spacer(DISPLAY_TITLE_GAP));
        match &flow[1] {
            Flowable::Text(block) => {
                assert_eq!(block.align, Align::Center);
                assert_eq!(block.pieces[0].text, "Portfolio");
                assert_eq!(block.pieces[0].style.size, 28.0);
            }
            other => panic!("expected title text, got {other:?}"),
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let tree = portfolio();
        let exporter = helvetica_only();
        let render = || {
            let mut out = Cursor::new(Vec::new());
            exporter.export(&tree, &mut out).unwrap();
            out.into_inner()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_candidates_put_user_fonts_first() {
        let exporter = PdfExporter::new().with_config(PdfConfig {
            font_candidates: vec![PathBuf::from("mine.ttf")],
            ..Default::default()
        });
        let candidates = exporter.font_candidates();
        assert_eq!(candidates[0], PathBuf::from("mine.ttf"));
        assert_eq!(candidates.len(), 1 + default_font_candidates().len());
    }
}

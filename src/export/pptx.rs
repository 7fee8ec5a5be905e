//! PPTX exporter.
//!
//! Slides are planned first ([`plan_slides`]) and then written as a
//! PresentationML package with one master, one theme and two layouts
//! ("Title Slide" and "Title and Content"). Slide size is 10in x 7.5in.

use std::io::{Seek, Write};

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{
    Align, Block, Color, ContentTree, ParagraphRole, Run, SectionLayout, StyleSheet,
};

use super::ooxml::{
    NS_RELATIONSHIPS, Package, Relationships, XML_DECL, content_type, escape_xml, rel,
    root_relationships,
};
use super::{CountUnit, ExportSummary, Exporter};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// 10in x 7.5in in EMU.
const SLIDE_WIDTH: i64 = 9_144_000;
const SLIDE_HEIGHT: i64 = 6_858_000;

const MASTER_ID: u32 = 2_147_483_648;
const FIRST_SLIDE_ID: u32 = 256;

/// Placeholder frames as (x, y, cx, cy) in EMU.
const CENTER_TITLE_FRAME: (i64, i64, i64, i64) = (685_800, 2_130_425, 7_772_400, 1_470_025);
const SUBTITLE_FRAME: (i64, i64, i64, i64) = (1_371_600, 3_886_200, 6_400_800, 1_752_600);
const TITLE_FRAME: (i64, i64, i64, i64) = (457_200, 274_638, 8_229_600, 1_143_000);
const BODY_FRAME: (i64, i64, i64, i64) = (457_200, 1_600_200, 8_229_600, 4_525_963);

/// Bullet left margin and first-line indent per level, in EMU.
const BULLET_MARGIN: [i64; 2] = [342_900, 742_950];
const BULLET_INDENT: [i64; 2] = [-342_900, -285_750];

/// Display title size on title slides, in points.
const DISPLAY_TITLE_SIZE: u32 = 54;

/// Configuration for PPTX export.
#[derive(Debug, Clone, Default)]
pub struct PptxConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

/// Which slide layout a slide uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLayout {
    /// Centered title with a subtitle box.
    Title,
    /// Title bar with a content box.
    Body,
}

impl From<SectionLayout> for SlideLayout {
    fn from(layout: SectionLayout) -> Self {
        match layout {
            SectionLayout::Title | SectionLayout::Closing => SlideLayout::Title,
            SectionLayout::Body => SlideLayout::Body,
        }
    }
}

/// One planned slide: its title, layout and the blocks it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidePlan<'a> {
    pub title: String,
    pub layout: SlideLayout,
    pub blocks: Vec<&'a Block>,
}

impl<'a> SlidePlan<'a> {
    fn new(title: &str, layout: SlideLayout) -> Self {
        Self {
            title: title.to_string(),
            layout,
            blocks: Vec::new(),
        }
    }

    fn finish(mut self) -> Self {
        while matches!(self.blocks.last(), Some(Block::Spacer(_))) {
            self.blocks.pop();
        }
        self
    }
}

/// Split the tree into slides.
///
/// Every section opens a slide titled after the section. A slide break
/// opens another slide, unless the current one has nothing on it yet, in
/// which case it only renames it. Page breaks are dropped, and spacers at
/// the start or end of a slide are trimmed.
pub fn plan_slides(tree: &ContentTree) -> Vec<SlidePlan<'_>> {
    let mut slides = Vec::new();

    for section in tree.sections() {
        let layout = SlideLayout::from(section.layout);
        let mut current = SlidePlan::new(&section.title, layout);

        for block in &section.blocks {
            match block {
                Block::PageBreak => {}
                Block::SlideBreak { title } => {
                    if current.blocks.is_empty() {
                        current.title.clone_from(title);
                    } else {
                        let done = std::mem::replace(&mut current, SlidePlan::new(title, layout));
                        slides.push(done.finish());
                    }
                }
                Block::Spacer(_) if current.blocks.is_empty() => {}
                _ => current.blocks.push(block),
            }
        }
        slides.push(current.finish());
    }

    slides
}

/// PPTX format exporter.
///
/// # Example
///
/// ```no_run
/// use folio::portfolio;
/// use folio::export::{Exporter, PptxExporter};
/// use std::fs::File;
///
/// let mut file = File::create("PORTFOLIO_PRESENTATION.pptx")?;
/// let summary = PptxExporter::new().export(&portfolio(), &mut file)?;
/// assert_eq!(summary.slide_titles.len(), summary.count);
/// # Ok::<(), folio::Error>(())
/// ```
pub struct PptxExporter {
    config: PptxConfig,
    sheet: StyleSheet,
}

impl PptxExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: PptxConfig::default(),
            sheet: StyleSheet::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PptxConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for PptxExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for PptxExporter {
    fn export<W: Write + Seek>(
        &self,
        tree: &ContentTree,
        writer: &mut W,
    ) -> Result<ExportSummary> {
        let slides = plan_slides(tree);
        let mut package = Package::new(self.config.compression_level);

        package.add_part("_rels/.rels", None, root_relationships("ppt/presentation.xml"));

        let mut pres_rels = Relationships::new();
        pres_rels.add(rel::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
        pres_rels.add(rel::THEME, "theme/theme1.xml");
        pres_rels.add(rel::PRES_PROPS, "presProps.xml");
        let slide_rel_ids: Vec<String> = (1..=slides.len())
            .map(|n| pres_rels.add(rel::SLIDE, format!("slides/slide{n}.xml")))
            .collect();

        package.add_part(
            "ppt/presentation.xml",
            Some(content_type::PRESENTATION),
            presentation_xml(&slide_rel_ids),
        );
        package.add_part("ppt/_rels/presentation.xml.rels", None, pres_rels.to_xml());
        package.add_part(
            "ppt/presProps.xml",
            Some(content_type::PRES_PROPS),
            format!(r#"{XML_DECL}<p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_RELATIONSHIPS}" xmlns:p="{NS_P}"/>"#),
        );

        let mut master_rels = Relationships::new();
        master_rels.add(rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        master_rels.add(rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml");
        master_rels.add(rel::THEME, "../theme/theme1.xml");
        package.add_part(
            "ppt/slideMasters/slideMaster1.xml",
            Some(content_type::SLIDE_MASTER),
            master_xml(&self.sheet),
        );
        package.add_part(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            None,
            master_rels.to_xml(),
        );

        for (n, layout) in [SlideLayout::Title, SlideLayout::Body].into_iter().enumerate() {
            let n = n + 1;
            let mut layout_rels = Relationships::new();
            layout_rels.add(rel::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
            package.add_part(
                format!("ppt/slideLayouts/slideLayout{n}.xml"),
                Some(content_type::SLIDE_LAYOUT),
                layout_xml(layout),
            );
            package.add_part(
                format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"),
                None,
                layout_rels.to_xml(),
            );
        }

        package.add_part(
            "ppt/theme/theme1.xml",
            Some(content_type::THEME),
            theme_xml(&self.sheet),
        );

        let language = if tree.language.is_empty() {
            "ko-KR"
        } else {
            tree.language.as_str()
        };
        let writer_ctx = SlideWriter {
            sheet: &self.sheet,
            language,
        };
        for (i, slide) in slides.iter().enumerate() {
            let n = i + 1;
            debug!(slide = n, title = %slide.title, blocks = slide.blocks.len(), "planned slide");

            let layout_target = match slide.layout {
                SlideLayout::Title => "../slideLayouts/slideLayout1.xml",
                SlideLayout::Body => "../slideLayouts/slideLayout2.xml",
            };
            let mut slide_rels = Relationships::new();
            slide_rels.add(rel::SLIDE_LAYOUT, layout_target);

            package.add_part(
                format!("ppt/slides/slide{n}.xml"),
                Some(content_type::SLIDE),
                writer_ctx.slide_xml(slide),
            );
            package.add_part(
                format!("ppt/slides/_rels/slide{n}.xml.rels"),
                None,
                slide_rels.to_xml(),
            );
        }

        package.add_properties(tree, &format!("<Slides>{}</Slides>", slides.len()));
        package.write(writer)?;

        info!(slides = slides.len(), "rendered PPTX");
        let mut summary = ExportSummary::new(slides.len(), CountUnit::Slides);
        summary.slide_titles = slides.into_iter().map(|s| s.title).collect();
        Ok(summary)
    }
}

// ============================================================================
// Slides
// ============================================================================

/// Title size for a slide title, shrinking for longer titles.
fn title_size(title: &str) -> u32 {
    match title.chars().count() {
        0..=12 => 44,
        13..=30 => 36,
        _ => 32,
    }
}

/// Body text size for a content box holding `paragraphs` lines.
fn body_size(paragraphs: usize) -> u32 {
    match paragraphs {
        0..=12 => 18,
        13..=20 => 14,
        21..=28 => 12,
        _ => 10,
    }
}

/// Subtitle size on a title slide.
fn subtitle_size(paragraphs: usize) -> u32 {
    if paragraphs <= 2 { 24 } else { 20 }
}

#[derive(Clone, Copy)]
struct RunProps {
    /// Points.
    size: u32,
    bold: bool,
    italic: bool,
    color: Color,
}

struct SlideWriter<'a> {
    sheet: &'a StyleSheet,
    language: &'a str,
}

impl SlideWriter<'_> {
    fn slide_xml(&self, slide: &SlidePlan<'_>) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECL);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_RELATIONSHIPS}" xmlns:p="{NS_P}"><p:cSld><p:spTree>"#
        ));
        xml.push_str(GROUP_SHAPE_PROPS);

        let title_color = self.sheet.palette.primary;
        let (title_ph, body_ph, title_props, body_props) = match slide.layout {
            SlideLayout::Title => (
                r#"<p:ph type="ctrTitle"/>"#,
                r#"<p:ph type="subTitle" idx="1"/>"#,
                RunProps {
                    size: DISPLAY_TITLE_SIZE,
                    bold: true,
                    italic: false,
                    color: title_color,
                },
                RunProps {
                    size: subtitle_size(slide.blocks.len()),
                    bold: false,
                    italic: false,
                    color: self.sheet.palette.secondary,
                },
            ),
            SlideLayout::Body => (
                r#"<p:ph type="title"/>"#,
                r#"<p:ph idx="1"/>"#,
                RunProps {
                    size: title_size(&slide.title),
                    bold: true,
                    italic: false,
                    color: title_color,
                },
                RunProps {
                    size: body_size(slide.blocks.len()),
                    bold: false,
                    italic: false,
                    color: self.sheet.palette.text,
                },
            ),
        };

        let mut title_body = String::new();
        title_body.push_str("<a:p>");
        self.run(&mut title_body, &slide.title, title_props);
        title_body.push_str("</a:p>");
        shape(&mut xml, 2, "Title 1", title_ph, &title_body);

        if !slide.blocks.is_empty() {
            let mut body = String::new();
            for block in &slide.blocks {
                self.block(&mut body, block, slide.layout, body_props);
            }
            shape(&mut xml, 3, "Content Placeholder 2", body_ph, &body);
        }

        xml.push_str(
            r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        );
        xml
    }

    fn block(&self, xml: &mut String, block: &Block, layout: SlideLayout, base: RunProps) {
        match block {
            Block::Heading { text, .. } => {
                xml.push_str("<a:p>");
                xml.push_str(NO_BULLET);
                let props = RunProps {
                    bold: true,
                    color: self.sheet.color(self.sheet.heading2.tone),
                    size: base.size + 2,
                    ..base
                };
                self.run(xml, text, props);
                xml.push_str("</a:p>");
            }
            Block::Paragraph(paragraph) => {
                let centered = paragraph.align == Align::Center || layout == SlideLayout::Title;
                xml.push_str("<a:p>");
                if centered {
                    xml.push_str(r#"<a:pPr algn="ctr" marL="0" indent="0"><a:buNone/></a:pPr>"#);
                } else {
                    xml.push_str(NO_BULLET);
                }
                let base = match paragraph.role {
                    ParagraphRole::Subtitle => RunProps {
                        color: self.sheet.palette.secondary,
                        ..base
                    },
                    ParagraphRole::Lead => RunProps {
                        color: self.sheet.palette.primary,
                        ..base
                    },
                    ParagraphRole::Body => base,
                };
                self.runs(xml, &paragraph.runs, base);
                xml.push_str("</a:p>");
            }
            Block::Bullet {
                level,
                marker,
                content,
            } => {
                let lvl = usize::from((*level).min(1));
                xml.push_str("<a:p>");
                match marker.glyph() {
                    Some(glyph) => xml.push_str(&format!(
                        r#"<a:pPr marL="{}" lvl="{lvl}" indent="{}"><a:buClr><a:srgbClr val="{}"/></a:buClr><a:buFont typeface="Arial"/><a:buChar char="{glyph}"/></a:pPr>"#,
                        BULLET_MARGIN[lvl],
                        BULLET_INDENT[lvl],
                        self.sheet.palette.primary.to_hex(),
                    )),
                    None => xml.push_str(&format!(
                        r#"<a:pPr marL="{}" lvl="{lvl}" indent="0"><a:buNone/></a:pPr>"#,
                        BULLET_MARGIN[lvl],
                    )),
                }
                let base = if lvl > 0 && base.size > 10 {
                    RunProps {
                        size: base.size - 2,
                        ..base
                    }
                } else {
                    base
                };
                self.runs(xml, &content.runs, base);
                xml.push_str("</a:p>");
            }
            Block::Spacer(_) => {
                xml.push_str(&format!(
                    r#"<a:p>{NO_BULLET}<a:endParaRPr lang="{}" sz="{}"/></a:p>"#,
                    escape_xml(self.language),
                    base.size * 50
                ));
            }
            Block::PageBreak | Block::SlideBreak { .. } => {}
        }
    }

    fn runs(&self, xml: &mut String, runs: &[Run], base: RunProps) {
        for run in runs {
            let props = RunProps {
                bold: base.bold || run.bold,
                italic: base.italic || run.italic,
                color: run.tone.map(|t| self.sheet.color(t)).unwrap_or(base.color),
                ..base
            };
            self.run(xml, &run.text, props);
        }
    }

    fn run(&self, xml: &mut String, text: &str, props: RunProps) {
        if text.is_empty() {
            return;
        }
        let font = escape_xml(&self.sheet.font_family);
        xml.push_str(&format!(
            r#"<a:r><a:rPr lang="{}" altLang="en-US" sz="{}""#,
            escape_xml(self.language),
            props.size * 100
        ));
        if props.bold {
            xml.push_str(r#" b="1""#);
        }
        if props.italic {
            xml.push_str(r#" i="1""#);
        }
        xml.push_str(&format!(
            r#" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{font}"/><a:ea typeface="{font}"/></a:rPr><a:t>{}</a:t></a:r>"#,
            props.color.to_hex(),
            escape_xml(text)
        ));
    }
}

const NO_BULLET: &str = r#"<a:pPr marL="0" indent="0"><a:buNone/></a:pPr>"#;

const GROUP_SHAPE_PROPS: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);

/// A placeholder shape that inherits its frame from the layout.
fn shape(xml: &mut String, id: u32, name: &str, placeholder: &str, paragraphs: &str) {
    xml.push_str(&format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr/><p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        ),
        id = id,
        name = name,
        ph = placeholder,
        body = paragraphs,
    ));
}

/// A placeholder shape with an explicit frame, for masters and layouts.
fn framed_shape(
    xml: &mut String,
    id: u32,
    name: &str,
    placeholder: &str,
    (x, y, cx, cy): (i64, i64, i64, i64),
) {
    xml.push_str(&format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#,
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
        ),
        id = id,
        name = name,
        ph = placeholder,
        x = x,
        y = y,
        cx = cx,
        cy = cy,
    ));
}

// ============================================================================
// Presentation, master, layouts, theme
// ============================================================================

fn presentation_xml(slide_rel_ids: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_RELATIONSHIPS}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    ));
    xml.push_str(&format!(
        r#"<p:sldMasterIdLst><p:sldMasterId id="{MASTER_ID}" r:id="rId1"/></p:sldMasterIdLst>"#
    ));
    xml.push_str("<p:sldIdLst>");
    for (i, rel_id) in slide_rel_ids.iter().enumerate() {
        xml.push_str(&format!(
            r#"<p:sldId id="{}" r:id="{rel_id}"/>"#,
            FIRST_SLIDE_ID as usize + i
        ));
    }
    xml.push_str("</p:sldIdLst>");
    xml.push_str(&format!(
        r#"<p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}" type="screen4x3"/><p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/>"#
    ));
    xml.push_str("</p:presentation>");
    xml
}

fn master_xml(sheet: &StyleSheet) -> String {
    let font = escape_xml(&sheet.font_family);
    let primary = sheet.palette.primary.to_hex();
    let text = sheet.palette.text.to_hex();

    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_RELATIONSHIPS}" xmlns:p="{NS_P}"><p:cSld>"#
    ));
    xml.push_str(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    xml.push_str(GROUP_SHAPE_PROPS);
    framed_shape(&mut xml, 2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, TITLE_FRAME);
    framed_shape(
        &mut xml,
        3,
        "Text Placeholder 2",
        r#"<p:ph type="body" idx="1"/>"#,
        BODY_FRAME,
    );
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
        r#"hlink="hlink" folHlink="folHlink"/>"#,
    ));
    xml.push_str(&format!(
        r#"<p:sldLayoutIdLst><p:sldLayoutId id="{}" r:id="rId1"/><p:sldLayoutId id="{}" r:id="rId2"/></p:sldLayoutIdLst>"#,
        MASTER_ID + 1,
        MASTER_ID + 2
    ));
    xml.push_str(&format!(
        concat!(
            r#"<p:txStyles>"#,
            r#"<p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400" b="1">"#,
            r#"<a:solidFill><a:srgbClr val="{primary}"/></a:solidFill>"#,
            r#"<a:latin typeface="{font}"/><a:ea typeface="{font}"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
            r#"<p:bodyStyle>"#,
            r#"<a:lvl1pPr marL="342900" indent="-342900"><a:buChar char="•"/><a:defRPr sz="1800">"#,
            r#"<a:solidFill><a:srgbClr val="{text}"/></a:solidFill>"#,
            r#"<a:latin typeface="{font}"/><a:ea typeface="{font}"/></a:defRPr></a:lvl1pPr>"#,
            r#"<a:lvl2pPr marL="742950" indent="-285750"><a:buChar char="•"/><a:defRPr sz="1600">"#,
            r#"<a:solidFill><a:srgbClr val="{text}"/></a:solidFill>"#,
            r#"<a:latin typeface="{font}"/><a:ea typeface="{font}"/></a:defRPr></a:lvl2pPr>"#,
            r#"</p:bodyStyle>"#,
            r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle>"#,
            r#"</p:txStyles>"#,
        ),
        primary = primary,
        text = text,
        font = font,
    ));
    xml.push_str("</p:sldMaster>");
    xml
}

fn layout_xml(layout: SlideLayout) -> String {
    let (kind, name) = match layout {
        SlideLayout::Title => ("title", "Title Slide"),
        SlideLayout::Body => ("obj", "Title and Content"),
    };
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_RELATIONSHIPS}" xmlns:p="{NS_P}" type="{kind}" preserve="1"><p:cSld name="{name}"><p:spTree>"#
    ));
    xml.push_str(GROUP_SHAPE_PROPS);
    match layout {
        SlideLayout::Title => {
            framed_shape(&mut xml, 2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, CENTER_TITLE_FRAME);
            framed_shape(
                &mut xml,
                3,
                "Subtitle 2",
                r#"<p:ph type="subTitle" idx="1"/>"#,
                SUBTITLE_FRAME,
            );
        }
        SlideLayout::Body => {
            framed_shape(&mut xml, 2, "Title 1", r#"<p:ph type="title"/>"#, TITLE_FRAME);
            framed_shape(
                &mut xml,
                3,
                "Content Placeholder 2",
                r#"<p:ph idx="1"/>"#,
                BODY_FRAME,
            );
        }
    }
    xml.push_str(
        r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
    );
    xml
}

fn theme_xml(sheet: &StyleSheet) -> String {
    let palette = &sheet.palette;
    let font = escape_xml(&sheet.font_family);
    let srgb = |c: Color| format!(r#"<a:srgbClr val="{}"/>"#, c.to_hex());

    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<a:theme xmlns:a="{NS_A}" name="Portfolio"><a:themeElements>"#));

    xml.push_str(r#"<a:clrScheme name="Portfolio">"#);
    let scheme = [
        ("dk1", Color::BLACK),
        ("lt1", Color::WHITE),
        ("dk2", palette.primary),
        ("lt2", palette.background),
        ("accent1", palette.primary),
        ("accent2", palette.secondary),
        ("accent3", palette.accent),
        ("accent4", palette.text),
        ("accent5", Color::rgb(0x70, 0xAD, 0x47)),
        ("accent6", Color::rgb(0xA5, 0xA5, 0xA5)),
        ("hlink", palette.secondary),
        ("folHlink", palette.primary),
    ];
    for (slot, color) in scheme {
        xml.push_str(&format!("<a:{slot}>{}</a:{slot}>", srgb(color)));
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(&format!(
        concat!(
            r#"<a:fontScheme name="Portfolio">"#,
            r#"<a:majorFont><a:latin typeface="{font}"/><a:ea typeface="{font}"/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="{font}"/><a:ea typeface="{font}"/><a:cs typeface=""/></a:minorFont>"#,
            r#"</a:fontScheme>"#,
        ),
        font = font
    ));

    let phclr = r#"<a:schemeClr val="phClr"/>"#;
    xml.push_str(r#"<a:fmtScheme name="Portfolio"><a:fillStyleLst>"#);
    for _ in 0..3 {
        xml.push_str(&format!("<a:solidFill>{phclr}</a:solidFill>"));
    }
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for width in [9525, 25400, 38100] {
        xml.push_str(&format!(
            r#"<a:ln w="{width}"><a:solidFill>{phclr}</a:solidFill></a:ln>"#
        ));
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(&format!("<a:solidFill>{phclr}</a:solidFill>"));
    }
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");

    xml.push_str("</a:themeElements></a:theme>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, portfolio};
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use std::io::{Cursor, Read};

    const EXPECTED_TITLES: [&str; 13] = [
        "Portfolio",
        "About Me",
        "Technical Skills - Backend",
        "Technical Skills - Frontend & Mobile",
        "Technical Skills - Database & Tools",
        "Key Experience (1/3)",
        "Key Experience (2/3)",
        "Key Experience (3/3)",
        "Featured Project - Miracle Reading System",
        "Featured Project - Productivity Hub",
        "Education & Certifications",
        "Core Competencies",
        "Thank You",
    ];

    fn export(tree: &ContentTree) -> (ExportSummary, Vec<u8>) {
        let mut out = Cursor::new(Vec::new());
        let summary = PptxExporter::new().export(tree, &mut out).unwrap();
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

    #[test]
    fn test_portfolio_plans_thirteen_slides() {
        let tree = portfolio();
        let slides = plan_slides(&tree);
        let titles: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, EXPECTED_TITLES);
        assert_eq!(slides[0].layout, SlideLayout::Title);
        assert_eq!(slides[12].layout, SlideLayout::Title);
        assert!(slides[1..12].iter().all(|s| s.layout == SlideLayout::Body));
    }

    #[test]
    fn test_slides_never_start_or_end_with_spacers() {
        let tree = portfolio();
        for slide in plan_slides(&tree) {
            assert!(!slide.blocks.is_empty(), "{} is empty", slide.title);
            assert!(!matches!(slide.blocks.first(), Some(Block::Spacer(_))));
            assert!(!matches!(slide.blocks.last(), Some(Block::Spacer(_))));
            assert!(slide.blocks.iter().all(|b| !b.is_break()));
        }
    }

    #[test]
    fn test_slide_break_after_content_opens_new_slide() {
        let tree = ContentTree::new("t").with_section(
            Section::new("A")
                .push(Block::text("one"))
                .push(Block::Spacer(10.0))
                .push(Block::slide("B"))
                .push(Block::PageBreak)
                .push(Block::text("two")),
        );
        let slides = plan_slides(&tree);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "A");
        assert_eq!(slides[0].blocks.len(), 1);
        assert_eq!(slides[1].title, "B");
    }

    #[test]
    fn test_size_rules() {
        assert_eq!(title_size("About Me"), 44);
        assert_eq!(title_size("Technical Skills - Backend"), 36);
        assert_eq!(title_size("Featured Project - Miracle Reading System"), 32);
        assert_eq!(body_size(8), 18);
        assert_eq!(body_size(20), 14);
        assert_eq!(body_size(40), 10);
    }

    #[test]
    fn test_export_summary_lists_slides() {
        let (summary, _) = export(&portfolio());
        assert_eq!(summary.count, 13);
        assert_eq!(summary.unit, CountUnit::Slides);
        assert_eq!(summary.slide_titles, EXPECTED_TITLES);
    }

    #[test]
    fn test_parts_are_well_formed() {
        let (_, bytes) = export(&portfolio());
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        for name in names.iter().filter(|n| n.ends_with(".xml") || n.ends_with(".rels")) {
            let xml = read_part(&bytes, name);
            let mut reader = Reader::from_str(&xml);
            loop {
                match reader.read_event() {
                    Ok(Event::Eof) => break,
                    Ok(_) => {}
                    Err(e) => panic!("{name} is malformed: {e}"),
                }
            }
        }
        assert!(names.iter().any(|n| n == "ppt/slides/slide13.xml"));
        assert!(!names.iter().any(|n| n == "ppt/slides/slide14.xml"));
    }

    #[test]
    fn test_presentation_lists_slides_in_order() {
        let (_, bytes) = export(&portfolio());
        let pres = read_part(&bytes, "ppt/presentation.xml");
        assert!(pres.contains(r#"<p:sldId id="256" r:id="rId4"/>"#));
        assert!(pres.contains(r#"<p:sldId id="268" r:id="rId16"/>"#));
        assert!(pres.contains(r#"cx="9144000" cy="6858000""#));

        let about = read_part(&bytes, "ppt/slides/slide2.xml");
        assert!(about.contains("About Me"));
        let skills = read_part(&bytes, "ppt/slides/slide3.xml");
        assert!(skills.contains("Technical Skills - Backend"));
        assert!(skills.contains(r#"<a:buChar char="✓"/>"#));
    }

    #[test]
    fn test_title_slides_use_title_layout() {
        let (_, bytes) = export(&portfolio());
        let rels = read_part(&bytes, "ppt/slides/_rels/slide13.xml.rels");
        assert!(rels.contains("slideLayout1.xml"));
        let slide = read_part(&bytes, "ppt/slides/slide13.xml");
        assert!(slide.contains(r#"type="ctrTitle""#));
        assert!(slide.contains(r#"sz="5400""#));
        assert!(slide.contains("github.com/NAM-IL"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let tree = portfolio();
        assert_eq!(export(&tree).1, export(&tree).1);
    }
}

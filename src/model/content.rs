//! The content tree shared by every renderer.
//!
//! A [`ContentTree`] is an ordered list of [`Section`]s, each holding an
//! ordered list of [`Block`]s. Renderers walk it front to back; nothing
//! is reordered, merged or dropped except the break kinds a format does not
//! understand (slides ignore page breaks, pages ignore slide breaks).

use super::style::Tone;

// ============================================================================
// Tree
// ============================================================================

/// Everything to be rendered, in order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ContentTree {
    pub title: String,
    pub author: String,
    /// BCP 47 language tag used for document metadata.
    pub language: String,
    pub sections: Vec<Section>,
}

impl ContentTree {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: String::new(),
            language: String::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Find a section by its exact title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Position of a section by its exact title.
    pub fn section_index(&self, title: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.title == title)
    }

    /// Every block of every section, in document order.
    pub fn blocks(&self) -> impl Iterator<Item = (&Section, &Block)> {
        self.sections
            .iter()
            .flat_map(|section| section.blocks.iter().map(move |block| (section, block)))
    }

    /// Every character any renderer may draw, including section titles,
    /// slide titles and list markers. Used to decide font coverage.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        let markers = [Marker::Dot, Marker::Check]
            .into_iter()
            .filter_map(Marker::glyph);
        let titles = self.sections.iter().flat_map(|s| s.title.chars());
        let blocks = self.blocks().flat_map(|(_, block)| block.chars());
        self.title.chars().chain(markers).chain(titles).chain(blocks)
    }
}

// ============================================================================
// Section
// ============================================================================

/// How a section's title is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum SectionLayout {
    /// Display title: a title slide, or a centered cover heading on a page.
    Title,
    /// Regular heading followed by body content.
    #[default]
    Body,
    /// Closing section: a title slide in decks, a regular heading below
    /// display spacing on pages.
    Closing,
}

/// A named group of content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Section {
    pub title: String,
    pub layout: SectionLayout,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            layout: SectionLayout::Body,
            blocks: Vec::new(),
        }
    }

    pub fn with_layout(mut self, layout: SectionLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn push(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn extend(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.blocks.extend(blocks);
        self
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// An atomic renderable unit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(
    feature = "cli",
    serde(tag = "type", content = "value", rename_all = "snake_case")
)]
pub enum Block {
    Heading {
        /// 2 for subsections; section titles are level 1 implicitly.
        level: u8,
        text: String,
    },
    Paragraph(Paragraph),
    Bullet {
        /// Zero-based indent level.
        level: u8,
        marker: Marker,
        content: Paragraph,
    },
    /// Vertical whitespace in points.
    Spacer(f32),
    PageBreak,
    SlideBreak {
        title: String,
    },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph::plain(text))
    }

    pub fn paragraph(paragraph: Paragraph) -> Self {
        Block::Paragraph(paragraph)
    }

    pub fn bullet(level: u8, marker: Marker, text: impl Into<String>) -> Self {
        Block::Bullet {
            level,
            marker,
            content: Paragraph::plain(text),
        }
    }

    pub fn bullet_runs(level: u8, marker: Marker, runs: Vec<Run>) -> Self {
        Block::Bullet {
            level,
            marker,
            content: Paragraph::new(runs),
        }
    }

    pub fn slide(title: impl Into<String>) -> Self {
        Block::SlideBreak {
            title: title.into(),
        }
    }

    /// True for the two break kinds.
    pub fn is_break(&self) -> bool {
        matches!(self, Block::PageBreak | Block::SlideBreak { .. })
    }

    fn chars(&self) -> Box<dyn Iterator<Item = char> + '_> {
        match self {
            Block::Heading { text, .. } | Block::SlideBreak { title: text } => {
                Box::new(text.chars())
            }
            Block::Paragraph(p) | Block::Bullet { content: p, .. } => {
                Box::new(p.runs.iter().flat_map(|r| r.text.chars()))
            }
            Block::Spacer(_) | Block::PageBreak => Box::new(std::iter::empty()),
        }
    }
}

/// List item marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum Marker {
    Dot,
    Check,
    /// Continuation line indented like a list item, without a marker.
    None,
}

impl Marker {
    pub fn glyph(self) -> Option<char> {
        match self {
            Marker::Dot => Some('•'),
            Marker::Check => Some('✓'),
            Marker::None => None,
        }
    }
}

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// What a paragraph is for; renderers map this onto their style sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum ParagraphRole {
    #[default]
    Body,
    /// Tagline under a display title.
    Subtitle,
    /// Highlighted one-liner (rendered as an intense quote in DOCX).
    Lead,
}

/// A paragraph of styled runs.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Align,
    pub role: ParagraphRole,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Run::plain(text)])
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_role(mut self, role: ParagraphRole) -> Self {
        self.role = role;
        self
    }

    /// Concatenated run text without styling.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }
}

/// A span of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Palette colour; `None` inherits the paragraph's colour.
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub tone: Option<Tone>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: true,
            ..Default::default()
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }
}

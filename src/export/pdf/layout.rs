//! Line breaking and pagination.
//!
//! The layout engine knows nothing about PDF objects. It turns a flow of
//! [`Flowable`]s into pages of positioned text pieces, measuring text through
//! a caller-supplied function.

use crate::model::{Align, Color};

/// A4 in points.
pub(super) const PAGE_WIDTH: f32 = 595.2756;
pub(super) const PAGE_HEIGHT: f32 = 841.8898;

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 72.0,
            right: 72.0,
            top: 72.0,
            bottom: 18.0,
        }
    }
}

/// Visual style of a text piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SpanStyle {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
}

/// A run of text in one style.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Piece {
    pub text: String,
    pub style: SpanStyle,
}

impl Piece {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A paragraph of styled pieces with its block geometry.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TextBlock {
    pub pieces: Vec<Piece>,
    pub align: Align,
    /// Stretch every line but the last to the frame width by widening the
    /// gaps between words.
    pub justify: bool,
    /// Left indent of the text from the frame edge.
    pub indent: f32,
    /// List marker drawn on the first line, with its offset from the frame edge.
    pub marker: Option<(f32, Piece)>,
    pub space_before: f32,
    pub space_after: f32,
    pub leading: f32,
}

/// One element of the flow.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Flowable {
    Text(TextBlock),
    Spacer(f32),
    PageBreak,
}

/// A piece placed at an absolute position (PDF coordinates).
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Placed {
    pub x: f32,
    pub baseline: f32,
    pub piece: Piece,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Page {
    pub items: Vec<Placed>,
}

// ============================================================================
// Line breaking
// ============================================================================

/// A word: consecutive non-space pieces, plus the style of the space before it.
struct Word {
    space: Option<SpanStyle>,
    pieces: Vec<Piece>,
}

fn push_text(pieces: &mut Vec<Piece>, text: &str, style: SpanStyle) {
    match pieces.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => pieces.push(Piece::new(text, style)),
    }
}

fn split_words(pieces: &[Piece]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut pending_space: Option<SpanStyle> = None;
    let mut in_word = false;

    for piece in pieces {
        for c in piece.text.chars() {
            if c.is_whitespace() {
                if in_word || pending_space.is_none() {
                    pending_space = Some(piece.style);
                }
                in_word = false;
                continue;
            }
            if !in_word {
                words.push(Word {
                    space: pending_space.take(),
                    pieces: Vec::new(),
                });
                in_word = true;
            }
            if let Some(word) = words.last_mut() {
                let mut buf = [0u8; 4];
                push_text(&mut word.pieces, c.encode_utf8(&mut buf), piece.style);
            }
        }
    }
    words
}

/// Greedy line breaking.
///
/// Words are packed while they fit in `width`; runs of whitespace collapse to
/// one space and disappear at line ends. A word wider than `width` is broken
/// between characters, so a line only overflows when it holds a single glyph
/// that is itself wider than `width`.
pub(super) fn wrap<F>(pieces: &[Piece], width: f32, measure: F) -> Vec<Vec<Piece>>
where
    F: Fn(&str, &SpanStyle) -> f32,
{
    let mut lines = Vec::new();
    let mut line: Vec<Piece> = Vec::new();
    let mut line_width = 0.0f32;

    for word in split_words(pieces) {
        let word_width: f32 = word.pieces.iter().map(|p| measure(&p.text, &p.style)).sum();
        let space = word.space.filter(|_| !line.is_empty());
        let space_width = space.map(|style| measure(" ", &style)).unwrap_or(0.0);

        if line_width + space_width + word_width <= width {
            if let Some(style) = space {
                push_text(&mut line, " ", style);
            }
            for piece in &word.pieces {
                push_text(&mut line, &piece.text, piece.style);
            }
            line_width += space_width + word_width;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if word_width <= width {
            for piece in &word.pieces {
                push_text(&mut line, &piece.text, piece.style);
            }
            line_width = word_width;
            continue;
        }

        for piece in &word.pieces {
            for c in piece.text.chars() {
                let mut buf = [0u8; 4];
                let glyph = c.encode_utf8(&mut buf);
                let glyph_width = measure(glyph, &piece.style);
                if !line.is_empty() && line_width + glyph_width > width {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                push_text(&mut line, glyph, piece.style);
                line_width += glyph_width;
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Extra width per inter-word space that spreads `slack` across `line`.
fn word_gap(line: &[Piece], slack: f32) -> f32 {
    let spaces = line
        .iter()
        .map(|p| p.text.matches(' ').count())
        .sum::<usize>();
    if spaces == 0 || slack <= 0.0 {
        0.0
    } else {
        slack / spaces as f32
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Lays out a flow onto A4 pages.
pub(super) struct Paginator<F> {
    margins: Margins,
    measure: F,
    pages: Vec<Page>,
    current: Page,
    /// Top of the next line, in PDF coordinates.
    cursor: f32,
    /// True when the current page was opened because the previous one filled up.
    overflowed: bool,
}

impl<F> Paginator<F>
where
    F: Fn(&str, &SpanStyle) -> f32,
{
    pub fn new(margins: Margins, measure: F) -> Self {
        Self {
            margins,
            measure,
            pages: Vec::new(),
            current: Page::default(),
            cursor: PAGE_HEIGHT - margins.top,
            overflowed: false,
        }
    }

    fn frame_width(&self) -> f32 {
        PAGE_WIDTH - self.margins.left - self.margins.right
    }

    fn top(&self) -> f32 {
        PAGE_HEIGHT - self.margins.top
    }

    fn at_top(&self) -> bool {
        self.current.items.is_empty() && self.cursor >= self.top()
    }

    fn new_page(&mut self, overflowed: bool) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = self.top();
        self.overflowed = overflowed;
    }

    pub fn push(&mut self, flowable: &Flowable) {
        match flowable {
            Flowable::PageBreak => {
                if !self.current.items.is_empty() || self.cursor < self.top() {
                    self.new_page(false);
                }
            }
            Flowable::Spacer(height) => {
                if self.overflowed && self.at_top() {
                    return;
                }
                if self.cursor - height < self.margins.bottom {
                    self.new_page(true);
                    return;
                }
                self.cursor -= height;
            }
            Flowable::Text(block) => self.text(block),
        }
    }

    fn text(&mut self, block: &TextBlock) {
        if !self.at_top() {
            self.cursor -= block.space_before;
        }

        let available = self.frame_width() - block.indent;
        let lines = wrap(&block.pieces, available, &self.measure);
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.into_iter().enumerate() {
            if self.cursor - block.leading < self.margins.bottom && !self.at_top() {
                self.new_page(true);
            }
            let size = line
                .iter()
                .map(|p| p.style.size)
                .fold(0.0f32, f32::max);
            let baseline = self.cursor - size;
            let line_width: f32 = line.iter().map(|p| (self.measure)(&p.text, &p.style)).sum();

            let mut x = self.margins.left + block.indent;
            if block.align == Align::Center {
                x += ((available - line_width) / 2.0).max(0.0);
            }
            let gap = if block.justify && i < last {
                word_gap(&line, available - line_width)
            } else {
                0.0
            };

            if i == 0
                && let Some((offset, marker)) = &block.marker
            {
                self.current.items.push(Placed {
                    x: self.margins.left + offset,
                    baseline,
                    piece: marker.clone(),
                });
            }

            for piece in line {
                if gap > 0.0 {
                    x = self.place_spread(&piece, x, baseline, gap);
                    continue;
                }
                let width = (self.measure)(&piece.text, &piece.style);
                self.current.items.push(Placed { x, baseline, piece });
                x += width;
            }
            self.cursor -= block.leading;
            self.overflowed = false;
        }

        self.cursor -= block.space_after;
    }

    /// Place `piece` word by word, adding `gap` after every space. Returns
    /// the x position after the piece.
    fn place_spread(&mut self, piece: &Piece, mut x: f32, baseline: f32, gap: f32) -> f32 {
        for (n, word) in piece.text.split(' ').enumerate() {
            if n > 0 {
                x += (self.measure)(" ", &piece.style) + gap;
            }
            if word.is_empty() {
                continue;
            }
            self.current.items.push(Placed {
                x,
                baseline,
                piece: Piece::new(word, piece.style),
            });
            x += (self.measure)(word, &piece.style);
        }
        x
    }

    pub fn finish(mut self) -> Vec<Page> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

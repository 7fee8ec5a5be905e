//! Font selection and metrics for the PDF renderer.
//!
//! The renderer prefers an embedded TrueType font that covers Hangul.
//! Candidates are probed in order; the first TrueType file (or the first face
//! of a collection) that parses is subset to the glyphs the document uses and
//! registered under the logical name `KoreanFont`. Otherwise the built-in
//! Helvetica family is used with WinAnsi encoding.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use allsorts::binary::read::ReadScope;
use allsorts::font_data::FontData as AllsortsFontData;
use allsorts::subset::{CmapTarget, SubsetProfile, subset};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Logical name the embedded font is registered under.
pub(super) const EMBEDDED_FONT_NAME: &str = "KoreanFont";

/// Platform font files tried after any user-supplied candidates.
pub fn default_font_candidates() -> Vec<PathBuf> {
    [
        "C:/Windows/Fonts/malgun.ttf",
        "C:/Windows/Fonts/gulim.ttc",
        "C:/Windows/Fonts/batang.ttc",
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
        "/usr/share/fonts/nanum/NanumGothic.ttf",
        "/System/Library/Fonts/Supplemental/AppleGothic.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// Which font a PDF render uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    /// A TrueType file embedded as `KoreanFont`.
    Embedded(PathBuf),
    /// The built-in Helvetica family; characters outside WinAnsi print as `?`.
    Helvetica,
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontChoice::Embedded(path) => {
                write!(f, "{EMBEDDED_FONT_NAME} ({})", path.display())
            }
            FontChoice::Helvetica => f.write_str("Helvetica"),
        }
    }
}

// ============================================================================
// Embedded TrueType font
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Glyph {
    pub id: u16,
    /// Advance in thousandths of an em.
    pub advance: f32,
}

/// A parsed TrueType font plus the glyphs the document needs.
#[derive(Debug, Clone)]
pub(super) struct EmbeddedFont {
    pub path: PathBuf,
    /// The `FontFile2` program: a subset holding only the used glyphs, or the
    /// whole single-face file when subsetting failed.
    pub data: Vec<u8>,
    /// Glyphs keyed by character, ordered for stable output. Ids refer to
    /// glyphs in `data`.
    pub glyphs: BTreeMap<char, Glyph>,
    /// Advance of the `.notdef` glyph, used for uncovered characters.
    pub missing_advance: f32,
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub bbox: [f32; 4],
}

impl EmbeddedFont {
    /// Load `path` and resolve glyphs for `chars`.
    ///
    /// A font collection contributes its first face. Collections must
    /// subset, because the collection file itself cannot be a `FontFile2`
    /// stream; a single face falls back to embedding the whole file.
    pub fn load(path: &Path, chars: impl IntoIterator<Item = char>) -> Result<Self> {
        let data = std::fs::read(path)?;
        let collection = ttf_parser::fonts_in_collection(&data).is_some();

        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        if face.tables().glyf.is_none() {
            return Err(Error::Font(format!(
                "{} has no TrueType outlines",
                path.display()
            )));
        }

        let scale = 1000.0 / f32::from(face.units_per_em());
        let advance =
            |id: ttf_parser::GlyphId| f32::from(face.glyph_hor_advance(id).unwrap_or(0)) * scale;

        let mut glyphs = BTreeMap::new();
        let mut missing = 0usize;
        for c in chars {
            if glyphs.contains_key(&c) || c.is_control() {
                continue;
            }
            match face.glyph_index(c) {
                Some(id) => {
                    glyphs.insert(
                        c,
                        Glyph {
                            id: id.0,
                            advance: advance(id),
                        },
                    );
                }
                None => missing += 1,
            }
        }
        if missing > 0 {
            debug!(path = %path.display(), missing, "font does not cover every character");
        }

        let bbox = face.global_bounding_box();
        let mut font = Self {
            path: path.to_path_buf(),
            missing_advance: advance(ttf_parser::GlyphId(0)),
            ascent: f32::from(face.ascender()) * scale,
            descent: f32::from(face.descender()) * scale,
            cap_height: f32::from(face.capital_height().unwrap_or(face.ascender())) * scale,
            bbox: [
                f32::from(bbox.x_min) * scale,
                f32::from(bbox.y_min) * scale,
                f32::from(bbox.x_max) * scale,
                f32::from(bbox.y_max) * scale,
            ],
            glyphs,
            data: Vec::new(),
        };

        match font.subset_program(&data) {
            Ok(program) => {
                debug!(
                    path = %path.display(),
                    original = data.len(),
                    subset = program.len(),
                    "subset embedded font"
                );
                font.data = program;
            }
            Err(e) if collection => return Err(e),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "embedding the full font file");
                font.data = data;
            }
        }
        Ok(font)
    }

    /// Cut face 0 of `data` down to `.notdef` plus the resolved glyphs and
    /// renumber `self.glyphs` to match. Subset glyph ids follow the order of
    /// the id list handed to the subsetter.
    fn subset_program(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let used: BTreeSet<u16> = self.glyphs.values().map(|g| g.id).collect();
        let mut ids = Vec::with_capacity(used.len() + 1);
        ids.push(0);
        ids.extend(used.into_iter().filter(|&id| id != 0));

        let scope = ReadScope::new(data);
        let font_data = scope
            .read::<AllsortsFontData>()
            .map_err(|e| subset_error(&self.path, e))?;
        let provider = font_data
            .table_provider(0)
            .map_err(|e| subset_error(&self.path, e))?;
        let program = subset(&provider, &ids, &SubsetProfile::Pdf, CmapTarget::default())
            .map_err(|e| subset_error(&self.path, e))?;

        let renumbered: BTreeMap<u16, u16> = ids
            .iter()
            .enumerate()
            .filter_map(|(new, &old)| u16::try_from(new).ok().map(|new| (old, new)))
            .collect();
        for glyph in self.glyphs.values_mut() {
            glyph.id = renumbered.get(&glyph.id).copied().unwrap_or(0);
        }
        Ok(program)
    }
}

fn subset_error(path: &Path, e: impl fmt::Display) -> Error {
    Error::Font(format!("{}: cannot subset: {e}", path.display()))
}

// ============================================================================
// Font in use
// ============================================================================

/// The font a render draws with.
#[derive(Debug, Clone)]
pub(super) enum PdfFont {
    Helvetica,
    Embedded(EmbeddedFont),
}

impl PdfFont {
    /// Probe `candidates` in order and pick the first usable font.
    pub fn select(candidates: &[PathBuf], chars: &BTreeSet<char>) -> Self {
        for path in candidates {
            if !path.is_file() {
                debug!(path = %path.display(), "font candidate not found");
                continue;
            }
            match EmbeddedFont::load(path, chars.iter().copied()) {
                Ok(font) => {
                    info!(path = %path.display(), glyphs = font.glyphs.len(), "registered {EMBEDDED_FONT_NAME}");
                    return PdfFont::Embedded(font);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping font candidate"),
            }
        }
        warn!("no usable font file found, falling back to Helvetica");
        PdfFont::Helvetica
    }

    pub fn choice(&self) -> FontChoice {
        match self {
            PdfFont::Helvetica => FontChoice::Helvetica,
            PdfFont::Embedded(font) => FontChoice::Embedded(font.path.clone()),
        }
    }

    /// Advance of `c` in thousandths of an em.
    pub fn advance(&self, c: char, bold: bool) -> f32 {
        match self {
            PdfFont::Helvetica => helvetica_width(winansi_byte(c), bold),
            PdfFont::Embedded(font) => font
                .glyphs
                .get(&c)
                .map(|g| g.advance)
                .unwrap_or(font.missing_advance),
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32, bold: bool) -> f32 {
        text.chars().map(|c| self.advance(c, bold)).sum::<f32>() * size / 1000.0
    }

    /// Bytes for a `Tj` operand.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            PdfFont::Helvetica => text.chars().map(winansi_byte).collect(),
            PdfFont::Embedded(font) => text
                .chars()
                .flat_map(|c| font.glyphs.get(&c).map(|g| g.id).unwrap_or(0).to_be_bytes())
                .collect(),
        }
    }

    /// Resource name for a style, and whether bold and italic must be
    /// synthesized because the font has no such variant.
    pub fn resource(&self, bold: bool, italic: bool) -> (&'static str, bool, bool) {
        match self {
            PdfFont::Helvetica => {
                let name = match (bold, italic) {
                    (false, false) => "F1",
                    (true, false) => "F2",
                    (false, true) => "F3",
                    (true, true) => "F4",
                };
                (name, false, false)
            }
            PdfFont::Embedded(_) => ("F1", bold, italic),
        }
    }
}

/// Base font names of the built-in family, by resource name.
pub(super) const HELVETICA_FACES: [(&str, &str); 4] = [
    ("F1", "Helvetica"),
    ("F2", "Helvetica-Bold"),
    ("F3", "Helvetica-Oblique"),
    ("F4", "Helvetica-BoldOblique"),
];

/// WinAnsi code for `c`, or `?` when the character has none.
pub(super) fn winansi_byte(c: char) -> u8 {
    if c.is_ascii() {
        return if c.is_ascii_control() { b'?' } else { c as u8 };
    }
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    match bytes.first() {
        Some(&b) if !had_errors && bytes.len() == 1 => b,
        _ => b'?',
    }
}

// ============================================================================
// Helvetica metrics
// ============================================================================

/// Helvetica advance widths for 0x20..=0x7E, in thousandths of an em.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// WinAnsi bullet.
const BULLET_CODE: u8 = 0x95;

fn helvetica_width(code: u8, bold: bool) -> f32 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let width = match code {
        0x20..=0x7E => table[usize::from(code - 0x20)],
        BULLET_CODE => 350,
        _ => 556,
    };
    f32::from(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

    fn fixture(name: &str) -> PathBuf {
        Path::new(FIXTURES_DIR).join(name)
    }

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(winansi_byte('A'), b'A');
        assert_eq!(winansi_byte('•'), BULLET_CODE);
        assert_eq!(winansi_byte('é'), 0xE9);
        assert_eq!(winansi_byte('한'), b'?');
        assert_eq!(winansi_byte('✓'), b'?');
        assert_eq!(winansi_byte('\n'), b'?');
    }

    #[test]
    fn test_helvetica_widths() {
        let font = PdfFont::Helvetica;
        assert_eq!(font.advance(' ', false), 278.0);
        assert_eq!(font.advance('W', false), 944.0);
        assert_eq!(font.advance('b', true), 611.0);
        assert!((font.text_width("ii", 10.0, false) - 4.44).abs() < 1e-4);
    }

    #[test]
    fn test_helvetica_encoding_degrades_to_question_marks() {
        let font = PdfFont::Helvetica;
        assert_eq!(font.encode("Java • 자바"), b"Java \x95 ??".to_vec());
    }

    #[test]
    fn test_helvetica_resources_cover_styles() {
        let font = PdfFont::Helvetica;
        assert_eq!(font.resource(false, false), ("F1", false, false));
        assert_eq!(font.resource(true, true), ("F4", false, false));
        for (name, _) in HELVETICA_FACES {
            assert!(["F1", "F2", "F3", "F4"].contains(&name));
        }
    }

    #[test]
    fn test_missing_candidates_fall_back() {
        let candidates = vec![PathBuf::from("/nonexistent/malgun.ttf")];
        let font = PdfFont::select(&candidates, &"한글".chars().collect());
        assert_eq!(font.choice(), FontChoice::Helvetica);
    }

    #[test]
    fn test_unparsable_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let garbage = dir.path().join("broken.ttf");
        std::fs::write(&garbage, b"not a font").unwrap();
        let empty_collection = dir.path().join("empty.ttc");
        let mut ttc = b"ttcf\x00\x01\x00\x00\x00\x00\x00\x01".to_vec();
        ttc.extend_from_slice(&16u32.to_be_bytes());
        std::fs::write(&empty_collection, ttc).unwrap();

        assert!(matches!(
            EmbeddedFont::load(&garbage, "a".chars()),
            Err(Error::Font(_))
        ));
        assert!(matches!(
            EmbeddedFont::load(&empty_collection, "a".chars()),
            Err(Error::Font(_))
        ));

        let font = PdfFont::select(&[empty_collection, garbage], &BTreeSet::from(['a']));
        assert_eq!(font.choice(), FontChoice::Helvetica);
    }

    #[test]
    fn test_subset_renumbers_glyphs() {
        let path = fixture("folio-hangul.ttf");
        let font = EmbeddedFont::load(&path, "A한✓".chars()).unwrap();

        // .notdef stays 0; used glyphs follow in original id order.
        assert_eq!(font.glyphs[&'A'].id, 1);
        assert_eq!(font.glyphs[&'한'].id, 2);
        assert!(!font.glyphs.contains_key(&'✓'));
        assert_eq!(font.glyphs[&'한'].advance, 1000.0);

        let original = std::fs::metadata(&path).unwrap().len() as usize;
        assert!(font.data.len() < original);
        let face = ttf_parser::Face::parse(&font.data, 0).unwrap();
        assert_eq!(face.number_of_glyphs(), 3);
        assert_eq!(face.glyph_hor_advance(ttf_parser::GlyphId(2)), Some(1000));
        assert_eq!(face.glyph_hor_advance(ttf_parser::GlyphId(1)), Some(600));
    }

    #[test]
    fn test_collection_embeds_first_face() {
        let path = fixture("folio-hangul.ttc");
        let font = EmbeddedFont::load(&path, "한글 Portfolio".chars()).unwrap();

        assert!(font.glyphs[&'한'].id > 0);
        assert!(font.glyphs[&'글'].id > 0);
        // A bare sfnt, not the collection wrapper.
        assert_eq!(&font.data[..4], &[0, 1, 0, 0]);
        assert!(ttf_parser::fonts_in_collection(&font.data).is_none());

        let chars: BTreeSet<char> = "한글".chars().collect();
        let selected = PdfFont::select(&[PathBuf::from("/nonexistent/malgun.ttf"), path.clone()], &chars);
        assert_eq!(selected.choice(), FontChoice::Embedded(path));
    }

    #[test]
    fn test_embedded_encoding_uses_subset_ids() {
        let font = PdfFont::Embedded(
            EmbeddedFont::load(&fixture("folio-hangul.ttf"), "A한".chars()).unwrap(),
        );
        assert_eq!(font.encode("A한✓"), vec![0, 1, 0, 2, 0, 0]);
        assert_eq!(font.advance('한', false), 1000.0);
        assert_eq!(font.resource(true, false), ("F1", true, false));
    }

    #[test]
    fn test_default_candidates_start_with_malgun() {
        let candidates = default_font_candidates();
        assert!(candidates[0].ends_with("malgun.ttf"));
        assert!(candidates.iter().any(|p| p.ends_with("gulim.ttc")));
    }
}

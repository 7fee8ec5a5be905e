//! Export module for rendering the content tree to document formats.
//!
//! Provides the `Exporter` trait and format-specific implementations.
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` writes to any `Write + Seek` destination
//!
//! # Example
//!
//! ```no_run
//! use folio::portfolio;
//! use folio::export::{DocxExporter, Exporter};
//! use std::fs::File;
//!
//! let tree = portfolio();
//! let mut file = File::create("PORTFOLIO_PRESENTATION.docx")?;
//! let summary = DocxExporter::new().export(&tree, &mut file)?;
//! println!("{summary}");
//! # Ok::<(), folio::Error>(())
//! ```

use std::fmt;
use std::io::{Seek, Write};

use crate::error::Result;
use crate::model::ContentTree;

#[cfg(any(feature = "docx", feature = "pptx"))]
mod ooxml;

#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "pptx")]
mod pptx;

#[cfg(feature = "docx")]
pub use docx::{DocxConfig, DocxExporter};
#[cfg(feature = "pdf")]
pub use pdf::{FontChoice, PdfConfig, PdfExporter, default_font_candidates};
#[cfg(feature = "pptx")]
pub use pptx::{PptxConfig, PptxExporter, SlideLayout, SlidePlan, plan_slides};

/// Trait for exporting the content tree to a specific format.
///
/// Exporters hold their configuration, and the `export` method writes to
/// any `Write + Seek` destination:
/// - `std::fs::File` for disk output
/// - `std::io::Cursor<Vec<u8>>` for in-memory output
pub trait Exporter {
    /// Render the tree into `writer` and report what was produced.
    fn export<W: Write + Seek>(&self, tree: &ContentTree, writer: &mut W)
    -> Result<ExportSummary>;
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    Docx,
    Pdf,
    Pptx,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Docx, Format::Pdf, Format::Pptx];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Docx => "docx",
            Format::Pdf => "pdf",
            Format::Pptx => "pptx",
        }
    }

    /// Cargo feature that compiles the renderer in.
    pub fn feature(self) -> &'static str {
        match self {
            Format::Docx => "docx",
            Format::Pdf => "pdf",
            Format::Pptx => "pptx",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Format::Docx => "DOCX",
            Format::Pdf => "PDF",
            Format::Pptx => "PPTX",
        }
    }

    /// Whether this build contains the renderer.
    pub fn is_available(self) -> bool {
        match self {
            Format::Docx => cfg!(feature = "docx"),
            Format::Pdf => cfg!(feature = "pdf"),
            Format::Pptx => cfg!(feature = "pptx"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of element an exporter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountUnit {
    Paragraphs,
    Flowables,
    Slides,
}

impl fmt::Display for CountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CountUnit::Paragraphs => "paragraphs",
            CountUnit::Flowables => "flowables",
            CountUnit::Slides => "slides",
        })
    }
}

/// What an exporter produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub count: usize,
    pub unit: CountUnit,
    /// Titles of the produced slides, in order (slide decks only).
    pub slide_titles: Vec<String>,
}

impl ExportSummary {
    pub fn new(count: usize, unit: CountUnit) -> Self {
        Self {
            count,
            unit,
            slide_titles: Vec::new(),
        }
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.unit)
    }
}

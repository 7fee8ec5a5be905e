//! # folio
//!
//! Render one portfolio into three document formats from a single content
//! tree.
//!
//! ## Features
//!
//! - One literal [`ContentTree`] ([`portfolio`]) shared by every renderer
//! - DOCX, PDF and PPTX exporters behind the [`Exporter`] trait
//! - Korean text in PDF through an embedded TrueType font when one is found
//! - Fallback to a timestamped file name when the output file is locked
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{Format, RenderOptions, portfolio, render};
//!
//! let tree = portfolio();
//! let report = render(&tree, Format::Pptx, &RenderOptions::default())?;
//! println!("{} ({} {})", report.path.display(), report.count, report.unit);
//! # Ok::<(), folio::Error>(())
//! ```
//!
//! ## Writing to Memory
//!
//! Exporters write to any `Write + Seek` destination:
//!
//! ```
//! use folio::export::{DocxExporter, Exporter};
//! use folio::portfolio;
//! use std::io::Cursor;
//!
//! let mut out = Cursor::new(Vec::new());
//! let summary = DocxExporter::new().export(&portfolio(), &mut out)?;
//! assert!(summary.count > 0);
//! # Ok::<(), folio::Error>(())
//! ```

pub mod error;
pub mod export;
pub mod model;
pub mod output;

#[cfg(feature = "cli")]
pub mod app;

use std::fs;
use std::io::{self, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

pub use error::{Error, Result};
pub use export::{CountUnit, ExportSummary, Exporter, Format};
pub use model::{
    Align, Block, Color, ContentTree, Marker, Palette, Paragraph, ParagraphRole, Run, Section,
    SectionLayout, StyleSheet, TextStyle, Tone, portfolio,
};
pub use output::{LockPolicy, OutputTarget};

/// Settings for [`render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory the output file is written to; created if missing.
    pub out_dir: PathBuf,
    /// Lock policy; `None` uses the per-format default
    /// ([`LockPolicy::Timestamp`] for PDF, [`LockPolicy::Fail`] otherwise).
    pub lock_policy: Option<LockPolicy>,
    /// Font files the PDF renderer tries before the platform candidates.
    pub font_candidates: Vec<PathBuf>,
    /// Whether the PDF renderer also tries the platform font locations.
    pub system_fonts: bool,
    /// Write probe used to detect a locked output file.
    pub lock_probe: fn(&Path) -> bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(output::DEFAULT_OUT_DIR),
            lock_policy: None,
            font_candidates: Vec::new(),
            system_fonts: true,
            lock_probe: output::probe_writable,
        }
    }
}

impl RenderOptions {
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Effective lock policy for `format`.
    pub fn lock_policy_for(&self, format: Format) -> LockPolicy {
        self.lock_policy.unwrap_or(match format {
            Format::Pdf => LockPolicy::Timestamp,
            Format::Docx | Format::Pptx => LockPolicy::Fail,
        })
    }
}

/// What a successful [`render`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub format: Format,
    pub path: PathBuf,
    pub count: usize,
    pub unit: CountUnit,
    /// True when the output went to a timestamped name because the default
    /// file was locked.
    pub fell_back: bool,
    /// Slide titles in order (slide decks only).
    pub slide_titles: Vec<String>,
}

/// Render `tree` as `format` into `options.out_dir`.
pub fn render(tree: &ContentTree, format: Format, options: &RenderOptions) -> Result<RenderReport> {
    require(format, format.is_available())?;

    fs::create_dir_all(&options.out_dir)?;
    let path = output::default_path(&options.out_dir, format.extension());
    let target = OutputTarget::resolve_with(
        &path,
        options.lock_policy_for(format),
        options.lock_probe,
        Local::now().naive_local(),
    );

    let mut buffer = Cursor::new(Vec::new());
    let summary = export_to(tree, format, options, &mut buffer)?;
    write_output(&target.path, buffer.get_ref())?;

    info!(
        format = %format,
        path = %target.path.display(),
        count = summary.count,
        unit = %summary.unit,
        "wrote output"
    );

    Ok(RenderReport {
        format,
        path: target.path,
        count: summary.count,
        unit: summary.unit,
        fell_back: target.fell_back,
        slide_titles: summary.slide_titles,
    })
}

fn export_to<W: Write + Seek>(
    tree: &ContentTree,
    format: Format,
    options: &RenderOptions,
    writer: &mut W,
) -> Result<ExportSummary> {
    match format {
        #[cfg(feature = "docx")]
        Format::Docx => export::DocxExporter::new().export(tree, writer),
        #[cfg(feature = "pdf")]
        Format::Pdf => export::PdfExporter::new()
            .with_config(export::PdfConfig {
                font_candidates: options.font_candidates.clone(),
                system_fonts: options.system_fonts,
                ..Default::default()
            })
            .export(tree, writer),
        #[cfg(feature = "pptx")]
        Format::Pptx => export::PptxExporter::new().export(tree, writer),
        #[allow(unreachable_patterns)]
        _ => {
            let _ = (tree, options, writer);
            Err(missing_dependency(format))
        }
    }
}

/// Fail with [`Error::MissingDependency`] unless the renderer for `format`
/// is compiled in.
fn require(format: Format, available: bool) -> Result<()> {
    if available {
        Ok(())
    } else {
        Err(missing_dependency(format))
    }
}

fn missing_dependency(format: Format) -> Error {
    Error::MissingDependency {
        format: format.label(),
        feature: format.feature(),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| map_write_error(path, source))
}

fn map_write_error(path: &Path, source: io::Error) -> Error {
    if is_locked(&source) {
        Error::OutputUnwritable {
            path: path.to_path_buf(),
            source,
        }
    } else {
        Error::Io(source)
    }
}

/// Permission failures, plus the Windows sharing and lock violations a
/// viewer holding the file produces.
fn is_locked(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
        || (cfg!(windows) && matches!(err.raw_os_error(), Some(32 | 33)))
}

//! Command-line front end shared by the `folio` binary and the per-format
//! entry points.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use crate::export::Format;
use crate::model::{ContentTree, portfolio};
use crate::output::{DEFAULT_OUT_DIR, LockPolicy};
use crate::{Error, RenderOptions, RenderReport, render};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about = "Render the portfolio as DOCX, PDF and PPTX", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio                       Render all three formats into ./doc/
    folio pptx                  Render only the slide deck
    folio pdf --font NanumGothic.ttf
                                Use a specific font for Korean text
    folio --outline             Show the sections and slide plan
    folio --outline --json      Dump the content tree as JSON")]
pub struct Cli {
    /// Formats to render (all when omitted)
    #[arg(value_enum, value_name = "FORMAT")]
    pub formats: Vec<Format>,

    /// Output directory, relative to the current working directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// TrueType font to try first for PDF output (repeatable)
    #[arg(long = "font", value_name = "PATH")]
    pub fonts: Vec<PathBuf>,

    /// Do not look for fonts in the platform font directories
    #[arg(long)]
    pub no_system_fonts: bool,

    /// What to do when the output file is open in another program
    #[arg(long, value_enum, value_name = "POLICY")]
    pub lock_policy: Option<LockPolicy>,

    /// Print the content outline without rendering
    #[arg(long)]
    pub outline: bool,

    /// Print the outline as JSON
    #[arg(long, requires = "outline")]
    pub json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Requested formats, defaulting to all of them.
    pub fn selected_formats(&self) -> Vec<Format> {
        if self.formats.is_empty() {
            return Format::ALL.to_vec();
        }
        let mut formats = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        formats
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            out_dir: self.out_dir.clone(),
            lock_policy: self.lock_policy,
            font_candidates: self.fonts.clone(),
            system_fonts: !self.no_system_fonts,
            ..Default::default()
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the combined CLI.
pub fn run(cli: &Cli) -> ExitCode {
    let tree = portfolio();

    if cli.outline {
        return match print_outline(&tree, cli.json, &cli.render_options()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let options = cli.render_options();
    let mut failed = false;
    for format in cli.selected_formats() {
        if !render_one(&tree, format, &options, cli.quiet) {
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Entry point for the single-format binaries: default options, no arguments.
pub fn run_standalone(format: Format) -> ExitCode {
    init_tracing();
    let tree = portfolio();
    if render_one(&tree, format, &RenderOptions::default(), false) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn render_one(tree: &ContentTree, format: Format, options: &RenderOptions, quiet: bool) -> bool {
    match render(tree, format, options) {
        Ok(report) => {
            if !quiet {
                print_report(&report);
            }
            true
        }
        Err(e) => {
            report_error(format, &e);
            false
        }
    }
}

fn print_report(report: &RenderReport) {
    println!("{} created: {}", report.format, report.path.display());
    if report.fell_back {
        println!("  (default file was locked; wrote to a new file name)");
    }
    println!("  {} {}", report.count, report.unit);
    for (i, title) in report.slide_titles.iter().enumerate() {
        println!("  {:>2}. {title}", i + 1);
    }
}

fn report_error(format: Format, err: &Error) {
    eprintln!("error: {format} generation failed: {err}");
    match err.remediation() {
        Some(lines) => {
            for line in lines {
                eprintln!("  - {line}");
            }
        }
        None => {
            let mut source = std::error::Error::source(err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
        }
    }
    eprintln!("FAILURE");
}

/// Print the sections and slide plan, or the whole tree as JSON.
pub fn print_outline(tree: &ContentTree, json: bool, options: &RenderOptions) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, tree).map_err(io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", tree.title)?;
    if !tree.author.is_empty() {
        writeln!(out, "by {}", tree.author)?;
    }
    writeln!(out)?;
    writeln!(out, "Sections:")?;
    for (i, section) in tree.sections().iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {} ({} blocks)",
            i + 1,
            section.title,
            section.blocks.len()
        )?;
    }

    #[cfg(feature = "pptx")]
    {
        let slides = crate::export::plan_slides(tree);
        writeln!(out)?;
        writeln!(out, "Slides ({}):", slides.len())?;
        for (i, slide) in slides.iter().enumerate() {
            writeln!(out, "  {:>2}. {}", i + 1, slide.title)?;
        }
    }

    #[cfg(feature = "pdf")]
    {
        let choice = crate::export::PdfExporter::new()
            .with_config(crate::export::PdfConfig {
                font_candidates: options.font_candidates.clone(),
                system_fonts: options.system_fonts,
                ..Default::default()
            })
            .probe_font(tree);
        writeln!(out)?;
        writeln!(out, "PDF font: {choice}")?;
    }

    #[cfg(not(feature = "pdf"))]
    let _ = options;
    Ok(())
}

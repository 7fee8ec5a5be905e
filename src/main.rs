//! folio - render the portfolio as DOCX, PDF and PPTX

use std::process::ExitCode;

use clap::Parser;

use folio::app::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    app::init_tracing();
    app::run(&cli)
}

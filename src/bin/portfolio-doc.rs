//! portfolio-doc - write the portfolio Word document to doc/
//!
//! `doc/` is relative to the current working directory. Run from the
//! directory the output should land in, or use `folio -o DIR`.

use std::process::ExitCode;

use folio::Format;
use folio::app;

fn main() -> ExitCode {
    app::run_standalone(Format::Docx)
}

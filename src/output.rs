//! Output file naming and the locked-file fallback.
//!
//! Every renderer writes `PORTFOLIO_PRESENTATION.<ext>` into one directory.
//! When the file already exists and cannot be opened for writing (typically
//! because a viewer holds it open), the [`LockPolicy::Timestamp`] policy
//! redirects output to `PORTFOLIO_PRESENTATION_YYYYMMDD_HHMMSS.<ext>`.
//! The probe is advisory: nothing stops another process from grabbing the
//! file between the probe and the write.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

/// File stem shared by all outputs.
pub const FILE_STEM: &str = "PORTFOLIO_PRESENTATION";

/// Directory outputs go to unless told otherwise. Relative, so it resolves
/// against the current working directory, not the executable's location.
pub const DEFAULT_OUT_DIR: &str = "doc";

/// What to do when the target file exists but is not writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LockPolicy {
    /// Write to the target anyway and report the failure.
    Fail,
    /// Write to a timestamp-suffixed sibling instead.
    Timestamp,
}

/// Where a render will write, after the lock probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    /// True when the lock probe redirected output to an alternate name.
    pub fell_back: bool,
}

impl OutputTarget {
    /// Resolve the target for `path` using the real filesystem probe.
    pub fn resolve(path: &Path, policy: LockPolicy) -> Self {
        Self::resolve_with(path, policy, probe_writable, Local::now().naive_local())
    }

    /// Resolve with an explicit probe and clock.
    pub fn resolve_with(
        path: &Path,
        policy: LockPolicy,
        probe: impl Fn(&Path) -> bool,
        now: NaiveDateTime,
    ) -> Self {
        if policy == LockPolicy::Fail || !path.exists() || probe(path) {
            return Self {
                path: path.to_path_buf(),
                fell_back: false,
            };
        }

        let alternate = timestamped(path, now);
        warn!(
            path = %path.display(),
            alternate = %alternate.display(),
            "output file is open elsewhere; writing to a new file name"
        );
        Self {
            path: alternate,
            fell_back: true,
        }
    }
}

/// Default output path for a file extension inside `dir`.
pub fn default_path(dir: &Path, extension: &str) -> PathBuf {
    dir.join(format!("{FILE_STEM}.{extension}"))
}

/// True if `path` can be opened for reading and writing.
///
/// The file is opened without truncation, so probing never alters it.
pub fn probe_writable(path: &Path) -> bool {
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(_) => true,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "write probe failed");
            false
        }
    }
}

/// `dir/stem_YYYYMMDD_HHMMSS.ext` for `dir/stem.ext`.
pub fn timestamped(path: &Path, now: NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| FILE_STEM.to_string());
    let stamp = now.format("%Y%m%d_%H%M%S");
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{stamp}"),
    };
    path.with_file_name(name)
}

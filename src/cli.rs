//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::config::{CliOverrides, JoinOverrides};
use crate::error::AutosplitError;
use crate::pipeline::ProgressCallback;
use crate::spine::SpineSide;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 2,
    InputNotFound = 3,
    OutputError = 4,
    /// At least one file failed to split or join
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file or directory not found",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
            ExitCode::ProcessingError => "Processing error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

impl From<&AutosplitError> for ExitCode {
    fn from(err: &AutosplitError) -> Self {
        match err {
            AutosplitError::ImageNotFound(_) => ExitCode::InputNotFound,
            AutosplitError::EncodeFailure { .. } | AutosplitError::Io(_) => {
                ExitCode::OutputError
            }
            AutosplitError::InvalidOption(_) => ExitCode::InvalidArgs,
            AutosplitError::DecodeFailure { .. }
            | AutosplitError::OutOfBounds { .. }
            | AutosplitError::InvalidCenter { .. }
            | AutosplitError::EmptyCrop { .. }
            | AutosplitError::DegenerateTrim { .. } => ExitCode::ProcessingError,
        }
    }
}

/// Split scanned book spreads at the spine and join pages into openings
#[derive(Parser, Debug)]
#[command(name = "autosplit")]
#[command(version)]
#[command(
    about = "Split scanned book spreads at the spine and join pages into openings",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split two-page scans into single pages
    Split(SplitArgs),
    /// Join consecutive single-page scans into openings
    Join(JoinArgs),
}

/// Options shared by every command
#[derive(clap::Args, Debug, Default)]
pub struct CommonArgs {
    /// Configuration file (default: ./autosplit.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show execution plan without processing
    #[arg(long)]
    pub dry_run: bool,

    /// Print one JSON report per processed file
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the split command
#[derive(clap::Args, Debug)]
pub struct SplitArgs {
    /// Image files or directories of images
    #[arg(value_name = "FILES")]
    pub inputs: Vec<PathBuf>,

    /// Trim dark scanner-bed borders above and below the page
    #[arg(long)]
    pub trim: bool,

    /// Cut at this percentage of the width instead of detecting the spine
    #[arg(long, value_name = "PERCENT", visible_alias = "no-detect", alias = "no_detect")]
    pub fixed_split: Option<f64>,

    /// Draw the detected cut line instead of splitting
    #[arg(long, alias = "line_only")]
    pub line_only: bool,

    /// Source is bound along its top/bottom edge
    #[arg(long)]
    pub vertical: bool,

    /// Overlap past the spine as a percentage of the width [default: 2]
    #[arg(long, value_name = "PERCENT", alias = "fudge_factor")]
    pub fudge_factor: Option<f64>,

    /// Where the spine sits [default: center]
    #[arg(long, value_enum, alias = "spine_side")]
    pub spine_side: Option<SpineSide>,

    /// Skip skew correction
    #[arg(long = "no-deskew")]
    pub no_deskew: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SplitArgs {
    /// Values given on the command line, for merging over the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            trim: self.trim.then_some(true),
            fixed_split: self.fixed_split,
            line_only: self.line_only.then_some(true),
            vertical: self.vertical.then_some(true),
            fudge_factor: self.fudge_factor,
            spine_side: self.spine_side,
            deskew: self.no_deskew.then_some(false),
        }
    }
}

/// Arguments for the join command
#[derive(clap::Args, Debug)]
pub struct JoinArgs {
    /// Directories of single-page scans, verso first
    #[arg(value_name = "DIRECTORIES")]
    pub dirs: Vec<PathBuf>,

    /// Verso cut position as a percentage of the width [default: 90]
    #[arg(long, value_name = "PERCENT")]
    pub verso_split: Option<f64>,

    /// Detect the verso spine near the right edge instead of a fixed cut
    #[arg(long)]
    pub detect_verso: bool,

    /// Skip border trimming
    #[arg(long = "no-trim")]
    pub no_trim: bool,

    /// Skip skew correction
    #[arg(long = "no-deskew")]
    pub no_deskew: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl JoinArgs {
    /// Values given on the command line, for merging over the config file
    pub fn overrides(&self) -> JoinOverrides {
        JoinOverrides {
            verso_split: self.verso_split,
            detect_verso: self.detect_verso.then_some(true),
            trim: self.no_trim.then_some(false),
            deskew: self.no_deskew.then_some(false),
        }
    }
}

/// `tracing` filter for a `-v` count
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Create a styled progress bar for file processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Progress reporting for the binary
///
/// Failures are always printed; the bar is only drawn when enabled.
pub struct CliProgress {
    bar: Option<ProgressBar>,
}

impl CliProgress {
    pub fn new(total: usize, show_bar: bool) -> Self {
        Self {
            bar: show_bar.then(|| create_progress_bar(total as u64)),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn print(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_step_start(&self, step: &str) {
        if let Some(bar) = &self.bar {
            let name = Path::new(step)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| step.to_string());
            bar.set_message(name);
        }
    }

    fn on_step_progress(&self, current: usize, _total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(current as u64);
        }
    }

    fn on_step_complete(&self, _step: &str, _message: &str) {}

    fn on_file_failed(&self, path: &Path, message: &str) {
        self.print(format!("Error processing {}: {}", path.display(), message));
    }

    fn on_debug(&self, _message: &str) {}
}

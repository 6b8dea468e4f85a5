//! book-autosplit - Split scanned book spreads at the spine
//!
//! Scanning a bound book face-down on a flatbed produces images holding two
//! facing pages. This crate finds the spine (the darkest vertical stripe near
//! the middle of the scan), cuts there with a small overlap and writes each
//! page as its own image. It can also stitch the two halves of an opening that
//! straddles two consecutive scans back into one image.
//!
//! # Features
//!
//! - **Spine Location** ([`spine`]) - Darkest column search in a window around the middle
//! - **Border Trimming** ([`trim`]) - Strip dark scanner borders above and below the book
//! - **Deskew Correction** ([`deskew`]) - Detect and correct small page rotations
//! - **Splitting** ([`split`]) - Cut a spread into pages, or only mark the cut
//! - **Joining** ([`join`]) - Combine a verso and recto page into one opening
//! - **Batch Processing** ([`pipeline`]) - Per-file runs with progress callbacks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use book_autosplit::{SplitOptions, SplitPipeline, SilentProgress};
//! use std::path::PathBuf;
//!
//! let options = SplitOptions::builder()
//!     .trim(true)
//!     .fudge_factor_percent(1.0)
//!     .build();
//!
//! let pipeline = SplitPipeline::new(options);
//! let summary = pipeline.split_files(&[PathBuf::from("scan_001.png")], &SilentProgress);
//! for report in &summary.reports {
//!     println!("{}: spine at x={}", report.source.display(), report.spine);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Scan -> (rotate 90 for vertical) -> Border Trim -> Deskew
//!                                                      |
//!                                           Spine Location / Fixed Cut
//!                                                      |
//!                                  Split (pages or cut line) -> Output files
//! ```

pub mod brightness;
pub mod cli;
pub mod config;
pub mod deskew;
pub mod error;
pub mod join;
pub mod page_image;
pub mod pipeline;
pub mod spine;
pub mod split;
pub mod trim;
pub mod util;

// Re-exports for convenience
pub use brightness::{BrightnessSampler, WHITE_PIXEL_BRIGHTNESS};
pub use cli::{
    create_progress_bar, log_filter, Cli, CliProgress, Commands, CommonArgs, ExitCode, JoinArgs,
    SplitArgs,
};
pub use config::{CliOverrides, Config, ConfigError, JoinOverrides};
pub use deskew::{
    DeskewOptions, DeskewOptionsBuilder, DeskewResult, ProjectionDeskewer, QualityMode,
    SkewDetection,
};
pub use error::{AutosplitError, Result};
pub use join::{OpeningJoiner, OpeningLayout};
pub use page_image::{PageImage, Rect, SampleDepth, WHITE};
pub use pipeline::{
    BatchSummary, FileFailure, JoinOptions, JoinOutcome, JoinPipeline, JoinReport, PagePair,
    ProgressCallback, SilentProgress, SplitOutcome, SplitPipeline, SplitReport, WrittenPage,
};
pub use spine::{SpineLocator, SpineSide};
pub use split::{PageHalf, PageSplitter, SplitGeometry, SplitOptions, SplitOptionsBuilder, SplitPage};
pub use trim::{BorderTrimmer, Edge, TrimOptions, TrimOptionsBuilder, TrimResult};
pub use util::{
    collect_image_files, expand_inputs, format_duration, is_derived_output, is_image_file,
    opening_path, output_path,
};

//! Deskew (Skew Correction) module
//!
//! Detects the small rotation a flatbed scan picks up when the book is laid
//! down at an angle, and rotates the page back before the spine is searched.
//!
//! # Example
//!
//! ```rust,no_run
//! use book_autosplit::{DeskewOptions, PageImage, ProjectionDeskewer};
//! use std::path::Path;
//!
//! let page = PageImage::load(Path::new("scan.png")).unwrap();
//! let options = DeskewOptions::builder().max_angle(3.0).build();
//!
//! let detection = ProjectionDeskewer::detect_skew(&page, &options);
//! println!("Detected angle: {:.2}°", detection.angle);
//! ```

// Submodules
mod algorithm;
mod types;

// Re-export public API
pub use algorithm::ProjectionDeskewer;
pub use types::{
    DeskewOptions, DeskewOptionsBuilder, DeskewResult, QualityMode, SkewDetection,
    DEFAULT_ANALYSIS_SIZE, DEFAULT_ANGLE_STEP, DEFAULT_MAX_ANGLE, DEFAULT_THRESHOLD_ANGLE,
    MIN_VARIANCE_GAIN,
};

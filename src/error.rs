//! Error types shared by the analysis and splitting pipeline
//!
//! Every variant is unrecoverable for the file being processed. Batch runs
//! report the error against the file and move on to the next one.

use std::path::PathBuf;
use thiserror::Error;

use crate::page_image::Rect;

/// Autosplit error types
#[derive(Debug, Error)]
pub enum AutosplitError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Failed to decode {path}: {reason}")]
    DecodeFailure { path: PathBuf, reason: String },

    #[error("Region {rect} exceeds image bounds {width}x{height}")]
    OutOfBounds { rect: Rect, width: u32, height: u32 },

    #[error("Spine column {center} lies outside image width {width}")]
    InvalidCenter { center: u32, width: u32 },

    #[error("Cut at column {center} with {margin} px overlap leaves an empty page in a {width}-pixel-wide image")]
    EmptyCrop { center: u32, margin: u32, width: u32 },

    #[error(
        "Border trim of {top} top and {bottom} bottom rows leaves nothing of a {height}-row image"
    )]
    DegenerateTrim { top: u32, bottom: u32, height: u32 },

    #[error("Failed to encode {path}: {reason}")]
    EncodeFailure { path: PathBuf, reason: String },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AutosplitError>;

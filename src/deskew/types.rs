//! Deskew module core types

use serde::Serialize;

use crate::page_image::WHITE;

// ============================================================
// Constants
// ============================================================

/// Default maximum angle searched for skew (degrees)
pub const DEFAULT_MAX_ANGLE: f64 = 5.0;

/// Default search step (degrees)
pub const DEFAULT_ANGLE_STEP: f64 = 0.25;

/// Default threshold angle - angles below this are not corrected (degrees)
pub const DEFAULT_THRESHOLD_ANGLE: f64 = 0.1;

/// Longest side of the downscaled copy used for detection
pub const DEFAULT_ANALYSIS_SIZE: u32 = 1000;

/// Minimum gain in normalized projection variance over the unrotated
/// profile before a rotation is accepted
pub const MIN_VARIANCE_GAIN: f64 = 1e-4;

/// White pixel value in the 8-bit analysis copy
pub const WHITE_PIXEL: u8 = 255;

// ============================================================
// Options and Enums
// ============================================================

/// Interpolation used when rotating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QualityMode {
    /// Nearest neighbour
    Fast,
    /// Bilinear
    #[default]
    Standard,
}

/// Deskew options
#[derive(Debug, Clone, PartialEq)]
pub struct DeskewOptions {
    /// Maximum detection angle (degrees)
    pub max_angle: f64,
    /// Search step (degrees)
    pub angle_step: f64,
    /// Correction threshold (angles below this are ignored)
    pub threshold_angle: f64,
    /// Fill colour for corners rotated in from outside the page
    pub background_color: [u16; 3],
    /// Longest side of the detection copy
    pub analysis_size: u32,
    /// Interpolation quality
    pub quality_mode: QualityMode,
}

impl Default for DeskewOptions {
    fn default() -> Self {
        Self {
            max_angle: DEFAULT_MAX_ANGLE,
            angle_step: DEFAULT_ANGLE_STEP,
            threshold_angle: DEFAULT_THRESHOLD_ANGLE,
            background_color: WHITE,
            analysis_size: DEFAULT_ANALYSIS_SIZE,
            quality_mode: QualityMode::Standard,
        }
    }
}

impl DeskewOptions {
    /// Create a new options builder
    pub fn builder() -> DeskewOptionsBuilder {
        DeskewOptionsBuilder::default()
    }

    /// Create options optimized for fast processing
    pub fn fast() -> Self {
        Self {
            angle_step: 0.5,
            analysis_size: 600,
            quality_mode: QualityMode::Fast,
            threshold_angle: 0.5,
            ..Default::default()
        }
    }
}

/// Builder for DeskewOptions
#[derive(Debug, Default)]
pub struct DeskewOptionsBuilder {
    options: DeskewOptions,
}

impl DeskewOptionsBuilder {
    /// Set the maximum detection angle
    #[must_use]
    pub fn max_angle(mut self, angle: f64) -> Self {
        self.options.max_angle = angle.abs();
        self
    }

    /// Set the search step (at least 0.01 degrees)
    #[must_use]
    pub fn angle_step(mut self, step: f64) -> Self {
        self.options.angle_step = step.abs().max(0.01);
        self
    }

    /// Set the correction threshold angle
    #[must_use]
    pub fn threshold_angle(mut self, angle: f64) -> Self {
        self.options.threshold_angle = angle.abs();
        self
    }

    /// Set the fill colour for rotated-in corners
    #[must_use]
    pub fn background_color(mut self, color: [u16; 3]) -> Self {
        self.options.background_color = color;
        self
    }

    /// Set the detection copy size (at least 16 pixels)
    #[must_use]
    pub fn analysis_size(mut self, size: u32) -> Self {
        self.options.analysis_size = size.max(16);
        self
    }

    /// Set the quality mode
    #[must_use]
    pub fn quality_mode(mut self, mode: QualityMode) -> Self {
        self.options.quality_mode = mode;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> DeskewOptions {
        self.options
    }
}

// ============================================================
// Result Types
// ============================================================

/// Skew detection result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkewDetection {
    /// Rotation (degrees, clockwise in image coordinates) that levels the text lines
    pub angle: f64,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f64,
}

/// Deskew outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeskewResult {
    /// Detection result
    pub detection: SkewDetection,
    /// Whether a rotation was applied
    pub corrected: bool,
}

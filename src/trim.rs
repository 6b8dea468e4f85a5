//! Border trimming
//!
//! Scans often carry a band of dark scanner-bed background above and below
//! the page. A few vertical sample lines near the middle of the scan are
//! walked inward from each edge with an 11-row sliding window; the first
//! window bright enough to be paper marks where the page begins.

use serde::Serialize;
use tracing::debug;

use crate::brightness::{BrightnessSampler, WHITE_PIXEL_BRIGHTNESS};
use crate::error::{AutosplitError, Result};
use crate::page_image::{PageImage, Rect};

/// Horizontal sample positions as fractions of the width
pub const DEFAULT_SAMPLE_FRACTIONS: [f64; 3] = [0.4, 0.5, 0.6];

/// Rows in the sliding window
pub const DEFAULT_WINDOW_ROWS: u32 = 11;

/// How far in from each edge a border may reach, as a fraction of the height
pub const DEFAULT_SCAN_DEPTH: f64 = 0.3;

/// Window brightness above which the window is paper rather than scanner bed.
/// Calibrated for bilevel scans: more than 8 of the 11 rows must be white.
pub const DEFAULT_BACKGROUND_THRESHOLD: u64 = 8 * WHITE_PIXEL_BRIGHTNESS;

/// Edge of the image being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// Border trimming options
#[derive(Debug, Clone, PartialEq)]
pub struct TrimOptions {
    /// Sample columns as fractions of the width
    pub sample_fractions: Vec<f64>,
    /// Sliding window height in rows
    pub window_rows: u32,
    /// Window brightness that counts as page content
    pub background_threshold: u64,
    /// Maximum border depth as a fraction of the height
    pub scan_depth: f64,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            sample_fractions: DEFAULT_SAMPLE_FRACTIONS.to_vec(),
            window_rows: DEFAULT_WINDOW_ROWS,
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            scan_depth: DEFAULT_SCAN_DEPTH,
        }
    }
}

impl TrimOptions {
    /// Create a new options builder
    pub fn builder() -> TrimOptionsBuilder {
        TrimOptionsBuilder::default()
    }
}

/// Builder for TrimOptions
#[derive(Debug, Default)]
pub struct TrimOptionsBuilder {
    options: TrimOptions,
}

impl TrimOptionsBuilder {
    /// Set sample column fractions (each clamped to 0.0-1.0)
    #[must_use]
    pub fn sample_fractions(mut self, fractions: &[f64]) -> Self {
        self.options.sample_fractions = fractions.iter().map(|f| f.clamp(0.0, 1.0)).collect();
        self
    }

    /// Set sliding window height (at least one row)
    #[must_use]
    pub fn window_rows(mut self, rows: u32) -> Self {
        self.options.window_rows = rows.max(1);
        self
    }

    /// Set the content threshold
    #[must_use]
    pub fn background_threshold(mut self, threshold: u64) -> Self {
        self.options.background_threshold = threshold;
        self
    }

    /// Set maximum border depth (clamped to 0.0-0.5 so top and bottom cannot meet)
    #[must_use]
    pub fn scan_depth(mut self, depth: f64) -> Self {
        self.options.scan_depth = depth.clamp(0.0, 0.5);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> TrimOptions {
        self.options
    }
}

/// Rows of background detected at each edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrimResult {
    pub top: u32,
    pub bottom: u32,
}

impl TrimResult {
    pub fn is_empty(&self) -> bool {
        self.top == 0 && self.bottom == 0
    }

    /// Region left after removing the borders from a `width` x `height` image
    pub fn content_rect(&self, width: u32, height: u32) -> Result<Rect> {
        let trimmed = u64::from(self.top) + u64::from(self.bottom);
        if trimmed >= u64::from(height) {
            return Err(AutosplitError::DegenerateTrim {
                top: self.top,
                bottom: self.bottom,
                height,
            });
        }
        Ok(Rect::new(
            0,
            self.top,
            width,
            height - self.top - self.bottom,
        ))
    }
}

/// Top/bottom background border trimmer
pub struct BorderTrimmer;

impl BorderTrimmer {
    /// Detect top and bottom borders
    ///
    /// Each edge takes the smallest border over all sample lines, so content
    /// seen by any one of them is never cut.
    pub fn detect(image: &PageImage, options: &TrimOptions) -> Result<TrimResult> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || options.sample_fractions.is_empty() {
            return Ok(TrimResult::default());
        }

        let mut top = u32::MAX;
        let mut bottom = u32::MAX;
        for &fraction in &options.sample_fractions {
            let x = ((f64::from(width) * fraction.clamp(0.0, 1.0)) as u32).min(width - 1);
            top = top.min(Self::border_at(image, x, Edge::Top, options)?);
            bottom = bottom.min(Self::border_at(image, x, Edge::Bottom, options)?);
        }

        let result = TrimResult { top, bottom };
        // validates top + bottom < height
        result.content_rect(width, height)?;
        debug!(top, bottom, "borders detected");
        Ok(result)
    }

    /// Border depth in rows along column `x`, or 0 when no page edge is
    /// found within the scan depth
    pub fn border_at(image: &PageImage, x: u32, edge: Edge, options: &TrimOptions) -> Result<u32> {
        let height = image.height();
        let window = options.window_rows.max(1);
        // same limits as the builder
        let scan_rows = (f64::from(height) * options.scan_depth.clamp(0.0, 0.5)) as u32;
        if scan_rows < window {
            return Ok(0);
        }

        for offset in 0..=(scan_rows - window) {
            let y0 = match edge {
                Edge::Top => offset,
                Edge::Bottom => height - offset - window,
            };
            let sum = BrightnessSampler::column_sum(image, x, y0, window)?;
            if sum > options.background_threshold {
                return Ok(offset);
            }
        }

        Ok(0)
    }

    /// Detect borders and crop them away
    pub fn trim(image: PageImage, options: &TrimOptions) -> Result<(PageImage, TrimResult)> {
        let result = Self::detect(&image, options)?;
        if result.is_empty() {
            return Ok((image, result));
        }

        let rect = result.content_rect(image.width(), image.height())?;
        let trimmed = image.crop(rect)?;
        Ok((trimmed, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_image::WHITE;

    const BLACK: [u16; 3] = [0, 0, 0];

    /// White page with black bands `top` and `bottom` rows deep
    fn bordered_page(width: u32, height: u32, top: u32, bottom: u32) -> PageImage {
        let mut img = PageImage::filled(width, height, WHITE);
        if top > 0 {
            img.write_pixel_block(
                Rect::new(0, 0, width, top),
                &vec![BLACK; (width * top) as usize],
            )
            .unwrap();
        }
        if bottom > 0 {
            img.write_pixel_block(
                Rect::new(0, height - bottom, width, bottom),
                &vec![BLACK; (width * bottom) as usize],
            )
            .unwrap();
        }
        img
    }

    #[test]
    fn test_default_options() {
        let opts = TrimOptions::default();
        assert_eq!(opts.sample_fractions, vec![0.4, 0.5, 0.6]);
        assert_eq!(opts.window_rows, 11);
        assert_eq!(opts.scan_depth, 0.3);
        assert_eq!(opts.background_threshold, 8 * 3 * 65_535);
    }

    #[test]
    fn test_builder_clamping() {
        let opts = TrimOptions::builder()
            .sample_fractions(&[-0.5, 0.5, 1.5])
            .window_rows(0)
            .scan_depth(0.9)
            .build();
        assert_eq!(opts.sample_fractions, vec![0.0, 0.5, 1.0]);
        assert_eq!(opts.window_rows, 1);
        assert_eq!(opts.scan_depth, 0.5);
    }

    #[test]
    fn test_uniform_bright_page_has_no_border() {
        let img = PageImage::filled(120, 200, WHITE);
        let opts = TrimOptions::default();

        for fraction in DEFAULT_SAMPLE_FRACTIONS {
            let x = (120.0 * fraction) as u32;
            assert_eq!(BorderTrimmer::border_at(&img, x, Edge::Top, &opts).unwrap(), 0);
            assert_eq!(BorderTrimmer::border_at(&img, x, Edge::Bottom, &opts).unwrap(), 0);
        }
        assert_eq!(
            BorderTrimmer::detect(&img, &opts).unwrap(),
            TrimResult { top: 0, bottom: 0 }
        );
    }

    #[test]
    fn test_detects_dark_bands() {
        let img = bordered_page(100, 400, 50, 30);
        let result = BorderTrimmer::detect(&img, &TrimOptions::default()).unwrap();
        // window passes the threshold once 9 of its 11 rows are paper
        assert_eq!(result, TrimResult { top: 48, bottom: 28 });
    }

    #[test]
    fn test_border_deeper_than_scan_depth_is_ignored() {
        // 150 of 400 rows is past the 30% scan depth
        let img = bordered_page(100, 400, 150, 0);
        let result = BorderTrimmer::detect(&img, &TrimOptions::default()).unwrap();
        assert_eq!(result, TrimResult { top: 0, bottom: 0 });
    }

    #[test]
    fn test_minimum_over_sample_lines() {
        let mut img = bordered_page(100, 400, 60, 0);
        // page reaches the top edge along the 50% sample line
        img.write_pixel_block(Rect::new(50, 0, 1, 60), &[WHITE; 60])
            .unwrap();
        let result = BorderTrimmer::detect(&img, &TrimOptions::default()).unwrap();
        assert_eq!(result.top, 0);
    }

    #[test]
    fn test_short_image_skips_scan() {
        let img = bordered_page(10, 30, 5, 5);
        let result = BorderTrimmer::detect(&img, &TrimOptions::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_hand_built_options_are_limited() {
        let opts = TrimOptions {
            sample_fractions: vec![1.5],
            window_rows: 0,
            background_threshold: WHITE_PIXEL_BRIGHTNESS / 2,
            scan_depth: 2.0,
        };

        // all dark: the scan stops at half the height instead of running off the image
        let dark = bordered_page(100, 100, 100, 0);
        assert!(BorderTrimmer::detect(&dark, &opts).unwrap().is_empty());

        // a one-row window reads the first white row as page content
        let img = bordered_page(100, 100, 20, 10);
        let result = BorderTrimmer::detect(&img, &opts).unwrap();
        assert_eq!((result.top, result.bottom), (20, 10));
    }

    #[test]
    fn test_trim_crops_content() {
        let img = bordered_page(100, 400, 50, 30);
        let (trimmed, result) = BorderTrimmer::trim(img, &TrimOptions::default()).unwrap();
        assert_eq!(trimmed.dimensions(), (100, 400 - result.top - result.bottom));
    }

    #[test]
    fn test_content_rect_degenerate() {
        let result = TrimResult {
            top: 60,
            bottom: 40,
        };
        assert!(matches!(
            result.content_rect(10, 100),
            Err(AutosplitError::DegenerateTrim { .. })
        ));
        assert_eq!(
            TrimResult { top: 10, bottom: 5 }.content_rect(10, 100).unwrap(),
            Rect::new(0, 10, 10, 85)
        );
    }
}

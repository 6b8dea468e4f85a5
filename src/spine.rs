//! Spine location
//!
//! The binding crease of a two-page scan sits in shadow, so it shows up as
//! the darkest vertical stripe. The search is restricted to a band of columns
//! chosen by [`SpineSide`] so dark illustrations elsewhere on the page cannot
//! win.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

use crate::brightness::BrightnessSampler;
use crate::error::{AutosplitError, Result};
use crate::page_image::{PageImage, Rect};

/// Where the spine sits in the scan, and therefore which pages survive a split
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SpineSide {
    /// Spine near the left edge
    Left,
    /// Spine near the right edge
    Right,
    /// Spine in the middle of a two-page spread
    #[default]
    Center,
}

impl SpineSide {
    /// Columns searched for the spine in an image `width` pixels wide
    ///
    /// `Center` covers `width/2 - width/10 ..= width/2 + width/10`; `Left`
    /// and `Right` cover the outer fifth on their side. Returns `None` for a
    /// zero-width image.
    pub fn scan_range(self, width: u32) -> Option<RangeInclusive<u32>> {
        if width == 0 {
            return None;
        }

        let last = width - 1;
        let fifth = (width / 5).max(1);
        let range = match self {
            SpineSide::Center => {
                let half = width / 2;
                let tenth = width / 10;
                (half - tenth)..=(half + tenth).min(last)
            }
            SpineSide::Right => (width - fifth)..=last,
            SpineSide::Left => 0..=(fifth - 1),
        };
        Some(range)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpineSide::Left => "left",
            SpineSide::Right => "right",
            SpineSide::Center => "center",
        }
    }
}

impl std::fmt::Display for SpineSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Darkest-column spine locator
pub struct SpineLocator;

impl SpineLocator {
    /// Column of the darkest full-height stripe inside `side`'s scan range
    ///
    /// Ties go to the lowest column.
    pub fn locate(image: &PageImage, side: SpineSide) -> Result<u32> {
        let (width, height) = image.dimensions();
        let range = match side.scan_range(width) {
            Some(range) if height > 0 => range,
            _ => {
                return Err(AutosplitError::OutOfBounds {
                    rect: Rect::full(width, height),
                    width,
                    height,
                })
            }
        };

        let mut darkest_x = *range.start();
        let mut min_brightness = u64::MAX;

        for x in range {
            let total = BrightnessSampler::column_sum(image, x, 0, height)?;
            if total < min_brightness {
                min_brightness = total;
                darkest_x = x;
            }
        }

        debug!(side = %side, column = darkest_x, brightness = min_brightness, "darkest column");
        Ok(darkest_x)
    }

    /// Column at `percent` of the width, for scans with a known fixed split
    pub fn fixed(image: &PageImage, percent: f64) -> Result<u32> {
        let width = image.width();
        if !percent.is_finite() || percent < 0.0 {
            return Err(AutosplitError::InvalidOption(format!(
                "fixed split percentage must be a non-negative number, got {}",
                percent
            )));
        }

        let center = (f64::from(width) * percent / 100.0).floor();
        if center >= f64::from(width) {
            return Err(AutosplitError::InvalidCenter {
                center: center.min(f64::from(u32::MAX)) as u32,
                width,
            });
        }
        Ok(center as u32)
    }
}

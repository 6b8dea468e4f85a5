//! Pixel brightness sampling
//!
//! The one numeric primitive shared by spine location and border trimming:
//! a window of pixels reduced to the sum of `red + green + blue` over every
//! pixel in it. Both detectors compare these sums, so they must agree on how
//! brightness is measured.

use crate::error::{AutosplitError, Result};
use crate::page_image::{PageImage, Rect};

/// Brightness of a single fully white pixel
pub const WHITE_PIXEL_BRIGHTNESS: u64 = 3 * u16::MAX as u64;

/// Window brightness sampler
pub struct BrightnessSampler;

impl BrightnessSampler {
    /// Sum of `r + g + b` over `rect`
    pub fn region_sum(image: &PageImage, rect: Rect) -> Result<u64> {
        if !rect.fits_within(image.width(), image.height()) {
            return Err(AutosplitError::OutOfBounds {
                rect,
                width: image.width(),
                height: image.height(),
            });
        }

        let pixels = image.pixels();
        let mut total = 0u64;
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let [r, g, b] = pixels.get_pixel(x, y).0;
                total += u64::from(r) + u64::from(g) + u64::from(b);
            }
        }
        Ok(total)
    }

    /// Sum of `r + g + b` over rows `[y0, y0 + height)` of column `x`
    pub fn column_sum(image: &PageImage, x: u32, y0: u32, height: u32) -> Result<u64> {
        Self::region_sum(image, Rect::new(x, y0, 1, height))
    }
}

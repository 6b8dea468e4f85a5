//! Page splitting
//!
//! Turns a spine column into the one or two page crops that get written.
//! Each crop reaches past the spine by a margin of `fudge_factor_percent` of
//! the width so text running into the binding is never clipped. Which crops
//! survive is decided by [`SpineSide`] through a small lookup table, kept
//! separate from the vertical-orientation handling.

use serde::Serialize;
use tracing::debug;

use crate::error::{AutosplitError, Result};
use crate::page_image::{PageImage, Rect, MAX_INTENSITY};
use crate::spine::SpineSide;

/// Default overlap margin past the spine (percent of width)
pub const DEFAULT_FUDGE_FACTOR: f64 = 2.0;

/// Largest accepted overlap margin (percent of width)
pub const MAX_FUDGE_FACTOR: f64 = 50.0;

/// Width of the debug marker line in pixels
pub const MARKER_WIDTH: u32 = 3;

/// Debug marker colour
pub const MARKER_COLOR: [u16; 3] = [MAX_INTENSITY, 0, 0];

/// Rotation that turns a vertically bound scan on its side before analysis
pub const VERTICAL_PRE_ROTATION: u32 = 90;

/// Rotation that restores vertically bound outputs to upright
pub const VERTICAL_POST_ROTATION: u32 = 270;

/// One output of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageHalf {
    Left,
    Right,
    Below,
    Above,
    /// Whole image with the cut line drawn on it
    Marker,
}

impl PageHalf {
    /// File name suffix inserted before the extension
    pub fn suffix(self) -> &'static str {
        match self {
            PageHalf::Left => "_left",
            PageHalf::Right => "_right",
            PageHalf::Below => "_below",
            PageHalf::Above => "_above",
            PageHalf::Marker => "_autosplit",
        }
    }

    /// Whether this half is cut from the far side of the spine
    fn uses_far_crop(self) -> bool {
        matches!(self, PageHalf::Right | PageHalf::Above)
    }

    /// All suffixes the splitter can produce
    pub fn all_suffixes() -> [&'static str; 5] {
        [
            PageHalf::Left.suffix(),
            PageHalf::Right.suffix(),
            PageHalf::Below.suffix(),
            PageHalf::Above.suffix(),
            PageHalf::Marker.suffix(),
        ]
    }
}

/// Pages kept for each spine position in a horizontally bound scan
///
/// A spine at the right edge keeps only the page to its left and vice versa.
fn kept_halves(side: SpineSide) -> &'static [PageHalf] {
    match side {
        SpineSide::Center => &[PageHalf::Left, PageHalf::Right],
        SpineSide::Right => &[PageHalf::Left],
        SpineSide::Left => &[PageHalf::Right],
    }
}

const VERTICAL_HALVES: &[PageHalf] = &[PageHalf::Below, PageHalf::Above];
const MARKER_ONLY: &[PageHalf] = &[PageHalf::Marker];

/// Split configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOptions {
    /// Remove dark scanner-bed rows above and below the page first
    pub trim: bool,
    /// Cut at this percentage of the width instead of searching for the spine
    pub fixed_split_percent: Option<f64>,
    /// Draw the cut line instead of cropping
    pub line_only: bool,
    /// Source is bound along its top/bottom edge
    pub vertical: bool,
    /// Overlap margin past the spine (percent of width)
    pub fudge_factor_percent: f64,
    /// Where to search for the spine, and which pages to keep
    pub spine_side: SpineSide,
    /// Correct rotational tilt before locating the spine
    pub deskew: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            trim: false,
            fixed_split_percent: None,
            line_only: false,
            vertical: false,
            fudge_factor_percent: DEFAULT_FUDGE_FACTOR,
            spine_side: SpineSide::Center,
            deskew: true,
        }
    }
}

impl SplitOptions {
    /// Create a new options builder
    pub fn builder() -> SplitOptionsBuilder {
        SplitOptionsBuilder::default()
    }

    /// Options for the verso (left-hand) scan of an opening: the spine sits
    /// at the right, cut at `split_percent` of the width
    pub fn verso(split_percent: Option<f64>) -> Self {
        Self {
            trim: true,
            fixed_split_percent: split_percent,
            fudge_factor_percent: 0.0,
            spine_side: SpineSide::Right,
            ..Default::default()
        }
    }

    /// Options for the recto (right-hand) scan of an opening: the spine sits
    /// at the left
    pub fn recto() -> Self {
        Self {
            trim: true,
            fudge_factor_percent: 0.0,
            spine_side: SpineSide::Left,
            ..Default::default()
        }
    }

    /// Outputs this configuration writes, in order
    pub fn emitted_halves(&self) -> &'static [PageHalf] {
        if self.line_only {
            MARKER_ONLY
        } else if self.vertical {
            VERTICAL_HALVES
        } else {
            kept_halves(self.spine_side)
        }
    }
}

/// Builder for SplitOptions
#[derive(Debug, Default)]
pub struct SplitOptionsBuilder {
    options: SplitOptions,
}

impl SplitOptionsBuilder {
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.options.trim = trim;
        self
    }

    /// Cut at a fixed percentage of the width
    #[must_use]
    pub fn fixed_split_percent(mut self, percent: Option<f64>) -> Self {
        self.options.fixed_split_percent = percent;
        self
    }

    #[must_use]
    pub fn line_only(mut self, line_only: bool) -> Self {
        self.options.line_only = line_only;
        self
    }

    #[must_use]
    pub fn vertical(mut self, vertical: bool) -> Self {
        self.options.vertical = vertical;
        self
    }

    /// Set the overlap margin (clamped to 0-50 percent)
    #[must_use]
    pub fn fudge_factor_percent(mut self, percent: f64) -> Self {
        self.options.fudge_factor_percent = if percent.is_nan() {
            DEFAULT_FUDGE_FACTOR
        } else {
            percent.clamp(0.0, MAX_FUDGE_FACTOR)
        };
        self
    }

    #[must_use]
    pub fn spine_side(mut self, side: SpineSide) -> Self {
        self.options.spine_side = side;
        self
    }

    #[must_use]
    pub fn deskew(mut self, deskew: bool) -> Self {
        self.options.deskew = deskew;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SplitOptions {
        self.options
    }
}

/// Crop rectangles for a spine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitGeometry {
    pub center: u32,
    pub margin: u32,
    /// `[0, center + margin)`
    pub near: Rect,
    /// `[center - margin, width)`
    pub far: Rect,
}

/// A page produced by a split
#[derive(Debug, Clone)]
pub struct SplitPage {
    pub half: PageHalf,
    pub image: PageImage,
}

/// Spine-to-crops splitter
pub struct PageSplitter;

impl PageSplitter {
    /// Overlap margin in pixels for an image `width` pixels wide
    pub fn margin(width: u32, fudge_factor_percent: f64) -> u32 {
        let margin = (f64::from(width) * fudge_factor_percent / 100.0).floor();
        if margin <= 0.0 {
            0
        } else {
            margin.min(f64::from(width)) as u32
        }
    }

    /// Near and far crop rectangles, clipped to the image
    pub fn geometry(
        width: u32,
        height: u32,
        center: u32,
        fudge_factor_percent: f64,
    ) -> Result<SplitGeometry> {
        if center >= width {
            return Err(AutosplitError::InvalidCenter { center, width });
        }

        let margin = Self::margin(width, fudge_factor_percent);
        let near_end = center.saturating_add(margin).min(width);
        let far_start = center.saturating_sub(margin);

        Ok(SplitGeometry {
            center,
            margin,
            near: Rect::new(0, 0, near_end, height),
            far: Rect::new(far_start, 0, width - far_start, height),
        })
    }

    /// Split `image` at `center`
    ///
    /// Vertical outputs are rotated back upright. In line-only mode the
    /// single output is the whole image with the cut line drawn on it.
    pub fn split(image: PageImage, center: u32, options: &SplitOptions) -> Result<Vec<SplitPage>> {
        if options.line_only {
            let mut marked = Self::draw_marker(image, center)?;
            if options.vertical {
                marked = marked.rotate(VERTICAL_POST_ROTATION)?;
            }
            return Ok(vec![SplitPage {
                half: PageHalf::Marker,
                image: marked,
            }]);
        }

        let geometry = Self::geometry(
            image.width(),
            image.height(),
            center,
            options.fudge_factor_percent,
        )?;
        debug!(
            center,
            margin = geometry.margin,
            near = %geometry.near,
            far = %geometry.far,
            "split geometry"
        );

        let mut pages = Vec::with_capacity(2);
        for &half in options.emitted_halves() {
            let rect = if half.uses_far_crop() {
                geometry.far
            } else {
                geometry.near
            };
            if rect.is_empty() {
                return Err(AutosplitError::EmptyCrop {
                    center,
                    margin: geometry.margin,
                    width: image.width(),
                });
            }
            let mut page = image.crop(rect)?;
            if options.vertical {
                page = page.rotate(VERTICAL_POST_ROTATION)?;
            }
            pages.push(SplitPage { half, image: page });
        }
        Ok(pages)
    }

    /// Draw the 3-pixel marker over the full height, starting one column
    /// left of `center`
    pub fn draw_marker(mut image: PageImage, center: u32) -> Result<PageImage> {
        let (width, height) = image.dimensions();
        if center >= width {
            return Err(AutosplitError::InvalidCenter { center, width });
        }

        let x0 = center.saturating_sub(1);
        let rect = Rect::new(x0, 0, MARKER_WIDTH.min(width - x0), height);
        let block = vec![MARKER_COLOR; rect.width as usize * rect.height as usize];
        image.write_pixel_block(rect, &block)?;
        Ok(image)
    }
}

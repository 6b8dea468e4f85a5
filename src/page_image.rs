//! Page image buffer and low-level geometric primitives
//!
//! Every scan is analysed as 16-bit RGB so brightness thresholds behave the
//! same regardless of the depth of the file on disk. The original depth is
//! remembered so outputs are written back at the depth they came in with.

use image::{imageops, DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{AutosplitError, Result};

/// 16-bit RGB pixel buffer
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// Maximum channel intensity
pub const MAX_INTENSITY: u16 = u16::MAX;

/// Opaque white
pub const WHITE: [u16; 3] = [MAX_INTENSITY; 3];

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// One past the last column
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// One past the last row
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies entirely inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Channel depth of the file an image was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SampleDepth {
    #[default]
    Eight,
    Sixteen,
}

/// Owned page image
#[derive(Debug, Clone)]
pub struct PageImage {
    pixels: Rgb16Image,
    depth: SampleDepth,
}

impl PageImage {
    /// Wrap a 16-bit buffer
    pub fn from_rgb16(pixels: Rgb16Image, depth: SampleDepth) -> Self {
        Self { pixels, depth }
    }

    /// Convert a decoded image, remembering its channel depth
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let color = img.color();
        let depth = if color.bytes_per_pixel() / color.channel_count() >= 2 {
            SampleDepth::Sixteen
        } else {
            SampleDepth::Eight
        };
        Self {
            pixels: img.into_rgb16(),
            depth,
        }
    }

    /// Solid-colour canvas
    pub fn filled(width: u32, height: u32, color: [u16; 3]) -> Self {
        Self {
            pixels: ImageBuffer::from_pixel(width, height, Rgb(color)),
            depth: SampleDepth::Eight,
        }
    }

    /// Decode an image file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AutosplitError::ImageNotFound(path.to_path_buf()));
        }

        let img = image::open(path).map_err(|e| AutosplitError::DecodeFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let page = Self::from_dynamic(img);
        debug!(
            path = %path.display(),
            width = page.width(),
            height = page.height(),
            depth = ?page.depth,
            "image decoded"
        );
        Ok(page)
    }

    /// Encode to `path`, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let encode_err = |reason: String| AutosplitError::EncodeFailure {
            path: path.to_path_buf(),
            reason,
        };

        let format = ImageFormat::from_path(path).map_err(|e| encode_err(e.to_string()))?;
        let keeps_sixteen = matches!(format, ImageFormat::Png | ImageFormat::Tiff);

        if self.depth == SampleDepth::Sixteen && keeps_sixteen {
            self.pixels
                .save_with_format(path, format)
                .map_err(|e| encode_err(e.to_string()))?;
        } else {
            self.to_rgb8()
                .save_with_format(path, format)
                .map_err(|e| encode_err(e.to_string()))?;
        }

        debug!(path = %path.display(), width = self.width(), height = self.height(), "image written");
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    /// Underlying 16-bit buffer
    pub fn pixels(&self) -> &Rgb16Image {
        &self.pixels
    }

    /// Single pixel; panics outside the image like `ImageBuffer::get_pixel`
    pub fn pixel(&self, x: u32, y: u32) -> [u16; 3] {
        self.pixels.get_pixel(x, y).0
    }

    /// Down-convert to 8 bits per channel
    pub fn to_rgb8(&self) -> RgbImage {
        let scale = |v: u16| ((u32::from(v) + 128) / 257) as u8;
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b] = self.pixel(x, y);
            Rgb([scale(r), scale(g), scale(b)])
        })
    }

    fn check_bounds(&self, rect: Rect) -> Result<()> {
        if rect.fits_within(self.width(), self.height()) {
            Ok(())
        } else {
            Err(AutosplitError::OutOfBounds {
                rect,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Copy out a rectangular region
    pub fn crop(&self, rect: Rect) -> Result<PageImage> {
        self.check_bounds(rect)?;
        if rect.is_empty() {
            return Err(AutosplitError::OutOfBounds {
                rect,
                width: self.width(),
                height: self.height(),
            });
        }

        let cropped = imageops::crop_imm(&self.pixels, rect.x, rect.y, rect.width, rect.height)
            .to_image();
        Ok(Self {
            pixels: cropped,
            depth: self.depth,
        })
    }

    /// Rotate clockwise by a multiple of 90 degrees
    pub fn rotate(self, degrees: u32) -> Result<PageImage> {
        let pixels = match degrees % 360 {
            0 => return Ok(self),
            90 => imageops::rotate90(&self.pixels),
            180 => imageops::rotate180(&self.pixels),
            270 => imageops::rotate270(&self.pixels),
            other => {
                return Err(AutosplitError::InvalidOption(format!(
                    "rotation must be a multiple of 90 degrees, got {}",
                    other
                )))
            }
        };
        Ok(Self {
            pixels,
            depth: self.depth,
        })
    }

    /// Pixels of `rect` in row-major order
    pub fn read_pixel_block(&self, rect: Rect) -> Result<Vec<[u16; 3]>> {
        self.check_bounds(rect)?;
        let mut block = Vec::with_capacity(rect.width as usize * rect.height as usize);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                block.push(self.pixel(x, y));
            }
        }
        Ok(block)
    }

    /// Overwrite `rect` with row-major `block`
    pub fn write_pixel_block(&mut self, rect: Rect, block: &[[u16; 3]]) -> Result<()> {
        self.check_bounds(rect)?;
        let expected = rect.width as usize * rect.height as usize;
        if block.len() != expected {
            return Err(AutosplitError::InvalidOption(format!(
                "pixel block for {} needs {} pixels, got {}",
                rect,
                expected,
                block.len()
            )));
        }

        let mut source = block.iter();
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                if let Some(px) = source.next() {
                    self.pixels.put_pixel(x, y, Rgb(*px));
                }
            }
        }
        Ok(())
    }

    /// Paste `other` with its top-left corner at (`x`, `y`), clipping at the edges
    pub fn paste(&mut self, other: &PageImage, x: u32, y: u32) {
        imageops::replace(&mut self.pixels, &other.pixels, i64::from(x), i64::from(y));
        if other.depth == SampleDepth::Sixteen {
            self.depth = SampleDepth::Sixteen;
        }
    }
}

//! Deskew Algorithm Implementation
//!
//! Skew is found with a projection-profile search: the page is rotated
//! through candidate angles on a small grayscale copy, and the angle whose
//! row profile has the highest variance (text lines collapsing into sharp
//! dark rows) wins. Correction rotates the full-resolution page about its
//! centre on a canvas of the same size.

use super::types::{
    DeskewOptions, DeskewResult, QualityMode, SkewDetection, MIN_VARIANCE_GAIN, WHITE_PIXEL,
};
use crate::page_image::{PageImage, Rgb16Image};
use image::{imageops, GrayImage, ImageBuffer, Luma, Rgb};
use tracing::debug;

/// Projection-profile deskewer
pub struct ProjectionDeskewer;

impl ProjectionDeskewer {
    /// Detect the rotation that levels the page's text lines
    pub fn detect_skew(image: &PageImage, options: &DeskewOptions) -> SkewDetection {
        let level = SkewDetection {
            angle: 0.0,
            confidence: 0.0,
        };

        let gray = Self::analysis_copy(image, options.analysis_size);
        let (width, height) = gray.dimensions();
        if width < 2 || height < 2 || options.angle_step <= 0.0 {
            return level;
        }

        let baseline = Self::projection_variance(&gray, 0.0);
        let mut best_angle = 0.0;
        let mut best_variance = baseline;

        let steps = (options.max_angle / options.angle_step).floor() as i32;
        for i in (-steps..=steps).filter(|&i| i != 0) {
            let angle = f64::from(i) * options.angle_step;
            let variance = Self::projection_variance(&gray, angle);
            if variance > best_variance {
                best_variance = variance;
                best_angle = angle;
            }
        }

        let gain = best_variance - baseline;
        if gain < MIN_VARIANCE_GAIN {
            return level;
        }

        SkewDetection {
            angle: best_angle,
            confidence: (gain / best_variance).clamp(0.0, 1.0),
        }
    }

    /// Downscaled 8-bit grayscale copy for detection
    fn analysis_copy(image: &PageImage, max_size: u32) -> GrayImage {
        let (width, height) = image.dimensions();
        let longest = width.max(height);

        let small;
        let source: &Rgb16Image = if longest > max_size && max_size > 0 {
            let scale = f64::from(max_size) / f64::from(longest);
            let w = ((f64::from(width) * scale).round() as u32).max(1);
            let h = ((f64::from(height) * scale).round() as u32).max(1);
            small = imageops::thumbnail(image.pixels(), w, h);
            &small
        } else {
            image.pixels()
        };

        GrayImage::from_fn(source.width(), source.height(), |x, y| {
            let [r, g, b] = source.get_pixel(x, y).0;
            let mean = (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
            Luma([(mean >> 8) as u8])
        })
    }

    /// Variance of the row darkness profile after rotating by `angle`,
    /// each row normalized to the 0.0-1.0 range
    fn projection_variance(gray: &GrayImage, angle: f64) -> f64 {
        let (width, height) = gray.dimensions();
        let cos_a = angle.to_radians().cos();
        let sin_a = angle.to_radians().sin();
        let cx = f64::from(width) / 2.0;
        let cy = f64::from(height) / 2.0;

        let mut projection = vec![0u64; height as usize];
        for y in 0..height {
            for x in 0..width {
                let ry = (f64::from(x) - cx) * sin_a + (f64::from(y) - cy) * cos_a + cy;
                if ry >= 0.0 && ry < f64::from(height) {
                    let pixel = gray.get_pixel(x, y).0[0];
                    // dark pixels contribute more
                    projection[ry as usize] += u64::from(WHITE_PIXEL - pixel);
                }
            }
        }

        let scale = f64::from(width) * f64::from(WHITE_PIXEL);
        let rows = projection.len() as f64;
        let mean = projection.iter().map(|&v| v as f64 / scale).sum::<f64>() / rows;
        projection
            .iter()
            .map(|&v| (v as f64 / scale - mean).powi(2))
            .sum::<f64>()
            / rows
    }

    /// Rotate by `angle_degrees` about the centre, keeping the canvas size
    pub fn rotate(image: &PageImage, angle_degrees: f64, options: &DeskewOptions) -> PageImage {
        let (width, height) = image.dimensions();
        let angle_rad = angle_degrees.to_radians();
        let cos_a = angle_rad.cos();
        let sin_a = angle_rad.sin();
        let cx = f64::from(width) / 2.0;
        let cy = f64::from(height) / 2.0;
        let max_x = f64::from(width) - 1.0;
        let max_y = f64::from(height) - 1.0;
        let source = image.pixels();
        let background = Rgb(options.background_color);

        let rotated: Rgb16Image = ImageBuffer::from_fn(width, height, |nx, ny| {
            // map back to source coordinates
            let dx = f64::from(nx) - cx;
            let dy = f64::from(ny) - cy;
            let ox = dx * cos_a + dy * sin_a + cx;
            let oy = -dx * sin_a + dy * cos_a + cy;

            if ox < 0.0 || oy < 0.0 || ox > max_x || oy > max_y {
                return background;
            }
            match options.quality_mode {
                QualityMode::Fast => *source.get_pixel(ox.round() as u32, oy.round() as u32),
                QualityMode::Standard => Self::bilinear(source, ox, oy),
            }
        });

        PageImage::from_rgb16(rotated, image.depth())
    }

    /// Bilinear interpolation
    fn bilinear(img: &Rgb16Image, x: f64, y: f64) -> Rgb<u16> {
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(img.width() - 1);
        let y1 = (y0 + 1).min(img.height() - 1);

        let fx = x - f64::from(x0);
        let fy = y - f64::from(y0);

        let p00 = img.get_pixel(x0, y0);
        let p10 = img.get_pixel(x1, y0);
        let p01 = img.get_pixel(x0, y1);
        let p11 = img.get_pixel(x1, y1);

        let mut result = [0u16; 3];
        for (i, channel) in result.iter_mut().enumerate() {
            let v = f64::from(p00.0[i]) * (1.0 - fx) * (1.0 - fy)
                + f64::from(p10.0[i]) * fx * (1.0 - fy)
                + f64::from(p01.0[i]) * (1.0 - fx) * fy
                + f64::from(p11.0[i]) * fx * fy;
            *channel = v.round().clamp(0.0, f64::from(u16::MAX)) as u16;
        }

        Rgb(result)
    }

    /// Detect and correct skew
    pub fn deskew(image: PageImage, options: &DeskewOptions) -> (PageImage, DeskewResult) {
        let detection = Self::detect_skew(&image, options);

        if detection.angle.abs() < options.threshold_angle {
            return (
                image,
                DeskewResult {
                    detection,
                    corrected: false,
                },
            );
        }

        debug!(
            angle = detection.angle,
            confidence = detection.confidence,
            "correcting skew"
        );
        let rotated = Self::rotate(&image, detection.angle, options);
        (
            rotated,
            DeskewResult {
                detection,
                corrected: true,
            },
        )
    }
}

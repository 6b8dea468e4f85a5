//! Shared fixtures for integration tests

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// White scan with a black full-height stripe at `spine`
pub fn spread(width: u32, height: u32, spine: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for y in 0..height {
        img.put_pixel(spine, y, Rgb([0, 0, 0]));
    }
    img
}

/// Write a synthetic spread as PNG into `dir` and return its path
pub fn write_spread(dir: &Path, name: &str, width: u32, height: u32, spine: u32) -> PathBuf {
    let path = dir.join(name);
    spread(width, height, spine).save(&path).unwrap();
    path
}

pub fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

//! Opening reconstruction
//!
//! Two single pages scanned separately rarely come out the same size. Each is
//! padded with white into the bounding box of both, anchored top-left, and the
//! two boxes are placed side by side. Pages are never scaled.

use serde::Serialize;
use tracing::debug;

use crate::page_image::{PageImage, WHITE};

/// Placement of both pages inside a joined opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningLayout {
    /// Width of each page cell
    pub cell_width: u32,
    /// Height of the opening
    pub height: u32,
    /// Top-left corner of the left page
    pub left_origin: (u32, u32),
    /// Top-left corner of the right page
    pub right_origin: (u32, u32),
}

impl OpeningLayout {
    /// Width of the opening
    pub fn width(&self) -> u32 {
        self.cell_width.saturating_mul(2)
    }
}

/// Side-by-side page joiner
pub struct OpeningJoiner;

impl OpeningJoiner {
    /// Layout for joining `left` and `right`
    pub fn layout(left: &PageImage, right: &PageImage) -> OpeningLayout {
        let cell_width = left.width().max(right.width());
        let height = left.height().max(right.height());
        OpeningLayout {
            cell_width,
            height,
            left_origin: (0, 0),
            right_origin: (cell_width, 0),
        }
    }

    /// Pad `page` with white to `width` x `height`, anchored top-left
    pub fn pad_to(page: &PageImage, width: u32, height: u32) -> PageImage {
        if page.dimensions() == (width, height) {
            return page.clone();
        }
        let mut canvas = PageImage::filled(width, height, WHITE);
        canvas.paste(page, 0, 0);
        canvas
    }

    /// Join a verso (left) and recto (right) page into one opening
    pub fn join(left: &PageImage, right: &PageImage) -> PageImage {
        let layout = Self::layout(left, right);
        debug!(
            left = ?left.dimensions(),
            right = ?right.dimensions(),
            width = layout.width(),
            height = layout.height,
            "joining opening"
        );

        let mut opening = PageImage::filled(layout.width(), layout.height, WHITE);
        let left_cell = Self::pad_to(left, layout.cell_width, layout.height);
        let right_cell = Self::pad_to(right, layout.cell_width, layout.height);
        opening.paste(&left_cell, layout.left_origin.0, layout.left_origin.1);
        opening.paste(&right_cell, layout.right_origin.0, layout.right_origin.1);
        opening
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_image::{Rect, SampleDepth};

    const RED: [u16; 3] = [65_535, 0, 0];
    const BLUE: [u16; 3] = [0, 0, 65_535];

    #[test]
    fn test_layout_uses_bounding_box() {
        let left = PageImage::filled(300, 400, RED);
        let right = PageImage::filled(280, 420, BLUE);
        let layout = OpeningJoiner::layout(&left, &right);

        assert_eq!(layout.cell_width, 300);
        assert_eq!(layout.width(), 600);
        assert_eq!(layout.height, 420);
        assert_eq!(layout.left_origin, (0, 0));
        assert_eq!(layout.right_origin, (300, 0));
    }

    #[test]
    fn test_join_mismatched_pages() {
        let left = PageImage::filled(300, 400, RED);
        let right = PageImage::filled(280, 420, BLUE);
        let opening = OpeningJoiner::join(&left, &right);

        assert_eq!(opening.dimensions(), (600, 420));
        // left page anchored at (0,0), padded below
        assert_eq!(opening.pixel(0, 0), RED);
        assert_eq!(opening.pixel(299, 399), RED);
        assert_eq!(opening.pixel(0, 400), WHITE);
        // right page anchored at (300,0), padded to the right
        assert_eq!(opening.pixel(300, 0), BLUE);
        assert_eq!(opening.pixel(579, 419), BLUE);
        assert_eq!(opening.pixel(580, 0), WHITE);
    }

    #[test]
    fn test_join_equal_pages() {
        let left = PageImage::filled(10, 20, RED);
        let right = PageImage::filled(10, 20, BLUE);
        let opening = OpeningJoiner::join(&left, &right);
        assert_eq!(opening.dimensions(), (20, 20));
        assert_eq!(opening.pixel(9, 19), RED);
        assert_eq!(opening.pixel(10, 0), BLUE);
    }

    #[test]
    fn test_pad_to_keeps_content() {
        let mut page = PageImage::filled(4, 4, WHITE);
        page.write_pixel_block(Rect::new(3, 3, 1, 1), &[RED]).unwrap();
        let padded = OpeningJoiner::pad_to(&page, 6, 8);
        assert_eq!(padded.dimensions(), (6, 8));
        assert_eq!(padded.pixel(3, 3), RED);
        assert_eq!(padded.pixel(5, 7), WHITE);
    }

    #[test]
    fn test_join_keeps_sixteen_bit_depth() {
        let left = PageImage::from_rgb16(PageImage::filled(2, 2, RED).pixels().clone(), SampleDepth::Sixteen);
        let right = PageImage::filled(2, 2, BLUE);
        let opening = OpeningJoiner::join(&left, &right);
        assert_eq!(opening.depth(), SampleDepth::Sixteen);
    }
}

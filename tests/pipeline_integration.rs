//! Pipeline Integration Tests
//!
//! End-to-end checks of the library pipeline on synthetic scans

mod common;

use book_autosplit::{
    OpeningJoiner, PageHalf, PageImage, SilentProgress, SplitOptions, SplitPipeline,
};
use tempfile::TempDir;

use common::{dimensions, write_spread};

fn no_deskew() -> SplitOptions {
    SplitOptions::builder().deskew(false).build()
}

#[test]
fn test_resplitting_left_output_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let scan = write_spread(temp_dir.path(), "scan.png", 200, 120, 100);
    let pipeline = SplitPipeline::new(no_deskew());

    let first = pipeline.split_file(&scan).unwrap();
    let left = first.outputs[0].path.clone();
    assert_eq!(left, temp_dir.path().join("scan_left.png"));

    // scan_left.png is 104 px wide with the stripe at x = 100
    let again = pipeline.split_file(&left).unwrap();
    let once_more = pipeline.split_file(&left).unwrap();
    assert_eq!(again.spine, once_more.spine);
    assert_eq!(
        dimensions(&temp_dir.path().join("scan_left_left.png")),
        (again.spine + 2, 120)
    );
    assert_eq!(
        again.outputs.iter().map(|o| (o.width, o.height)).collect::<Vec<_>>(),
        once_more.outputs.iter().map(|o| (o.width, o.height)).collect::<Vec<_>>()
    );
}

#[test]
fn test_zero_overlap_split_rejoins_to_original_width() {
    let temp_dir = TempDir::new().unwrap();
    let scan = write_spread(temp_dir.path(), "scan.png", 200, 120, 100);
    let options = SplitOptions::builder()
        .deskew(false)
        .fudge_factor_percent(0.0)
        .build();

    let outcome = SplitPipeline::new(options)
        .split_image(PageImage::load(&scan).unwrap())
        .unwrap();
    let original = PageImage::load(&scan).unwrap();
    let pages = outcome.pages;
    let left = pages.iter().find(|p| p.half == PageHalf::Left).unwrap();
    let right = pages.iter().find(|p| p.half == PageHalf::Right).unwrap();
    assert_eq!(left.image.width() + right.image.width(), original.width());

    let opening = OpeningJoiner::join(&left.image, &right.image);
    assert_eq!(opening.dimensions(), original.dimensions());
    assert_eq!(opening.pixels(), original.pixels());
}

#[test]
fn test_batch_split_continues_past_bad_file() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_spread(temp_dir.path(), "a.png", 200, 120, 100);
    let broken = temp_dir.path().join("b.png");
    std::fs::write(&broken, b"not an image").unwrap();
    let c = write_spread(temp_dir.path(), "c.png", 160, 90, 80);

    let summary =
        SplitPipeline::new(no_deskew()).split_files(&[a, broken.clone(), c], &SilentProgress);

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].path, broken);
    assert!(temp_dir.path().join("c_right.png").exists());
}

#[test]
fn test_trimmed_split_drops_scanner_border() {
    let temp_dir = TempDir::new().unwrap();
    // stripe kept off the 40/50/60% trim sample columns
    let mut img = common::spread(200, 120, 110);
    for y in (0..10).chain(110..120) {
        for x in 0..200 {
            img.put_pixel(x, y, image::Rgb([0, 0, 0]));
        }
    }
    let scan = temp_dir.path().join("bordered.png");
    img.save(&scan).unwrap();

    let options = SplitOptions::builder().trim(true).deskew(false).build();
    let report = SplitPipeline::new(options).split_file(&scan).unwrap();

    // an 11-row window needs 9 white rows to read as page
    let trim = report.trim.unwrap();
    assert_eq!((trim.top, trim.bottom), (8, 8));
    assert_eq!(report.spine, 110);
    for page in &report.outputs {
        assert_eq!(page.height, 104);
    }
}

//! Common utilities for book-autosplit
//!
//! Output file naming, input discovery and small formatting helpers shared by
//! the pipeline and the binary.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::split::PageHalf;

/// Suffix of a joined opening
pub const OPENING_SUFFIX: &str = "_opening";

/// File extensions treated as scanned page images
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp", "pnm", "pbm", "pgm", "ppm", "tga",
];

/// `name.ext` -> `name<suffix>.ext`, in the same directory
pub fn output_path(source: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(source.file_stem().unwrap_or_default());
    name.push(suffix);
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    source.with_file_name(name)
}

/// Opening file name for a left page
///
/// The last `_left` in the file name becomes `_opening`; a name without one
/// gets `_opening` appended to its stem.
pub fn opening_path(left: &Path) -> PathBuf {
    let name = left
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let marker = PageHalf::Left.suffix();

    match name.rfind(marker) {
        Some(idx) => {
            let mut renamed = String::with_capacity(name.len() + OPENING_SUFFIX.len());
            renamed.push_str(&name[..idx]);
            renamed.push_str(OPENING_SUFFIX);
            renamed.push_str(&name[idx + marker.len()..]);
            left.with_file_name(renamed)
        }
        None => output_path(left, OPENING_SUFFIX),
    }
}

/// Whether `path` looks like something this tool wrote
pub fn is_derived_output(path: &Path) -> bool {
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy()) else {
        return false;
    };
    PageHalf::all_suffixes()
        .iter()
        .chain(std::iter::once(&OPENING_SUFFIX))
        .any(|suffix| stem.ends_with(suffix))
}

/// Whether `path` has an image file extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image files directly inside `dir`, sorted by file name
pub fn collect_image_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Expand directory arguments into their image files, leaving out this
/// tool's own outputs; other arguments pass through unchanged so missing
/// files are reported where they are processed
pub fn expand_inputs(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(
                collect_image_files(input)?
                    .into_iter()
                    .filter(|p| !is_derived_output(p)),
            );
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Format duration in human-readable format
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("scans/page01.png"), "_left"),
            PathBuf::from("scans/page01_left.png")
        );
        assert_eq!(
            output_path(Path::new("page.tar.tif"), "_right"),
            PathBuf::from("page.tar_right.tif")
        );
        assert_eq!(
            output_path(Path::new("noext"), "_autosplit"),
            PathBuf::from("noext_autosplit")
        );
    }

    #[test]
    fn test_opening_path() {
        assert_eq!(
            opening_path(Path::new("out/p001_left.png")),
            PathBuf::from("out/p001_opening.png")
        );
        // only the file name is rewritten, and only the last marker
        assert_eq!(
            opening_path(Path::new("my_left_dir/a_left_b_left.jpg")),
            PathBuf::from("my_left_dir/a_left_b_opening.jpg")
        );
        assert_eq!(
            opening_path(Path::new("page.png")),
            PathBuf::from("page_opening.png")
        );
    }

    #[test]
    fn test_is_derived_output() {
        for name in [
            "a_left.png",
            "a_right.png",
            "a_above.tif",
            "a_below.tif",
            "a_autosplit.jpg",
            "a_opening.png",
        ] {
            assert!(is_derived_output(Path::new(name)), "{}", name);
        }
        assert!(!is_derived_output(Path::new("leftover.png")));
        assert!(!is_derived_output(Path::new("page_001.png")));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.png")));
        assert!(is_image_file(Path::new("a.JPG")));
        assert!(is_image_file(Path::new("a.tiff")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("README")));
    }

    #[test]
    fn test_collect_image_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.png", "c.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let files = collect_image_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.jpg"]);
    }

    #[test]
    fn test_expand_inputs() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("x.png"), b"x").unwrap();
        let missing = PathBuf::from("/nonexistent/scan.png");

        let files = expand_inputs(&[dir.path().to_path_buf(), missing.clone()]).unwrap();
        assert_eq!(files, vec![dir.path().join("x.png"), missing]);
    }

    #[test]
    fn test_expand_inputs_skips_outputs_in_directories() {
        let dir = tempdir().unwrap();
        for name in ["x.png", "x_left.png", "x_right.png", "y_opening.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let named = dir.path().join("x_left.png");

        let files = expand_inputs(&[dir.path().to_path_buf(), named.clone()]).unwrap();
        // an output named explicitly is still processed
        assert_eq!(files, vec![dir.path().join("x.png"), named]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3660)), "1h 1m");
    }
}

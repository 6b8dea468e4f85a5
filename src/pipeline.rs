//! Processing pipelines
//!
//! [`SplitPipeline`] runs one scan through rotate → trim → deskew → spine →
//! split and writes the pages next to the source. [`JoinPipeline`] is the
//! batch driver: it walks a directory of single-page scans in file name
//! order, splits each verso/recto pair in memory and writes the joined
//! opening.
//!
//! Files are processed strictly one after another; each decoded page is
//! dropped as soon as its outputs are written.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::deskew::{DeskewOptions, DeskewResult, ProjectionDeskewer};
use crate::error::{AutosplitError, Result};
use crate::join::OpeningJoiner;
use crate::page_image::PageImage;
use crate::spine::SpineLocator;
use crate::split::{PageHalf, PageSplitter, SplitOptions, SplitPage, VERTICAL_PRE_ROTATION};
use crate::trim::{BorderTrimmer, TrimOptions, TrimResult};
use crate::util::{collect_image_files, is_derived_output, is_image_file, opening_path, output_path};

/// Default verso cut position (percent of width)
pub const DEFAULT_VERSO_SPLIT: f64 = 90.0;

// ============================================================
// Progress reporting
// ============================================================

/// Progress callback for batch processing
pub trait ProgressCallback: Send + Sync {
    /// Called when a new step starts
    fn on_step_start(&self, step: &str);
    /// Called to report progress within a step
    fn on_step_progress(&self, current: usize, total: usize);
    /// Called when a step completes
    fn on_step_complete(&self, step: &str, message: &str);
    /// Called when a file fails; processing continues with the next one
    fn on_file_failed(&self, path: &Path, message: &str);
    /// Called for debug/verbose messages
    fn on_debug(&self, message: &str);
}

/// No-op progress callback (silent mode)
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_step_start(&self, _step: &str) {}
    fn on_step_progress(&self, _current: usize, _total: usize) {}
    fn on_step_complete(&self, _step: &str, _message: &str) {}
    fn on_file_failed(&self, _path: &Path, _message: &str) {}
    fn on_debug(&self, _message: &str) {}
}

// ============================================================
// Reports
// ============================================================

/// A page written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenPage {
    pub half: PageHalf,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Result of splitting one file
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub source: PathBuf,
    /// Cut column in the trimmed, deskewed image
    pub spine: u32,
    /// Whether the cut came from a fixed percentage rather than detection
    pub fixed_split: bool,
    pub trim: Option<TrimResult>,
    pub deskew: Option<DeskewResult>,
    pub outputs: Vec<WrittenPage>,
}

/// Result of joining one verso/recto pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub verso: PathBuf,
    pub recto: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// One unit of work in a join run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JoinOutcome {
    /// A pair joined into an opening
    Opening(JoinReport),
    /// A trailing verso without a recto, split on its own
    Unpaired(SplitReport),
}

/// A file that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: &Path, error: &AutosplitError) -> Self {
        Self {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Results of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary<R> {
    pub reports: Vec<R>,
    pub failures: Vec<FileFailure>,
}

impl<R> Default for BatchSummary<R> {
    fn default() -> Self {
        Self {
            reports: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<R> BatchSummary<R> {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure<P: ProgressCallback>(&mut self, failure: FileFailure, progress: &P) {
        progress.on_file_failed(&failure.path, &failure.message);
        self.failures.push(failure);
    }
}

// ============================================================
// Split pipeline
// ============================================================

/// In-memory result of splitting one image
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub spine: u32,
    pub fixed_split: bool,
    pub trim: Option<TrimResult>,
    pub deskew: Option<DeskewResult>,
    pub pages: Vec<SplitPage>,
}

impl SplitOutcome {
    /// Take the page for `half`, if this split produced one
    pub fn take_page(self, half: PageHalf) -> Option<PageImage> {
        self.pages
            .into_iter()
            .find(|p| p.half == half)
            .map(|p| p.image)
    }
}

/// Single-image split pipeline
#[derive(Debug, Clone, Default)]
pub struct SplitPipeline {
    options: SplitOptions,
    trim_options: TrimOptions,
    deskew_options: DeskewOptions,
}

impl SplitPipeline {
    pub fn new(options: SplitOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_trim_options(mut self, trim_options: TrimOptions) -> Self {
        self.trim_options = trim_options;
        self
    }

    #[must_use]
    pub fn with_deskew_options(mut self, deskew_options: DeskewOptions) -> Self {
        self.deskew_options = deskew_options;
        self
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Run the analysis stages and split in memory
    pub fn split_image(&self, image: PageImage) -> Result<SplitOutcome> {
        let opts = &self.options;

        let mut image = if opts.vertical {
            image.rotate(VERTICAL_PRE_ROTATION)?
        } else {
            image
        };

        let trim = if opts.trim {
            let (trimmed, result) = BorderTrimmer::trim(image, &self.trim_options)?;
            image = trimmed;
            Some(result)
        } else {
            None
        };

        let deskew = if opts.deskew {
            let (straightened, result) = ProjectionDeskewer::deskew(image, &self.deskew_options);
            image = straightened;
            Some(result)
        } else {
            None
        };

        let spine = match opts.fixed_split_percent {
            Some(percent) => SpineLocator::fixed(&image, percent)?,
            None => SpineLocator::locate(&image, opts.spine_side)?,
        };

        let pages = PageSplitter::split(image, spine, opts)?;
        Ok(SplitOutcome {
            spine,
            fixed_split: opts.fixed_split_percent.is_some(),
            trim,
            deskew,
            pages,
        })
    }

    /// Split one file, writing each page beside the source
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn split_file(&self, path: &Path) -> Result<SplitReport> {
        let image = PageImage::load(path)?;
        let outcome = self.split_image(image)?;
        info!(spine = outcome.spine, fixed = outcome.fixed_split, "spine located");

        let mut outputs = Vec::with_capacity(outcome.pages.len());
        for page in outcome.pages {
            let out = output_path(path, page.half.suffix());
            page.image.save(&out)?;
            outputs.push(WrittenPage {
                half: page.half,
                path: out,
                width: page.image.width(),
                height: page.image.height(),
            });
        }

        Ok(SplitReport {
            source: path.to_path_buf(),
            spine: outcome.spine,
            fixed_split: outcome.fixed_split,
            trim: outcome.trim,
            deskew: outcome.deskew,
            outputs,
        })
    }

    /// Split every file in order, continuing past failures
    pub fn split_files<P: ProgressCallback>(
        &self,
        files: &[PathBuf],
        progress: &P,
    ) -> BatchSummary<SplitReport> {
        let mut summary = BatchSummary::default();
        let total = files.len();

        for (idx, path) in files.iter().enumerate() {
            progress.on_step_start(&path.display().to_string());
            match self.split_file(path) {
                Ok(report) => {
                    progress.on_step_complete(
                        &path.display().to_string(),
                        &format!("spine at {}, {} page(s)", report.spine, report.outputs.len()),
                    );
                    summary.reports.push(report);
                }
                Err(e) => summary.record_failure(FileFailure::new(path, &e), progress),
            }
            progress.on_step_progress(idx + 1, total);
        }

        summary
    }
}

// ============================================================
// Join pipeline
// ============================================================

/// Batch join configuration
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOptions {
    /// Verso cut position (percent of width) when not detecting
    pub verso_split_percent: f64,
    /// Search the right edge of verso scans for the spine instead
    pub detect_verso: bool,
    /// Trim scanner-bed borders from both scans
    pub trim: bool,
    /// Correct rotational tilt of both scans
    pub deskew: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            verso_split_percent: DEFAULT_VERSO_SPLIT,
            detect_verso: false,
            trim: true,
            deskew: true,
        }
    }
}

impl JoinOptions {
    #[must_use]
    pub fn with_verso_split(mut self, percent: f64) -> Self {
        self.verso_split_percent = percent;
        self
    }

    #[must_use]
    pub fn with_detect_verso(mut self, detect: bool) -> Self {
        self.detect_verso = detect;
        self
    }

    #[must_use]
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    #[must_use]
    pub fn with_deskew(mut self, deskew: bool) -> Self {
        self.deskew = deskew;
        self
    }

    /// Split options for the even-indexed (verso) scan
    pub fn verso_options(&self) -> SplitOptions {
        let fixed = (!self.detect_verso).then_some(self.verso_split_percent);
        SplitOptions {
            trim: self.trim,
            deskew: self.deskew,
            ..SplitOptions::verso(fixed)
        }
    }

    /// Split options for the odd-indexed (recto) scan
    pub fn recto_options(&self) -> SplitOptions {
        SplitOptions {
            trim: self.trim,
            deskew: self.deskew,
            ..SplitOptions::recto()
        }
    }
}

/// Consecutive scans forming one opening
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePair {
    pub verso: PathBuf,
    pub recto: Option<PathBuf>,
}

/// Directory batch driver: pairs scans and joins them into openings
#[derive(Debug, Clone, Default)]
pub struct JoinPipeline {
    options: JoinOptions,
    trim_options: TrimOptions,
    deskew_options: DeskewOptions,
}

impl JoinPipeline {
    pub fn new(options: JoinOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_trim_options(mut self, trim_options: TrimOptions) -> Self {
        self.trim_options = trim_options;
        self
    }

    #[must_use]
    pub fn with_deskew_options(mut self, deskew_options: DeskewOptions) -> Self {
        self.deskew_options = deskew_options;
        self
    }

    pub fn options(&self) -> &JoinOptions {
        &self.options
    }

    fn pipeline_for(&self, options: SplitOptions) -> SplitPipeline {
        SplitPipeline::new(options)
            .with_trim_options(self.trim_options.clone())
            .with_deskew_options(self.deskew_options.clone())
    }

    /// Pair sorted files by position: even index verso, odd index recto
    ///
    /// Non-image files and this tool's own outputs are skipped so a
    /// directory can be processed again without pairing against them.
    pub fn pair_files(files: &[PathBuf]) -> Vec<PagePair> {
        let scans: Vec<&PathBuf> = files
            .iter()
            .filter(|p| is_image_file(p) && !is_derived_output(p))
            .collect();

        scans
            .chunks(2)
            .map(|chunk| PagePair {
                verso: chunk[0].clone(),
                recto: chunk.get(1).map(|p| (*p).clone()),
            })
            .collect()
    }

    /// Pairs for every scan in `dir`
    pub fn plan(dir: &Path) -> Result<Vec<PagePair>> {
        let files = collect_image_files(dir)?;
        Ok(Self::pair_files(&files))
    }

    fn extract_page(&self, path: &Path, options: SplitOptions, half: PageHalf) -> Result<PageImage> {
        let image = PageImage::load(path)?;
        let outcome = self.pipeline_for(options).split_image(image)?;
        info!(path = %path.display(), spine = outcome.spine, "spine located");
        outcome.take_page(half).ok_or_else(|| {
            AutosplitError::InvalidOption(format!(
                "split of {} produced no {} page",
                path.display(),
                half.suffix()
            ))
        })
    }

    /// Split a verso/recto pair in memory and write the joined opening
    #[instrument(skip_all, fields(verso = %verso.display(), recto = %recto.display()))]
    pub fn join_pair(&self, verso: &Path, recto: &Path) -> std::result::Result<JoinReport, FileFailure> {
        let fail = |path: &Path, e: AutosplitError| FileFailure::new(path, &e);

        let left = self
            .extract_page(verso, self.options.verso_options(), PageHalf::Left)
            .map_err(|e| fail(verso, e))?;
        let right = self
            .extract_page(recto, self.options.recto_options(), PageHalf::Right)
            .map_err(|e| fail(recto, e))?;

        let opening = OpeningJoiner::join(&left, &right);
        drop(left);
        drop(right);

        let output = opening_path(&output_path(verso, PageHalf::Left.suffix()));
        opening.save(&output).map_err(|e| fail(verso, e))?;
        info!(output = %output.display(), "opening written");

        Ok(JoinReport {
            verso: verso.to_path_buf(),
            recto: recto.to_path_buf(),
            output,
            width: opening.width(),
            height: opening.height(),
        })
    }

    /// Process every pair in `dir`, continuing past failures
    pub fn process_directory<P: ProgressCallback>(
        &self,
        dir: &Path,
        progress: &P,
    ) -> Result<BatchSummary<JoinOutcome>> {
        let pairs = Self::plan(dir)?;
        Ok(self.process_pairs(&pairs, progress))
    }

    /// Process pre-computed pairs in order
    pub fn process_pairs<P: ProgressCallback>(
        &self,
        pairs: &[PagePair],
        progress: &P,
    ) -> BatchSummary<JoinOutcome> {
        let mut summary = BatchSummary::default();
        let total = pairs.len();

        for (idx, pair) in pairs.iter().enumerate() {
            progress.on_step_start(&pair.verso.display().to_string());
            match &pair.recto {
                Some(recto) => match self.join_pair(&pair.verso, recto) {
                    Ok(report) => {
                        progress.on_step_complete(
                            &pair.verso.display().to_string(),
                            &format!("opening {}x{}", report.width, report.height),
                        );
                        summary.reports.push(JoinOutcome::Opening(report));
                    }
                    Err(failure) => summary.record_failure(failure, progress),
                },
                None => {
                    warn!(path = %pair.verso.display(), "no recto scan to pair with, splitting alone");
                    progress.on_debug(&format!("{} has no partner", pair.verso.display()));
                    let pipeline = self.pipeline_for(self.options.verso_options());
                    match pipeline.split_file(&pair.verso) {
                        Ok(report) => summary.reports.push(JoinOutcome::Unpaired(report)),
                        Err(e) => summary.record_failure(FileFailure::new(&pair.verso, &e), progress),
                    }
                }
            }
            progress.on_step_progress(idx + 1, total);
        }

        summary
    }
}

//! Snapshot comparison lifecycle.
//!
//! One `SnapshotComparator` is scoped to a single test. Each `compare` call
//! resolves the baseline identity for a view, clears stale failure evidence,
//! then either refreshes the baseline, establishes a missing one, or runs
//! the pixel diff and persists the failure artifact set.

use crate::config::ComparatorConfig;
use crate::context::TestContext;
use crate::identity::{ArtifactRole, SnapshotIdentity};
use crate::pixelmatch::{PixelDiff, Pixelmatch};
use crate::report::{DiffBundle, NullSink, ReportSink, ATTACHMENT_NAME, ATTACHMENT_TYPE};
use crate::result::{CotejarError, CotejarResult};
use crate::store::{FsStore, SnapshotStore};
use image::{ImageEncoder, Rgba, RgbaImage};
use std::path::PathBuf;
use tracing::debug;

/// Compares candidate screenshots against named baselines for one test.
pub struct SnapshotComparator {
    context: TestContext,
    config: ComparatorConfig,
    store: Box<dyn SnapshotStore>,
    differ: Box<dyn PixelDiff>,
    sink: Box<dyn ReportSink>,
}

impl std::fmt::Debug for SnapshotComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotComparator")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish()
    }
}

impl SnapshotComparator {
    /// Create a comparator for one test with the default collaborators
    /// (filesystem store, perceptual differ, discarding sink).
    #[must_use]
    pub fn new(context: TestContext, config: ComparatorConfig) -> Self {
        Self {
            context,
            config,
            store: Box::new(FsStore::new()),
            differ: Box::new(Pixelmatch::new()),
            sink: Box::new(NullSink::new()),
        }
    }

    /// Replace the storage backend.
    #[must_use]
    pub fn with_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Replace the pixel differ.
    #[must_use]
    pub fn with_differ(mut self, differ: impl PixelDiff + 'static) -> Self {
        self.differ = Box::new(differ);
        self
    }

    /// Replace the report sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Test context this comparator is scoped to.
    #[must_use]
    pub const fn context(&self) -> &TestContext {
        &self.context
    }

    /// Baseline path for one view of this test:
    /// `<base>/<snapshot_dir>/<file_stem>/<group_key>/<file_name>`.
    #[must_use]
    pub fn baseline_path(&self, identity: &SnapshotIdentity) -> PathBuf {
        self.context
            .base_dir()
            .join(&self.config.snapshot_dir)
            .join(self.context.file_stem())
            .join(identity.group_key())
            .join(identity.file_name())
    }

    /// Failure artifact directory for this test:
    /// `<base>/<failures_dir>/<file_stem>/<qualified_name>`.
    #[must_use]
    pub fn failure_dir(&self, identity: &SnapshotIdentity) -> PathBuf {
        self.context
            .base_dir()
            .join(&self.config.failures_dir)
            .join(self.context.file_stem())
            .join(identity.qualified_name())
    }

    /// Compare a candidate screenshot against the baseline for `view_label`,
    /// using the configured threshold and fail-fast mode.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotMismatch`/`DimensionMismatch` on a failed
    /// comparison (after persisting artifacts), `Decode` on invalid image
    /// bytes, and `Io` on storage failures.
    pub fn compare(&self, candidate: &[u8], view_label: &str) -> CotejarResult<()> {
        self.compare_with(
            candidate,
            view_label,
            self.config.threshold,
            self.config.fail_fast,
        )
    }

    /// Compare with per-call threshold and fail-fast overrides.
    ///
    /// Under `fail_fast` the differ may stop at the first mismatched pixel,
    /// so the count carried by a mismatch failure is a lower bound.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::compare`].
    pub fn compare_with(
        &self,
        candidate: &[u8],
        view_label: &str,
        threshold: f64,
        fail_fast: bool,
    ) -> CotejarResult<()> {
        let identity = self.context.identity(view_label);
        let baseline_path = self.baseline_path(&identity);
        let failure_dir = self.failure_dir(&identity);
        debug!(
            name = %identity.file_name(),
            baseline = %baseline_path.display(),
            "resolved snapshot identity"
        );

        // A prior failing run may have left evidence behind; it goes away
        // before any mode dispatch so a passing run leaves nothing stale.
        self.store.remove_tree(&failure_dir)?;

        if self.config.update_snapshots {
            self.store.write(&baseline_path, candidate)?;
            debug!(baseline = %baseline_path.display(), "baseline refreshed");
            println!("--> Snapshots updated. Please review images");
            return Ok(());
        }

        if !self.store.exists(&baseline_path) {
            self.store.write(&baseline_path, candidate)?;
            debug!(baseline = %baseline_path.display(), "baseline established");
            println!("--> New snapshot(s) created. Please review images");
            return Ok(());
        }

        let candidate_img = decode(candidate)?;
        let baseline_bytes = self.store.read(&baseline_path)?;
        let baseline_img = decode(&baseline_bytes)?;

        if candidate_img.dimensions() != baseline_img.dimensions() {
            let diff = full_highlight(candidate_img.width(), candidate_img.height());
            self.persist_failure(&identity, &failure_dir, &diff, candidate, &baseline_bytes)?;
            let (bw, bh) = baseline_img.dimensions();
            let (cw, ch) = candidate_img.dimensions();
            return Err(CotejarError::DimensionMismatch {
                name: identity.file_name(),
                baseline_width: bw,
                baseline_height: bh,
                candidate_width: cw,
                candidate_height: ch,
            });
        }

        let mut diff = RgbaImage::new(candidate_img.width(), candidate_img.height());
        let mismatched =
            self.differ
                .diff(&candidate_img, &baseline_img, &mut diff, threshold, fail_fast);
        if mismatched == 0 {
            return Ok(());
        }

        self.persist_failure(&identity, &failure_dir, &diff, candidate, &baseline_bytes)?;
        Err(CotejarError::SnapshotMismatch {
            name: identity.file_name(),
            mismatched_pixels: mismatched,
        })
    }

    /// Write the artifact triplet, then re-read it and attach the encoded
    /// bundle to the report sink. Runs strictly before the failure is
    /// signaled so the report never lacks evidence.
    fn persist_failure(
        &self,
        identity: &SnapshotIdentity,
        failure_dir: &std::path::Path,
        diff: &RgbaImage,
        candidate: &[u8],
        baseline: &[u8],
    ) -> CotejarResult<()> {
        let diff_png = encode_png(diff)?;
        for (role, bytes) in [
            (ArtifactRole::Diff, diff_png.as_slice()),
            (ArtifactRole::Actual, candidate),
            (ArtifactRole::Expected, baseline),
        ] {
            let path = failure_dir.join(identity.artifact_file_name(role));
            self.store.write(&path, bytes)?;
        }
        debug!(dir = %failure_dir.display(), "failure artifacts written");

        let read_back = |role: ArtifactRole| {
            self.store
                .read(&failure_dir.join(identity.artifact_file_name(role)))
        };
        let bundle = DiffBundle::new(
            &read_back(ArtifactRole::Expected)?,
            &read_back(ArtifactRole::Actual)?,
            &read_back(ArtifactRole::Diff)?,
        );
        self.sink
            .attach(&bundle.to_bytes()?, ATTACHMENT_NAME, ATTACHMENT_TYPE);
        Ok(())
    }
}

/// Decode raw bytes into an RGBA bitmap.
fn decode(bytes: &[u8]) -> CotejarResult<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|e| CotejarError::Decode {
        message: e.to_string(),
    })?;
    Ok(img.to_rgba8())
}

/// Encode a bitmap to PNG bytes.
fn encode_png(img: &RgbaImage) -> CotejarResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| CotejarError::Encode {
            message: e.to_string(),
        })?;
    Ok(buffer)
}

/// Candidate-sized canvas with every pixel flagged; stands in for a pixel
/// diff when the dimensions disagree and no comparison can run.
fn full_highlight(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = Rgba([255, 0, 0, 255]);
    }
    img
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::report::MemorySink;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let mut img = RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = color;
        }
        encode_png(&img).unwrap()
    }

    fn context() -> TestContext {
        TestContext::new("test_home", "tests/ui_suite.rs").with_platform("linux")
    }

    struct SharedStore(Arc<MemoryStore>);

    impl SnapshotStore for SharedStore {
        fn read(&self, path: &std::path::Path) -> CotejarResult<Vec<u8>> {
            self.0.read(path)
        }
        fn write(&self, path: &std::path::Path, bytes: &[u8]) -> CotejarResult<()> {
            self.0.write(path, bytes)
        }
        fn exists(&self, path: &std::path::Path) -> bool {
            self.0.exists(path)
        }
        fn remove_tree(&self, path: &std::path::Path) -> CotejarResult<()> {
            self.0.remove_tree(path)
        }
    }

    struct SharedSink(Arc<MemorySink>);

    impl ReportSink for SharedSink {
        fn attach(&self, bytes: &[u8], name: &str, attachment_type: &str) {
            self.0.attach(bytes, name, attachment_type);
        }
    }

    fn comparator(
        config: ComparatorConfig,
    ) -> (SnapshotComparator, Arc<MemoryStore>, Arc<MemorySink>) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemorySink::new());
        let cmp = SnapshotComparator::new(context(), config)
            .with_store(SharedStore(store.clone()))
            .with_sink(SharedSink(sink.clone()));
        (cmp, store, sink)
    }

    #[test]
    fn test_missing_baseline_bootstraps() {
        let (cmp, store, sink) = comparator(ComparatorConfig::default());
        let candidate = png(10, 10, RED);

        cmp.compare(&candidate, "main").unwrap();

        let baseline = cmp.baseline_path(&cmp.context().identity("main"));
        assert_eq!(store.read(&baseline).unwrap(), candidate);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_baseline_path_layout() {
        let (cmp, _, _) = comparator(ComparatorConfig::default());
        let path = cmp.baseline_path(&cmp.context().identity("main"));
        assert_eq!(
            path,
            std::path::Path::new(
                "tests/snapshots/ui_suite/test_home/test_home[linux][main].png"
            )
        );
    }

    #[test]
    fn test_failure_dir_layout() {
        let (cmp, _, _) = comparator(ComparatorConfig::default());
        let dir = cmp.failure_dir(&cmp.context().identity("main"));
        assert_eq!(
            dir,
            std::path::Path::new("tests/snapshot_tests_failures/ui_suite/test_home[linux]")
        );
    }

    #[test]
    fn test_identical_images_pass_without_artifacts() {
        let (cmp, store, sink) = comparator(ComparatorConfig::default());
        let candidate = png(10, 10, RED);

        cmp.compare(&candidate, "main").unwrap();
        cmp.compare(&candidate, "main").unwrap();

        let failures = cmp.failure_dir(&cmp.context().identity("main"));
        assert!(store.paths_under(&failures).is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_mismatch_fails_with_artifact_triplet() {
        let (cmp, store, sink) = comparator(ComparatorConfig::default());
        let identity = cmp.context().identity("main");

        cmp.compare(&png(10, 10, RED), "main").unwrap();
        let err = cmp.compare(&png(10, 10, BLUE), "main").unwrap_err();

        assert!(
            matches!(&err, CotejarError::SnapshotMismatch { mismatched_pixels, .. } if *mismatched_pixels == 100)
        );

        let failure_dir = cmp.failure_dir(&identity);
        assert_eq!(store.paths_under(&failure_dir).len(), 3);

        let expected =
            decode(&store.read(&failure_dir.join(identity.artifact_file_name(ArtifactRole::Expected))).unwrap())
                .unwrap();
        assert_eq!(*expected.get_pixel(0, 0), RED);
        let actual =
            decode(&store.read(&failure_dir.join(identity.artifact_file_name(ArtifactRole::Actual))).unwrap())
                .unwrap();
        assert_eq!(*actual.get_pixel(0, 0), BLUE);
        let diff =
            decode(&store.read(&failure_dir.join(identity.artifact_file_name(ArtifactRole::Diff))).unwrap())
                .unwrap();
        assert_eq!(*diff.get_pixel(0, 0), Rgba([255, 0, 0, 255]));

        assert_eq!(sink.len(), 1);
        let attachment = &sink.attachments()[0];
        assert_eq!(attachment.name, ATTACHMENT_NAME);
        assert_eq!(attachment.attachment_type, ATTACHMENT_TYPE);
        let bundle: serde_json::Value = serde_json::from_slice(&attachment.bytes).unwrap();
        for key in ["expected", "actual", "diff"] {
            assert!(bundle[key]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,"));
        }
    }

    #[test]
    fn test_passing_run_clears_prior_failure_artifacts() {
        let (cmp, store, _) = comparator(ComparatorConfig::default());
        let identity = cmp.context().identity("main");
        let red = png(10, 10, RED);

        cmp.compare(&red, "main").unwrap();
        let _ = cmp.compare(&png(10, 10, BLUE), "main").unwrap_err();
        assert!(!store.paths_under(&cmp.failure_dir(&identity)).is_empty());

        cmp.compare(&red, "main").unwrap();
        assert!(store.paths_under(&cmp.failure_dir(&identity)).is_empty());
    }

    #[test]
    fn test_failing_run_replaces_prior_failure_artifacts() {
        let (cmp, store, sink) = comparator(ComparatorConfig::default());
        let identity = cmp.context().identity("main");

        cmp.compare(&png(10, 10, RED), "main").unwrap();
        let _ = cmp.compare(&png(10, 10, BLUE), "main").unwrap_err();
        let _ = cmp
            .compare(&png(10, 10, Rgba([0, 255, 0, 255])), "main")
            .unwrap_err();

        // Still exactly one triplet, from the latest run
        let failure_dir = cmp.failure_dir(&identity);
        assert_eq!(store.paths_under(&failure_dir).len(), 3);
        assert_eq!(sink.len(), 2);

        let actual = decode(
            &store
                .read(&failure_dir.join(identity.artifact_file_name(ArtifactRole::Actual)))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(*actual.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_refresh_overwrites_baseline() {
        let (cmp, store, _) =
            comparator(ComparatorConfig::default().with_update_snapshots(true));
        let baseline = cmp.baseline_path(&cmp.context().identity("main"));
        let red = png(10, 10, RED);
        let blue = png(10, 10, BLUE);

        cmp.compare(&red, "main").unwrap();
        assert_eq!(store.read(&baseline).unwrap(), red);

        cmp.compare(&blue, "main").unwrap();
        assert_eq!(store.read(&baseline).unwrap(), blue);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let (cmp, store, _) =
            comparator(ComparatorConfig::default().with_update_snapshots(true));
        let baseline = cmp.baseline_path(&cmp.context().identity("main"));
        let red = png(10, 10, RED);

        cmp.compare(&red, "main").unwrap();
        cmp.compare(&red, "main").unwrap();
        assert_eq!(store.read(&baseline).unwrap(), red);
    }

    #[test]
    fn test_refresh_skips_comparison_entirely() {
        // A mismatching candidate still succeeds in refresh mode
        let (cmp, _, sink) =
            comparator(ComparatorConfig::default().with_update_snapshots(true));
        cmp.compare(&png(10, 10, RED), "main").unwrap();
        cmp.compare(&png(10, 10, BLUE), "main").unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_distinct_views_get_distinct_baselines() {
        let (cmp, store, _) = comparator(ComparatorConfig::default());

        cmp.compare(&png(10, 10, RED), "tab1").unwrap();
        cmp.compare(&png(10, 10, BLUE), "tab2").unwrap();

        let tab1 = cmp.baseline_path(&cmp.context().identity("tab1"));
        let tab2 = cmp.baseline_path(&cmp.context().identity("tab2"));
        assert_ne!(tab1, tab2);
        assert_ne!(store.read(&tab1).unwrap(), store.read(&tab2).unwrap());

        // Each still matches its own baseline
        cmp.compare(&png(10, 10, RED), "tab1").unwrap();
        cmp.compare(&png(10, 10, BLUE), "tab2").unwrap();
    }

    #[test]
    fn test_invalid_candidate_is_decode_error() {
        let (cmp, _, _) = comparator(ComparatorConfig::default());
        cmp.compare(&png(4, 4, RED), "main").unwrap();

        let err = cmp.compare(b"definitely not a png", "main").unwrap_err();
        assert!(matches!(err, CotejarError::Decode { .. }));
        assert!(!err.is_mismatch());
    }

    #[test]
    fn test_corrupt_baseline_is_decode_error() {
        let (cmp, store, _) = comparator(ComparatorConfig::default());
        let baseline = cmp.baseline_path(&cmp.context().identity("main"));
        store.write(&baseline, b"corrupt").unwrap();

        let err = cmp.compare(&png(4, 4, RED), "main").unwrap_err();
        assert!(matches!(err, CotejarError::Decode { .. }));
    }

    #[test]
    fn test_dimension_mismatch_fails_with_dedicated_reason() {
        let (cmp, store, sink) = comparator(ComparatorConfig::default());
        let identity = cmp.context().identity("main");

        cmp.compare(&png(10, 10, RED), "main").unwrap();
        let err = cmp.compare(&png(20, 5, RED), "main").unwrap_err();

        match err {
            CotejarError::DimensionMismatch {
                baseline_width,
                baseline_height,
                candidate_width,
                candidate_height,
                ..
            } => {
                assert_eq!((baseline_width, baseline_height), (10, 10));
                assert_eq!((candidate_width, candidate_height), (20, 5));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }

        // Same artifact discipline as a pixel mismatch
        assert_eq!(store.paths_under(&cmp.failure_dir(&identity)).len(), 3);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_per_call_threshold_override() {
        let (cmp, _, _) = comparator(ComparatorConfig::default());
        let gray_a = png(10, 10, Rgba([100, 100, 100, 255]));
        let gray_b = png(10, 10, Rgba([140, 140, 140, 255]));

        cmp.compare(&gray_a, "main").unwrap();
        // 40 gray levels is within the default 0.3 threshold...
        cmp.compare(&gray_b, "main").unwrap();
        // ...but not within a strict one
        let err = cmp.compare_with(&gray_b, "main", 0.01, false).unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn test_fail_fast_reports_lower_bound() {
        let (cmp, _, _) = comparator(ComparatorConfig::default());
        cmp.compare(&png(10, 10, RED), "main").unwrap();

        let err = cmp
            .compare_with(&png(10, 10, BLUE), "main", 0.3, true)
            .unwrap_err();
        match err {
            CotejarError::SnapshotMismatch {
                mismatched_pixels, ..
            } => assert_eq!(mismatched_pixels, 1),
            other => panic!("expected SnapshotMismatch, got {other:?}"),
        }
    }
}

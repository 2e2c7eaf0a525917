//! Per-test ambient context.
//!
//! The host runner knows which test is executing and which source file it
//! lives in; the comparator receives that knowledge as an explicit value
//! instead of reading runner globals.

use crate::identity::SnapshotIdentity;
use std::path::{Path, PathBuf};

/// Identity of the currently executing test, as supplied by the host runner.
#[derive(Debug, Clone)]
pub struct TestContext {
    /// Test name, possibly carrying a parameterization bracket
    test_name: String,
    /// Path of the test's source file
    source_file: PathBuf,
    /// Platform tag folded into every snapshot identity
    platform: String,
}

impl TestContext {
    /// Create a context for a test, tagging it with the current OS.
    #[must_use]
    pub fn new(test_name: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Self {
            test_name: test_name.into(),
            source_file: source_file.into(),
            platform: std::env::consts::OS.to_string(),
        }
    }

    /// Override the platform tag.
    ///
    /// Useful when baselines recorded under another naming convention
    /// (`darwin`, `win32`) must keep resolving to the same files.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Test name as supplied by the runner.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Platform tag.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Source file of the test.
    #[must_use]
    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// Directory containing the test's source file.
    ///
    /// Snapshot and failure trees are rooted here.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.source_file.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Source file name without its extension; names the per-file
    /// subdirectory of the snapshot and failure trees.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.source_file
            .file_stem()
            .map_or_else(|| "unknown".to_string(), |s| s.to_string_lossy().into_owned())
    }

    /// Derive the snapshot identity for one view of this test.
    #[must_use]
    pub fn identity(&self, view_label: &str) -> SnapshotIdentity {
        SnapshotIdentity::new(&self.test_name, &self.platform, view_label)
    }
}

//! Comparator configuration.

/// Configuration for snapshot comparison.
///
/// An immutable value handed to the comparator at construction. The refresh
/// switch is part of this value rather than process-global state, so a test
/// of the comparator can flip it per instance.
#[derive(Debug, Clone)]
pub struct ComparatorConfig {
    /// Unconditionally overwrite baselines with the candidate
    pub update_snapshots: bool,
    /// Fractional pixel-difference sensitivity (0.0-1.0) forwarded to the differ
    pub threshold: f64,
    /// Let the differ stop at the first mismatched pixel
    pub fail_fast: bool,
    /// Name of the baseline tree directory under the test file's directory
    pub snapshot_dir: String,
    /// Name of the failure artifact tree directory under the test file's directory
    pub failures_dir: String,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            update_snapshots: false,
            threshold: 0.3,
            fail_fast: false,
            snapshot_dir: String::from("snapshots"),
            failures_dir: String::from("snapshot_tests_failures"),
        }
    }
}

impl ComparatorConfig {
    /// Set refresh mode.
    #[must_use]
    pub const fn with_update_snapshots(mut self, update: bool) -> Self {
        self.update_snapshots = update;
        self
    }

    /// Set the mismatch threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set fail-fast mode for the differ.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the baseline tree directory name.
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<String>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Set the failure artifact tree directory name.
    #[must_use]
    pub fn with_failures_dir(mut self, dir: impl Into<String>) -> Self {
        self.failures_dir = dir.into();
        self
    }
}

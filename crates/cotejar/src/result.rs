//! Result and error types for Cotejar.

use thiserror::Error;

/// Result type for Cotejar operations
pub type CotejarResult<T> = Result<T, CotejarError>;

/// Errors that can occur in Cotejar
#[derive(Debug, Error)]
pub enum CotejarError {
    /// Candidate or baseline bytes are not a valid image
    #[error("Image decode failed: {message}")]
    Decode {
        /// Error message
        message: String,
    },

    /// Image encoding failed (diff canvas to PNG)
    #[error("Image encode failed: {message}")]
    Encode {
        /// Error message
        message: String,
    },

    /// Snapshot mismatch: the candidate differs from the baseline.
    ///
    /// Raised only after the failure artifact set has been persisted and
    /// attached to the report sink.
    #[error("Snapshots DO NOT match: {name} ({mismatched_pixels} differing pixels)")]
    SnapshotMismatch {
        /// Snapshot file name
        name: String,
        /// Number of differing pixels (a lower bound under fail-fast)
        mismatched_pixels: usize,
    },

    /// Candidate and baseline dimensions differ, so no pixel comparison ran.
    ///
    /// Treated as a deliberate test failure with its own reason; the
    /// artifact set is persisted before this is raised.
    #[error(
        "Snapshots DO NOT match: {name} dimensions differ \
         (baseline {baseline_width}x{baseline_height}, candidate {candidate_width}x{candidate_height})"
    )]
    DimensionMismatch {
        /// Snapshot file name
        name: String,
        /// Baseline width
        baseline_width: u32,
        /// Baseline height
        baseline_height: u32,
        /// Candidate width
        candidate_width: u32,
        /// Candidate height
        candidate_height: u32,
    },

    /// Path missing from a non-filesystem store
    #[error("Snapshot not found in store: {path}")]
    NotFound {
        /// Store path that was requested
        path: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CotejarError {
    /// Check whether this error is a deliberate comparison failure rather
    /// than a defect in inputs or environment.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::SnapshotMismatch { .. } | Self::DimensionMismatch { .. }
        )
    }
}

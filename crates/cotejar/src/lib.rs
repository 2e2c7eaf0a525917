//! Cotejar: visual-regression snapshot comparison for UI tests.
//!
//! Cotejar (Spanish: "to collate, to check against") decides whether a
//! freshly captured screenshot matches a named baseline image within a
//! tolerance. On a mismatch it persists an expected/actual/diff artifact
//! triplet and hands an encoded bundle to the report sink before failing
//! the test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     COTEJAR Pipeline                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ Candidate│   │  Snapshot     │   │ Pixel    │   │ Report  │  │
//! │  │ bytes    │──►│  Comparator   │──►│ Differ   │──►│ Sink    │  │
//! │  │ (runner) │   │  (lifecycle)  │   │ (opaque) │   │ (diffs) │  │
//! │  └──────────┘   └───────┬───────┘   └──────────┘   └─────────┘  │
//! │                         ▼                                        │
//! │                 ┌───────────────┐                                │
//! │                 │ SnapshotStore │  snapshots/ + failure tree     │
//! │                 └───────────────┘                                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cotejar::{ComparatorConfig, SnapshotComparator, TestContext};
//!
//! # fn capture() -> Vec<u8> { Vec::new() }
//! let context = TestContext::new("test_dashboard", file!());
//! let comparator = SnapshotComparator::new(context, ComparatorConfig::default());
//!
//! // First run establishes the baseline; later runs compare against it.
//! comparator.compare(&capture(), "main tab")?;
//! # Ok::<(), cotejar::CotejarError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod comparator;
mod config;
mod context;
mod identity;
mod pixelmatch;
mod report;
mod result;
mod store;

/// Command-line glue for host runners (requires the `cli` feature)
#[cfg(feature = "cli")]
pub mod cli;

pub use comparator::SnapshotComparator;
pub use config::ComparatorConfig;
pub use context::TestContext;
pub use identity::{ArtifactRole, SnapshotIdentity};
pub use pixelmatch::{perceptual_diff, PixelDiff, Pixelmatch};
pub use report::{
    Attachment, DiffBundle, MemorySink, NullSink, ReportSink, ATTACHMENT_NAME, ATTACHMENT_TYPE,
};
pub use result::{CotejarError, CotejarResult};
pub use store::{FsStore, MemoryStore, SnapshotStore};

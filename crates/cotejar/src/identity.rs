//! Snapshot identity and its on-disk naming scheme.
//!
//! A baseline image is addressed by a structured identity rather than ad hoc
//! string concatenation, so the mapping from (test, platform, view) to paths
//! is deterministic and unit-testable without touching the filesystem.

/// Role of an image inside a failure artifact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    /// Baseline copy
    Expected,
    /// Candidate copy
    Actual,
    /// Pixel difference canvas
    Diff,
}

impl ArtifactRole {
    /// Filename prefix for this role.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Expected => "Expected_",
            Self::Actual => "Actual_",
            Self::Diff => "Diff_",
        }
    }

    /// Key used for this role in the report bundle.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Actual => "actual",
            Self::Diff => "diff",
        }
    }

    /// All roles, in the order artifacts are written.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Diff, Self::Actual, Self::Expected]
    }
}

/// Identity of one baseline image: test name, platform tag, view label.
///
/// Stable across repeated runs of the same test on the same platform for the
/// same view, and distinct across views of the same test. Components are
/// sanitized on construction so the serialized forms are always valid
/// single-level file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotIdentity {
    test_name: String,
    platform: String,
    view_label: String,
}

impl SnapshotIdentity {
    /// Create an identity from raw components.
    ///
    /// `test_name` may carry a parameterization bracket (`"zoom[2x]"`);
    /// the bracket is kept in file names and stripped for the grouping key.
    #[must_use]
    pub fn new(
        test_name: impl Into<String>,
        platform: impl Into<String>,
        view_label: impl Into<String>,
    ) -> Self {
        Self {
            test_name: sanitize(&test_name.into()),
            platform: sanitize(&platform.into()),
            view_label: sanitize(&view_label.into()),
        }
    }

    /// Test name, as sanitized.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Platform tag.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// View label.
    #[must_use]
    pub fn view_label(&self) -> &str {
        &self.view_label
    }

    /// Directory grouping key: the test name with its parameterization
    /// bracket stripped (`"zoom[2x]"` -> `"zoom"`).
    #[must_use]
    pub fn group_key(&self) -> &str {
        match self.test_name.find('[') {
            Some(idx) => &self.test_name[..idx],
            None => &self.test_name,
        }
    }

    /// Failure-directory key: `<test_name>[<platform>]`.
    ///
    /// Does not include the view label; one failure directory holds the
    /// artifact set for the whole (test, platform) combination.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}[{}]", self.test_name, self.platform)
    }

    /// Baseline file name: `<test_name>[<platform>][<view_label>].png`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}[{}][{}].png",
            self.test_name, self.platform, self.view_label
        )
    }

    /// Artifact file name for a role: `file_name()` with the role prefix.
    #[must_use]
    pub fn artifact_file_name(&self, role: ArtifactRole) -> String {
        format!("{}{}", role.prefix(), self.file_name())
    }
}

/// Replace characters that would break single-level file names.
///
/// Path separators, NUL and other control characters become underscores;
/// everything else (including brackets, used by the naming scheme itself)
/// passes through.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

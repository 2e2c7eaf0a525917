//! Command-line option registration for host test runners.
//!
//! A runner binary embeds [`SnapshotArgs`] with clap's
//! `#[command(flatten)]` to expose the single snapshot flag, then folds it
//! into a [`ComparatorConfig`].

use crate::config::ComparatorConfig;
use clap::Args;

/// Snapshot options a host runner registers on its command line.
#[derive(Debug, Clone, Copy, Args)]
pub struct SnapshotArgs {
    /// Overwrite every baseline with the captured screenshot
    #[arg(long)]
    pub update_snapshots: bool,
}

impl SnapshotArgs {
    /// Fold the parsed flags into a configuration.
    #[must_use]
    pub fn apply(&self, config: ComparatorConfig) -> ComparatorConfig {
        config.with_update_snapshots(self.update_snapshots)
    }
}

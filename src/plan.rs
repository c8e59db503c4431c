//! Reconciliation of a source tree against a destination tree.

use std::path::PathBuf;

use crate::classify::{Action, ExtensionTable};
use crate::tree::FileTree;

/// The work derived from two trees.
///
/// Every list holds root-relative paths in sorted order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Source-only files to copy into the destination
    pub copy: Vec<PathBuf>,
    /// Source-only files to link from the destination
    pub symlink: Vec<PathBuf>,
    /// Source-only files whose extension is in neither list
    pub ignored: Vec<PathBuf>,
    /// Destination-only files with a tracked extension. Reported, never removed.
    pub orphans: Vec<PathBuf>,
}

impl SyncPlan {
    pub fn build(source: &FileTree, destination: &FileTree, table: &ExtensionTable) -> Self {
        let mut plan = SyncPlan::default();

        for path in source.difference(destination) {
            let queue = match table.classify(path) {
                Action::Copy => &mut plan.copy,
                Action::Symlink => &mut plan.symlink,
                Action::Ignore => &mut plan.ignored,
            };
            queue.push(path.to_path_buf());
        }

        plan.orphans = destination
            .difference(source)
            .filter(|path| table.is_tracked(path))
            .map(|path| path.to_path_buf())
            .collect();

        plan
    }

    /// Whether there is nothing to copy or link
    pub fn is_empty(&self) -> bool {
        self.copy.is_empty() && self.symlink.is_empty()
    }
}

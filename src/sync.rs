//! End-to-end run: walk both trees, reconcile, materialize.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::materializer::{Materializer, SyncOptions, SyncResult};
use crate::plan::SyncPlan;
use crate::walker::build_trees;

/// Synchronize the trees named by `config`.
///
/// A walk failure on either root aborts before anything is written.
/// Failures on individual files are reported in the returned [`SyncResult`].
pub async fn sync(config: &Config, options: &SyncOptions) -> Result<SyncResult> {
    let (source_root, destination_root) = config.roots()?;
    tracing::debug!(
        source = %source_root.display(),
        destination = %destination_root.display(),
        "Resolved tree roots"
    );

    let (source, destination) = build_trees(&source_root, &destination_root)
        .await
        .context("Failed to scan directory trees")?;

    let plan = SyncPlan::build(&source, &destination, &config.extension_table());
    tracing::info!(
        copy = plan.copy.len(),
        symlink = plan.symlink.len(),
        ignored = plan.ignored.len(),
        orphans = plan.orphans.len(),
        "Reconciled trees"
    );

    let materializer = Materializer::new(source_root, destination_root);
    Ok(materializer.apply(&plan, options).await)
}

//! Copy and symlink creation in the destination tree
//!
//! Applies a [`SyncPlan`]: the copy queue runs to completion before the
//! symlink queue starts. A failure on one item is printed, logged and
//! counted, and the queue moves on to the next item. Orphans are carried in
//! the result so the caller can list them after its summary.

use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs;
use crate::plan::SyncPlan;
use crate::tree::display_relative;

/// Options for the materialize operation
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOptions {
    /// Show what would be done without making changes
    pub dry_run: bool,
    /// Show detailed output
    pub verbose: bool,
}

/// Which phase an item failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Copy,
    Symlink,
}

/// A single item that could not be materialized
#[derive(Debug)]
pub struct MaterializeFailure {
    pub phase: Phase,
    pub path: PathBuf,
    pub error: io::Error,
}

/// Result of a materialize operation
///
/// Under dry-run, `copied` and `linked` count planned operations; nothing
/// was written.
#[derive(Debug, Default)]
pub struct SyncResult {
    pub dry_run: bool,
    pub copied: usize,
    pub linked: usize,
    pub ignored: usize,
    pub failed: usize,
    pub failures: Vec<MaterializeFailure>,
    /// Destination-only files with a tracked extension, sorted
    pub orphans: Vec<PathBuf>,
}

/// Materializes source-only files under the destination root
#[derive(Debug, Clone)]
pub struct Materializer {
    source_root: PathBuf,
    destination_root: PathBuf,
}

impl Materializer {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
        }
    }

    /// Perform the copy phase, then the symlink phase.
    pub async fn apply(&self, plan: &SyncPlan, options: &SyncOptions) -> SyncResult {
        let mut result = SyncResult {
            dry_run: options.dry_run,
            ignored: plan.ignored.len(),
            orphans: plan.orphans.clone(),
            ..Default::default()
        };

        if options.dry_run {
            println!("{}", "Running in dry-run mode\n".cyan());
        }

        if options.verbose {
            for path in &plan.ignored {
                println!("  {} Ignored: {}", "○".dimmed(), display_relative(path));
            }
        }

        for path in &plan.copy {
            match self.copy(path, options).await {
                Ok(()) => result.copied += 1,
                Err(error) => self.record_failure(&mut result, Phase::Copy, path, error),
            }
        }

        for path in &plan.symlink {
            match self.link(path, options).await {
                Ok(()) => result.linked += 1,
                Err(error) => self.record_failure(&mut result, Phase::Symlink, path, error),
            }
        }

        result
    }

    async fn copy(&self, relative: &Path, options: &SyncOptions) -> io::Result<()> {
        let src = self.source_root.join(relative);
        let dst = self.destination_root.join(relative);

        if options.dry_run {
            println!("  {} Would copy: {}", "→".cyan(), display_relative(relative));
            return Ok(());
        }

        let bytes = fs::copy_file(&src, &dst).await?;
        tracing::debug!(src = %src.display(), dst = %dst.display(), bytes, "Copied file");
        println!("  {} Copy: {}", "✔".green(), display_relative(relative));
        Ok(())
    }

    async fn link(&self, relative: &Path, options: &SyncOptions) -> io::Result<()> {
        let src = self.source_root.join(relative);
        let dst = self.destination_root.join(relative);

        if options.dry_run {
            println!(
                "  {} Would link: {} -> {}",
                "→".cyan(),
                display_relative(relative),
                src.display()
            );
            return Ok(());
        }

        fs::create_symlink(&src, &dst).await?;
        tracing::debug!(src = %src.display(), dst = %dst.display(), "Created symlink");
        println!(
            "  {} Symlink: {} -> {}",
            "✔".green(),
            display_relative(relative),
            src.display()
        );
        Ok(())
    }

    fn record_failure(
        &self,
        result: &mut SyncResult,
        phase: Phase,
        relative: &Path,
        error: io::Error,
    ) {
        let shown = display_relative(relative);
        match phase {
            Phase::Copy => {
                eprintln!(
                    "  {} Could not copy file: {}, Reason: {}",
                    "✘".red(),
                    shown,
                    error
                );
            }
            Phase::Symlink => {
                eprintln!("  {} Could not create link: {}, {}", "✘".red(), shown, error);
            }
        }
        tracing::warn!(
            path = %shown,
            phase = ?phase,
            error = %error,
            "Failed to materialize file"
        );

        result.failed += 1;
        result.failures.push(MaterializeFailure {
            phase,
            path: relative.to_path_buf(),
            error,
        });
    }
}

/// List destination-only files that no longer exist at the source.
pub fn report_orphans(orphans: &[PathBuf]) {
    if orphans.is_empty() {
        return;
    }

    println!(
        "\n{}",
        "The following files don't exist at the source anymore:".yellow()
    );
    for path in orphans {
        println!("  {} {}", "!".yellow(), display_relative(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ExtensionTable;
    use crate::walker::build_trees;
    use std::fs as std_fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        source: PathBuf,
        destination: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let destination = temp_dir.path().join("destination");
        std_fs::create_dir_all(&source).unwrap();
        std_fs::create_dir_all(&destination).unwrap();
        Fixture {
            _temp_dir: temp_dir,
            source,
            destination,
        }
    }

    fn table(copy: &[&str], symlink: &[&str]) -> ExtensionTable {
        ExtensionTable::new(
            copy.iter().map(|s| s.to_string()),
            symlink.iter().map(|s| s.to_string()),
        )
    }

    async fn run(
        fx: &Fixture,
        table: &ExtensionTable,
        options: SyncOptions,
    ) -> (SyncPlan, SyncResult) {
        let (source, destination) = build_trees(&fx.source, &fx.destination).await.unwrap();
        let plan = SyncPlan::build(&source, &destination, table);
        let result = Materializer::new(&fx.source, &fx.destination)
            .apply(&plan, &options)
            .await;
        (plan, result)
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_copy_link_and_ignore_by_extension() {
        let fx = fixture();
        std_fs::write(fx.source.join("a.txt"), "text").unwrap();
        std_fs::write(fx.source.join("b.png"), "image").unwrap();
        std_fs::write(fx.source.join("c.md"), "notes").unwrap();

        let (_, result) = run(&fx, &table(&["txt"], &["png"]), SyncOptions::default()).await;

        assert_eq!(result.copied, 1);
        assert_eq!(result.linked, 1);
        assert_eq!(result.ignored, 1);
        assert_eq!(result.failed, 0);

        let copied = fx.destination.join("a.txt");
        assert!(!copied.is_symlink());
        assert_eq!(std_fs::read_to_string(&copied).unwrap(), "text");

        let linked = fx.destination.join("b.png");
        assert!(linked.is_symlink());
        assert_eq!(std_fs::read_link(&linked).unwrap(), fx.source.join("b.png"));

        assert!(!fx.destination.join("c.md").exists());
    }

    #[tokio::test]
    async fn test_creates_intermediate_directories() {
        let fx = fixture();
        std_fs::create_dir_all(fx.source.join("sub/dir")).unwrap();
        std_fs::write(fx.source.join("sub/dir/file.txt"), "deep").unwrap();

        let (_, result) = run(&fx, &table(&["txt"], &[]), SyncOptions::default()).await;

        assert_eq!(result.copied, 1);
        assert_eq!(
            std_fs::read_to_string(fx.destination.join("sub/dir/file.txt")).unwrap(),
            "deep"
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_second_run_is_idempotent() {
        let fx = fixture();
        std_fs::write(fx.source.join("a.txt"), "text").unwrap();
        std_fs::write(fx.source.join("b.png"), "image").unwrap();
        let table = table(&["txt"], &["png"]);

        let (_, first) = run(&fx, &table, SyncOptions::default()).await;
        assert_eq!(first.copied + first.linked, 2);

        let (plan, second) = run(&fx, &table, SyncOptions::default()).await;
        assert!(plan.is_empty());
        assert_eq!(second.copied, 0);
        assert_eq!(second.linked, 0);
        assert_eq!(second.failed, 0);
        assert!(second.orphans.is_empty());
    }

    #[tokio::test]
    async fn test_orphans_are_reported_not_deleted() {
        let fx = fixture();
        std_fs::write(fx.destination.join("old.txt"), "stale").unwrap();
        std_fs::write(fx.destination.join("untracked.md"), "kept").unwrap();
        let table = table(&["txt"], &[]);

        for _ in 0..2 {
            let (plan, result) = run(&fx, &table, SyncOptions::default()).await;
            assert_eq!(plan.orphans, vec![PathBuf::from("old.txt")]);
            assert_eq!(result.orphans, vec![PathBuf::from("old.txt")]);
            assert!(fx.destination.join("old.txt").exists());
            assert!(fx.destination.join("untracked.md").exists());
        }
    }

    #[tokio::test]
    async fn test_failed_copy_does_not_abort_queue() {
        let fx = fixture();
        for name in ["a.txt", "b.txt", "c.txt"] {
            std_fs::write(fx.source.join(name), name).unwrap();
        }
        // An empty directory holds the spot `b.txt` would be copied to.
        std_fs::create_dir_all(fx.destination.join("b.txt")).unwrap();

        let (_, result) = run(&fx, &table(&["txt"], &[]), SyncOptions::default()).await;

        assert_eq!(result.copied, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failures[0].phase, Phase::Copy);
        assert_eq!(result.failures[0].path, PathBuf::from("b.txt"));
        assert_eq!(
            std_fs::read_to_string(fx.destination.join("a.txt")).unwrap(),
            "a.txt"
        );
        assert_eq!(
            std_fs::read_to_string(fx.destination.join("c.txt")).unwrap(),
            "c.txt"
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_failed_copy_does_not_block_symlink_phase() {
        let fx = fixture();
        std_fs::write(fx.source.join("a.txt"), "text").unwrap();
        std_fs::write(fx.source.join("b.png"), "image").unwrap();
        std_fs::create_dir_all(fx.destination.join("a.txt")).unwrap();

        let (_, result) = run(&fx, &table(&["txt"], &["png"]), SyncOptions::default()).await;

        assert_eq!(result.failed, 1);
        assert_eq!(result.linked, 1);
        assert!(fx.destination.join("b.png").is_symlink());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_failed_link_does_not_abort_queue() {
        let fx = fixture();
        for name in ["a.png", "b.png", "c.png"] {
            std_fs::write(fx.source.join(name), name).unwrap();
        }
        // An empty directory already occupies the link path for `b.png`.
        std_fs::create_dir_all(fx.destination.join("b.png")).unwrap();

        let (_, result) = run(&fx, &table(&[], &["png"]), SyncOptions::default()).await;

        assert_eq!(result.linked, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failures[0].phase, Phase::Symlink);
        assert_eq!(result.failures[0].path, PathBuf::from("b.png"));
        assert!(fx.destination.join("a.png").is_symlink());
        assert!(fx.destination.join("c.png").is_symlink());
        assert!(fx.destination.join("b.png").is_dir());
    }

    #[tokio::test]
    async fn test_dry_run_does_not_touch_destination() {
        let fx = fixture();
        std_fs::create_dir_all(fx.source.join("sub")).unwrap();
        std_fs::write(fx.source.join("sub/a.txt"), "text").unwrap();
        std_fs::write(fx.source.join("b.png"), "image").unwrap();

        let options = SyncOptions {
            dry_run: true,
            ..Default::default()
        };
        let (_, result) = run(&fx, &table(&["txt"], &["png"]), options).await;

        assert!(result.dry_run);
        assert_eq!(result.copied, 1);
        assert_eq!(result.linked, 1);
        assert!(std_fs::read_dir(&fx.destination).unwrap().next().is_none());
    }

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();
        assert!(!options.dry_run);
        assert!(!options.verbose);
    }

    #[test]
    fn test_sync_result_default() {
        let result = SyncResult::default();
        assert!(!result.dry_run);
        assert_eq!(result.copied, 0);
        assert_eq!(result.linked, 0);
        assert_eq!(result.failed, 0);
        assert!(result.failures.is_empty());
        assert!(result.orphans.is_empty());
    }
}

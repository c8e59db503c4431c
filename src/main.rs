//! Treelink CLI
//!
//! Command-line interface for mirroring a source tree into a destination tree.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use treelink::materializer::report_orphans;
use treelink::{Config, SyncOptions, SyncResult};

#[derive(Parser)]
#[command(name = "treelink")]
#[command(
    author,
    version,
    about = "Copy or symlink files missing from a destination tree, chosen by extension"
)]
struct Cli {
    /// Path to configuration file (default: ./config.json)
    config: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    if cli.verbose {
        println!(
            "Using config: {}\n",
            config_path.display().to_string().dimmed()
        );
    }

    let config = Config::load(&config_path)?;

    println!("{}", "➤ Syncing trees".cyan().bold());
    let options = SyncOptions {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };
    let result = treelink::sync(&config, &options).await?;

    print_summary(&result);
    report_orphans(&result.orphans);
    println!("\n{}", "Done.".green().bold());

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "treelink=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(result: &SyncResult) {
    let errors = if result.failed > 0 {
        result.failed.to_string().red()
    } else {
        result.failed.to_string().dimmed()
    };
    let orphaned = if result.orphans.is_empty() {
        result.orphans.len().to_string().dimmed()
    } else {
        result.orphans.len().to_string().yellow()
    };

    if result.dry_run {
        println!(
            "\n  Planned (dry run) - Would copy: {}, Would link: {}, Ignored: {}, Orphaned: {}",
            result.copied.to_string().cyan(),
            result.linked.to_string().cyan(),
            result.ignored.to_string().dimmed(),
            orphaned
        );
    } else {
        println!(
            "\n  Copied: {}, Linked: {}, Ignored: {}, Errors: {}, Orphaned: {}",
            result.copied.to_string().green(),
            result.linked.to_string().green(),
            result.ignored.to_string().dimmed(),
            errors,
            orphaned
        );
    }
}

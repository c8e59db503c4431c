//! Treelink - Extension-driven tree mirroring
//!
//! Finds files that exist under a source tree but not under a destination
//! tree and materializes them there, either as full copies or as symbolic
//! links back to the source, depending on their extension. Files that only
//! exist in the destination are reported, never deleted.

pub mod classify;
pub mod config;
pub mod fs;
pub mod materializer;
pub mod plan;
pub mod sync;
pub mod tree;
pub mod walker;

pub use classify::{Action, ExtensionTable};
pub use config::Config;
pub use materializer::{Materializer, SyncOptions, SyncResult};
pub use plan::SyncPlan;
pub use sync::sync;
pub use tree::FileTree;

//! Root-relative file sets and the set differences between them.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Every file under `root`, keyed by its path relative to `root`.
///
/// Relative paths are stored component-wise, so `a/b` and `a//b` are the
/// same entry. Iteration is sorted, which keeps logs reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTree {
    root: PathBuf,
    paths: BTreeSet<PathBuf>,
}

impl FileTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: BTreeSet::new(),
        }
    }

    /// Build a tree from absolute paths produced by walking `root`.
    ///
    /// Paths outside of `root` are dropped.
    pub fn from_absolute<I>(root: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut tree = Self::new(root);
        for file in files {
            if let Ok(relative) = file.strip_prefix(&tree.root) {
                tree.insert(relative.to_path_buf());
            }
        }
        tree
    }

    pub fn insert(&mut self, relative: impl Into<PathBuf>) -> bool {
        self.paths.insert(relative.into())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.paths.contains(relative)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Relative paths present in `self` but not in `other`, sorted
    pub fn difference<'a>(&'a self, other: &'a FileTree) -> impl Iterator<Item = &'a Path> {
        self.paths.difference(&other.paths).map(PathBuf::as_path)
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn display_relative(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

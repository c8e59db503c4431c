//! Extension-based classification of source-only files.

use std::collections::HashSet;
use std::path::Path;

/// What to do with a file that exists only in the source tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Duplicate the file content into the destination
    Copy,
    /// Link the destination path to the absolute source path
    Symlink,
    /// Leave the file alone and do not report it
    Ignore,
}

/// The `copy` and `symlink` extension lists of a configuration.
///
/// The two lists are not required to be disjoint. An extension present in
/// both is classified as [`Action::Copy`], since the copy phase runs first.
#[derive(Debug, Clone, Default)]
pub struct ExtensionTable {
    copy: HashSet<String>,
    symlink: HashSet<String>,
}

impl ExtensionTable {
    pub fn new(
        copy: impl IntoIterator<Item = String>,
        symlink: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            copy: copy.into_iter().collect(),
            symlink: symlink.into_iter().collect(),
        }
    }

    pub fn classify(&self, path: &Path) -> Action {
        let Some(ext) = extension(path) else {
            return Action::Ignore;
        };
        if self.copy.contains(ext) {
            Action::Copy
        } else if self.symlink.contains(ext) {
            Action::Symlink
        } else {
            Action::Ignore
        }
    }

    /// Whether the path's extension appears in either list
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.classify(path) != Action::Ignore
    }
}

/// Case-sensitive extension of a path: everything after the last `.` of the
/// file name, or the whole file name when it has no `.`.
///
/// `README` yields `README`, `.bashrc` yields `bashrc` and `archive.` yields
/// an empty string. Paths without a file name or with a non UTF-8 file name
/// have no extension and are never classified for copy or symlink.
pub fn extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    match name.rfind('.') {
        Some(pos) => Some(&name[pos + 1..]),
        None => Some(name),
    }
}

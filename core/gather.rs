//! Filtered traversal of a project root.
//!
//! [`ProjectWalk`] is the one walk every operation goes through. It yields the
//! surviving entries of the root in sorted pre-order and applies all pruning:
//! symlinks are never yielded or followed, every entry is resolved against the
//! root before use, and an entry whose relative path matches the ignore set is
//! dropped together with its whole subtree. Consumers either flatten it
//! ([`SourceFiles`]) or fold it into a [`TreeNode`] hierarchy ([`build_tree`]).

use crate::error::{AppError, Result};
use crate::paths::{relative_to_resolved_root, to_posix};
use crate::patterns::IgnoreMatcher;
use log;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Sockets, FIFOs and other special files. Listed but never read.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub kind: EntryKind,
    pub depth: usize,
}

pub struct ProjectWalk<'a> {
    root: PathBuf,
    matcher: &'a IgnoreMatcher,
    excluded: Vec<PathBuf>,
    inner: walkdir::IntoIter,
}

impl<'a> ProjectWalk<'a> {
    pub fn new(root: &Path, matcher: &'a IgnoreMatcher) -> Result<Self> {
        let root = resolve_root(root)?;
        let inner = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        log::debug!("Walking project directory: {}", root.display());
        Ok(Self {
            root,
            matcher,
            excluded: Vec::new(),
            inner,
        })
    }

    /// Leaves out one concrete path (and anything below it), such as the
    /// file or directory the caller is writing into.
    pub fn excluding(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            log::trace!("Excluding output path from walk: {}", path.display());
            self.excluded.push(path);
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prune(&mut self, is_dir: bool) {
        if is_dir {
            self.inner.skip_current_dir();
        }
    }
}

impl Iterator for ProjectWalk<'_> {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable path during walk: {}", e);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            if entry.path_is_symlink() {
                log::trace!("Skipping symlink: {}", path.display());
                continue;
            }

            let file_type = entry.file_type();
            let is_dir = file_type.is_dir();

            if self.excluded.iter().any(|ex| path == ex.as_path()) {
                self.prune(is_dir);
                continue;
            }

            let relative_path = match relative_to_resolved_root(&self.root, path) {
                Ok(rel) => rel,
                Err(e) => {
                    log::debug!("Dropping entry outside project root: {}", e);
                    self.prune(is_dir);
                    continue;
                }
            };

            if self.matcher.matches(&relative_path) {
                log::trace!("Ignored: {}", to_posix(&relative_path));
                self.prune(is_dir);
                continue;
            }

            let kind = if is_dir {
                EntryKind::Dir
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            log::trace!("Walked path: {}", to_posix(&relative_path));
            return Some(WalkEntry {
                path: path.to_path_buf(),
                relative_path,
                kind,
                depth: entry.depth(),
            });
        }
    }
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(AppError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(AppError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    root.canonicalize().map_err(|e| AppError::FileRead {
        path: root.to_path_buf(),
        source: e,
    })
}

/// Lower-cased extensions a flat walk keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    Any,
    Only(BTreeSet<String>),
}

impl ExtensionFilter {
    /// Accepts `.py` and `py` alike.
    pub fn only<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExtensionFilter::Only(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            ExtensionFilter::Any => true,
            ExtensionFilter::Only(set) => path
                .extension()
                .map(|ext| set.contains(&ext.to_string_lossy().to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// A surviving regular file from a flat walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_dir: PathBuf,
    pub path: PathBuf,
    pub relative_path: PathBuf,
}

impl FileRecord {
    /// First directory segment below the root, if the file is not at the top level.
    pub fn app_name(&self) -> Option<String> {
        match self.relative_dir.components().next() {
            Some(Component::Normal(name)) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

/// Regular files of a [`ProjectWalk`] whose extension passes the filter.
pub struct SourceFiles<'a> {
    walk: ProjectWalk<'a>,
    extensions: ExtensionFilter,
}

impl<'a> SourceFiles<'a> {
    pub fn new(walk: ProjectWalk<'a>, extensions: ExtensionFilter) -> Self {
        Self { walk, extensions }
    }
}

impl Iterator for SourceFiles<'_> {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        for entry in self.walk.by_ref() {
            if entry.kind != EntryKind::File || !self.extensions.accepts(&entry.path) {
                continue;
            }
            let relative_dir = entry
                .relative_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            return Some(FileRecord {
                relative_dir,
                path: entry.path,
                relative_path: entry.relative_path,
            });
        }
        None
    }
}

/// Convenience wrapper: the flat, extension-filtered file sequence of `root`.
pub fn iter_source_files<'a>(
    root: &Path,
    extensions: ExtensionFilter,
    matcher: &'a IgnoreMatcher,
) -> Result<SourceFiles<'a>> {
    Ok(SourceFiles::new(ProjectWalk::new(root, matcher)?, extensions))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: EntryKind,
    pub path: PathBuf,
    pub children: Vec<TreeNode>,
}

/// Folds a walk into a sorted node hierarchy.
pub fn build_tree(walk: ProjectWalk<'_>) -> Vec<TreeNode> {
    let mut root_nodes: Vec<TreeNode> = Vec::new();
    let mut count = 0usize;
    for entry in walk {
        let components: Vec<String> = entry
            .relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if components.is_empty() {
            continue;
        }
        insert_node(&mut root_nodes, &components, &entry);
        count += 1;
    }
    log::debug!("Tree structure built from {} entries.", count);
    root_nodes
}

fn insert_node(level: &mut Vec<TreeNode>, components: &[String], entry: &WalkEntry) {
    let Some((name, rest)) = components.split_first() else {
        return;
    };

    match level.binary_search_by(|node| node.name.as_str().cmp(name)) {
        Ok(index) => {
            if !rest.is_empty() {
                insert_node(&mut level[index].children, rest, entry);
            }
        }
        Err(insertion_point) => {
            if rest.is_empty() {
                level.insert(
                    insertion_point,
                    TreeNode {
                        name: name.clone(),
                        kind: entry.kind,
                        path: entry.path.clone(),
                        children: Vec::new(),
                    },
                );
            } else {
                // Pre-order walks always deliver the parent first.
                log::warn!(
                    "Tree parent '{}' missing for {}; entry dropped",
                    name,
                    entry.path.display()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_is_case_insensitive() {
        let filter = ExtensionFilter::only([".PY", "js"]);
        assert!(filter.accepts(Path::new("a/b.py")));
        assert!(filter.accepts(Path::new("a/B.Py")));
        assert!(filter.accepts(Path::new("app.JS")));
        assert!(!filter.accepts(Path::new("style.css")));
        assert!(!filter.accepts(Path::new(".py")));
        assert!(filter.accepts(Path::new(".hidden.py")));
        assert!(ExtensionFilter::Any.accepts(Path::new("Makefile")));
    }

    #[test]
    fn app_name_is_first_segment() {
        let record = FileRecord {
            relative_dir: PathBuf::from("backend/api"),
            path: PathBuf::from("/p/backend/api/x.py"),
            relative_path: PathBuf::from("backend/api/x.py"),
        };
        assert_eq!(record.app_name().as_deref(), Some("backend"));

        let top = FileRecord {
            relative_dir: PathBuf::new(),
            path: PathBuf::from("/p/x.py"),
            relative_path: PathBuf::from("x.py"),
        };
        assert_eq!(top.app_name(), None);
    }
}

use crate::error::{AppError, Result};
use crate::gather::{EntryKind, ProjectWalk, TreeNode, build_tree};
use crate::paths::to_posix;
use crate::patterns::IgnoreMatcher;
use log;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

pub const DEFAULT_MAX_BYTES: i64 = 4096;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Inline the head of each file under its entry.
    pub include_content: bool,
    /// Bytes of each file to inline. Negative values are rejected.
    pub max_bytes: i64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            include_content: true,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl TreeOptions {
    fn content_budget(&self) -> Result<u64> {
        u64::try_from(self.max_bytes).map_err(|_| {
            AppError::Validation(format!(
                "Invalid argument: max_bytes must be non-negative, got {}",
                self.max_bytes
            ))
        })
    }
}

/// Writes a filtered tree of `project_root` to `output_path` and returns the
/// number of entries rendered.
///
/// The first line is the resolved root in forward-slash form; every surviving
/// entry follows with `├── ` / `└── ` connectors, where "last" is decided
/// among the entries that survived filtering.
pub fn create_filtered_tree(
    project_root: &Path,
    output_path: &Path,
    matcher: &IgnoreMatcher,
    options: &TreeOptions,
) -> Result<usize> {
    let budget = options.content_budget()?;

    let walk = ProjectWalk::new(project_root, matcher)?.excluding(output_path.canonicalize().ok());
    let root_resolved = walk.root().to_path_buf();
    let nodes = build_tree(walk);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let file = File::create(output_path).map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    let content_budget = options.include_content.then_some(budget);

    let written = write_tree(&mut writer, &root_resolved, &nodes, content_budget).map_err(|e| {
        AppError::FileWrite {
            path: output_path.to_path_buf(),
            source: e,
        }
    })?;

    log::info!(
        "Filtered tree with {} entries written to {}",
        written,
        output_path.display()
    );
    Ok(written)
}

fn write_tree<W: Write>(
    out: &mut W,
    root: &Path,
    nodes: &[TreeNode],
    content_budget: Option<u64>,
) -> std::io::Result<usize> {
    writeln!(out, "{}", to_posix(root))?;
    let count = render_nodes(out, nodes, "", content_budget)?;
    out.flush()?;
    Ok(count)
}

/// Renders `nodes` (siblings, already sorted) below `prefix`.
pub fn render_nodes<W: Write>(
    out: &mut W,
    nodes: &[TreeNode],
    prefix: &str,
    content_budget: Option<u64>,
) -> std::io::Result<usize> {
    let mut count = 0;
    for (index, node) in nodes.iter().enumerate() {
        let is_last = index + 1 == nodes.len();
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        writeln!(out, "{}{}{}", prefix, connector, node.name)?;
        count += 1;

        match node.kind {
            EntryKind::Dir => {
                let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
                count += render_nodes(out, &node.children, &child_prefix, content_budget)?;
            }
            EntryKind::File => {
                if let Some(budget) = content_budget {
                    if let Some(head) = read_head(&node.path, budget) {
                        for line in head.lines() {
                            writeln!(out, "{}{}{}", prefix, PIPE, line)?;
                        }
                    }
                }
            }
            EntryKind::Other => {}
        }
    }
    Ok(count)
}

/// At most `budget` bytes of `path` as text. A multi-byte character cut by the
/// budget is dropped; content that is not UTF-8 is skipped with a warning.
fn read_head(path: &Path, budget: u64) -> Option<String> {
    if budget == 0 {
        return None;
    }
    let mut bytes = Vec::new();
    let read = File::open(path).and_then(|file| file.take(budget).read_to_end(&mut bytes));
    if let Err(e) = read {
        log::warn!("Skipping content of unreadable file {}: {}", path.display(), e);
        return None;
    }
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            let utf8 = e.utf8_error();
            if utf8.error_len().is_none() {
                let mut bytes = e.into_bytes();
                bytes.truncate(utf8.valid_up_to());
                String::from_utf8(bytes).ok()
            } else {
                log::warn!("Skipping content of non-UTF-8 file {}: {}", path.display(), utf8);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(name: &str) -> TreeNode {
        TreeNode {
            name: name.to_string(),
            kind: EntryKind::File,
            path: PathBuf::from(name),
            children: Vec::new(),
        }
    }

    fn dir(name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            name: name.to_string(),
            kind: EntryKind::Dir,
            path: PathBuf::from(name),
            children,
        }
    }

    #[test]
    fn connectors_follow_sibling_position() {
        let nodes = vec![
            dir("app", vec![file("a.py"), file("b.py")]),
            dir("lib", vec![file("c.py")]),
            file("z.txt"),
        ];
        let mut out = Vec::new();
        let count = render_nodes(&mut out, &nodes, "", None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(count, 6);
        assert_eq!(
            text,
            "├── app\n\
             │   ├── a.py\n\
             │   └── b.py\n\
             ├── lib\n\
             │   └── c.py\n\
             └── z.txt\n"
        );
    }

    #[test]
    fn negative_budget_is_rejected() {
        let options = TreeOptions {
            include_content: true,
            max_bytes: -1,
        };
        assert!(matches!(
            options.content_budget().unwrap_err(),
            AppError::Validation(_)
        ));
        assert_eq!(TreeOptions::default().content_budget().unwrap(), 4096);
    }

    #[test]
    fn head_drops_split_character() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u.txt");
        fs::write(&path, "aé").unwrap();
        assert_eq!(read_head(&path, 2).as_deref(), Some("a"));
        assert_eq!(read_head(&path, 3).as_deref(), Some("aé"));
        assert_eq!(read_head(&path, 0), None);

        let binary = dir.path().join("b.bin");
        fs::write(&binary, [0xff, 0xfe, 0x00, 0x41]).unwrap();
        assert_eq!(read_head(&binary, 16), None);
    }
}

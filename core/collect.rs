//! Writers that turn a flat walk into log files: one per app, one for the
//! whole tree, or one per file-name group.

use crate::error::{AppError, Result};
use crate::gather::{ExtensionFilter, FileRecord, ProjectWalk, SourceFiles};
use crate::paths::to_posix;
use crate::patterns::IgnoreMatcher;
use crate::rules::FileGroupResolver;
use log;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Group name for files sitting directly in the project root.
pub const ROOT_GROUP: &str = "root";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub files_written: usize,
    pub files_skipped: usize,
    /// Output groups in the order they were first opened.
    pub groups: Vec<String>,
}

/// Lazily opened `<dir>/<group>.txt` sinks, each headed by `# <group>`.
struct GroupSinks {
    dir: PathBuf,
    sinks: BTreeMap<String, (PathBuf, BufWriter<File>)>,
    opened: Vec<String>,
}

impl GroupSinks {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            sinks: BTreeMap::new(),
            opened: Vec::new(),
        }
    }

    fn get(&mut self, group: &str) -> Result<&mut (PathBuf, BufWriter<File>)> {
        if !self.sinks.contains_key(group) {
            let path = self.dir.join(format!("{}.txt", group.replace(['/', '\\'], "_")));
            let file = File::create(&path).map_err(|e| AppError::FileWrite {
                path: path.clone(),
                source: e,
            })?;
            let mut writer = BufWriter::new(file);
            write!(writer, "# {}\n\n", group).map_err(|e| AppError::FileWrite {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Opened group log: {}", path.display());
            self.opened.push(group.to_string());
            self.sinks.insert(group.to_string(), (path, writer));
        }
        self.sinks
            .get_mut(group)
            .ok_or_else(|| AppError::InvalidArgument(format!("Unknown log group '{}'", group)))
    }

    fn finish(self) -> Result<Vec<String>> {
        for (_, (path, mut writer)) in self.sinks {
            writer
                .flush()
                .map_err(|e| AppError::FileWrite { path, source: e })?;
        }
        Ok(self.opened)
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| AppError::DirCreation {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// UTF-8 content of `path`, or `None` after logging why it was skipped.
fn read_text(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Skipping unreadable file {}: {}", path.display(), e);
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(content) => Some(content),
        Err(e) => {
            log::warn!("Skipping non-UTF-8 file {}: {}", path.display(), e);
            None
        }
    }
}

fn write_entry<W: Write>(out: &mut W, out_path: &Path, record: &FileRecord, content: &str) -> Result<()> {
    write!(out, "# {}\n{}\n\n", to_posix(&record.relative_path), content).map_err(|e| {
        AppError::FileWrite {
            path: out_path.to_path_buf(),
            source: e,
        }
    })
}

/// Writes every matching file into `<log_dir>/<app>.txt`, where `app` is the
/// file's first directory below the root.
pub fn collect_app_logs(
    project_root: &Path,
    log_dir: &Path,
    extensions: &ExtensionFilter,
    matcher: &IgnoreMatcher,
) -> Result<Summary> {
    let walk = ProjectWalk::new(project_root, matcher)?;
    create_dir(log_dir)?;
    let walk = walk.excluding(log_dir.canonicalize().ok());
    let mut sinks = GroupSinks::new(log_dir);
    let mut summary = Summary::default();

    for record in SourceFiles::new(walk, extensions.clone()) {
        let app = record.app_name().unwrap_or_else(|| ROOT_GROUP.to_string());
        let (path, writer) = sinks.get(&app)?;
        let Some(content) = read_text(&record.path) else {
            summary.files_skipped += 1;
            continue;
        };
        write_entry(writer, path, &record, &content)?;
        summary.files_written += 1;
    }

    summary.groups = sinks.finish()?;
    log::info!(
        "Collected {} files into {} app logs under {}",
        summary.files_written,
        summary.groups.len(),
        log_dir.display()
    );
    Ok(summary)
}

/// Writes every matching file, in walk order, into the single `output_path`.
pub fn consolidate_files(
    project_root: &Path,
    output_path: &Path,
    extensions: &ExtensionFilter,
    matcher: &IgnoreMatcher,
) -> Result<Summary> {
    let walk = ProjectWalk::new(project_root, matcher)?;
    if let Some(parent) = output_path.parent() {
        create_dir(parent)?;
    }
    let file = File::create(output_path).map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    let walk = walk.excluding(output_path.canonicalize().ok());
    let mut summary = Summary::default();

    for record in SourceFiles::new(walk, extensions.clone()) {
        let Some(content) = read_text(&record.path) else {
            summary.files_skipped += 1;
            continue;
        };
        write_entry(&mut writer, output_path, &record, &content)?;
        summary.files_written += 1;
    }

    writer.flush().map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    log::info!(
        "Consolidated {} files into {}",
        summary.files_written,
        output_path.display()
    );
    Ok(summary)
}

/// Writes every file whose name resolves to a group label into
/// `<out_dir>/<label>.txt`; a file with several labels lands in each.
pub fn collect_by_group(
    project_root: &Path,
    out_dir: &Path,
    resolver: &FileGroupResolver,
    matcher: &IgnoreMatcher,
) -> Result<Summary> {
    let walk = ProjectWalk::new(project_root, matcher)?;
    create_dir(out_dir)?;
    let walk = walk.excluding(out_dir.canonicalize().ok());
    let mut sinks = GroupSinks::new(out_dir);
    let mut summary = Summary::default();

    for record in SourceFiles::new(walk, ExtensionFilter::Any) {
        let file_name = record
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let labels = resolver.resolve(&file_name);
        if labels.is_empty() {
            continue;
        }
        let Some(content) = read_text(&record.path) else {
            summary.files_skipped += 1;
            continue;
        };
        for label in &labels {
            let (path, writer) = sinks.get(label)?;
            write_entry(writer, path, &record, &content)?;
        }
        summary.files_written += 1;
    }

    summary.groups = sinks.finish()?;
    log::info!(
        "Grouped {} files into {} logs under {}",
        summary.files_written,
        summary.groups.len(),
        out_dir.display()
    );
    Ok(summary)
}

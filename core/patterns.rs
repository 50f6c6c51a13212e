//! Ignore patterns: compiling them into a matcher and assembling the
//! per-invocation pattern set from defaults, skip directories, user input and
//! the project's `.gitignore`.

use crate::error::{AppError, Result};
use crate::paths::to_posix;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const GITIGNORE_FILENAME: &str = ".gitignore";

/// Build, VCS and cache artifacts that are never worth logging.
pub const BASE_IGNORE_PATTERNS: &[&str] = &[
    "*.pyc",
    "__pycache__/",
    ".DS_Store",
    "*.sqlite3",
    "db.sqlite3",
    "/staticfiles/",
    "/media/",
    "error.dev.log",
    "error.base.log",
    "error.test.log",
    "error.prod.log",
    "logs",
    "logs/",
    "static/",
    "staticfiles/",
    "migrations/",
    "migrations",
    "node_modules/",
    "yarn-error.log",
    "yarn-debug.log",
    "yarn.lock",
    "package-lock.json",
    "package.json",
    ".git",
    ".git/",
];

pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    ".git",
    ".venv",
    "__pycache__",
    "build",
    "dist",
    "env",
    "envs",
    "media",
    "migrations",
    "node_modules",
    "static",
    "staticfiles",
    "venv",
];

pub const DEFAULT_USER_IGNORE_PATTERNS: &[&str] = &["*.log", "*.tmp", "*.swp"];

/// A deduplicated, sorted collection of glob strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: BTreeSet<String>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pattern: impl Into<String>) -> bool {
        self.patterns.insert(pattern.into())
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.patterns.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for PatternSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.patterns.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

/// Tests forward-slash relative paths against a compiled set of globs.
///
/// Every pattern is anchored at both ends and `*` crosses `/`, so `*/build/*`
/// matches at any depth while `node_modules` only matches that exact path.
/// Trailing-slash patterns are compared literally. Candidates never end in
/// `/`, so `__pycache__/` on its own excludes nothing.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = match compile_glob(pattern) {
                Ok(glob) => glob,
                Err(e) => {
                    // Unbalanced classes and the like fall back to a literal match.
                    log::debug!("Treating ignore pattern \"{}\" literally: {}", pattern, e);
                    compile_glob(&globset::escape(pattern))?
                }
            };
            log::trace!("Adding ignore pattern: {}", pattern);
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        let set = builder.build().map_err(|e| {
            log::error!("Error building ignore glob set: {}", e);
            AppError::Glob(e.to_string())
        })?;
        Ok(Self {
            patterns: kept,
            set,
        })
    }

    /// Returns true iff the whole candidate matches at least one pattern.
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        let candidate = to_posix(path.as_ref());
        self.set.is_match(candidate.as_str())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn compile_glob(pattern: &str) -> std::result::Result<globset::Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .build()
}

/// Expands each skip directory into the six patterns needed to catch it at any
/// nesting depth and with any trailing content.
pub fn expand_skip_dirs<I, S>(skip_dirs: I) -> PatternSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut patterns = PatternSet::new();
    for skip_dir in skip_dirs {
        let cleaned = skip_dir.as_ref().trim_matches('/');
        if cleaned.is_empty() {
            continue;
        }
        patterns.extend([
            cleaned.to_string(),
            format!("{}/", cleaned),
            format!("*/{}", cleaned),
            format!("*/{}/", cleaned),
            format!("*/{}/*", cleaned),
            format!("{}/*", cleaned),
        ]);
    }
    patterns
}

/// Trims user-supplied patterns, drops blanks and rejects embedded line breaks.
pub fn normalise_user_patterns<I, S>(patterns: I) -> Result<PatternSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalised = PatternSet::new();
    for pattern in patterns {
        let stripped = pattern.as_ref().trim();
        if stripped.is_empty() {
            continue;
        }
        if stripped.contains(['\n', '\r']) {
            return Err(AppError::Validation(format!(
                "Ignore pattern {:?} contains a newline character",
                stripped
            )));
        }
        normalised.insert(stripped);
    }
    Ok(normalised)
}

/// Non-blank, non-comment lines of the root `.gitignore`, if one exists.
pub fn read_gitignore(root: &Path) -> Result<Vec<String>> {
    let gitignore_path = root.join(GITIGNORE_FILENAME);
    if !gitignore_path.is_file() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&gitignore_path).map_err(|e| AppError::FileRead {
        path: gitignore_path.clone(),
        source: e,
    })?;
    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    log::debug!(
        "Read {} patterns from {}",
        lines.len(),
        gitignore_path.display()
    );
    Ok(lines)
}

/// Assembles the ignore patterns for one invocation.
///
/// `None` for either list selects the built-in defaults, as does an empty
/// skip list. The root must exist and be a directory.
pub fn load_ignore_patterns(
    root: &Path,
    skip_dirs: Option<&[String]>,
    user_patterns: Option<&[String]>,
) -> Result<PatternSet> {
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

    let mut patterns: PatternSet = BASE_IGNORE_PATTERNS.iter().copied().collect();

    match skip_dirs {
        Some(dirs) if !dirs.is_empty() => patterns.extend(&expand_skip_dirs(dirs)),
        _ => patterns.extend(&expand_skip_dirs(DEFAULT_SKIP_DIRS)),
    }

    match user_patterns {
        Some(user) => patterns.extend(&normalise_user_patterns(user)?),
        None => patterns.extend(DEFAULT_USER_IGNORE_PATTERNS.iter().copied()),
    }

    patterns.extend(read_gitignore(root)?);

    log::debug!("Loaded {} ignore patterns", patterns.len());
    Ok(patterns)
}

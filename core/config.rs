use crate::error::{AppError, Result};
use crate::paths::to_posix;
use crate::patterns::{self, DEFAULT_SKIP_DIRS, DEFAULT_USER_IGNORE_PATTERNS, PatternSet};
use crate::rules::mapping::{FileKind, default_file_groups};
use indexmap::IndexMap;
use log;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".sourcelog";
pub const DEFAULT_CONFIG_FILENAME: &str = "sourcelog.json";
pub const DEFAULT_TREE_FILENAME: &str = "filtered_tree.txt";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_skip")]
    pub skip: Vec<String>,
    #[serde(default = "default_user_ignore_patterns")]
    pub user_ignore_patterns: BTreeSet<String>,
    #[serde(default = "default_file_types")]
    pub file_types: IndexMap<String, String>,
    #[serde(default)]
    pub directories: DirectoriesConfig,
    #[serde(default)]
    pub collection_logs: CollectionLogsConfig,
    #[serde(default)]
    pub single_targets: SingleTargetsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DirectoriesConfig {
    #[serde(default = "default_log_root")]
    pub log_root: String,
    #[serde(default = "default_work_dir")]
    pub work: String,
    #[serde(default = "default_tree_dir")]
    pub tree: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CollectionLogsConfig {
    #[serde(default = "default_collection_all")]
    pub all: String,
    #[serde(default = "default_collection_python")]
    pub python: String,
    #[serde(default = "default_collection_html")]
    pub html: String,
    #[serde(default = "default_collection_css")]
    pub css: String,
    #[serde(default = "default_collection_js")]
    pub js: String,
    #[serde(default = "default_collection_python_html")]
    pub python_html: String,
    #[serde(default = "default_collection_single")]
    pub single: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SingleTargetsConfig {
    #[serde(default = "default_single_python")]
    pub python: String,
    #[serde(default = "default_single_html")]
    pub html: String,
    #[serde(default = "default_single_css")]
    pub css: String,
    #[serde(default = "default_single_js")]
    pub js: String,
    #[serde(default = "default_single_python_html")]
    pub python_html: String,
    #[serde(default = "default_single_any")]
    pub any: String,
}

fn default_skip() -> Vec<String> {
    DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect()
}
fn default_file_types() -> IndexMap<String, String> {
    default_file_groups()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
fn default_user_ignore_patterns() -> BTreeSet<String> {
    DEFAULT_USER_IGNORE_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_log_root() -> String {
    "logs".to_string()
}
fn default_work_dir() -> String {
    "logs_files".to_string()
}
fn default_tree_dir() -> String {
    "logs_tree".to_string()
}
fn default_collection_all() -> String {
    "logs_apps_all".to_string()
}
fn default_collection_python() -> String {
    "logs_apps_pyth".to_string()
}
fn default_collection_html() -> String {
    "logs_apps_html".to_string()
}
fn default_collection_css() -> String {
    "logs_apps_css".to_string()
}
fn default_collection_js() -> String {
    "logs_apps_js".to_string()
}
fn default_collection_python_html() -> String {
    "logs_apps_both".to_string()
}
fn default_collection_single() -> String {
    "logs_single_files".to_string()
}
fn default_single_python() -> String {
    "capture_all_pyth.txt".to_string()
}
fn default_single_html() -> String {
    "capture_all_html.txt".to_string()
}
fn default_single_css() -> String {
    "capture_all_css.txt".to_string()
}
fn default_single_js() -> String {
    "capture_all_js.txt".to_string()
}
fn default_single_python_html() -> String {
    "capture_all_python_html.txt".to_string()
}
fn default_single_any() -> String {
    "capture_all.txt".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip: default_skip(),
            user_ignore_patterns: default_user_ignore_patterns(),
            file_types: default_file_types(),
            directories: DirectoriesConfig::default(),
            collection_logs: CollectionLogsConfig::default(),
            single_targets: SingleTargetsConfig::default(),
        }
    }
}
impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            log_root: default_log_root(),
            work: default_work_dir(),
            tree: default_tree_dir(),
        }
    }
}
impl Default for CollectionLogsConfig {
    fn default() -> Self {
        Self {
            all: default_collection_all(),
            python: default_collection_python(),
            html: default_collection_html(),
            css: default_collection_css(),
            js: default_collection_js(),
            python_html: default_collection_python_html(),
            single: default_collection_single(),
        }
    }
}
impl Default for SingleTargetsConfig {
    fn default() -> Self {
        Self {
            python: default_single_python(),
            html: default_single_html(),
            css: default_single_css(),
            js: default_single_js(),
            python_html: default_single_python_html(),
            any: default_single_any(),
        }
    }
}

impl CollectionLogsConfig {
    pub fn for_kind(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Python => &self.python,
            FileKind::Html => &self.html,
            FileKind::Css => &self.css,
            FileKind::Js => &self.js,
            FileKind::PythonHtml => &self.python_html,
            FileKind::All => &self.all,
        }
    }
}

impl SingleTargetsConfig {
    pub fn for_kind(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Python => &self.python,
            FileKind::Html => &self.html,
            FileKind::Css => &self.css,
            FileKind::Js => &self.js,
            FileKind::PythonHtml => &self.python_html,
            FileKind::All => &self.any,
        }
    }
}

/// Every output location derived from one configuration and base directory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub base_dir: PathBuf,
    pub log_dir: PathBuf,
    pub work_dir: PathBuf,
    pub tree_dir: PathBuf,
    pub single_log_dir: PathBuf,
    collection_logs: CollectionLogsConfig,
    single_targets: SingleTargetsConfig,
}

impl OutputPaths {
    pub fn collection_dir(&self, kind: FileKind) -> PathBuf {
        self.log_dir.join(self.collection_logs.for_kind(kind))
    }

    pub fn single_target(&self, kind: FileKind) -> PathBuf {
        self.single_log_dir.join(self.single_targets.for_kind(kind))
    }

    pub fn tree_file(&self) -> PathBuf {
        self.tree_dir.join(DEFAULT_TREE_FILENAME)
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&Path>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        if !path_to_resolve.exists() {
            return Err(AppError::NotFound {
                path: path_to_resolve,
            });
        }
        if !path_to_resolve.is_dir() {
            return Err(AppError::NotADirectory {
                path: path_to_resolve,
            });
        }
        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&Path>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p) => {
                let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
                let path = PathBuf::from(expanded);
                if !path.is_file() {
                    return Err(AppError::NotFound { path });
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.is_file() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    /// Reads a JSON configuration, or TOML when the file ends in `.toml`.
    /// Missing keys take their defaults.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let content = fs::read_to_string(config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound {
                    path: config_path.to_path_buf(),
                }
            } else {
                AppError::FileRead {
                    path: config_path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let is_toml = config_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed = if is_toml {
            toml::from_str::<Config>(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Config>(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| {
            AppError::ConfigParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    pub fn resolve_paths(&self, base_dir: &Path) -> OutputPaths {
        let log_dir = base_dir.join(&self.directories.log_root);
        OutputPaths {
            base_dir: base_dir.to_path_buf(),
            work_dir: log_dir.join(&self.directories.work),
            tree_dir: log_dir.join(&self.directories.tree),
            single_log_dir: log_dir.join(&self.collection_logs.single),
            log_dir,
            collection_logs: self.collection_logs.clone(),
            single_targets: self.single_targets.clone(),
        }
    }

    /// Ignore patterns for one invocation: defaults, this configuration's skip
    /// directories and user patterns, the project `.gitignore`, and, when it
    /// lies inside the root, the output directory itself.
    pub fn ignore_patterns(&self, project_root: &Path, output_dir: Option<&Path>) -> Result<PatternSet> {
        let user: Vec<String> = self.user_ignore_patterns.iter().cloned().collect();
        let mut set = patterns::load_ignore_patterns(
            project_root,
            Some(self.skip.as_slice()),
            Some(user.as_slice()),
        )?;

        if let Some(inside) = output_dir.and_then(|dir| relative_inside(project_root, dir)) {
            log::debug!("Ignoring output directory inside project: {}", inside);
            set.extend(&patterns::expand_skip_dirs([inside]));
        }
        Ok(set)
    }
}

fn relative_inside(project_root: &Path, path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    };
    let absolute = absolute.canonicalize().unwrap_or(absolute);
    let relative = pathdiff::diff_paths(&absolute, project_root)?;
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes || relative.as_os_str().is_empty() {
        None
    } else {
        Some(to_posix(&relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"skip": ["custom"], "directories": {"log_root": "custom_logs"}}"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.skip, vec!["custom".to_string()]);
        assert_eq!(config.directories.log_root, "custom_logs");
        assert_eq!(config.directories.work, "logs_files");
        assert!(config.file_types.contains_key("models.py"));
        assert_eq!(config.collection_logs, CollectionLogsConfig::default());
    }

    #[test]
    fn toml_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "skip = [\"vendor\"]\nuser_ignore_patterns = [\"*.bak\"]\n\n[file_types]\n\".css\" = \"styles\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.skip, vec!["vendor".to_string()]);
        assert!(config.user_ignore_patterns.contains("*.bak"));
        assert_eq!(config.file_types.len(), 1);
    }

    #[test]
    fn wrong_types_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, r#"{"skip": "not-a-list"}"#).unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));

        fs::write(&path, "{invalid json").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
    }

    #[test]
    fn missing_config_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = Config::resolve_config_path(dir.path(), Some(dir.path().join("nope.json").as_path()), false)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(Config::resolve_config_path(dir.path(), None, false).unwrap(), None);
    }

    #[test]
    fn default_config_file_is_discovered() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(DEFAULT_CONFIG_FILENAME), "{}").unwrap();

        let found = Config::resolve_config_path(dir.path(), None, false).unwrap();
        assert_eq!(found, Some(config_dir.join(DEFAULT_CONFIG_FILENAME)));
        assert_eq!(Config::resolve_config_path(dir.path(), None, true).unwrap(), None);
    }

    #[test]
    fn output_paths_follow_configuration() {
        let config = Config::default();
        let base = Path::new("/tmp/out");
        let paths = config.resolve_paths(base);
        assert_eq!(paths.log_dir, base.join("logs"));
        assert_eq!(
            paths.collection_dir(FileKind::Python),
            base.join("logs").join("logs_apps_pyth")
        );
        assert_eq!(paths.single_target(FileKind::All).parent(), Some(paths.single_log_dir.as_path()));
        assert_eq!(paths.tree_file(), base.join("logs/logs_tree").join(DEFAULT_TREE_FILENAME));
    }

    #[test]
    fn project_root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        assert!(matches!(
            Config::determine_project_root(Some(missing.as_path())).unwrap_err(),
            AppError::NotFound { .. }
        ));

        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            Config::determine_project_root(Some(file.as_path())).unwrap_err(),
            AppError::NotADirectory { .. }
        ));

        let root = Config::determine_project_root(Some(dir.path())).unwrap();
        assert!(root.is_absolute());
    }

    #[test]
    fn output_dir_inside_root_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let config = Config::default();

        let patterns = config
            .ignore_patterns(&root, Some(root.join(DEFAULT_CONFIG_DIR).as_path()))
            .unwrap();
        assert!(patterns.contains(".sourcelog"));
        assert!(patterns.contains("*/.sourcelog/*"));

        let outside = config
            .ignore_patterns(&root, Some(root.join("..").join("elsewhere").as_path()))
            .unwrap();
        assert!(!outside.contains("elsewhere"));
    }

    #[test]
    fn nested_skip_directory_is_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            skip: vec!["nested/inner".to_string()],
            ..Config::default()
        };
        let patterns = config.ignore_patterns(dir.path(), None).unwrap();
        assert!(patterns.contains("nested/inner"));
        assert!(patterns.contains("*/nested/inner"));
        assert!(patterns.contains("*/nested/inner/*"));
    }
}

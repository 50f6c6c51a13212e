pub mod collect;
pub mod config;
pub mod error;
pub mod gather;
pub mod paths;
pub mod patterns;
pub mod rules;
pub mod tree;

pub use collect::{ROOT_GROUP, Summary, collect_app_logs, collect_by_group, consolidate_files};
pub use config::{Config, OutputPaths};
pub use error::{AppError, Result};
pub use gather::{
    EntryKind, ExtensionFilter, FileRecord, ProjectWalk, SourceFiles, TreeNode, WalkEntry,
    build_tree, iter_source_files,
};
pub use paths::{safe_relative_path, to_posix};
pub use patterns::{IgnoreMatcher, PatternSet, expand_skip_dirs, load_ignore_patterns};
pub use rules::FileGroupResolver;
pub use rules::mapping::{FileKind, resolve_kinds};
pub use tree::{TreeOptions, create_filtered_tree};

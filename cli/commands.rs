pub mod all;
pub mod by_name;
pub mod collect;
pub mod completion;
pub mod config;
pub mod consolidate;
pub mod tree;

use crate::cli_args::TypeOpts;
use anyhow::{Context, Result};
use sourcelog_core::{ExtensionFilter, FileKind, resolve_kinds};

/// The combined kind (for default output names) and the extension filter for `--types`.
pub fn resolve_type_opts(opts: &TypeOpts) -> Result<(FileKind, ExtensionFilter)> {
    let (kinds, extensions) = resolve_kinds(&opts.types).context("Failed to resolve file types")?;
    let kind = FileKind::combine(&kinds);
    log::debug!("File types {:?} resolved to {} ({:?})", opts.types, kind, extensions);
    Ok((kind, ExtensionFilter::only(extensions)))
}

use crate::cli_args::CollectArgs;
use crate::commands::resolve_type_opts;
use crate::output::print_summary;
use crate::{Invocation, prepare_invocation};
use anyhow::{Context, Result};
use sourcelog_core::{ExtensionFilter, FileKind, Summary, collect_app_logs};
use std::path::Path;

pub fn handle_collect_command(args: &CollectArgs, quiet: bool) -> Result<()> {
    let (kind, extensions) = resolve_type_opts(&args.types)?;
    let invocation = prepare_invocation(&args.project)?;
    let log_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| invocation.paths.collection_dir(kind));
    let summary = run_collect(&invocation, kind, &extensions, &log_dir)?;
    print_summary("Collected", &summary, &log_dir, quiet);
    Ok(())
}

pub fn run_collect(
    invocation: &Invocation,
    kind: FileKind,
    extensions: &ExtensionFilter,
    log_dir: &Path,
) -> Result<Summary> {
    log::info!("Collecting {} files into {}", kind, log_dir.display());
    collect_app_logs(
        &invocation.project_root,
        log_dir,
        extensions,
        &invocation.matcher,
    )
    .with_context(|| format!("Failed to collect app logs into {}", log_dir.display()))
}

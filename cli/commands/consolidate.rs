use crate::cli_args::ConsolidateArgs;
use crate::commands::resolve_type_opts;
use crate::output::print_summary;
use crate::{Invocation, prepare_invocation};
use anyhow::{Context, Result};
use sourcelog_core::{ExtensionFilter, Summary, consolidate_files};
use std::path::Path;

pub fn handle_consolidate_command(args: &ConsolidateArgs, quiet: bool) -> Result<()> {
    let (kind, extensions) = resolve_type_opts(&args.types)?;
    let invocation = prepare_invocation(&args.project)?;
    let target = args
        .output
        .clone()
        .unwrap_or_else(|| invocation.paths.single_target(kind));
    let summary = run_consolidate(&invocation, &extensions, &target)?;
    print_summary("Consolidated", &summary, &target, quiet);
    Ok(())
}

pub fn run_consolidate(
    invocation: &Invocation,
    extensions: &ExtensionFilter,
    target: &Path,
) -> Result<Summary> {
    consolidate_files(
        &invocation.project_root,
        target,
        extensions,
        &invocation.matcher,
    )
    .with_context(|| format!("Failed to consolidate files into {}", target.display()))
}

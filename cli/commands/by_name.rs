use crate::cli_args::ByNameArgs;
use crate::output::print_summary;
use crate::prepare_invocation;
use anyhow::{Context, Result};
use sourcelog_core::{FileGroupResolver, collect_by_group};

pub fn handle_by_name_command(args: &ByNameArgs, quiet: bool) -> Result<()> {
    let invocation = prepare_invocation(&args.project)?;
    let resolver = FileGroupResolver::from_mapping(&invocation.config.file_types)
        .context("Invalid file_types mapping in configuration")?;
    if resolver.is_empty() {
        log::warn!("No file_types rules configured; nothing to group.");
    }
    let out_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| invocation.paths.work_dir.clone());

    let summary = collect_by_group(
        &invocation.project_root,
        &out_dir,
        &resolver,
        &invocation.matcher,
    )
    .with_context(|| format!("Failed to group files into {}", out_dir.display()))?;
    print_summary("Grouped", &summary, &out_dir, quiet);
    Ok(())
}

use crate::cli_args::TreeArgs;
use crate::output::print_saved;
use crate::{Invocation, prepare_invocation};
use anyhow::{Context, Result};
use sourcelog_core::{TreeOptions, create_filtered_tree};
use std::path::Path;

pub fn handle_tree_command(args: &TreeArgs, quiet: bool) -> Result<()> {
    let options = TreeOptions {
        include_content: !args.no_content,
        max_bytes: args.max_bytes,
    };
    let invocation = prepare_invocation(&args.project)?;
    let target = args
        .output
        .clone()
        .unwrap_or_else(|| invocation.paths.tree_file());
    let entries = run_tree(&invocation, &options, &target)?;
    log::debug!("Tree rendered {} entries", entries);
    print_saved("Filtered tree", &target, quiet);
    Ok(())
}

pub fn run_tree(invocation: &Invocation, options: &TreeOptions, target: &Path) -> Result<usize> {
    create_filtered_tree(
        &invocation.project_root,
        target,
        &invocation.matcher,
        options,
    )
    .with_context(|| format!("Failed to write filtered tree to {}", target.display()))
}

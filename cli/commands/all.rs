use crate::cli_args::AllArgs;
use crate::commands::collect::run_collect;
use crate::commands::consolidate::run_consolidate;
use crate::commands::resolve_type_opts;
use crate::commands::tree::run_tree;
use crate::output::{print_failure, print_saved, print_summary};
use crate::prepare_invocation;
use anyhow::Result;
use colored::*;
use sourcelog_core::TreeOptions;

/// Runs every operation even when an earlier one fails; the command fails if any did.
pub fn handle_all_command(args: &AllArgs, quiet: bool) -> Result<()> {
    let (kind, extensions) = resolve_type_opts(&args.types)?;
    let invocation = prepare_invocation(&args.project)?;
    let mut failed = Vec::new();

    let log_dir = invocation.paths.collection_dir(kind);
    match run_collect(&invocation, kind, &extensions, &log_dir) {
        Ok(summary) => print_summary("Collected", &summary, &log_dir, quiet),
        Err(e) => {
            print_failure("collect", &e);
            failed.push("collect");
        }
    }

    let target = invocation.paths.single_target(kind);
    match run_consolidate(&invocation, &extensions, &target) {
        Ok(summary) => print_summary("Consolidated", &summary, &target, quiet),
        Err(e) => {
            print_failure("consolidate", &e);
            failed.push("consolidate");
        }
    }

    let tree_file = invocation.paths.tree_file();
    match run_tree(&invocation, &TreeOptions::default(), &tree_file) {
        Ok(_) => print_saved("Filtered tree", &tree_file, quiet),
        Err(e) => {
            print_failure("tree", &e);
            failed.push("tree");
        }
    }

    if failed.is_empty() {
        if !quiet {
            println!("{}", "All operations completed.".green().bold());
        }
        Ok(())
    } else {
        anyhow::bail!("{} of 3 operations failed: {}", failed.len(), failed.join(", "))
    }
}

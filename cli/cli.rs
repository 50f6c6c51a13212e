mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, ProjectOpts};
use sourcelog_core::config::DEFAULT_CONFIG_DIR;
use sourcelog_core::{AppError, Config, IgnoreMatcher, OutputPaths};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code_for(&e)
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

/// 2 for anything the caller got wrong, 1 for everything else.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let invalid_input = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .is_some_and(AppError::is_invalid_input);
    if invalid_input { 2 } else { 1 }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Collect(args) => {
                log::debug!("Executing 'collect' command...");
                commands::collect::handle_collect_command(&args, quiet)?;
            }
            Commands::Consolidate(args) => {
                log::debug!("Executing 'consolidate' command...");
                commands::consolidate::handle_consolidate_command(&args, quiet)?;
            }
            Commands::Tree(args) => {
                log::debug!("Executing 'tree' command...");
                commands::tree::handle_tree_command(&args, quiet)?;
            }
            Commands::ByName(args) => {
                log::debug!("Executing 'by-name' command...");
                commands::by_name::handle_by_name_command(&args, quiet)?;
            }
            Commands::All(args) => {
                log::debug!("Executing 'all' command...");
                commands::all::handle_all_command(&args, quiet)?;
            }
            Commands::Types => {
                log::debug!("Executing 'types' command...");
                output::print_types_table();
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args, quiet)?;
            }
        },
    }
    Ok(())
}

/// Everything a command needs to run against one project.
pub struct Invocation {
    pub project_root: PathBuf,
    pub config: Config,
    pub paths: OutputPaths,
    pub matcher: IgnoreMatcher,
}

pub fn load_config_for_command(project_root: &Path, project_opts: &ProjectOpts) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config.as_deref(),
        project_opts.no_config,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if !project_opts.skip.is_empty() {
        log::trace!("Adding CLI skip directories: {:?}", project_opts.skip);
        config.skip.extend(project_opts.skip.iter().cloned());
    }
    if !project_opts.ignore.is_empty() {
        log::trace!("Adding CLI ignore patterns: {:?}", project_opts.ignore);
        config
            .user_ignore_patterns
            .extend(project_opts.ignore.iter().cloned());
    }
    Ok(config)
}

pub fn prepare_invocation(project_opts: &ProjectOpts) -> Result<Invocation> {
    let project_root = Config::determine_project_root(project_opts.project_root.as_deref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, project_opts)?;
    let base_dir = project_root.join(DEFAULT_CONFIG_DIR);
    let paths = config.resolve_paths(&base_dir);

    let patterns = config
        .ignore_patterns(&project_root, Some(base_dir.as_path()))
        .context("Failed to assemble ignore patterns")?;
    let matcher = IgnoreMatcher::new(patterns.iter()).context("Failed to compile ignore patterns")?;
    log::debug!("Compiled {} ignore patterns", matcher.patterns().len());

    Ok(Invocation {
        project_root,
        config,
        paths,
        matcher,
    })
}

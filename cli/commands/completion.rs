use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use colored::*;
use sourcelog_core::AppError;
use std::fs::{self, File};
use std::io;

use crate::cli_args::{Cli, CompletionArgs};

pub fn handle_completion_command(args: &CompletionArgs, quiet: bool) -> Result<()> {
    let shell_str = args.shell.as_deref().unwrap_or("fish");
    let shell_enum = parse_shell(shell_str)?;

    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    match &args.output {
        None => generate(shell_enum, &mut command, bin_name, &mut io::stdout()),
        Some(save_path) => {
            if let Some(parent) = save_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            let mut file = File::create(save_path)
                .with_context(|| format!("Failed to create file {}", save_path.display()))?;
            generate(shell_enum, &mut command, bin_name, &mut file);

            if !quiet {
                println!(
                    "{} {} completions saved to: {}",
                    "✅".green(),
                    shell_str.cyan(),
                    save_path.display().to_string().blue()
                );
            }
        }
    }
    Ok(())
}

fn parse_shell(shell_str: &str) -> Result<Shell> {
    match shell_str.to_lowercase().as_str() {
        "fish" => Ok(Shell::Fish),
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        _ => anyhow::bail!(AppError::InvalidArgument(format!(
            "Unsupported shell for completion: {}",
            shell_str
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_shell_is_invalid_input() {
        assert!(matches!(parse_shell("ZSH").unwrap(), Shell::Zsh));
        let err = parse_shell("powershell").unwrap_err();
        assert!(
            err.downcast_ref::<AppError>()
                .is_some_and(AppError::is_invalid_input)
        );
    }
}

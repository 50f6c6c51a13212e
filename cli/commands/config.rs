use crate::cli_args::ConfigArgs;
use crate::output::write_to_stdout;
use crate::load_config_for_command;
use anyhow::{Context, Result};
use sourcelog_core::Config;

pub fn handle_config_command(args: &ConfigArgs) -> Result<()> {
    let project_root = Config::determine_project_root(args.project.project_root.as_deref())
        .context("Failed to determine project root for config command")?;
    let config = load_config_for_command(&project_root, &args.project)?;
    let content = render_config(&config, &args.format)?;
    write_to_stdout(&content)
}

fn render_config(config: &Config, format: &str) -> Result<String> {
    match format {
        "toml" => toml::to_string_pretty(config).context("Failed to serialize config to TOML"),
        _ => serde_json::to_string_pretty(config).context("Failed to serialize config to JSON"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_reloads() {
        let config = Config::default();
        let json = render_config(&config, "json").unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
        let toml_text = render_config(&config, "toml").unwrap();
        assert_eq!(toml::from_str::<Config>(&toml_text).unwrap(), config);
    }
}

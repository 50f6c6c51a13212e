use clap::{Args, Parser, Subcommand};
use sourcelog_core::tree::DEFAULT_MAX_BYTES;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify the config file, JSON or TOML (default: .sourcelog/sourcelog.json).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        help = "Ignore any config file and use built-in defaults.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(
        long = "skip",
        help = "Directory name to skip at any depth (repeatable).",
        value_name = "NAME",
        help_heading = "Filtering"
    )]
    pub skip: Vec<String>,

    #[arg(
        long = "ignore",
        help = "Extra ignore glob matched against relative paths (repeatable).",
        value_name = "PATTERN",
        help_heading = "Filtering"
    )]
    pub ignore: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TypeOpts {
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "all",
        value_name = "TYPES",
        help = "File types to include: python, html, css, js, python_html, all.",
        help_heading = "Filtering"
    )]
    pub types: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Collect project sources into plain-text logs and filtered trees.",
    long_about = "sourcelog walks a project with layered ignore patterns and writes what survives: \nper-app logs, a single consolidated file, per-name groups, or a filtered tree snapshot.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  sourcelog collect -t python,html\n  sourcelog consolidate -t js --output ./all_js.txt\n  sourcelog tree --no-content\n  sourcelog all --skip fixtures",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "c",
        about = "Write one log per app (first-level directory)."
    )]
    Collect(CollectArgs),

    #[command(
        visible_alias = "s",
        about = "Write every matching file into a single log."
    )]
    Consolidate(ConsolidateArgs),

    #[command(
        visible_alias = "t",
        about = "Write a filtered tree snapshot, optionally with file heads."
    )]
    Tree(TreeArgs),

    #[command(about = "Group files by name using the configured file_types rules.")]
    ByName(ByNameArgs),

    #[command(about = "Run collect, consolidate and tree with default locations.")]
    All(AllArgs),

    #[command(about = "List the known file types and their extensions.")]
    Types,

    #[command(about = "Print the effective configuration.")]
    Config(ConfigArgs),

    #[command(about = "Generate shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
    #[command(flatten)]
    pub types: TypeOpts,
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for the per-app logs (default: from config)."
    )]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ConsolidateArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
    #[command(flatten)]
    pub types: TypeOpts,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Target file (default: from config)."
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Target file (default: from config)."
    )]
    pub output: Option<PathBuf>,
    #[arg(long, help = "List entries only, without file heads.")]
    pub no_content: bool,
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_BYTES,
        allow_negative_numbers = true,
        help = "Bytes of each file to inline under its entry."
    )]
    pub max_bytes: i64,
}

#[derive(Args, Debug, Clone)]
pub struct ByNameArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for the group logs (default: from config)."
    )]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AllArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
    #[command(flatten)]
    pub types: TypeOpts,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        default_value = "json",
        value_parser = ["json", "toml"],
        help = "Output format."
    )]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write the script to a file instead of stdout."
    )]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_accepts_comma_separated_types() {
        let cli = Cli::try_parse_from([
            "sourcelog",
            "collect",
            "-t",
            "python,html",
            "--skip",
            "fixtures",
            "--skip",
            "vendor",
        ])
        .unwrap();
        let Some(Commands::Collect(args)) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.types.types, vec!["python", "html"]);
        assert_eq!(args.project.skip, vec!["fixtures", "vendor"]);
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn tree_accepts_negative_budget() {
        let cli = Cli::try_parse_from(["sourcelog", "tree", "--max-bytes", "-1"]).unwrap();
        let Some(Commands::Tree(args)) = cli.command else {
            panic!("expected tree");
        };
        assert_eq!(args.max_bytes, -1);
        assert!(!args.no_content);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["sourcelog", "types", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn config_and_no_config_conflict() {
        let result = Cli::try_parse_from([
            "sourcelog",
            "consolidate",
            "--config",
            "a.json",
            "--no-config",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn default_types_cover_everything() {
        let cli = Cli::try_parse_from(["sourcelog", "all"]).unwrap();
        let Some(Commands::All(args)) = cli.command else {
            panic!("expected all");
        };
        assert_eq!(args.types.types, vec!["all"]);
    }
}

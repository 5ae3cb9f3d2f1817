//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "loreweave",
    bin_name = "loreweave",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Templates for your world, straight from its data models",
    long_about = "Loreweave reads Pydantic-style model definitions and writes \
                  YAML/JSON templates for every model, then optionally asks a \
                  language model to fill one in.",
    after_help = "EXAMPLES:\n\
        \x20 loreweave generate lorecore.py\n\
        \x20 loreweave generate lorecore.py --yaml --prompt a drowned kingdom\n\
        \x20 loreweave inspect lorecore.py --model Character\n\
        \x20 loreweave convert lore/ -f markdown -o docs/",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate templates from a model file, optionally filling one in.
    #[command(
        visible_alias = "gen",
        about = "Generate templates (and content)",
        after_help = "EXAMPLES:\n\
            \x20 loreweave generate lorecore.py\n\
            \x20 loreweave generate lorecore.py --json -o out/\n\
            \x20 loreweave generate lorecore.py --prompt a desert empire\n\
            \x20 loreweave generate lorecore.py --sheet Character --prompt an old sailor"
    )]
    Generate(GenerateArgs),

    /// Show models and their flattened fields.
    #[command(
        visible_alias = "ls",
        about = "Inspect the models in a file",
        after_help = "EXAMPLES:\n\
            \x20 loreweave inspect lorecore.py\n\
            \x20 loreweave inspect lorecore.py --model Item --format json"
    )]
    Inspect(InspectArgs),

    /// Convert YAML documents to JSON or Markdown.
    #[command(
        about = "Convert YAML documents",
        after_help = "EXAMPLES:\n\
            \x20 loreweave convert world.yaml\n\
            \x20 loreweave convert lore/ -f json -o export/ --stamp"
    )]
    Convert(ConvertArgs),

    /// Initialise a Loreweave configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 loreweave init\n\
            \x20 loreweave init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 loreweave completions bash > ~/.local/share/bash-completion/completions/loreweave\n\
            \x20 loreweave completions zsh  > ~/.zfunc/_loreweave\n\
            \x20 loreweave completions fish > ~/.config/fish/completions/loreweave.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Loreweave configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 loreweave config get generator.endpoint\n\
            \x20 loreweave config list\n\
            \x20 loreweave config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `loreweave generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Model definition file.
    #[arg(value_name = "INPUT", help = "Python file containing the data models")]
    pub input: PathBuf,

    /// Template formats to write; repeatable.
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help = "Template format (yaml, json); repeatable"
    )]
    pub formats: Vec<String>,

    /// Shorthand for `--format yaml`.
    #[arg(long = "yaml", help = "Generate YAML templates")]
    pub yaml: bool,

    /// Shorthand for `--format json`.
    #[arg(long = "json", help = "Generate JSON templates")]
    pub json: bool,

    /// Output root (defaults to `output.templates_dir`).
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory"
    )]
    pub output: Option<PathBuf>,

    /// Free-text prompt; when given, a template is filled in.
    #[arg(
        short = 'p',
        long = "prompt",
        value_name = "WORDS",
        num_args = 1..,
        help = "Prompt for content generation"
    )]
    pub prompt: Vec<String>,

    /// Fill this model's sheet instead of the merged template.
    #[arg(
        long = "sheet",
        value_name = "MODEL",
        requires = "prompt",
        help = "Model sheet to fill instead of the merged template"
    )]
    pub sheet: Option<String>,

    /// Which template variant is filled.
    #[arg(
        long = "mode",
        value_enum,
        default_value = "annotated",
        help = "Template variant to fill"
    )]
    pub mode: Mode,

    /// Chat completion endpoint.
    #[arg(
        long = "endpoint",
        value_name = "URL",
        env = "VLLM_SERVER_URL",
        help = "OpenAI-compatible API base URL"
    )]
    pub endpoint: Option<String>,

    /// API key sent as a bearer token.
    #[arg(
        long = "api-key",
        value_name = "KEY",
        env = "VLLM_API_KEY",
        hide_env_values = true,
        help = "API key for the generation server"
    )]
    pub api_key: Option<String>,

    /// Model identifier on the generation server.
    #[arg(
        long = "model",
        value_name = "ID",
        env = "VLLM_MODEL",
        help = "Model to request"
    )]
    pub model: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
}

/// Template variant, mirroring the output layout's mode directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Structural,
    Annotated,
}

// ── inspect ───────────────────────────────────────────────────────────────────

/// Arguments for `loreweave inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Model definition file.
    #[arg(value_name = "INPUT", help = "Python file containing the data models")]
    pub input: PathBuf,

    /// Show only this model.
    #[arg(short = 'm', long = "model", value_name = "NAME", help = "Show one model")]
    pub model: Option<String>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: InspectFormat,
}

/// Output format for the `inspect` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    /// Human-readable listing.
    Table,
    /// One model name per line.
    List,
    /// JSON array.
    Json,
}

// ── convert ───────────────────────────────────────────────────────────────────

/// Arguments for `loreweave convert`.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// YAML file or directory of YAML files.
    #[arg(value_name = "INPUT", help = "YAML file or directory")]
    pub input: PathBuf,

    /// Output directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = ".",
        help = "Output directory"
    )]
    pub output: PathBuf,

    /// Target format.
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        default_value = "markdown",
        help = "Output format (json, markdown, md)"
    )]
    pub format: String,

    /// Prefix documents with version and timestamp metadata.
    #[arg(long = "stamp", help = "Add version, sheet type and timestamp")]
    pub stamp: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `loreweave init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `loreweave completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `loreweave config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `generator.model`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "loreweave",
            "generate",
            "lorecore.py",
            "--yaml",
            "-f",
            "json",
            "--prompt",
            "a",
            "drowned",
            "kingdom",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert!(args.yaml);
        assert_eq!(args.formats, ["json"]);
        assert_eq!(args.prompt.join(" "), "a drowned kingdom");
        assert_eq!(args.mode, Mode::Annotated);
    }

    #[test]
    fn sheet_requires_prompt() {
        let result = Cli::try_parse_from(["loreweave", "generate", "m.py", "--sheet", "Item"]);
        assert!(result.is_err());
    }

    #[test]
    fn convert_defaults() {
        let cli = Cli::parse_from(["loreweave", "convert", "lore"]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected Convert command");
        };
        assert_eq!(args.format, "markdown");
        assert_eq!(args.output, PathBuf::from("."));
        assert!(!args.stamp);
    }

    #[test]
    fn inspect_alias() {
        let cli = Cli::parse_from(["loreweave", "ls", "m.py", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Inspect(InspectArgs {
                format: InspectFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["loreweave", "--quiet", "--verbose", "inspect", "m.py"]);
        assert!(result.is_err());
    }
}

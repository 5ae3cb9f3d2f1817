//! Flags accepted before or after any subcommand.

use clap::Args;
use std::path::PathBuf;

/// Flattened into [`super::Cli`] with `global = true` on every flag.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Repeatable; each use lowers the log threshold one step.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Log more (-v info, -vv debug, -vvv trace)",
        long_help = "Lower the log threshold. Without the flag only warnings \
and errors are logged; -v adds progress, -vv adds extraction and synthesis \
details, -vvv logs every skipped base and field. RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print errors only"
    )]
    pub quiet: bool,

    /// Also switched on by a non-empty `NO_COLOR`.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Never emit ANSI colors"
    )]
    pub no_color: bool,

    /// Overrides the `.loreweave.toml` lookup.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Read settings from FILE"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Rendering of command results on stdout"
    )]
    pub output_format: OutputFormat,
}

impl GlobalArgs {
    /// Log threshold selected by `--quiet` and the `-v` count.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` otherwise.
    #[default]
    Auto,
    Human,
    Plain,
    /// Machine-readable; `inspect` prints the model list as JSON.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with(verbose: u8, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            no_color: true,
            config: None,
            output_format: OutputFormat::Auto,
        }
    }

    #[test]
    fn no_flags_logs_warnings() {
        assert_eq!(args_with(0, false).log_level(), "warn");
    }

    #[test]
    fn each_verbose_flag_lowers_the_threshold() {
        let levels: Vec<_> = (1..=4).map(|v| args_with(v, false).log_level()).collect();
        assert_eq!(levels, ["info", "debug", "trace", "trace"]);
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(args_with(0, true).log_level(), "error");
        assert_eq!(args_with(3, true).log_level(), "error");
    }
}

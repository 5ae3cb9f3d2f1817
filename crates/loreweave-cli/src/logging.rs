//! Subscriber setup for the `loreweave` binary.
//!
//! The library crates emit events and spans; installing a subscriber happens
//! here and nowhere else. A set `RUST_LOG` replaces the flag-derived filter.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

const WORKSPACE_TARGETS: [&str; 3] = ["loreweave", "loreweave_core", "loreweave_adapters"];

/// Install the stderr subscriber. Fails if one is already installed.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(args.log_level())));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Could not install the log subscriber: {e}"))
}

/// `target=level` for each workspace crate; dependencies stay silent.
fn directives(level: &str) -> String {
    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            directives("info"),
            "loreweave=info,loreweave_core=info,loreweave_adapters=info"
        );
    }
}

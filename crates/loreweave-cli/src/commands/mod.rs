//! One module per subcommand.

pub mod completions;
pub mod config;
pub mod convert;
pub mod generate;
pub mod init;
pub mod inspect;

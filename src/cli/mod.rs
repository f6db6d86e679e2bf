mod commands;
pub mod exit_codes;
pub mod output;

pub use commands::{suggest, Cli, Commands, CompletionShell, ConfigCommands};

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{self, DEFAULT_LOG_LEVEL};

pub fn run(cli: Cli) -> Result<()> {
    commands::execute(cli)
}

/// install the stderr subscriber
///
/// `--verbose` forces debug, then `RUST_LOG`, then `settings.log_level` from an
/// existing config file. a missing config is never created here.
pub fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured_log_level(cli)))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn configured_log_level(cli: &Cli) -> String {
    let path = match config::get_config_path_with_override(cli.config.as_deref()) {
        Ok(path) if path.exists() => path,
        _ => return DEFAULT_LOG_LEVEL.to_string(),
    };

    config::load_with_override(Some(&path))
        .map(|c| c.settings.log_level)
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

use clap::Parser;

use stash::cli::{Cli, execute_command, init_logger_from_settings, load_settings};
use stash::logger::bootstrap_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The configured logger needs the settings; warnings raised while
    // loading them go to stderr through the bootstrap subscriber.
    let settings = tracing::subscriber::with_default(bootstrap_subscriber(), || load_settings(&cli))?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(command = cli.command.name(), backend = ?settings.cache.backend, "Starting");

    execute_command(&cli, settings).await
}

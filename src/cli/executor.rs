//! Command executor for dispatching CLI commands

use std::sync::Arc;

use anyhow::Context as _;

use super::handlers::CacheCommandHandler;
use super::parser::Cli;
use crate::cache::CacheManager;
use crate::config::settings::Settings;
use crate::context::Context;

/// Connect to the configured backend, run the command and print its output.
///
/// Ctrl-C cancels the in-flight operation.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    let output = run_command(cli, settings).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

async fn run_command(cli: &Cli, settings: Settings) -> anyhow::Result<String> {
    let backend = settings.cache.backend;
    let manager = CacheManager::new(settings.cache)
        .await
        .with_context(|| format!("Failed to initialise {:?} cache backend", backend))?;

    let ctx = Context::background();
    let interrupt = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling operation");
                ctx.cancel();
            }
        })
    };

    let handler = CacheCommandHandler::new(Arc::new(manager));
    let result = handler.execute(&ctx, &cli.command).await;
    interrupt.abort();

    result.with_context(|| format!("`{}` failed", cli.command.name()))
}

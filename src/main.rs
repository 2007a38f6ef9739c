// src/main.rs — recipe-sweep entry point

use clap::Parser;
use std::sync::Arc;

use recipe_sweep::cli::{Cli, Commands};
use recipe_sweep::dss::{DssApi, DssClient};
use recipe_sweep::infra::config::Config;
use recipe_sweep::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects RECIPE_SWEEP_LOG / RUST_LOG)
    logger::init_logging(logger::level_for_verbosity(cli.verbose));

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.resolved_command() {
        // Summary only reads the local results file
        Commands::Summary => {
            recipe_sweep::cli::summary::show_summary(&cli.results)?;
        }
        Commands::Whoami => {
            let (config, client) = connect(&cli)?;
            recipe_sweep::cli::whoami::show_identity(client.as_ref(), &config).await?;
        }
        Commands::Discover { force } => {
            let (config, client) = connect(&cli)?;
            log_identity(client.as_ref(), &config).await?;
            recipe_sweep::cli::discover::run_discover(
                client.as_ref(),
                &config,
                &cli.work_list,
                force,
                cli.quiet,
            )
            .await?;
        }
        Commands::Run { resume } => {
            let (config, client) = connect(&cli)?;
            log_identity(client.as_ref(), &config).await?;
            recipe_sweep::cli::run::run_sweep(
                client,
                &config,
                &cli.work_list,
                &cli.results,
                resume,
                cli.quiet,
            )
            .await?;
        }
    }

    Ok(())
}

/// Load settings and build the API client.
fn connect(cli: &Cli) -> anyhow::Result<(Config, Arc<dyn DssApi>)> {
    let settings_path = cli.settings_path();
    let config = Config::load(&settings_path, &cli.overrides())?;
    tracing::debug!(?config, settings = %settings_path.display(), "Loaded settings");

    let client: Arc<dyn DssApi> = Arc::new(DssClient::new(&config.instance, config.api_key.clone())?);
    Ok((config, client))
}

async fn log_identity(api: &dyn DssApi, config: &Config) -> anyhow::Result<()> {
    let info = api.auth_info().await?;
    tracing::info!("Authenticated as {} on {}", info, config.instance);
    Ok(())
}

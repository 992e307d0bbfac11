use anyhow::Context;
use clap::Parser;
use forecast_processor::cli::{run, Cli};
use forecast_processor::settings::Settings;
use forecast_processor::utils::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(cli.verbose, &settings.app.log_level, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    tracing::info!(app = %settings.app.name, "Starting");
    run(cli, &settings).context("Command failed")?;
    Ok(())
}

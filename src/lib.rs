pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod library;
pub mod models;
pub mod parser;
pub mod services;

use anyhow::Context;
pub use cli::Cli;
pub use config::Config;
use config::GeneralConfig;
use services::ShowScout;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let path = Config::locate(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = Config::load_from_path(&path).context("Failed to load configuration")?;
    config.validate()?;

    init_tracing(&config.general);

    info!(
        config = %path.display(),
        shows = config.library.shows.len(),
        root = %config.library.root_path.display(),
        "Starting episode check"
    );

    let scout = ShowScout::from_config(config).context("Failed to build HTTP client")?;
    let summary = scout.run().await;

    info!(
        checked = summary.reports.len(),
        failed = summary.failures.len(),
        "Episode check finished"
    );

    cli::print_summary(&summary, &scout.config().general.report_format)
}

fn init_tracing(general: &GeneralConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries the summary report
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if general.log_format == "json" {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }
}

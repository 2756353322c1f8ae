use anyhow::Result;
use clap::Parser;
use like_agent::server::server::{self, AppState};
use like_agent::utils::config_loader;
use like_agent::utils::logging;
use like_agent::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "like-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Wire credential loader, issuer, token cache and dispatcher
    // -------------------------------

    let state = AppState::from_config(&service_config).await?;
    info!(
        "regions: {:?}, policy: {:?}",
        state.regions, service_config.settings.region_policy
    );

    // -------------------------------
    // 3. Start http server
    // -------------------------------

    info!("Service starting...");
    server::start(&service_config.settings, state).await
}

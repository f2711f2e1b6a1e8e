use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use scopelog::config::{self, Settings};
use scopelog::http;

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics from the logging layer itself go to stderr
    init_diagnostics();

    let settings = Settings::load()?;
    tracing::info!("Settings loaded from {}", config::config_file_path().display());

    let gate = scopelog::configure_with(settings.log_config());
    scopelog::infof!("scopelog started, level {}", gate.min_severity());

    let server = http::start(settings.listen_port, gate).await?;
    tracing::info!("Try: curl http://{}/", server.addr());

    tokio::signal::ctrl_c().await?;
    server.shutdown().await
}

fn init_diagnostics() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scopelog=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

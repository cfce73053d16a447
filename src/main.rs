mod app;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use signalpro::config::Config;

use crate::app::FunnelApp;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let shared_config = cfg.shared();

    let mut app = FunnelApp::new(shared_config).await?;
    app.run().await?;

    Ok(())
}

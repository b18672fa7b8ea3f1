use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ubuzima::config::Config;
use ubuzima::web;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    for key in config.missing_secrets() {
        warn!("{key} is not set; calls to that service will fail until it is provided");
    }

    let state = match web::AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("failed to initialize service: {e}");
            std::process::exit(1);
        }
    };

    info!("Ubuzima starting on {}", config.bind_addr);
    web::serve(state, &config.bind_addr).await;
}

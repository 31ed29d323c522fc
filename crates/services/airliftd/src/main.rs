//! Airlift Gateway Service entry point.
//!
//! Initializes logging, loads configuration from the environment, and
//! serves the gateway until a shutdown signal is received or the server
//! task fails.
//!
//! # Examples
//!
//! The service is typically started with:
//! ```bash
//! export PORT=3748
//! airliftd
//! ```

use std::sync::Arc;

use airliftd::api::{GatewayState, setup_api};
use airliftd::config::GatewayConfig;
use airliftd::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    let state = GatewayState::new(Arc::new(config));
    let (addr, api_handle) = setup_api(state).await?;
    tracing::info!("Airlift gateway listening on {addr}");

    tokio::select! {
        result = api_handle => {
            tracing::error!("API server stopped: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

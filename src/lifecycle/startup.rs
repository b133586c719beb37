//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the front door from the loaded configuration
//! - Bind the listener and serve until a termination signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use tokio::net::TcpListener;

use crate::application::AppContext;
use crate::config::GatewayConfig;
use crate::dispatch::DispatchError;
use crate::http::FrontDoorServer;
use crate::lifecycle::signals::trigger_on_signal;
use crate::observability::metrics;

/// Fatal startup or serve failure.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build protocol router: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the front door until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    tracing::info!(
        settings = %config.settings_source,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let ctx = AppContext::default();
    let server = FrontDoorServer::new(&config, &ctx)?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    tokio::spawn(trigger_on_signal(ctx.shutdown.clone()));

    server.run(listener, ctx.shutdown.subscribe()).await?;
    Ok(())
}

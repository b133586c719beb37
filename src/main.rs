//! Order front door
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 FRONT DOOR                   │
//!   Client connection    │  ┌──────────┐    ┌──────────────────┐        │
//!   ─────────────────────┼─▶│  server  │───▶│ protocol router  │        │
//!                        │  │ (axum)   │    │   (dispatch)     │        │
//!                        │  └──────────┘    └───────┬──────────┘        │
//!                        │                  "http"  │  "websocket"      │
//!                        │            ┌─────────────┴───────────┐       │
//!                        │            ▼                         ▼       │
//!                        │   ┌──────────────────┐   ┌──────────────────┐│
//!                        │   │ default HTTP app │   │  order router    ││
//!                        │   │  (/health, 404)  │   │ /orders/{id} ws  ││
//!                        │   └──────────────────┘   └──────────────────┘│
//!                        │                                              │
//!                        │   config · lifecycle · observability         │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use order_frontdoor::config::{load_settings, settings_from_env};
use order_frontdoor::lifecycle::startup;
use order_frontdoor::observability::logging;

#[derive(Parser)]
#[command(name = "order-frontdoor")]
#[command(about = "Protocol-dispatching front door for HTTP and order websockets", long_about = None)]
struct Cli {
    /// Settings file (overrides FRONTDOOR_SETTINGS).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener address (overrides the settings file).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let location = settings_from_env(cli.config);
    let mut config = load_settings(&location)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("order-frontdoor v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

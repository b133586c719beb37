//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config flag / FRONTDOOR_SETTINGS / frontdoor.toml
//!     → loader.rs (resolve location, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → passed by reference to every constructor at startup
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never re-read
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_settings, settings_from_env, ConfigError, SettingsLocation};
pub use schema::{
    GatewayConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, SettingsSource,
    TimeoutConfig, WebSocketConfig,
};

//! Process-level plumbing shared by the server binary: layered configuration
//! and logging initialisation.

pub mod config;
pub mod logging;
mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};

//! Utility modules: build info, configuration, logging, JSON persistence.

pub mod build_info;
pub mod config;
pub mod logging;
pub mod persistence;

pub use config::AppConfig;
pub use logging::init_logging;

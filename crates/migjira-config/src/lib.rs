pub mod config;
pub mod error;
pub mod templates;

pub use config::{Config, DisplayConfig, OutputConfig};
pub use error::ConfigError;

pub mod config;
pub mod error;

pub use config::{Config, LoggingConfig, StorageConfig, ValidationResult};
pub use error::{DatabaseError, RusqliteErrorExt};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Calhub core initialized");
    Ok(())
}

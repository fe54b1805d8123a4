//! Logging initialization
//!
//! Logs go to stderr, human-readable or as JSON lines. `RUST_LOG` takes
//! precedence over the configured level.
//!
//! ```rust,no_run
//! use sessiongate_server::config::LoggingConfig;
//!
//! LoggingConfig::default().init()?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

impl LoggingConfig {
    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if the level is not a valid filter directive or a
    /// subscriber is already installed.
    pub fn init(&self) -> io::Result<()> {
        let filter = self.filter()?;
        let subscriber = tracing_subscriber::registry().with(filter);

        if self.json {
            subscriber
                .with(fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .map_err(|e| io::Error::other(e.to_string()))
        } else {
            subscriber
                .with(fmt::layer().with_writer(io::stderr))
                .try_init()
                .map_err(|e| io::Error::other(e.to_string()))
        }
    }

    fn filter(&self) -> io::Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string())),
        }
    }
}

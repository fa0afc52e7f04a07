//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind, `HOST` (default `0.0.0.0`).
    pub host: String,
    /// Port to bind, `PORT` (default `3000`).
    pub port: u16,
    /// Seed for server-side dice, `HABITQUEST_RNG_SEED`. Unset seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let rng_seed = lookup("HABITQUEST_RNG_SEED")
            .map(|raw| {
                raw.parse().map_err(|e| {
                    AppError::Config(format!("HABITQUEST_RNG_SEED must be a valid u64: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            host,
            port,
            rng_seed,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a valid address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

//! Server configuration and validation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors detected during [`ServerConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The bind host is empty.
    EmptyHost,
    /// The keepalive ping interval is zero.
    ZeroPingInterval,
    /// The keepalive pong timeout is zero.
    ZeroPingTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHost => write!(f, "bind host is empty"),
            Self::ZeroPingInterval => write!(f, "ping_interval must be non-zero"),
            Self::ZeroPingTimeout => write!(f, "ping_timeout must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

/// Configuration for [`BridgeServer`](crate::BridgeServer).
///
/// # Examples
///
/// ```
/// use coil_server::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.host, "127.0.0.1");
/// assert_eq!(config.port, 10043);
/// assert_eq!(config.ping_interval, Duration::from_secs(20));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind. Default: `127.0.0.1`.
    pub host: String,
    /// Port to bind. Default: 10043. Use 0 to bind an ephemeral port
    /// (the bound address is available via
    /// [`BridgeServer::local_addr`](crate::BridgeServer::local_addr)).
    pub port: u16,
    /// How often the server pings each connection. Default: 20 s.
    pub ping_interval: Duration,
    /// How long after a ping the server waits for a pong before
    /// declaring the connection dead. Default: 10 s.
    pub ping_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 10043,
            ping_interval: Duration::from_secs(20),
            ping_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.ping_interval.is_zero() {
            return Err(ConfigError::ZeroPingInterval);
        }
        if self.ping_timeout.is_zero() {
            return Err(ConfigError::ZeroPingTimeout);
        }
        Ok(())
    }
}

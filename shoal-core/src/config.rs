//! Centralized configuration for Shoal.
//!
//! All tunable parameters live here so limits and timeouts are not
//! hard-coded across the lister, sampler and HTTP layer.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Shoal components.
///
/// Groups related settings into sections and supports environment variable
/// overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct ShoalConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub query: QueryConfig,
    pub simulation: SimulationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Collection store access configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Deadline applied to every store call
    pub query_timeout: Duration,
    /// JSON catalog loaded in production mode
    pub data_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            data_file: None,
        }
    }
}

/// Listing and sampling limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Page size when the request names none
    pub default_limit: u64,
    /// Largest page size served; larger requests are clamped
    pub max_limit: u64,
    /// Batch size when the request names none
    pub default_batch_size: u64,
    /// Largest batch served; larger requests are clamped
    pub max_batch_size: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            default_batch_size: 10,
            max_batch_size: 50,
        }
    }
}

/// Synthetic catalog configuration for development mode.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Deterministic seed for reproducible catalogs
    pub deterministic_seed: Option<u64>,
    /// Items generated per resource type
    pub items_per_resource: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            deterministic_seed: None,
            items_per_resource: 200,
        }
    }
}

impl SimulationConfig {
    /// Creates a small, reproducible catalog configuration for tests.
    pub fn deterministic_testing() -> Self {
        Self {
            deterministic_seed: Some(42),
            items_per_resource: 30,
        }
    }
}

impl ShoalConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server overrides
        if let Ok(host) = std::env::var("SHOAL_HOST") {
            if let Ok(addr) = host.parse::<IpAddr>() {
                config.server.host = addr;
            }
        }

        if let Ok(port) = std::env::var("SHOAL_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        // Storage overrides
        if let Ok(timeout) = std::env::var("SHOAL_QUERY_TIMEOUT_MS") {
            if let Ok(millis) = timeout.parse::<u64>() {
                config.storage.query_timeout = Duration::from_millis(millis);
            }
        }

        if let Ok(path) = std::env::var("SHOAL_DATA_FILE") {
            if !path.trim().is_empty() {
                config.storage.data_file = Some(PathBuf::from(path));
            }
        }

        // Query limit overrides
        if let Some(limit) = positive_env("SHOAL_DEFAULT_LIMIT") {
            config.query.default_limit = limit;
        }
        if let Some(limit) = positive_env("SHOAL_MAX_LIMIT") {
            config.query.max_limit = limit;
        }
        if let Some(batch) = positive_env("SHOAL_DEFAULT_BATCH_SIZE") {
            config.query.default_batch_size = batch;
        }
        if let Some(batch) = positive_env("SHOAL_MAX_BATCH_SIZE") {
            config.query.max_batch_size = batch;
        }

        // Simulation overrides
        if let Ok(seed) = std::env::var("SHOAL_SIMULATION_SEED") {
            if let Ok(seed_value) = seed.parse::<u64>() {
                config.simulation.deterministic_seed = Some(seed_value);
            }
        }

        if let Ok(items) = std::env::var("SHOAL_SIMULATION_ITEMS") {
            if let Ok(count) = items.parse::<usize>() {
                config.simulation.items_per_resource = count;
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            storage: StorageConfig {
                query_timeout: Duration::from_millis(500),
                data_file: None,
            },
            simulation: SimulationConfig::deterministic_testing(),
            ..Default::default()
        }
    }
}

fn positive_env(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
}

use anyhow::Result;
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::prices::{DEFAULT_CAPACITY, DEFAULT_TTL_SECONDS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub prices: PricesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Upstream price source and its cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesConfig {
    pub base_url: String,
    /// Bidding zone passed as `bzn`, e.g. `DE-LU` or `NL`.
    pub bidding_zone: String,
    /// Zone the hourly series and the today/tomorrow window are expressed in.
    pub timezone: Tz,
    pub http_timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub cache_capacity: usize,
    /// Local hour after which next-day prices are usually out.
    pub publication_hour: u32,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.energy-charts.info".to_string(),
            bidding_zone: "DE-LU".to_string(),
            timezone: chrono_tz::Europe::Amsterdam,
            http_timeout_seconds: 10,
            cache_ttl_seconds: DEFAULT_TTL_SECONDS,
            cache_capacity: DEFAULT_CAPACITY,
            publication_hour: 14,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("EVCP__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }
}

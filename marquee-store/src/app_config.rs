use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub booking: BookingRules,
}

/// Tunable business rules for the reservation window.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// Seat lock / hold lifetime.
    pub hold_ttl_seconds: u64,
    /// Payment window for a pending order.
    pub order_ttl_seconds: u64,
    pub max_seats_per_hold: usize,
    /// Availability cache lifetime; seconds, not minutes.
    #[serde(default = "default_cache_seconds")]
    pub availability_cache_seconds: u64,
    /// How long hold records stay readable after their lock has expired.
    #[serde(default = "default_retention_seconds")]
    pub hold_retention_seconds: u64,
}

fn default_cache_seconds() -> u64 {
    5
}

fn default_retention_seconds() -> u64 {
    86_400
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `MARQUEE__BOOKING__HOLD_TTL_SECONDS=120`
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

//! PostgreSQL pool settings for the read-only record store.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_MAX_CONNECTIONS` | 10 |
//! | `DATABASE_MIN_CONNECTIONS` | 1 |
//! | `DATABASE_ACQUIRE_TIMEOUT_SECS` | 30 |
//! | `DATABASE_IDLE_TIMEOUT_SECS` | 600 |
//!
//! Malformed values keep the default and log a warning.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use echomap_core::{Error, Result};

pub const ENV_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const ENV_MIN_CONNECTIONS: &str = "DATABASE_MIN_CONNECTIONS";
pub const ENV_ACQUIRE_TIMEOUT_SECS: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "DATABASE_IDLE_TIMEOUT_SECS";

/// Sizing and timeouts for the record store pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Never above `max_connections`.
    pub min_connections: u32,
    /// How long a strategy query waits for a free connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PoolConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let max_connections = parse_or(&lookup, ENV_MAX_CONNECTIONS, base.max_connections).max(1);
        Self {
            max_connections,
            min_connections: parse_or(&lookup, ENV_MIN_CONNECTIONS, base.min_connections)
                .min(max_connections),
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                ENV_ACQUIRE_TIMEOUT_SECS,
                base.acquire_timeout.as_secs(),
            )),
            idle_timeout: Duration::from_secs(parse_or(
                &lookup,
                ENV_IDLE_TIMEOUT_SECS,
                base.idle_timeout.as_secs(),
            )),
        }
    }

    /// Exactly one connection, so session settings such as `search_path`
    /// apply to every query.
    pub fn single_connection() -> Self {
        Self {
            max_connections: 1,
            min_connections: 1,
            ..Self::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(
            subsystem = "db",
            component = "pool",
            key,
            value = %raw,
            default = %default,
            "Ignoring malformed pool setting"
        );
        default
    })
}

/// Open a pool; connection failures surface as [`Error::StoreUnavailable`].
pub async fn connect(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(Error::StoreUnavailable)?;

    let health = PoolHealth::of(&pool);
    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        pool_size = health.size,
        pool_idle = health.idle,
        duration_ms = start.elapsed().as_millis() as u64,
        "Record store pool ready"
    );
    Ok(pool)
}

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolHealth {
    pub size: u32,
    pub idle: usize,
}

impl PoolHealth {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle(),
        }
    }

    /// Every open connection is busy; further queries wait for one.
    pub fn is_saturated(&self) -> bool {
        self.size > 0 && self.idle == 0
    }
}

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Minimum wall-clock latency for register/login responses, in milliseconds.
    pub timing_floor_ms: u64,
}

impl AuthConfig {
    pub fn timing_floor(&self) -> Duration {
        Duration::from_millis(self.timing_floor_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            // No fallback: a known default secret would make every token forgeable.
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "credauth".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "credauth-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let auth = AuthConfig {
            timing_floor_ms: std::env::var("AUTH_TIMING_FLOOR_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(100),
        };
        Ok(Self {
            database_url,
            jwt,
            auth,
        })
    }
}

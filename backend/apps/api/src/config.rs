//! Server configuration from environment variables

use std::net::SocketAddr;

use anyhow::{Context, bail};
use auth::AuthConfig;
use chrono::Duration;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

pub struct ServerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values are treated alike
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let token_secret = get("AUTH_TOKEN_SECRET").context("AUTH_TOKEN_SECRET must be set")?;

        let ttl_minutes = match get("AUTH_TOKEN_TTL_MINUTES") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .context("AUTH_TOKEN_TTL_MINUTES must be an integer")?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        let Some(ttl) = Duration::try_minutes(ttl_minutes) else {
            bail!("AUTH_TOKEN_TTL_MINUTES is out of range");
        };

        let mut auth = AuthConfig::new(token_secret.as_bytes(), ttl)?;
        if let Some(cost) = get("AUTH_PASSWORD_COST") {
            let cost = cost
                .trim()
                .parse::<u32>()
                .context("AUTH_PASSWORD_COST must be an integer")?;
            auth = auth.with_password_cost(cost)?;
        }
        if let Some(leeway) = get("AUTH_TOKEN_LEEWAY_SECONDS") {
            let leeway = leeway
                .trim()
                .parse::<i64>()
                .context("AUTH_TOKEN_LEEWAY_SECONDS must be an integer")?;
            let Some(leeway) = Duration::try_seconds(leeway) else {
                bail!("AUTH_TOKEN_LEEWAY_SECONDS is out of range");
            };
            auth = auth.with_token_leeway(leeway)?;
        }

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be an integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            frontend_origins,
            auth,
        })
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::{parse_url, ConfigError};

pub const PORT: u16 = 8080;
pub const DB_PATH: &str = "quotation.db";
pub const UPSTREAM_BASE_URL: &str = "https://economia.awesomeapi.com.br";
pub const USD_BRL_PATH: &str = "json/last/USD-BRL";
pub const QUOTATION_ROUTE: &str = "/quotation/usd-brl";
pub const UPSTREAM_DEADLINE: Duration = Duration::from_millis(200);
pub const STORE_DEADLINE: Duration = Duration::from_millis(10);

pub const PORT_VAR: &str = "PORT";
pub const DB_PATH_VAR: &str = "DB_PATH";
pub const UPSTREAM_URL_VAR: &str = "UPSTREAM_URL";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    /// Full USD-BRL endpoint, already joined onto the upstream base.
    pub upstream_endpoint: Url,
    pub upstream_deadline: Duration,
    pub store_deadline: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(PORT_VAR) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => PORT,
        };
        let db_path = lookup(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DB_PATH));
        let base = lookup(UPSTREAM_URL_VAR).unwrap_or_else(|| UPSTREAM_BASE_URL.to_string());

        Ok(ServerConfig {
            port,
            db_path,
            upstream_endpoint: upstream_endpoint(&base)?,
            upstream_deadline: UPSTREAM_DEADLINE,
            store_deadline: STORE_DEADLINE,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Joins the USD-BRL path onto `base`, keeping any path prefix the base carries.
pub fn upstream_endpoint(base: &str) -> Result<Url, ConfigError> {
    let mut base = parse_url(base)?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(USD_BRL_PATH)
        .map_err(|e| ConfigError::InvalidUrl(base.to_string(), e))
}

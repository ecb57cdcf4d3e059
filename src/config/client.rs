use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::{parse_url, ConfigError};

pub const SERVER_URL: &str = "http://localhost:8080/quotation/usd-brl";
pub const QUOTATION_FILE: &str = "quotation.txt";
pub const CLIENT_DEADLINE: Duration = Duration::from_millis(300);

pub const SERVER_URL_VAR: &str = "SERVER_URL";
pub const QUOTATION_FILE_VAR: &str = "QUOTATION_FILE";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Url,
    pub quotation_file: PathBuf,
    pub deadline: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(SERVER_URL_VAR).unwrap_or_else(|| SERVER_URL.to_string());
        let quotation_file =
            lookup(QUOTATION_FILE_VAR).unwrap_or_else(|| QUOTATION_FILE.to_string());

        Ok(ClientConfig {
            server_url: parse_url(&server_url)?,
            quotation_file: PathBuf::from(quotation_file),
            deadline: CLIENT_DEADLINE,
        })
    }
}

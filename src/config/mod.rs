use thiserror::Error;
use url::Url;

pub mod client;
pub mod server;

pub use client::ClientConfig;
pub use server::ServerConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid URL {0}: {1}")]
    InvalidUrl(String, url::ParseError),
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e))
}

use log::info;
use reqwest::{Client, StatusCode};
use std::io;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::{
    config::ClientConfig,
    models::quotation::{ErrorMessage, Quotation},
};

pub mod record;

pub use record::append_record;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Server responded {status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("Malformed server body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unable to write quotation file: {0}")]
    Io(#[from] io::Error),
}

fn classify(err: reqwest::Error, deadline: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(deadline)
    } else {
        ClientError::Reqwest(err)
    }
}

/// Requests the current quotation from the server, giving up after `deadline`.
pub async fn fetch_quotation(url: &Url, deadline: Duration) -> Result<Quotation, ClientError> {
    let client = Client::new();
    let response = client
        .get(url.clone())
        .timeout(deadline)
        .send()
        .await
        .map_err(|e| classify(e, deadline))?;
    let status = response.status();
    let body = response.bytes().await.map_err(|e| classify(e, deadline))?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<ErrorMessage>(&body) {
            Ok(error) => error.message,
            Err(_) => String::from_utf8_lossy(&body).into_owned(),
        };

        return Err(ClientError::Server { status, message });
    }

    Ok(serde_json::from_slice(&body)?)
}

pub fn quotation_line(quotation: &Quotation) -> String {
    format!("Quotation: {}", quotation.bid)
}

/// One client run: fetch, then append to the record file.
pub async fn run(config: &ClientConfig) -> Result<Quotation, ClientError> {
    let quotation = fetch_quotation(&config.server_url, config.deadline).await?;

    append_record(&config.quotation_file, &quotation)?;
    info!("quotation appended to {}", config.quotation_file.display());

    Ok(quotation)
}

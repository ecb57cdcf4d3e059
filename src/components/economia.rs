use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::quotation::{Quotation, UpstreamQuotation};

#[derive(Error, Debug)]
pub enum QuotationApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Upstream responded with status {0}")]
    Status(StatusCode),
    #[error("Malformed upstream body: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn classify(err: reqwest::Error, deadline: Duration) -> QuotationApiError {
    if err.is_timeout() {
        QuotationApiError::Timeout(deadline)
    } else {
        QuotationApiError::Reqwest(err)
    }
}

/// Fetches the latest USD-BRL quotation. `deadline` bounds the whole exchange,
/// from connecting until the body has been read.
pub async fn fetch_usd_brl(
    endpoint: &Url,
    deadline: Duration,
) -> Result<Quotation, QuotationApiError> {
    let client = Client::new();
    let response = client
        .get(endpoint.clone())
        .timeout(deadline)
        .send()
        .await
        .map_err(|e| classify(e, deadline))?;

    if !response.status().is_success() {
        return Err(QuotationApiError::Status(response.status()));
    }

    let body = response.bytes().await.map_err(|e| classify(e, deadline))?;

    parse_usd_brl(&body)
}

fn parse_usd_brl(body: &[u8]) -> Result<Quotation, QuotationApiError> {
    let upstream: UpstreamQuotation = serde_json::from_slice(body)?;

    Ok(upstream.usd_brl)
}

use serde::{Deserialize, Serialize};

/// Bid as served to clients. The bid stays text so the upstream decimal
/// formatting (trailing zeros included) is never lost.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub bid: String,
}

/// Body of `GET /json/last/USD-BRL` on the upstream provider.
#[derive(Debug, Deserialize)]
pub struct UpstreamQuotation {
    #[serde(rename = "USDBRL")]
    pub usd_brl: Quotation,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct PersistedQuotation {
    pub id: u64,
    pub bid: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: &str) -> Self {
        ErrorMessage {
            message: message.to_string(),
        }
    }
}

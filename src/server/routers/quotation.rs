use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    header::{self, HeaderValue},
    Response, StatusCode,
};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    components::economia::fetch_usd_brl,
    db::quotations::{save_with_deadline, QuotationRepository},
    models::quotation::ErrorMessage,
    server::AppState,
};

pub const UPSTREAM_ERROR_MESSAGE: &str = "Internal server error, request timeout";
pub const STORE_ERROR_MESSAGE: &str = "Internal server error, database timeout";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));

    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    response
}

pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, encode(&ErrorMessage::new(message)))
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        error!("encode response body: {:?}", e);
        format!(r#"{{"message":"{}"}}"#, INTERNAL_ERROR_MESSAGE).into_bytes()
    })
}

/// Fetches the upstream bid, stores it, then hands it back. Each step is
/// bounded by its own deadline and any failure ends the request with a 500.
pub async fn handle_get_usd_brl<R: QuotationRepository>(
    state: &AppState<R>,
) -> Response<Full<Bytes>> {
    let quotation = match fetch_usd_brl(&state.upstream_endpoint, state.upstream_deadline).await {
        Ok(quotation) => quotation,
        Err(e) => {
            error!("fetch usd-brl quotation error: {}", e);

            return error_response(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_ERROR_MESSAGE);
        }
    };

    match save_with_deadline(
        Arc::clone(&state.repository),
        quotation.bid.clone(),
        state.store_deadline,
    )
    .await
    {
        Ok(saved) => info!("saved quotation #{} bid={}", saved.id, saved.bid),
        Err(e) => {
            error!("save usd-brl quotation error: {}", e);

            return error_response(StatusCode::INTERNAL_SERVER_ERROR, STORE_ERROR_MESSAGE);
        }
    }

    match serde_json::to_vec(&quotation) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            error!("encode quotation error: {:?}", e);

            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::quotations::{QuotationDbError, QuotationStore},
        models::quotation::{PersistedQuotation, Quotation},
        testing::{mock_usd_brl, silent_server, usd_brl_endpoint},
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tempfile::tempdir;
    use url::Url;

    struct BrokenRepository;

    impl QuotationRepository for BrokenRepository {
        fn insert(&self, _bid: &str) -> Result<PersistedQuotation, QuotationDbError> {
            Err(QuotationDbError::SledError(sled::Error::Unsupported(
                "read-only volume".to_string(),
            )))
        }
    }

    struct SlowRepository;

    impl QuotationRepository for SlowRepository {
        fn insert(&self, bid: &str) -> Result<PersistedQuotation, QuotationDbError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(PersistedQuotation {
                id: 1,
                bid: bid.to_string(),
            })
        }
    }

    fn state<R: QuotationRepository>(repository: R, endpoint: Url) -> AppState<R> {
        AppState {
            repository: Arc::new(repository),
            upstream_endpoint: endpoint,
            upstream_deadline: Duration::from_millis(500),
            store_deadline: Duration::from_secs(1),
        }
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn returns_upstream_bid_unmodified() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = mock_usd_brl(&mut upstream, "5.4300").await;
        let dir = tempdir().unwrap();
        let store = QuotationStore::open(dir.path()).unwrap();
        let state = state(store.clone(), usd_brl_endpoint(&upstream));

        let response = handle_get_usd_brl(&state).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let quotation: Quotation = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(quotation.bid, "5.4300");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn upstream_timeout_persists_nothing() {
        let dir = tempdir().unwrap();
        let store = QuotationStore::open(dir.path()).unwrap();
        let mut state = state(store.clone(), silent_server().await);
        state.upstream_deadline = Duration::from_millis(50);

        let response = handle_get_usd_brl(&state).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message: ErrorMessage = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(message.message, UPSTREAM_ERROR_MESSAGE);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn malformed_upstream_is_500() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = upstream
            .mock("GET", "/json/last/USD-BRL")
            .with_status(200)
            .with_body(r#"{"USDBRL":{"bid":5.43}}"#)
            .create_async()
            .await;
        let dir = tempdir().unwrap();
        let store = QuotationStore::open(dir.path()).unwrap();
        let state = state(store.clone(), usd_brl_endpoint(&upstream));

        let response = handle_get_usd_brl(&state).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_failure_withholds_bid() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = mock_usd_brl(&mut upstream, "5.4300").await;
        let state = state(BrokenRepository, usd_brl_endpoint(&upstream));

        let response = handle_get_usd_brl(&state).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        let message: ErrorMessage = serde_json::from_slice(&body).unwrap();
        assert_eq!(message.message, STORE_ERROR_MESSAGE);
        assert!(!String::from_utf8(body).unwrap().contains("5.4300"));
    }

    #[tokio::test]
    async fn store_timeout_is_500() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = mock_usd_brl(&mut upstream, "5.4300").await;
        let mut state = state(SlowRepository, usd_brl_endpoint(&upstream));
        state.store_deadline = Duration::from_millis(20);

        let response = handle_get_usd_brl(&state).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message: ErrorMessage = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(message.message, STORE_ERROR_MESSAGE);
    }
}

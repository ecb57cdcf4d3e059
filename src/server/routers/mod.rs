use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response, StatusCode};

use crate::{config::server::QUOTATION_ROUTE, db::quotations::QuotationRepository, server::AppState};

pub mod quotation;

pub async fn route<B, R: QuotationRepository>(
    req: Request<B>,
    state: &AppState<R>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    // Only the method and path matter, resolve them before awaiting.
    let usd_brl = req.method() == Method::GET && req.uri().path() == QUOTATION_ROUTE;

    if usd_brl {
        return Ok(quotation::handle_get_usd_brl(state).await);
    }

    Ok(quotation::error_response(StatusCode::NOT_FOUND, "Not Found"))
}

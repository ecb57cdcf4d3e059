use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use url::Url;

use crate::{
    config::{ConfigError, ServerConfig},
    db::quotations::{QuotationDbError, QuotationRepository, QuotationStore},
};

use routers::route;

pub use listener::Accept;

mod listener;
pub mod routers;

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(5);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Quotation store error: {0}")]
    Db(#[from] QuotationDbError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Everything a request needs. Built once at startup and shared by every
/// connection task.
pub struct AppState<R> {
    pub repository: Arc<R>,
    pub upstream_endpoint: Url,
    pub upstream_deadline: Duration,
    pub store_deadline: Duration,
}

impl<R: QuotationRepository> AppState<R> {
    pub fn new(repository: Arc<R>, config: &ServerConfig) -> Self {
        AppState {
            repository,
            upstream_endpoint: config.upstream_endpoint.clone(),
            upstream_deadline: config.upstream_deadline,
            store_deadline: config.store_deadline,
        }
    }
}

/// Opens the store, binds the configured port and serves until Ctrl+C.
/// The store is flushed once open connections have drained.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = Arc::new(QuotationStore::open(&config.db_path)?);
    let state = Arc::new(AppState::new(Arc::clone(&store), &config));
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on http://{}", addr);

    serve(listener, state, shutdown_signal()).await;

    let flushed = store.flush()?;
    info!("quotation store flushed ({} bytes)", flushed);

    Ok(())
}

/// Accepts connections until `shutdown` resolves, then waits up to
/// `DRAIN_TIMEOUT` for in-flight requests to finish.
///
/// Accept errors (e.g. running out of file descriptors) are logged and
/// retried with a doubling backoff; they never end the loop.
pub async fn serve<L, R, F>(listener: L, state: Arc<AppState<R>>, shutdown: F)
where
    L: Accept,
    R: QuotationRepository,
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    let mut backoff = ACCEPT_BACKOFF_MIN;

    tokio::pin!(shutdown);

    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(stream) => {
                    backoff = ACCEPT_BACKOFF_MIN;
                    stream
                }
                Err(e) => {
                    error!("accept error: {}; retrying in {:?}", e, backoff);
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(ACCEPT_BACKOFF_MAX);

                    continue;
                }
            },
            _ = &mut shutdown => break,
        };
        let io = TokioIo::new(stream);
        let state = Arc::clone(&state);
        let service = service_fn(move |req| {
            let state = Arc::clone(&state);

            async move { route(req, &state).await }
        });
        let connection = graceful.watch(http1::Builder::new().serve_connection(io, service));

        tokio::task::spawn(async move {
            if let Err(err) = connection.await {
                error!("Failed to serve connection: {:?}", err);
            }
        });
    }

    info!("shutdown signal received, draining open connections");

    tokio::select! {
        _ = graceful.shutdown() => info!("all connections closed"),
        _ = tokio::time::sleep(DRAIN_TIMEOUT) => {
            warn!("connections still open after {:?}, closing anyway", DRAIN_TIMEOUT)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("unable to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
}

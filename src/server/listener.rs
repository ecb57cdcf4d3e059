use std::future::Future;
use std::io;
use tokio::net::{TcpListener, TcpStream};

/// Source of inbound connections for [`super::serve`].
pub trait Accept: Send + Sync {
    fn accept(&self) -> impl Future<Output = io::Result<TcpStream>> + Send;
}

impl Accept for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<TcpStream>> + Send {
        async move { TcpListener::accept(self).await.map(|(stream, _)| stream) }
    }
}

use tokio::net::TcpListener;
use url::Url;

/// HTTP double that accepts connections and never answers them.
pub async fn silent_server() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    Url::parse(&format!("http://{}/json/last/USD-BRL", addr)).unwrap()
}

pub async fn mock_usd_brl(server: &mut mockito::ServerGuard, bid: &str) -> mockito::Mock {
    server
        .mock("GET", "/json/last/USD-BRL")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"USDBRL":{{"code":"USD","codein":"BRL","bid":"{}","ask":"5.4420"}}}}"#,
            bid
        ))
        .create_async()
        .await
}

pub fn usd_brl_endpoint(server: &mockito::ServerGuard) -> Url {
    Url::parse(&format!("{}/json/last/USD-BRL", server.url())).unwrap()
}

use log::LevelFilter;
use quotation_rs::{
    config::ServerConfig,
    server::{run_server, ServerError},
};
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    SimpleLogger::new()
        .with_colors(true)
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let config = ServerConfig::from_env()?;

    run_server(config).await
}

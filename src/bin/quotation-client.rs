use log::{error, LevelFilter};
use quotation_rs::{
    client::{quotation_line, run},
    config::ClientConfig,
};
use simple_logger::SimpleLogger;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = SimpleLogger::new()
        .with_colors(true)
        .with_level(LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("logger init failed: {}", e);
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid client configuration: {}", e);
            process::exit(1);
        }
    };

    match run(&config).await {
        Ok(quotation) => println!("{}", quotation_line(&quotation)),
        Err(e) => {
            error!("Error getting quotation: {}", e);
            process::exit(1);
        }
    }
}

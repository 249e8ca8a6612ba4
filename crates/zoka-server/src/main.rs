//! Gateway binary: bind, log, run.

use tracing_subscriber::EnvFilter;
use zoka_server::{ServerError, ZokaServer};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("ZOKA_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let server = ZokaServer::builder().bind(&addr).build().await?;
    server.run().await
}

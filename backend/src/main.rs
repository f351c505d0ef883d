//! Backend entry-point: configuration, persistence wiring, and the HTTP
//! server.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::server::{AppConfig, build_app, build_http_state};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env()
        .map_err(|err| std::io::Error::other(format!("configuration: {err}")))?;
    let bind_addr = config.bind_addr;
    let state = build_http_state(&config).await?;

    actix_web::HttpServer::new(move || build_app(state.clone()))
        .bind(bind_addr)?
        .run()
        .await
}

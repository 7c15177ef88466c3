use std::env;

use anyhow::Result;
use burnwatch_api::build_app_from_env;
use burnwatch_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("burnwatch_api");

    let bind = env::var("BURNWATCH_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app_from_env()?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "burnwatch api started");

    axum::serve(listener, app).await?;
    Ok(())
}

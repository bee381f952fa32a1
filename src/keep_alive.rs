use anyhow::{Context, Result};
use axum::{Router, routing::get};

async fn alive() -> &'static str {
    "I'm alive!"
}

pub fn router() -> Router {
    Router::new().route("/", get(alive))
}

/// Binds the keep-alive endpoint and serves it on a background task.
/// Hosting platforms ping it to keep the process from being idled.
pub async fn spawn(port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind keep-alive server")?;

    tracing::info!("Keep-alive server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!("Keep-alive server error: {:?}", e);
        }
    });

    Ok(())
}

use std::net::SocketAddr;

use axum::{routing::get, Router};

use crate::state::AppState;
use crate::{pipeline, users};

pub fn build_app(state: AppState) -> Router {
    let routes = Router::new()
        .merge(users::router())
        .route("/metrics", get(pipeline::scrape_metrics));
    pipeline::wrap(routes, state)
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::AppError;
use crate::{
    metrics::{Metrics, UNMATCHED_ROUTE},
    state::AppState,
};

/// Counts the request once its response is ready, labeled by the declared
/// route pattern rather than the literal path.
pub async fn track_metrics(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());

    let res = next.run(req).await;
    metrics.record_request(&method, &route, res.status().as_u16());
    res
}

/// GET /metrics
#[instrument(skip(state))]
pub async fn scrape_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(([(CONTENT_TYPE, state.metrics.content_type())], body))
}

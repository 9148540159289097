//! Request pipeline shared by every route.
//!
//! Outermost first: trace span, access log, metrics tagger, error responder,
//! panic catcher, then the routes. Form bodies are decoded per handler by
//! [`UrlEncodedBody`].

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request},
    middleware, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::state::AppState;

mod access_log;
mod extractors;
mod fault;
mod track_metrics;

pub use extractors::UrlEncodedBody;
pub use fault::AppError;
pub use track_metrics::scrape_metrics;

pub fn wrap(routes: Router<AppState>, state: AppState) -> Router {
    let metrics = state.metrics.clone();
    routes
        .with_state(state)
        .layer(CatchPanicLayer::custom(fault::panic_response))
        .layer(middleware::from_fn(fault::error_responder))
        .layer(middleware::from_fn_with_state(
            metrics,
            track_metrics::track_metrics,
        ))
        .layer(middleware::from_fn(access_log::access_log))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let route = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|p| p.as_str().to_owned());
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        route = route.as_deref().unwrap_or(crate::metrics::UNMATCHED_ROUTE),
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::warn!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                )
                // Faults are logged at error level by `error_responder` only.
                .on_failure(()),
        )
}

/// Caller address when the server was started with connect info, else `-`.
pub(crate) fn client_ip(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".into())
}

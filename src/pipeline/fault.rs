use std::any::Any;

use axum::{
    extract::{rejection::FormRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::client_ip;

/// Body sent for every fault, whatever its cause.
pub const FAULT_BODY: &str = "Something went wrong!";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Body(#[from] FormRejection),
    #[error("metrics encoding failed: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Body(rejection) => rejection.status(),
            AppError::Metrics(_) | AppError::Panic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Marker left on a response so `error_responder` can log it with the
/// request context and replace the body.
#[derive(Debug, Clone)]
pub struct Fault {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut res = status.into_response();
        res.extensions_mut().insert(Fault {
            status,
            message: self.to_string(),
        });
        res
    }
}

/// Catches every fault raised below it once: logs it at error level and
/// answers with the fault's status and a generic body.
pub async fn error_responder(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let ip = client_ip(&req);

    let res = next.run(req).await;
    let Some(fault) = res.extensions().get::<Fault>().cloned() else {
        return res;
    };

    error!(
        status = fault.status.as_u16(),
        error = %fault.message,
        url = %uri,
        %method,
        %ip,
        "{} - {} - {} - {} - {}",
        fault.status.as_u16(),
        fault.message,
        uri,
        method,
        ip
    );
    (fault.status, FAULT_BODY).into_response()
}

/// Turns a caught panic into a fault for `error_responder`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Panic(message).into_response()
}

use std::{fmt, time::Instant};

use axum::{
    body::HttpBody,
    extract::Request,
    http::{
        header::{CONTENT_LENGTH, REFERER, USER_AGENT},
        HeaderMap, Method, StatusCode, Uri, Version,
    },
    middleware::Next,
    response::Response,
};
use time::{macros::format_description, OffsetDateTime};
use tracing::info;

use super::client_ip;

/// One request in Apache combined log format:
/// `host - - [date] "METHOD url HTTP/x" status length "referrer" "user-agent"`.
pub struct CombinedLine {
    pub remote: String,
    pub at: OffsetDateTime,
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub status: StatusCode,
    pub length: Option<u64>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl fmt::Display for CombinedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .at
            .format(format_description!(
                "[day]/[month repr:short]/[year]:[hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
            ))
            .map_err(|_| fmt::Error)?;
        write!(
            f,
            "{} - - [{}] \"{} {} {:?}\" {} {} \"{}\" \"{}\"",
            self.remote,
            date,
            self.method,
            self.uri,
            self.version,
            self.status.as_u16(),
            self.length.map_or_else(|| "-".to_string(), |n| n.to_string()),
            self.referrer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }
}

fn header(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Emits one combined-format line per request under the `access` target,
/// with method, path, status and response time as structured fields.
pub async fn access_log(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let remote = client_ip(&req);
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let referrer = header(req.headers(), REFERER);
    let user_agent = header(req.headers(), USER_AGENT);

    let res = next.run(req).await;

    let length = res
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| res.body().size_hint().exact());
    let elapsed = started.elapsed();
    let line = CombinedLine {
        remote,
        at: OffsetDateTime::now_utc(),
        method: method.clone(),
        uri: uri.clone(),
        version,
        status: res.status(),
        length,
        referrer,
        user_agent,
    };
    info!(
        target: "access",
        %method,
        path = uri.path(),
        status = res.status().as_u16(),
        response_time_ms = elapsed.as_secs_f64() * 1000.0,
        "{line}"
    );
    res
}

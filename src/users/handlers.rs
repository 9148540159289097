use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{pipeline::UrlEncodedBody, state::AppState};

use super::{dto::CreatedUserResponse, User};

pub const WELCOME: &str = "Welcome to the API Security Service!";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/users", get(list_users_html))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", get(get_user))
}

pub async fn welcome() -> &'static str {
    WELCOME
}

#[instrument(skip(state))]
pub async fn list_users_html(State(state): State<AppState>) -> Html<String> {
    let users = state.store.read().await;
    let items: String = users
        .iter()
        .map(|u| format!("<li>{}</li>", escape_html(&u.display_name())))
        .collect();
    Html(format!("\n    <ul>\n      {items}\n    </ul>"))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.store.read().await.clone())
}

/// A non-numeric id is not an error; it just matches nothing and yields `null`.
#[instrument(skip(state))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Json<Option<User>> {
    let Some(id) = parse_id(&id) else {
        debug!(%id, "non-numeric user id");
        return Json(None);
    };
    Json(state.store.find(id).await)
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    UrlEncodedBody(body): UrlEncodedBody,
) -> Json<CreatedUserResponse> {
    let appended = state.store.append(body).await;
    // The response does not wait on the file rewrite.
    state.store.persist(appended.snapshot);

    info!(
        stored_id = appended.stored_id,
        reported_id = appended.reported_id,
        "user created"
    );
    Json(CreatedUserResponse {
        status: "success",
        id: appended.reported_id,
    })
}

/// Numeric value of a path segment: decimal or `0x`/`0o`/`0b` integers,
/// with blank input reading as 0. Anything else matches no record.
fn parse_id(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    let radix = match raw.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return raw.parse::<f64>().ok().filter(|n| n.is_finite()),
    };
    let digits = &raw[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_numbers_only() {
        assert_eq!(parse_id("7"), Some(7.0));
        assert_eq!(parse_id(" 12 "), Some(12.0));
        assert_eq!(parse_id("1.0"), Some(1.0));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("inf"), None);
        assert_eq!(parse_id("NaN"), None);
    }

    #[test]
    fn parse_id_reads_radix_prefixes_and_blank_as_zero() {
        assert_eq!(parse_id("0x10"), Some(16.0));
        assert_eq!(parse_id("0X1f"), Some(31.0));
        assert_eq!(parse_id("0o7"), Some(7.0));
        assert_eq!(parse_id("0b1"), Some(1.0));
        assert_eq!(parse_id(" 0b101 "), Some(5.0));
        assert_eq!(parse_id(""), Some(0.0));
        assert_eq!(parse_id("   "), Some(0.0));
        assert_eq!(parse_id("0x"), None);
        assert_eq!(parse_id("0x+1"), None);
        assert_eq!(parse_id("0b2"), None);
        assert_eq!(parse_id("0o1.5"), None);
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
        assert_eq!(escape_html("plain"), "plain");
    }
}

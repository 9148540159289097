use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    Form,
};
use serde_json::{map::Entry, Map, Value};

use super::AppError;

/// URL-encoded request body as a key/value object.
///
/// Bodies of any other content type decode to an empty object. A key sent
/// more than once collects its values into an array.
pub struct UrlEncodedBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for UrlEncodedBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_url_encoded(req.headers()) {
            return Ok(Self(Map::new()));
        }
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
        Ok(Self(collect_fields(pairs)))
    }
}

fn is_url_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim() == "application/x-www-form-urlencoded")
        .unwrap_or(false)
}

fn collect_fields(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in pairs {
        match fields.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Value::String(value));
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(values) => values.push(Value::String(value)),
                existing => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value)]);
                }
            },
        }
    }
    fields
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the dataset: an open key/value object with at least
/// `id` and `first_name`. Key order is kept as read from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Map<String, Value>);

impl User {
    /// Submitted fields with `id` merged in; an `id` in the fields is overwritten.
    pub fn with_id(mut fields: Map<String, Value>, id: usize) -> Self {
        fields.insert("id".into(), Value::from(id));
        Self(fields)
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// Numeric comparison, so `1` and `1.0` both match id 1.
    pub fn has_id(&self, id: f64) -> bool {
        self.id().and_then(Value::as_f64) == Some(id)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Text shown for the user in the HTML listing.
    pub fn display_name(&self) -> String {
        match self.field("first_name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => "undefined".into(),
        }
    }
}

/// Response for `POST /api/users`.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub status: &'static str,
    pub id: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(v: Value) -> User {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn with_id_overrides_submitted_id() {
        let fields = json!({ "id": "99", "first_name": "Ada" });
        let Value::Object(fields) = fields else { unreachable!() };
        let u = User::with_id(fields, 7);
        assert_eq!(u.id(), Some(&json!(7)));
        assert_eq!(u.field("first_name"), Some(&json!("Ada")));
    }

    #[test]
    fn has_id_compares_numerically() {
        let u = user(json!({ "id": 3, "first_name": "Grace" }));
        assert!(u.has_id(3.0));
        assert!(!u.has_id(4.0));
        assert!(!user(json!({ "id": "3" })).has_id(3.0));
    }

    #[test]
    fn display_name_falls_back() {
        assert_eq!(user(json!({ "first_name": "Linus" })).display_name(), "Linus");
        assert_eq!(user(json!({ "first_name": 12 })).display_name(), "12");
        assert_eq!(user(json!({ "id": 1 })).display_name(), "undefined");
    }

    #[test]
    fn serializes_transparently_in_key_order() {
        let u = user(json!({ "id": 1, "first_name": "Ken", "email": "ken@example.com" }));
        let json = serde_json::to_string(&u).unwrap();
        assert_eq!(json, r#"{"id":1,"first_name":"Ken","email":"ken@example.com"}"#);
    }
}

//! HTTP response types for the InControl client.

use std::collections::HashMap;

/// An HTTP response from one of the InControl services.
///
/// Command endpoints frequently answer `204 No Content` or `200` with an empty
/// body, so `body` is `None` rather than an empty object in that case.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lower-cased name (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body, or `None` when the body was empty.
    pub body: Option<serde_json::Value>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// This ID is useful for debugging and should be included in error reports.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the body, or `Value::Null` when it was empty.
    #[must_use]
    pub fn body_or_null(&self) -> &serde_json::Value {
        self.body.as_ref().unwrap_or(&serde_json::Value::Null)
    }

    /// Consumes the response and returns its body.
    #[must_use]
    pub fn into_body(self) -> Option<serde_json::Value> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in [200, 201, 204, 299] {
            assert!(HttpResponse::new(code, HashMap::new(), None).is_ok());
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 401, 403, 404, 500, 503] {
            assert!(!HttpResponse::new(code, HashMap::new(), None).is_ok());
        }
    }

    #[test]
    fn test_request_id_extraction() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["abc-123".to_string()]);
        let response = HttpResponse::new(200, headers, None);

        assert_eq!(response.request_id(), Some("abc-123"));
        assert_eq!(response.header("X-Request-Id"), Some("abc-123"));
    }

    #[test]
    fn test_empty_body_reads_as_null() {
        let response = HttpResponse::new(204, HashMap::new(), None);
        assert!(response.body_or_null().is_null());
        assert!(response.into_body().is_none());
    }

    #[test]
    fn test_into_body_returns_json() {
        let response = HttpResponse::new(200, HashMap::new(), Some(json!({"userId": "u1"})));
        assert_eq!(response.into_body(), Some(json!({"userId": "u1"})));
    }
}

//! HTTP gateway for InControl service communication.
//!
//! This module provides the [`HttpClient`] type, the single point through
//! which every session and vehicle request reaches the network.

use std::collections::HashMap;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::headers::HeaderSet;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::InControlConfig;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for the InControl services.
///
/// The client handles:
/// - Default headers (`User-Agent`, `Accept: application/json`)
/// - Layering of base headers, body content type and per-request overrides
/// - JSON encoding and decoding
/// - Mapping non-2xx statuses to [`HttpError::Response`]
///
/// It never retries, and an empty response body is returned as `None`.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use jlr_incontrol::clients::{HttpClient, HttpMethod, HttpRequest};
/// use jlr_incontrol::InControlConfig;
///
/// let client = HttpClient::new(&InControlConfig::default())?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "https://if9.example.com/if9/jlr/users/u1")
///     .build()
///     .unwrap();
///
/// let response = client.request(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Default headers to include in all requests.
    default_headers: HeaderSet,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (for example, TLS initialization failure).
    pub fn new(config: &InControlConfig) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}jlr-incontrol v{SDK_VERSION}");

        let default_headers = HeaderSet::new()
            .with("User-Agent", user_agent)
            .with("Accept", "application/json");

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            default_headers,
        })
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HeaderSet {
        &self.default_headers
    }

    /// Sends an HTTP request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - A network error or timeout occurs (`Network`)
    /// - A non-2xx response is received (`Response`)
    /// - A 2xx response has a body that is not JSON (`Decode`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let headers = request.effective_headers(&self.default_headers);

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in headers.iter() {
            req_builder = req_builder.header(key, value);
        }

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_string());
        }

        tracing::debug!(method = %request.http_method, url = %request.url, "sending request");

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;

        tracing::debug!(status = code, url = %request.url, "received response");

        if (200..=299).contains(&code) {
            let body = if body_text.trim().is_empty() {
                None
            } else {
                Some(
                    serde_json::from_str(&body_text).map_err(|source| HttpError::Decode {
                        url: request.url.clone(),
                        source,
                    })?,
                )
            };
            return Ok(HttpResponse::new(code, res_headers, body));
        }

        // Error bodies are not always JSON; keep the raw text for the message
        let body = if body_text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(&body_text)
                    .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text })),
            )
        };
        let response = HttpResponse::new(code, res_headers, body);

        Err(HttpError::Response(HttpResponseError {
            code,
            message: Self::serialize_error(&response),
            error_reference: response.request_id().map(String::from),
        }))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Serializes an error response into a compact JSON message.
    fn serialize_error(response: &HttpResponse) -> String {
        let body = response.body_or_null();
        let mut error_body = serde_json::Map::new();

        for key in ["errorLabel", "errorDescription", "error", "error_description", "raw_body"] {
            if let Some(value) = body.get(key) {
                error_body.insert(key.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

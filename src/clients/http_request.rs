//! HTTP request types for the InControl client.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! constructing requests to the InControl services.

use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::headers::HeaderSet;

/// HTTP methods used by the InControl API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for tokens, registrations and commands.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// Content type for HTTP request bodies.
///
/// The platform versions its payloads through vendor media types, so most
/// command bodies use [`DataType::Vendor`] with one of the constants from
/// [`crate::vehicle::media_types`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// Plain JSON content type (`application/json`).
    Json,
    /// A vendor media type, sent verbatim.
    Vendor(&'static str),
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Vendor(media_type) => *media_type,
        }
    }
}

/// An HTTP request to be sent through [`crate::clients::HttpClient`].
///
/// Headers are layered at send time: client defaults, then `base_headers`
/// (usually the session header set), then the body content type, then
/// `extra_headers`. None of the layers is modified by sending.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::clients::{DataType, HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "https://example.com/tokens")
///     .body(json!({"grant_type": "password"}))
///     .body_type(DataType::Json)
///     .header("X-Device-Id", "device-1")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.extra_headers.get("x-device-id"), Some("device-1"));
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute URL for this request.
    pub url: String,
    /// The request body, if any.
    pub body: Option<serde_json::Value>,
    /// The content type of the body.
    pub body_type: Option<DataType>,
    /// Query parameters to append to the URL.
    pub query: Vec<(String, String)>,
    /// Shared base headers, copied into the request at send time.
    pub base_headers: Option<HeaderSet>,
    /// Per-request header overrides.
    pub extra_headers: HeaderSet,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `body` is `Some` but `body_type` is `None`
    /// - `http_method` is `Post` but `body` is `None`
    /// - `url` is not absolute
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(InvalidHttpRequestError::RelativeUrl {
                url: self.url.clone(),
            });
        }

        if self.body.is_some() && self.body_type.is_none() {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }

        if self.http_method == HttpMethod::Post && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }

    /// Returns the headers this request is sent with, on top of `defaults`.
    #[must_use]
    pub fn effective_headers(&self, defaults: &HeaderSet) -> HeaderSet {
        let mut headers = match &self.base_headers {
            Some(base) => defaults.merged(base),
            None => defaults.clone(),
        };
        if let Some(body_type) = &self.body_type {
            headers.insert("Content-Type", body_type.as_content_type());
        }
        headers.merged(&self.extra_headers)
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    url: String,
    body: Option<serde_json::Value>,
    body_type: Option<DataType>,
    query: Vec<(String, String)>,
    base_headers: Option<HeaderSet>,
    extra_headers: HeaderSet,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            http_method: method,
            url: url.into(),
            body: None,
            body_type: None,
            query: Vec::new(),
            base_headers: None,
            extra_headers: HeaderSet::new(),
        }
    }

    /// Sets the request body.
    ///
    /// When setting a body, you must also set the body type via [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub const fn body_type(mut self, body_type: DataType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the base header layer.
    #[must_use]
    pub fn base_headers(mut self, headers: HeaderSet) -> Self {
        self.base_headers = Some(headers);
        self
    }

    /// Adds a single header override.
    #[must_use]
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key, value);
        self
    }

    /// Sets the `Accept` header override.
    #[must_use]
    pub fn accept(self, media_type: &str) -> Self {
        self.header("Accept", media_type)
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            url: self.url,
            body: self.body,
            body_type: self.body_type,
            query: self.query,
            base_headers: self.base_headers,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}

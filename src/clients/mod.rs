//! HTTP gateway types for InControl service communication.
//!
//! This module provides the transport layer every session and vehicle call
//! goes through. It builds requests against absolute URLs, layers headers,
//! encodes JSON bodies and maps failures into [`HttpError`].
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client
//! - [`HttpRequest`]: A request to be sent
//! - [`HttpResponse`]: A parsed response
//! - [`HeaderSet`]: An immutable, case-insensitive header map
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST)
//! - [`DataType`]: Content types for request bodies
//!
//! # Header layering
//!
//! Headers are merged in this order, later layers winning:
//!
//! 1. client defaults (`User-Agent`, `Accept: application/json`)
//! 2. the request's base headers (usually the session headers)
//! 3. `Content-Type` from the request's [`DataType`]
//! 4. the request's explicit overrides
//!
//! No layer is modified by a request, so concurrent calls with different
//! media types never see each other's headers.
//!
//! # Retry Behavior
//!
//! None. Vehicle commands are not idempotent, so a failed exchange is
//! reported to the caller as-is.

mod errors;
mod headers;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use headers::HeaderSet;
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;

//! Session and service authentication errors.
//!
//! # Error Types
//!
//! - [`AuthError`]: the session could not be established or refreshed
//! - [`ServiceAuthError`]: a per-command service token could not be obtained
//!
//! Neither is retried internally. After an [`AuthError`] the session is
//! unauthenticated until the next successful [`connect`].
//!
//! [`connect`]: crate::auth::AuthSession::connect

use thiserror::Error;

use crate::auth::service::ServiceName;
use crate::clients::HttpError;

/// Errors raised while connecting or refreshing a session.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::auth::AuthError;
///
/// let error = AuthError::Rejected {
///     endpoint: "tokens",
///     status: 401,
///     message: "{}".to_string(),
/// };
/// assert!(error.to_string().contains("401"));
/// ```
#[derive(Debug, Error)]
pub enum AuthError {
    /// The platform answered a session call with a non-2xx status.
    #[error("Authentication rejected by {endpoint} (HTTP {status}): {message}")]
    Rejected {
        /// The session step that failed (`tokens`, `clients`, `users`).
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
        /// Serialized error body.
        message: String,
    },

    /// An authenticated operation was attempted before `connect()`.
    #[error("Session is not connected. Call connect() first.")]
    NotConnected,

    /// A session call succeeded but its body lacked required fields.
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// The session step that failed.
        endpoint: &'static str,
        /// What was wrong with the body.
        reason: String,
    },

    /// Network, timeout or decoding failure.
    #[error(transparent)]
    Transport(HttpError),
}

impl AuthError {
    /// Maps a transport error from a session step, splitting status
    /// rejections from connectivity failures.
    pub(crate) fn from_http(endpoint: &'static str, error: HttpError) -> Self {
        match error {
            HttpError::Response(e) => Self::Rejected {
                endpoint,
                status: e.code,
                message: e.message,
            },
            other => Self::Transport(other),
        }
    }
}

/// Errors raised while obtaining a service token.
#[derive(Debug, Error)]
pub enum ServiceAuthError {
    /// The service needs the personal PIN and none was given.
    #[error("Service {service} requires a PIN")]
    PinRequired {
        /// The service that was requested.
        service: ServiceName,
    },

    /// The platform refused the secret presented for the service.
    #[error("Service {service} authentication rejected (HTTP {status}): {message}")]
    Rejected {
        /// The service that was requested.
        service: ServiceName,
        /// HTTP status code.
        status: u16,
        /// Serialized error body.
        message: String,
    },

    /// The authenticate call succeeded but did not return a JSON object.
    #[error("Malformed service token for {service}: {reason}")]
    MalformedResponse {
        /// The service that was requested.
        service: ServiceName,
        /// What was wrong with the body.
        reason: String,
    },

    /// The session could not provide valid headers.
    #[error(transparent)]
    Session(#[from] AuthError),

    /// Network, timeout or decoding failure.
    #[error(transparent)]
    Transport(HttpError),
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
    assert_send_sync::<ServiceAuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponseError, InvalidHttpRequestError};

    #[test]
    fn test_from_http_maps_status_to_rejected() {
        let error = AuthError::from_http(
            "tokens",
            HttpError::Response(HttpResponseError {
                code: 401,
                message: r#"{"error":"invalid_grant"}"#.to_string(),
                error_reference: None,
            }),
        );

        assert!(matches!(
            error,
            AuthError::Rejected { endpoint: "tokens", status: 401, .. }
        ));
    }

    #[test]
    fn test_from_http_keeps_other_failures_as_transport() {
        let error = AuthError::from_http(
            "users",
            HttpError::InvalidRequest(InvalidHttpRequestError::MissingBodyType),
        );
        assert!(matches!(error, AuthError::Transport(_)));
    }

    #[test]
    fn test_pin_required_message_names_service() {
        let error = ServiceAuthError::PinRequired {
            service: ServiceName::Rdl,
        };
        assert_eq!(error.to_string(), "Service RDL requires a PIN");
    }
}

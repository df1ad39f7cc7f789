//! Errors for vehicle reads and commands.

use thiserror::Error;

use crate::auth::{AuthError, ServiceAuthError};
use crate::clients::{HttpError, InvalidHttpRequestError};

/// Errors that can occur while reading from or commanding a vehicle.
///
/// A failed service authentication always stops the command before it is
/// sent, and surfaces as [`CommandError::ServiceAuth`].
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::vehicle::CommandError;
///
/// let error = CommandError::InvalidParameter {
///     reason: "max state of charge must be between 0 and 100".to_string(),
/// };
/// assert!(error.to_string().contains("between 0 and 100"));
/// ```
#[derive(Debug, Error)]
pub enum CommandError {
    /// The session could not provide valid headers.
    #[error(transparent)]
    Session(#[from] AuthError),

    /// The service token could not be obtained.
    #[error(transparent)]
    ServiceAuth(#[from] ServiceAuthError),

    /// The platform refused the command itself (401/403).
    ///
    /// This is what a service token issued for the wrong secret kind leads to.
    #[error("Command '{command}' was not authorized (HTTP {status}): {message}")]
    Unauthorized {
        /// The command or resource that was refused.
        command: String,
        /// HTTP status code.
        status: u16,
        /// Serialized error body.
        message: String,
    },

    /// A parameter failed client-side validation; nothing was sent.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong.
        reason: String,
    },

    /// Network, timeout, decoding or other non-2xx failure.
    #[error(transparent)]
    Transport(#[from] HttpError),
}

impl CommandError {
    pub(crate) fn from_http(command: &str, error: HttpError) -> Self {
        match error {
            HttpError::Response(e) if e.code == 401 || e.code == 403 => Self::Unauthorized {
                command: command.to_string(),
                status: e.code,
                message: e.message,
            },
            other => Self::Transport(other),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

impl From<InvalidHttpRequestError> for CommandError {
    fn from(error: InvalidHttpRequestError) -> Self {
        Self::Transport(error.into())
    }
}

// Verify CommandError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CommandError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpResponseError;

    fn response_error(code: u16) -> HttpError {
        HttpError::Response(HttpResponseError {
            code,
            message: "{}".to_string(),
            error_reference: None,
        })
    }

    #[test]
    fn test_401_and_403_are_unauthorized() {
        for code in [401, 403] {
            let error = CommandError::from_http("lock", response_error(code));
            assert!(matches!(
                error,
                CommandError::Unauthorized { ref command, status, .. } if command == "lock" && status == code
            ));
        }
    }

    #[test]
    fn test_other_statuses_stay_transport() {
        let error = CommandError::from_http("lock", response_error(500));
        assert!(matches!(error, CommandError::Transport(HttpError::Response(_))));
    }

    #[test]
    fn test_invalid_request_converts_to_transport() {
        let error: CommandError = InvalidHttpRequestError::MissingBodyType.into();
        assert!(matches!(error, CommandError::Transport(HttpError::InvalidRequest(_))));
    }
}

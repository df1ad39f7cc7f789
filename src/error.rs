//! Error types for the InControl client.
//!
//! This module contains the configuration and validation errors shared by
//! the config builder and the validated newtypes. Protocol errors live next
//! to the layer that produces them:
//!
//! - [`crate::clients::HttpError`] for transport failures
//! - [`crate::auth::AuthError`] for session authentication failures
//! - [`crate::auth::ServiceAuthError`] for per-command service authentication
//! - [`crate::vehicle::CommandError`] for vehicle reads and commands
//!
//! # Example
//!
//! ```rust
//! use jlr_incontrol::{ConfigError, Pin};
//!
//! let result = Pin::new("12a4");
//! assert!(matches!(result, Err(ConfigError::InvalidPin)));
//! ```

use thiserror::Error;

/// Errors that can occur while building configuration or validated values.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Email address is empty or malformed.
    #[error("Invalid email address '{email}'. Expected the address of an InControl account.")]
    InvalidEmail {
        /// The invalid email that was provided.
        email: String,
    },

    /// Password cannot be empty.
    #[error("Password cannot be empty. Please provide the InControl account password.")]
    EmptyPassword,

    /// Refresh token cannot be empty.
    #[error("Refresh token cannot be empty.")]
    EmptyRefreshToken,

    /// PIN is empty or contains non-digit characters.
    #[error("Invalid PIN. The personal PIN must be a non-empty string of digits.")]
    InvalidPin,

    /// VIN is malformed.
    #[error("Invalid VIN '{vin}'. Expected 17 alphanumeric characters.")]
    InvalidVin {
        /// The invalid VIN that was provided.
        vin: String,
    },

    /// Device id cannot be empty.
    #[error("Device id cannot be empty. Omit it to have one generated.")]
    EmptyDeviceId,

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide a URL with scheme and host (e.g., 'https://if9.prod-row.jlrmotor.com/if9/jlr').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// OAuth client id or secret is empty.
    #[error("OAuth client id and secret cannot be empty.")]
    EmptyClientCredentials,

    /// Transport timeout must be non-zero.
    #[error("Timeout must be greater than zero.")]
    ZeroTimeout,
}

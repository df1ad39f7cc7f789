//! Account credentials and the OAuth grant built from them.

use std::fmt;

use serde::Serialize;

use crate::config::{DeviceId, Email, Password};
use crate::error::ConfigError;

/// How the session obtains its first token set.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// `grant_type=password` with the account password.
    Password(Password),
    /// `grant_type=refresh_token` with a previously issued refresh token.
    RefreshToken(String),
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Grant::Password(*****)"),
            Self::RefreshToken(_) => f.write_str("Grant::RefreshToken(*****)"),
        }
    }
}

/// Body of a token service request.
#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub(crate) enum GrantRequest<'a> {
    Password {
        username: &'a str,
        password: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
    },
}

impl Grant {
    pub(crate) fn request<'a>(&'a self, email: &'a Email) -> GrantRequest<'a> {
        match self {
            Self::Password(password) => GrantRequest::Password {
                username: email.as_ref(),
                password: password.as_ref(),
            },
            Self::RefreshToken(token) => GrantRequest::RefreshToken {
                refresh_token: token,
            },
        }
    }
}

/// The credentials a session is bootstrapped from.
///
/// A device id is generated at construction unless one is supplied with
/// [`device_id`](Self::device_id). It is reused for every registration the
/// session performs.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::{Credentials, DeviceId, Email, Password};
///
/// let credentials = Credentials::with_password(
///     Email::new("driver@example.com").unwrap(),
///     Password::new("secret").unwrap(),
/// )
/// .device_id(DeviceId::new("bridge-01").unwrap());
///
/// assert_eq!(credentials.device().as_ref(), "bridge-01");
/// ```
#[derive(Clone, Debug)]
pub struct Credentials {
    email: Email,
    grant: Grant,
    device_id: DeviceId,
}

impl Credentials {
    /// Credentials using the account password.
    #[must_use]
    pub fn with_password(email: Email, password: Password) -> Self {
        Self {
            email,
            grant: Grant::Password(password),
            device_id: DeviceId::generate(),
        }
    }

    /// Credentials using a refresh token saved from an earlier session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRefreshToken`] if the token is empty.
    pub fn with_refresh_token(
        email: Email,
        refresh_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let refresh_token: String = refresh_token.into();
        if refresh_token.trim().is_empty() {
            return Err(ConfigError::EmptyRefreshToken);
        }
        Ok(Self {
            email,
            grant: Grant::RefreshToken(refresh_token),
            device_id: DeviceId::generate(),
        })
    }

    /// Uses a fixed device id instead of a generated one.
    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = device_id;
        self
    }

    /// Returns the account email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the grant.
    #[must_use]
    pub const fn grant(&self) -> &Grant {
        &self.grant
    }

    /// Returns the device id.
    #[must_use]
    pub const fn device(&self) -> &DeviceId {
        &self.device_id
    }

    pub(crate) fn into_parts(self) -> (Email, Grant, DeviceId) {
        (self.email, self.grant, self.device_id)
    }
}

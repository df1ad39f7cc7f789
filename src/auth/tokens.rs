//! Bearer token storage and expiry.
//!
//! [`TokenSet`] is plain data: the tokens returned by the token service and
//! the instant they stop being usable. It is owned by [`AuthSession`] and
//! only ever replaced as a whole.
//!
//! [`AuthSession`]: crate::auth::AuthSession

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

/// Raw response from the token service.
///
/// The platform sends `expires_in` as a string (`"86400"`); a plain number
/// is accepted too.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// Token used for the next `refresh_token` grant.
    pub refresh_token: String,
    /// Token presented to the device registration service.
    pub authorization_token: String,
    /// Lifetime of the access token in seconds.
    #[serde(deserialize_with = "deserialize_seconds")]
    pub expires_in: i64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"*****")
            .field("refresh_token", &"*****")
            .field("authorization_token", &"*****")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(i64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid expires_in '{s}'"))),
    }
}

/// A token lifetime that cannot be represented as an expiration instant.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("expires_in of {expires_in} seconds is out of range")]
pub struct TokenLifetimeError {
    /// The lifetime the server sent.
    pub expires_in: i64,
}

/// The tokens of an authenticated session and their expiration.
///
/// Expiration is computed locally as `issued_at + expires_in`; server clock
/// skew is not compensated.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use jlr_incontrol::auth::{TokenResponse, TokenSet};
///
/// let response: TokenResponse = serde_json::from_str(
///     r#"{"access_token":"a","refresh_token":"r","authorization_token":"z","expires_in":"3600"}"#,
/// ).unwrap();
///
/// let now = Utc::now();
/// let tokens = TokenSet::from_response(response, now).unwrap();
///
/// assert!(!tokens.expired_at(now));
/// assert!(tokens.expired_at(now + Duration::seconds(3600)));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
    access_token: String,
    refresh_token: String,
    authorization_token: String,
    expires_in: i64,
    expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Builds a token set from a token service response received at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenLifetimeError`] if `now + expires_in` does not fit in a
    /// timestamp.
    pub fn from_response(
        response: TokenResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, TokenLifetimeError> {
        let expires_in = response.expires_in.max(0);
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenLifetimeError { expires_in })?;

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            authorization_token: response.authorization_token,
            expires_in,
            expires_at,
        })
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Returns the authorization token used for device registration.
    #[must_use]
    pub fn authorization_token(&self) -> &str {
        &self.authorization_token
    }

    /// Returns the lifetime the server granted, in seconds.
    #[must_use]
    pub const fn expires_in(&self) -> i64 {
        self.expires_in
    }

    /// Returns when the access token expires.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` if the tokens are no longer usable at `now`.
    #[must_use]
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the tokens are no longer usable.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expired_at(Utc::now())
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"*****")
            .field("refresh_token", &"*****")
            .field("authorization_token", &"*****")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: &str) -> TokenResponse {
        serde_json::from_str(&format!(
            r#"{{"access_token":"access","refresh_token":"refresh","authorization_token":"authz","expires_in":"{expires_in}"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_expires_in_accepts_string_and_number() {
        assert_eq!(response("86400").expires_in, 86400);

        let numeric: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","authorization_token":"z","expires_in":60}"#,
        )
        .unwrap();
        assert_eq!(numeric.expires_in, 60);
    }

    #[test]
    fn test_invalid_expires_in_is_rejected() {
        let result: Result<TokenResponse, _> = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","authorization_token":"z","expires_in":"soon"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expiration_is_now_plus_expires_in() {
        let now = Utc::now();
        let tokens = TokenSet::from_response(response("3600"), now).unwrap();

        assert_eq!(tokens.expires_at(), now + Duration::seconds(3600));
        assert_eq!(tokens.access_token(), "access");
        assert_eq!(tokens.refresh_token(), "refresh");
        assert_eq!(tokens.authorization_token(), "authz");
    }

    #[test]
    fn test_expired_at_boundary() {
        let now = Utc::now();
        let tokens = TokenSet::from_response(response("10"), now).unwrap();

        assert!(!tokens.expired_at(now + Duration::seconds(9)));
        assert!(tokens.expired_at(now + Duration::seconds(10)));
        assert!(tokens.expired_at(now + Duration::seconds(11)));
    }

    #[test]
    fn test_zero_lifetime_is_expired_immediately() {
        let tokens = TokenSet::from_response(response("0"), Utc::now()).unwrap();
        assert!(tokens.expired());
    }

    #[test]
    fn test_unrepresentable_lifetime_is_an_error() {
        let result = TokenSet::from_response(response("10000000000000"), Utc::now());
        assert_eq!(
            result,
            Err(TokenLifetimeError {
                expires_in: 10_000_000_000_000
            })
        );

        let result = TokenSet::from_response(response(&i64::MAX.to_string()), Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_lifetime_is_expired_immediately() {
        let tokens = TokenSet::from_response(response("-30"), Utc::now()).unwrap();
        assert_eq!(tokens.expires_in(), 0);
        assert!(tokens.expired());
    }

    #[test]
    fn test_debug_masks_tokens() {
        let tokens = TokenSet::from_response(response("60"), Utc::now()).unwrap();
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("access\""));
        assert!(!debug.contains("refresh\""));
        assert!(debug.contains("*****"));
    }
}

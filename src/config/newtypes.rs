//! Validated newtype wrappers for configuration and protocol values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error
//! messages. Secrets mask their contents in `Debug` output.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated InControl account email address.
///
/// The email is both the OAuth username and the scope for device
/// registration and user login.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::Email;
///
/// let email = Email::new("driver@example.com").unwrap();
/// assert_eq!(email.as_ref(), "driver@example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Creates a new validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEmail`] if the value is empty or has no
    /// local part and domain around an `@`.
    pub fn new(email: impl Into<String>) -> Result<Self, ConfigError> {
        let email: String = email.into();
        let email = email.trim().to_string();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(ConfigError::InvalidEmail { email });
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated InControl account password.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `Password(*****)`.
///
/// ```rust
/// use jlr_incontrol::Password;
///
/// let password = Password::new("hunter2").unwrap();
/// assert_eq!(format!("{:?}", password), "Password(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Creates a new validated password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPassword`] if the password is empty.
    pub fn new(password: impl Into<String>) -> Result<Self, ConfigError> {
        let password = password.into();
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        Ok(Self(password))
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}

/// The personal PIN required by PIN-protected vehicle services.
///
/// # Security
///
/// The `Debug` implementation masks the value.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::Pin;
///
/// let pin = Pin::new("1234").unwrap();
/// assert_eq!(pin.as_ref(), "1234");
/// assert_eq!(format!("{:?}", pin), "Pin(****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Creates a new validated PIN.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPin`] if the PIN is empty or contains
    /// anything other than ASCII digits.
    pub fn new(pin: impl Into<String>) -> Result<Self, ConfigError> {
        let pin = pin.into();
        if pin.is_empty() || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidPin);
        }
        Ok(Self(pin))
    }
}

impl AsRef<str> for Pin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

impl<'de> Deserialize<'de> for Pin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated vehicle identification number.
///
/// VINs are normalized to upper case. Besides keying the vehicle resource
/// paths, the last four characters serve as the secret for VIN-derived
/// service authentication.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::Vin;
///
/// let vin = Vin::new("sadha2b10k1a12345").unwrap();
/// assert_eq!(vin.as_ref(), "SADHA2B10K1A12345");
/// assert_eq!(vin.last_four(), "2345");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vin(String);

impl Vin {
    const LENGTH: usize = 17;

    /// Creates a new validated VIN.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVin`] unless the value is exactly 17
    /// ASCII alphanumeric characters.
    pub fn new(vin: impl Into<String>) -> Result<Self, ConfigError> {
        let vin: String = vin.into();
        let vin = vin.trim().to_ascii_uppercase();
        if vin.len() != Self::LENGTH || !vin.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidVin { vin });
        }
        Ok(Self(vin))
    }

    /// Returns the last four characters of the VIN.
    #[must_use]
    pub fn last_four(&self) -> &str {
        &self.0[Self::LENGTH - 4..]
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Vin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Vin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// The device identity registered with the platform for this client.
///
/// A device id must stay stable for the lifetime of a session: every
/// registration with a new id leaves an orphaned device behind on the
/// server.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::DeviceId;
///
/// let generated = DeviceId::generate();
/// assert_eq!(generated.as_ref().len(), 36);
///
/// let fixed = DeviceId::new("my-device").unwrap();
/// assert_eq!(fixed.as_ref(), "my-device");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device id from a previously stored value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyDeviceId`] if the value is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigError::EmptyDeviceId);
        }
        Ok(Self(id))
    }

    /// Generates a fresh random device id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated service root URL (e.g. `https://if9.prod-row.jlrmotor.com/if9/jlr`).
///
/// Trailing slashes are trimmed so paths can be joined with a single `/`.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::BaseUrl;
///
/// let url = BaseUrl::new("https://if9.prod-row.jlrmotor.com/if9/jlr/").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "if9.prod-row.jlrmotor.com");
/// assert_eq!(url.join("users"), "https://if9.prod-row.jlrmotor.com/if9/jlr/users");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL has no scheme or host,
    /// or carries a query string or fragment.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidBaseUrl { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        if url.contains(['?', '#']) {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(invalid());
        }

        // Host ends at port, path, or end of string
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/'])
            .map_or(url.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid());
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Joins a relative path onto this root.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

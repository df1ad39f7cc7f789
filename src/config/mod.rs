//! Configuration types for the InControl client.
//!
//! This module provides the configuration used to reach the three InControl
//! service roots and the validated values the protocol exchanges.
//!
//! # Overview
//!
//! - [`InControlConfig`]: The main configuration struct
//! - [`InControlConfigBuilder`]: A builder for constructing [`InControlConfig`] instances
//! - [`BaseUrl`]: A validated service root URL
//! - [`Email`], [`Password`], [`Pin`], [`Vin`], [`DeviceId`]: Validated protocol values
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use jlr_incontrol::InControlConfig;
//!
//! let config = InControlConfig::builder()
//!     .timeout(Duration::from_secs(30))
//!     .user_agent_prefix("HomeBridge/2.1")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.basic_authorization(), "Basic YXM6YXNwYXNz");
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, DeviceId, Email, Password, Pin, Vin};

use std::time::Duration;

use base64::Engine;

use crate::error::ConfigError;

/// Production root of the token service.
pub const DEFAULT_IFAS_BASE_URL: &str = "https://ifas.prod-row.jlrmotor.com/ifas/jlr";

/// Production root of the device registration service.
pub const DEFAULT_IFOP_BASE_URL: &str = "https://ifop.prod-row.jlrmotor.com/ifop/jlr";

/// Production root of the user and vehicle service.
pub const DEFAULT_IF9_BASE_URL: &str = "https://if9.prod-row.jlrmotor.com/if9/jlr";

const DEFAULT_CLIENT_ID: &str = "as";
const DEFAULT_CLIENT_SECRET: &str = "aspass";

/// Configuration for the InControl client.
///
/// # Thread Safety
///
/// `InControlConfig` is `Clone`, `Send`, and `Sync`.
///
/// # Logging
///
/// The library never installs a global subscriber. Every session operation
/// runs inside [`log_span`](Self::log_span); by default that span is
/// disabled, so events attach to whatever span the caller is in.
#[derive(Clone, Debug)]
pub struct InControlConfig {
    ifas_base_url: BaseUrl,
    ifop_base_url: BaseUrl,
    if9_base_url: BaseUrl,
    client_id: String,
    client_secret: String,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    log_span: tracing::Span,
}

impl InControlConfig {
    /// Creates a new builder for constructing an `InControlConfig`.
    #[must_use]
    pub fn builder() -> InControlConfigBuilder {
        InControlConfigBuilder::new()
    }

    /// Returns the token service root.
    #[must_use]
    pub const fn ifas_base_url(&self) -> &BaseUrl {
        &self.ifas_base_url
    }

    /// Returns the device registration service root.
    #[must_use]
    pub const fn ifop_base_url(&self) -> &BaseUrl {
        &self.ifop_base_url
    }

    /// Returns the user and vehicle service root.
    #[must_use]
    pub const fn if9_base_url(&self) -> &BaseUrl {
        &self.if9_base_url
    }

    /// Returns the fixed `Authorization` value sent to the token service.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    /// Returns the transport timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the span session operations are recorded in.
    #[must_use]
    pub const fn log_span(&self) -> &tracing::Span {
        &self.log_span
    }
}

impl Default for InControlConfig {
    fn default() -> Self {
        Self {
            ifas_base_url: production_url(DEFAULT_IFAS_BASE_URL),
            ifop_base_url: production_url(DEFAULT_IFOP_BASE_URL),
            if9_base_url: production_url(DEFAULT_IF9_BASE_URL),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            timeout: None,
            user_agent_prefix: None,
            log_span: tracing::Span::none(),
        }
    }
}

fn production_url(url: &'static str) -> BaseUrl {
    match BaseUrl::new(url) {
        Ok(url) => url,
        Err(e) => unreachable!("built-in base url is valid: {e}"),
    }
}

// Verify InControlConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InControlConfig>();
};

/// Builder for constructing [`InControlConfig`] instances.
///
/// Every field has a default, so `InControlConfig::builder().build()` yields
/// a configuration for the production platform.
///
/// # Defaults
///
/// - service roots: the production `ifas`, `ifop` and `if9` roots
/// - client credentials: the platform's public `as` / `aspass` pair
/// - `timeout`: `None` (reqwest default)
/// - `user_agent_prefix`: `None`
/// - `log_span`: disabled span (events attach to the caller's context)
#[derive(Debug, Default)]
pub struct InControlConfigBuilder {
    ifas_base_url: Option<BaseUrl>,
    ifop_base_url: Option<BaseUrl>,
    if9_base_url: Option<BaseUrl>,
    client_credentials: Option<(String, String)>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    log_span: Option<tracing::Span>,
}

impl InControlConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the token service root.
    #[must_use]
    pub fn ifas_base_url(mut self, url: BaseUrl) -> Self {
        self.ifas_base_url = Some(url);
        self
    }

    /// Overrides the device registration service root.
    #[must_use]
    pub fn ifop_base_url(mut self, url: BaseUrl) -> Self {
        self.ifop_base_url = Some(url);
        self
    }

    /// Overrides the user and vehicle service root.
    #[must_use]
    pub fn if9_base_url(mut self, url: BaseUrl) -> Self {
        self.if9_base_url = Some(url);
        self
    }

    /// Overrides the OAuth client id and secret used for the Basic header.
    #[must_use]
    pub fn client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_credentials = Some((client_id.into(), client_secret.into()));
        self
    }

    /// Sets the transport timeout applied to every request.
    ///
    /// A request that exceeds it fails with a network error; nothing from
    /// the cancelled exchange is kept.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the span every session operation is instrumented with.
    #[must_use]
    pub fn log_span(mut self, span: tracing::Span) -> Self {
        self.log_span = Some(span);
        self
    }

    /// Builds the [`InControlConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientCredentials`] if an overridden client
    /// id or secret is empty, or [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn build(self) -> Result<InControlConfig, ConfigError> {
        let defaults = InControlConfig::default();

        let (client_id, client_secret) = match self.client_credentials {
            Some((id, secret)) if id.is_empty() || secret.is_empty() => {
                return Err(ConfigError::EmptyClientCredentials);
            }
            Some(pair) => pair,
            None => (defaults.client_id, defaults.client_secret),
        };

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(InControlConfig {
            ifas_base_url: self.ifas_base_url.unwrap_or(defaults.ifas_base_url),
            ifop_base_url: self.ifop_base_url.unwrap_or(defaults.ifop_base_url),
            if9_base_url: self.if9_base_url.unwrap_or(defaults.if9_base_url),
            client_id,
            client_secret,
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
            log_span: self.log_span.unwrap_or(defaults.log_span),
        })
    }
}

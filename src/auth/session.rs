//! The authenticated API session.
//!
//! [`AuthSession`] owns the bootstrap sequence every InControl client runs:
//!
//! 1. exchange the grant for a [`TokenSet`] at the token service
//! 2. register the device id with the registration service
//! 3. resolve the account's user id through the login endpoint
//!
//! The same sequence, with a `refresh_token` grant, runs again whenever the
//! access token has expired. Callers never handle expiry themselves: every
//! authenticated request goes through [`AuthSession::ensure_valid`].
//!
//! # State
//!
//! ```text
//! Unauthenticated --connect--> Authenticated --expiry--> Expired
//!        ^                                                  |
//!        +--------- refresh fails ---- ensure_valid --------+--> Authenticated
//! ```
//!
//! # Concurrency
//!
//! State lives behind an async mutex that is held for the whole refresh, so
//! concurrent callers that find the session expired wait for one refresh and
//! then all observe the same new token generation.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::auth::credentials::{Credentials, Grant};
use crate::auth::error::AuthError;
use crate::auth::tokens::{TokenResponse, TokenSet};
use crate::clients::{DataType, HeaderSet, HttpClient, HttpMethod, HttpRequest};
use crate::config::{DeviceId, Email, InControlConfig};
use crate::vehicle::media_types;

/// Lifetime requested for a device registration, in seconds.
const DEVICE_REGISTRATION_TTL: &str = "86400";

/// The canonical header set of an authenticated session.
///
/// Contains `Authorization: Bearer <access_token>`, `X-Device-Id` and
/// `Content-Type: application/json`. The set is shared and immutable;
/// per-request variations are produced with [`with_overrides`](Self::with_overrides).
#[derive(Clone, PartialEq, Eq)]
pub struct SessionHeaders(Arc<HeaderSet>);

impl SessionHeaders {
    fn new(access_token: &str, device_id: &DeviceId) -> Self {
        Self(Arc::new(
            HeaderSet::new()
                .with("Authorization", format!("Bearer {access_token}"))
                .with("X-Device-Id", device_id.as_ref())
                .with("Content-Type", DataType::Json.as_content_type()),
        ))
    }

    /// Returns the value of a header, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name)
    }

    /// Returns a copy of the header set.
    #[must_use]
    pub fn to_header_set(&self) -> HeaderSet {
        HeaderSet::clone(&self.0)
    }

    /// Returns a new header set with `overrides` applied on top.
    #[must_use]
    pub fn with_overrides(&self, overrides: &HeaderSet) -> HeaderSet {
        self.0.merged(overrides)
    }
}

impl fmt::Debug for SessionHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// The account identity resolved at login.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "userId")]
    user_id: String,
}

impl UserIdentity {
    /// Returns the platform user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// A snapshot of valid session credentials for one request.
#[derive(Clone, Debug)]
pub struct ActiveSession {
    headers: SessionHeaders,
    user: UserIdentity,
}

impl ActiveSession {
    /// Returns the session headers.
    #[must_use]
    pub const fn headers(&self) -> &SessionHeaders {
        &self.headers
    }

    /// Returns the resolved user.
    #[must_use]
    pub const fn user(&self) -> &UserIdentity {
        &self.user
    }
}

struct Authenticated {
    tokens: TokenSet,
    headers: SessionHeaders,
    user: UserIdentity,
}

impl Authenticated {
    fn active(&self) -> ActiveSession {
        ActiveSession {
            headers: self.headers.clone(),
            user: self.user.clone(),
        }
    }
}

struct SessionState {
    grant: Grant,
    auth: Option<Authenticated>,
}

/// An InControl API session for one set of credentials.
///
/// # Thread Safety
///
/// `AuthSession` is `Send + Sync` and is normally shared as `Arc<AuthSession>`.
///
/// # Example
///
/// ```rust,ignore
/// use jlr_incontrol::{AuthSession, Credentials, Email, InControlConfig, Password};
///
/// let credentials = Credentials::with_password(
///     Email::new("driver@example.com")?,
///     Password::new("secret")?,
/// );
/// let session = AuthSession::new(InControlConfig::default(), credentials)?;
/// session.connect().await?;
///
/// let active = session.ensure_valid().await?;
/// println!("user id: {}", active.user().user_id());
/// ```
pub struct AuthSession {
    http: HttpClient,
    config: InControlConfig,
    email: Email,
    device_id: DeviceId,
    state: Mutex<SessionState>,
}

// Verify AuthSession is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthSession>();
};

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("email", &self.email)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Creates an unauthenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: InControlConfig, credentials: Credentials) -> Result<Self, AuthError> {
        let http = HttpClient::new(&config).map_err(AuthError::Transport)?;
        let (email, grant, device_id) = credentials.into_parts();

        Ok(Self {
            http,
            config,
            email,
            device_id,
            state: Mutex::new(SessionState { grant, auth: None }),
        })
    }

    /// Authenticates with the stored grant, registers the device and logs in.
    ///
    /// Calling `connect` on an authenticated session starts a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] if any step answers non-2xx; the
    /// session is left unauthenticated.
    pub async fn connect(&self) -> Result<ActiveSession, AuthError> {
        let span = self.config.log_span().clone();
        async {
            let mut state = self.state.lock().await;
            tracing::info!(device_id = %self.device_id.as_ref(), "connecting");

            let result = self.bootstrap(&state.grant).await;
            Self::apply(&mut state, result)
        }
        .instrument(span)
        .await
    }

    /// Returns valid session credentials, refreshing them first if expired.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConnected`] before the first `connect`, or the
    /// refresh failure, in which case the session becomes unauthenticated.
    pub async fn ensure_valid(&self) -> Result<ActiveSession, AuthError> {
        let span = self.config.log_span().clone();
        async {
            let mut state = self.state.lock().await;

            let refresh_grant = match &state.auth {
                None => return Err(AuthError::NotConnected),
                Some(auth) if !auth.tokens.expired_at(Utc::now()) => return Ok(auth.active()),
                Some(auth) => Grant::RefreshToken(auth.tokens.refresh_token().to_string()),
            };

            tracing::info!("access token expired, refreshing");
            let result = self.bootstrap(&refresh_grant).await;
            Self::apply(&mut state, result)
        }
        .instrument(span)
        .await
    }

    /// Forces a refresh cycle regardless of expiry.
    ///
    /// # Errors
    ///
    /// Same as [`ensure_valid`](Self::ensure_valid).
    pub async fn refresh(&self) -> Result<ActiveSession, AuthError> {
        let span = self.config.log_span().clone();
        async {
            let mut state = self.state.lock().await;
            let refresh_grant = match &state.auth {
                None => return Err(AuthError::NotConnected),
                Some(auth) => Grant::RefreshToken(auth.tokens.refresh_token().to_string()),
            };

            tracing::info!("refreshing session");
            let result = self.bootstrap(&refresh_grant).await;
            Self::apply(&mut state, result)
        }
        .instrument(span)
        .await
    }

    /// Returns the current session headers, refreshing first if expired.
    ///
    /// # Errors
    ///
    /// Same as [`ensure_valid`](Self::ensure_valid).
    pub async fn headers(&self) -> Result<SessionHeaders, AuthError> {
        Ok(self.ensure_valid().await?.headers)
    }

    /// Returns the latest refresh token, for hosts that persist it between runs.
    pub async fn current_refresh_token(&self) -> Option<String> {
        let state = self.state.lock().await;
        state
            .auth
            .as_ref()
            .map(|auth| auth.tokens.refresh_token().to_string())
    }

    /// Returns `true` if the session holds tokens (expired or not).
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.auth.is_some()
    }

    /// Returns the device id registered by this session.
    #[must_use]
    pub const fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the account email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    pub(crate) const fn http(&self) -> &HttpClient {
        &self.http
    }

    pub(crate) const fn config(&self) -> &InControlConfig {
        &self.config
    }

    fn apply(
        state: &mut SessionState,
        result: Result<Authenticated, AuthError>,
    ) -> Result<ActiveSession, AuthError> {
        match result {
            Ok(auth) => {
                if matches!(state.grant, Grant::RefreshToken(_)) {
                    state.grant = Grant::RefreshToken(auth.tokens.refresh_token().to_string());
                }
                let active = auth.active();
                tracing::info!(
                    user_id = %active.user().user_id(),
                    expires_at = %auth.tokens.expires_at(),
                    "session authenticated"
                );
                state.auth = Some(auth);
                Ok(active)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session authentication failed");
                state.auth = None;
                Err(e)
            }
        }
    }

    async fn bootstrap(&self, grant: &Grant) -> Result<Authenticated, AuthError> {
        let tokens = self.request_tokens(grant).await?;
        let headers = SessionHeaders::new(tokens.access_token(), &self.device_id);

        self.register_device(&tokens, &headers).await?;
        tracing::debug!("device id registered");

        let user = self.login(&headers).await?;
        tracing::debug!(user_id = %user.user_id(), "user logged in");

        Ok(Authenticated {
            tokens,
            headers,
            user,
        })
    }

    async fn request_tokens(&self, grant: &Grant) -> Result<TokenSet, AuthError> {
        const ENDPOINT: &str = "tokens";

        let body = serde_json::to_value(grant.request(&self.email)).map_err(|e| {
            AuthError::MalformedResponse {
                endpoint: ENDPOINT,
                reason: e.to_string(),
            }
        })?;

        let request = HttpRequest::builder(
            HttpMethod::Post,
            self.config.ifas_base_url().join(ENDPOINT),
        )
        .body(body)
        .body_type(DataType::Json)
        .header("Authorization", self.config.basic_authorization())
        .header("X-Device-Id", self.device_id.as_ref())
        .header("Connection", "close")
        .build()
        .map_err(|e| AuthError::Transport(e.into()))?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| AuthError::from_http(ENDPOINT, e))?;

        let token_response: TokenResponse =
            serde_json::from_value(response.into_body().unwrap_or_default()).map_err(|e| {
                AuthError::MalformedResponse {
                    endpoint: ENDPOINT,
                    reason: e.to_string(),
                }
            })?;

        TokenSet::from_response(token_response, Utc::now()).map_err(|e| {
            AuthError::MalformedResponse {
                endpoint: ENDPOINT,
                reason: e.to_string(),
            }
        })
    }

    async fn register_device(
        &self,
        tokens: &TokenSet,
        headers: &SessionHeaders,
    ) -> Result<(), AuthError> {
        const ENDPOINT: &str = "clients";

        let url = self
            .config
            .ifop_base_url()
            .join(&format!("users/{}/clients", self.email.as_ref()));

        let request = HttpRequest::builder(HttpMethod::Post, url)
            .base_headers(headers.to_header_set())
            .body(json!({
                "access_token": tokens.access_token(),
                "authorization_token": tokens.authorization_token(),
                "expires_in": DEVICE_REGISTRATION_TTL,
                "deviceID": self.device_id.as_ref(),
            }))
            .body_type(DataType::Json)
            .build()
            .map_err(|e| AuthError::Transport(e.into()))?;

        self.http
            .request(request)
            .await
            .map_err(|e| AuthError::from_http(ENDPOINT, e))?;

        Ok(())
    }

    async fn login(&self, headers: &SessionHeaders) -> Result<UserIdentity, AuthError> {
        const ENDPOINT: &str = "users";

        let request =
            HttpRequest::builder(HttpMethod::Get, self.config.if9_base_url().join(ENDPOINT))
                .base_headers(headers.to_header_set())
                .query_param("loginName", self.email.as_ref())
                .accept(media_types::USER_V3)
                .build()
                .map_err(|e| AuthError::Transport(e.into()))?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| AuthError::from_http(ENDPOINT, e))?;

        serde_json::from_value(response.into_body().unwrap_or_default()).map_err(|e| {
            AuthError::MalformedResponse {
                endpoint: ENDPOINT,
                reason: e.to_string(),
            }
        })
    }
}

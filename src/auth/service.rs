//! Per-command service authentication.
//!
//! Every state-changing vehicle command must carry a short-lived service
//! token. The token is obtained by presenting a secret for a named service
//! at `vehicles/{vin}/users/{user_id}/authenticate`. Which secret depends on
//! the service:
//!
//! | Secret                    | Services                                 |
//! |---------------------------|------------------------------------------|
//! | personal PIN              | RDL, RDU, ALOFF, REON, REOFF, PROV       |
//! | last four VIN characters  | HBLF, ECC, CP                            |
//! | empty string              | VHS, SWU                                 |
//!
//! Presenting the wrong kind of secret makes the platform reject the later
//! command, so the mapping is fixed per service in [`ServiceName::secret_kind`].
//!
//! Tokens are never cached. [`ServiceToken`] is not `Clone` and is consumed
//! when merged into a command body.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::Instrument;

use crate::auth::error::ServiceAuthError;
use crate::auth::session::{ActiveSession, AuthSession};
use crate::clients::{DataType, HttpError, HttpMethod, HttpRequest};
use crate::config::{Pin, Vin};
use crate::vehicle::media_types;

/// Services a token can be requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceName {
    /// Vehicle health status.
    Vhs,
    /// Honk horn and blink lights.
    Hblf,
    /// Electric climate control (preconditioning).
    Ecc,
    /// Charge profile.
    Cp,
    /// Scheduled wake up.
    Swu,
    /// Remote door lock.
    Rdl,
    /// Remote door unlock.
    Rdu,
    /// Alarm off.
    Aloff,
    /// Remote engine on.
    Reon,
    /// Remote engine off.
    Reoff,
    /// Provisioning and service modes.
    Prov,
}

/// The kind of secret a service is authenticated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretKind {
    /// The user's personal PIN.
    Pin,
    /// The last four characters of the VIN.
    VinSuffix,
    /// An empty string.
    Empty,
}

impl ServiceName {
    /// All services, in a stable order.
    pub const ALL: [Self; 11] = [
        Self::Vhs,
        Self::Hblf,
        Self::Ecc,
        Self::Cp,
        Self::Swu,
        Self::Rdl,
        Self::Rdu,
        Self::Aloff,
        Self::Reon,
        Self::Reoff,
        Self::Prov,
    ];

    /// Returns the wire name of the service.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Vhs => "VHS",
            Self::Hblf => "HBLF",
            Self::Ecc => "ECC",
            Self::Cp => "CP",
            Self::Swu => "SWU",
            Self::Rdl => "RDL",
            Self::Rdu => "RDU",
            Self::Aloff => "ALOFF",
            Self::Reon => "REON",
            Self::Reoff => "REOFF",
            Self::Prov => "PROV",
        }
    }

    /// Returns the secret kind the platform expects for this service.
    #[must_use]
    pub const fn secret_kind(self) -> SecretKind {
        match self {
            Self::Rdl | Self::Rdu | Self::Aloff | Self::Reon | Self::Reoff | Self::Prov => {
                SecretKind::Pin
            }
            Self::Hblf | Self::Ecc | Self::Cp => SecretKind::VinSuffix,
            Self::Vhs | Self::Swu => SecretKind::Empty,
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single-use service token.
///
/// Holds the fields returned by the authenticate endpoint, which are merged
/// verbatim into the command body.
pub struct ServiceToken {
    service: ServiceName,
    fields: Map<String, Value>,
}

impl ServiceToken {
    /// Returns the service the token was issued for.
    #[must_use]
    pub const fn service(&self) -> ServiceName {
        self.service
    }

    /// Consumes the token, returning its body fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceToken")
            .field("service", &self.service)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Exchanges secrets for service tokens.
///
/// # Example
///
/// ```rust,ignore
/// use jlr_incontrol::auth::{ServiceAuthenticator, ServiceName};
///
/// let authenticator = ServiceAuthenticator::new(session.clone());
/// let token = authenticator
///     .authenticate(&vin, ServiceName::Rdl, Some(&pin))
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServiceAuthenticator {
    session: Arc<AuthSession>,
}

impl ServiceAuthenticator {
    /// Creates an authenticator on top of a session.
    #[must_use]
    pub const fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    /// Obtains a token for `service`, deriving the secret from its kind.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceAuthError::PinRequired`] without any network call if
    /// the service needs a PIN and `pin` is `None`. Otherwise see
    /// [`authenticate_with_secret`](Self::authenticate_with_secret).
    pub async fn authenticate(
        &self,
        vin: &Vin,
        service: ServiceName,
        pin: Option<&Pin>,
    ) -> Result<ServiceToken, ServiceAuthError> {
        let secret = secret_for(service, vin, pin)?;
        let active = self.session.ensure_valid().await?;
        self.exchange(&active, vin, service, secret).await
    }

    /// Obtains a token for `service` with an explicit secret.
    ///
    /// # Errors
    ///
    /// - [`ServiceAuthError::Session`] if the session cannot provide valid headers
    /// - [`ServiceAuthError::Rejected`] if the platform refuses the secret
    /// - [`ServiceAuthError::MalformedResponse`] if the body is not a JSON object
    /// - [`ServiceAuthError::Transport`] for network failures
    pub async fn authenticate_with_secret(
        &self,
        vin: &Vin,
        service: ServiceName,
        secret: &str,
    ) -> Result<ServiceToken, ServiceAuthError> {
        let active = self.session.ensure_valid().await?;
        self.exchange(&active, vin, service, secret).await
    }

    /// Posts the secret under an already validated session.
    pub(crate) async fn exchange(
        &self,
        active: &ActiveSession,
        vin: &Vin,
        service: ServiceName,
        secret: &str,
    ) -> Result<ServiceToken, ServiceAuthError> {
        let span = self.session.config().log_span().clone();
        async {
            let url = self.session.config().if9_base_url().join(&format!(
                "vehicles/{vin}/users/{}/authenticate",
                active.user().user_id()
            ));

            let request = HttpRequest::builder(HttpMethod::Post, url)
                .base_headers(active.headers().to_header_set())
                .body(json!({ "serviceName": service.code(), "pin": secret }))
                .body_type(DataType::Vendor(media_types::AUTHENTICATE_REQUEST_V2))
                .build()
                .map_err(|e| ServiceAuthError::Transport(e.into()))?;

            tracing::debug!(%service, %vin, "requesting service token");

            let response = self.session.http().request(request).await.map_err(|e| match e {
                HttpError::Response(e) => ServiceAuthError::Rejected {
                    service,
                    status: e.code,
                    message: e.message,
                },
                other => ServiceAuthError::Transport(other),
            })?;

            match response.into_body() {
                Some(Value::Object(fields)) => Ok(ServiceToken { service, fields }),
                Some(other) => Err(ServiceAuthError::MalformedResponse {
                    service,
                    reason: format!("expected a JSON object, got {other}"),
                }),
                None => Err(ServiceAuthError::MalformedResponse {
                    service,
                    reason: "empty body".to_string(),
                }),
            }
        }
        .instrument(span)
        .await
    }
}

/// Derives the secret presented for `service`.
pub(crate) fn secret_for<'a>(
    service: ServiceName,
    vin: &'a Vin,
    pin: Option<&'a Pin>,
) -> Result<&'a str, ServiceAuthError> {
    match service.secret_kind() {
        SecretKind::Pin => pin
            .map(AsRef::as_ref)
            .ok_or(ServiceAuthError::PinRequired { service }),
        SecretKind::VinSuffix => Ok(vin.last_four()),
        SecretKind::Empty => Ok(""),
    }
}

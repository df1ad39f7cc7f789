//! The uniform command path.
//!
//! [`VehicleCommandDispatcher::send`] runs every state-changing command the
//! same way:
//!
//! 1. derive the secret for the command's service (fails fast on a missing PIN)
//! 2. obtain valid session headers, refreshing if the session expired
//! 3. exchange the secret for a fresh [`ServiceToken`](crate::auth::ServiceToken)
//! 4. merge the token fields and the command payload into one JSON body
//! 5. POST it to `vehicles/{vin}/{path}` with the command's media types
//!
//! Reads go through [`fetch`](VehicleCommandDispatcher::fetch) instead and
//! never request a service token.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::auth::service::secret_for;
use crate::auth::{AuthSession, ServiceAuthenticator};
use crate::clients::{DataType, HttpMethod, HttpRequest, HttpResponse};
use crate::config::{Pin, Vin};
use crate::vehicle::catalog::Command;
use crate::vehicle::errors::CommandError;

/// Command-specific body content merged after the service token.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
    /// The token alone is the body.
    #[default]
    Empty,
    /// Top-level fields added next to the token fields.
    Fields(Map<String, Value>),
    /// A single value stored under a caller-chosen key.
    ///
    /// The charge profile endpoint multiplexes sub-commands this way
    /// (`serviceParameters`, `departureTimerSetting`).
    Keyed {
        /// Field name in the command body.
        key: String,
        /// Field value.
        value: Value,
    },
}

impl Payload {
    /// A payload with a single top-level field.
    #[must_use]
    pub fn field(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(key.into(), value.into());
        Self::Fields(fields)
    }

    /// A payload stored under a caller-chosen key.
    #[must_use]
    pub fn keyed(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Keyed {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Adds a top-level field, turning the payload into [`Payload::Fields`].
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = match self {
            Self::Empty => Map::new(),
            Self::Fields(fields) => fields,
            Self::Keyed { key, value } => {
                let mut fields = Map::new();
                fields.insert(key, value);
                fields
            }
        };
        fields.insert(key.into(), value.into());
        Self::Fields(fields)
    }

    fn merge_into(self, body: &mut Map<String, Value>) {
        match self {
            Self::Empty => {}
            Self::Fields(fields) => body.extend(fields),
            Self::Keyed { key, value } => {
                body.insert(key, value);
            }
        }
    }
}

/// Sends vehicle commands and reads through one session.
///
/// Cheap to clone; clones share the session.
#[derive(Clone, Debug)]
pub struct VehicleCommandDispatcher {
    session: Arc<AuthSession>,
    authenticator: ServiceAuthenticator,
}

impl VehicleCommandDispatcher {
    /// Creates a dispatcher on top of a session.
    #[must_use]
    pub fn new(session: Arc<AuthSession>) -> Self {
        let authenticator = ServiceAuthenticator::new(Arc::clone(&session));
        Self {
            session,
            authenticator,
        }
    }

    /// Returns the underlying session.
    #[must_use]
    pub const fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Sends a state-changing command.
    ///
    /// Returns the decoded response, or `None` when the platform answered
    /// with an empty body. A service token is requested for every call.
    ///
    /// # Errors
    ///
    /// - [`CommandError::ServiceAuth`] if the token cannot be obtained; the
    ///   command is not sent
    /// - [`CommandError::Session`] if the session cannot be refreshed
    /// - [`CommandError::Unauthorized`] if the command is refused with 401/403
    /// - [`CommandError::Transport`] for any other failure
    pub async fn send(
        &self,
        vin: &Vin,
        command: Command,
        pin: Option<&Pin>,
        payload: Payload,
    ) -> Result<Option<Value>, CommandError> {
        let spec = command.spec();
        let secret = secret_for(spec.service, vin, pin)?;

        let active = self.session.ensure_valid().await?;
        let token = self
            .authenticator
            .exchange(&active, vin, spec.service, secret)
            .await?;

        let mut body = token.into_fields();
        payload.merge_into(&mut body);

        let mut builder = HttpRequest::builder(HttpMethod::Post, self.vehicle_url(vin, spec.path))
            .base_headers(active.headers().to_header_set())
            .body(Value::Object(body))
            .body_type(DataType::Vendor(spec.content_type));
        if let Some(accept) = spec.accept {
            builder = builder.accept(accept);
        }
        let request = builder.build()?;

        tracing::debug!(%command, %vin, service = %spec.service, "sending command");

        self.session
            .http()
            .request(request)
            .await
            .map(HttpResponse::into_body)
            .map_err(|e| CommandError::from_http(command.name(), e))
    }

    /// Reads a vehicle resource with session headers only.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Session`] if the session cannot be refreshed,
    /// or the transport failure.
    pub async fn fetch(
        &self,
        vin: &Vin,
        resource: &str,
        accept: Option<&'static str>,
    ) -> Result<Option<Value>, CommandError> {
        self.get(self.vehicle_url(vin, resource), resource, accept, &[])
            .await
    }

    /// Reads a vehicle resource with extra query parameters.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_with_query(
        &self,
        vin: &Vin,
        resource: &str,
        accept: Option<&'static str>,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, CommandError> {
        self.get(self.vehicle_url(vin, resource), resource, accept, query)
            .await
    }

    /// Writes a vehicle resource that needs no service token.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn post_resource(
        &self,
        vin: &Vin,
        resource: &str,
        content_type: Option<&'static str>,
        body: Value,
    ) -> Result<Option<Value>, CommandError> {
        self.post(self.vehicle_url(vin, resource), resource, content_type, body)
            .await
    }

    /// GET on an account-level path under the user/vehicle service root.
    pub(crate) async fn get_account(
        &self,
        path: &str,
        accept: Option<&'static str>,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, CommandError> {
        let url = self.session.config().if9_base_url().join(path);
        self.get(url, path, accept, query).await
    }

    /// POST on an account-level path under the user/vehicle service root.
    pub(crate) async fn post_account(
        &self,
        path: &str,
        content_type: Option<&'static str>,
        body: Value,
    ) -> Result<Option<Value>, CommandError> {
        let url = self.session.config().if9_base_url().join(path);
        self.post(url, path, content_type, body).await
    }

    async fn get(
        &self,
        url: String,
        resource: &str,
        accept: Option<&'static str>,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, CommandError> {
        let active = self.session.ensure_valid().await?;

        let mut builder =
            HttpRequest::builder(HttpMethod::Get, url).base_headers(active.headers().to_header_set());
        if let Some(accept) = accept {
            builder = builder.accept(accept);
        }
        for (key, value) in query {
            builder = builder.query_param(*key, value.clone());
        }
        let request = builder.build()?;

        self.session
            .http()
            .request(request)
            .await
            .map(HttpResponse::into_body)
            .map_err(|e| CommandError::from_http(resource, e))
    }

    async fn post(
        &self,
        url: String,
        resource: &str,
        content_type: Option<&'static str>,
        body: Value,
    ) -> Result<Option<Value>, CommandError> {
        let active = self.session.ensure_valid().await?;

        let body_type = content_type.map_or(DataType::Json, DataType::Vendor);
        let request = HttpRequest::builder(HttpMethod::Post, url)
            .base_headers(active.headers().to_header_set())
            .body(body)
            .body_type(body_type)
            .build()?;

        self.session
            .http()
            .request(request)
            .await
            .map(HttpResponse::into_body)
            .map_err(|e| CommandError::from_http(resource, e))
    }

    fn vehicle_url(&self, vin: &Vin, path: &str) -> String {
        self.session
            .config()
            .if9_base_url()
            .join(&format!("vehicles/{vin}/{path}"))
    }
}

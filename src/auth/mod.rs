//! Session and command authentication for the InControl API.
//!
//! Access to the platform is authenticated in two tiers:
//!
//! - [`AuthSession`] holds the account-wide bearer tokens. It bootstraps them
//!   from [`Credentials`], registers the device id, resolves the user id and
//!   refreshes everything transparently once the tokens expire.
//! - [`ServiceAuthenticator`] obtains a fresh, single-use [`ServiceToken`] for
//!   each state-changing command by presenting a PIN, a VIN suffix or an
//!   empty secret, depending on the [`ServiceName`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jlr_incontrol::auth::{AuthSession, ServiceAuthenticator, ServiceName};
//! use jlr_incontrol::{Credentials, Email, InControlConfig, Password, Pin, Vin};
//!
//! let credentials = Credentials::with_password(
//!     Email::new("driver@example.com")?,
//!     Password::new("secret")?,
//! );
//! let session = Arc::new(AuthSession::new(InControlConfig::default(), credentials)?);
//! session.connect().await?;
//!
//! let authenticator = ServiceAuthenticator::new(Arc::clone(&session));
//! let vin = Vin::new("SAJAA1234AB567890")?;
//! let token = authenticator
//!     .authenticate(&vin, ServiceName::Rdl, Some(&Pin::new("1234")?))
//!     .await?;
//! ```

mod credentials;
mod error;
pub mod service;
pub mod session;
mod tokens;

pub use credentials::{Credentials, Grant};
pub use error::{AuthError, ServiceAuthError};
pub use service::{SecretKind, ServiceAuthenticator, ServiceName, ServiceToken};
pub use session::{ActiveSession, AuthSession, SessionHeaders, UserIdentity};
pub use tokens::{TokenLifetimeError, TokenResponse, TokenSet};

//! # JLR InControl API client
//!
//! An async client for the Jaguar Land Rover InControl connected-vehicle
//! platform: account authentication, vehicle reads and remote commands.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`InControlConfig`] and [`InControlConfigBuilder`]
//! - Validated newtypes for credentials and vehicle identifiers
//! - Account authentication with device registration via [`AuthSession`]
//! - Transparent refresh of expired access tokens, one refresh at a time
//! - Per-command service tokens via [`ServiceAuthenticator`]
//! - Vehicle reads and remote commands via [`Vehicle`] and
//!   [`VehicleCommandDispatcher`]
//! - A host-facing entry point, [`InControlClient`]
//!
//! ## Quick Start
//!
//! ```rust
//! use jlr_incontrol::{Credentials, Email, InControlConfig, Password};
//!
//! // The defaults target the European platform
//! let config = InControlConfig::default();
//!
//! let credentials = Credentials::with_password(
//!     Email::new("driver@example.com").unwrap(),
//!     Password::new("secret").unwrap(),
//! );
//! assert_eq!(credentials.email().as_ref(), "driver@example.com");
//! ```
//!
//! ## Connecting
//!
//! ```rust,ignore
//! use jlr_incontrol::{Credentials, Email, InControlClient, InControlConfig, Password};
//!
//! let credentials = Credentials::with_password(
//!     Email::new("driver@example.com")?,
//!     Password::new("secret")?,
//! );
//! let client = InControlClient::connect(InControlConfig::default(), credentials).await?;
//!
//! // Persist the refresh token to reconnect later without the password
//! let refresh_token = client.session().current_refresh_token().await;
//! ```
//!
//! ## Reading and commanding a vehicle
//!
//! ```rust,ignore
//! use jlr_incontrol::{Pin, Vin};
//!
//! let vehicle = client.vehicle(Vin::new("SAJAA1234AB567890")?);
//!
//! let position = vehicle.position().await?;
//! vehicle.lock(&Pin::new("1234")?).await?;
//! ```
//!
//! Every command requests its own single-use service token before it is
//! sent; reads only need the session.
//!
//! ## Other regions
//!
//! ```rust
//! use jlr_incontrol::{BaseUrl, InControlConfig};
//!
//! let config = InControlConfig::builder()
//!     .ifas_base_url(BaseUrl::new("https://ifas.prod-chn.jlrmotor.com/ifas/jlr").unwrap())
//!     .ifop_base_url(BaseUrl::new("https://ifop.prod-chn.jlrmotor.com/ifop/jlr").unwrap())
//!     .if9_base_url(BaseUrl::new("https://ifoa.prod-chn.jlrmotor.com/if9/jlr").unwrap())
//!     .build()
//!     .unwrap();
//! assert_eq!(config.if9_base_url().host_name(), "ifoa.prod-chn.jlrmotor.com");
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and sessions are instances
//! - **Fail-fast validation**: newtypes and command parameters validate
//!   before anything is sent
//! - **Thread-safe**: all types are `Send + Sync`
//! - **Async-first**: built on the Tokio runtime
//! - **Secrets stay secret**: `Debug` output masks tokens, passwords and PINs

pub mod auth;
pub mod clients;
pub mod config;
mod connection;
pub mod error;
pub mod vehicle;

// Re-export public types at crate root for convenience
pub use auth::{
    AuthError, AuthSession, Credentials, ServiceAuthError, ServiceAuthenticator, ServiceName,
    ServiceToken,
};
pub use config::{
    BaseUrl, DeviceId, Email, InControlConfig, InControlConfigBuilder, Password, Pin, Vin,
};
pub use connection::{
    CommandOutcome, InControlClient, VehicleCommand, VehicleSnapshot, VehicleSummary,
};
pub use error::ConfigError;

// Re-export vehicle types
pub use vehicle::{Command, CommandError, Payload, Vehicle, VehicleCommandDispatcher};

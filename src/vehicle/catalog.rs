//! The command table.
//!
//! Each state-changing endpoint is one row: the path under
//! `vehicles/{vin}/`, the service token it needs and the media types it
//! speaks. [`VehicleCommandDispatcher`](crate::vehicle::VehicleCommandDispatcher)
//! runs every row through the same algorithm.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::ServiceName;
use crate::vehicle::media_types::{
    PHEV_SERVICE_V1, SERVICE_STATUS_V3, SERVICE_STATUS_V4, SERVICE_STATUS_V5,
    START_SERVICE_CONFIGURATION_V2, START_SERVICE_CONFIGURATION_V3,
};

/// A state-changing vehicle command.
///
/// Commands are keyed by what they do, not by path: `unlock` and
/// `reset_alarm` share the `unlock` endpoint under different services.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Lock the doors.
    Lock,
    /// Unlock the doors.
    Unlock,
    /// Silence a triggered alarm.
    ResetAlarm,
    /// Sound the horn and flash the lights.
    HonkBlink,
    /// Start the engine for remote climate.
    EngineOn,
    /// Stop a remotely started engine.
    EngineOff,
    /// Electric climate preconditioning.
    Preconditioning,
    /// Charging and departure timer profile.
    ChargeProfile,
    /// Scheduled wake up.
    Wakeup,
    /// Provisioning, service, transport and privacy modes.
    Provisioning,
    /// Request a fresh health status from the vehicle.
    HealthStatus,
}

/// One row of the command table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Path below `vehicles/{vin}/`.
    pub path: &'static str,
    /// Service the token is requested for.
    pub service: ServiceName,
    /// `Content-Type` of the command body.
    pub content_type: &'static str,
    /// `Accept` override, if the endpoint needs one.
    pub accept: Option<&'static str>,
}

impl Command {
    /// Every command, in table order.
    pub const ALL: [Self; 11] = [
        Self::Lock,
        Self::Unlock,
        Self::ResetAlarm,
        Self::HonkBlink,
        Self::EngineOn,
        Self::EngineOff,
        Self::Preconditioning,
        Self::ChargeProfile,
        Self::Wakeup,
        Self::Provisioning,
        Self::HealthStatus,
    ];

    /// Returns the table row for this command.
    #[must_use]
    pub const fn spec(self) -> CommandSpec {
        let (path, service, content_type, accept) = match self {
            Self::Lock => ("lock", ServiceName::Rdl, START_SERVICE_CONFIGURATION_V2, None),
            Self::Unlock => ("unlock", ServiceName::Rdu, START_SERVICE_CONFIGURATION_V2, None),
            Self::ResetAlarm => (
                "unlock",
                ServiceName::Aloff,
                START_SERVICE_CONFIGURATION_V3,
                Some(SERVICE_STATUS_V4),
            ),
            Self::HonkBlink => (
                "honkBlink",
                ServiceName::Hblf,
                START_SERVICE_CONFIGURATION_V3,
                Some(SERVICE_STATUS_V4),
            ),
            Self::EngineOn => ("engineOn", ServiceName::Reon, START_SERVICE_CONFIGURATION_V2, None),
            Self::EngineOff => (
                "engineOff",
                ServiceName::Reoff,
                START_SERVICE_CONFIGURATION_V2,
                None,
            ),
            Self::Preconditioning => (
                "preconditioning",
                ServiceName::Ecc,
                PHEV_SERVICE_V1,
                Some(SERVICE_STATUS_V5),
            ),
            Self::ChargeProfile => (
                "chargeProfile",
                ServiceName::Cp,
                PHEV_SERVICE_V1,
                Some(SERVICE_STATUS_V5),
            ),
            Self::Wakeup => (
                "swu",
                ServiceName::Swu,
                START_SERVICE_CONFIGURATION_V3,
                Some(SERVICE_STATUS_V3),
            ),
            Self::Provisioning => (
                "prov",
                ServiceName::Prov,
                START_SERVICE_CONFIGURATION_V3,
                Some(SERVICE_STATUS_V4),
            ),
            Self::HealthStatus => (
                "healthstatus",
                ServiceName::Vhs,
                START_SERVICE_CONFIGURATION_V3,
                Some(SERVICE_STATUS_V4),
            ),
        };
        CommandSpec {
            path,
            service,
            content_type,
            accept,
        }
    }

    /// Returns the snake_case name of the command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::ResetAlarm => "reset_alarm",
            Self::HonkBlink => "honk_blink",
            Self::EngineOn => "engine_on",
            Self::EngineOff => "engine_off",
            Self::Preconditioning => "preconditioning",
            Self::ChargeProfile => "charge_profile",
            Self::Wakeup => "wakeup",
            Self::Provisioning => "provisioning",
            Self::HealthStatus => "health_status",
        }
    }

    /// Looks up the command served by an endpoint path.
    ///
    /// `"unlock"` resolves to [`Command::Unlock`]; alarm reset shares that
    /// path and must be selected explicitly.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.spec().path == path)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! The host-facing client.
//!
//! [`InControlClient`] is what a home automation host holds on to: it
//! connects once, lists the account's vehicles and exposes the two calls a
//! polling/action layer needs, [`get_vehicle_snapshot`] and
//! [`execute_command`].
//!
//! [`get_vehicle_snapshot`]: InControlClient::get_vehicle_snapshot
//! [`execute_command`]: InControlClient::execute_command

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{AuthError, AuthSession, Credentials};
use crate::clients::HttpError;
use crate::config::{InControlConfig, Pin, Vin};
use crate::vehicle::media_types;
use crate::vehicle::{
    ClimatePriority, CommandError, DepartureTime, DepartureTimer, RepeatSchedule, TimerTarget,
    Vehicle, VehicleCommandDispatcher,
};

/// A vehicle linked to the account.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    /// Vehicle identification number.
    pub vin: Vin,
    /// The account's role for this vehicle (e.g. `Primary`).
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize)]
struct VehicleList {
    #[serde(default)]
    vehicles: Option<Vec<Value>>,
}

/// The data a host polls for one vehicle.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    /// Status document (see [`crate::vehicle::status_value`]).
    pub status: Option<Value>,
    /// Vehicle attributes.
    pub attributes: Option<Value>,
    /// Last known position.
    pub position: Option<Value>,
}

/// A remote command as sent by a host action.
///
/// Deserializes from `{"command": "<name>", ...parameters}`.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::VehicleCommand;
///
/// let command: VehicleCommand =
///     serde_json::from_str(r#"{"command": "lock", "pin": "1234"}"#).unwrap();
/// assert_eq!(command.name(), "lock");
///
/// let command: VehicleCommand =
///     serde_json::from_str(r#"{"command": "set_max_soc", "percent": 80}"#).unwrap();
/// assert_eq!(command.name(), "set_max_soc");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum VehicleCommand {
    /// Lock the doors.
    Lock {
        /// Personal PIN.
        pin: Pin,
    },
    /// Unlock the doors.
    Unlock {
        /// Personal PIN.
        pin: Pin,
    },
    /// Silence the alarm.
    ResetAlarm {
        /// Personal PIN.
        pin: Pin,
    },
    /// Horn and lights.
    HonkBlink,
    /// Start the engine for remote climate.
    RemoteEngineStart {
        /// Personal PIN.
        pin: Pin,
        /// Climate target, 31 to 57.
        target: u8,
    },
    /// Stop a remotely started engine.
    RemoteEngineStop {
        /// Personal PIN.
        pin: Pin,
    },
    /// Start preconditioning.
    PreconditioningStart {
        /// Target cabin temperature in degrees Celsius.
        target_temperature: f64,
    },
    /// Stop preconditioning.
    PreconditioningStop,
    /// Optimise climate for comfort or range.
    ClimatePrioritize {
        /// Optimisation target.
        priority: ClimatePriority,
    },
    /// Start charging now.
    ChargingStart,
    /// Stop charging now.
    ChargingStop,
    /// Set the permanent maximum state of charge.
    SetMaxSoc {
        /// Percent, 0 to 100.
        percent: u8,
    },
    /// Set the maximum state of charge for the next charge.
    SetOneOffMaxSoc {
        /// Percent, 0 to 100.
        percent: u8,
    },
    /// Add a departure timer on a date or a weekly schedule.
    AddDepartureTimer {
        /// Timer slot.
        index: u32,
        /// Hour of departure.
        hour: u8,
        /// Minute of departure.
        minute: u8,
        /// Single date; takes precedence over `schedule`.
        #[serde(default)]
        date: Option<NaiveDate>,
        /// Weekly schedule.
        #[serde(default)]
        schedule: Option<RepeatSchedule>,
    },
    /// Delete a departure timer.
    DeleteDepartureTimer {
        /// Timer slot.
        index: u32,
    },
    /// Schedule a wake up.
    SetWakeupTime {
        /// Wake up instant.
        at: DateTime<Utc>,
    },
    /// Cancel the scheduled wake up.
    DeleteWakeupTime,
    /// Enable provisioning mode.
    EnableProvisioningMode {
        /// Personal PIN.
        pin: Pin,
    },
    /// Enable service mode.
    EnableServiceMode {
        /// Personal PIN.
        pin: Pin,
        /// When service mode ends.
        until: DateTime<Utc>,
    },
    /// Enable transport mode.
    EnableTransportMode {
        /// Personal PIN.
        pin: Pin,
        /// When transport mode ends.
        until: DateTime<Utc>,
    },
    /// Enable privacy mode.
    EnablePrivacyMode {
        /// Personal PIN.
        pin: Pin,
    },
    /// Disable privacy mode.
    DisablePrivacyMode {
        /// Personal PIN.
        pin: Pin,
    },
    /// Request a fresh health status.
    HealthStatus,
}

impl VehicleCommand {
    /// Returns the snake_case name used in the `command` tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lock { .. } => "lock",
            Self::Unlock { .. } => "unlock",
            Self::ResetAlarm { .. } => "reset_alarm",
            Self::HonkBlink => "honk_blink",
            Self::RemoteEngineStart { .. } => "remote_engine_start",
            Self::RemoteEngineStop { .. } => "remote_engine_stop",
            Self::PreconditioningStart { .. } => "preconditioning_start",
            Self::PreconditioningStop => "preconditioning_stop",
            Self::ClimatePrioritize { .. } => "climate_prioritize",
            Self::ChargingStart => "charging_start",
            Self::ChargingStop => "charging_stop",
            Self::SetMaxSoc { .. } => "set_max_soc",
            Self::SetOneOffMaxSoc { .. } => "set_one_off_max_soc",
            Self::AddDepartureTimer { .. } => "add_departure_timer",
            Self::DeleteDepartureTimer { .. } => "delete_departure_timer",
            Self::SetWakeupTime { .. } => "set_wakeup_time",
            Self::DeleteWakeupTime => "delete_wakeup_time",
            Self::EnableProvisioningMode { .. } => "enable_provisioning_mode",
            Self::EnableServiceMode { .. } => "enable_service_mode",
            Self::EnableTransportMode { .. } => "enable_transport_mode",
            Self::EnablePrivacyMode { .. } => "enable_privacy_mode",
            Self::DisablePrivacyMode { .. } => "disable_privacy_mode",
            Self::HealthStatus => "health_status",
        }
    }

    async fn run(self, vehicle: &Vehicle) -> Result<Option<Value>, CommandError> {
        match self {
            Self::Lock { pin } => vehicle.lock(&pin).await,
            Self::Unlock { pin } => vehicle.unlock(&pin).await,
            Self::ResetAlarm { pin } => vehicle.reset_alarm(&pin).await,
            Self::HonkBlink => vehicle.honk_blink().await,
            Self::RemoteEngineStart { pin, target } => {
                vehicle.remote_engine_start(&pin, target).await
            }
            Self::RemoteEngineStop { pin } => vehicle.remote_engine_stop(&pin).await,
            Self::PreconditioningStart { target_temperature } => {
                vehicle.preconditioning_start(target_temperature).await
            }
            Self::PreconditioningStop => vehicle.preconditioning_stop().await,
            Self::ClimatePrioritize { priority } => vehicle.climate_prioritize(priority).await,
            Self::ChargingStart => vehicle.charging_start().await,
            Self::ChargingStop => vehicle.charging_stop().await,
            Self::SetMaxSoc { percent } => vehicle.set_max_soc(percent).await,
            Self::SetOneOffMaxSoc { percent } => vehicle.set_one_off_max_soc(percent).await,
            Self::AddDepartureTimer {
                index,
                hour,
                minute,
                date,
                schedule,
            } => {
                let target = match (date, schedule) {
                    (Some(date), _) => TimerTarget::on(date),
                    (None, Some(schedule)) => TimerTarget::repeating(schedule)?,
                    (None, None) => {
                        return Err(CommandError::invalid(
                            "departure timer needs a date or a schedule",
                        ))
                    }
                };
                let timer = DepartureTimer {
                    index,
                    time: DepartureTime::new(hour, minute)?,
                    target,
                };
                vehicle.add_departure_timer(&timer).await
            }
            Self::DeleteDepartureTimer { index } => vehicle.delete_departure_timer(index).await,
            Self::SetWakeupTime { at } => vehicle.set_wakeup_time(at).await,
            Self::DeleteWakeupTime => vehicle.delete_wakeup_time().await,
            Self::EnableProvisioningMode { pin } => vehicle.enable_provisioning_mode(&pin).await,
            Self::EnableServiceMode { pin, until } => {
                vehicle.enable_service_mode(&pin, until).await
            }
            Self::EnableTransportMode { pin, until } => {
                vehicle.enable_transport_mode(&pin, until).await
            }
            Self::EnablePrivacyMode { pin } => vehicle.enable_privacy_mode(&pin).await,
            Self::DisablePrivacyMode { pin } => vehicle.disable_privacy_mode(&pin).await,
            Self::HealthStatus => vehicle.health_status().await,
        }
    }
}

/// The result of [`InControlClient::execute_command`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommandOutcome {
    /// The command that ran.
    pub command: &'static str,
    /// The decoded response, or `None` for an empty body.
    pub response: Option<Value>,
}

impl CommandOutcome {
    /// Returns `true` if the platform answered with an empty body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.response.is_none()
    }
}

/// A connected InControl account.
///
/// # Example
///
/// ```rust,ignore
/// use jlr_incontrol::{Credentials, Email, InControlClient, InControlConfig, Password};
///
/// let credentials = Credentials::with_password(
///     Email::new("driver@example.com")?,
///     Password::new("secret")?,
/// );
/// let client = InControlClient::connect(InControlConfig::default(), credentials).await?;
///
/// for summary in client.vehicles().await? {
///     let snapshot = client.get_vehicle_snapshot(&summary.vin).await?;
///     println!("{}: {:?}", summary.vin, snapshot.position);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct InControlClient {
    session: Arc<AuthSession>,
    dispatcher: VehicleCommandDispatcher,
}

// Verify InControlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InControlClient>();
};

impl InControlClient {
    /// Creates a session and connects it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if any bootstrap step fails.
    pub async fn connect(
        config: InControlConfig,
        credentials: Credentials,
    ) -> Result<Self, AuthError> {
        let session = Arc::new(AuthSession::new(config, credentials)?);
        session.connect().await?;
        Ok(Self::from_session(session))
    }

    /// Wraps an existing session without connecting it.
    #[must_use]
    pub fn from_session(session: Arc<AuthSession>) -> Self {
        let dispatcher = VehicleCommandDispatcher::new(Arc::clone(&session));
        Self {
            session,
            dispatcher,
        }
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Returns the command dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &VehicleCommandDispatcher {
        &self.dispatcher
    }

    /// Returns a handle for one vehicle.
    #[must_use]
    pub fn vehicle(&self, vin: Vin) -> Vehicle {
        Vehicle::new(self.dispatcher.clone(), vin)
    }

    /// Lists the vehicles the account is primary user of.
    ///
    /// An account without vehicles yields an empty list, not an error.
    /// Entries that do not carry a valid VIN are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails, or the
    /// list cannot be decoded.
    pub async fn vehicles(&self) -> Result<Vec<VehicleSummary>, CommandError> {
        let path = format!("users/{}/vehicles", self.user_id().await?);
        let body = self
            .dispatcher
            .get_account(&path, None, &[("primaryOnly", "true".to_string())])
            .await?;

        let vehicles = match body {
            None => None,
            Some(body) => {
                let list: VehicleList =
                    serde_json::from_value(body).map_err(|source| HttpError::Decode {
                        url: path.clone(),
                        source,
                    })?;
                list.vehicles
            }
        }
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<VehicleSummary>(entry) {
            Ok(vehicle) => Some(vehicle),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unrecognised vehicle entry");
                None
            }
        })
        .collect::<Vec<_>>();

        if vehicles.is_empty() {
            tracing::warn!("no vehicles associated with this account");
        }
        Ok(vehicles)
    }

    /// Returns the account's user record.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn user_info(&self) -> Result<Option<Value>, CommandError> {
        let path = format!("users/{}", self.user_id().await?);
        self.dispatcher.get_account(&path, None, &[]).await
    }

    /// Updates the account's user record.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn update_user_info(&self, user_info: Value) -> Result<Option<Value>, CommandError> {
        let path = format!("users/{}", self.user_id().await?);
        self.dispatcher
            .post_account(&path, Some(media_types::USER_V3_UTF8), user_info)
            .await
    }

    /// Resolves coordinates to an address.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for coordinates out of
    /// range, otherwise the session or transport failure.
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Value>, CommandError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(CommandError::invalid(format!(
                "coordinates ({latitude}, {longitude}) are out of range"
            )));
        }
        let path = format!("geocode/reverse/{latitude:.6}/{longitude:.6}/en");
        self.dispatcher.get_account(&path, None, &[]).await
    }

    /// Reads status, attributes and position of a vehicle.
    ///
    /// None of the reads requests a service token.
    ///
    /// # Errors
    ///
    /// Returns the first failing read's [`CommandError`].
    pub async fn get_vehicle_snapshot(&self, vin: &Vin) -> Result<VehicleSnapshot, CommandError> {
        let vehicle = self.vehicle(vin.clone());
        Ok(VehicleSnapshot {
            status: vehicle.status().await?,
            attributes: vehicle.attributes().await?,
            position: vehicle.position().await?,
        })
    }

    /// Runs one remote command.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`]. Parameter validation failures
    /// are reported before anything is sent.
    pub async fn execute_command(
        &self,
        vin: &Vin,
        command: VehicleCommand,
    ) -> Result<CommandOutcome, CommandError> {
        let name = command.name();
        let vehicle = self.vehicle(vin.clone());

        match command.run(&vehicle).await {
            Ok(response) => {
                tracing::info!(command = name, %vin, "command accepted");
                Ok(CommandOutcome {
                    command: name,
                    response,
                })
            }
            Err(e) => {
                tracing::warn!(command = name, %vin, error = %e, "command failed");
                Err(e)
            }
        }
    }

    async fn user_id(&self) -> Result<String, AuthError> {
        Ok(self.session.ensure_valid().await?.user().user_id().to_string())
    }
}

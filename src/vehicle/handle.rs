//! Typed operations on one vehicle.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::config::{Pin, Vin};
use crate::vehicle::catalog::Command;
use crate::vehicle::dispatcher::{Payload, VehicleCommandDispatcher};
use crate::vehicle::errors::CommandError;
use crate::vehicle::media_types;
use crate::vehicle::params::{
    service_parameters, ClimatePriority, DepartureTimer, ProvisioningMode,
};
use crate::vehicle::status::status_value;

/// Lowest accepted remote climate target (`LO`).
pub const RCC_TARGET_MIN: u8 = 31;

/// Highest accepted remote climate target (`HI`).
pub const RCC_TARGET_MAX: u8 = 57;

/// A vehicle bound to a session.
///
/// Reads use session headers only. Every command requests a fresh service
/// token; see [`VehicleCommandDispatcher::send`].
///
/// # Example
///
/// ```rust,ignore
/// let vehicle = client.vehicle(Vin::new("SAJAA1234AB567890")?);
///
/// let status = vehicle.status().await?;
/// vehicle.lock(&Pin::new("1234")?).await?;
/// vehicle.preconditioning_start(21.0).await?;
/// ```
#[derive(Clone, Debug)]
pub struct Vehicle {
    dispatcher: VehicleCommandDispatcher,
    vin: Vin,
}

impl Vehicle {
    /// Binds `vin` to a dispatcher.
    #[must_use]
    pub const fn new(dispatcher: VehicleCommandDispatcher, vin: Vin) -> Self {
        Self { dispatcher, vin }
    }

    /// Returns the VIN.
    #[must_use]
    pub const fn vin(&self) -> &Vin {
        &self.vin
    }

    // Reads

    /// Returns the vehicle attributes (model, fuel type, capabilities).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn attributes(&self) -> Result<Option<Value>, CommandError> {
        self.fetch("attributes", Some(media_types::VEHICLE_ATTRIBUTES_V3))
            .await
    }

    /// Returns the vehicle status document.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn status(&self) -> Result<Option<Value>, CommandError> {
        self.fetch("status", Some(media_types::HEALTH_STATUS_V2)).await
    }

    /// Returns one entry of the status document.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn status_value(&self, key: &str) -> Result<Option<Value>, CommandError> {
        let status = self.status().await?;
        Ok(status.as_ref().and_then(|s| status_value(s, key)).cloned())
    }

    /// Returns the last known position.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn position(&self) -> Result<Option<Value>, CommandError> {
        self.fetch("position", None).await
    }

    /// Returns up to `count` recent trips.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn trips(&self, count: u32) -> Result<Option<Value>, CommandError> {
        self.dispatcher
            .fetch_with_query(
                &self.vin,
                "trips",
                Some(media_types::TRIP_LIST_V2),
                &[("count", count.to_string())],
            )
            .await
    }

    /// Returns the subscription packages of the vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn subscription_packages(&self) -> Result<Option<Value>, CommandError> {
        self.fetch("subscriptionpackages", None).await
    }

    /// Returns the configured departure timers.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn departure_timers(&self) -> Result<Option<Value>, CommandError> {
        self.fetch(
            "departuretimers",
            Some(media_types::DEPARTURE_TIMER_SETTINGS_V1),
        )
        .await
    }

    /// Returns the scheduled wake up time.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn wakeup_time(&self) -> Result<Option<Value>, CommandError> {
        self.fetch("wakeuptime", Some(media_types::VEHICLE_WAKEUP_TIME_V2))
            .await
    }

    /// Returns the status of a previously issued command.
    ///
    /// `service_id` is the `customerServiceId` from a command response.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn service_status(&self, service_id: &str) -> Result<Option<Value>, CommandError> {
        self.fetch(
            &format!("services/{service_id}"),
            Some(media_types::SERVICE_STATUS_V4),
        )
        .await
    }

    /// Returns the remote climate target setting.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn rcc_target_value(&self) -> Result<Option<Value>, CommandError> {
        self.fetch("settings/ClimateControlRccTargetTemp", None)
            .await
    }

    // Writes without a service token

    /// Sets the nickname and registration number.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the session or transport fails.
    pub async fn set_attributes(
        &self,
        nickname: &str,
        registration_number: &str,
    ) -> Result<Option<Value>, CommandError> {
        self.dispatcher
            .post_resource(
                &self.vin,
                "attributes",
                None,
                json!({ "nickname": nickname, "registrationNumber": registration_number }),
            )
            .await
    }

    /// Sets the remote climate target, between 31 (`LO`) and 57 (`HI`).
    ///
    /// Enables provisioning mode first, which the settings endpoint requires.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for a value out of range,
    /// without sending anything.
    pub async fn set_rcc_target_value(
        &self,
        pin: &Pin,
        target: u8,
    ) -> Result<Option<Value>, CommandError> {
        check_rcc_target(target)?;
        self.enable_provisioning_mode(pin).await?;
        self.dispatcher
            .post_resource(
                &self.vin,
                "settings",
                None,
                json!({
                    "key": "ClimateControlRccTargetTemp",
                    "value": target.to_string(),
                    "applied": 1,
                }),
            )
            .await
    }

    // Commands

    /// Locks the doors.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn lock(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.send(Command::Lock, Some(pin), Payload::Empty).await
    }

    /// Unlocks the doors.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn unlock(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.send(Command::Unlock, Some(pin), Payload::Empty).await
    }

    /// Silences a triggered alarm.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn reset_alarm(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.send(Command::ResetAlarm, Some(pin), Payload::Empty)
            .await
    }

    /// Sounds the horn and flashes the lights.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn honk_blink(&self) -> Result<Option<Value>, CommandError> {
        self.send(Command::HonkBlink, None, Payload::Empty).await
    }

    /// Starts the engine for remote climate at `target` (31 to 57).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for a target out of range.
    /// Otherwise see [`VehicleCommandDispatcher::send`].
    pub async fn remote_engine_start(
        &self,
        pin: &Pin,
        target: u8,
    ) -> Result<Option<Value>, CommandError> {
        self.set_rcc_target_value(pin, target).await?;
        self.send(Command::EngineOn, Some(pin), Payload::Empty).await
    }

    /// Stops a remotely started engine.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn remote_engine_stop(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.send(Command::EngineOff, Some(pin), Payload::Empty)
            .await
    }

    /// Starts climate preconditioning at `celsius`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for a non-finite temperature.
    /// Otherwise see [`VehicleCommandDispatcher::send`].
    pub async fn preconditioning_start(&self, celsius: f64) -> Result<Option<Value>, CommandError> {
        if !celsius.is_finite() {
            return Err(CommandError::invalid("target temperature must be finite"));
        }
        self.climate(service_parameters([
            ("PRECONDITIONING", json!("START")),
            ("TARGET_TEMPERATURE_CELSIUS", json!(format_temperature(celsius))),
        ]))
        .await
    }

    /// Stops climate preconditioning.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn preconditioning_stop(&self) -> Result<Option<Value>, CommandError> {
        self.climate(service_parameters([("PRECONDITIONING", json!("STOP"))]))
            .await
    }

    /// Optimises climate control for comfort or range.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn climate_prioritize(
        &self,
        priority: ClimatePriority,
    ) -> Result<Option<Value>, CommandError> {
        self.climate(service_parameters([(
            "PRIORITY_SETTING",
            json!(priority.as_str()),
        )]))
        .await
    }

    /// Starts charging now.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn charging_start(&self) -> Result<Option<Value>, CommandError> {
        self.charge_parameter("CHARGE_NOW_SETTING", json!("FORCE_ON"))
            .await
    }

    /// Stops charging now.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn charging_stop(&self) -> Result<Option<Value>, CommandError> {
        self.charge_parameter("CHARGE_NOW_SETTING", json!("FORCE_OFF"))
            .await
    }

    /// Sets the permanent maximum state of charge, in percent.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] above 100.
    pub async fn set_max_soc(&self, percent: u8) -> Result<Option<Value>, CommandError> {
        check_soc(percent)?;
        self.charge_parameter("SET_PERMANENT_MAX_SOC", json!(percent))
            .await
    }

    /// Sets a maximum state of charge for the next charge only, in percent.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] above 100.
    pub async fn set_one_off_max_soc(&self, percent: u8) -> Result<Option<Value>, CommandError> {
        check_soc(percent)?;
        self.charge_parameter("SET_ONE_OFF_MAX_SOC", json!(percent))
            .await
    }

    /// Adds or replaces a departure timer.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn add_departure_timer(
        &self,
        timer: &DepartureTimer,
    ) -> Result<Option<Value>, CommandError> {
        self.send(
            Command::ChargeProfile,
            None,
            Payload::keyed("departureTimerSetting", timer.to_setting()),
        )
        .await
    }

    /// Deletes the departure timer at `index`.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn delete_departure_timer(&self, index: u32) -> Result<Option<Value>, CommandError> {
        self.send(
            Command::ChargeProfile,
            None,
            Payload::keyed("departureTimerSetting", DepartureTimer::deletion(index)),
        )
        .await
    }

    /// Schedules the vehicle to wake up at `at`.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn set_wakeup_time(&self, at: DateTime<Utc>) -> Result<Option<Value>, CommandError> {
        let payload =
            Payload::field("serviceCommand", "START").with("startTime", at.timestamp_millis());
        self.send(Command::Wakeup, None, payload).await
    }

    /// Cancels the scheduled wake up.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn delete_wakeup_time(&self) -> Result<Option<Value>, CommandError> {
        self.send(
            Command::Wakeup,
            None,
            Payload::field("serviceCommand", "END"),
        )
        .await
    }

    /// Enables provisioning mode.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn enable_provisioning_mode(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.provisioning(pin, ProvisioningMode::Provisioning, None)
            .await
    }

    /// Enables service mode until `until`.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn enable_service_mode(
        &self,
        pin: &Pin,
        until: DateTime<Utc>,
    ) -> Result<Option<Value>, CommandError> {
        self.provisioning(pin, ProvisioningMode::ServiceMode, Some(until))
            .await
    }

    /// Enables transport mode until `until`.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn enable_transport_mode(
        &self,
        pin: &Pin,
        until: DateTime<Utc>,
    ) -> Result<Option<Value>, CommandError> {
        self.provisioning(pin, ProvisioningMode::TransportMode, Some(until))
            .await
    }

    /// Enables privacy mode, which stops journey logging.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn enable_privacy_mode(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.provisioning(pin, ProvisioningMode::PrivacyOn, None)
            .await
    }

    /// Disables privacy mode.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn disable_privacy_mode(&self, pin: &Pin) -> Result<Option<Value>, CommandError> {
        self.provisioning(pin, ProvisioningMode::PrivacyOff, None)
            .await
    }

    /// Asks the vehicle to report a fresh health status.
    ///
    /// # Errors
    ///
    /// See [`VehicleCommandDispatcher::send`].
    pub async fn health_status(&self) -> Result<Option<Value>, CommandError> {
        self.send(Command::HealthStatus, None, Payload::Empty).await
    }

    async fn fetch(
        &self,
        resource: &str,
        accept: Option<&'static str>,
    ) -> Result<Option<Value>, CommandError> {
        self.dispatcher.fetch(&self.vin, resource, accept).await
    }

    async fn send(
        &self,
        command: Command,
        pin: Option<&Pin>,
        payload: Payload,
    ) -> Result<Option<Value>, CommandError> {
        self.dispatcher.send(&self.vin, command, pin, payload).await
    }

    async fn climate(&self, parameters: Value) -> Result<Option<Value>, CommandError> {
        self.send(
            Command::Preconditioning,
            None,
            Payload::field("serviceParameters", parameters),
        )
        .await
    }

    async fn charge_parameter(
        &self,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, CommandError> {
        self.send(
            Command::ChargeProfile,
            None,
            Payload::keyed("serviceParameters", service_parameters([(key, value)])),
        )
        .await
    }

    async fn provisioning(
        &self,
        pin: &Pin,
        mode: ProvisioningMode,
        until: Option<DateTime<Utc>>,
    ) -> Result<Option<Value>, CommandError> {
        let payload = Payload::field("serviceCommand", mode.as_str())
            .with("startTime", Value::Null)
            .with("endTime", until.map(|t| t.timestamp_millis()));
        self.send(Command::Provisioning, Some(pin), payload).await
    }
}

fn check_soc(percent: u8) -> Result<(), CommandError> {
    if percent > 100 {
        return Err(CommandError::invalid(format!(
            "max state of charge must be between 0 and 100, got {percent}"
        )));
    }
    Ok(())
}

fn check_rcc_target(target: u8) -> Result<(), CommandError> {
    if !(RCC_TARGET_MIN..=RCC_TARGET_MAX).contains(&target) {
        return Err(CommandError::invalid(format!(
            "climate target must be between {RCC_TARGET_MIN} and {RCC_TARGET_MAX}, got {target}"
        )));
    }
    Ok(())
}

/// Whole degrees are sent without a fractional part.
fn format_temperature(celsius: f64) -> String {
    if celsius.fract() == 0.0 {
        format!("{celsius:.0}")
    } else {
        celsius.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soc_bounds() {
        assert!(check_soc(0).is_ok());
        assert!(check_soc(100).is_ok());
        assert!(matches!(
            check_soc(101),
            Err(CommandError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_rcc_target_bounds() {
        assert!(check_rcc_target(31).is_ok());
        assert!(check_rcc_target(57).is_ok());
        assert!(check_rcc_target(30).is_err());
        assert!(check_rcc_target(58).is_err());
    }

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(21.0), "21");
        assert_eq!(format_temperature(21.5), "21.5");
        assert_eq!(format_temperature(-3.0), "-3");
    }
}

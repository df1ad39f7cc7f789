//! Typed command parameters.
//!
//! These types serialize to the exact shapes the climate, charge profile and
//! provisioning endpoints expect.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::vehicle::errors::CommandError;

/// Climate control optimisation target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimatePriority {
    /// Optimise for cabin comfort.
    Comfort,
    /// Optimise for electric range.
    Range,
}

impl ClimatePriority {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comfort => "PRIORITIZE_COMFORT",
            Self::Range => "PRIORITIZE_RANGE",
        }
    }
}

/// Modes set through the provisioning endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningMode {
    /// Provisioning mode, required before changing vehicle settings.
    Provisioning,
    /// Service mode until a given time.
    ServiceMode,
    /// Transport mode until a given time.
    TransportMode,
    /// Disable journey logging.
    PrivacyOn,
    /// Re-enable journey logging.
    PrivacyOff,
}

impl ProvisioningMode {
    /// Returns the wire value of `serviceCommand`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::ServiceMode => "protectionStrategy_serviceMode",
            Self::TransportMode => "protectionStrategy_transportMode",
            Self::PrivacyOn => "privacySwitch_on",
            Self::PrivacyOff => "privacySwitch_off",
        }
    }
}

/// Days a repeated departure timer fires on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RepeatSchedule {
    /// Fires on Monday.
    pub monday: bool,
    /// Fires on Tuesday.
    pub tuesday: bool,
    /// Fires on Wednesday.
    pub wednesday: bool,
    /// Fires on Thursday.
    pub thursday: bool,
    /// Fires on Friday.
    pub friday: bool,
    /// Fires on Saturday.
    pub saturday: bool,
    /// Fires on Sunday.
    pub sunday: bool,
}

impl RepeatSchedule {
    /// Every day of the week.
    #[must_use]
    pub const fn every_day() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
        }
    }

    /// Monday to Friday.
    #[must_use]
    pub const fn weekdays() -> Self {
        Self {
            saturday: false,
            sunday: false,
            ..Self::every_day()
        }
    }

    /// Returns `true` if no day is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.monday
            || self.tuesday
            || self.wednesday
            || self.thursday
            || self.friday
            || self.saturday
            || self.sunday)
    }
}

/// Time of day a departure timer targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DepartureTime {
    hour: u8,
    minute: u8,
}

impl DepartureTime {
    /// Creates a departure time.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for an hour above 23 or a
    /// minute above 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, CommandError> {
        if hour > 23 || minute > 59 {
            return Err(CommandError::invalid(format!(
                "departure time {hour:02}:{minute:02} is not a valid time of day"
            )));
        }
        Ok(Self { hour, minute })
    }
}

/// When a departure timer applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerTarget {
    /// A single calendar day.
    SingleDay {
        /// Day of month.
        day: u32,
        /// Month, 1 to 12.
        month: u32,
        /// Calendar year.
        year: i32,
    },
    /// A weekly schedule.
    RepeatSchedule(RepeatSchedule),
}

impl TimerTarget {
    /// A timer for one date.
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        Self::SingleDay {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }
    }

    /// A timer repeating on a weekly schedule.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for an empty schedule.
    pub fn repeating(schedule: RepeatSchedule) -> Result<Self, CommandError> {
        if schedule.is_empty() {
            return Err(CommandError::invalid("repeat schedule selects no day"));
        }
        Ok(Self::RepeatSchedule(schedule))
    }
}

#[derive(Serialize)]
struct TimerType {
    key: &'static str,
    value: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimerEntry {
    departure_time: DepartureTime,
    timer_index: u32,
    timer_target: TimerTarget,
    timer_type: TimerType,
}

/// A departure timer that both charges and preconditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepartureTimer {
    /// Slot the timer occupies.
    pub index: u32,
    /// Target time of day.
    pub time: DepartureTime,
    /// Date or schedule.
    pub target: TimerTarget,
}

impl DepartureTimer {
    /// Returns the `departureTimerSetting` value adding this timer.
    #[must_use]
    pub fn to_setting(&self) -> Value {
        let entry = TimerEntry {
            departure_time: self.time,
            timer_index: self.index,
            timer_target: self.target,
            timer_type: TimerType {
                key: "BOTHCHARGEANDPRECONDITION",
                value: true,
            },
        };
        json!({ "timers": [entry] })
    }

    /// Returns the `departureTimerSetting` value deleting the timer at `index`.
    #[must_use]
    pub fn deletion(index: u32) -> Value {
        json!({ "timers": [{ "timerIndex": index }] })
    }
}

/// Builds a `serviceParameters` list of key/value pairs.
pub(crate) fn service_parameters<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Value)>,
) -> Value {
    Value::Array(
        pairs
            .into_iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect(),
    )
}

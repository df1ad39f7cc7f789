//! Vendor media types used by the InControl API.
//!
//! Version suffixes are part of the contract: a `v4` endpoint does not
//! accept a `v3` body, so each command uses exactly the type listed for it
//! in [`crate::vehicle::Command`].

/// Account resource (login and user info reads).
pub const USER_V3: &str = "application/vnd.wirelesscar.ngtp.if9.User-v3+json";

/// Account resource update body.
pub const USER_V3_UTF8: &str = "application/vnd.wirelesscar.ngtp.if9.User-v3+json; charset=utf-8";

/// Service authentication request body.
pub const AUTHENTICATE_REQUEST_V2: &str =
    "application/vnd.wirelesscar.ngtp.if9.AuthenticateRequest-v2+json; charset=utf-8";

/// Door and engine command body.
pub const START_SERVICE_CONFIGURATION_V2: &str =
    "application/vnd.wirelesscar.ngtp.if9.StartServiceConfiguration-v2+json";

/// Alarm, horn, wake up, provisioning and health command body.
pub const START_SERVICE_CONFIGURATION_V3: &str =
    "application/vnd.wirelesscar.ngtp.if9.StartServiceConfiguration-v3+json; charset=utf-8";

/// Climate and charge profile command body.
pub const PHEV_SERVICE_V1: &str =
    "application/vnd.wirelesscar.ngtp.if9.PhevService-v1+json; charset=utf-8";

/// Service status response, version 3.
pub const SERVICE_STATUS_V3: &str = "application/vnd.wirelesscar.ngtp.if9.ServiceStatus-v3+json";

/// Service status response, version 4.
pub const SERVICE_STATUS_V4: &str = "application/vnd.wirelesscar.ngtp.if9.ServiceStatus-v4+json";

/// Service status response, version 5.
pub const SERVICE_STATUS_V5: &str = "application/vnd.wirelesscar.ngtp.if9.ServiceStatus-v5+json";

/// Vehicle attributes response.
pub const VEHICLE_ATTRIBUTES_V3: &str = "application/vnd.ngtp.org.VehicleAttributes-v3+json";

/// Vehicle status response.
pub const HEALTH_STATUS_V2: &str = "application/vnd.ngtp.org.if9.healthstatus-v2+json";

/// Trip list response.
pub const TRIP_LIST_V2: &str = "application/vnd.ngtp.org.triplist-v2+json";

/// Departure timer settings response.
pub const DEPARTURE_TIMER_SETTINGS_V1: &str =
    "application/vnd.wirelesscar.ngtp.if9.DepartureTimerSettings-v1+json";

/// Scheduled wake up time response.
pub const VEHICLE_WAKEUP_TIME_V2: &str =
    "application/vnd.wirelesscar.ngtp.if9.VehicleWakeupTime-v2+json";

use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`, the instant clients
/// send when their clock value was never set.
const UNSET_INSTANT_SECS: i64 = -62_135_596_800;

/// One client report: where it was taken, when, and which devices were seen.
///
/// Absent fields decode to their unset state so that the validator, not the
/// JSON parser, decides what is missing.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Submission {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// A persisted `device_interactions` row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInteraction {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub device_id: i64,
    pub device_name: String,
}

impl Submission {
    /// The timestamp, unless it is absent or the zero instant.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.filter(|ts| !is_unset_instant(ts))
    }

    /// One row per device, in list order. Returns nothing for a submission
    /// that has not been validated.
    pub fn interactions(&self) -> Vec<DeviceInteraction> {
        let (Some(timestamp), Some(latitude), Some(longitude)) = (self.recorded_at(), self.location.latitude, self.location.longitude) else {
            return Vec::new();
        };

        self.devices
            .iter()
            .map(|device| DeviceInteraction {
                timestamp,
                latitude,
                longitude,
                device_id: device.id,
                device_name: device.name.clone(),
            })
            .collect()
    }
}

pub fn is_unset_instant(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() == UNSET_INSTANT_SECS && ts.timestamp_subsec_nanos() == 0
}

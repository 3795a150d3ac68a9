//! JSON wire form of an activity and the conversions at the registry
//! boundary.
//!
//! Timestamps travel as ISO-8601 strings. The backend emits them without a
//! zone and with fractional seconds (`2024-05-01T10:00:00.1234567`); those
//! are read as UTC. Offsets (`Z`, `+02:00`) are honoured when present.
//! Sub-second digits are dropped on the way in, so a date survives egress
//! and re-ingestion unchanged.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::models::{Activity, Attendee, CurrentUser};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeWire {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityWire {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub attendees: Vec<AttendeeWire>,
}

impl ActivityWire {
    /// Ingest a wire payload: parse the timestamp and derive the
    /// current-user flags.
    pub fn into_activity(self, user: &CurrentUser) -> Result<Activity, WireError> {
        if self.id.is_empty() {
            return Err(WireError::MissingId);
        }
        let date = parse_timestamp(&self.date)?;

        let mut activity = Activity {
            id: self.id,
            title: self.title,
            category: self.category,
            description: self.description,
            date,
            city: self.city,
            venue: self.venue,
            attendees: self.attendees.into_iter().map(Attendee::from).collect(),
            is_host: false,
            is_going: false,
        };
        activity.apply_user(user);
        Ok(activity)
    }
}

impl From<&Activity> for ActivityWire {
    fn from(a: &Activity) -> Self {
        Self {
            id: a.id.clone(),
            title: a.title.clone(),
            category: a.category.clone(),
            description: a.description.clone(),
            date: format_timestamp(&a.date),
            city: a.city.clone(),
            venue: a.venue.clone(),
            attendees: a.attendees.iter().cloned().map(AttendeeWire::from).collect(),
        }
    }
}

impl From<AttendeeWire> for Attendee {
    fn from(w: AttendeeWire) -> Self {
        Self {
            username: w.username,
            display_name: w.display_name,
            image: w.image,
            is_host: w.is_host,
        }
    }
}

impl From<Attendee> for AttendeeWire {
    fn from(a: Attendee) -> Self {
        Self {
            username: a.username,
            display_name: a.display_name,
            image: a.image,
            is_host: a.is_host,
        }
    }
}

/// Parse an ISO-8601 timestamp to whole-second precision, reading zone-less
/// values as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, WireError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).trunc_subsecs(0));
    }

    let mut last_err = None;
    for fmt in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(value, fmt) {
            Ok(naive) => return Ok(Utc.from_utc_datetime(&naive).trunc_subsecs(0)),
            Err(e) => last_err = Some(e),
        }
    }

    Err(WireError::InvalidTimestamp {
        value: value.to_string(),
        reason: last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unrecognised format".to_string()),
    })
}

/// Format a timestamp as RFC 3339 UTC with second precision.
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

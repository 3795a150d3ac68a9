//! In-memory domain model.
//!
//! These are the values held by the store's registry. The wire form lives in
//! [`crate::wire`]; conversion happens once at the registry boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Attendee
// ---------------------------------------------------------------------------

/// A user's participation record on an activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Unique within an activity's attendee list.
    pub username: String,
    pub display_name: String,
    pub image: Option<String>,
    pub is_host: bool,
}

// ---------------------------------------------------------------------------
// Current user
// ---------------------------------------------------------------------------

/// The acting user. `is_host` / `is_going` on every activity are derived
/// relative to this profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub username: String,
    pub display_name: String,
    pub image: Option<String>,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            image: None,
        }
    }

    /// Attendee record for this user.
    pub fn as_attendee(&self, is_host: bool) -> Attendee {
        Attendee {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            image: self.image.clone(),
            is_host,
        }
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// The central entity: an event with a date, a place and attendees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Opaque identifier, immutable once assigned.
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub city: String,
    pub venue: String,
    pub attendees: Vec<Attendee>,
    /// Whether the current user hosts this activity.
    pub is_host: bool,
    /// Whether the current user attends this activity.
    pub is_going: bool,
}

impl Activity {
    /// Recompute `is_host` / `is_going` from the attendee list.
    pub fn apply_user(&mut self, user: &CurrentUser) {
        let me = self
            .attendees
            .iter()
            .find(|a| a.username == user.username);
        self.is_going = me.is_some();
        self.is_host = me.map(|a| a.is_host).unwrap_or(false);
    }

    /// Append `attendee` unless a record with the same username exists.
    pub fn add_attendee(&mut self, attendee: Attendee) {
        if !self.attendees.iter().any(|a| a.username == attendee.username) {
            self.attendees.push(attendee);
        }
    }

    /// Remove every record matching `username`, keeping the others in order.
    pub fn remove_attendee(&mut self, username: &str) {
        self.attendees.retain(|a| a.username != username);
    }

    /// The hosting attendee, if any.
    pub fn host(&self) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.is_host)
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// User-entered fields of an activity that has not been created yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub title: String,
    pub category: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub city: String,
    pub venue: String,
}

impl ActivityDraft {
    /// Turn the draft into an activity with a freshly generated id.
    pub fn into_activity(self) -> Activity {
        Activity {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            category: self.category,
            description: self.description,
            date: self.date,
            city: self.city,
            venue: self.venue,
            attendees: Vec::new(),
            is_host: false,
            is_going: false,
        }
    }
}

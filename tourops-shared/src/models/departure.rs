use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepartureStatus {
    #[default]
    Scheduled,
    Full,
    Ongoing,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// One scheduled run of a tour package with fixed dates and seat capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(deserialize_with = "crate::fields::deserialize_reference")]
    pub package_id: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub total_seats: u32,
    #[serde(default)]
    pub booked_seats: u32,
    #[serde(default)]
    pub status: DepartureStatus,
    /// Assigned operator user ids
    #[serde(default)]
    pub operators: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<Value>,
    #[serde(default)]
    pub tour_started: bool,
    #[serde(default)]
    pub safety_checklist: Option<Value>,
}

impl Departure {
    pub fn is_cancelled(&self) -> bool {
        self.status == DepartureStatus::Cancelled
    }

    /// Booked share of capacity, 0.0 for a departure without seats.
    pub fn occupancy(&self) -> f64 {
        if self.total_seats == 0 {
            0.0
        } else {
            self.booked_seats as f64 / self.total_seats as f64
        }
    }

    /// True when the start is still ahead of `now` but no further than `window`.
    pub fn starts_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.start_date > now && self.start_date - now <= window
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now
    }

    pub fn is_assigned_to(&self, operator_id: &str) -> bool {
        self.operators.iter().any(|op| op == operator_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SeatStatus {
    Free,
    Booked,
    BookedChecked,
}

/// One seat as persisted inside a departure's `seatMap`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatSnapshotEntry {
    pub number: u32,
    pub status: SeatStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_name: Option<String>,
    pub checked_in: bool,
}

/// Partial body for `PUT /departures/{id}`. Absent fields are left untouched upstream.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeparturePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_map: Option<Vec<SeatSnapshotEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_checklist: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_started: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DepartureStatus>,
}

impl DeparturePatch {
    pub fn seat_map(entries: Vec<SeatSnapshotEntry>) -> Self {
        Self {
            seat_map: Some(entries),
            ..Default::default()
        }
    }
}

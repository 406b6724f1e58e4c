use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::fields;
use crate::pii::Masked;

/// Booking status as reported by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    /// Cancelled and pending bookings never reach the operator manifest.
    pub fn is_manifest_visible(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Refunded => "REFUNDED",
            BookingStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
    Refunded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub amount: f64,
    pub status: PaymentStatus,
}

/// One person travelling under a booking.
///
/// Deserialized from a loose JSON object so the legacy field names listed in
/// [`fields`] resolve to the same struct.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Traveler {
    pub full_name: String,
    pub age: Option<u32>,
    pub phone: Masked<String>,
    pub emergency_contact: Option<Masked<String>>,
}

impl Traveler {
    pub fn has_emergency_contact(&self) -> bool {
        self.emergency_contact.is_some()
    }
}

impl From<Map<String, Value>> for Traveler {
    fn from(object: Map<String, Value>) -> Self {
        Self {
            full_name: fields::first_text(&object, fields::TRAVELER_NAME).unwrap_or_default(),
            age: object
                .get("age")
                .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
                .and_then(|age| u32::try_from(age).ok()),
            phone: fields::first_text(&object, fields::TRAVELER_PHONE)
                .unwrap_or_default()
                .into(),
            emergency_contact: fields::first_text(&object, fields::TRAVELER_EMERGENCY_CONTACT)
                .map(Masked),
        }
    }
}

/// A booking as served by the backend. Read-only to this workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(deserialize_with = "fields::deserialize_reference")]
    pub package_id: String,
    #[serde(default, deserialize_with = "fields::deserialize_optional_reference")]
    pub group_departure_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
    #[serde(default)]
    pub travelers: Vec<Traveler>,
    /// Aligned with `travelers`; individual entries may be missing.
    #[serde(default)]
    pub reserved_seats: Vec<Option<u32>>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Everything else the backend sent, kept for field probing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    pub fn is_paid(&self) -> bool {
        self.payments.iter().any(|p| p.status == PaymentStatus::Success)
    }

    /// "PAID" once any payment succeeded, otherwise the booking's own status.
    pub fn payment_label(&self) -> String {
        if self.is_paid() {
            "PAID".to_string()
        } else {
            self.status.to_string()
        }
    }

    pub fn reserved_seat(&self, traveler_index: usize) -> Option<u32> {
        self.reserved_seats.get(traveler_index).copied().flatten()
    }

    pub fn customer_name(&self) -> Option<String> {
        fields::first_text(&self.extra, fields::CUSTOMER_NAME)
    }

    pub fn customer_email(&self) -> Option<String> {
        fields::first_text(&self.extra, fields::CUSTOMER_EMAIL)
    }
}

/// Tour package. Only used here to derive booking display prefixes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booking_deserialization_with_legacy_fields() {
        let raw = json!({
            "_id": "b-1",
            "packageId": "p-1",
            "groupDepartureId": "d-1",
            "createdAt": "2025-01-10T08:00:00Z",
            "status": "CONFIRMED",
            "travelers": [
                { "fullName": "Ayesha Siddiqua", "age": 31, "phone": "0171", "phoneEmergency": "0181" },
                { "name": "Tanvir", "age": "9", "phone": "0172" }
            ],
            "reservedSeats": [4, null],
            "payments": [{ "amount": 12000, "status": "SUCCESS" }],
            "customerName": "Ayesha Siddiqua",
            "paymentMethod": "bkash"
        });

        let booking: Booking = serde_json::from_value(raw).expect("Failed to deserialize");
        assert_eq!(booking.id, "b-1");
        assert_eq!(booking.travelers.len(), 2);
        assert_eq!(booking.travelers[0].full_name, "Ayesha Siddiqua");
        assert!(booking.travelers[0].has_emergency_contact());
        assert_eq!(booking.travelers[1].full_name, "Tanvir");
        assert_eq!(booking.travelers[1].age, Some(9));
        assert!(!booking.travelers[1].has_emergency_contact());
        assert_eq!(booking.reserved_seat(0), Some(4));
        assert_eq!(booking.reserved_seat(1), None);
        assert_eq!(booking.reserved_seat(2), None);
        assert_eq!(booking.payment_label(), "PAID");
        assert_eq!(booking.customer_name().as_deref(), Some("Ayesha Siddiqua"));
    }

    #[test]
    fn test_populated_references_resolve_to_ids() {
        let raw = json!({
            "_id": "b-3",
            "packageId": { "_id": "p-1", "title": "Sajek Valley Escape" },
            "groupDepartureId": { "_id": "d-1", "startDate": "2025-03-01T00:00:00Z" },
            "createdAt": "2025-01-10T08:00:00Z",
            "status": "CONFIRMED"
        });
        let booking: Booking = serde_json::from_value(raw).unwrap();
        assert_eq!(booking.package_id, "p-1");
        assert_eq!(booking.group_departure_id.as_deref(), Some("d-1"));
        assert!(!booking.extra.contains_key("packageId"));

        let raw = json!({
            "id": "b-4",
            "packageId": "p-1",
            "groupDepartureId": null,
            "createdAt": "2025-01-10T08:00:00Z",
            "status": "PENDING"
        });
        let booking: Booking = serde_json::from_value(raw).unwrap();
        assert_eq!(booking.group_departure_id, None);
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let raw = json!({
            "id": "b-2",
            "packageId": "p-1",
            "createdAt": "2025-01-10T08:00:00Z",
            "status": "ON_HOLD",
            "payments": [{ "amount": 100, "status": "PENDING" }]
        });
        let booking: Booking = serde_json::from_value(raw).unwrap();
        assert_eq!(booking.status, BookingStatus::Unknown);
        assert_eq!(booking.payment_label(), "UNKNOWN");
        assert!(booking.status.is_manifest_visible());
        assert!(!BookingStatus::Pending.is_manifest_visible());
        assert!(!BookingStatus::Cancelled.is_manifest_visible());
    }
}

use serde::Serialize;
use tourops_shared::{Booking, Masked};
use tracing::warn;

use crate::checkin::CheckInMap;
use crate::sequencer::DisplayIds;

/// One traveler flattened into a manifest line
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRow {
    /// `<bookingId>-<travelerIndex>`
    pub id: String,
    pub name: String,
    pub booking_id: String,
    pub booking_display_id: String,
    pub phone: Masked<String>,
    pub payment_status: String,
    pub seat_number: u32,
    pub emergency_contact: Option<Masked<String>>,
}

impl PassengerRow {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "PAID"
    }

    pub fn has_emergency_contact(&self) -> bool {
        self.emergency_contact.is_some()
    }
}

/// Expand a departure's bookings into passenger rows.
///
/// Cancelled and pending bookings are skipped. A traveler without a reserved
/// seat gets the next sequential number across the whole departure.
pub fn flatten_passengers(bookings: &[Booking], display_ids: &DisplayIds) -> Vec<PassengerRow> {
    let mut rows: Vec<PassengerRow> = Vec::new();

    for booking in bookings.iter().filter(|b| b.status.is_manifest_visible()) {
        let display_id = match display_ids.display_id(&booking.id) {
            Some(id) => id.to_string(),
            None => {
                warn!("Booking {} has no display id, falling back to its raw id", booking.id);
                booking.id.clone()
            }
        };
        let payment_status = booking.payment_label();

        for (index, traveler) in booking.travelers.iter().enumerate() {
            let seat_number = booking
                .reserved_seat(index)
                .unwrap_or(rows.len() as u32 + 1);

            rows.push(PassengerRow {
                id: format!("{}-{}", booking.id, index),
                name: traveler.full_name.clone(),
                booking_id: booking.id.clone(),
                booking_display_id: display_id.clone(),
                phone: traveler.phone.clone(),
                payment_status: payment_status.clone(),
                seat_number,
                emergency_contact: traveler.emergency_contact.clone(),
            });
        }
    }

    rows
}

/// Day-of counters shown above the manifest
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub passengers: usize,
    pub checked_in: usize,
    pub unpaid: usize,
    pub missing_emergency_contact: usize,
}

impl ManifestSummary {
    pub fn from_rows(rows: &[PassengerRow], check_ins: &CheckInMap) -> Self {
        Self {
            passengers: rows.len(),
            checked_in: rows.iter().filter(|r| check_ins.is_checked_in(&r.id)).count(),
            unpaid: rows.iter().filter(|r| !r.is_paid()).count(),
            missing_emergency_contact: rows.iter().filter(|r| !r.has_emergency_contact()).count(),
        }
    }
}

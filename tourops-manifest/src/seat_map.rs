use serde::Serialize;
use std::collections::HashMap;
use tourops_shared::{SeatSnapshotEntry, SeatStatus};

use crate::checkin::CheckInMap;
use crate::passengers::PassengerRow;

/// Seats per grid row on the coach layout
pub const SEATS_PER_ROW: usize = 4;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatOccupant {
    pub passenger_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Seat {
    pub number: u32,
    pub status: SeatStatus,
    pub passenger: Option<SeatOccupant>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatCounts {
    pub free: usize,
    pub booked: usize,
    pub booked_checked: usize,
}

impl SeatCounts {
    pub fn total(&self) -> usize {
        self.free + self.booked + self.booked_checked
    }

    pub fn occupied(&self) -> usize {
        self.booked + self.booked_checked
    }
}

/// Seat grid for one departure. Always a projection of the passenger rows and
/// check-in flags; rebuild instead of patching.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SeatMap {
    rows: Vec<Vec<Seat>>,
}

impl SeatMap {
    pub fn build(
        total_seats: u32,
        booked_seats: u32,
        passengers: &[PassengerRow],
        check_ins: &CheckInMap,
    ) -> Self {
        // first row claiming a seat number wins
        let mut by_seat: HashMap<u32, &PassengerRow> = HashMap::new();
        for passenger in passengers {
            by_seat.entry(passenger.seat_number).or_insert(passenger);
        }

        let seats: Vec<Seat> = (1..=total_seats)
            .map(|number| {
                if number > booked_seats {
                    return Seat {
                        number,
                        status: SeatStatus::Free,
                        passenger: None,
                    };
                }

                match by_seat.get(&number) {
                    Some(p) => Seat {
                        number,
                        status: if check_ins.is_checked_in(&p.id) {
                            SeatStatus::BookedChecked
                        } else {
                            SeatStatus::Booked
                        },
                        passenger: Some(SeatOccupant {
                            passenger_id: p.id.clone(),
                            name: p.name.clone(),
                        }),
                    },
                    // counted as booked upstream but nobody sits there yet
                    None => Seat {
                        number,
                        status: SeatStatus::Booked,
                        passenger: None,
                    },
                }
            })
            .collect();

        Self {
            rows: seats
                .chunks(SEATS_PER_ROW)
                .map(|chunk| chunk.to_vec())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Seat>] {
        &self.rows
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.rows.iter().flatten()
    }

    pub fn seat(&self, number: u32) -> Option<&Seat> {
        self.seats().find(|s| s.number == number)
    }

    pub fn counts(&self) -> SeatCounts {
        self.seats().fold(SeatCounts::default(), |mut counts, seat| {
            match seat.status {
                SeatStatus::Free => counts.free += 1,
                SeatStatus::Booked => counts.booked += 1,
                SeatStatus::BookedChecked => counts.booked_checked += 1,
            }
            counts
        })
    }

    /// Flat form sent upstream in `PUT /departures/{id}`
    pub fn snapshot(&self) -> Vec<SeatSnapshotEntry> {
        self.seats()
            .map(|seat| SeatSnapshotEntry {
                number: seat.number,
                status: seat.status,
                passenger_id: seat.passenger.as_ref().map(|p| p.passenger_id.clone()),
                passenger_name: seat.passenger.as_ref().map(|p| p.name.clone()),
                checked_in: seat.status == SeatStatus::BookedChecked,
            })
            .collect()
    }
}

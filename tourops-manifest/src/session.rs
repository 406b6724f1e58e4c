use serde::Serialize;
use serde_json::Value;
use tourops_shared::{Departure, DepartureStatus, SeatSnapshotEntry};
use tracing::debug;

use crate::checkin::{CheckInMap, Confirm};
use crate::passengers::{ManifestSummary, PassengerRow};
use crate::seat_map::SeatMap;
use crate::ManifestError;

/// Identifies one departure selection. Loads carrying an outdated ticket are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    departure_id: String,
}

impl LoadTicket {
    pub fn departure_id(&self) -> &str {
        &self.departure_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything fetched for one departure, already flattened
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub departure: Departure,
    pub passengers: Vec<PassengerRow>,
}

#[derive(Debug, Clone)]
struct ActiveManifest {
    departure: Departure,
    passengers: Vec<PassengerRow>,
    check_ins: CheckInMap,
    seat_map: SeatMap,
}

impl ActiveManifest {
    fn rebuild_seat_map(&mut self) {
        self.seat_map = SeatMap::build(
            self.departure.total_seats,
            self.departure.booked_seats,
            &self.passengers,
            &self.check_ins,
        );
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerView {
    #[serde(flatten)]
    pub row: PassengerRow,
    pub checked_in: bool,
}

/// Read model handed to the console UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestView {
    pub departure_id: String,
    pub generation: u64,
    pub status: DepartureStatus,
    pub total_seats: u32,
    pub booked_seats: u32,
    pub tour_started: bool,
    pub safety_checklist: Option<Value>,
    pub passengers: Vec<PassengerView>,
    pub seat_map: SeatMap,
    pub summary: ManifestSummary,
}

/// Result of a local mutation, carrying what has to be persisted
#[derive(Debug, Clone)]
pub struct SeatMapChange {
    pub departure_id: String,
    pub snapshot: Vec<SeatSnapshotEntry>,
}

/// State of one operator console: the selected departure, its passengers and
/// the check-in flags. All mutation is synchronous; callers do their network
/// work outside of it.
#[derive(Debug, Default)]
pub struct ManifestSession {
    generation: u64,
    selected: Option<String>,
    manifest: Option<ActiveManifest>,
}

impl ManifestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to another departure (or re-select the same one to reload).
    /// Discards the current manifest and its check-in flags.
    pub fn select(&mut self, departure_id: &str) -> LoadTicket {
        self.generation += 1;
        self.selected = Some(departure_id.to_string());
        self.manifest = None;
        LoadTicket {
            generation: self.generation,
            departure_id: departure_id.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Install a load result. Returns false, changing nothing, when the ticket is stale.
    pub fn apply(&mut self, ticket: &LoadTicket, loaded: LoadedManifest) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale manifest for departure {} (generation {}, current {})",
                ticket.departure_id, ticket.generation, self.generation
            );
            return false;
        }

        let check_ins = CheckInMap::for_passengers(&loaded.passengers);
        let mut manifest = ActiveManifest {
            departure: loaded.departure,
            passengers: loaded.passengers,
            check_ins,
            seat_map: SeatMap::default(),
        };
        manifest.rebuild_seat_map();
        self.manifest = Some(manifest);
        true
    }

    pub fn selected_departure(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.manifest.is_some()
    }

    pub fn view(&self) -> Option<ManifestView> {
        let m = self.manifest.as_ref()?;
        Some(ManifestView {
            departure_id: m.departure.id.clone(),
            generation: self.generation,
            status: m.departure.status,
            total_seats: m.departure.total_seats,
            booked_seats: m.departure.booked_seats,
            tour_started: m.departure.tour_started,
            safety_checklist: m.departure.safety_checklist.clone(),
            passengers: m
                .passengers
                .iter()
                .map(|row| PassengerView {
                    row: row.clone(),
                    checked_in: m.check_ins.is_checked_in(&row.id),
                })
                .collect(),
            seat_map: m.seat_map.clone(),
            summary: ManifestSummary::from_rows(&m.passengers, &m.check_ins),
        })
    }

    pub fn check_ins(&self) -> Option<&CheckInMap> {
        self.manifest.as_ref().map(|m| &m.check_ins)
    }

    pub fn seat_map(&self) -> Option<&SeatMap> {
        self.manifest.as_ref().map(|m| &m.seat_map)
    }

    /// Flip one passenger's check-in. Returns the new flag and the snapshot to persist.
    pub fn toggle_check_in(&mut self, passenger_id: &str) -> Result<(bool, SeatMapChange), ManifestError> {
        let m = self.manifest.as_mut().ok_or(ManifestError::NoDepartureLoaded)?;
        let checked_in = m.check_ins.toggle(passenger_id)?;
        m.rebuild_seat_map();
        Ok((
            checked_in,
            SeatMapChange {
                departure_id: m.departure.id.clone(),
                snapshot: m.seat_map.snapshot(),
            },
        ))
    }

    /// Check every passenger in after the operator confirms.
    /// `Ok(None)` means the prompt was declined and nothing changed.
    pub fn mark_all_present(
        &mut self,
        confirm: &dyn Confirm,
    ) -> Result<Option<(usize, SeatMapChange)>, ManifestError> {
        let m = self.manifest.as_mut().ok_or(ManifestError::NoDepartureLoaded)?;
        let prompt = format!("Mark all {} passengers as present?", m.passengers.len());
        if !confirm.confirm(&prompt) {
            return Ok(None);
        }

        m.check_ins.mark_all_present();
        m.rebuild_seat_map();
        Ok(Some((
            m.check_ins.checked_in_count(),
            SeatMapChange {
                departure_id: m.departure.id.clone(),
                snapshot: m.seat_map.snapshot(),
            },
        )))
    }

    /// Mark the tour as started locally after confirmation. Returns the departure id.
    pub fn start_tour(&mut self, confirm: &dyn Confirm) -> Result<Option<String>, ManifestError> {
        let m = self.manifest.as_mut().ok_or(ManifestError::NoDepartureLoaded)?;
        let prompt = format!(
            "Start the tour with {} of {} passengers checked in?",
            m.check_ins.checked_in_count(),
            m.passengers.len()
        );
        if !confirm.confirm(&prompt) {
            return Ok(None);
        }

        m.departure.tour_started = true;
        m.departure.status = DepartureStatus::Ongoing;
        Ok(Some(m.departure.id.clone()))
    }

    pub fn set_safety_checklist(&mut self, checklist: Value) -> Result<String, ManifestError> {
        let m = self.manifest.as_mut().ok_or(ManifestError::NoDepartureLoaded)?;
        m.departure.safety_checklist = Some(checklist);
        Ok(m.departure.id.clone())
    }
}

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tourops_core::{BookingRepository, DepartureRepository, PackageRepository};
use tourops_shared::{DeparturePatch, DepartureStatus};
use tracing::{debug, info, warn};

use crate::checkin::Confirm;
use crate::passengers::flatten_passengers;
use crate::sequencer::BookingSequencer;
use crate::session::{LoadedManifest, ManifestSession, ManifestView, SeatMapChange};
use crate::ManifestError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInOutcome {
    pub passenger_id: String,
    pub checked_in: bool,
    /// False when the snapshot could not be written; the local flag stays as is.
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkCheckInOutcome {
    /// False when the operator declined the prompt
    pub applied: bool,
    pub checked_in: usize,
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub applied: bool,
    pub persisted: bool,
}

/// One operator's departure console.
///
/// Loads go through a [`ManifestSession`] ticket so a slow response for a
/// departure the operator already left never lands on screen. Persistence of
/// check-in snapshots is best effort: failures are logged and reported, local
/// state is not rolled back.
///
/// Every write holds `writes` from the moment its patch is built until the
/// backend answers, so patches reach the backend in the order they were taken.
pub struct DepartureConsole {
    departures: Arc<dyn DepartureRepository>,
    bookings: Arc<dyn BookingRepository>,
    packages: Arc<dyn PackageRepository>,
    session: Mutex<ManifestSession>,
    writes: Mutex<()>,
}

impl DepartureConsole {
    pub fn new(
        departures: Arc<dyn DepartureRepository>,
        bookings: Arc<dyn BookingRepository>,
        packages: Arc<dyn PackageRepository>,
    ) -> Self {
        Self {
            departures,
            bookings,
            packages,
            session: Mutex::new(ManifestSession::new()),
            writes: Mutex::new(()),
        }
    }

    /// Select a departure and load its manifest.
    ///
    /// Returns `Ok(None)` when another selection happened while this one was
    /// loading; the newer selection wins.
    pub async fn open(&self, departure_id: &str) -> Result<Option<ManifestView>, ManifestError> {
        let ticket = self.session.lock().await.select(departure_id);

        let loaded = self.fetch(departure_id).await?;

        let mut session = self.session.lock().await;
        if session.apply(&ticket, loaded) {
            info!(
                "Console loaded departure {} (generation {})",
                departure_id,
                ticket.generation()
            );
            Ok(session.view())
        } else {
            Ok(None)
        }
    }

    /// Reload whatever departure is currently selected
    pub async fn reload(&self) -> Result<Option<ManifestView>, ManifestError> {
        let selected = self.session.lock().await.selected_departure().map(String::from);
        match selected {
            Some(departure_id) => self.open(&departure_id).await,
            None => Err(ManifestError::NoDepartureLoaded),
        }
    }

    pub async fn view(&self) -> Option<ManifestView> {
        self.session.lock().await.view()
    }

    pub async fn toggle_check_in(&self, passenger_id: &str) -> Result<CheckInOutcome, ManifestError> {
        let _write = self.writes.lock().await;
        let (checked_in, change) = self.session.lock().await.toggle_check_in(passenger_id)?;
        debug!("Passenger {} checked_in={}", passenger_id, checked_in);

        let persisted = self.persist_seat_map(change).await;
        Ok(CheckInOutcome {
            passenger_id: passenger_id.to_string(),
            checked_in,
            persisted,
        })
    }

    /// Bulk check-in behind a confirmation prompt; one persistence call.
    pub async fn mark_all_present(&self, confirm: &dyn Confirm) -> Result<BulkCheckInOutcome, ManifestError> {
        let _write = self.writes.lock().await;
        let result = self.session.lock().await.mark_all_present(confirm)?;
        let Some((checked_in, change)) = result else {
            debug!("Mark-all-present declined");
            return Ok(BulkCheckInOutcome {
                applied: false,
                checked_in: 0,
                persisted: false,
            });
        };

        info!("Marked {} passengers present on departure {}", checked_in, change.departure_id);
        let persisted = self.persist_seat_map(change).await;
        Ok(BulkCheckInOutcome {
            applied: true,
            checked_in,
            persisted,
        })
    }

    pub async fn start_tour(&self, confirm: &dyn Confirm) -> Result<ActionOutcome, ManifestError> {
        let _write = self.writes.lock().await;
        let started = self.session.lock().await.start_tour(confirm)?;
        let Some(departure_id) = started else {
            return Ok(ActionOutcome {
                applied: false,
                persisted: false,
            });
        };

        let patch = DeparturePatch {
            tour_started: Some(true),
            status: Some(DepartureStatus::Ongoing),
            ..Default::default()
        };
        info!("Starting tour for departure {}", departure_id);
        Ok(ActionOutcome {
            applied: true,
            persisted: self.persist(&departure_id, &patch).await,
        })
    }

    pub async fn update_safety_checklist(&self, checklist: Value) -> Result<ActionOutcome, ManifestError> {
        let _write = self.writes.lock().await;
        let departure_id = self
            .session
            .lock()
            .await
            .set_safety_checklist(checklist.clone())?;

        let patch = DeparturePatch {
            safety_checklist: Some(checklist),
            ..Default::default()
        };
        Ok(ActionOutcome {
            applied: true,
            persisted: self.persist(&departure_id, &patch).await,
        })
    }

    async fn fetch(&self, departure_id: &str) -> Result<LoadedManifest, ManifestError> {
        // all bookings, not only this departure's, so display ids stay stable
        let (departure, bookings, all_bookings, packages) = tokio::try_join!(
            self.departures.get_departure(departure_id),
            self.bookings.list_for_departure(departure_id),
            self.bookings.list_all(),
            self.packages.list_packages(),
        )?;

        let departure =
            departure.ok_or_else(|| ManifestError::DepartureNotFound(departure_id.to_string()))?;

        let display_ids = BookingSequencer::new(&packages).assign(&all_bookings);
        let passengers = flatten_passengers(&bookings, &display_ids);

        Ok(LoadedManifest {
            departure,
            passengers,
        })
    }

    async fn persist_seat_map(&self, change: SeatMapChange) -> bool {
        let patch = DeparturePatch::seat_map(change.snapshot);
        self.persist(&change.departure_id, &patch).await
    }

    async fn persist(&self, departure_id: &str, patch: &DeparturePatch) -> bool {
        match self.departures.update_departure(departure_id, patch).await {
            Ok(()) => true,
            Err(e) => {
                // displayed state is kept; it may now differ from the backend
                warn!("Failed to persist departure {}: {}", departure_id, e);
                false
            }
        }
    }
}

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tourops_core::{
    BookingRepository, CoreError, CoreResult, DepartureRepository, ModerationRepository,
    PackageRepository,
};
use tourops_shared::{
    Booking, ContactMessage, Departure, DeparturePatch, KycSubmission, Package, Review,
    SeatSnapshotEntry,
};
use tracing::info;

/// Fixture contents for an in-memory backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub packages: Vec<Package>,
    pub departures: Vec<Departure>,
    pub bookings: Vec<Booking>,
    pub contacts: Vec<ContactMessage>,
    pub kyc: Vec<KycSubmission>,
    pub reviews: Vec<Review>,
}

impl Seed {
    pub async fn from_file(path: &Path) -> CoreResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Backend held entirely in process memory. Writes apply the patch to the
/// stored departure and keep the last seat map snapshot.
#[derive(Default)]
pub struct InMemoryBackend {
    data: RwLock<Seed>,
    seat_maps: RwLock<HashMap<String, Vec<SeatSnapshotEntry>>>,
    writes: RwLock<Vec<(String, DeparturePatch)>>,
}

impl InMemoryBackend {
    pub fn new(seed: Seed) -> Self {
        info!(
            packages = seed.packages.len(),
            departures = seed.departures.len(),
            bookings = seed.bookings.len(),
            "In-memory backend seeded"
        );
        Self {
            data: RwLock::new(seed),
            ..Default::default()
        }
    }

    /// Last seat map written for a departure
    pub async fn seat_map(&self, departure_id: &str) -> Option<Vec<SeatSnapshotEntry>> {
        self.seat_maps.read().await.get(departure_id).cloned()
    }

    /// Every `update_departure` call, in order
    pub async fn writes(&self) -> Vec<(String, DeparturePatch)> {
        self.writes.read().await.clone()
    }

    pub async fn insert_booking(&self, booking: Booking) {
        self.data.write().await.bookings.push(booking);
    }
}

#[async_trait]
impl BookingRepository for InMemoryBackend {
    async fn list_for_departure(&self, departure_id: &str) -> CoreResult<Vec<Booking>> {
        Ok(self
            .data
            .read()
            .await
            .bookings
            .iter()
            .filter(|b| b.group_departure_id.as_deref() == Some(departure_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> CoreResult<Vec<Booking>> {
        Ok(self.data.read().await.bookings.clone())
    }
}

#[async_trait]
impl PackageRepository for InMemoryBackend {
    async fn list_packages(&self) -> CoreResult<Vec<Package>> {
        Ok(self.data.read().await.packages.clone())
    }

    async fn get_package(&self, id: &str) -> CoreResult<Option<Package>> {
        Ok(self.data.read().await.packages.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl DepartureRepository for InMemoryBackend {
    async fn get_departure(&self, id: &str) -> CoreResult<Option<Departure>> {
        Ok(self.data.read().await.departures.iter().find(|d| d.id == id).cloned())
    }

    async fn list_departures(&self) -> CoreResult<Vec<Departure>> {
        Ok(self.data.read().await.departures.clone())
    }

    async fn update_departure(&self, id: &str, patch: &DeparturePatch) -> CoreResult<()> {
        {
            let mut data = self.data.write().await;
            let departure = data
                .departures
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| CoreError::NotFound {
                    entity: "departure",
                    id: id.to_string(),
                })?;

            if let Some(checklist) = &patch.safety_checklist {
                departure.safety_checklist = Some(checklist.clone());
            }
            if let Some(started) = patch.tour_started {
                departure.tour_started = started;
            }
            if let Some(itinerary) = &patch.itinerary {
                departure.itinerary = itinerary.clone();
            }
            if let Some(status) = patch.status {
                departure.status = status;
            }
        }

        if let Some(seat_map) = &patch.seat_map {
            self.seat_maps
                .write()
                .await
                .insert(id.to_string(), seat_map.clone());
        }
        self.writes.write().await.push((id.to_string(), patch.clone()));
        Ok(())
    }
}

#[async_trait]
impl ModerationRepository for InMemoryBackend {
    async fn list_contacts(&self) -> CoreResult<Vec<ContactMessage>> {
        Ok(self.data.read().await.contacts.clone())
    }

    async fn list_kyc_submissions(&self) -> CoreResult<Vec<KycSubmission>> {
        Ok(self.data.read().await.kyc.clone())
    }

    async fn list_reviews(&self) -> CoreResult<Vec<Review>> {
        Ok(self.data.read().await.reviews.clone())
    }
}

use async_trait::async_trait;
use tourops_shared::{
    Booking, ContactMessage, Departure, DeparturePatch, KycSubmission, Package, Review,
};

use crate::CoreResult;

/// Read access to bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// `GET bookings?groupDepartureId=<id>`, in backend order
    async fn list_for_departure(&self, departure_id: &str) -> CoreResult<Vec<Booking>>;

    /// `GET bookings`, every package. Needed for stable display ids.
    async fn list_all(&self) -> CoreResult<Vec<Booking>>;
}

#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn list_packages(&self) -> CoreResult<Vec<Package>>;

    async fn get_package(&self, id: &str) -> CoreResult<Option<Package>>;
}

/// Departure reads plus the single write this workspace performs
#[async_trait]
pub trait DepartureRepository: Send + Sync {
    async fn get_departure(&self, id: &str) -> CoreResult<Option<Departure>>;

    async fn list_departures(&self) -> CoreResult<Vec<Departure>>;

    /// `PUT /departures/<id>` with only the fields set in `patch`
    async fn update_departure(&self, id: &str, patch: &DeparturePatch) -> CoreResult<()>;
}

/// Queues awaiting admin or moderator action
#[async_trait]
pub trait ModerationRepository: Send + Sync {
    async fn list_contacts(&self) -> CoreResult<Vec<ContactMessage>>;

    async fn list_kyc_submissions(&self) -> CoreResult<Vec<KycSubmission>>;

    async fn list_reviews(&self) -> CoreResult<Vec<Review>>;
}

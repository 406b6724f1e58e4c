pub mod fields;
pub mod models;
pub mod pii;

pub use models::{
    Booking, BookingStatus, ContactMessage, Departure, DeparturePatch, DepartureStatus,
    KycSubmission, ModerationStatus, Package, Payment, PaymentStatus, Review, Role,
    SeatSnapshotEntry, SeatStatus, Traveler,
};
pub use pii::Masked;

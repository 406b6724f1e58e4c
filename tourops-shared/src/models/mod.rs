pub mod booking;
pub mod departure;
pub mod moderation;
pub mod role;

pub use booking::{Booking, BookingStatus, Package, Payment, PaymentStatus, Traveler};
pub use departure::{Departure, DeparturePatch, DepartureStatus, SeatSnapshotEntry, SeatStatus};
pub use moderation::{ContactMessage, KycSubmission, ModerationStatus, Review};
pub use role::Role;

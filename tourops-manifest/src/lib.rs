pub mod sequencer;
pub mod passengers;
pub mod seat_map;
pub mod checkin;
pub mod session;
pub mod console;

pub use sequencer::{BookingSequence, BookingSequencer, DisplayIds};
pub use passengers::{flatten_passengers, ManifestSummary, PassengerRow};
pub use seat_map::{Seat, SeatCounts, SeatMap, SEATS_PER_ROW};
pub use checkin::{CheckInMap, Confirm, Preconfirmed};
pub use session::{LoadTicket, LoadedManifest, ManifestSession, ManifestView, PassengerView, SeatMapChange};
pub use console::{ActionOutcome, BulkCheckInOutcome, CheckInOutcome, DepartureConsole};

use tourops_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("No departure loaded")]
    NoDepartureLoaded,

    #[error("Departure not found: {0}")]
    DepartureNotFound(String),

    #[error("Unknown passenger: {0}")]
    UnknownPassenger(String),

    #[error("Backend error: {0}")]
    Backend(#[from] CoreError),
}

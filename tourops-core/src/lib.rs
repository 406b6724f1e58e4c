pub mod repository;
pub mod seen;

pub use repository::{BookingRepository, DepartureRepository, ModerationRepository, PackageRepository};
pub use seen::{InMemoryKeyValueStore, KeyValueStore};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Malformed backend payload: {0}")]
    Decode(String),
    #[error("Key-value store error: {0}")]
    Store(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Decode(err.to_string())
    }
}

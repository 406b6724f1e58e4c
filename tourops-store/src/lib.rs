pub mod app_config;
pub mod http_backend;
pub mod memory;
pub mod redis_repo;

pub use app_config::{AlertsConfig, BackendConfig, BackendMode, Config};
pub use http_backend::{BackendError, RestBackend};
pub use memory::{InMemoryBackend, Seed};
pub use redis_repo::RedisKeyValueStore;

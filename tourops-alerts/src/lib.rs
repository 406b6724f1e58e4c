pub mod models;
pub mod rules;
pub mod aggregator;
pub mod poller;
pub mod unread;

pub use models::{Alert, AlertAction, AlertFeed, AlertScope, Severity};
pub use rules::{AlertRules, AlertThresholds};
pub use aggregator::AlertAggregator;
pub use poller::AlertPoller;
pub use unread::SeenTracker;

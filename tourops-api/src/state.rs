use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tourops_alerts::{AlertAggregator, AlertFeed, AlertRules, AlertThresholds, SeenTracker};
use tourops_core::{
    BookingRepository, DepartureRepository, KeyValueStore, ModerationRepository, PackageRepository,
};
use tourops_manifest::DepartureConsole;
use tourops_store::AlertsConfig;

/// The backend seen through each repository seam
#[derive(Clone)]
pub struct Backend {
    pub departures: Arc<dyn DepartureRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub packages: Arc<dyn PackageRepository>,
    pub moderation: Arc<dyn ModerationRepository>,
}

impl Backend {
    /// One value implementing every seam
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: DepartureRepository + BookingRepository + PackageRepository + ModerationRepository + 'static,
    {
        Self {
            departures: backend.clone(),
            bookings: backend.clone(),
            packages: backend.clone(),
            moderation: backend,
        }
    }
}

/// Operator consoles keyed by the client-chosen console name
#[derive(Default)]
pub struct ConsoleRegistry {
    consoles: RwLock<HashMap<String, Arc<DepartureConsole>>>,
}

impl ConsoleRegistry {
    pub async fn get(&self, name: &str) -> Option<Arc<DepartureConsole>> {
        self.consoles.read().await.get(name).cloned()
    }

    pub async fn get_or_create(&self, name: &str, backend: &Backend) -> Arc<DepartureConsole> {
        if let Some(console) = self.get(name).await {
            return console;
        }
        let mut consoles = self.consoles.write().await;
        consoles
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating console {}", name);
                Arc::new(DepartureConsole::new(
                    backend.departures.clone(),
                    backend.bookings.clone(),
                    backend.packages.clone(),
                ))
            })
            .clone()
    }

    /// Drop a console and its loaded manifest. Returns false if it never existed.
    pub async fn remove(&self, name: &str) -> bool {
        let removed = self.consoles.write().await.remove(name).is_some();
        if removed {
            tracing::debug!("Closed console {}", name);
        }
        removed
    }

    pub async fn open_count(&self) -> usize {
        self.consoles.read().await.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub consoles: Arc<ConsoleRegistry>,
    pub alerts: Arc<AlertAggregator>,
    pub seen: SeenTracker,
    /// Kept warm by the background admin poller when one is running
    pub admin_feed: Option<watch::Receiver<AlertFeed>>,
}

impl AppState {
    pub fn new(backend: Backend, store: Arc<dyn KeyValueStore>, rules: AlertRules) -> Self {
        let alerts = Arc::new(AlertAggregator::new(
            backend.departures.clone(),
            backend.bookings.clone(),
            backend.moderation.clone(),
            rules,
        ));
        Self {
            backend,
            consoles: Arc::new(ConsoleRegistry::default()),
            alerts,
            seen: SeenTracker::new(store),
            admin_feed: None,
        }
    }

    pub fn with_admin_feed(mut self, feed: watch::Receiver<AlertFeed>) -> Self {
        self.admin_feed = Some(feed);
        self
    }
}

pub fn alert_rules(config: &AlertsConfig) -> AlertRules {
    AlertRules::new(AlertThresholds {
        low_occupancy_ratio: config.low_occupancy_threshold,
        occupancy_lookahead: chrono::Duration::days(config.occupancy_lookahead_days),
        imminent_window: chrono::Duration::hours(config.imminent_hours),
        pending_stale_after: chrono::Duration::hours(config.pending_stale_hours),
        feed_limit: config.feed_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_registry_create_and_remove() {
        let backend = Backend::from_shared(Arc::new(tourops_store::InMemoryBackend::default()));
        let registry = ConsoleRegistry::default();

        let first = registry.get_or_create("gate-a", &backend).await;
        let again = registry.get_or_create("gate-a", &backend).await;
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(registry.open_count().await, 1);

        assert!(registry.remove("gate-a").await);
        assert!(!registry.remove("gate-a").await);
        assert!(registry.get("gate-a").await.is_none());
        assert_eq!(registry.open_count().await, 0);
    }

    #[test]
    fn test_alert_rules_from_config() {
        let config = AlertsConfig {
            imminent_hours: 12,
            feed_limit: 5,
            ..Default::default()
        };
        let rules = alert_rules(&config);
        assert_eq!(rules.thresholds().imminent_window, chrono::Duration::hours(12));
        assert_eq!(rules.thresholds().feed_limit, 5);
        assert_eq!(rules.thresholds().occupancy_lookahead, chrono::Duration::days(7));
    }
}

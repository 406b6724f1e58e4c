//! Background refresh of one alert feed.
//!
//! [`AlertPoller`] owns a spawned task that re-runs the aggregator on a fixed
//! interval and publishes each result on a watch channel. Dropping the poller
//! cancels the task.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::aggregator::AlertAggregator;
use crate::models::{AlertFeed, AlertScope};

pub struct AlertPoller {
    feed: watch::Receiver<AlertFeed>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AlertPoller {
    /// Start polling. The first pass runs immediately.
    pub fn spawn(aggregator: Arc<AlertAggregator>, scope: AlertScope, every: Duration) -> Self {
        let (tx, rx) = watch::channel(AlertFeed::default());
        let refresh = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            aggregator,
            scope,
            every,
            tx,
            refresh.clone(),
            cancel.clone(),
        ));

        Self {
            feed: rx,
            refresh,
            cancel,
            handle: Some(handle),
        }
    }

    /// Subscribe to every published feed
    pub fn feed(&self) -> watch::Receiver<AlertFeed> {
        self.feed.clone()
    }

    pub fn latest(&self) -> AlertFeed {
        self.feed.borrow().clone()
    }

    /// Run a pass now instead of waiting for the next tick
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task and wait for it to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Alert poller task failed");
            }
        }
    }
}

impl Drop for AlertPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    aggregator: Arc<AlertAggregator>,
    scope: AlertScope,
    every: Duration,
    tx: watch::Sender<AlertFeed>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(role = %scope.role, every_secs = every.as_secs(), "Alert poller started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(role = %scope.role, "Alert poller cancelled");
                break;
            }
            _ = interval.tick() => {}
            _ = refresh.notified() => {
                interval.reset();
            }
        }

        let feed = tokio::select! {
            _ = cancel.cancelled() => break,
            feed = aggregator.collect(&scope, Utc::now()) => feed,
        };
        tx.send_replace(feed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::AlertRules;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tourops_core::{
        BookingRepository, CoreResult, DepartureRepository, ModerationRepository,
    };
    use tourops_shared::{
        Booking, ContactMessage, Departure, DeparturePatch, KycSubmission, Review,
    };

    /// Returns one more unread contact message on every pass
    #[derive(Default)]
    struct GrowingInbox {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DepartureRepository for GrowingInbox {
        async fn get_departure(&self, _id: &str) -> CoreResult<Option<Departure>> {
            Ok(None)
        }
        async fn list_departures(&self) -> CoreResult<Vec<Departure>> {
            Ok(vec![])
        }
        async fn update_departure(&self, _id: &str, _patch: &DeparturePatch) -> CoreResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl BookingRepository for GrowingInbox {
        async fn list_for_departure(&self, _id: &str) -> CoreResult<Vec<Booking>> {
            Ok(vec![])
        }
        async fn list_all(&self) -> CoreResult<Vec<Booking>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl ModerationRepository for GrowingInbox {
        async fn list_contacts(&self) -> CoreResult<Vec<ContactMessage>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((0..n)
                .map(|i| ContactMessage {
                    id: format!("m{}", i),
                    name: None,
                    subject: None,
                    is_read: false,
                    created_at: Utc::now(),
                })
                .collect())
        }
        async fn list_kyc_submissions(&self) -> CoreResult<Vec<KycSubmission>> {
            Ok(vec![])
        }
        async fn list_reviews(&self) -> CoreResult<Vec<Review>> {
            Ok(vec![])
        }
    }

    fn setup() -> (Arc<GrowingInbox>, Arc<AlertAggregator>) {
        let inbox = Arc::new(GrowingInbox::default());
        let aggregator = Arc::new(AlertAggregator::new(
            inbox.clone(),
            inbox.clone(),
            inbox.clone(),
            AlertRules::default(),
        ));
        (inbox, aggregator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_each_pass() {
        let (_inbox, aggregator) = setup();
        let poller = AlertPoller::spawn(aggregator, AlertScope::admin(), Duration::from_secs(30));
        let mut feed = poller.feed();

        feed.changed().await.unwrap();
        assert_eq!(feed.borrow_and_update().total, 1);

        feed.changed().await.unwrap();
        assert_eq!(feed.borrow_and_update().total, 2);
        assert_eq!(poller.latest().total, 2);

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_runs_pass_early() {
        let (inbox, aggregator) = setup();
        let poller = AlertPoller::spawn(aggregator, AlertScope::admin(), Duration::from_secs(3600));
        let mut feed = poller.feed();
        feed.changed().await.unwrap();

        poller.refresh_now();
        feed.changed().await.unwrap();
        assert_eq!(inbox.calls.load(Ordering::SeqCst), 2);

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let (inbox, aggregator) = setup();
        let poller = AlertPoller::spawn(aggregator, AlertScope::admin(), Duration::from_secs(30));
        let mut feed = poller.feed();
        feed.changed().await.unwrap();
        drop(poller);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(inbox.calls.load(Ordering::SeqCst), 1);
        // sender is gone once the task has exited
        assert!(feed.changed().await.is_err());
    }
}

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tourops_core::{BookingRepository, CoreResult, DepartureRepository, ModerationRepository};
use tracing::{debug, warn};

use crate::models::{AlertFeed, AlertScope};
use crate::rules::AlertRules;

/// Fetches every alert source in parallel and derives one feed per scope.
pub struct AlertAggregator {
    departures: Arc<dyn DepartureRepository>,
    bookings: Arc<dyn BookingRepository>,
    moderation: Arc<dyn ModerationRepository>,
    rules: AlertRules,
}

impl AlertAggregator {
    pub fn new(
        departures: Arc<dyn DepartureRepository>,
        bookings: Arc<dyn BookingRepository>,
        moderation: Arc<dyn ModerationRepository>,
        rules: AlertRules,
    ) -> Self {
        Self {
            departures,
            bookings,
            moderation,
            rules,
        }
    }

    pub fn rules(&self) -> &AlertRules {
        &self.rules
    }

    /// One aggregation pass. Never fails: a source that errors contributes
    /// nothing and is retried on the next pass.
    pub async fn collect(&self, scope: &AlertScope, now: DateTime<Utc>) -> AlertFeed {
        if !scope.role.receives_alerts() {
            return AlertFeed::default();
        }

        let watches = scope.watches_departures();
        let moderates = scope.role.can_moderate();
        let supports = scope.role.can_handle_support();

        let (departures, bookings, contacts, kyc, reviews) = tokio::join!(
            gated(watches, "departures", self.departures.list_departures()),
            gated(watches, "bookings", self.bookings.list_all()),
            gated(supports, "contacts", self.moderation.list_contacts()),
            gated(moderates, "kyc", self.moderation.list_kyc_submissions()),
            gated(moderates, "reviews", self.moderation.list_reviews()),
        );

        let departures: Vec<_> = departures
            .into_iter()
            .filter(|d| scope.sees_departure(d))
            .collect();
        let visible: HashSet<&str> = departures.iter().map(|d| d.id.as_str()).collect();
        let bookings: Vec<_> = bookings
            .into_iter()
            .filter(|b| scope.sees_booking(b, &visible))
            .collect();

        let feed = AlertFeed::merge(
            [
                self.rules.departure_alerts(&departures, now),
                self.rules.booking_alerts(&bookings, now),
                self.rules.kyc_alerts(&kyc),
                self.rules.review_alerts(&reviews),
                self.rules.contact_alerts(&contacts),
            ],
            self.rules.thresholds().feed_limit,
        );

        debug!(role = %scope.role, total = feed.total, "Collected alert feed");
        feed
    }
}

/// Skip the fetch entirely when the scope cannot see the source; otherwise
/// fall back to an empty list on failure.
async fn gated<T, F>(enabled: bool, source: &'static str, fetch: F) -> Vec<T>
where
    F: Future<Output = CoreResult<Vec<T>>>,
{
    if !enabled {
        return Vec::new();
    }
    match fetch.await {
        Ok(items) => items,
        Err(e) => {
            warn!(source, error = %e, "Alert source unavailable, skipping this pass");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use tourops_core::CoreError;
    use tourops_shared::{
        Booking, BookingStatus, ContactMessage, Departure, DeparturePatch, DepartureStatus,
        KycSubmission, ModerationStatus, Review,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap()
    }

    #[derive(Default)]
    struct Sources {
        departures: Vec<Departure>,
        bookings: Vec<Booking>,
        contacts: Vec<ContactMessage>,
        kyc: Vec<KycSubmission>,
        reviews: Vec<Review>,
        failing: Vec<&'static str>,
    }

    impl Sources {
        fn check(&self, source: &str) -> CoreResult<()> {
            if self.failing.iter().any(|s| *s == source) {
                Err(CoreError::Unavailable(format!("{} timed out", source)))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DepartureRepository for Sources {
        async fn get_departure(&self, id: &str) -> CoreResult<Option<Departure>> {
            Ok(self.departures.iter().find(|d| d.id == id).cloned())
        }

        async fn list_departures(&self) -> CoreResult<Vec<Departure>> {
            self.check("departures")?;
            Ok(self.departures.clone())
        }

        async fn update_departure(&self, _id: &str, _patch: &DeparturePatch) -> CoreResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl BookingRepository for Sources {
        async fn list_for_departure(&self, departure_id: &str) -> CoreResult<Vec<Booking>> {
            Ok(self
                .bookings
                .iter()
                .filter(|b| b.group_departure_id.as_deref() == Some(departure_id))
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> CoreResult<Vec<Booking>> {
            self.check("bookings")?;
            Ok(self.bookings.clone())
        }
    }

    #[async_trait]
    impl ModerationRepository for Sources {
        async fn list_contacts(&self) -> CoreResult<Vec<ContactMessage>> {
            self.check("contacts")?;
            Ok(self.contacts.clone())
        }

        async fn list_kyc_submissions(&self) -> CoreResult<Vec<KycSubmission>> {
            self.check("kyc")?;
            Ok(self.kyc.clone())
        }

        async fn list_reviews(&self) -> CoreResult<Vec<Review>> {
            self.check("reviews")?;
            Ok(self.reviews.clone())
        }
    }

    fn aggregator(sources: Sources) -> AlertAggregator {
        let sources = Arc::new(sources);
        AlertAggregator::new(sources.clone(), sources.clone(), sources, AlertRules::default())
    }

    fn departure(id: &str, operators: &[&str]) -> Departure {
        Departure {
            id: id.to_string(),
            package_id: "p".to_string(),
            start_date: now() + Duration::hours(12),
            end_date: None,
            total_seats: 40,
            booked_seats: 30,
            status: DepartureStatus::Scheduled,
            operators: operators.iter().map(|s| s.to_string()).collect(),
            itinerary: vec![],
            tour_started: false,
            safety_checklist: None,
        }
    }

    fn pending_booking(id: &str, departure_id: &str) -> Booking {
        Booking {
            id: id.to_string(),
            package_id: "p".to_string(),
            group_departure_id: Some(departure_id.to_string()),
            created_at: now() - Duration::days(2),
            status: BookingStatus::Pending,
            travelers: vec![],
            reserved_seats: vec![],
            payments: vec![],
            extra: Default::default(),
        }
    }

    fn contact(id: &str) -> ContactMessage {
        ContactMessage {
            id: id.to_string(),
            name: Some("Farhan".into()),
            subject: Some("Refund".into()),
            is_read: false,
            created_at: now() - Duration::hours(1),
        }
    }

    fn kyc(id: &str) -> KycSubmission {
        KycSubmission {
            id: id.to_string(),
            user_name: None,
            status: ModerationStatus::Pending,
            submitted_at: now() - Duration::hours(3),
        }
    }

    fn ids(feed: &AlertFeed) -> HashSet<&str> {
        feed.alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_failing_source_only_drops_its_own_alerts() {
        let agg = aggregator(Sources {
            bookings: vec![pending_booking("b1", "d1")],
            contacts: vec![contact("c1")],
            kyc: vec![kyc("k1")],
            failing: vec!["kyc"],
            ..Default::default()
        });

        let feed = agg.collect(&AlertScope::admin(), now()).await;
        assert_eq!(ids(&feed), HashSet::from(["pending-booking-b1", "contact-c1"]));
        assert_eq!(feed.total, 2);
    }

    #[tokio::test]
    async fn test_every_source_failing_yields_empty_feed() {
        let agg = aggregator(Sources {
            contacts: vec![contact("c1")],
            failing: vec!["departures", "bookings", "contacts", "kyc", "reviews"],
            ..Default::default()
        });
        assert!(agg.collect(&AlertScope::admin(), now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_operator_sees_only_assigned_departures() {
        let agg = aggregator(Sources {
            departures: vec![departure("mine", &["op-1"]), departure("theirs", &["op-2"])],
            bookings: vec![pending_booking("b-mine", "mine"), pending_booking("b-theirs", "theirs")],
            contacts: vec![contact("c1")],
            kyc: vec![kyc("k1")],
            ..Default::default()
        });

        let feed = agg.collect(&AlertScope::operator("op-1"), now()).await;
        assert_eq!(
            ids(&feed),
            HashSet::from(["itinerary-missing-mine", "pending-booking-b-mine"])
        );

        let admin = agg.collect(&AlertScope::admin(), now()).await;
        assert!(ids(&admin).contains("itinerary-missing-theirs"));
        assert!(ids(&admin).contains("kyc-k1"));
        assert!(ids(&admin).contains("contact-c1"));
    }

    #[tokio::test]
    async fn test_moderator_scope_is_moderation_only() {
        let agg = aggregator(Sources {
            departures: vec![departure("d1", &[])],
            contacts: vec![contact("c1")],
            kyc: vec![kyc("k1")],
            ..Default::default()
        });

        let feed = agg.collect(&AlertScope::moderator(), now()).await;
        assert_eq!(ids(&feed), HashSet::from(["kyc-k1"]));
    }

    #[tokio::test]
    async fn test_customer_receives_nothing() {
        let agg = aggregator(Sources {
            kyc: vec![kyc("k1")],
            ..Default::default()
        });
        let scope = AlertScope {
            role: tourops_shared::Role::Customer,
            operator_id: None,
        };
        assert!(agg.collect(&scope, now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_feed_is_newest_first() {
        let agg = aggregator(Sources {
            departures: vec![departure("d1", &["op"])],
            bookings: vec![pending_booking("b1", "d1")],
            contacts: vec![contact("c1")],
            ..Default::default()
        });

        let feed = agg.collect(&AlertScope::admin(), now()).await;
        let order: Vec<&str> = feed.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["itinerary-missing-d1", "contact-c1", "pending-booking-b1"]);
    }
}

use chrono::{DateTime, Duration, Utc};
use tourops_shared::{
    Booking, BookingStatus, ContactMessage, Departure, KycSubmission, ModerationStatus, Review,
};

use crate::models::{Alert, AlertAction, Severity};

/// Tunables for alert derivation
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    /// Booked share under which an upcoming departure is flagged
    pub low_occupancy_ratio: f64,
    pub occupancy_lookahead: Duration,
    /// Window in which missing operators or itinerary become urgent
    pub imminent_window: Duration,
    pub pending_stale_after: Duration,
    pub feed_limit: usize,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_occupancy_ratio: 0.30,
            occupancy_lookahead: Duration::days(7),
            imminent_window: Duration::hours(24),
            pending_stale_after: Duration::hours(24),
            feed_limit: 10,
        }
    }
}

/// Turns raw backend records into alerts. Each source is handled on its own
/// so a missing source only removes its own alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertRules {
    thresholds: AlertThresholds,
}

impl AlertRules {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn departure_alerts(&self, departures: &[Departure], now: DateTime<Utc>) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        for departure in departures {
            let action = AlertAction::OpenDeparture(departure.id.clone());
            let start = departure.start_date.format("%d %b %Y %H:%M");

            if departure.is_cancelled() {
                if !departure.has_started(now) {
                    alerts.push(Alert {
                        id: format!("refund-review-{}", departure.id),
                        severity: Severity::Warning,
                        message: format!(
                            "Departure {} on {} was cancelled; review refunds for its {} booked seats",
                            departure.id, start, departure.booked_seats
                        ),
                        timestamp: departure.start_date,
                        action,
                    });
                }
                continue;
            }

            if departure.starts_within(now, t.occupancy_lookahead)
                && departure.total_seats > 0
                && departure.occupancy() < t.low_occupancy_ratio
            {
                alerts.push(Alert {
                    id: format!("low-occupancy-{}", departure.id),
                    severity: Severity::Warning,
                    message: format!(
                        "Departure {} on {} is only {:.0}% booked ({}/{} seats)",
                        departure.id,
                        start,
                        departure.occupancy() * 100.0,
                        departure.booked_seats,
                        departure.total_seats
                    ),
                    timestamp: departure.start_date,
                    action: action.clone(),
                });
            }

            if departure.starts_within(now, t.imminent_window) {
                if departure.operators.is_empty() {
                    alerts.push(Alert {
                        id: format!("no-operator-{}", departure.id),
                        severity: Severity::Danger,
                        message: format!(
                            "Departure {} starts {} with no operator assigned",
                            departure.id, start
                        ),
                        timestamp: departure.start_date,
                        action: action.clone(),
                    });
                }
                if departure.itinerary.is_empty() {
                    alerts.push(Alert {
                        id: format!("itinerary-missing-{}", departure.id),
                        severity: Severity::Warning,
                        message: format!(
                            "Departure {} starts {} without an itinerary",
                            departure.id, start
                        ),
                        timestamp: departure.start_date,
                        action,
                    });
                }
            }
        }

        alerts
    }

    pub fn booking_alerts(&self, bookings: &[Booking], now: DateTime<Utc>) -> Vec<Alert> {
        bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .filter(|b| now - b.created_at > self.thresholds.pending_stale_after)
            .map(|b| {
                let who = b
                    .customer_name()
                    .or_else(|| b.customer_email())
                    .unwrap_or_else(|| "unknown customer".to_string());
                Alert {
                    id: format!("pending-booking-{}", b.id),
                    severity: Severity::Info,
                    message: format!(
                        "Booking {} from {} has been pending for {} hours",
                        b.id,
                        who,
                        (now - b.created_at).num_hours()
                    ),
                    timestamp: b.created_at,
                    action: AlertAction::OpenBooking(b.id.clone()),
                }
            })
            .collect()
    }

    pub fn kyc_alerts(&self, submissions: &[KycSubmission]) -> Vec<Alert> {
        submissions
            .iter()
            .filter(|s| s.status == ModerationStatus::Pending)
            .map(|s| Alert {
                id: format!("kyc-{}", s.id),
                severity: Severity::Info,
                message: format!(
                    "KYC submission from {} awaits verification",
                    s.user_name.as_deref().unwrap_or("a customer")
                ),
                timestamp: s.submitted_at,
                action: AlertAction::ReviewKyc(s.id.clone()),
            })
            .collect()
    }

    pub fn review_alerts(&self, reviews: &[Review]) -> Vec<Alert> {
        reviews
            .iter()
            .filter(|r| r.status == ModerationStatus::Pending)
            .map(|r| Alert {
                id: format!("review-{}", r.id),
                severity: Severity::Info,
                message: match (&r.author, &r.package_title) {
                    (Some(author), Some(title)) => format!("New review by {} on {} awaits approval", author, title),
                    (Some(author), None) => format!("New review by {} awaits approval", author),
                    (None, Some(title)) => format!("New review on {} awaits approval", title),
                    (None, None) => "New review awaits approval".to_string(),
                },
                timestamp: r.created_at,
                action: AlertAction::ModerateReview(r.id.clone()),
            })
            .collect()
    }

    pub fn contact_alerts(&self, contacts: &[ContactMessage]) -> Vec<Alert> {
        contacts
            .iter()
            .filter(|c| !c.is_read)
            .map(|c| Alert {
                id: format!("contact-{}", c.id),
                severity: Severity::Info,
                message: format!(
                    "New message from {}: {}",
                    c.name.as_deref().unwrap_or("a visitor"),
                    c.subject.as_deref().unwrap_or("(no subject)")
                ),
                timestamp: c.created_at,
                action: AlertAction::OpenContact(c.id.clone()),
            })
            .collect()
    }
}

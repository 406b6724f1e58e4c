use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tourops_shared::{Booking, Departure, Role};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

/// What the UI should open when an alert is clicked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum AlertAction {
    OpenDeparture(String),
    OpenBooking(String),
    ReviewKyc(String),
    ModerateReview(String),
    OpenContact(String),
}

/// A derived, actionable item for the back office
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// `<derivation>-<source id>`, stable across polls
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub action: AlertAction,
}

/// Merged alert list for one audience
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct AlertFeed {
    /// Newest first, truncated for display
    pub alerts: Vec<Alert>,
    /// Unique alerts before truncation; what badges show
    pub total: usize,
    /// Every unique id, newest first, including the truncated ones
    #[serde(skip)]
    pub ids: Vec<String>,
}

impl AlertFeed {
    /// Concatenate, drop duplicate ids (first occurrence wins), sort newest
    /// first and keep at most `limit` for display.
    pub fn merge<I>(batches: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = Vec<Alert>>,
    {
        let mut seen = HashSet::new();
        let mut alerts: Vec<Alert> = batches
            .into_iter()
            .flatten()
            .filter(|alert| seen.insert(alert.id.clone()))
            .collect();

        alerts.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = alerts.len();
        let ids = alerts.iter().map(|a| a.id.clone()).collect();
        alerts.truncate(limit);

        Self { alerts, total, ids }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Who the feed is built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertScope {
    pub role: Role,
    /// Set for operators; limits departure alerts to their assignments
    pub operator_id: Option<String>,
}

impl AlertScope {
    pub fn admin() -> Self {
        Self { role: Role::Admin, operator_id: None }
    }

    pub fn moderator() -> Self {
        Self { role: Role::Moderator, operator_id: None }
    }

    pub fn operator(operator_id: impl Into<String>) -> Self {
        Self {
            role: Role::Operator,
            operator_id: Some(operator_id.into()),
        }
    }

    /// Departure and booking sources are fetched at all
    pub fn watches_departures(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Operator)
    }

    pub fn sees_departure(&self, departure: &Departure) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Operator => self
                .operator_id
                .as_deref()
                .is_some_and(|op| departure.is_assigned_to(op)),
            Role::Moderator | Role::Customer => false,
        }
    }

    /// Operators only see bookings on departures they run
    pub fn sees_booking(&self, booking: &Booking, visible_departures: &HashSet<&str>) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Operator => booking
                .group_departure_id
                .as_deref()
                .is_some_and(|id| visible_departures.contains(id)),
            Role::Moderator | Role::Customer => false,
        }
    }
}

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tourops_alerts::{Alert, AlertFeed, AlertScope};
use tourops_shared::Role;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsQuery {
    pub role: String,
    pub user_id: Option<String>,
    /// Defaults to `userId` for operators
    pub operator_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub total: usize,
    pub unread: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSeenRequest {
    pub user_id: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkSeenResponse {
    pub stored: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/alerts", get(list_alerts))
        .route("/v1/alerts/seen", post(mark_seen))
}

fn scope_for(query: &AlertsQuery) -> Result<AlertScope, AppError> {
    let role: Role = query.role.parse().map_err(AppError::BadRequest)?;
    let operator_id = match role {
        Role::Operator => Some(
            query
                .operator_id
                .clone()
                .or_else(|| query.user_id.clone())
                .ok_or_else(|| AppError::BadRequest("operatorId is required for operators".to_string()))?,
        ),
        _ => None,
    };
    Ok(AlertScope { role, operator_id })
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<AlertsResponse>, AppError> {
    let scope = scope_for(&query)?;

    let feed: AlertFeed = match (&state.admin_feed, scope.role) {
        (Some(cached), Role::Admin) => latest(cached),
        _ => state.alerts.collect(&scope, Utc::now()).await,
    };

    let unread = match &query.user_id {
        Some(user_id) => state.seen.unread_count(user_id, &feed).await,
        None => feed.total,
    };

    Ok(Json(AlertsResponse {
        alerts: feed.alerts,
        total: feed.total,
        unread,
    }))
}

fn latest(feed: &watch::Receiver<AlertFeed>) -> AlertFeed {
    feed.borrow().clone()
}

async fn mark_seen(
    State(state): State<AppState>,
    Json(req): Json<MarkSeenRequest>,
) -> Result<Json<MarkSeenResponse>, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }
    let stored = state.seen.mark_seen(&req.user_id, &req.ids).await?;
    Ok(Json(MarkSeenResponse { stored }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(role: &str, user: Option<&str>, operator: Option<&str>) -> AlertsQuery {
        AlertsQuery {
            role: role.to_string(),
            user_id: user.map(String::from),
            operator_id: operator.map(String::from),
        }
    }

    #[test]
    fn test_scope_from_query() {
        assert_eq!(scope_for(&query("admin", None, None)).unwrap(), AlertScope::admin());
        assert_eq!(
            scope_for(&query("OPERATOR", Some("u-7"), None)).unwrap(),
            AlertScope::operator("u-7")
        );
        assert_eq!(
            scope_for(&query("operator", Some("u-7"), Some("op-3"))).unwrap(),
            AlertScope::operator("op-3")
        );
        assert!(scope_for(&query("operator", None, None)).is_err());
        assert!(scope_for(&query("pilot", None, None)).is_err());
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tourops_manifest::{
    ActionOutcome, BulkCheckInOutcome, CheckInOutcome, ManifestError, ManifestView, Preconfirmed,
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDepartureRequest {
    pub departure_id: String,
}

/// Answer to a confirmation prompt, given up front by the client
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirm: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/consoles/{console}", delete(close_console))
        .route("/v1/consoles/{console}/departure", put(select_departure))
        .route("/v1/consoles/{console}/manifest", get(get_manifest))
        .route("/v1/consoles/{console}/check-ins", post(mark_all_present))
        .route("/v1/consoles/{console}/check-ins/{passenger_id}", post(toggle_check_in))
        .route("/v1/consoles/{console}/tour/start", post(start_tour))
        .route("/v1/consoles/{console}/safety-checklist", put(update_safety_checklist))
}

async fn select_departure(
    State(state): State<AppState>,
    Path(console): Path<String>,
    Json(req): Json<SelectDepartureRequest>,
) -> Result<Json<ManifestView>, AppError> {
    let departure_id = req.departure_id.trim();
    if departure_id.is_empty() {
        return Err(AppError::BadRequest("departureId is required".to_string()));
    }

    let console = state.consoles.get_or_create(&console, &state.backend).await;
    match console.open(departure_id).await? {
        Some(view) => Ok(Json(view)),
        None => Err(AppError::Conflict(format!(
            "Selection of departure {} was superseded by a newer one",
            departure_id
        ))),
    }
}

/// Called when the operator leaves the console view
async fn close_console(
    State(state): State<AppState>,
    Path(console): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.consoles.remove(&console).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Console {} is not open", console)))
    }
}

async fn get_manifest(
    State(state): State<AppState>,
    Path(console): Path<String>,
) -> Result<Json<ManifestView>, AppError> {
    let console = state
        .consoles
        .get(&console)
        .await
        .ok_or(ManifestError::NoDepartureLoaded)?;
    let view = console.view().await.ok_or(ManifestError::NoDepartureLoaded)?;
    Ok(Json(view))
}

async fn toggle_check_in(
    State(state): State<AppState>,
    Path((console, passenger_id)): Path<(String, String)>,
) -> Result<Json<CheckInOutcome>, AppError> {
    let console = state
        .consoles
        .get(&console)
        .await
        .ok_or(ManifestError::NoDepartureLoaded)?;
    Ok(Json(console.toggle_check_in(&passenger_id).await?))
}

async fn mark_all_present(
    State(state): State<AppState>,
    Path(console): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<BulkCheckInOutcome>, AppError> {
    let console = state
        .consoles
        .get(&console)
        .await
        .ok_or(ManifestError::NoDepartureLoaded)?;
    Ok(Json(console.mark_all_present(&Preconfirmed(req.confirm)).await?))
}

async fn start_tour(
    State(state): State<AppState>,
    Path(console): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let console = state
        .consoles
        .get(&console)
        .await
        .ok_or(ManifestError::NoDepartureLoaded)?;
    Ok(Json(console.start_tour(&Preconfirmed(req.confirm)).await?))
}

async fn update_safety_checklist(
    State(state): State<AppState>,
    Path(console): Path<String>,
    Json(checklist): Json<Value>,
) -> Result<Json<ActionOutcome>, AppError> {
    let console = state
        .consoles
        .get(&console)
        .await
        .ok_or(ManifestError::NoDepartureLoaded)?;
    Ok(Json(console.update_safety_checklist(checklist).await?))
}

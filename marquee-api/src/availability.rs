use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub show_id: Uuid,
    pub unavailable_seat_ids: Vec<String>,
    pub held_seat_ids: Vec<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/shows/{id}/availability", get(get_availability))
}

async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let view = state.availability.availability(id).await?;
    Ok(Json(AvailabilityResponse {
        show_id: id,
        unavailable_seat_ids: view.unavailable.into_iter().collect(),
        held_seat_ids: view.held.into_iter().collect(),
    }))
}

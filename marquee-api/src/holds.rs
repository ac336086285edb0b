use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;
use marquee_core::{Hold, HoldStatus};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub quantity: usize,
}

#[derive(Debug, Serialize)]
pub struct HoldResponse {
    pub hold_id: Uuid,
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub status: HoldStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Hold> for HoldResponse {
    fn from(hold: Hold) -> Self {
        Self {
            hold_id: hold.id,
            show_id: hold.show_id,
            seat_ids: hold.seat_ids,
            status: hold.status,
            created_at: hold.created_at,
            expires_at: hold.expires_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(create_hold))
        .route("/v1/holds/{id}", get(get_hold).delete(release_hold))
}

async fn create_hold(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateHoldRequest>,
) -> Result<(StatusCode, Json<HoldResponse>), ApiError> {
    let hold = state
        .holds
        .create_hold(req.show_id, &claims.sub, req.seat_ids, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(hold.into())))
}

async fn get_hold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HoldResponse>, ApiError> {
    let hold = state.holds.get_hold(id).await?;
    Ok(Json(hold.into()))
}

async fn release_hold(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<HoldResponse>, ApiError> {
    let hold = state.holds.release_hold(id, &claims.sub).await?;
    Ok(Json(hold.into()))
}

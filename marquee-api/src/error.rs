use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use marquee_core::BookingError;

/// HTTP-layer wrapper around `BookingError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

/// JSON body returned for error responses. Conflicts always carry the
/// offending seats so the client can offer alternatives.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, seats) = match &self.0 {
            BookingError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", None),
            BookingError::SeatConflict { seats } => {
                (StatusCode::CONFLICT, "seat_conflict", Some(seats.clone()))
            }
            BookingError::SeatsLost { seats } => {
                (StatusCode::CONFLICT, "seats_lost", Some(seats.clone()))
            }
            BookingError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", None),
            BookingError::NotOwner { .. } => (StatusCode::FORBIDDEN, "not_owner", None),
            BookingError::WrongStatus { .. } => (StatusCode::CONFLICT, "wrong_status", None),
            BookingError::Expired { .. } => (StatusCode::GONE, "expired", None),
            BookingError::Unavailable(msg) => {
                tracing::error!("request failed on infrastructure: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", None)
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            seats,
        };

        (status, Json(body)).into_response()
    }
}

use thiserror::Error;

/// Engine-boundary error taxonomy.
///
/// Conflicts are expected and recoverable by picking different seats; the
/// engine never retries them. Only transient infrastructure failures are
/// retried below this boundary, after which they surface as `Unavailable`.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("seats unavailable: {}", .seats.join(", "))]
    SeatConflict { seats: Vec<String> },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} belongs to another holder")]
    NotOwner { kind: &'static str, id: String },

    #[error("{kind} {id} is {status}")]
    WrongStatus {
        kind: &'static str,
        id: String,
        status: String,
    },

    #[error("{kind} {id} has expired")]
    Expired { kind: &'static str, id: String },

    /// Payment confirmation lost the race window: the named seats were
    /// confirmed by another booking after this order was created. Distinct
    /// from a generic payment failure so callers can say so explicitly.
    #[error("seats lost to another booking: {}", .seats.join(", "))]
    SeatsLost { seats: Vec<String> },

    #[error("service temporarily unavailable: {0}")]
    Unavailable(String),
}

impl BookingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog view of a scheduled show.
///
/// The catalog is an external collaborator; the engine never creates or
/// destroys seats, it only reads the declared layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub price_cents: i64,
    /// Declared seat layout, e.g. "A1".."C12".
    pub seats: Vec<String>,
    /// Seats blocked by the venue regardless of bookings.
    pub unavailable_seats: Vec<String>,
}

impl Show {
    pub fn has_seat(&self, seat_id: &str) -> bool {
        self.seats.iter().any(|s| s == seat_id)
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hold status in the lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldStatus {
    Held,
    Released,
    Expired,
}

impl HoldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldStatus::Held => "HELD",
            HoldStatus::Released => "RELEASED",
            HoldStatus::Expired => "EXPIRED",
        }
    }
}

/// A time-boxed claim on specific seats by one requester, prior to payment.
///
/// While HELD, every seat carries a live lock owned by (holder_id, id) in
/// the seat lock store. Expiry is derived from `expires_at` at read time;
/// reading never writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hold {
    pub id: Uuid,
    pub show_id: Uuid,
    pub holder_id: String,
    pub seat_ids: Vec<String>,
    pub status: HoldStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    pub fn new(
        show_id: Uuid,
        holder_id: String,
        seat_ids: Vec<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            show_id,
            holder_id,
            seat_ids,
            status: HoldStatus::Held,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Status as observed at `now`. A stored HELD hold past its expiry
    /// reads as EXPIRED without any write-back.
    pub fn status_at(&self, now: DateTime<Utc>) -> HoldStatus {
        if self.status == HoldStatus::Held && now >= self.expires_at {
            HoldStatus::Expired
        } else {
            self.status
        }
    }

    /// Copy of this hold with the status derived at `now`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.status_at(now);
        self
    }
}

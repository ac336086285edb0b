use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle events, published fire-and-forget after each state
/// transition. Emission failure never rolls back the transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEvent {
    HoldCreated {
        hold_id: Uuid,
        show_id: Uuid,
        holder_id: String,
        seat_ids: Vec<String>,
        expires_at: DateTime<Utc>,
    },
    HoldReleased {
        hold_id: Uuid,
        show_id: Uuid,
        seat_ids: Vec<String>,
    },
    OrderCreated {
        order_id: Uuid,
        hold_id: Uuid,
        show_id: Uuid,
        holder_id: String,
        seat_ids: Vec<String>,
        amount_cents: i64,
        expires_at: DateTime<Utc>,
    },
    OrderConfirmed {
        order_id: Uuid,
        show_id: Uuid,
        seat_ids: Vec<String>,
        ticket_code: String,
        confirmed_at: DateTime<Utc>,
    },
}

impl BookingEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            BookingEvent::HoldCreated { .. } => "hold.created",
            BookingEvent::HoldReleased { .. } => "hold.released",
            BookingEvent::OrderCreated { .. } => "order.created",
            BookingEvent::OrderConfirmed { .. } => "order.confirmed",
        }
    }

    /// Partition key: all events for one show stay ordered.
    pub fn key(&self) -> String {
        match self {
            BookingEvent::HoldCreated { show_id, .. }
            | BookingEvent::HoldReleased { show_id, .. }
            | BookingEvent::OrderCreated { show_id, .. }
            | BookingEvent::OrderConfirmed { show_id, .. } => show_id.to_string(),
        }
    }
}

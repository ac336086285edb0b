use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

use crate::events::BookingEvent;
use crate::hold::Hold;
use crate::order::Order;
use crate::show::Show;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an atomic multi-seat lock attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAttempt {
    Acquired,
    /// First seat found owned by a different holder. Nothing was locked.
    Conflict { seat_id: String },
}

/// Transient seat ownership markers with native TTL expiry.
///
/// `try_lock` must be indivisible with respect to any concurrent `try_lock`
/// on an overlapping seat set: either every requested seat is locked or
/// none is. Expired markers vanish on their own; no compensating write is
/// required anywhere else.
#[async_trait]
pub trait SeatLockStore: Send + Sync {
    /// Locks all seats for (holder_id, hold_id) or reports the first
    /// conflicting seat. Re-locking seats already owned by the same holder
    /// succeeds and writes a fresh TTL.
    async fn try_lock(
        &self,
        show_id: Uuid,
        seat_ids: &[String],
        holder_id: &str,
        hold_id: Uuid,
        ttl: Duration,
    ) -> StoreResult<LockAttempt>;

    /// Removes the holder's markers; seats owned by someone else are left
    /// untouched.
    async fn unlock(&self, show_id: Uuid, seat_ids: &[String], holder_id: &str) -> StoreResult<()>;

    /// Seats currently carrying a live lock for the show.
    async fn list_locked(&self, show_id: Uuid) -> StoreResult<BTreeSet<String>>;
}

/// Hold metadata, retained past seat-lock expiry so expired holds stay
/// readable.
#[async_trait]
pub trait HoldStore: Send + Sync {
    async fn save_hold(&self, hold: &Hold) -> StoreResult<()>;
    async fn get_hold(&self, id: Uuid) -> StoreResult<Option<Hold>>;
}

/// Durable order store; the sole source of truth for sold seats.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn insert_order(&self, order: &Order) -> StoreResult<()>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn list_orders(&self, holder_id: &str) -> StoreResult<Vec<Order>>;

    /// Union of seat ids across the show's CONFIRMED orders.
    async fn confirmed_seats(&self, show_id: Uuid) -> StoreResult<BTreeSet<String>>;

    async fn mark_confirmed(
        &self,
        id: Uuid,
        ticket_code: &str,
        confirmed_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn mark_failed(&self, id: Uuid) -> StoreResult<()>;
}

/// Read-side view of the external show catalog.
#[async_trait]
pub trait ShowCatalog: Send + Sync {
    async fn get_show(&self, id: Uuid) -> StoreResult<Option<Show>>;
}

/// Message sink for lifecycle events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &BookingEvent) -> StoreResult<()>;
}

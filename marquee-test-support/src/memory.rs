use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use uuid::Uuid;

use marquee_core::{
    BookingEvent, Clock, EventSink, Hold, HoldStore, LockAttempt, Order, OrderLedger, OrderStatus,
    SeatLockStore, Show, ShowCatalog, StoreResult,
};

fn lock_poisoned<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

struct LockEntry {
    holder_id: String,
    #[allow(dead_code)]
    hold_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Seat lock table behind one mutex. Holding the mutex across the check
/// and the write is what makes `try_lock` indivisible here, the same
/// guarantee the Lua script gives the Redis implementation.
pub struct InMemorySeatLockStore {
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<(Uuid, String), LockEntry>>,
}

impl InMemorySeatLockStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SeatLockStore for InMemorySeatLockStore {
    async fn try_lock(
        &self,
        show_id: Uuid,
        seat_ids: &[String],
        holder_id: &str,
        hold_id: Uuid,
        ttl: StdDuration,
    ) -> StoreResult<LockAttempt> {
        let now = self.clock.now();
        let mut locks = lock_poisoned(&self.locks);

        // Check phase: any live marker owned by someone else aborts the
        // whole attempt before anything is written.
        for seat_id in seat_ids {
            if let Some(entry) = locks.get(&(show_id, seat_id.clone())) {
                if entry.expires_at > now && entry.holder_id != holder_id {
                    return Ok(LockAttempt::Conflict {
                        seat_id: seat_id.clone(),
                    });
                }
            }
        }

        // Commit phase: all or nothing, fresh TTL for every seat.
        let expires_at = now + Duration::seconds(ttl.as_secs() as i64);
        for seat_id in seat_ids {
            locks.insert(
                (show_id, seat_id.clone()),
                LockEntry {
                    holder_id: holder_id.to_string(),
                    hold_id,
                    expires_at,
                },
            );
        }
        Ok(LockAttempt::Acquired)
    }

    async fn unlock(&self, show_id: Uuid, seat_ids: &[String], holder_id: &str) -> StoreResult<()> {
        let mut locks = lock_poisoned(&self.locks);
        for seat_id in seat_ids {
            let key = (show_id, seat_id.clone());
            if locks
                .get(&key)
                .is_some_and(|entry| entry.holder_id == holder_id)
            {
                locks.remove(&key);
            }
        }
        Ok(())
    }

    async fn list_locked(&self, show_id: Uuid) -> StoreResult<BTreeSet<String>> {
        let now = self.clock.now();
        let locks = lock_poisoned(&self.locks);
        Ok(locks
            .iter()
            .filter(|((show, _), entry)| *show == show_id && entry.expires_at > now)
            .map(|((_, seat), _)| seat.clone())
            .collect())
    }
}

/// Hold records keyed by id; records never vanish, matching the retention
/// window the Redis implementation gives them.
#[derive(Default)]
pub struct InMemoryHoldStore {
    holds: Mutex<HashMap<Uuid, Hold>>,
}

impl InMemoryHoldStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HoldStore for InMemoryHoldStore {
    async fn save_hold(&self, hold: &Hold) -> StoreResult<()> {
        lock_poisoned(&self.holds).insert(hold.id, hold.clone());
        Ok(())
    }

    async fn get_hold(&self, id: Uuid) -> StoreResult<Option<Hold>> {
        Ok(lock_poisoned(&self.holds).get(&id).cloned())
    }
}

/// Order ledger in a map, with a toggle to make inserts fail for
/// partial-failure tests.
#[derive(Default)]
pub struct InMemoryOrderLedger {
    orders: Mutex<HashMap<Uuid, Order>>,
    fail_inserts: AtomicBool,
}

impl InMemoryOrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err("ledger write refused".into());
        }
        let mut orders = lock_poisoned(&self.orders);
        if orders.contains_key(&order.id) {
            return Err(format!("duplicate order id: {}", order.id).into());
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(lock_poisoned(&self.orders).get(&id).cloned())
    }

    async fn list_orders(&self, holder_id: &str) -> StoreResult<Vec<Order>> {
        let orders = lock_poisoned(&self.orders);
        let mut result: Vec<Order> = orders
            .values()
            .filter(|order| order.holder_id == holder_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn confirmed_seats(&self, show_id: Uuid) -> StoreResult<BTreeSet<String>> {
        let orders = lock_poisoned(&self.orders);
        Ok(orders
            .values()
            .filter(|order| order.show_id == show_id && order.status == OrderStatus::Confirmed)
            .flat_map(|order| order.seat_ids.iter().cloned())
            .collect())
    }

    async fn mark_confirmed(
        &self,
        id: Uuid,
        ticket_code: &str,
        confirmed_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut orders = lock_poisoned(&self.orders);
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| format!("order not found: {id}"))?;
        order.status = OrderStatus::Confirmed;
        order.ticket_code = Some(ticket_code.to_string());
        order.confirmed_at = Some(confirmed_at);
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> StoreResult<()> {
        let mut orders = lock_poisoned(&self.orders);
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| format!("order not found: {id}"))?;
        order.status = OrderStatus::Failed;
        Ok(())
    }
}

/// Fixed show catalog seeded by the test.
#[derive(Default)]
pub struct InMemoryShowCatalog {
    shows: Mutex<HashMap<Uuid, Show>>,
}

impl InMemoryShowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_show(&self, show: Show) {
        lock_poisoned(&self.shows).insert(show.id, show);
    }
}

#[async_trait]
impl ShowCatalog for InMemoryShowCatalog {
    async fn get_show(&self, id: Uuid) -> StoreResult<Option<Show>> {
        Ok(lock_poisoned(&self.shows).get(&id).cloned())
    }
}

/// Captures published events; can be told to refuse publishes so tests can
/// assert emission failure never blocks a state transition.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<BookingEvent>>,
    fail: AtomicBool,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<BookingEvent> {
        lock_poisoned(&self.events).clone()
    }

    pub fn topics(&self) -> Vec<&'static str> {
        lock_poisoned(&self.events)
            .iter()
            .map(BookingEvent::topic)
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, event: &BookingEvent) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("event sink offline".into());
        }
        lock_poisoned(&self.events).push(event.clone());
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use marquee_core::{BookingError, Clock, OrderLedger, SeatLockStore, ShowCatalog};

use crate::infra;

/// Combined seat view for one show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatAvailability {
    /// Statically blocked ∪ confirmed in the ledger ∪ currently locked.
    pub unavailable: BTreeSet<String>,
    /// Currently locked only; the transient slice of `unavailable`.
    pub held: BTreeSet<String>,
}

struct CacheEntry {
    cached_at: DateTime<Utc>,
    view: SeatAvailability,
}

/// Read-through aggregation of the three unavailability sources.
///
/// The cache TTL is deliberately short (seconds): held state changes on
/// every booking attempt, and a stale entry must not outlive a single user
/// interaction. Invalidation on write is best-effort; the TTL is the
/// correctness backstop.
pub struct AvailabilityAggregator {
    catalog: Arc<dyn ShowCatalog>,
    ledger: Arc<dyn OrderLedger>,
    locks: Arc<dyn SeatLockStore>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
    cache: Mutex<HashMap<Uuid, CacheEntry>>,
}

impl AvailabilityAggregator {
    pub fn new(
        catalog: Arc<dyn ShowCatalog>,
        ledger: Arc<dyn OrderLedger>,
        locks: Arc<dyn SeatLockStore>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            ledger,
            locks,
            clock,
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn availability(&self, show_id: Uuid) -> Result<SeatAvailability, BookingError> {
        let now = self.clock.now();
        if let Some(view) = self.cached(show_id, now) {
            return Ok(view);
        }

        let show = self
            .catalog
            .get_show(show_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("show", show_id))?;
        let confirmed = self.ledger.confirmed_seats(show_id).await.map_err(infra)?;
        let held = self.locks.list_locked(show_id).await.map_err(infra)?;

        let mut unavailable: BTreeSet<String> = show.unavailable_seats.into_iter().collect();
        unavailable.extend(confirmed);
        unavailable.extend(held.iter().cloned());

        let view = SeatAvailability { unavailable, held };
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            show_id,
            CacheEntry {
                cached_at: now,
                view: view.clone(),
            },
        );
        Ok(view)
    }

    fn cached(&self, show_id: Uuid, now: DateTime<Utc>) -> Option<SeatAvailability> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get(&show_id)
            .filter(|entry| now - entry.cached_at < crate::to_chrono(self.cache_ttl))
            .map(|entry| entry.view.clone())
    }

    /// Best-effort; callers proceed regardless.
    pub fn invalidate(&self, show_id: Uuid) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.remove(&show_id);
    }
}

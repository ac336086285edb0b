use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use marquee_core::{
    BookingError, BookingEvent, Clock, EventSink, Hold, HoldStatus, HoldStore, LockAttempt,
    SeatLockStore, ShowCatalog,
};

use crate::availability::AvailabilityAggregator;
use crate::policy::HoldPolicy;
use crate::{infra, to_chrono};

/// Owns the hold lifecycle: atomic multi-seat claim, lazy expiry, explicit
/// release. A hold is a claim, not a commitment; its only job is to give
/// one holder exclusive first refusal while they fill in payment details,
/// with a self-expiring upper bound on that exclusivity.
pub struct HoldManager {
    locks: Arc<dyn SeatLockStore>,
    holds: Arc<dyn HoldStore>,
    catalog: Arc<dyn ShowCatalog>,
    availability: Arc<AvailabilityAggregator>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    policy: HoldPolicy,
}

impl HoldManager {
    pub fn new(
        locks: Arc<dyn SeatLockStore>,
        holds: Arc<dyn HoldStore>,
        catalog: Arc<dyn ShowCatalog>,
        availability: Arc<AvailabilityAggregator>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        policy: HoldPolicy,
    ) -> Self {
        Self {
            locks,
            holds,
            catalog,
            availability,
            events,
            clock,
            policy,
        }
    }

    pub async fn create_hold(
        &self,
        show_id: Uuid,
        holder_id: &str,
        seat_ids: Vec<String>,
        quantity: usize,
    ) -> Result<Hold, BookingError> {
        self.validate_request(&seat_ids, quantity)?;

        let show = self
            .catalog
            .get_show(show_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("show", show_id))?;
        if let Some(unknown) = seat_ids.iter().find(|seat| !show.has_seat(seat)) {
            return Err(BookingError::validation(format!(
                "seat {unknown} does not exist for show {show_id}"
            )));
        }

        let view = self.availability.availability(show_id).await?;
        let taken: Vec<String> = seat_ids
            .iter()
            .filter(|seat| view.unavailable.contains(*seat))
            .cloned()
            .collect();
        if !taken.is_empty() {
            return Err(BookingError::SeatConflict { seats: taken });
        }

        // The check above can go stale the instant it completes; the lock
        // store's check-then-set is the operation that actually decides.
        let hold_id = Uuid::new_v4();
        let attempt = self
            .locks
            .try_lock(show_id, &seat_ids, holder_id, hold_id, self.policy.ttl)
            .await
            .map_err(infra)?;
        if let LockAttempt::Conflict { seat_id } = attempt {
            return Err(BookingError::SeatConflict {
                seats: vec![seat_id],
            });
        }

        let now = self.clock.now();
        let hold = Hold {
            id: hold_id,
            show_id,
            holder_id: holder_id.to_string(),
            seat_ids,
            status: HoldStatus::Held,
            created_at: now,
            expires_at: now + to_chrono(self.policy.ttl),
        };
        if let Err(err) = self.holds.save_hold(&hold).await {
            // No hold record means no way to release; free the seats now
            // rather than stranding them until the lock TTL.
            let _ = self
                .locks
                .unlock(show_id, &hold.seat_ids, holder_id)
                .await;
            return Err(BookingError::unavailable(err));
        }

        self.availability.invalidate(show_id);
        self.emit(BookingEvent::HoldCreated {
            hold_id: hold.id,
            show_id,
            holder_id: hold.holder_id.clone(),
            seat_ids: hold.seat_ids.clone(),
            expires_at: hold.expires_at,
        })
        .await;

        tracing::info!(hold_id = %hold.id, show_id = %show_id, seats = hold.seat_ids.len(), "hold created");
        Ok(hold)
    }

    /// The hold with its status derived at read time; never writes.
    pub async fn get_hold(&self, hold_id: Uuid) -> Result<Hold, BookingError> {
        let hold = self
            .holds
            .get_hold(hold_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("hold", hold_id))?;
        Ok(hold.at(self.clock.now()))
    }

    /// Explicit release by the owning holder. Only a currently HELD hold
    /// may be released; anything else is a status error, not a no-op.
    pub async fn release_hold(&self, hold_id: Uuid, holder_id: &str) -> Result<Hold, BookingError> {
        let hold = self
            .holds
            .get_hold(hold_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("hold", hold_id))?;
        if hold.holder_id != holder_id {
            return Err(BookingError::NotOwner {
                kind: "hold",
                id: hold_id.to_string(),
            });
        }
        let status = hold.status_at(self.clock.now());
        if status != HoldStatus::Held {
            return Err(BookingError::WrongStatus {
                kind: "hold",
                id: hold_id.to_string(),
                status: status.as_str().to_string(),
            });
        }

        self.locks
            .unlock(hold.show_id, &hold.seat_ids, holder_id)
            .await
            .map_err(infra)?;
        let released = Hold {
            status: HoldStatus::Released,
            ..hold
        };
        self.holds.save_hold(&released).await.map_err(infra)?;

        self.availability.invalidate(released.show_id);
        self.emit(BookingEvent::HoldReleased {
            hold_id: released.id,
            show_id: released.show_id,
            seat_ids: released.seat_ids.clone(),
        })
        .await;
        Ok(released)
    }

    fn validate_request(&self, seat_ids: &[String], quantity: usize) -> Result<(), BookingError> {
        if seat_ids.is_empty() {
            return Err(BookingError::validation("seat list must not be empty"));
        }
        if quantity != seat_ids.len() {
            return Err(BookingError::validation(format!(
                "quantity {quantity} does not match {} requested seats",
                seat_ids.len()
            )));
        }
        if seat_ids.len() > self.policy.max_seats {
            return Err(BookingError::validation(format!(
                "at most {} seats per booking",
                self.policy.max_seats
            )));
        }
        let unique: BTreeSet<&String> = seat_ids.iter().collect();
        if unique.len() != seat_ids.len() {
            return Err(BookingError::validation("duplicate seat ids in request"));
        }
        Ok(())
    }

    async fn emit(&self, event: BookingEvent) {
        if let Err(err) = self.events.publish(&event).await {
            tracing::warn!(topic = event.topic(), "event emission failed: {err}");
        }
    }
}

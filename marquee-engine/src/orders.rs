use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use marquee_core::{
    BookingError, BookingEvent, Clock, Customer, EventSink, Hold, HoldStatus, HoldStore, Order,
    OrderLedger, OrderStatus, SeatLockStore, ShowCatalog,
};

use crate::availability::AvailabilityAggregator;
use crate::policy::OrderPolicy;
use crate::{infra, to_chrono};

/// Owns the order lifecycle: hold consumption, payment window, one-way
/// confirmation. Every transition re-reads the ledger because the ledger
/// alone is durable truth; the seat lock only protected the window up to
/// order creation.
pub struct OrderManager {
    ledger: Arc<dyn OrderLedger>,
    holds: Arc<dyn HoldStore>,
    locks: Arc<dyn SeatLockStore>,
    catalog: Arc<dyn ShowCatalog>,
    availability: Arc<AvailabilityAggregator>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    policy: OrderPolicy,
}

impl OrderManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<dyn OrderLedger>,
        holds: Arc<dyn HoldStore>,
        locks: Arc<dyn SeatLockStore>,
        catalog: Arc<dyn ShowCatalog>,
        availability: Arc<AvailabilityAggregator>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        policy: OrderPolicy,
    ) -> Self {
        Self {
            ledger,
            holds,
            locks,
            catalog,
            availability,
            events,
            clock,
            policy,
        }
    }

    /// Converts a HELD hold into a PAYMENT_PENDING order.
    ///
    /// Confirmed seats are re-read as of now: a seat could have been sold
    /// through a different hold that finished first. On that conflict the
    /// hold is left untouched so the caller can retry with other seats.
    pub async fn create_order(
        &self,
        hold_id: Uuid,
        holder_id: &str,
        customer: Customer,
    ) -> Result<Order, BookingError> {
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
        let now = self.clock.now();
        match hold.status_at(now) {
            HoldStatus::Held => {}
            HoldStatus::Expired => {
                return Err(BookingError::Expired {
                    kind: "hold",
                    id: hold_id.to_string(),
                })
            }
            status => {
                return Err(BookingError::WrongStatus {
                    kind: "hold",
                    id: hold_id.to_string(),
                    status: status.as_str().to_string(),
                })
            }
        }
        validate_customer(&customer)?;

        let show = self
            .catalog
            .get_show(hold.show_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("show", hold.show_id))?;
        let amount_cents = show.price_cents * hold.seat_ids.len() as i64;

        let confirmed = self
            .ledger
            .confirmed_seats(hold.show_id)
            .await
            .map_err(infra)?;
        let taken: Vec<String> = hold
            .seat_ids
            .iter()
            .filter(|seat| confirmed.contains(*seat))
            .cloned()
            .collect();
        if !taken.is_empty() {
            return Err(BookingError::SeatConflict { seats: taken });
        }

        let order = Order::from_hold(&hold, customer, amount_cents, now, to_chrono(self.policy.ttl));
        // An insert failure leaves the hold fully intact; the caller may
        // simply retry the conversion.
        self.ledger.insert_order(&order).await.map_err(infra)?;

        // The durable record now protects the seats; the transient lock is
        // done. If the unlock fails the lock decays by TTL on its own, and
        // the hold is consumed either way.
        self.consume_hold(&hold, holder_id).await;

        self.availability.invalidate(order.show_id);
        self.emit(BookingEvent::OrderCreated {
            order_id: order.id,
            hold_id: order.hold_id,
            show_id: order.show_id,
            holder_id: order.holder_id.clone(),
            seat_ids: order.seat_ids.clone(),
            amount_cents: order.amount_cents,
            expires_at: order.expires_at,
        })
        .await;

        tracing::info!(order_id = %order.id, hold_id = %hold_id, amount_cents, "order created");
        Ok(order)
    }

    /// The order with its status derived at read time; never writes.
    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, BookingError> {
        let order = self
            .ledger
            .get_order(order_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("order", order_id))?;
        Ok(order.at(self.clock.now()))
    }

    /// The holder's orders, newest first, statuses derived.
    pub async fn list_orders(&self, holder_id: &str) -> Result<Vec<Order>, BookingError> {
        let now = self.clock.now();
        let orders = self.ledger.list_orders(holder_id).await.map_err(infra)?;
        Ok(orders.into_iter().map(|order| order.at(now)).collect())
    }

    /// One-way transition out of PAYMENT_PENDING.
    ///
    /// Re-validates against the ledger alone: if any seat was confirmed by
    /// a different order since creation, this order is marked FAILED and
    /// the lost seats are reported. Confirming against already-sold seats
    /// must never happen silently.
    pub async fn confirm_payment(
        &self,
        order_id: Uuid,
        holder_id: &str,
    ) -> Result<Order, BookingError> {
        let order = self
            .ledger
            .get_order(order_id)
            .await
            .map_err(infra)?
            .ok_or_else(|| BookingError::not_found("order", order_id))?;
        if order.holder_id != holder_id {
            return Err(BookingError::NotOwner {
                kind: "order",
                id: order_id.to_string(),
            });
        }
        let now = self.clock.now();
        match order.status_at(now) {
            OrderStatus::PaymentPending => {}
            OrderStatus::Expired => {
                return Err(BookingError::Expired {
                    kind: "order",
                    id: order_id.to_string(),
                })
            }
            status => {
                return Err(BookingError::WrongStatus {
                    kind: "order",
                    id: order_id.to_string(),
                    status: status.as_str().to_string(),
                })
            }
        }

        let confirmed = self
            .ledger
            .confirmed_seats(order.show_id)
            .await
            .map_err(infra)?;
        let lost: Vec<String> = order
            .seat_ids
            .iter()
            .filter(|seat| confirmed.contains(*seat))
            .cloned()
            .collect();
        if !lost.is_empty() {
            self.ledger.mark_failed(order.id).await.map_err(infra)?;
            tracing::warn!(order_id = %order.id, ?lost, "confirmation lost the race window");
            return Err(BookingError::SeatsLost { seats: lost });
        }

        let ticket_code = ticket_code(order.id, now);
        self.ledger
            .mark_confirmed(order.id, &ticket_code, now)
            .await
            .map_err(infra)?;

        let confirmed_order = Order {
            status: OrderStatus::Confirmed,
            ticket_code: Some(ticket_code.clone()),
            confirmed_at: Some(now),
            ..order
        };
        self.availability.invalidate(confirmed_order.show_id);
        self.emit(BookingEvent::OrderConfirmed {
            order_id: confirmed_order.id,
            show_id: confirmed_order.show_id,
            seat_ids: confirmed_order.seat_ids.clone(),
            ticket_code,
            confirmed_at: now,
        })
        .await;

        tracing::info!(order_id = %confirmed_order.id, "order confirmed");
        Ok(confirmed_order)
    }

    /// Releases the hold's lock and records it as consumed. Both steps are
    /// recoverable if they fail: the lock expires by TTL, and a stale HELD
    /// record past its `expires_at` reads as EXPIRED.
    async fn consume_hold(&self, hold: &Hold, holder_id: &str) {
        if let Err(err) = self
            .locks
            .unlock(hold.show_id, &hold.seat_ids, holder_id)
            .await
        {
            tracing::warn!(hold_id = %hold.id, "unlock after order creation failed, lock will decay by TTL: {err}");
        }
        let consumed = Hold {
            status: HoldStatus::Released,
            ..hold.clone()
        };
        if let Err(err) = self.holds.save_hold(&consumed).await {
            tracing::warn!(hold_id = %hold.id, "failed to record consumed hold: {err}");
        }
    }

    async fn emit(&self, event: BookingEvent) {
        if let Err(err) = self.events.publish(&event).await {
            tracing::warn!(topic = event.topic(), "event emission failed: {err}");
        }
    }
}

fn validate_customer(customer: &Customer) -> Result<(), BookingError> {
    if customer.name.trim().is_empty() {
        return Err(BookingError::validation("customer name is required"));
    }
    if customer.email.trim().is_empty() || !customer.email.contains('@') {
        return Err(BookingError::validation("customer email is invalid"));
    }
    if customer.phone.trim().is_empty() {
        return Err(BookingError::validation("customer phone is required"));
    }
    Ok(())
}

// Format: MRQ-{timestamp}-{short_id}
fn ticket_code(order_id: Uuid, now: DateTime<Utc>) -> String {
    let id = order_id.to_string();
    format!("MRQ-{}-{}", now.timestamp(), id[..8].to_uppercase())
}

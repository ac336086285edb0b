use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hold::Hold;

/// Order status in the lifecycle.
///
/// PAYMENT_PENDING auto-expires by elapsed time; CONFIRMED and FAILED are
/// terminal. An EXPIRED order's seats are not counted as confirmed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PaymentPending,
    Confirmed,
    Failed,
    Expired,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PaymentPending => "PAYMENT_PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Expired => "EXPIRED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT_PENDING" => Ok(OrderStatus::PaymentPending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "FAILED" => Ok(OrderStatus::Failed),
            "EXPIRED" => Ok(OrderStatus::Expired),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Contact details captured at order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A payable booking derived from exactly one hold.
///
/// The durable record: once CONFIRMED, its seats are permanently
/// unavailable independent of any lock state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub hold_id: Uuid,
    pub show_id: Uuid,
    pub holder_id: String,
    pub seat_ids: Vec<String>,
    pub customer: Customer,
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub ticket_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// New PAYMENT_PENDING order consuming the given hold.
    pub fn from_hold(
        hold: &Hold,
        customer: Customer,
        amount_cents: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            hold_id: hold.id,
            show_id: hold.show_id,
            holder_id: hold.holder_id.clone(),
            seat_ids: hold.seat_ids.clone(),
            customer,
            amount_cents,
            status: OrderStatus::PaymentPending,
            ticket_code: None,
            created_at: now,
            expires_at: now + ttl,
            confirmed_at: None,
        }
    }

    /// Status as observed at `now`; a pending order past its expiry reads
    /// as EXPIRED without any write-back.
    pub fn status_at(&self, now: DateTime<Utc>) -> OrderStatus {
        if self.status == OrderStatus::PaymentPending && now >= self.expires_at {
            OrderStatus::Expired
        } else {
            self.status
        }
    }

    /// Copy of this order with the status derived at `now`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.status_at(now);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_order(now: DateTime<Utc>) -> Order {
        let hold = Hold::new(
            Uuid::new_v4(),
            "guest-1".to_string(),
            vec!["A1".to_string()],
            now,
            Duration::seconds(300),
        );
        let customer = Customer {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+15550001".to_string(),
        };
        Order::from_hold(&hold, customer, 2500, now, Duration::seconds(900))
    }

    #[test]
    fn test_pending_expires_lazily() {
        let now = Utc::now();
        let order = pending_order(now);

        assert_eq!(order.status_at(now), OrderStatus::PaymentPending);
        assert_eq!(
            order.status_at(now + Duration::seconds(900)),
            OrderStatus::Expired
        );
        assert_eq!(order.status, OrderStatus::PaymentPending);
    }

    #[test]
    fn test_confirmed_never_expires() {
        let now = Utc::now();
        let mut order = pending_order(now);
        order.status = OrderStatus::Confirmed;

        assert_eq!(
            order.status_at(now + Duration::days(30)),
            OrderStatus::Confirmed
        );
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            OrderStatus::PaymentPending,
            OrderStatus::Confirmed,
            OrderStatus::Failed,
            OrderStatus::Expired,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("PAID".parse::<OrderStatus>().is_err());
    }
}

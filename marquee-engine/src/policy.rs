use std::time::Duration;

/// Business rules for holds.
#[derive(Debug, Clone)]
pub struct HoldPolicy {
    /// Seat lock TTL, also the hold's payment-details window.
    pub ttl: Duration,
    /// Per-booking seat cap.
    pub max_seats: usize,
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_seats: 8,
        }
    }
}

/// Business rules for orders.
#[derive(Debug, Clone)]
pub struct OrderPolicy {
    /// Payment window for a PAYMENT_PENDING order.
    pub ttl: Duration,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(900),
        }
    }
}

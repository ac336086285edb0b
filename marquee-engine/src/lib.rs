//! The seat reservation and booking concurrency engine.
//!
//! Correctness rests on three checks, not on serializing requests: the
//! atomic check-then-set in the seat lock store, the ledger re-read when a
//! hold becomes an order, and the ledger re-read when an order is
//! confirmed. Holds and orders expire lazily; readers derive status from
//! `expires_at` and never write it back.

pub mod availability;
pub mod holds;
pub mod orders;
pub mod policy;

pub use availability::{AvailabilityAggregator, SeatAvailability};
pub use holds::HoldManager;
pub use orders::OrderManager;
pub use policy::{HoldPolicy, OrderPolicy};

use marquee_core::{BookingError, StoreError};

/// Store failures that survive the bounded retry below this layer surface
/// as a generic unavailable error; nothing above the engine sees store
/// error types.
pub(crate) fn infra(err: StoreError) -> BookingError {
    BookingError::unavailable(err)
}

pub(crate) fn to_chrono(ttl: std::time::Duration) -> chrono::Duration {
    chrono::Duration::seconds(ttl.as_secs() as i64)
}

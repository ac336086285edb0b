//! Deterministic test doubles for the booking engine: a manual clock and
//! in-memory implementations of every store trait. No test needs Redis,
//! Postgres or Kafka.

pub mod clock;
pub mod memory;

pub use clock::ManualClock;
pub use memory::{
    InMemoryHoldStore, InMemoryOrderLedger, InMemorySeatLockStore, InMemoryShowCatalog,
    RecordingEventSink,
};

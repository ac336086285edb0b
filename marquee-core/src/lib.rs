pub mod clock;
pub mod error;
pub mod events;
pub mod hold;
pub mod order;
pub mod show;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use error::BookingError;
pub use events::BookingEvent;
pub use hold::{Hold, HoldStatus};
pub use order::{Customer, Order, OrderStatus};
pub use show::Show;
pub use store::{
    EventSink, HoldStore, LockAttempt, OrderLedger, SeatLockStore, ShowCatalog, StoreError,
    StoreResult,
};

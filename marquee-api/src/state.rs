use std::sync::Arc;

use marquee_engine::{AvailabilityAggregator, HoldManager, OrderManager};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub holds: Arc<HoldManager>,
    pub orders: Arc<OrderManager>,
    pub availability: Arc<AvailabilityAggregator>,
    pub auth: AuthConfig,
}

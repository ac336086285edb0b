pub mod app_config;
pub mod database;
pub mod events;
pub mod order_repo;
pub mod redis_repo;
pub mod retry;
pub mod show_repo;

pub use database::DbClient;
pub use events::KafkaEventSink;
pub use order_repo::PgOrderLedger;
pub use redis_repo::RedisClient;
pub use show_repo::PgShowCatalog;

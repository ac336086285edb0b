use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use marquee_api::{app, state::{AppState, AuthConfig}};
use marquee_core::{Clock, EventSink, HoldStore, SeatLockStore, ShowCatalog, SystemClock};
use marquee_engine::{AvailabilityAggregator, HoldManager, HoldPolicy, OrderManager, OrderPolicy};
use marquee_store::{DbClient, KafkaEventSink, PgOrderLedger, PgShowCatalog, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let redis = RedisClient::new(
        &config.redis.url,
        Duration::from_secs(config.booking.hold_retention_seconds),
    )
    .await
    .expect("Failed to connect to Redis");

    let kafka = KafkaEventSink::new(&config.kafka.brokers).expect("Failed to create Kafka producer");

    let locks: Arc<dyn SeatLockStore> = Arc::new(redis.clone());
    let hold_store: Arc<dyn HoldStore> = Arc::new(redis);
    let ledger = Arc::new(PgOrderLedger::new(db.pool.clone()));
    let catalog: Arc<dyn ShowCatalog> = Arc::new(PgShowCatalog::new(db.pool.clone()));
    let events: Arc<dyn EventSink> = Arc::new(kafka);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let availability = Arc::new(AvailabilityAggregator::new(
        catalog.clone(),
        ledger.clone(),
        locks.clone(),
        clock.clone(),
        Duration::from_secs(config.booking.availability_cache_seconds),
    ));
    let holds = Arc::new(HoldManager::new(
        locks.clone(),
        hold_store.clone(),
        catalog.clone(),
        availability.clone(),
        events.clone(),
        clock.clone(),
        HoldPolicy {
            ttl: Duration::from_secs(config.booking.hold_ttl_seconds),
            max_seats: config.booking.max_seats_per_hold,
        },
    ));
    let orders = Arc::new(OrderManager::new(
        ledger,
        hold_store,
        locks,
        catalog,
        availability.clone(),
        events,
        clock,
        OrderPolicy {
            ttl: Duration::from_secs(config.booking.order_ttl_seconds),
        },
    ));

    let app_state = AppState {
        holds,
        orders,
        availability,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, error};

use marquee_core::{BookingEvent, EventSink, StoreResult};

/// Kafka sink for booking lifecycle events. Delivery is fire-and-forget
/// from the engine's point of view; managers log a failed publish and
/// carry on.
#[derive(Clone)]
pub struct KafkaEventSink {
    producer: FutureProducer,
}

impl KafkaEventSink {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }
}

#[async_trait]
impl EventSink for KafkaEventSink {
    async fn publish(&self, event: &BookingEvent) -> StoreResult<()> {
        let payload = serde_json::to_string(event)?;
        let key = event.key();
        let record = FutureRecord::to(event.topic()).key(&key).payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                debug!(
                    "Sent {} to partition {} offset {}",
                    event.topic(),
                    delivery.partition,
                    delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send {}: {}", event.topic(), e);
                Err(Box::new(e))
            }
        }
    }
}

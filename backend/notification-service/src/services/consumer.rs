//! Hub event stream consumer.
//!
//! Reads message/announcement events off the Redis stream with a consumer
//! group, hands them to the fan-out engine, and acks. Entries that fail to
//! parse are acked and dropped with a warning so one poison entry cannot
//! wedge the group. Delivery failures are logged, not retried; the
//! per-chunk retry inside the FCM client is the only retry in the path.

use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::time::{self, Duration};

use crate::models::HubEvent;
use crate::services::fan_out::FanOutEngine;

pub struct ConsumerConfig {
    pub stream: String,
    pub group_name: String,
    pub consumer_name: String,
    pub batch_size: usize,
    pub block_ms: usize,
}

impl ConsumerConfig {
    pub fn new(stream: String, group_name: String) -> Self {
        Self {
            stream,
            group_name,
            consumer_name: format!("instance-{}", uuid::Uuid::new_v4()),
            batch_size: 100,
            block_ms: 5_000,
        }
    }
}

/// Create the consumer group if it is missing (idempotent).
pub async fn ensure_consumer_group(
    client: &redis::Client,
    config: &ConsumerConfig,
) -> redis::RedisResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;

    // BUSYGROUP means another instance got here first; that is fine.
    let _: Result<(), _> = redis::cmd("XGROUP")
        .arg("CREATE")
        .arg(&config.stream)
        .arg(&config.group_name)
        .arg("0")
        .arg("MKSTREAM")
        .query_async(&mut conn)
        .await;

    Ok(())
}

fn fields_of(entry: &redis::streams::StreamId) -> HashMap<String, String> {
    entry
        .map
        .iter()
        .filter_map(|(k, v)| {
            redis::from_redis_value::<String>(v)
                .ok()
                .map(|s| (k.clone(), s))
        })
        .collect()
}

/// Blocking consume loop. Runs for the lifetime of the service instance.
pub async fn run(
    client: redis::Client,
    config: ConsumerConfig,
    engine: FanOutEngine,
) -> redis::RedisResult<()> {
    ensure_consumer_group(&client, &config).await?;
    let mut conn = client.get_multiplexed_async_connection().await?;

    tracing::info!(
        stream = %config.stream,
        group = %config.group_name,
        consumer = %config.consumer_name,
        "event consumer started"
    );

    loop {
        let opts = StreamReadOptions::default()
            .group(&config.group_name, &config.consumer_name)
            .count(config.batch_size)
            .block(config.block_ms);

        let reply: redis::RedisResult<StreamReadReply> = conn
            .xread_options(&[&config.stream], &[">"], &opts)
            .await;

        match reply {
            Ok(reply) => {
                for key in reply.keys {
                    for entry in key.ids {
                        let fields = fields_of(&entry);

                        match HubEvent::parse(&fields) {
                            Ok(event) => {
                                if let Err(e) = engine.handle_event(&event).await {
                                    tracing::error!(error = %e, entry = %entry.id,
                                        "fan-out failed for event");
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, entry = %entry.id,
                                    "dropping unparseable event");
                            }
                        }

                        // At-least-once hand-off ends here: processed or
                        // dropped, the entry is acked so the group advances.
                        let _: Result<i64, _> = conn
                            .xack(&config.stream, &config.group_name, &[&entry.id])
                            .await;
                    }
                }
            }
            Err(e) if e.kind() == redis::ErrorKind::IoError => {
                // Block timeout or transient connection issue
                time::sleep(Duration::from_millis(100)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "event consumer read error");
                time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

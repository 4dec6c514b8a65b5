use crate::websocket::ConnectionRegistry;
use axum::extract::ws::Message;
use redis::AsyncCommands;
use redis::Client;
use uuid::Uuid;

fn channel_for_group(id: Uuid) -> String {
    format!("group:{}", id)
}

/// Publish a frame so other hub instances can deliver it to their own
/// subscribers.
pub async fn publish(client: &Client, group_id: Uuid, payload: &str) -> redis::RedisResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let ch = channel_for_group(group_id);
    conn.publish::<_, _, ()>(ch, payload).await
}

/// Cross-instance fan-in: everything published on group:* is re-broadcast
/// to this instance's local subscribers.
pub async fn start_psub_listener(
    client: Client,
    registry: ConnectionRegistry,
) -> redis::RedisResult<()> {
    // PubSub requires a dedicated connection, not multiplexed
    let conn = client.get_async_connection().await?;
    let mut pubsub = conn.into_pubsub();
    pubsub.psubscribe("group:*").await?;
    let mut stream = pubsub.on_message();
    use futures_util::StreamExt;
    while let Some(msg) = stream.next().await {
        let channel: String = msg.get_channel_name().into();
        let payload: String = msg.get_payload()?;
        if let Some(rest) = channel.strip_prefix("group:") {
            if let Ok(uuid) = Uuid::parse_str(rest) {
                registry.broadcast(uuid, Message::Text(payload.clone())).await;
            }
        }
    }
    Ok(())
}

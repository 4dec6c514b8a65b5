//! Producer side of the hub event stream.
//!
//! Every successful message/announcement create lands one entry on a Redis
//! stream; the notification service consumes it with a consumer group and
//! performs the push fan-out. Delivery is at-least-once; the hub never
//! blocks a request on fan-out.

use redis::AsyncCommands;
use uuid::Uuid;

/// Approximate cap on retained stream entries.
const STREAM_MAXLEN: usize = 10_000;

pub const EVENT_KIND_MESSAGE: &str = "message";
pub const EVENT_KIND_ANNOUNCEMENT: &str = "announcement";

pub async fn publish_message_event(
    client: &redis::Client,
    stream: &str,
    union_id: Uuid,
    group_id: Uuid,
    message_id: Uuid,
    sender_id: Uuid,
    preview: &str,
) -> redis::RedisResult<String> {
    let mut conn = client.get_multiplexed_async_connection().await?;

    let entry_id: String = conn
        .xadd(
            stream,
            "*",
            &[
                ("kind", EVENT_KIND_MESSAGE),
                ("union_id", union_id.to_string().as_str()),
                ("group_id", group_id.to_string().as_str()),
                ("message_id", message_id.to_string().as_str()),
                ("sender_id", sender_id.to_string().as_str()),
                ("preview", preview),
            ],
        )
        .await?;

    trim_stream(&mut conn, stream).await;
    Ok(entry_id)
}

pub async fn publish_announcement_event(
    client: &redis::Client,
    stream: &str,
    union_id: Uuid,
    announcement_id: Uuid,
    title: &str,
) -> redis::RedisResult<String> {
    let mut conn = client.get_multiplexed_async_connection().await?;

    let entry_id: String = conn
        .xadd(
            stream,
            "*",
            &[
                ("kind", EVENT_KIND_ANNOUNCEMENT),
                ("union_id", union_id.to_string().as_str()),
                ("announcement_id", announcement_id.to_string().as_str()),
                ("title", title),
            ],
        )
        .await?;

    trim_stream(&mut conn, stream).await;
    Ok(entry_id)
}

/// Keep the stream bounded; approximate trimming is fine here.
async fn trim_stream(conn: &mut redis::aio::MultiplexedConnection, stream: &str) {
    let _: Result<(), _> = redis::cmd("XTRIM")
        .arg(stream)
        .arg("MAXLEN")
        .arg("~")
        .arg(STREAM_MAXLEN)
        .query_async(conn)
        .await;
}

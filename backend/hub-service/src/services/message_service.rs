use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::message::{MessageDto, MessageRecord};

pub struct MessageService;

impl MessageService {
    /// Insert a message and return the authoritative record. `client_ref`
    /// is stored and echoed so clients can reconcile their optimistic entry.
    pub async fn create(
        db: &Pool<Postgres>,
        group_id: Uuid,
        sender_id: Uuid,
        content: &str,
        client_ref: Option<&str>,
    ) -> Result<MessageRecord, AppError> {
        let id = Uuid::new_v4();
        let record = sqlx::query_as::<_, MessageRecord>(
            "INSERT INTO messages (id, group_id, sender_id, content, client_ref) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, group_id, sender_id, content, client_ref, created_at",
        )
        .bind(id)
        .bind(group_id)
        .bind(sender_id)
        .bind(content)
        .bind(client_ref)
        .fetch_one(db)
        .await?;
        Ok(record)
    }

    /// Message history for a group, joined with sender display names.
    /// Ordered by created_at with id as the stable tie-break.
    pub async fn history(
        db: &Pool<Postgres>,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageDto>, AppError> {
        let limit = limit.clamp(1, 200);

        let rows = sqlx::query(
            "SELECT m.id, m.group_id, m.sender_id, m.content, m.client_ref, m.created_at, \
                    u.display_name AS sender_name \
             FROM messages m \
             JOIN users u ON u.id = m.sender_id \
             WHERE m.group_id = $1 AND m.deleted_at IS NULL \
             ORDER BY m.created_at ASC, m.id ASC \
             LIMIT $2 OFFSET $3",
        )
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let out = rows
            .into_iter()
            .map(|r| {
                let record = MessageRecord {
                    id: r.get("id"),
                    group_id: r.get("group_id"),
                    sender_id: r.get("sender_id"),
                    content: r.get("content"),
                    client_ref: r.get("client_ref"),
                    created_at: r.get("created_at"),
                };
                let sender_name: String = r.get("sender_name");
                MessageDto::from_record(record, Some(sender_name))
            })
            .collect();
        Ok(out)
    }

    /// Moderation delete: soft, so the row keeps its place in audits.
    pub async fn soft_delete(db: &Pool<Postgres>, message_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE messages SET deleted_at = NOW() WHERE id = $1")
            .bind(message_id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Sender and owning group of a live message, for delete authorization.
    pub async fn sender_and_group(
        db: &Pool<Postgres>,
        message_id: Uuid,
    ) -> Result<(Uuid, Uuid), AppError> {
        let row = sqlx::query(
            "SELECT sender_id, group_id FROM messages WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(message_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;
        Ok((row.get("sender_id"), row.get("group_id")))
    }
}

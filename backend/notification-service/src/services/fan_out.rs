//! Push fan-out engine.
//!
//! Recipients come from the denormalized union membership index, never a
//! full user-table scan. Tokens are fetched per recipient page (a failed
//! page is logged and skipped, not fatal), deduplicated across users, and
//! handed to the FCM client in platform-sized chunks with per-chunk retry.

use hub_fcm_shared::{FcmClient, PushPayload};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::HubEvent;

/// Recipient ids per token query; bounds statement size for large unions.
const RECIPIENT_PAGE: usize = 1_000;

pub struct FanOutEngine {
    db: PgPool,
    fcm: Option<Arc<FcmClient>>,
}

impl FanOutEngine {
    pub fn new(db: PgPool, fcm: Option<Arc<FcmClient>>) -> Self {
        Self { db, fcm }
    }

    /// Handle one hub event end to end. Never returns an error for delivery
    /// failures; those are logged. Errors here mean the recipient index
    /// itself was unreadable.
    pub async fn handle_event(&self, event: &HubEvent) -> Result<(), AppError> {
        let recipients = self.recipients_for(event).await?;
        let tokens = self.collect_tokens(&recipients).await;

        if tokens.is_empty() {
            tracing::info!(union_id = %event.union_id(), "fan-out no-op: no registered tokens");
            return Ok(());
        }

        let payload = payload_for(event);

        match self.fcm.as_ref() {
            Some(fcm) => {
                let result = fcm.send_multicast(&tokens, &payload).await;
                tracing::info!(
                    union_id = %event.union_id(),
                    tokens = tokens.len(),
                    chunks = result.chunks_sent,
                    delivered = result.success_count,
                    failed = result.failure_count,
                    "fan-out complete"
                );
            }
            None => {
                tracing::warn!(
                    union_id = %event.union_id(),
                    tokens = tokens.len(),
                    "push delivery disabled; dropping fan-out"
                );
            }
        }

        Ok(())
    }

    /// Union members for the event, minus the excluded sender for messages.
    async fn recipients_for(&self, event: &HubEvent) -> Result<Vec<Uuid>, AppError> {
        let rows = match event.excluded_sender() {
            Some(sender_id) => {
                sqlx::query(
                    "SELECT user_id FROM union_members \
                     WHERE union_id = $1 AND user_id <> $2",
                )
                .bind(event.union_id())
                .bind(sender_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query("SELECT user_id FROM union_members WHERE union_id = $1")
                    .bind(event.union_id())
                    .fetch_all(&self.db)
                    .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.get("user_id")).collect())
    }

    /// Active tokens for the recipients, paged. One failed page does not
    /// abort the rest of the fan-out.
    async fn collect_tokens(&self, recipients: &[Uuid]) -> Vec<String> {
        let mut pairs: Vec<(Uuid, String)> = Vec::new();

        for page in recipients.chunks(RECIPIENT_PAGE) {
            let result = sqlx::query(
                "SELECT user_id, token FROM device_tokens \
                 WHERE user_id = ANY($1) AND is_active",
            )
            .bind(page)
            .fetch_all(&self.db)
            .await;

            match result {
                Ok(rows) => {
                    pairs.extend(
                        rows.into_iter()
                            .map(|r| (r.get::<Uuid, _>("user_id"), r.get::<String, _>("token"))),
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, page_len = page.len(),
                        "token lookup failed for a recipient page; continuing");
                }
            }
        }

        dedupe_tokens(pairs, None)
    }
}

/// Deduplicate tokens across users, optionally dropping an excluded user's
/// tokens entirely. First-seen order is preserved.
pub fn dedupe_tokens(pairs: Vec<(Uuid, String)>, exclude_user: Option<Uuid>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (user_id, token) in pairs {
        if Some(user_id) == exclude_user {
            continue;
        }
        if seen.insert(token.clone()) {
            out.push(token);
        }
    }
    out
}

/// Title, body, and the click-through data map for one event.
pub fn payload_for(event: &HubEvent) -> PushPayload {
    match event {
        HubEvent::Message {
            union_id,
            group_id,
            message_id,
            preview,
            ..
        } => PushPayload {
            title: "New message".to_string(),
            body: preview.clone(),
            data: serde_json::json!({
                "union_id": union_id.to_string(),
                "group_id": group_id.to_string(),
                "message_id": message_id.to_string(),
                "url": format!("/groups/{group_id}"),
            }),
        },
        HubEvent::Announcement {
            union_id,
            announcement_id,
            title,
        } => PushPayload {
            title: "New announcement".to_string(),
            body: title.clone(),
            data: serde_json::json!({
                "union_id": union_id.to_string(),
                "announcement_id": announcement_id.to_string(),
                "url": "/announcements".to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_drops_duplicates_and_excluded_sender() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let pairs = vec![
            (u1, "t1".to_string()),
            (u2, "t2".to_string()),
            (u2, "t2".to_string()),
        ];

        let tokens = dedupe_tokens(pairs, Some(u1));
        assert_eq!(tokens, vec!["t2".to_string()]);
    }

    #[test]
    fn dedupe_keeps_first_seen_order() {
        let u = Uuid::new_v4();
        let pairs = vec![
            (u, "b".to_string()),
            (u, "a".to_string()),
            (u, "b".to_string()),
        ];
        assert_eq!(dedupe_tokens(pairs, None), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn message_payload_carries_click_through_data() {
        let group_id = Uuid::new_v4();
        let event = HubEvent::Message {
            union_id: Uuid::new_v4(),
            group_id,
            message_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            preview: "see you at the rally".into(),
        };

        let payload = payload_for(&event);
        assert_eq!(payload.body, "see you at the rally");
        assert_eq!(payload.data["url"], format!("/groups/{group_id}"));
        assert!(payload.data["message_id"].is_string());
    }

    #[test]
    fn announcement_payload_uses_title() {
        let event = HubEvent::Announcement {
            union_id: Uuid::new_v4(),
            announcement_id: Uuid::new_v4(),
            title: "AGM moved to June".into(),
        };

        let payload = payload_for(&event);
        assert_eq!(payload.title, "New announcement");
        assert_eq!(payload.body, "AGM moved to June");
    }
}

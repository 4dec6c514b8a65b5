use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::context::Identity;
use crate::error::ClientError;

/// Display name used for realtime senders whose profile we have not joined.
/// Realtime events carry no relational data; history queries do.
pub const SENDER_PLACEHOLDER: &str = "Member";

/// Timeline entry identity: a locally allocated placeholder until the server
/// confirms, then the authoritative record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId {
    Local(u64),
    Server(Uuid),
}

/// Delivery state machine for outbound entries.
///
/// Inbound entries are Confirmed on arrival; outbound entries move
/// Pending → Confirmed on the server response, or Pending → Failed where
/// they stay visible until retried or discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Confirmed,
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: EntryId,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub delivery: DeliveryState,
}

/// The authoritative message record as the server returns it, both from the
/// send endpoint and from realtime events.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMessage {
    pub id: Uuid,
    pub group_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// What the transport must submit for a pending entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundDraft {
    pub local_id: u64,
    pub group_id: Uuid,
    pub content: String,
    /// Echoed back by the server as `client_ref`.
    pub client_ref: String,
}

/// Ordered message state for one open chat view.
///
/// The sequence is append-only: entries are replaced in place on
/// confirmation but never re-sorted, so late realtime arrivals land at the
/// tail regardless of their timestamp.
pub struct ChatTimeline {
    group_id: Uuid,
    viewer: Identity,
    entries: Vec<ChatEntry>,
    next_local: u64,
}

impl ChatTimeline {
    pub fn open(group_id: Uuid, viewer: Identity) -> Self {
        Self {
            group_id,
            viewer,
            entries: Vec::new(),
            next_local: 1,
        }
    }

    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seed the view from a history fetch (already joined with names).
    pub fn load_history(&mut self, history: Vec<ChatEntry>) {
        self.entries = history;
    }

    /// Optimistic send: the entry is visible before any network round-trip.
    /// Returns the draft the transport must submit.
    pub fn send(&mut self, content: impl Into<String>) -> OutboundDraft {
        let content = content.into();
        let local_id = self.next_local;
        self.next_local += 1;

        self.entries.push(ChatEntry {
            id: EntryId::Local(local_id),
            sender_id: self.viewer.user_id,
            sender_name: self.viewer.display_name.clone(),
            content: content.clone(),
            sent_at: Utc::now(),
            delivery: DeliveryState::Pending,
        });

        OutboundDraft {
            local_id,
            group_id: self.group_id,
            content,
            client_ref: format!("local-{local_id}"),
        }
    }

    /// Server accepted the send: swap the placeholder for the authoritative
    /// record, in place. If the realtime echo beat the response here, the
    /// placeholder is dropped instead so the server id stays unique.
    pub fn confirm_send(&mut self, local_id: u64, server: ServerMessage) -> Result<(), ClientError> {
        let idx = self
            .position_of(EntryId::Local(local_id))
            .ok_or(ClientError::UnknownEntry)?;

        if self.contains_server_id(server.id) {
            self.entries.remove(idx);
            return Ok(());
        }

        let entry = &mut self.entries[idx];
        entry.id = EntryId::Server(server.id);
        entry.content = server.content;
        entry.sent_at = server.created_at;
        entry.delivery = DeliveryState::Confirmed;
        Ok(())
    }

    /// Server rejected (or the transport failed): keep the entry, visibly
    /// failed, for manual retry or discard.
    pub fn fail_send(&mut self, local_id: u64, reason: impl Into<String>) -> Result<(), ClientError> {
        let idx = self
            .position_of(EntryId::Local(local_id))
            .ok_or(ClientError::UnknownEntry)?;
        self.entries[idx].delivery = DeliveryState::Failed {
            reason: reason.into(),
        };
        Ok(())
    }

    /// Re-submit a failed entry. Returns a fresh draft; the entry goes back
    /// to Pending in place, keeping its position in the view.
    pub fn retry(&mut self, local_id: u64) -> Result<OutboundDraft, ClientError> {
        let idx = self
            .position_of(EntryId::Local(local_id))
            .ok_or(ClientError::UnknownEntry)?;

        if !matches!(self.entries[idx].delivery, DeliveryState::Failed { .. }) {
            return Err(ClientError::NotFailed);
        }

        self.entries[idx].delivery = DeliveryState::Pending;
        Ok(OutboundDraft {
            local_id,
            group_id: self.group_id,
            content: self.entries[idx].content.clone(),
            client_ref: format!("local-{local_id}"),
        })
    }

    /// Drop a failed entry entirely.
    pub fn discard(&mut self, local_id: u64) -> Result<(), ClientError> {
        let idx = self
            .position_of(EntryId::Local(local_id))
            .ok_or(ClientError::UnknownEntry)?;

        if !matches!(self.entries[idx].delivery, DeliveryState::Failed { .. }) {
            return Err(ClientError::NotFailed);
        }

        self.entries.remove(idx);
        Ok(())
    }

    /// Merge an inbound realtime event.
    ///
    /// Idempotent by server id: an event whose id is already present is the
    /// echo of this client's own confirmed send and is discarded. New events
    /// append at the tail; there is no timestamp insertion sort. Returns
    /// whether the event was appended.
    pub fn merge_event(&mut self, server: ServerMessage) -> bool {
        if server.group_id != self.group_id {
            return false;
        }
        if self.contains_server_id(server.id) {
            return false;
        }

        let sender_name = if server.sender_id == self.viewer.user_id {
            self.viewer.display_name.clone()
        } else {
            SENDER_PLACEHOLDER.to_string()
        };

        self.entries.push(ChatEntry {
            id: EntryId::Server(server.id),
            sender_id: server.sender_id,
            sender_name,
            content: server.content,
            sent_at: server.created_at,
            delivery: DeliveryState::Confirmed,
        });
        true
    }

    fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn contains_server_id(&self, id: Uuid) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.id, EntryId::Server(s) if s == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            display_name: "U1".into(),
        }
    }

    fn server_msg(id: Uuid, group_id: Uuid, sender_id: Uuid, content: &str) -> ServerMessage {
        ServerMessage {
            id,
            group_id,
            sender_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn send_appends_exactly_one_entry_before_any_io() {
        let group = Uuid::new_v4();
        let mut timeline = ChatTimeline::open(group, viewer());

        let draft = timeline.send("Hello");

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].delivery, DeliveryState::Pending);
        assert_eq!(timeline.entries()[0].id, EntryId::Local(draft.local_id));
        assert_eq!(draft.client_ref, "local-1");
    }

    #[test]
    fn confirm_replaces_in_place_without_duplicating() {
        let group = Uuid::new_v4();
        let me = viewer();
        let mut timeline = ChatTimeline::open(group, me.clone());

        let draft = timeline.send("Hello");
        let server_id = Uuid::new_v4();
        timeline
            .confirm_send(
                draft.local_id,
                server_msg(server_id, group, me.user_id, "Hello"),
            )
            .unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].id, EntryId::Server(server_id));
        assert_eq!(timeline.entries()[0].delivery, DeliveryState::Confirmed);
    }

    #[test]
    fn echo_after_confirm_is_discarded() {
        let group = Uuid::new_v4();
        let me = viewer();
        let mut timeline = ChatTimeline::open(group, me.clone());

        let draft = timeline.send("Hello");
        let server_id = Uuid::new_v4();
        timeline
            .confirm_send(
                draft.local_id,
                server_msg(server_id, group, me.user_id, "Hello"),
            )
            .unwrap();

        let appended = timeline.merge_event(server_msg(server_id, group, me.user_id, "Hello"));
        assert!(!appended);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn echo_racing_ahead_of_confirm_keeps_server_id_unique() {
        let group = Uuid::new_v4();
        let me = viewer();
        let mut timeline = ChatTimeline::open(group, me.clone());

        let draft = timeline.send("Hello");
        let server_id = Uuid::new_v4();

        // Realtime echo lands before the HTTP response.
        assert!(timeline.merge_event(server_msg(server_id, group, me.user_id, "Hello")));
        assert_eq!(timeline.len(), 2);

        // The confirmation drops the placeholder instead of replacing it.
        timeline
            .confirm_send(
                draft.local_id,
                server_msg(server_id, group, me.user_id, "Hello"),
            )
            .unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].id, EntryId::Server(server_id));
    }

    #[test]
    fn failed_send_is_retained_and_retryable() {
        let group = Uuid::new_v4();
        let mut timeline = ChatTimeline::open(group, viewer());

        let draft = timeline.send("Hello");
        timeline.fail_send(draft.local_id, "network down").unwrap();

        assert_eq!(timeline.len(), 1);
        assert!(matches!(
            timeline.entries()[0].delivery,
            DeliveryState::Failed { .. }
        ));

        let retried = timeline.retry(draft.local_id).unwrap();
        assert_eq!(retried.content, "Hello");
        assert_eq!(timeline.entries()[0].delivery, DeliveryState::Pending);
    }

    #[test]
    fn discard_only_applies_to_failed_entries() {
        let group = Uuid::new_v4();
        let mut timeline = ChatTimeline::open(group, viewer());

        let draft = timeline.send("Hello");
        assert!(matches!(
            timeline.discard(draft.local_id),
            Err(ClientError::NotFailed)
        ));

        timeline.fail_send(draft.local_id, "rejected").unwrap();
        timeline.discard(draft.local_id).unwrap();
        assert!(timeline.is_empty());
    }

    #[test]
    fn foreign_sender_gets_placeholder_name() {
        let group = Uuid::new_v4();
        let me = viewer();
        let mut timeline = ChatTimeline::open(group, me.clone());

        let other = Uuid::new_v4();
        timeline.merge_event(server_msg(Uuid::new_v4(), group, other, "hey"));
        assert_eq!(timeline.entries()[0].sender_name, SENDER_PLACEHOLDER);

        timeline.merge_event(server_msg(Uuid::new_v4(), group, me.user_id, "mine"));
        assert_eq!(timeline.entries()[1].sender_name, me.display_name);
    }

    #[test]
    fn late_events_append_at_tail_regardless_of_timestamp() {
        let group = Uuid::new_v4();
        let me = viewer();
        let mut timeline = ChatTimeline::open(group, me.clone());

        let newer = ServerMessage {
            created_at: Utc::now(),
            ..server_msg(Uuid::new_v4(), group, Uuid::new_v4(), "second")
        };
        let older = ServerMessage {
            created_at: Utc::now() - chrono::Duration::minutes(5),
            ..server_msg(Uuid::new_v4(), group, Uuid::new_v4(), "first")
        };

        timeline.merge_event(newer);
        timeline.merge_event(older);

        // Arrival order, not timestamp order.
        assert_eq!(timeline.entries()[0].content, "second");
        assert_eq!(timeline.entries()[1].content, "first");
    }

    #[test]
    fn events_for_other_groups_are_ignored() {
        let group = Uuid::new_v4();
        let mut timeline = ChatTimeline::open(group, viewer());

        let appended =
            timeline.merge_event(server_msg(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "x"));
        assert!(!appended);
        assert!(timeline.is_empty());
    }
}

//! End-to-end reconciliation scenarios for the chat timeline, exercising the
//! full send → confirm → realtime-echo cycle the way a shell drives it.

use chrono::Utc;
use client_core::{
    AppContext, ChatTimeline, DeliveryState, EntryId, Identity, ServerMessage, Surface,
};
use uuid::Uuid;

fn u1() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        display_name: "U1".into(),
    }
}

#[test]
fn send_confirm_echo_round_trip() {
    let g1 = Uuid::new_v4();
    let me = u1();
    let mut timeline = ChatTimeline::open(g1, me.clone());

    // Optimistic append: visible before any network response.
    let draft = timeline.send("Hello");
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.entries()[0].content, "Hello");
    assert_eq!(timeline.entries()[0].sender_id, me.user_id);
    assert_eq!(timeline.entries()[0].id, EntryId::Local(draft.local_id));

    // Server responds with the authoritative record.
    let m123 = Uuid::new_v4();
    timeline
        .confirm_send(
            draft.local_id,
            ServerMessage {
                id: m123,
                group_id: g1,
                sender_id: me.user_id,
                content: "Hello".into(),
                created_at: Utc::now(),
            },
        )
        .unwrap();

    // Replaced, not duplicated: one entry, carrying the server id, and no
    // entry with the temporary id remains.
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.entries()[0].id, EntryId::Server(m123));
    assert!(!timeline
        .entries()
        .iter()
        .any(|e| e.id == EntryId::Local(draft.local_id)));

    // The subscription replays our own message; the merge is a no-op.
    let echoed = timeline.merge_event(ServerMessage {
        id: m123,
        group_id: g1,
        sender_id: me.user_id,
        content: "Hello".into(),
        created_at: Utc::now(),
    });
    assert!(!echoed);
    assert_eq!(timeline.len(), 1);
}

#[test]
fn concurrent_sender_appends_while_own_send_is_pending() {
    let g1 = Uuid::new_v4();
    let me = u1();
    let mut timeline = ChatTimeline::open(g1, me.clone());

    let draft = timeline.send("mine");

    // Someone else's message arrives over the subscription mid-flight.
    let other = Uuid::new_v4();
    timeline.merge_event(ServerMessage {
        id: Uuid::new_v4(),
        group_id: g1,
        sender_id: other,
        content: "theirs".into(),
        created_at: Utc::now(),
    });

    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.entries()[0].content, "mine");
    assert_eq!(timeline.entries()[1].content, "theirs");

    // Our confirmation still replaces the pending entry in place, keeping
    // the original position.
    timeline
        .confirm_send(
            draft.local_id,
            ServerMessage {
                id: Uuid::new_v4(),
                group_id: g1,
                sender_id: me.user_id,
                content: "mine".into(),
                created_at: Utc::now(),
            },
        )
        .unwrap();
    assert_eq!(timeline.entries()[0].content, "mine");
    assert_eq!(timeline.entries()[0].delivery, DeliveryState::Confirmed);
}

#[test]
fn failed_send_survives_until_discarded() {
    let g1 = Uuid::new_v4();
    let mut timeline = ChatTimeline::open(g1, u1());

    let draft = timeline.send("Hello");
    timeline.fail_send(draft.local_id, "permission denied").unwrap();

    // Still visible, marked failed; the user decides what happens next.
    assert_eq!(timeline.len(), 1);
    match &timeline.entries()[0].delivery {
        DeliveryState::Failed { reason } => assert_eq!(reason, "permission denied"),
        other => panic!("expected failed delivery, got {other:?}"),
    }

    timeline.discard(draft.local_id).unwrap();
    assert!(timeline.is_empty());
}

#[test]
fn context_lifecycle_carries_selection_between_components() {
    let me = u1();
    let mut ctx = AppContext::start(me);
    assert!(ctx.active_union.is_none());

    ctx.set_surface(Surface::Dashboard);
    ctx.active_union = Some(client_core::UnionId::new("local-214"));

    // Components receive the context explicitly; a clone observes the same
    // selection without any global lookup.
    let view = ctx.clone();
    assert_eq!(view.active_union, ctx.active_union);

    ctx.sign_out();
}

use notification_service::models::HubEvent;
use notification_service::services::fan_out::{dedupe_tokens, payload_for};
use uuid::Uuid;

#[test]
fn sender_excluded_and_duplicates_removed() {
    // Tokens [t1(U1), t2(U2), t2(U2)] with U1 sending: only t2 remains.
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
fn tokens_shared_across_users_collapse() {
    // Two household members sharing a tablet register the same token.
    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();
    let pairs = vec![(u1, "shared".to_string()), (u2, "shared".to_string())];

    assert_eq!(dedupe_tokens(pairs, None).len(), 1);
}

#[test]
fn empty_recipient_set_produces_no_tokens() {
    assert!(dedupe_tokens(vec![], Some(Uuid::new_v4())).is_empty());
}

#[test]
fn message_payload_routes_to_group() {
    let group_id = Uuid::new_v4();
    let message_id = Uuid::new_v4();
    let event = HubEvent::Message {
        union_id: Uuid::new_v4(),
        group_id,
        message_id,
        sender_id: Uuid::new_v4(),
        preview: "strike vote tonight".into(),
    };

    let payload = payload_for(&event);
    assert_eq!(payload.title, "New message");
    assert_eq!(payload.data["group_id"], group_id.to_string());
    assert_eq!(payload.data["message_id"], message_id.to_string());
    assert_eq!(payload.data["url"], format!("/groups/{group_id}"));
}

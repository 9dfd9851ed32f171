use livemind::{
    ClientMetadata, CloseStatus, MemoryStore, NewSession, RecordedStatus, SessionStore, Speaker,
};

fn new_session(user_id: &str) -> NewSession {
    NewSession {
        user_id: user_id.to_string(),
        model_name: "test-model".to_string(),
        client: ClientMetadata {
            client_identifier: "client-1".to_string(),
            device_type: "Desktop".to_string(),
            screen_res: "1920x1080".to_string(),
            latitude: None,
            longitude: None,
        },
    }
}

#[tokio::test]
async fn created_session_is_active_and_open() {
    let store = MemoryStore::new();

    let id = store.create_session(new_session("user-1")).await.unwrap();
    let detail = store.session_detail(&id).await.unwrap().unwrap();

    assert_eq!(detail.session.status, RecordedStatus::Active);
    assert!(detail.session.ended_at.is_none());
    assert!(detail.session.duration_secs.is_none());
    assert!(detail.messages.is_empty());
}

#[tokio::test]
async fn messages_keep_append_order() {
    let store = MemoryStore::new();
    let id = store.create_session(new_session("user-1")).await.unwrap();

    store
        .append_message(&id, Speaker::User, "turn left")
        .await
        .unwrap();
    store
        .append_message(&id, Speaker::Model, "Turning left now.")
        .await
        .unwrap();

    let detail = store.session_detail(&id).await.unwrap().unwrap();
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.messages[0].sender, Speaker::User);
    assert_eq!(detail.messages[0].text, "turn left");
    assert_eq!(detail.messages[1].sender, Speaker::Model);
}

#[tokio::test]
async fn append_to_unknown_session_fails() {
    let store = MemoryStore::new();
    let result = store.append_message("nope", Speaker::User, "hi").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn first_close_wins() {
    let store = MemoryStore::new();
    let id = store.create_session(new_session("user-1")).await.unwrap();

    store
        .close_session(&id, CloseStatus::Error)
        .await
        .unwrap();
    // A racing fire-and-forget "completed" close must not overwrite it.
    store
        .close_session(&id, CloseStatus::Completed)
        .await
        .unwrap();

    let detail = store.session_detail(&id).await.unwrap().unwrap();
    assert_eq!(detail.session.status, RecordedStatus::Error);
    assert!(detail.session.ended_at.is_some());
    assert!(detail.session.duration_secs.is_some());
}

#[tokio::test]
async fn appends_after_close_are_accepted() {
    let store = MemoryStore::new();
    let id = store.create_session(new_session("user-1")).await.unwrap();

    store
        .close_session(&id, CloseStatus::Completed)
        .await
        .unwrap();

    // Fire-and-forget appends may lose the race with teardown.
    store
        .append_message(&id, Speaker::Model, "late entry")
        .await
        .unwrap();

    let detail = store.session_detail(&id).await.unwrap().unwrap();
    assert_eq!(detail.messages.len(), 1);
}

#[tokio::test]
async fn user_listing_is_most_recent_first() {
    let store = MemoryStore::new();

    let first = store.create_session(new_session("user-1")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = store.create_session(new_session("user-1")).await.unwrap();
    store.create_session(new_session("someone-else")).await.unwrap();

    store
        .append_message(&second, Speaker::User, "hello")
        .await
        .unwrap();

    let summaries = store.sessions_for_user("user-1").await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, second);
    assert_eq!(summaries[0].message_count, 1);
    assert_eq!(summaries[1].id, first);
    assert_eq!(summaries[1].message_count, 0);
}

#[tokio::test]
async fn unknown_session_detail_is_none() {
    let store = MemoryStore::new();
    assert!(store.session_detail("nope").await.unwrap().is_none());
}

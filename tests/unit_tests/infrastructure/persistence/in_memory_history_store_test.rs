use parley::application::ports::{HistoryStore, RepositoryError};
use parley::domain::{ConversationId, Message, MessageRole};
use parley::infrastructure::persistence::InMemoryHistoryStore;

#[tokio::test]
async fn given_empty_store_when_fetching_then_returns_no_messages() {
    let store = InMemoryHistoryStore::new();

    let recent = store.fetch_recent(ConversationId::new(1), 30).await.unwrap();

    assert!(recent.is_empty());
}

#[tokio::test]
async fn given_appended_batches_when_fetching_then_returns_newest_first() {
    let store = InMemoryHistoryStore::new();
    let conversation_id = ConversationId::new(7);
    store
        .append_batch(
            conversation_id,
            &[Message::user("first"), Message::assistant("second")],
        )
        .await
        .unwrap();
    store
        .append_batch(conversation_id, &[Message::user("third")])
        .await
        .unwrap();

    let recent = store.fetch_recent(conversation_id, 30).await.unwrap();

    let contents: Vec<&str> = recent.iter().map(Message::content).collect();
    assert_eq!(contents, vec!["third", "second", "first"]);
    assert_eq!(recent[1].role(), MessageRole::Assistant);
}

#[tokio::test]
async fn given_more_turns_than_limit_when_fetching_then_truncates_to_newest() {
    let store = InMemoryHistoryStore::new();
    let conversation_id = ConversationId::new(7);
    let batch: Vec<Message> = (0..5).map(|i| Message::user(format!("m{}", i))).collect();
    store.append_batch(conversation_id, &batch).await.unwrap();

    let recent = store.fetch_recent(conversation_id, 2).await.unwrap();

    let contents: Vec<&str> = recent.iter().map(Message::content).collect();
    assert_eq!(contents, vec!["m4", "m3"]);
}

#[tokio::test]
async fn given_two_conversations_when_fetching_then_histories_are_isolated() {
    let store = InMemoryHistoryStore::new();
    store
        .append_batch(ConversationId::new(1), &[Message::user("for one")])
        .await
        .unwrap();
    store
        .append_batch(ConversationId::new(2), &[Message::user("for two")])
        .await
        .unwrap();

    let recent = store.fetch_recent(ConversationId::new(2), 30).await.unwrap();

    assert_eq!(recent, vec![Message::user("for two")]);
}

#[tokio::test]
async fn given_blank_message_in_batch_when_appending_then_rejects_whole_batch() {
    let store = InMemoryHistoryStore::new();
    let conversation_id = ConversationId::new(3);

    let result = store
        .append_batch(conversation_id, &[Message::user("ok"), Message::assistant("  ")])
        .await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
    assert!(store.turns(conversation_id).await.is_empty());
}

#[tokio::test]
async fn given_appended_turns_when_listing_then_records_conversation_and_order() {
    let store = InMemoryHistoryStore::new();
    let conversation_id = ConversationId::new(9);
    store
        .append_batch(conversation_id, &[Message::user("q"), Message::assistant("a")])
        .await
        .unwrap();

    let turns = store.turns(conversation_id).await;

    assert_eq!(turns.len(), 2);
    assert!(turns.iter().all(|t| t.conversation_id == conversation_id));
    assert_eq!(turns[0].message, Message::user("q"));
    assert_ne!(turns[0].id, turns[1].id);
}

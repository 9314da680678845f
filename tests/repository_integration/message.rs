use crate::common::TestDb;
use crate::{new_thread, seed, text_from};
use chrono::{Duration, Utc};
use craft_market_backend::infrastructure::repositories::*;

#[tokio::test]
async fn messages_page_newest_first_and_advance_activity() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let seed = seed(db.pool()).await;
    let conversation_repo = ConversationRepositoryImpl::new(db.pool().clone());
    let repo = MessageRepositoryImpl::new(db.pool().clone());

    let (conversation, opening) = new_thread(&seed, "m0");
    conversation_repo
        .create_with_message(&conversation, &opening)
        .await
        .unwrap();

    let base = Utc::now();
    let mut last = None;
    for n in 1..=4 {
        let sender = if n % 2 == 0 {
            seed.customer.id
        } else {
            seed.artisan.id
        };
        let mut message = text_from(conversation.id, sender, &format!("m{n}"));
        message.created_at = base + Duration::seconds(n);
        last = Some(repo.append(&message).await.unwrap());
    }

    let (first_page, total) = repo
        .list_for_conversation(conversation.id, 2, 0)
        .await
        .unwrap();
    assert_eq!(total, 5);
    let contents: Vec<_> = first_page.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m4", "m3"]);

    let (last_page, _) = repo
        .list_for_conversation(conversation.id, 2, 4)
        .await
        .unwrap();
    assert_eq!(last_page.len(), 1);
    assert_eq!(last_page[0].content, "m0");

    let reloaded = conversation_repo
        .find_by_id(conversation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.last_message_id, last.map(|m| m.id));
}

#[tokio::test]
async fn unread_counts_exclude_own_messages_and_clear_on_read() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let seed = seed(db.pool()).await;
    let conversation_repo = ConversationRepositoryImpl::new(db.pool().clone());
    let repo = MessageRepositoryImpl::new(db.pool().clone());

    let (conversation, opening) = new_thread(&seed, "Hello");
    conversation_repo
        .create_with_message(&conversation, &opening)
        .await
        .unwrap();
    repo.append(&text_from(conversation.id, seed.customer.id, "Are you there?"))
        .await
        .unwrap();
    repo.append(&text_from(conversation.id, seed.artisan.id, "Yes"))
        .await
        .unwrap();

    assert_eq!(
        repo.count_unread_except(conversation.id, seed.artisan.id)
            .await
            .unwrap(),
        2
    );
    assert_eq!(repo.count_unread_for_user(seed.artisan.id).await.unwrap(), 2);
    assert_eq!(repo.count_unread_for_user(seed.customer.id).await.unwrap(), 1);

    let counts = repo
        .count_unread_by_conversation(seed.artisan.id, &[conversation.id])
        .await
        .unwrap();
    assert_eq!(counts.get(&conversation.id), Some(&2));

    let flipped = repo
        .mark_read_except(conversation.id, seed.artisan.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(flipped, 2);
    assert_eq!(repo.count_unread_for_user(seed.artisan.id).await.unwrap(), 0);
    assert_eq!(repo.count_unread_for_user(seed.customer.id).await.unwrap(), 1);

    let again = repo
        .mark_read_except(conversation.id, seed.artisan.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn mark_read_leaves_messages_newer_than_the_cutoff() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let seed = seed(db.pool()).await;
    let conversation_repo = ConversationRepositoryImpl::new(db.pool().clone());
    let repo = MessageRepositoryImpl::new(db.pool().clone());

    let (conversation, opening) = new_thread(&seed, "Hello");
    conversation_repo
        .create_with_message(&conversation, &opening)
        .await
        .unwrap();
    let cutoff = Utc::now() + Duration::seconds(1);
    let mut late = text_from(conversation.id, seed.customer.id, "Late arrival");
    late.created_at = cutoff + Duration::seconds(1);
    repo.append(&late).await.unwrap();

    let flipped = repo
        .mark_read_except(conversation.id, seed.artisan.id, cutoff)
        .await
        .unwrap();
    assert_eq!(flipped, 1);
    let stored = repo.find_by_id(late.id).await.unwrap().unwrap();
    assert!(!stored.is_read);
}

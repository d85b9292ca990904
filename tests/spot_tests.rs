use anyhow::Result;
use spotbot::db::{GroupId, MemberRecord, ScoreStore};
use spotbot::leaderboard::{leaderboard_reply, Board};
use spotbot::localization::LocalizationManager;
use spotbot::spot::{classify_post, process_spot, Classification, SpotEvent};
use teloxide::types::{MessageEntity, MessageEntityKind};
use tempfile::TempDir;

const GROUP: GroupId = -100_555;

fn setup() -> Result<(ScoreStore, LocalizationManager, TempDir)> {
    let dir = TempDir::new()?;
    let store = ScoreStore::new(dir.path().join("databases"));
    let messages = LocalizationManager::new()?;
    Ok((store, messages, dir))
}

fn mention(offset: usize, length: usize) -> MessageEntity {
    MessageEntity::new(MessageEntityKind::Mention, offset, length)
}

fn spot(sender: &str, mentions: &[&str]) -> SpotEvent {
    SpotEvent {
        group: GROUP,
        sender: sender.to_string(),
        mentions: mentions.iter().map(|m| m.to_string()).collect(),
    }
}

async fn member(store: &ScoreStore, identifier: &str) -> Result<Option<MemberRecord>> {
    let mut handle = store.ensure(GROUP).await?;
    let record = handle.member(identifier).await?;
    handle.close().await?;
    Ok(record)
}

#[tokio::test]
async fn test_spot_with_duplicate_mentions() -> Result<()> {
    let (store, messages, _dir) = setup()?;

    let caption = "(photo) @alice @bob @alice";
    let entities = [mention(8, 6), mention(15, 4), mention(20, 6)];
    let Classification::Spot(event) = classify_post(GROUP, "carol", true, Some(caption), &entities)
    else {
        panic!("Captioned photo with mentions should be a spot");
    };

    let reply = process_spot(&store, &messages, &event).await?;
    assert_eq!(reply, "carol has spotted alice, bob, alice");

    let carol = member(&store, "carol").await?.unwrap();
    let alice = member(&store, "alice").await?.unwrap();
    let bob = member(&store, "bob").await?.unwrap();
    assert_eq!((carol.spot_count, carol.caught_count), (3, 0));
    assert_eq!((alice.spot_count, alice.caught_count), (0, 2));
    assert_eq!((bob.spot_count, bob.caught_count), (0, 1));

    Ok(())
}

#[tokio::test]
async fn test_photo_without_mentions_leaves_no_trace() -> Result<()> {
    let (store, _messages, _dir) = setup()?;

    let entities = [MessageEntity::new(MessageEntityKind::Hashtag, 0, 4)];
    let classification = classify_post(GROUP, "carol", true, Some("#cat at the park"), &entities);

    assert_eq!(classification, Classification::NotQualified);
    assert!(!store.exists(GROUP).await?);

    Ok(())
}

#[tokio::test]
async fn test_self_mention_counts_both_ways() -> Result<()> {
    let (store, messages, _dir) = setup()?;

    process_spot(&store, &messages, &spot("carol", &["carol"])).await?;

    let carol = member(&store, "carol").await?.unwrap();
    assert_eq!((carol.spot_count, carol.caught_count), (1, 1));

    Ok(())
}

#[tokio::test]
async fn test_counts_accumulate_over_events() -> Result<()> {
    let (store, messages, _dir) = setup()?;

    process_spot(&store, &messages, &spot("carol", &["alice", "bob"])).await?;
    process_spot(&store, &messages, &spot("alice", &["carol"])).await?;
    process_spot(&store, &messages, &spot("carol", &["alice"])).await?;

    let carol = member(&store, "carol").await?.unwrap();
    let alice = member(&store, "alice").await?.unwrap();
    assert_eq!((carol.spot_count, carol.caught_count), (3, 1));
    assert_eq!((alice.spot_count, alice.caught_count), (1, 2));
    assert!(member(&store, "dave").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_leaderboards_are_sorted_and_stable() -> Result<()> {
    let (store, messages, _dir) = setup()?;

    process_spot(&store, &messages, &spot("carol", &["alice", "bob", "dave"])).await?;
    process_spot(&store, &messages, &spot("bob", &["alice"])).await?;
    process_spot(&store, &messages, &spot("alice", &["dave"])).await?;

    let mut handle = store.ensure(GROUP).await?;
    let by_spot = handle.leaderboard_by_spot().await?;
    let by_caught = handle.leaderboard_by_caught().await?;
    assert_eq!(by_spot, handle.leaderboard_by_spot().await?);
    assert_eq!(by_caught, handle.leaderboard_by_caught().await?);
    handle.close().await?;

    for board in [&by_spot, &by_caught] {
        assert!(board.windows(2).all(|pair| pair[0].count >= pair[1].count));
    }

    let spot_order: Vec<_> = by_spot.iter().map(|e| e.identifier.as_str()).collect();
    assert_eq!(spot_order, vec!["carol", "alice", "bob", "dave"]);

    let caught_order: Vec<_> = by_caught
        .iter()
        .map(|e| (e.identifier.as_str(), e.count))
        .collect();
    assert_eq!(
        caught_order,
        vec![("alice", 2), ("dave", 2), ("bob", 1), ("carol", 0)]
    );

    Ok(())
}

#[tokio::test]
async fn test_leaderboard_reply() -> Result<()> {
    let (store, messages, _dir) = setup()?;

    let empty = leaderboard_reply(&store, &messages, GROUP, Board::Spot).await?;
    assert_eq!(empty, "No spots have been made in your group yet.");
    // Asking for a leaderboard must not create the store
    assert!(!store.exists(GROUP).await?);

    process_spot(&store, &messages, &spot("carol", &["alice", "bob"])).await?;

    let spotboard = leaderboard_reply(&store, &messages, GROUP, Board::Spot).await?;
    assert_eq!(spotboard, "1) carol - 2\n2) alice - 0\n3) bob - 0\n");

    let caughtboard = leaderboard_reply(&store, &messages, GROUP, Board::Caught).await?;
    assert_eq!(caughtboard, "1) alice - 1\n2) bob - 1\n3) carol - 0\n");

    Ok(())
}

#[tokio::test]
async fn test_concurrent_spots_in_one_group_are_serialized() -> Result<()> {
    let (store, messages, _dir) = setup()?;
    let store = std::sync::Arc::new(store);
    let messages = std::sync::Arc::new(messages);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = std::sync::Arc::clone(&store);
        let messages = std::sync::Arc::clone(&messages);
        tasks.push(tokio::spawn(async move {
            process_spot(&store, &messages, &spot("carol", &["alice"])).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let carol = member(&store, "carol").await?.unwrap();
    let alice = member(&store, "alice").await?.unwrap();
    assert_eq!(carol.spot_count, 8);
    assert_eq!(alice.caught_count, 8);

    Ok(())
}

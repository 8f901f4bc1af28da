#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};
use engivia_core::{
    BroadcastFields, BroadcastId, BroadcastPatch, PostUser, User, UserId, normalize_embed_url,
};
use futures_util::StreamExt;

use db::live::watch_broadcast;
use db::repositories::{
    BroadcastRepository, EngiviaRepository, SessionRepository, UserRepository,
};
use db::DbError;

fn fields(title: &str, ymd: (i32, u32, u32)) -> BroadcastFields {
    BroadcastFields {
        title: title.to_string(),
        broad_casting_date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
    }
}

fn profile(id: &str, name: &str, is_admin: bool) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        image: format!("https://avatars.example.com/{id}.png"),
        is_admin,
    }
}

/// The global connection is bound to the runtime that opened it, so every
/// repository check runs inside this one test.
#[tokio::test]
async fn test_repositories() -> Result<(), Box<dyn Error>> {
    let _guard = common::setup_db().await?;

    check_broadcast_repository().await?;
    check_engivia_repository().await?;
    check_user_and_session_repositories().await?;
    check_watch_broadcast().await?;

    Ok(())
}

async fn check_broadcast_repository() -> Result<(), Box<dyn Error>> {
    common::reset_db().await?;

    // create/get
    let created = BroadcastRepository::create(&fields("第1回", (2024, 1, 1))).await?;
    assert_eq!(created.title, "第1回");
    assert_eq!(created.date_string(), "2024-01-01");
    assert!(created.broad_cast_url.is_none());

    let loaded = BroadcastRepository::get(&created.id).await?;
    assert_eq!(loaded, created);

    // partial update only writes the given fields
    let patch = BroadcastPatch {
        title: Some("第1回 改".to_string()),
        broad_casting_date: None,
    };
    let updated = BroadcastRepository::update(&created.id, &patch).await?;
    assert_eq!(updated.title, "第1回 改");
    assert_eq!(updated.date_string(), "2024-01-01");

    // updating a missing broadcast does not create it
    let ghost = BroadcastId::parse("ghost").unwrap();
    let missing = BroadcastRepository::update(&ghost, &patch).await;
    assert!(matches!(missing, Err(DbError::NotFound(_))));
    assert!(!BroadcastRepository::exists(&ghost).await?);

    // video url
    let url = normalize_embed_url("https://youtu.be/dQw4w9WgXcQ?t=90")?;
    let with_url = BroadcastRepository::set_youtube_url(&created.id, &url).await?;
    assert_eq!(
        with_url.broad_cast_url.as_ref().map(|u| u.as_str()),
        Some("https://www.youtube.com/embed/dQw4w9WgXcQ?start=90")
    );
    let missing = BroadcastRepository::set_youtube_url(&ghost, &url).await;
    assert!(matches!(missing, Err(DbError::NotFound(_))));

    // list is newest first
    BroadcastRepository::create(&fields("第2回", (2024, 2, 1))).await?;
    BroadcastRepository::create(&fields("第0回", (2023, 12, 1))).await?;
    let titles: Vec<String> = BroadcastRepository::list()
        .await?
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["第2回", "第1回 改", "第0回"]);

    // delete is idempotent
    BroadcastRepository::delete(&created.id).await?;
    BroadcastRepository::delete(&created.id).await?;
    let gone = BroadcastRepository::get(&created.id).await;
    assert!(matches!(gone, Err(DbError::NotFound(_))));

    Ok(())
}

async fn check_engivia_repository() -> Result<(), Box<dyn Error>> {
    common::reset_db().await?;

    let broadcast = BroadcastRepository::create(&fields("第3回", (2024, 3, 1))).await?;
    let other = BroadcastRepository::create(&fields("第4回", (2024, 4, 1))).await?;
    let author = PostUser {
        name: "alice".to_string(),
        image: "https://avatars.example.com/alice.png".to_string(),
    };

    let first = EngiviaRepository::create(&broadcast.id, "Rust は 2015 年に 1.0", &author).await?;
    let second = EngiviaRepository::create(&broadcast.id, "Ferris はカニ", &author).await?;
    EngiviaRepository::create(&other.id, "別の放送", &author).await?;

    assert_eq!(first.broadcast_id, broadcast.id);
    assert_eq!(first.engivia_number, None);
    assert_eq!(first.post_user, author);

    let listed = EngiviaRepository::list_for_broadcast(&broadcast.id).await?;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|e| e.broadcast_id == broadcast.id));

    // numbered items come first
    let numbered = EngiviaRepository::set_number(&second.id, 1).await?;
    assert_eq!(numbered.heading().as_deref(), Some("エンジビア1"));
    let listed = EngiviaRepository::list_for_broadcast(&broadcast.id).await?;
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    // deleting a broadcast takes its engivias with it, and only those
    BroadcastRepository::delete(&broadcast.id).await?;
    assert!(!BroadcastRepository::exists(&broadcast.id).await?);
    assert!(EngiviaRepository::list_for_broadcast(&broadcast.id).await?.is_empty());
    assert!(BroadcastRepository::exists(&other.id).await?);
    assert_eq!(EngiviaRepository::list_for_broadcast(&other.id).await?.len(), 1);

    // and is idempotent
    BroadcastRepository::delete(&broadcast.id).await?;

    Ok(())
}

async fn check_user_and_session_repositories() -> Result<(), Box<dyn Error>> {
    common::reset_db().await?;

    // first sign-in stores the provider profile
    let user = UserRepository::upsert_from_profile(&profile("U100", "slack-alice", false)).await?;
    assert_eq!(user.name, "slack-alice");
    assert!(!user.is_admin);

    // a renamed user keeps the new name across sign-ins
    let renamed = UserRepository::update_name(&user.id, "alice").await?;
    assert_eq!(renamed.name, "alice");
    let again = UserRepository::upsert_from_profile(&profile("U100", "slack-alice", true)).await?;
    assert_eq!(again.name, "alice");
    assert!(again.is_admin);

    let missing = UserRepository::update_name(&UserId::new("nobody"), "x").await;
    assert!(matches!(missing, Err(DbError::NotFound(_))));

    // sessions resolve to the current profile
    let session = SessionRepository::create(&user.id, Duration::hours(1)).await?;
    assert_eq!(session.user.name, "alice");
    UserRepository::update_name(&user.id, "alice2").await?;
    let resolved = SessionRepository::resolve(&session.token).await?.unwrap();
    assert_eq!(resolved.user.name, "alice2");
    assert_eq!(resolved.token, session.token);

    // expired sessions do not resolve
    let stale = SessionRepository::create(&user.id, Duration::hours(-1)).await?;
    assert!(SessionRepository::resolve(&stale.token).await?.is_none());

    SessionRepository::delete(&session.token).await?;
    assert!(SessionRepository::resolve(&session.token).await?.is_none());
    assert!(SessionRepository::resolve("unknown-token").await?.is_none());

    SessionRepository::purge_expired().await?;

    Ok(())
}

async fn check_watch_broadcast() -> Result<(), Box<dyn Error>> {
    common::reset_db().await?;
    let timeout = StdDuration::from_secs(5);

    let broadcast = BroadcastRepository::create(&fields("第5回", (2024, 5, 1))).await?;
    let mut updates = watch_broadcast(&broadcast.id).await?;

    // current state first
    let initial = tokio::time::timeout(timeout, updates.next()).await?.unwrap()?;
    assert_eq!(initial.as_ref().map(|b| b.title.as_str()), Some("第5回"));

    let url = normalize_embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")?;
    BroadcastRepository::set_youtube_url(&broadcast.id, &url).await?;
    let changed = tokio::time::timeout(timeout, updates.next()).await?.unwrap()?;
    assert_eq!(changed.and_then(|b| b.broad_cast_url), Some(url));

    BroadcastRepository::delete(&broadcast.id).await?;
    let deleted = tokio::time::timeout(timeout, updates.next()).await?.unwrap()?;
    assert!(deleted.is_none());

    // watching an absent broadcast starts with None
    let ghost = BroadcastId::parse("never-created").unwrap();
    let mut updates = watch_broadcast(&ghost).await?;
    let initial = tokio::time::timeout(timeout, updates.next()).await?.unwrap()?;
    assert!(initial.is_none());

    Ok(())
}

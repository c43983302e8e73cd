use chrono::Duration;
use intake_core::model::{FollowupAnswer, Response, ResponseKey};
use intake_core::time::fixed_now;
use storage::repository::{ResponseRepository, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_preserves_followups_and_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let followups = vec![
        FollowupAnswer::new("Which database?", "PostgreSQL"),
        FollowupAnswer::new("Which version?", "15"),
    ];
    let combined = Response::new(
        "SQL\n\nAdditional Details:\nWhich database?: PostgreSQL\nWhich version?: 15",
        followups.clone(),
        fixed_now(),
    );

    repo.save_response(&ResponseKey::new("Company", 1), &combined)
        .await
        .unwrap();
    repo.save_response(&ResponseKey::new("Company", 0), &Response::skipped(fixed_now()))
        .await
        .unwrap();

    let loaded = repo.load_responses().await.expect("load");
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].0, ResponseKey::new("Company", 0));
    assert_eq!(loaded[1].0, ResponseKey::new("Company", 1));
    assert_eq!(loaded[1].1.followups(), followups.as_slice());
    assert_eq!(loaded[1].1.answered_at(), fixed_now());
}

#[tokio::test]
async fn sqlite_upsert_overwrites_whole_response() {
    let storage = Storage::sqlite("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    let key = ResponseKey::new("Security", 0);

    storage
        .responses
        .save_response(&key, &Response::new("Admins", Vec::new(), fixed_now()))
        .await
        .unwrap();
    let later = fixed_now() + Duration::hours(1);
    storage
        .responses
        .save_response(&key, &Response::new("Admins and auditors", Vec::new(), later))
        .await
        .unwrap();

    let loaded = storage.responses.load_responses().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].1.answer(), "Admins and auditors");
    assert_eq!(loaded[0].1.answered_at(), later);
}

#[tokio::test]
async fn sqlite_clear_and_remigrate() {
    let url = "sqlite:file:memdb_clear?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrations are idempotent");

    repo.save_response(&ResponseKey::new("Company", 0), &Response::skipped(fixed_now()))
        .await
        .unwrap();
    repo.clear().await.unwrap();
    assert!(repo.load_responses().await.unwrap().is_empty());
}

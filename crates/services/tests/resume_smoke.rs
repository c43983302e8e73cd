use std::sync::Arc;

use async_trait::async_trait;
use intake_core::model::{QuestionBank, Response, ResponseKey, Section};
use intake_core::time::{fixed_clock, fixed_now};
use services::{AlwaysAdequate, QuestionnaireService, ScreenKind, SessionError};
use storage::repository::{InMemoryRepository, ResponseRepository, StorageError};

/// Saves and loads normally but refuses to delete anything.
#[derive(Clone, Default)]
struct UndeletableRepository {
    inner: InMemoryRepository,
}

#[async_trait]
impl ResponseRepository for UndeletableRepository {
    async fn save_response(
        &self,
        key: &ResponseKey,
        response: &Response,
    ) -> Result<(), StorageError> {
        self.inner.save_response(key, response).await
    }

    async fn load_responses(&self) -> Result<Vec<(ResponseKey, Response)>, StorageError> {
        self.inner.load_responses().await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
}

fn bank() -> Arc<QuestionBank> {
    let entry = |t: &str| (t.to_owned(), None, None);
    Arc::new(QuestionBank::new(vec![
        Section::new("Company", vec![entry("a?"), entry("b?")]),
        Section::new("Security", vec![entry("c?")]),
    ]))
}

fn service(repo: &InMemoryRepository) -> QuestionnaireService {
    QuestionnaireService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(AlwaysAdequate),
    )
}

#[tokio::test]
async fn committed_answers_survive_a_resume() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);

    let mut session = svc.resume(bank()).await.unwrap();
    session.start_section("Company").unwrap();
    let outcome = session.submit("We sell pumps").await.unwrap();
    svc.persist(&session, &outcome).await.unwrap();

    let mut resumed = svc.resume(bank()).await.unwrap();
    assert_eq!(resumed.store(), session.store());
    resumed.start_section("Company").unwrap();
    assert_eq!(resumed.state().active_index(), 1);
}

#[tokio::test]
async fn resume_ignores_responses_for_unknown_questions() {
    let repo = InMemoryRepository::new();
    repo.save_response(&ResponseKey::new("Payroll", 0), &Response::skipped(fixed_now()))
        .await
        .unwrap();
    repo.save_response(&ResponseKey::new("Company", 9), &Response::skipped(fixed_now()))
        .await
        .unwrap();
    repo.save_response(&ResponseKey::new("Security", 0), &Response::skipped(fixed_now()))
        .await
        .unwrap();

    let session = service(&repo).resume(bank()).await.unwrap();

    assert_eq!(session.store().len(), 1);
    assert!(session.store().is_answered("Security", 0));
}

#[tokio::test]
async fn persist_without_commit_writes_nothing() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let mut session = svc.resume(bank()).await.unwrap();

    let outcome = session.start_section("Company").unwrap();
    svc.persist(&session, &outcome).await.unwrap();

    assert!(repo.load_responses().await.unwrap().is_empty());
}

#[tokio::test]
async fn restart_clears_the_repository() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let mut session = svc.resume(bank()).await.unwrap();
    session.start_section("Security").unwrap();
    let outcome = session.skip().unwrap();
    svc.persist(&session, &outcome).await.unwrap();

    svc.restart(&mut session).await.unwrap();

    assert!(session.store().is_empty());
    assert!(repo.load_responses().await.unwrap().is_empty());
    assert_eq!(session.screen_kind(), ScreenKind::SectionSelection);
}

#[tokio::test]
async fn export_writes_every_question() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let mut session = svc.resume(bank()).await.unwrap();
    session.start_section("Company").unwrap();
    session.submit("We sell pumps").await.unwrap();

    let path = svc.export(&session, dir.path()).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["total_questions"], 3);
    let company = &value["questionnaire_responses"]["Company"];
    assert_eq!(company[0]["answer"], "We sell pumps");
    assert_eq!(company[0]["category"], "Company");
    assert_eq!(company[0]["followup_clarifications"], serde_json::json!([]));
    assert_eq!(company[1]["answer"], "Not answered");
    assert!(company[1].get("timestamp").is_none());
}

#[tokio::test]
async fn failed_restart_keeps_session_and_repository_in_step() {
    let repo = UndeletableRepository::default();
    let svc = QuestionnaireService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(AlwaysAdequate),
    );
    let mut session = svc.resume(bank()).await.unwrap();
    session.start_section("Company").unwrap();
    let outcome = session.submit("We sell pumps").await.unwrap();
    svc.persist(&session, &outcome).await.unwrap();

    let err = svc.restart(&mut session).await.unwrap_err();

    assert!(matches!(err, SessionError::Storage(_)));
    assert_eq!(session.store().len(), 1);
    assert_eq!(session.state().active_section(), Some("Company"));
    let resumed = svc.resume(bank()).await.unwrap();
    assert_eq!(resumed.store(), session.store());
}

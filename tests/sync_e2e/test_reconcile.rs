//! E2E tests: `/fetch` reconciliation.

use super::mock_upstream::{MockUpstream, gist_json};
use super::test_helpers::*;

/// (1) Only gists without an activity are created; a rerun creates nothing.
#[actix_rt::test]
async fn test_fetch_creates_unseen_gists_once() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let person_id = register_user(&app, "alice").await;
    mock.add_activity(person_id, "old snippet", "g1", true);
    mock.set_gists(
        "alice",
        vec![
            gist_json("alice", "g1", Some("old snippet")),
            gist_json("alice", "g2", Some("new snippet")),
        ],
    );

    let (status, body) = get_text(&app, "/fetch").await;
    assert_eq!(status, 200, "Fetch should succeed: {}", body);
    assert_eq!(body, "1");

    let activities = mock.activities_for(person_id);
    assert_eq!(activities.len(), 2);
    let created = activities
        .iter()
        .find(|a| a.note.as_deref() == Some("g2"))
        .expect("activity for g2");
    assert_eq!(created.subject, "new snippet");
    assert!(!created.done);
    assert_eq!(created.deal_id, Some(mock.deals()[0].id));

    let (status, body) = get_text(&app, "/fetch").await;
    assert_eq!(status, 200);
    assert_eq!(body, "0");
    assert_eq!(mock.activities_for(person_id).len(), 2);
}

/// (2) A blank description falls back to the gist id as subject.
#[actix_rt::test]
async fn test_fetch_blank_description_uses_id() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let person_id = register_user(&app, "alice").await;
    mock.set_gists("alice", vec![gist_json("alice", "abc123", None)]);

    let (_, body) = get_text(&app, "/fetch").await;
    assert_eq!(body, "1");
    assert_eq!(mock.activities_for(person_id)[0].subject, "abc123");
}

/// (3) With nobody tracked, fetch reports zero without calling GitHub.
#[actix_rt::test]
async fn test_fetch_with_empty_roster() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let (status, body) = get_text(&app, "/fetch").await;

    assert_eq!(status, 200);
    assert_eq!(body, "0");
    assert!(mock.gist_since().is_empty());
}

/// (4) One user's GitHub failure keeps the other user's activities.
#[actix_rt::test]
async fn test_fetch_partial_failure_reports_and_keeps_work() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let alice = register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    mock.set_gists("alice", vec![gist_json("alice", "a1", Some("alice gist"))]);
    mock.fail_gists_for("bob");

    let (status, body) = get_json(&app, "/fetch").await;

    assert_eq!(status, 500, "Partial failure should be reported: {}", body);
    assert_eq!(body["error"], "PARTIAL_FAILURE");
    assert_eq!(body["report"]["created"], 1);
    let failures = body["report"]["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["username"], "bob");
    assert_eq!(failures[0]["stage"], "fetch_gists");

    assert_eq!(mock.activities_for(alice).len(), 1);
}

/// (5) `since` is forwarded to GitHub in RFC 3339 form.
#[actix_rt::test]
async fn test_fetch_forwards_since() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;
    register_user(&app, "alice").await;

    let (status, _) = get_text(&app, "/fetch?since=2024-01-01T00:00:00Z").await;

    assert_eq!(status, 200);
    assert_eq!(mock.gist_since(), vec!["2024-01-01T00:00:00Z".to_string()]);
}

/// (6) A malformed `since` is rejected before any upstream call.
#[actix_rt::test]
async fn test_fetch_rejects_bad_since() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let (status, body) = get_json(&app, "/fetch?since=yesterday").await;

    assert_eq!(status, 400, "Bad since should be rejected: {}", body);
    assert_eq!(body["error"], "INVALID_INPUT");
}

//! E2E tests: registration and roster listing.

use super::mock_upstream::MockUpstream;
use super::test_helpers::*;

/// (1) Registering a user creates the sentinel org, a person and a deal.
#[actix_rt::test]
async fn test_register_then_list() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let (status, body) = get_json(&app, "/list").await;
    assert_eq!(status, 200, "Empty list should succeed: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], serde_json::json!([]));

    let person_id = register_user(&app, "alice").await;

    let orgs = mock.organizations();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].1, "gist-sync");
    let deals = mock.deals();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].title, "alice gists");
    assert_eq!(deals[0].person_id, Some(person_id));
    assert_eq!(deals[0].org_id, Some(orgs[0].0));

    let (status, body) = get_json(&app, "/list").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], serde_json::json!(["alice"]));
}

/// (2) A second registration reuses the sentinel org.
#[actix_rt::test]
async fn test_register_reuses_tracking_org() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    register_user(&app, "alice").await;
    register_user(&app, "bob").await;

    assert_eq!(mock.organizations().len(), 1);
    let (_, body) = get_json(&app, "/list").await;
    assert_eq!(body["data"], serde_json::json!(["alice", "bob"]));
}

/// (2b) An org whose name differs only in case is not reused as the sentinel.
#[actix_rt::test]
async fn test_register_with_lookalike_org() {
    let mock = MockUpstream::start().await;
    let lookalike = mock.add_organization("Gist-Sync");
    let app = create_test_app(&mock).await;

    register_user(&app, "alice").await;

    let deals = mock.deals();
    assert_eq!(deals.len(), 1);
    assert_ne!(deals[0].org_id, Some(lookalike));

    let (status, body) = get_json(&app, "/list").await;
    assert_eq!(status, 200, "List should succeed: {}", body);
    assert_eq!(body["data"], serde_json::json!(["alice"]));
}

/// (3) Registering an existing user is rejected with ALREADY_TRACKED.
#[actix_rt::test]
async fn test_register_twice_fails() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    register_user(&app, "alice").await;
    let (status, body) = get_json(&app, "/new?user=alice").await;

    assert_eq!(status, 500, "Duplicate registration should fail: {}", body);
    assert_eq!(body["error"], "ALREADY_TRACKED");
    assert_eq!(mock.deals().len(), 1);
}

/// (4) An ambiguous person search still registers a fresh person.
#[actix_rt::test]
async fn test_register_with_ambiguous_name() {
    let mock = MockUpstream::start().await;
    mock.add_person("carol");
    mock.add_person("carol");
    let app = create_test_app(&mock).await;

    let (status, body) = get_json(&app, "/new?user=carol").await;

    assert_eq!(status, 200, "Ambiguous name should register: {}", body);
    assert_eq!(body["data"]["username"], "carol");
    assert_eq!(mock.deals().len(), 1);
}

/// (5) Missing or blank `user` is a client error.
#[actix_rt::test]
async fn test_register_requires_user() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    let (status, body) = get_json(&app, "/new").await;
    assert_eq!(status, 400, "Missing user should be rejected: {}", body);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, _) = get_json(&app, "/new?user=%20%20").await;
    assert_eq!(status, 400);
    assert!(mock.deals().is_empty());
}

/// (6) A rejected CRM token surfaces as UPSTREAM_UNAVAILABLE.
#[actix_rt::test]
async fn test_list_with_bad_token() {
    let mock = MockUpstream::start().await;
    let app = create_test_app_with_token(&mock, "wrong-token").await;

    let (status, body) = get_json(&app, "/list").await;

    assert_eq!(status, 500, "Bad token should fail: {}", body);
    assert_eq!(body["error"], "UPSTREAM_UNAVAILABLE");
}

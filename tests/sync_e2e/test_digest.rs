//! E2E tests: `/updates` digest and its `/show` alias.

use super::mock_upstream::{MockUpstream, gist_json};
use super::test_helpers::*;

/// (1) Unseen activities render in order and are marked done.
#[actix_rt::test]
async fn test_updates_renders_and_marks_done() {
    let mock = MockUpstream::start().await;
    let person_id = mock.add_person("alice");
    let first = mock.add_activity(person_id, "a", "x", false);
    let second = mock.add_activity(person_id, "b", "y", false);
    let app = create_test_app(&mock).await;

    let (status, html) = get_text(&app, "/updates?user=alice").await;

    assert_eq!(status, 200, "Digest should render: {}", html);
    let x = html
        .find(r#"<script src="https://gist.github.com/alice/x.js">"#)
        .expect("script for x");
    let y = html
        .find(r#"<script src="https://gist.github.com/alice/y.js">"#)
        .expect("script for y");
    assert!(x < y);
    assert!(mock.activity(first).done);
    assert!(mock.activity(second).done);

    let (status, html) = get_text(&app, "/updates?user=alice").await;
    assert_eq!(status, 200);
    assert!(html.contains("No new gists."));
    assert!(!html.contains("<script"));
}

/// (2) `/show` serves the same digest.
#[actix_rt::test]
async fn test_show_alias() {
    let mock = MockUpstream::start().await;
    let person_id = mock.add_person("alice");
    mock.add_activity(person_id, "a", "x", false);
    let app = create_test_app(&mock).await;

    let (status, html) = get_text(&app, "/show?user=alice").await;

    assert_eq!(status, 200);
    assert!(html.contains("<h2>a</h2>"));
}

/// (3) Unknown and ambiguous users return a plain-text 500.
#[actix_rt::test]
async fn test_updates_unresolvable_user() {
    let mock = MockUpstream::start().await;
    mock.add_person("dup");
    mock.add_person("dup");
    let app = create_test_app(&mock).await;

    let (status, body) = get_text(&app, "/updates?user=ghost").await;
    assert_eq!(status, 500);
    assert_eq!(body, "User 'ghost' not found");

    let (status, body) = get_text(&app, "/updates?user=dup").await;
    assert_eq!(status, 500);
    assert!(body.contains("ambiguous"), "Unexpected body: {}", body);
}

/// (4) Register, fetch and read the digest end to end.
#[actix_rt::test]
async fn test_full_sync_flow() {
    let mock = MockUpstream::start().await;
    let app = create_test_app(&mock).await;

    register_user(&app, "alice").await;
    mock.set_gists("alice", vec![gist_json("alice", "g9", Some("<b>bold</b> idea"))]);

    let (_, created) = get_text(&app, "/fetch").await;
    assert_eq!(created, "1");

    let (status, html) = get_text(&app, "/updates?user=alice").await;
    assert_eq!(status, 200);
    assert!(html.contains("&lt;b&gt;bold&lt;&#x2F;b&gt; idea"), "Subject should be escaped: {}", html);
    assert!(html.contains("https://gist.github.com/alice/g9.js"));

    let (_, html) = get_text(&app, "/updates?user=alice").await;
    assert!(html.contains("No new gists."));
}

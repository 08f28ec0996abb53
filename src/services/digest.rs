//! Per-user HTML digest of unseen gist activities.
//!
//! Rendering is a side-effecting read: every activity shown is marked done,
//! so a second request without a sync in between renders an empty page.
//! Concurrent requests for the same user are not coordinated.

use futures_util::future::join_all;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::{info, warn};

use crate::config::SyncSettings;
use crate::error::{AppError, AppResult};
use crate::models::{Activity, ActivityId, PersonId};
use crate::services::crm::CrmApi;

const DIGEST_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Gist updates for {{ username }}</title>
</head>
<body>
<h1>Gist updates for {{ username }}</h1>
{% if entries | length == 0 %}<p>No new gists.</p>
{% endif %}{% for entry in entries %}<section class="gist">
<h2>{{ entry.subject }}</h2>
{% if entry.script_url %}<script src="{{ entry.script_url | safe }}"></script>
{% endif %}</section>
{% endfor %}</body>
</html>
"#;

/// A rendered digest.
#[derive(Debug)]
pub struct Digest {
    pub username: String,
    pub html: String,
    /// Activities rendered, in CRM order
    pub shown: Vec<ActivityId>,
    /// Shown activities the CRM failed to mark done; they will show again
    pub unmarked: Vec<ActivityId>,
}

#[derive(Serialize)]
struct Entry {
    subject: String,
    script_url: Option<String>,
}

/// Render `username`'s unseen activities and mark them seen.
pub async fn render_digest(
    crm: &dyn CrmApi,
    settings: &SyncSettings,
    username: &str,
) -> AppResult<Digest> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput(
            "'user' must not be empty".to_string(),
        ));
    }

    let person_id = resolve_person(crm, username).await?;
    let unseen = crm.person_activities(person_id, Some(false)).await?;
    let html = render_page(username, &unseen, &settings.gist_embed_url)?;

    let marks = join_all(unseen.iter().map(|activity| async move {
        (activity.id, crm.set_activity_done(activity.id, true).await)
    }))
    .await;

    let mut unmarked = Vec::new();
    for (id, outcome) in marks {
        if let Err(e) = outcome {
            warn!(username, activity_id = %id, "Failed to mark activity seen: {}", e);
            unmarked.push(id);
        }
    }

    info!(
        username,
        shown = unseen.len(),
        unmarked = unmarked.len(),
        "Digest rendered"
    );

    Ok(Digest {
        username: username.to_string(),
        html,
        shown: unseen.iter().map(|a| a.id).collect(),
        unmarked,
    })
}

/// Resolve a display name to exactly one CRM person.
async fn resolve_person(crm: &dyn CrmApi, username: &str) -> AppResult<PersonId> {
    let mut matches = crm.search_persons(username).await?;
    match matches.len() {
        0 => Err(AppError::UserNotFound(username.to_string())),
        1 => Ok(matches.remove(0).id),
        n => Err(AppError::AmbiguousUser(username.to_string(), n)),
    }
}

/// Embed script URL for one gist. Path segments are percent-encoded, so the
/// result is safe to place in an attribute unescaped.
fn script_url(embed_base: &str, username: &str, gist_id: &str) -> String {
    format!(
        "{}/{}/{}.js",
        embed_base.trim_end_matches('/'),
        urlencoding::encode(username),
        urlencoding::encode(gist_id)
    )
}

fn render_page(username: &str, activities: &[Activity], embed_base: &str) -> AppResult<String> {
    let entries: Vec<Entry> = activities
        .iter()
        .map(|activity| Entry {
            subject: activity.subject.clone(),
            script_url: activity
                .gist_id()
                .map(|gist_id| script_url(embed_base, username, gist_id)),
        })
        .collect();

    let mut context = Context::new();
    context.insert("username", username);
    context.insert("entries", &entries);
    Ok(Tera::one_off(DIGEST_TEMPLATE, &context, true)?)
}

//! Gist → activity reconciliation.
//!
//! The CRM is the only memory: a tracked user's existing activity notes are the
//! gist ids already synchronized. A run diffs each user's current gists against
//! that set and creates one unseen activity per new gist.
//!
//! Sub-requests within a stage run concurrently and every outcome is collected,
//! so one failing user or write never discards the work done for the others.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::config::SyncSettings;
use crate::error::AppResult;
use crate::models::{
    Gist, NewActivity, PersonId, ReconcileReport, Roster, SyncFailure, SyncStage, TrackedUser,
};
use crate::services::crm::CrmApi;
use crate::services::gists::GistSource;

/// Run one reconciliation pass over every tracked user.
///
/// Fails only when the roster itself cannot be read; per-user and per-gist
/// failures are returned in the report.
pub async fn reconcile(
    crm: &dyn CrmApi,
    gists: &dyn GistSource,
    settings: &SyncSettings,
    since: Option<DateTime<Utc>>,
) -> AppResult<ReconcileReport> {
    let deals = crm.list_deals().await?;
    let roster = Roster::from_deals(&deals, &settings.tracking_org);
    info!(tracked = roster.len(), since = ?since, "Reconciliation started");

    let mut report = ReconcileReport::default();
    if roster.is_empty() {
        return Ok(report);
    }

    let mut seen = load_seen_gists(crm, &roster, &mut report).await;

    // Users whose memo could not be loaded are skipped: without it every gist
    // would look new.
    let pending: Vec<&TrackedUser> = roster
        .iter()
        .filter(|u| seen.contains_key(u.username.as_str()))
        .collect();

    let fetched = join_all(pending.into_iter().map(|user| async move {
        (user, gists.user_gists(&user.username, since).await)
    }))
    .await;

    let mut queued: Vec<(&str, NewActivity)> = Vec::new();
    for (user, outcome) in fetched {
        match outcome {
            Ok(user_gists) => {
                for gist in &user_gists {
                    if let Some(new) = queue_gist(&roster, &mut seen, user, gist) {
                        queued.push(new);
                    }
                }
            }
            Err(e) => {
                warn!(username = %user.username, "Gist fetch failed: {}", e);
                report.failures.push(SyncFailure {
                    username: user.username.clone(),
                    stage: SyncStage::FetchGists,
                    gist_id: None,
                    message: e.to_string(),
                });
            }
        }
    }

    let created = join_all(queued.iter().map(|(username, activity)| async move {
        (*username, activity, crm.add_activity(activity).await)
    }))
    .await;

    for (username, activity, outcome) in created {
        match outcome {
            Ok(saved) => {
                debug!(username, gist_id = %activity.note, activity_id = %saved.id, "Activity created");
                report.created += 1;
            }
            Err(e) => {
                warn!(username, gist_id = %activity.note, "Activity creation failed: {}", e);
                report.failures.push(SyncFailure {
                    username: username.to_string(),
                    stage: SyncStage::CreateActivity,
                    gist_id: Some(activity.note.clone()),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        created = report.created,
        failed = report.failures.len(),
        "Reconciliation finished"
    );
    Ok(report)
}

/// Build the per-username set of already-synchronized gist ids.
///
/// Activities are read once per distinct person. A user whose lookup fails is
/// absent from the returned map and recorded in `report`.
async fn load_seen_gists<'r>(
    crm: &dyn CrmApi,
    roster: &'r Roster,
    report: &mut ReconcileReport,
) -> HashMap<&'r str, HashSet<String>> {
    let lookups = join_all(roster.person_ids().into_iter().map(|person_id| async move {
        (person_id, crm.person_activities(person_id, None).await)
    }))
    .await;

    let mut notes: HashMap<PersonId, HashSet<String>> = HashMap::new();
    let mut errors: HashMap<PersonId, String> = HashMap::new();
    for (person_id, outcome) in lookups {
        match outcome {
            Ok(activities) => {
                let ids = activities
                    .iter()
                    .filter_map(|a| a.gist_id())
                    .map(str::to_string)
                    .collect();
                notes.insert(person_id, ids);
            }
            Err(e) => {
                warn!(%person_id, "Activity lookup failed: {}", e);
                errors.insert(person_id, e.to_string());
            }
        }
    }

    let mut seen = HashMap::new();
    for user in roster.iter() {
        if let Some(message) = errors.get(&user.person_id) {
            report.failures.push(SyncFailure {
                username: user.username.clone(),
                stage: SyncStage::LoadActivities,
                gist_id: None,
                message: message.clone(),
            });
            continue;
        }
        let memo = notes.get(&user.person_id).cloned().unwrap_or_default();
        seen.insert(user.username.as_str(), memo);
    }
    seen
}

/// Decide whether `gist` needs an activity, recording it in the memo if so.
fn queue_gist<'r>(
    roster: &'r Roster,
    seen: &mut HashMap<&'r str, HashSet<String>>,
    fetched_for: &'r TrackedUser,
    gist: &Gist,
) -> Option<(&'r str, NewActivity)> {
    let owner = match gist.owner_login() {
        Some(login) => match roster.find_login(login) {
            Some(user) => user,
            None => {
                debug!(login, gist_id = %gist.id, "Gist owner is not tracked, ignoring");
                return None;
            }
        },
        None => fetched_for,
    };

    let memo = seen.get_mut(owner.username.as_str())?;
    if !memo.insert(gist.id.clone()) {
        return None;
    }

    Some((
        owner.username.as_str(),
        NewActivity {
            subject: gist.subject().to_string(),
            note: gist.id.clone(),
            done: false,
            deal_id: owner.deal_id,
            person_id: owner.person_id,
        },
    ))
}

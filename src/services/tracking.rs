//! Tracking registration and roster listing.
//!
//! A username is tracked when a CRM deal linked to a person of that name sits
//! under the sentinel organization.

use tracing::{debug, info};

use crate::config::SyncSettings;
use crate::error::{AppError, AppResult};
use crate::models::{NewDeal, NewOrganization, NewPerson, OrganizationId, Roster, TrackedUser};
use crate::services::crm::CrmApi;

/// Usernames of every tracked user, sorted.
pub async fn list_tracked(crm: &dyn CrmApi, settings: &SyncSettings) -> AppResult<Vec<String>> {
    let deals = crm.list_deals().await?;
    Ok(Roster::from_deals(&deals, &settings.tracking_org).usernames())
}

/// Register `username` for gist synchronization.
///
/// A single existing person with that name means the user is already tracked.
/// No match, or an ambiguous search, creates a fresh person and tracking deal.
/// Steps are not rolled back if a later one fails.
pub async fn register(
    crm: &dyn CrmApi,
    settings: &SyncSettings,
    username: &str,
) -> AppResult<TrackedUser> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput(
            "'user' must not be empty".to_string(),
        ));
    }

    let matches = crm.search_persons(username).await?;
    if matches.len() == 1 {
        return Err(AppError::AlreadyTracked(username.to_string()));
    }
    if matches.len() > 1 {
        debug!(
            username,
            matches = matches.len(),
            "Ambiguous person search, registering a new person"
        );
    }

    let org_id = tracking_org_id(crm, &settings.tracking_org).await?;

    let person = crm
        .add_person(&NewPerson {
            name: username.to_string(),
            org_id: Some(org_id),
        })
        .await?;

    let deal = crm
        .add_deal(&NewDeal {
            title: format!("{} gists", username),
            person_id: person.id,
            org_id,
        })
        .await?;

    info!(
        username,
        deal_id = %deal.id,
        person_id = %person.id,
        "Registered tracked user"
    );

    Ok(TrackedUser {
        username: username.to_string(),
        deal_id: deal.id,
        person_id: person.id,
    })
}

/// Find the sentinel organization, creating it on first registration.
///
/// Only an exact-name match is reused: the roster filters deals by exact org
/// name, while the CRM search ignores case.
async fn tracking_org_id(crm: &dyn CrmApi, name: &str) -> AppResult<OrganizationId> {
    let existing = crm.search_organizations(name).await?;
    if let Some(org) = existing.iter().find(|o| o.name == name) {
        return Ok(org.id);
    }

    let org = crm
        .add_organization(&NewOrganization {
            name: name.to_string(),
        })
        .await?;
    info!(org_id = %org.id, name, "Created tracking organization");
    Ok(org.id)
}

//! Tracked users and the roster built from tagged deals.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::crm::{Deal, DealId, PersonId};

/// A username registered for gist synchronization.
///
/// The deal is the tracking record; the person owns the activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrackedUser {
    pub username: String,
    pub deal_id: DealId,
    pub person_id: PersonId,
}

/// Username → tracked user lookup for one request.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    users: BTreeMap<String, TrackedUser>,
}

impl Roster {
    /// Project the deals tagged with `tracking_org` into a roster.
    ///
    /// The first deal seen for a username wins. Tagged deals without a person
    /// name or person id are skipped.
    pub fn from_deals(deals: &[Deal], tracking_org: &str) -> Self {
        let mut users = BTreeMap::new();

        for deal in deals.iter().filter(|d| d.is_tracked_by(tracking_org)) {
            let Some(username) = deal
                .person_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
            else {
                warn!(deal_id = %deal.id, "Tracked deal has no person name, skipping");
                continue;
            };
            let Some(person_id) = deal.person_id else {
                warn!(deal_id = %deal.id, username, "Tracked deal has no person, skipping");
                continue;
            };

            if users.contains_key(username) {
                debug!(deal_id = %deal.id, username, "Duplicate tracking deal ignored");
                continue;
            }

            users.insert(
                username.to_string(),
                TrackedUser {
                    username: username.to_string(),
                    deal_id: deal.id,
                    person_id,
                },
            );
        }

        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look up a gist owner login. GitHub logins are case-insensitive, so an
    /// exact miss falls back to a case-insensitive match.
    pub fn find_login(&self, login: &str) -> Option<&TrackedUser> {
        self.users.get(login).or_else(|| {
            self.users
                .values()
                .find(|u| u.username.eq_ignore_ascii_case(login))
        })
    }

    /// Tracked users in username order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedUser> {
        self.users.values()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    /// Distinct person ids across the roster.
    pub fn person_ids(&self) -> BTreeSet<PersonId> {
        self.users.values().map(|u| u.person_id).collect()
    }
}

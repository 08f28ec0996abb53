//! Domain models for the gist sync server.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod crm;
pub mod gist;
pub mod tracking;

// Re-export commonly used types
pub use crm::{
    Activity, ActivityId, ActivityUpdate, Deal, DealId, NewActivity, NewDeal, NewOrganization,
    NewPerson, Organization, OrganizationId, Person, PersonId,
};
pub use gist::{Gist, GistOwner};
pub use tracking::{Roster, TrackedUser};

/// Body of `GET /list`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    /// Tracked usernames, sorted
    pub data: Vec<String>,
}

/// Body of `GET /new`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub data: TrackedUser,
}

/// `?user=` query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub user: Option<String>,
}

/// Query parameters for `/fetch` and `/gists`.
#[derive(Debug, Clone, Deserialize)]
pub struct SinceQuery {
    pub user: Option<String>,
    /// RFC 3339 time floor for gist listing
    pub since: Option<String>,
}

/// Stage of a reconciliation run that failed for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// Reading the user's existing activities
    LoadActivities,
    /// Listing the user's gists
    FetchGists,
    /// Creating the activity for one new gist
    CreateActivity,
}

/// One failed unit of work in a reconciliation run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncFailure {
    pub username: String,
    pub stage: SyncStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gist_id: Option<String>,
    pub message: String,
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReconcileReport {
    /// Activities created in this run
    pub created: usize,
    pub failures: Vec<SyncFailure>,
}

impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gist CRM Sync Server",
        version = "0.1.0",
        description = "Synchronizes new GitHub gists of tracked users into Pipedrive activities"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::sync::list_users,
        api::sync::register_user,
        api::sync::fetch_updates,
        api::sync::show_updates,
        api::upstream::list_deals,
        api::upstream::list_persons,
        api::upstream::list_organizations,
        api::upstream::list_gists,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            models::UserListResponse,
            models::RegisterResponse,
            models::TrackedUser,
            models::ReconcileReport,
            models::SyncFailure,
            models::SyncStage,
            models::Deal,
            models::Person,
            models::Organization,
            models::Activity,
            models::Gist,
            models::GistOwner,
            models::DealId,
            models::PersonId,
            models::OrganizationId,
            models::ActivityId,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Sync", description = "Tracking, reconciliation and digests"),
        (name = "Upstream", description = "Raw CRM and gist listings"),
    )
)]
pub struct ApiDoc;

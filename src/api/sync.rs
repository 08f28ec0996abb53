//! Tracking and sync API handlers.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};

use crate::config::SyncSettings;
use crate::error::{AppError, AppResult};
use crate::models::{RegisterResponse, SinceQuery, UserListResponse, UserQuery};
use crate::services::crm::CrmApi;
use crate::services::gists::GistSource;
use crate::services::{digest, reconcile, tracking};

/// Extract the required `user` query parameter.
pub(crate) fn required_user(user: Option<&str>) -> AppResult<&str> {
    user.map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::InvalidInput("query parameter 'user' is required".to_string()))
}

/// Parse the optional RFC 3339 `since` query parameter.
pub(crate) fn parse_since(since: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    since
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            DateTime::parse_from_rfc3339(s.trim())
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| AppError::InvalidInput(format!("'since' must be RFC 3339: {}", e)))
        })
        .transpose()
}

/// List tracked usernames.
#[utoipa::path(
    get,
    path = "/list",
    tag = "Sync",
    responses(
        (status = 200, description = "Tracked usernames", body = UserListResponse),
        (status = 500, description = "CRM unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_users(
    crm: web::Data<dyn CrmApi>,
    settings: web::Data<SyncSettings>,
) -> AppResult<HttpResponse> {
    let usernames = tracking::list_tracked(crm.get_ref(), &settings).await?;
    Ok(HttpResponse::Ok().json(UserListResponse {
        success: true,
        data: usernames,
    }))
}

/// Register a username for gist tracking.
#[utoipa::path(
    get,
    path = "/new",
    tag = "Sync",
    params(
        ("user" = String, Query, description = "Username to track (GitHub login)")
    ),
    responses(
        (status = 200, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing user", body = crate::error::ErrorResponse),
        (status = 500, description = "Already tracked or CRM unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn register_user(
    crm: web::Data<dyn CrmApi>,
    settings: web::Data<SyncSettings>,
    query: web::Query<UserQuery>,
) -> AppResult<HttpResponse> {
    let username = required_user(query.user.as_deref())?;
    let tracked = tracking::register(crm.get_ref(), &settings, username).await?;
    Ok(HttpResponse::Ok().json(RegisterResponse {
        success: true,
        data: tracked,
    }))
}

/// Synchronize new gists into CRM activities.
///
/// Responds with the number of created activities as plain text. If any user
/// or write failed, responds 500 with the full report; the successful part of
/// the run is kept.
#[utoipa::path(
    get,
    path = "/fetch",
    tag = "Sync",
    params(
        ("since" = Option<String>, Query, description = "Only consider gists updated at or after this RFC 3339 time")
    ),
    responses(
        (status = 200, description = "Count of new activities", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid since", body = crate::error::ErrorResponse),
        (status = 500, description = "Partial or total failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn fetch_updates(
    crm: web::Data<dyn CrmApi>,
    gists: web::Data<dyn GistSource>,
    settings: web::Data<SyncSettings>,
    query: web::Query<SinceQuery>,
) -> AppResult<HttpResponse> {
    let since = parse_since(query.since.as_deref())?;
    let report = reconcile::reconcile(crm.get_ref(), gists.get_ref(), &settings, since).await?;

    if !report.is_complete() {
        return Err(AppError::PartialFailure(report));
    }

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(report.created.to_string()))
}

/// Render the unseen-gist digest for a user and mark it seen.
#[utoipa::path(
    get,
    path = "/updates",
    tag = "Sync",
    params(
        ("user" = String, Query, description = "Tracked username")
    ),
    responses(
        (status = 200, description = "Digest page", body = String, content_type = "text/html"),
        (status = 400, description = "Missing user", body = String, content_type = "text/plain"),
        (status = 500, description = "Unknown/ambiguous user or CRM unavailable", body = String, content_type = "text/plain"),
    )
)]
pub async fn show_updates(
    crm: web::Data<dyn CrmApi>,
    settings: web::Data<SyncSettings>,
    query: web::Query<UserQuery>,
) -> HttpResponse {
    let result = match required_user(query.user.as_deref()) {
        Ok(username) => digest::render_digest(crm.get_ref(), &settings, username).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(page) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(page.html),
        Err(e) => e.text_response(),
    }
}

/// Configure sync routes. `/show` is the older name of `/updates`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/list").route(web::get().to(list_users)))
        .service(web::resource("/new").route(web::get().to(register_user)))
        .service(web::resource("/fetch").route(web::get().to(fetch_updates)))
        .service(web::resource(["/updates", "/show"]).route(web::get().to(show_updates)));
}

//! Raw listings straight from the CRM and gist APIs, for inspecting upstream state.

use actix_web::{HttpResponse, web};

use crate::api::sync::{parse_since, required_user};
use crate::error::AppResult;
use crate::models::{Deal, Gist, Organization, Person, SinceQuery};
use crate::services::crm::CrmApi;
use crate::services::gists::GistSource;

/// List all CRM deals.
#[utoipa::path(
    get,
    path = "/deals",
    tag = "Upstream",
    responses(
        (status = 200, description = "All deals", body = Vec<Deal>),
        (status = 500, description = "CRM unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_deals(crm: web::Data<dyn CrmApi>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(crm.list_deals().await?))
}

/// List all CRM persons.
#[utoipa::path(
    get,
    path = "/persons",
    tag = "Upstream",
    responses(
        (status = 200, description = "All persons", body = Vec<Person>),
        (status = 500, description = "CRM unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_persons(crm: web::Data<dyn CrmApi>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(crm.list_persons().await?))
}

/// List all CRM organizations.
#[utoipa::path(
    get,
    path = "/organizations",
    tag = "Upstream",
    responses(
        (status = 200, description = "All organizations", body = Vec<Organization>),
        (status = 500, description = "CRM unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_organizations(crm: web::Data<dyn CrmApi>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(crm.list_organizations().await?))
}

/// List one user's public gists.
#[utoipa::path(
    get,
    path = "/gists",
    tag = "Upstream",
    params(
        ("user" = String, Query, description = "GitHub login"),
        ("since" = Option<String>, Query, description = "RFC 3339 time floor")
    ),
    responses(
        (status = 200, description = "The user's gists", body = Vec<Gist>),
        (status = 400, description = "Missing user or invalid since", body = crate::error::ErrorResponse),
        (status = 500, description = "Gist API unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_gists(
    gists: web::Data<dyn GistSource>,
    query: web::Query<SinceQuery>,
) -> AppResult<HttpResponse> {
    let username = required_user(query.user.as_deref())?;
    let since = parse_since(query.since.as_deref())?;
    Ok(HttpResponse::Ok().json(gists.user_gists(username, since).await?))
}

/// Configure upstream pass-through routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/deals").route(web::get().to(list_deals)))
        .service(web::resource("/persons").route(web::get().to(list_persons)))
        .service(web::resource("/organizations").route(web::get().to(list_organizations)))
        .service(web::resource("/gists").route(web::get().to(list_gists)));
}

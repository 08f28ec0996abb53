//! Gist CRM sync server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use gist_crm_sync_lib::api::{self, ApiDoc};
use gist_crm_sync_lib::config::Config;
use gist_crm_sync_lib::middleware::RequestLogger;
use gist_crm_sync_lib::services::{
    CrmApi, GistSource, GitHubGistClient, PipedriveClient, build_http_client,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // --health-check only validates configuration (used by container healthchecks)
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if Config::from_env().is_ok() { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, PIPEDRIVE_API_TOKEN must be set");
            error!("  - In production, upstream URLs must use https://");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Gist CRM Sync Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }
    if config.crm.api_token.is_none() {
        warn!("PIPEDRIVE_API_TOKEN is not set; CRM calls will be rejected upstream");
    }
    if config.gists.api_token.is_none() {
        warn!("GITHUB_API_TOKEN is not set; gist listing uses the anonymous rate limit");
    }

    let http = build_http_client(config.http_timeout).map_err(std::io::Error::other)?;

    let crm: Arc<dyn CrmApi> = Arc::new(PipedriveClient::new(&config.crm, http.clone()));
    let gists: Arc<dyn GistSource> = Arc::new(GitHubGistClient::new(&config.gists, http));
    let crm = web::Data::from(crm);
    let gists = web::Data::from(gists);
    let sync_settings = web::Data::new(config.sync.clone());

    info!(
        "CRM: {} | Gists: {} | Tracking org: '{}'",
        config.crm.base_url, config.gists.api_url, config.sync.tracking_org
    );

    let bind_address = config.bind_address();
    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(crm.clone())
            .app_data(gists.clone())
            .app_data(sync_settings.clone())
            .configure(api::configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}

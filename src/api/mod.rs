//! API endpoint modules.

use actix_web::web;

pub mod health;
pub mod openapi;
pub mod sync;
pub mod upstream;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use sync::configure_routes as configure_sync_routes;
pub use upstream::configure_routes as configure_upstream_routes;

/// Configure every API route at the root scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_sync_routes)
        .configure(configure_upstream_routes);
}

//! Business logic services and upstream adapters.

pub mod crm;
pub mod digest;
pub mod gists;
pub mod http;
pub mod reconcile;
pub mod tracking;


pub use crm::{CrmApi, CrmError, PipedriveClient};
pub use gists::{GistError, GistSource, GitHubGistClient};
pub use http::build_http_client;

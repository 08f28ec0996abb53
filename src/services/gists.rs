//! GitHub gist adapter.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::GistSettings;
use crate::models::Gist;
use crate::services::http::error_body;

/// Errors from gist listing.
#[derive(Debug, thiserror::Error)]
pub enum GistError {
    #[error("Gist request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gist API returned HTTP {status} for '{username}': {message}")]
    Status {
        username: String,
        status: u16,
        message: String,
    },
}

/// Source of a user's public gists.
#[async_trait]
pub trait GistSource: Send + Sync {
    /// List `username`'s public gists, optionally only those updated at or after `since`.
    async fn user_gists(
        &self,
        username: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Gist>, GistError>;
}

/// GitHub REST client for `GET /users/{username}/gists`.
#[derive(Clone)]
pub struct GitHubGistClient {
    api_url: String,
    api_token: Option<SecretString>,
    http: reqwest::Client,
}

impl GitHubGistClient {
    pub fn new(settings: &GistSettings, http: reqwest::Client) -> Self {
        Self {
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
            http,
        }
    }
}

#[async_trait]
impl GistSource for GitHubGistClient {
    async fn user_gists(
        &self,
        username: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Gist>, GistError> {
        let url = format!(
            "{}/users/{}/gists",
            self.api_url,
            urlencoding::encode(username)
        );

        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.api_token {
            request = request.header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            );
        }
        if let Some(since) = since {
            request = request.query(&[("since", since.to_rfc3339_opts(SecondsFormat::Secs, true))]);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GistError::Status {
                username: username.to_string(),
                status: status.as_u16(),
                message: error_body(resp).await,
            });
        }

        let gists: Vec<Gist> = resp.json().await?;
        debug!(target: "gists", username, count = gists.len(), "Fetched gists");
        Ok(gists)
    }
}

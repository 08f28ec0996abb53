//! Pipedrive CRM adapter.
//!
//! The services only talk to [`CrmApi`]; [`PipedriveClient`] is the HTTP
//! implementation against the Pipedrive v1 REST API. Every call is a single
//! request: no pagination, no retries.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CrmSettings;
use crate::models::crm::{Envelope, SearchResults};
use crate::models::{
    Activity, ActivityId, ActivityUpdate, Deal, NewActivity, NewDeal, NewOrganization, NewPerson,
    Organization, Person, PersonId,
};
use crate::services::http::error_body;

/// Errors from CRM calls.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("CRM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("CRM returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("CRM rejected request: {0}")]
    Rejected(String),

    #[error("CRM response for {0} had no data")]
    MissingData(&'static str),
}

/// CRM operations used by the sync services.
#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn list_deals(&self) -> Result<Vec<Deal>, CrmError>;

    async fn add_deal(&self, deal: &NewDeal) -> Result<Deal, CrmError>;

    async fn list_persons(&self) -> Result<Vec<Person>, CrmError>;

    /// Persons whose name matches `name` exactly (as judged by the CRM).
    async fn search_persons(&self, name: &str) -> Result<Vec<Person>, CrmError>;

    async fn add_person(&self, person: &NewPerson) -> Result<Person, CrmError>;

    async fn list_organizations(&self) -> Result<Vec<Organization>, CrmError>;

    async fn search_organizations(&self, name: &str) -> Result<Vec<Organization>, CrmError>;

    async fn add_organization(&self, org: &NewOrganization) -> Result<Organization, CrmError>;

    /// Activities linked to a person, optionally filtered by the done flag.
    /// Order is whatever the CRM returns.
    async fn person_activities(
        &self,
        person_id: PersonId,
        done: Option<bool>,
    ) -> Result<Vec<Activity>, CrmError>;

    async fn add_activity(&self, activity: &NewActivity) -> Result<Activity, CrmError>;

    async fn set_activity_done(&self, id: ActivityId, done: bool) -> Result<Activity, CrmError>;
}

/// Pipedrive v1 REST client.
#[derive(Clone)]
pub struct PipedriveClient {
    base_url: String,
    api_token: Option<SecretString>,
    http: reqwest::Client,
}

impl PipedriveClient {
    pub fn new(settings: &CrmSettings, http: reqwest::Client) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.query(&[("api_token", token.expose_secret())]),
            None => request,
        }
    }

    /// Send a request and unwrap the `{success, data}` envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<Option<T>, CrmError> {
        let resp = self.authorize(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CrmError::Status {
                status: status.as_u16(),
                message: error_body(resp).await,
            });
        }

        let envelope: Envelope<T> = resp.json().await?;
        if !envelope.success {
            return Err(CrmError::Rejected(
                envelope.error.unwrap_or_else(|| format!("{} failed", what)),
            ));
        }

        debug!(target: "crm", "{} ok", what);
        Ok(envelope.data)
    }

    async fn send_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<Vec<T>, CrmError> {
        // Pipedrive answers an empty collection with `data: null`
        Ok(self.send(request, what).await?.unwrap_or_default())
    }

    async fn send_one<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<T, CrmError> {
        self.send(request, what)
            .await?
            .ok_or(CrmError::MissingData(what))
    }

    async fn search<T: DeserializeOwned>(
        &self,
        path: &str,
        term: &str,
        what: &'static str,
    ) -> Result<Vec<T>, CrmError> {
        let request = self.http.get(self.url(path)).query(&[
            ("term", term),
            ("fields", "name"),
            ("exact_match", "true"),
        ]);
        let results: Option<SearchResults<T>> = self.send(request, what).await?;
        Ok(results.map(SearchResults::into_items).unwrap_or_default())
    }
}

#[async_trait]
impl CrmApi for PipedriveClient {
    async fn list_deals(&self) -> Result<Vec<Deal>, CrmError> {
        self.send_list(self.http.get(self.url("/deals")), "list deals")
            .await
    }

    async fn add_deal(&self, deal: &NewDeal) -> Result<Deal, CrmError> {
        self.send_one(self.http.post(self.url("/deals")).json(deal), "add deal")
            .await
    }

    async fn list_persons(&self) -> Result<Vec<Person>, CrmError> {
        self.send_list(self.http.get(self.url("/persons")), "list persons")
            .await
    }

    async fn search_persons(&self, name: &str) -> Result<Vec<Person>, CrmError> {
        self.search("/persons/search", name, "search persons").await
    }

    async fn add_person(&self, person: &NewPerson) -> Result<Person, CrmError> {
        self.send_one(
            self.http.post(self.url("/persons")).json(person),
            "add person",
        )
        .await
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, CrmError> {
        self.send_list(
            self.http.get(self.url("/organizations")),
            "list organizations",
        )
        .await
    }

    async fn search_organizations(&self, name: &str) -> Result<Vec<Organization>, CrmError> {
        self.search("/organizations/search", name, "search organizations")
            .await
    }

    async fn add_organization(&self, org: &NewOrganization) -> Result<Organization, CrmError> {
        self.send_one(
            self.http.post(self.url("/organizations")).json(org),
            "add organization",
        )
        .await
    }

    async fn person_activities(
        &self,
        person_id: PersonId,
        done: Option<bool>,
    ) -> Result<Vec<Activity>, CrmError> {
        let mut request = self
            .http
            .get(self.url(&format!("/persons/{}/activities", person_id)));
        if let Some(done) = done {
            request = request.query(&[("done", u8::from(done))]);
        }
        self.send_list(request, "list person activities").await
    }

    async fn add_activity(&self, activity: &NewActivity) -> Result<Activity, CrmError> {
        self.send_one(
            self.http.post(self.url("/activities")).json(activity),
            "add activity",
        )
        .await
    }

    async fn set_activity_done(&self, id: ActivityId, done: bool) -> Result<Activity, CrmError> {
        self.send_one(
            self.http
                .put(self.url(&format!("/activities/{}", id)))
                .json(&ActivityUpdate { done }),
            "update activity",
        )
        .await
    }
}

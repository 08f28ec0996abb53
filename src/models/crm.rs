//! Pipedrive CRM records and request bodies.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

macro_rules! crm_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

crm_id!(
    /// Identifier of a CRM deal.
    DealId
);
crm_id!(
    /// Identifier of a CRM person. Never interchangeable with [`DealId`].
    PersonId
);
crm_id!(
    /// Identifier of a CRM organization.
    OrganizationId
);
crm_id!(
    /// Identifier of a CRM activity.
    ActivityId
);

/// Deal as returned by `GET /deals`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Deal {
    pub id: DealId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default, deserialize_with = "linked_id")]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default, deserialize_with = "linked_id")]
    pub org_id: Option<OrganizationId>,
}

impl Deal {
    /// Whether this deal is a tracking record for the given sentinel organization.
    pub fn is_tracked_by(&self, tracking_org: &str) -> bool {
        self.org_name.as_deref() == Some(tracking_org)
    }
}

/// Body for `POST /deals`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDeal {
    pub title: String,
    pub person_id: PersonId,
    pub org_id: OrganizationId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub name: String,
}

/// Body for `POST /persons`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPerson {
    pub name: String,
    pub org_id: Option<OrganizationId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Organization {
    pub id: OrganizationId,
    #[serde(default)]
    pub name: String,
}

/// Body for `POST /organizations`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrganization {
    pub name: String,
}

/// One synchronized gist notification.
///
/// `note` holds the gist id and is the dedup key; `done` is the seen flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Activity {
    pub id: ActivityId,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, with = "done_flag")]
    #[schema(value_type = u8)]
    pub done: bool,
    #[serde(default, deserialize_with = "linked_id")]
    pub deal_id: Option<DealId>,
    #[serde(default, deserialize_with = "linked_id")]
    pub person_id: Option<PersonId>,
}

impl Activity {
    /// The gist id recorded on this activity, if any.
    pub fn gist_id(&self) -> Option<&str> {
        self.note.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Body for `POST /activities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewActivity {
    pub subject: String,
    pub note: String,
    #[serde(with = "done_flag")]
    pub done: bool,
    pub deal_id: DealId,
    pub person_id: PersonId,
}

/// Body for `PUT /activities/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityUpdate {
    #[serde(with = "done_flag")]
    pub done: bool,
}

/// Standard Pipedrive response wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `data` payload of the `/search` endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchResults<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<SearchHit<T>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit<T> {
    pub item: T,
}

impl<T> SearchResults<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items.into_iter().map(|hit| hit.item).collect()
    }
}

/// Pipedrive expands linked records to `{ "value": id, "name": ... }` on reads
/// but accepts and sometimes returns the bare id.
fn linked_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<u64>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Linked {
        Bare(u64),
        Expanded { value: u64 },
    }

    Ok(Option::<Linked>::deserialize(deserializer)?.map(|linked| match linked {
        Linked::Bare(id) | Linked::Expanded { value: id } => T::from(id),
    }))
}

impl From<u64> for DealId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<u64> for PersonId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<u64> for OrganizationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// `done` is written as `0`/`1`; reads may come back as a boolean.
mod done_flag {
    use super::*;

    pub fn serialize<S: Serializer>(done: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*done))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(u8),
        }

        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(done) => done,
            Flag::Int(n) => n != 0,
        })
    }
}

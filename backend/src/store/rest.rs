use async_trait::async_trait;
use axent_common::marketplace::{Bid, BidStatus, Delivery, Equipment, Project, ProjectStatus};
use axent_common::{Location, ProfileUpdate, Role, UserProfile};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{CatalogStore, ProfileStore, StoreError};

const PROFILES: &str = "profiles";
const EQUIPMENT: &str = "equipment";
const PROJECTS: &str = "projects";
const BIDS: &str = "bids";
const DELIVERIES: &str = "deliveries";

/// Client for a PostgREST-style data store (`{url}/rest/v1/{table}`).
pub struct RestStore {
    http_client: Client,
    rest_url: String,
    anon_key: String,
}

/// A `profiles` row as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    /// Free-form JSON column; unreadable shapes are ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse()?;
        let location = row
            .location
            .and_then(|v| serde_json::from_value::<Location>(v).ok());

        Ok(UserProfile {
            id: row.id,
            email: row.email.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            role,
            location,
            avatar: row.avatar_url,
            phone: row.phone,
        })
    }
}

impl From<&UserProfile> for ProfileRow {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            email: Some(profile.email.clone()),
            name: Some(profile.name.clone()),
            role: profile.role.as_str().to_string(),
            location: profile
                .location
                .as_ref()
                .and_then(|l| serde_json::to_value(l).ok()),
            avatar_url: profile.avatar.clone(),
            phone: profile.phone.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct RolePatch {
    role: Role,
}

/// Column names differ from the API shape (`avatar` -> `avatar_url`).
#[derive(Debug, Serialize)]
struct ProfilePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BidStatusPatch {
    status: BidStatus,
}

#[derive(Debug, Serialize)]
struct ProjectPatch {
    status: ProjectStatus,
    bids_count: u32,
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl RestStore {
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    fn request(&self, method: Method, table: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}/{}", self.rest_url, table);
        let builder = self
            .http_client
            .request(method, url)
            .header("apikey", &self.anon_key);

        match token {
            Some(token) => builder.bearer_auth(token),
            None => {
                tracing::debug!(table, "No identity token, calling data store anonymously");
                builder
            }
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { message: Some(message), code }) => match code {
                Some(code) => format!("{} ({})", message, code),
                None => message,
            },
            _ => body,
        };
        Err(StoreError::Status { status, message })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<Vec<T>, StoreError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend(filters.iter().cloned());

        let response = self
            .send(self.request(Method::GET, table, token).query(&query))
            .await?;

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    async fn insert<T: Serialize + ?Sized>(&self, table: &str, row: &T, token: Option<&str>) -> Result<(), StoreError> {
        self.send(
            self.request(Method::POST, table, token)
                .header("Prefer", "return=representation")
                .json(row),
        )
        .await?;
        Ok(())
    }

    /// PATCH one row by id; a missing row is reported as `NotFound`.
    async fn patch<T: Serialize + ?Sized>(
        &self,
        table: &'static str,
        id: &str,
        body: &T,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let response = self
            .send(
                self.request(Method::PATCH, table, token)
                    .query(&[("id", format!("eq.{}", id)), ("select", "id".to_string())])
                    .header("Prefer", "return=representation")
                    .json(body),
            )
            .await?;

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        if rows.is_empty() {
            return Err(StoreError::NotFound {
                table,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for RestStore {
    async fn fetch_profile(&self, id: &str, token: Option<&str>) -> Result<Option<UserProfile>, StoreError> {
        let rows: Vec<ProfileRow> = self
            .select(PROFILES, &[("id", format!("eq.{}", id))], token)
            .await?;

        rows.into_iter().next().map(UserProfile::try_from).transpose()
    }

    async fn insert_profile(&self, profile: &UserProfile, token: Option<&str>) -> Result<(), StoreError> {
        self.insert(PROFILES, &ProfileRow::from(profile), token).await?;
        tracing::info!(profile_id = %profile.id, role = %profile.role, "Inserted profile");
        Ok(())
    }

    async fn update_role(&self, id: &str, role: Role, token: Option<&str>) -> Result<(), StoreError> {
        self.patch(PROFILES, id, &RolePatch { role }, token).await
    }

    async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let patch = ProfilePatch {
            name: update.name.as_deref(),
            location: update.location.as_ref(),
            avatar_url: update.avatar.as_deref(),
            phone: update.phone.as_deref(),
        };
        self.patch(PROFILES, id, &patch, token).await
    }
}

#[async_trait]
impl CatalogStore for RestStore {
    async fn list_equipment(&self, token: Option<&str>) -> Result<Vec<Equipment>, StoreError> {
        self.select(EQUIPMENT, &[], token).await
    }

    async fn list_projects(&self, token: Option<&str>) -> Result<Vec<Project>, StoreError> {
        self.select(PROJECTS, &[], token).await
    }

    async fn fetch_project(&self, id: &str, token: Option<&str>) -> Result<Option<Project>, StoreError> {
        let rows: Vec<Project> = self
            .select(PROJECTS, &[("id", format!("eq.{}", id))], token)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_bids(&self, project_id: Option<&str>, token: Option<&str>) -> Result<Vec<Bid>, StoreError> {
        let filters: Vec<(&str, String)> = project_id
            .map(|id| vec![("project_id", format!("eq.{}", id))])
            .unwrap_or_default();
        self.select(BIDS, &filters, token).await
    }

    async fn insert_bid(&self, bid: &Bid, token: Option<&str>) -> Result<(), StoreError> {
        self.insert(BIDS, bid, token).await
    }

    async fn update_bid_status(&self, id: &str, status: BidStatus, token: Option<&str>) -> Result<(), StoreError> {
        self.patch(BIDS, id, &BidStatusPatch { status }, token).await
    }

    async fn update_project(&self, project: &Project, token: Option<&str>) -> Result<(), StoreError> {
        let patch = ProjectPatch {
            status: project.status,
            bids_count: project.bids_count,
        };
        self.patch(PROJECTS, &project.id, &patch, token).await
    }

    async fn list_deliveries(&self, token: Option<&str>) -> Result<Vec<Delivery>, StoreError> {
        self.select(DELIVERIES, &[], token).await
    }
}

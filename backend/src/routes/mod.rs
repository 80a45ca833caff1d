//! HTTP surface: public pages, guarded role modules and the `/api` JSON
//! endpoints.

pub mod ai;
pub mod customer;
pub mod dashboards;
pub mod health;
pub mod pages;
pub mod profile;
pub mod projects;
pub mod provider;

use std::collections::HashMap;
use std::sync::Arc;

use axent_common::ai::FileUpload;
use axent_common::{Role, UserProfile};
use axum::extract::Multipart;
use axum::{middleware, Router};
use serde::Serialize;

use crate::access::guard::{attach_session, require_page_access, require_session};
use crate::access::home_path;
use crate::error::{AppError, Result};
use crate::store::StoreError;
use crate::AppState;

/// Profile header shown on every signed-in page.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub home: &'static str,
}

impl From<&UserProfile> for ProfileSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role,
            avatar: profile.avatar.clone(),
            city: profile.location.as_ref().map(|l| l.city.clone()),
            home: home_path(profile.role),
        }
    }
}

/// Page reads degrade to empty lists; the failure is only logged.
pub(crate) fn or_empty<T>(what: &'static str, result: std::result::Result<Vec<T>, StoreError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(what, error = %e, "Data store read failed, rendering empty");
        Vec::new()
    })
}

/// Multipart body split into text fields and file parts.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<FileUpload>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let invalid = |e: axum::extract::multipart::MultipartError| AppError::InvalidRequest(e.to_string());
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(invalid)?;
                    form.files.push(FileUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field.text().await.map_err(invalid)?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    /// Non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// `"true"`/`"false"` field, `default` when absent or unparseable.
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.fields
            .get(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// The full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let public = pages::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), attach_session));

    let modules = Router::new()
        .merge(dashboards::router())
        .merge(customer::router())
        .merge(provider::router())
        .merge(projects::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_page_access));

    let api = Router::new()
        .merge(profile::router())
        .merge(ai::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public)
        .merge(modules)
        .nest("/api", api)
        .fallback(pages::not_found)
        .with_state(state)
        .merge(health::router())
}

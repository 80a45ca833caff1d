use std::sync::Arc;

use axent_common::{ProfileUpdate, UserProfile};
use axum::extract::State;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::Serialize;

use super::pages::RoleSelection;
use crate::access::home_path;
use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Serialize)]
struct RoleChanged {
    profile: UserProfile,
    home: &'static str,
}

fn current(session: &Session) -> Result<UserProfile> {
    session.profile().cloned().ok_or(AppError::Unauthorized)
}

/// GET /api/profile
async fn get_profile(Extension(session): Extension<Session>) -> Result<Json<UserProfile>> {
    Ok(Json(current(&session)?))
}

/// PATCH /api/profile
async fn patch_profile(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }

    session.update_profile(state.sessions.store(), &update).await?;
    Ok(Json(current(&session)?))
}

/// PUT /api/profile/role
async fn put_role(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Json(selection): Json<RoleSelection>,
) -> Result<Json<RoleChanged>> {
    session.update_role(state.sessions.store(), selection.role).await?;
    Ok(Json(RoleChanged {
        profile: current(&session)?,
        home: home_path(selection.role),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile).patch(patch_profile))
        .route("/profile/role", put(put_role))
}

//! Public pages and the catch-all for unserved paths.

use std::sync::Arc;

use axent_common::Role;
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ProfileSummary;
use crate::access::guard::resolve_session;
use crate::access::{home_path, not_found_target, SIGN_IN_PATH};
use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Serialize)]
struct RoleOption {
    role: Role,
    home: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RoleSelection {
    pub role: Role,
}

fn redirect_home(session: &Session) -> Option<Response> {
    session
        .role()
        .map(|role| Redirect::to(home_path(role)).into_response())
}

/// GET / - landing; signed-in users go straight to their dashboard.
async fn landing(Extension(session): Extension<Session>) -> Response {
    if let Some(redirect) = redirect_home(&session) {
        return redirect;
    }
    Json(json!({
        "page": "landing",
        "sign_in": SIGN_IN_PATH,
        "sign_up": "/sign-up",
    }))
    .into_response()
}

async fn sign_in(Extension(session): Extension<Session>) -> Response {
    redirect_home(&session).unwrap_or_else(|| Json(json!({ "page": "sign-in" })).into_response())
}

async fn sign_up(Extension(session): Extension<Session>) -> Response {
    redirect_home(&session).unwrap_or_else(|| Json(json!({ "page": "sign-up" })).into_response())
}

/// GET /role-selection - the four roles and where each lands.
async fn role_selection(Extension(session): Extension<Session>) -> Response {
    let Some(profile) = session.profile() else {
        return Redirect::to(SIGN_IN_PATH).into_response();
    };

    let options: Vec<RoleOption> = Role::ALL
        .iter()
        .map(|&role| RoleOption {
            role,
            home: home_path(role),
        })
        .collect();

    Json(json!({
        "page": "role-selection",
        "profile": ProfileSummary::from(profile),
        "roles": options,
    }))
    .into_response()
}

/// POST /role-selection - store the chosen role, answer with its home.
async fn select_role(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Json(selection): Json<RoleSelection>,
) -> Result<Response> {
    if !session.is_authenticated() {
        return Ok(Redirect::to(SIGN_IN_PATH).into_response());
    }

    session.update_role(state.sessions.store(), selection.role).await?;

    Ok(Json(json!({
        "role": selection.role,
        "home": home_path(selection.role),
    }))
    .into_response())
}

/// Fallback for paths no route serves.
pub async fn not_found(State(state): State<Arc<AppState>>, uri: Uri, headers: HeaderMap) -> Response {
    if uri.path().starts_with("/api/") {
        return AppError::NotFound(uri.path().to_string()).into_response();
    }

    let session = resolve_session(&state, &headers).await;
    let target = not_found_target(session.role());
    tracing::info!(path = %uri.path(), redirect = %target, "No route for path");
    Redirect::to(target).into_response()
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing))
        .route("/sign-in", get(sign_in))
        .route("/sign-up", get(sign_up))
        .route("/role-selection", get(role_selection).post(select_role))
}

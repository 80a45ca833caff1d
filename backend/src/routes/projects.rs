//! Bid decisions by project owners, served under both the customer and
//! organization modules.

use std::sync::Arc;

use axent_common::marketplace::Project;
use axent_common::Role;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::marketplace::BidBoard;
use crate::AppState;

/// Load the project and check the caller may decide its bids.
async fn owned_project(board: &BidBoard<'_>, session: &Session, project_id: &str) -> Result<Project> {
    let profile = session.profile().ok_or(AppError::Unauthorized)?;
    let project = board.project(project_id).await?;

    if project.client.id != profile.id && profile.role != Role::Admin {
        return Err(AppError::Forbidden(format!(
            "project {} belongs to another client",
            project_id
        )));
    }
    Ok(project)
}

async fn accept_bid(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((project_id, bid_id)): Path<(String, String)>,
) -> Result<Json<Project>> {
    let board = BidBoard::new(state.catalog.as_ref(), session.token());
    let project = owned_project(&board, &session, &project_id).await?;

    Ok(Json(board.accept(project, &bid_id).await?))
}

async fn reject_bid(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((project_id, bid_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let board = BidBoard::new(state.catalog.as_ref(), session.token());
    let project = owned_project(&board, &session, &project_id).await?;

    board.reject(&project, &bid_id).await?;
    Ok(Json(json!({ "bid_id": bid_id, "status": "rejected" })))
}

pub fn router() -> Router<Arc<AppState>> {
    let mut router = Router::new();
    for module in ["customer", "organization"] {
        router = router
            .route(
                &format!("/{}/projects/:project_id/bids/:bid_id/accept", module),
                post(accept_bid),
            )
            .route(
                &format!("/{}/projects/:project_id/bids/:bid_id/reject", module),
                post(reject_bid),
            );
    }
    router
}

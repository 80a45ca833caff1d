//! Provider module: browse open projects and bid on them.

use std::sync::Arc;

use axent_common::marketplace::{Bid, VendorSummary};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use super::dashboards::{open_projects_with_bids, ProjectWithBids};
use super::{or_empty, ProfileSummary};
use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::marketplace::currency::format_compact;
use crate::marketplace::{BidBoard, BidDraft};
use crate::AppState;

#[derive(Debug, Serialize)]
struct ProjectCard {
    #[serde(flatten)]
    project: ProjectWithBids,
    /// e.g. "₹40.0K - ₹65.0K"
    budget_display: String,
}

impl From<ProjectWithBids> for ProjectCard {
    fn from(project: ProjectWithBids) -> Self {
        let budget = project.project.budget;
        Self {
            budget_display: format!("{} - {}", format_compact(budget.min), format_compact(budget.max)),
            project,
        }
    }
}

/// GET /provider/projects
async fn project_board(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>> {
    let profile = session.profile().ok_or(AppError::Unauthorized)?;
    let token = session.token();

    let projects = or_empty("projects", state.catalog.list_projects(token).await);
    let bids = or_empty("bids", state.catalog.list_bids(None, token).await);
    let cards: Vec<ProjectCard> = open_projects_with_bids(projects, &bids)
        .into_iter()
        .map(ProjectCard::from)
        .collect();

    Ok(Json(json!({
        "page": "projects",
        "profile": ProfileSummary::from(profile),
        "projects": cards,
    })))
}

/// POST /provider/projects/:id/bids
async fn submit_bid(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(project_id): Path<String>,
    Json(draft): Json<BidDraft>,
) -> Result<(StatusCode, Json<Bid>)> {
    let profile = session.profile().ok_or(AppError::Unauthorized)?;

    let vendor = VendorSummary {
        name: profile.name.clone(),
        rating: 0.0,
        completed_projects: 0,
    };
    let board = BidBoard::new(state.catalog.as_ref(), session.token());
    let bid = board.submit(&project_id, &profile.id, vendor, draft).await?;

    Ok((StatusCode::CREATED, Json(bid)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/provider/projects", get(project_board))
        .route("/provider/projects/:id/bids", post(submit_bid))
}

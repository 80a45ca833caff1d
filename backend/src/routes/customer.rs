//! Customer module pages: AI project estimator and equipment catalog.

use std::sync::Arc;

use axent_common::ai::ProjectAnalysisRequest;
use axent_common::marketplace::{Equipment, ProjectType};
use axent_common::Coordinates;
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use super::{or_empty, ProfileSummary, UploadForm};
use crate::ai::{with_fallback, Estimated, ProjectEstimate};
use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::marketplace::catalog::{find_by_id, visible_to};
use crate::marketplace::currency::{format_inr, format_price_with_unit};
use crate::marketplace::geo::{city_coordinates, distance_km, format_distance, sort_by_distance};
use crate::marketplace::CatalogQuery;
use crate::AppState;

const WORK_TYPES: &[ProjectType] = &[
    ProjectType::Demolition,
    ProjectType::Construction,
    ProjectType::Farming,
    ProjectType::Drilling,
    ProjectType::Excavation,
    ProjectType::Other,
];

/// GET /customer/estimator
async fn estimator_page(Extension(session): Extension<Session>) -> Result<Json<Value>> {
    let profile = session.profile().ok_or(AppError::Unauthorized)?;
    Ok(Json(json!({
        "page": "estimator",
        "profile": ProfileSummary::from(profile),
        "work_types": WORK_TYPES,
    })))
}

#[derive(Debug, Serialize)]
pub struct EstimateView {
    #[serde(flatten)]
    pub estimate: Estimated<ProjectEstimate>,
    /// e.g. "₹4,800 - ₹6,500"
    pub cost_range: String,
}

impl From<Estimated<ProjectEstimate>> for EstimateView {
    fn from(estimate: Estimated<ProjectEstimate>) -> Self {
        let cost_range = format!(
            "{} - {}",
            format_inr(estimate.value.min_cost, false),
            format_inr(estimate.value.max_cost, false)
        );
        Self { estimate, cost_range }
    }
}

/// POST /customer/estimator - multipart `description`, `location`,
/// `work_type` and photo files.
async fn estimate_project(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Result<Json<EstimateView>> {
    let form = UploadForm::read(multipart).await?;

    let location = form
        .text("location")
        .or_else(|| session.profile().and_then(|p| p.location.as_ref()).map(|l| l.city.clone()));
    let request = ProjectAnalysisRequest {
        description: form.text("description"),
        location,
        work_type: form.text("work_type"),
        files: form.files,
    };

    let ai_client = &state.ai_client;
    let estimate = with_fallback(
        "analyze_project",
        async move { ai_client.analyze_project(request).await.map(ProjectEstimate::from_analysis) },
        ProjectEstimate::fallback,
    )
    .await;

    Ok(Json(EstimateView::from(estimate)))
}

#[derive(Debug, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub equipment: Equipment,
    /// e.g. "₹1,500/day"
    pub price_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

fn listing_view(equipment: Equipment, origin: Option<Coordinates>) -> ListingView {
    ListingView {
        price_display: format_price_with_unit(equipment.price, equipment.price_unit),
        distance: origin.map(|o| format_distance(distance_km(o, equipment.location.coordinates))),
        equipment,
    }
}

/// Where distances are measured from: the profile's stored coordinates,
/// or its city's known coordinates when none were recorded (0, 0).
fn origin(session: &Session) -> Option<Coordinates> {
    let location = session.profile()?.location.as_ref()?;
    let unset = location.coordinates.lat == 0.0 && location.coordinates.lng == 0.0;
    if unset {
        city_coordinates(&location.city)
    } else {
        Some(location.coordinates)
    }
}

/// GET /customer/equipment?category=..&q=..
async fn equipment_catalog(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Value>> {
    let role = session.role().ok_or(AppError::Unauthorized)?;

    let all = or_empty("equipment", state.catalog.list_equipment(session.token()).await);
    let mut matching: Vec<Equipment> = query.apply(&all, role).into_iter().cloned().collect();

    let origin = origin(&session);
    if let Some(origin) = origin {
        sort_by_distance(&mut matching, origin);
    }
    let listings: Vec<ListingView> = matching.into_iter().map(|e| listing_view(e, origin)).collect();

    Ok(Json(json!({
        "page": "equipment",
        "category": query.category,
        "q": query.q,
        "total": listings.len(),
        "listings": listings,
    })))
}

/// GET /customer/equipment/:id
async fn equipment_detail(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<ListingView>> {
    let role = session.role().ok_or(AppError::Unauthorized)?;

    let all = state.catalog.list_equipment(session.token()).await?;
    let equipment = find_by_id(&all, &id)
        .filter(|e| !visible_to([*e], role).is_empty())
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("equipment {}", id)))?;

    Ok(Json(listing_view(equipment, origin(&session))))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customer/estimator", get(estimator_page).post(estimate_project))
        .route("/customer/equipment", get(equipment_catalog))
        .route("/customer/equipment/:id", get(equipment_detail))
}

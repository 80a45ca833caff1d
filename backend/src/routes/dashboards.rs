//! Role dashboards. Each is a JSON view model: the profile header plus
//! role-specific widgets.

use std::collections::BTreeMap;
use std::sync::Arc;

use axent_common::ai::{RecommendationRequest, RecommendationResponse};
use axent_common::marketplace::{Bid, Equipment, EquipmentClass, Project, ProjectStatus};
use axent_common::Role;
use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;

use super::{or_empty, ProfileSummary};
use crate::ai::{fallback, with_fallback, Estimated};
use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::marketplace::bidding::{bids_for_project, lowest_pending_bid};
use crate::marketplace::catalog::visible_to;
use crate::marketplace::logistics::TrackedDelivery;
use crate::AppState;

const RECOMMENDATION_LIMIT: u32 = 6;

fn summary(session: &Session) -> Result<ProfileSummary> {
    session
        .profile()
        .map(ProfileSummary::from)
        .ok_or(AppError::Unauthorized)
}

#[derive(Debug, Serialize)]
pub struct CustomerDashboard {
    pub profile: ProfileSummary,
    pub recommendations: Estimated<RecommendationResponse>,
    pub equipment: Vec<Equipment>,
    pub deliveries: Vec<TrackedDelivery>,
}

async fn customer_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<CustomerDashboard>> {
    let profile = summary(&session)?;
    let token = session.token();

    let request = RecommendationRequest {
        user_id: profile.id.clone(),
        current_equipment_id: None,
        user_role: Role::Customer.to_string(),
        location: profile.city.clone(),
        limit: Some(RECOMMENDATION_LIMIT),
    };
    let recommendations = with_fallback(
        "recommend",
        state.ai_client.recommend(&request),
        fallback::recommendations,
    )
    .await;

    let all = or_empty("equipment", state.catalog.list_equipment(token).await);
    let equipment = visible_to(&all, Role::Customer).into_iter().cloned().collect();

    let deliveries = or_empty("deliveries", state.catalog.list_deliveries(token).await)
        .into_iter()
        .map(TrackedDelivery::from)
        .collect();

    Ok(Json(CustomerDashboard {
        profile,
        recommendations,
        equipment,
        deliveries,
    }))
}

#[derive(Debug, Serialize)]
pub struct OrganizationDashboard {
    pub profile: ProfileSummary,
    pub industrial_equipment: Vec<Equipment>,
    pub open_projects: Vec<Project>,
}

async fn organization_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<OrganizationDashboard>> {
    let profile = summary(&session)?;
    let token = session.token();

    let all = or_empty("equipment", state.catalog.list_equipment(token).await);
    let industrial_equipment = visible_to(&all, Role::Organization)
        .into_iter()
        .filter(|e| e.equipment_class == EquipmentClass::Industrial)
        .cloned()
        .collect();

    let open_projects = or_empty("projects", state.catalog.list_projects(token).await)
        .into_iter()
        .filter(|p| p.status == ProjectStatus::Open)
        .collect();

    Ok(Json(OrganizationDashboard {
        profile,
        industrial_equipment,
        open_projects,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProjectWithBids {
    #[serde(flatten)]
    pub project: Project,
    pub bids: Vec<Bid>,
    pub lowest_bid: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProviderDashboard {
    pub profile: ProfileSummary,
    pub listings: Vec<Equipment>,
    pub open_projects: Vec<ProjectWithBids>,
}

/// Open projects with their bids and the lowest pending amount.
pub(crate) fn open_projects_with_bids(projects: Vec<Project>, bids: &[Bid]) -> Vec<ProjectWithBids> {
    projects
        .into_iter()
        .filter(|p| p.status == ProjectStatus::Open)
        .map(|project| {
            let lowest_bid = lowest_pending_bid(bids, &project.id).map(|b| b.amount);
            let project_bids = bids_for_project(bids, &project.id).into_iter().cloned().collect();
            ProjectWithBids {
                project,
                bids: project_bids,
                lowest_bid,
            }
        })
        .collect()
}

async fn provider_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProviderDashboard>> {
    let profile = summary(&session)?;
    let token = session.token();

    let listings = or_empty("equipment", state.catalog.list_equipment(token).await)
        .into_iter()
        .filter(|e| e.provider.id == profile.id)
        .collect();

    let projects = or_empty("projects", state.catalog.list_projects(token).await);
    let bids = or_empty("bids", state.catalog.list_bids(None, token).await);

    Ok(Json(ProviderDashboard {
        profile,
        listings,
        open_projects: open_projects_with_bids(projects, &bids),
    }))
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub profile: ProfileSummary,
    pub equipment_total: usize,
    pub equipment_by_verification: BTreeMap<String, usize>,
    pub projects_total: usize,
    pub projects_by_status: BTreeMap<String, usize>,
}

/// Count items by the serialized name of a key.
fn count_by<T, K: Serialize>(items: &[T], key: impl Fn(&T) -> K) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        let name = match serde_json::to_value(key(item)) {
            Ok(serde_json::Value::String(name)) => name,
            _ => continue,
        };
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<AdminDashboard>> {
    let profile = summary(&session)?;
    let token = session.token();

    let equipment = or_empty("equipment", state.catalog.list_equipment(token).await);
    let projects = or_empty("projects", state.catalog.list_projects(token).await);

    Ok(Json(AdminDashboard {
        profile,
        equipment_total: equipment.len(),
        equipment_by_verification: count_by(&equipment, |e| e.verification_status),
        projects_total: projects.len(),
        projects_by_status: count_by(&projects, |p| p.status),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customer/dashboard", get(customer_dashboard))
        .route("/organization/dashboard", get(organization_dashboard))
        .route("/provider/dashboard", get(provider_dashboard))
        .route("/admin/dashboard", get(admin_dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::bidding::tests::{bid, project};
    use axent_common::marketplace::{BidStatus, VerificationStatus};

    #[test]
    fn test_open_projects_with_bids() {
        let projects = vec![project("p1", ProjectStatus::Open), project("p2", ProjectStatus::Completed)];
        let bids = vec![
            bid("b1", "p1", 52000.0, BidStatus::Pending),
            bid("b2", "p1", 47000.0, BidStatus::Pending),
            bid("b3", "p2", 1000.0, BidStatus::Accepted),
        ];

        let open = open_projects_with_bids(projects, &bids);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].bids.len(), 2);
        assert_eq!(open[0].lowest_bid, Some(47000.0));
    }

    #[test]
    fn test_count_by_uses_serialized_names() {
        let statuses = vec![
            VerificationStatus::Verified,
            VerificationStatus::Verified,
            VerificationStatus::Flagged,
        ];
        let counts = count_by(&statuses, |s| *s);
        assert_eq!(counts.get("verified"), Some(&2));
        assert_eq!(counts.get("flagged"), Some(&1));
        assert!(counts.get("unverified").is_none());
    }
}

//! Data store boundary.
//!
//! The relational store is an external PostgREST-style service. Profiles,
//! equipment, projects and bids are read and written through the traits
//! below; [`RestStore`] is the HTTPS implementation. Every call takes the
//! caller's identity token (when one is available) so row-level security
//! applies on the store side.

mod rest;

pub use rest::{ProfileRow, RestStore};

use async_trait::async_trait;
use axent_common::marketplace::{Bid, BidStatus, Delivery, Equipment, Project};
use axent_common::{InvalidRole, ProfileUpdate, Role, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Data store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Row has {0}")]
    InvalidRole(#[from] InvalidRole),
    #[error("No {table} row with id {id}")]
    NotFound { table: &'static str, id: String },
}

/// Read/insert/update of `profiles` rows.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by subject id. `Ok(None)` when no row exists.
    async fn fetch_profile(&self, id: &str, token: Option<&str>) -> Result<Option<UserProfile>, StoreError>;

    async fn insert_profile(&self, profile: &UserProfile, token: Option<&str>) -> Result<(), StoreError>;

    async fn update_role(&self, id: &str, role: Role, token: Option<&str>) -> Result<(), StoreError>;

    async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
        token: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Listings, projects, bids and deliveries.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_equipment(&self, token: Option<&str>) -> Result<Vec<Equipment>, StoreError>;

    async fn list_projects(&self, token: Option<&str>) -> Result<Vec<Project>, StoreError>;

    /// Fetch one project by id. `Ok(None)` when no row is visible.
    async fn fetch_project(&self, id: &str, token: Option<&str>) -> Result<Option<Project>, StoreError>;

    /// Bids, optionally only those on one project.
    async fn list_bids(&self, project_id: Option<&str>, token: Option<&str>) -> Result<Vec<Bid>, StoreError>;

    async fn insert_bid(&self, bid: &Bid, token: Option<&str>) -> Result<(), StoreError>;

    async fn update_bid_status(&self, id: &str, status: BidStatus, token: Option<&str>) -> Result<(), StoreError>;

    /// Persist a project's status and bid count.
    async fn update_project(&self, project: &Project, token: Option<&str>) -> Result<(), StoreError>;

    /// Deliveries for the caller's bookings (row-level security scopes them).
    async fn list_deliveries(&self, token: Option<&str>) -> Result<Vec<Delivery>, StoreError>;
}

//! Marketplace records: equipment listings, projects, bids and deliveries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::Location;
use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceUnit {
    Hour,
    Day,
    Week,
    Month,
}

impl PriceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Equipment class used to separate consumer, farm and heavy-industry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentClass {
    Customer,
    Agriculture,
    Industrial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Flagged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub rating: f64,
}

/// A rentable machine listed by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub price: f64,
    pub price_unit: PriceUnit,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specifications: HashMap<String, String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub location: Location,
    pub provider: ProviderSummary,
    pub availability: bool,
    pub equipment_class: EquipmentClass,
    /// Roles allowed to see this listing
    pub visible_to_roles: Vec<Role>,
    pub verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<DateTime<Utc>>,
    pub reliability_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    Demolition,
    Construction,
    Farming,
    Drilling,
    Excavation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    pub rating: f64,
}

/// A job posted by a customer or organization that providers bid on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub budget: Budget,
    /// ISO date (YYYY-MM-DD)
    pub deadline: String,
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    pub client: ClientSummary,
    pub status: ProjectStatus,
    #[serde(default)]
    pub bids_count: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    pub name: String,
    pub rating: f64,
    pub completed_projects: u32,
}

/// A provider's offer on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub project_id: String,
    pub vendor_id: String,
    pub vendor: VendorSummary,
    pub amount: f64,
    /// Free text, e.g. "18 days"
    pub timeline: String,
    pub proposal: String,
    pub status: BidStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    OperatorAssigned,
    InTransit,
    Delivered,
    Issue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorStatus {
    NotNeeded,
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    SelfPickup,
    Pending,
    Dispatched,
    Arrived,
}

/// Logistics state of a booked machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub booking_id: String,
    pub machine_name: String,
    pub status: DeliveryStatus,
    pub operator_status: OperatorStatus,
    pub transport_status: TransportStatus,
}

//! Project bidding rules.
//!
//! The pure functions operate on loaded records; [`BidBoard`] loads them from
//! a [`CatalogStore`], applies a rule, and writes back what changed.

use axent_common::marketplace::{Bid, BidStatus, Project, ProjectStatus, VendorSummary};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::store::{CatalogStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum BiddingError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
    #[error("Bid not found: {0}")]
    BidNotFound(String),
    #[error("Project {0} is not open for bidding")]
    ProjectClosed(String),
    #[error("Bid {0} is no longer pending")]
    BidNotPending(String),
    #[error("Bid amount must be positive, got {0}")]
    InvalidAmount(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A provider's bid form.
#[derive(Debug, Clone, Deserialize)]
pub struct BidDraft {
    pub amount: f64,
    pub timeline: String,
    #[serde(default)]
    pub proposal: String,
}

pub fn bids_for_project<'a>(bids: &'a [Bid], project_id: &str) -> Vec<&'a Bid> {
    bids.iter().filter(|b| b.project_id == project_id).collect()
}

/// Cheapest pending bid on a project.
pub fn lowest_pending_bid<'a>(bids: &'a [Bid], project_id: &str) -> Option<&'a Bid> {
    bids.iter()
        .filter(|b| b.project_id == project_id && b.status == BidStatus::Pending)
        .min_by(|a, b| a.amount.total_cmp(&b.amount))
}

/// Create a pending bid and count it on the project.
pub fn submit_bid(
    project: &mut Project,
    vendor_id: &str,
    vendor: VendorSummary,
    draft: BidDraft,
) -> Result<Bid, BiddingError> {
    if project.status != ProjectStatus::Open {
        return Err(BiddingError::ProjectClosed(project.id.clone()));
    }
    if !(draft.amount.is_finite() && draft.amount > 0.0) {
        return Err(BiddingError::InvalidAmount(draft.amount));
    }

    project.bids_count += 1;
    Ok(Bid {
        id: Uuid::new_v4().to_string(),
        project_id: project.id.clone(),
        vendor_id: vendor_id.to_string(),
        vendor,
        amount: draft.amount,
        timeline: draft.timeline,
        proposal: draft.proposal,
        status: BidStatus::Pending,
        created_at: Utc::now().to_rfc3339(),
    })
}

/// Accept one bid: the project moves to `in_progress` and every other
/// pending bid on it is rejected. Returns the ids of bids whose status
/// changed, the accepted one first.
///
/// An `in_progress` project with no other accepted bid is an acceptance
/// whose bid writes did not all land; accepting the same bid again finishes
/// them.
pub fn accept_bid(project: &mut Project, bids: &mut [Bid], bid_id: &str) -> Result<Vec<String>, BiddingError> {
    let index = bids
        .iter()
        .position(|b| b.id == bid_id && b.project_id == project.id)
        .ok_or_else(|| BiddingError::BidNotFound(bid_id.to_string()))?;

    match project.status {
        ProjectStatus::Open => {}
        ProjectStatus::InProgress => {
            let other_accepted = bids
                .iter()
                .any(|b| b.project_id == project.id && b.id != bid_id && b.status == BidStatus::Accepted);
            if other_accepted {
                return Err(BiddingError::ProjectClosed(project.id.clone()));
            }
        }
        _ => return Err(BiddingError::ProjectClosed(project.id.clone())),
    }

    let mut changed = Vec::new();
    match bids[index].status {
        BidStatus::Pending => {
            bids[index].status = BidStatus::Accepted;
            changed.push(bid_id.to_string());
        }
        BidStatus::Accepted => {}
        _ => return Err(BiddingError::BidNotPending(bid_id.to_string())),
    }

    for bid in bids.iter_mut() {
        if bid.project_id == project.id && bid.id != bid_id && bid.status == BidStatus::Pending {
            bid.status = BidStatus::Rejected;
            changed.push(bid.id.clone());
        }
    }

    project.status = ProjectStatus::InProgress;
    Ok(changed)
}

pub fn reject_bid(project: &Project, bids: &mut [Bid], bid_id: &str) -> Result<(), BiddingError> {
    let index = pending_bid(bids, &project.id, bid_id)?;
    bids[index].status = BidStatus::Rejected;
    Ok(())
}

fn pending_bid(bids: &[Bid], project_id: &str, bid_id: &str) -> Result<usize, BiddingError> {
    let index = bids
        .iter()
        .position(|b| b.id == bid_id && b.project_id == project_id)
        .ok_or_else(|| BiddingError::BidNotFound(bid_id.to_string()))?;

    if bids[index].status != BidStatus::Pending {
        return Err(BiddingError::BidNotPending(bid_id.to_string()));
    }
    Ok(index)
}

/// Store-backed bidding operations for one caller.
pub struct BidBoard<'a> {
    store: &'a dyn CatalogStore,
    token: Option<&'a str>,
}

impl<'a> BidBoard<'a> {
    pub fn new(store: &'a dyn CatalogStore, token: Option<&'a str>) -> Self {
        Self { store, token }
    }

    pub async fn project(&self, project_id: &str) -> Result<Project, BiddingError> {
        self.store
            .fetch_project(project_id, self.token)
            .await?
            .ok_or_else(|| BiddingError::ProjectNotFound(project_id.to_string()))
    }

    /// The count is written before the bid row; a failed insert puts it back.
    pub async fn submit(
        &self,
        project_id: &str,
        vendor_id: &str,
        vendor: VendorSummary,
        draft: BidDraft,
    ) -> Result<Bid, BiddingError> {
        let mut project = self.project(project_id).await?;
        let bid = submit_bid(&mut project, vendor_id, vendor, draft)?;

        self.store.update_project(&project, self.token).await?;
        if let Err(e) = self.store.insert_bid(&bid, self.token).await {
            project.bids_count -= 1;
            if let Err(undo) = self.store.update_project(&project, self.token).await {
                tracing::warn!(project_id, error = %undo, "Failed to restore bid count");
            }
            return Err(e.into());
        }

        tracing::info!(project_id, bid_id = %bid.id, amount = bid.amount, "Bid submitted");
        Ok(bid)
    }

    /// Accept `bid_id` on an already loaded project. The project transition
    /// is written first, so no bid lands after a partial failure and a retry
    /// completes the bid updates.
    pub async fn accept(&self, mut project: Project, bid_id: &str) -> Result<Project, BiddingError> {
        let mut bids = self.store.list_bids(Some(&project.id), self.token).await?;
        let was_open = project.status == ProjectStatus::Open;

        let changed = accept_bid(&mut project, &mut bids, bid_id)?;
        if was_open {
            self.store.update_project(&project, self.token).await?;
        }
        for bid in changed.iter().filter_map(|id| bids.iter().find(|b| &b.id == id)) {
            self.store.update_bid_status(&bid.id, bid.status, self.token).await?;
        }

        tracing::info!(project_id = %project.id, bid_id, changed = changed.len(), "Bid accepted");
        Ok(project)
    }

    pub async fn reject(&self, project: &Project, bid_id: &str) -> Result<(), BiddingError> {
        let mut bids = self.store.list_bids(Some(&project.id), self.token).await?;

        reject_bid(project, &mut bids, bid_id)?;
        self.store.update_bid_status(bid_id, BidStatus::Rejected, self.token).await?;
        Ok(())
    }
}
